//! Argument type classification
//!
//! Lexical heuristics deciding the semantic type of an argument word, given
//! the types the command can still accept at this position.

use crate::ast::Span;
use crate::grammar::ArgSlot;
use crate::tree::ArgType;

const SIZE_SUFFIXES: &[char] = &['k', 'M', 'G', 'T', 'P'];
const TIME_SUFFIXES: &[char] = &['s', 'm', 'h', 'd', 'w'];

/// Structural tokens of embedded commands.
pub fn is_reserved_word(word: &str) -> bool {
    matches!(word, "+" | ";" | "{}")
}

/// Classify `word`, whose original spelling covers `span`, among `allowed`.
///
/// Returns [`ArgType::Unknown`] when no heuristic applies; the caller
/// reports that.
pub fn classify(word: &str, span: Span, allowed: &[ArgType]) -> ArgType {
    let allows = |t: ArgType| allowed.contains(&t);
    let has_digit = word.chars().any(|c| c.is_ascii_digit());

    if is_reserved_word(word) {
        return ArgType::ReservedWord;
    }
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) && allows(ArgType::Number) {
        return ArgType::Number;
    }
    if has_digit {
        let last = word.chars().last();
        if last.map_or(false, |c| SIZE_SUFFIXES.contains(&c)) && allows(ArgType::Size) {
            return ArgType::Size;
        }
        if last.map_or(false, |c| TIME_SUFFIXES.contains(&c)) && allows(ArgType::Time) {
            return ArgType::Time;
        }
    }
    if allows(ArgType::Permission) && (has_digit || word.contains('=')) {
        return ArgType::Permission;
    }
    // quote-delimited in the source
    if allows(ArgType::Pattern) && word.len() + 2 == span.len() {
        return ArgType::Pattern;
    }
    if allows(ArgType::File) {
        ArgType::File
    } else if allows(ArgType::Utility) {
        ArgType::Utility
    } else {
        ArgType::Unknown
    }
}

/// Positional slots of one command and which of them are taken.
#[derive(Debug, Clone, Default)]
pub struct SlotTracker {
    slots: Vec<(ArgSlot, bool)>,
}

impl SlotTracker {
    pub fn new(slots: Vec<ArgSlot>) -> Self {
        Self {
            slots: slots.into_iter().map(|s| (s, false)).collect(),
        }
    }

    /// Types of the slots still open, in slot order, without duplicates.
    pub fn allowed(&self) -> Vec<ArgType> {
        let mut out = Vec::new();
        for (slot, filled) in &self.slots {
            if (slot.is_list || !filled) && !out.contains(&slot.arg_type) {
                out.push(slot.arg_type);
            }
        }
        out
    }

    pub fn expects(&self, arg_type: ArgType) -> bool {
        self.allowed().contains(&arg_type)
    }

    /// Take the first open single slot of `arg_type`. List slots stay open.
    pub fn fill(&mut self, arg_type: ArgType) {
        if let Some(entry) = self
            .slots
            .iter_mut()
            .find(|(slot, filled)| slot.arg_type == arg_type && !slot.is_list && !filled)
        {
            entry.1 = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ArgType] = &[
        ArgType::Number,
        ArgType::Size,
        ArgType::Time,
        ArgType::Permission,
        ArgType::Pattern,
        ArgType::File,
        ArgType::Utility,
    ];

    fn plain(word: &str) -> Span {
        Span::new(0, word.len())
    }

    #[test]
    fn test_reserved_words_win() {
        assert_eq!(classify("{}", plain("{}"), &[]), ArgType::ReservedWord);
        assert_eq!(classify(";", Span::new(0, 2), &[ArgType::File]), ArgType::ReservedWord);
        assert_eq!(classify("+", plain("+"), ALL), ArgType::ReservedWord);
    }

    #[test]
    fn test_numbers_sizes_times() {
        assert_eq!(classify("10", plain("10"), ALL), ArgType::Number);
        assert_eq!(classify("+10M", plain("+10M"), ALL), ArgType::Size);
        assert_eq!(classify("-7d", plain("-7d"), ALL), ArgType::Time);
        // suffix without digits is not a size
        assert_eq!(classify("M", plain("M"), &[ArgType::Size, ArgType::File]), ArgType::File);
    }

    #[test]
    fn test_only_allowed_types_are_returned() {
        assert_eq!(classify("10", plain("10"), &[ArgType::File]), ArgType::File);
        assert_eq!(classify("755", plain("755"), &[ArgType::Permission]), ArgType::Permission);
        assert_eq!(classify("u+x", plain("u+x"), &[ArgType::Permission, ArgType::File]), ArgType::File);
        assert_eq!(classify("a=r", plain("a=r"), &[ArgType::Permission]), ArgType::Permission);
        assert_eq!(classify("rm", plain("rm"), &[ArgType::Utility]), ArgType::Utility);
        assert_eq!(classify("x", plain("x"), &[]), ArgType::Unknown);
    }

    #[test]
    fn test_quoted_word_is_pattern() {
        // '*.txt' spans seven bytes, the word five
        assert_eq!(
            classify("*.txt", Span::new(7, 14), &[ArgType::Pattern, ArgType::File]),
            ArgType::Pattern
        );
        assert_eq!(
            classify("*.txt", Span::new(7, 12), &[ArgType::Pattern, ArgType::File]),
            ArgType::File
        );
    }

    #[test]
    fn test_slot_tracker() {
        let mut slots = SlotTracker::new(vec![
            ArgSlot::new(ArgType::Permission, false, false),
            ArgSlot::new(ArgType::File, true, false),
        ]);
        assert_eq!(slots.allowed(), vec![ArgType::Permission, ArgType::File]);
        slots.fill(ArgType::Permission);
        assert_eq!(slots.allowed(), vec![ArgType::File]);
        slots.fill(ArgType::File);
        assert!(slots.expects(ArgType::File));
        assert!(!slots.expects(ArgType::Utility));
    }
}
