//! Flag splitting and quote recovery

use super::resolver::is_operator_spelling;
use crate::ast::Span;
use crate::grammar::GrammarLookup;

/// Whether `word` in option position of `head` is a flag rather than a
/// positional argument.
///
/// A lone `-` names stdin, and `head`/`tail` accept `-<count>`.
pub fn is_flag_word(head: &str, word: &str) -> bool {
    if !word.starts_with('-') || word.len() < 2 {
        return false;
    }
    let is_count = word[1..].chars().all(|c| c.is_ascii_digit());
    !(matches!(head, "head" | "tail") && is_count)
}

/// Spellings of the Flag nodes `word` becomes under `head`.
///
/// Clustered short options (`-la`) split into one flag per character unless
/// the grammar treats the token as a long option, the head command does not
/// split flags, or the token spells a logic operator.
pub fn split_flag(grammar: &dyn GrammarLookup, head: &str, word: &str) -> Vec<String> {
    let keep = word.chars().count() <= 2
        || !word.starts_with('-')
        || grammar.is_long_option(head, word)
        || !grammar.splits_flags(head)
        || is_operator_spelling(word);
    if keep {
        return vec![word.to_string()];
    }
    word.chars().skip(1).map(|c| format!("-{}", c)).collect()
}

/// Whether the source spelling at `span` starts or ends with a quote mark.
pub fn is_quoted(source: &str, span: Span) -> bool {
    match source.get(span.start..span.end) {
        Some(text) => {
            let quote = |c: char| c == '\'' || c == '"';
            text.starts_with(quote) || text.ends_with(quote)
        }
        None => false,
    }
}

/// The quoted source spelling of a word when it was quoted, else `word`.
pub fn recover_quotation(source: &str, span: Span, word: &str) -> String {
    if is_quoted(source, span) {
        if let Some(text) = source.get(span.start..span.end) {
            return text.to_string();
        }
    }
    word.to_string()
}
