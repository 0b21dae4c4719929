//! Raw Parse Tree Types
//!
//! This module defines the generic syntactic tree handed to the normalizer.
//! Every node carries a kind tag, its literal word text, an ordered list of
//! child parts and the byte span it covers in the source command.

use std::fmt;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Byte span in the source command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift both ends by `offset` (used when a substitution body is parsed
    /// on its own and spliced back into the outer command).
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

// =============================================================================
// NODE KINDS
// =============================================================================

/// Syntactic kind of a raw node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    // Supported
    Word,
    Command,
    Pipeline,
    Pipe,
    List,
    Operator,
    CommandSubstitution,
    ProcessSubstitution,
    Parameter,
    Tilde,

    // Recognized but rejected by the normalizer
    Redirect,
    Assignment,
    Heredoc,
    Reserved,
    Subshell,
    Group,
    For,
    If,
    While,
    Until,
    Case,
    Function,
}

impl RawKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Command => "command",
            Self::Pipeline => "pipeline",
            Self::Pipe => "pipe",
            Self::List => "list",
            Self::Operator => "operator",
            Self::CommandSubstitution => "commandsubstitution",
            Self::ProcessSubstitution => "processsubstitution",
            Self::Parameter => "parameter",
            Self::Tilde => "tilde",
            Self::Redirect => "redirect",
            Self::Assignment => "assignment",
            Self::Heredoc => "heredoc",
            Self::Reserved => "reservedword",
            Self::Subshell => "subshell",
            Self::Group => "group",
            Self::For => "for",
            Self::If => "if",
            Self::While => "while",
            Self::Until => "until",
            Self::Case => "case",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for RawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NODES
// =============================================================================

/// A node of the raw parse tree.
///
/// For `Word` nodes `word` is the unquoted, unescaped value; `span` still
/// covers the original spelling (quotes and backslashes included), which is
/// what quote recovery and pattern detection rely on. A word that contains
/// expansions lists them in `parts`. Substitution nodes hold the parsed body
/// as their single part.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub kind: RawKind,
    pub word: String,
    pub parts: Vec<RawNode>,
    pub span: Span,
}

impl RawNode {
    pub fn new(kind: RawKind, word: impl Into<String>, parts: Vec<RawNode>, span: Span) -> Self {
        Self {
            kind,
            word: word.into(),
            parts,
            span,
        }
    }

    /// Plain word without expansions.
    pub fn word(word: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(RawKind::Word, word, Vec::new(), Span::new(start, end))
    }

    /// Command node spanning its parts.
    pub fn command(parts: Vec<RawNode>) -> Self {
        let span = Self::covering(&parts);
        Self::new(RawKind::Command, "", parts, span)
    }

    /// Smallest span covering all `nodes`, or an empty span.
    pub fn covering(nodes: &[RawNode]) -> Span {
        match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
            _ => Span::default(),
        }
    }

    pub fn is_word(&self, text: &str) -> bool {
        self.kind == RawKind::Word && self.word == text
    }

    /// Shift the spans of this node and all descendants.
    pub fn shift(&mut self, offset: usize) {
        self.span = self.span.shifted(offset);
        for part in &mut self.parts {
            part.shift(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_span() {
        let parts = vec![RawNode::word("ls", 0, 2), RawNode::word("-l", 3, 5)];
        let cmd = RawNode::command(parts);
        assert_eq!(cmd.span, Span::new(0, 5));
        assert_eq!(RawNode::covering(&[]), Span::default());
    }

    #[test]
    fn test_shift_recurses() {
        let inner = RawNode::word("x", 0, 1);
        let mut outer = RawNode::new(RawKind::CommandSubstitution, "$(x)", vec![inner], Span::new(0, 4));
        outer.shift(10);
        assert_eq!(outer.span, Span::new(10, 14));
        assert_eq!(outer.parts[0].span, Span::new(10, 11));
    }
}
