//! Normalization errors and repair diagnostics

use std::fmt;
use thiserror::Error;

/// Failure to normalize one command. None of these are fatal to a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// The command text could not be parsed at all
    #[error("cannot parse `{command}`: {reason}")]
    ParseRejected { command: String, reason: String },

    /// A recognized shell construct that normalization does not cover
    #[error("unsupported {construct} in `{command}`")]
    UnsupportedConstruct { command: String, construct: String },

    /// The command parsed but cannot form a canonical tree
    #[error("inconsistent structure in `{command}`: {reason}")]
    StructuralInconsistency { command: String, reason: String },
}

impl NormalizeError {
    pub fn command(&self) -> &str {
        match self {
            Self::ParseRejected { command, .. }
            | Self::UnsupportedConstruct { command, .. }
            | Self::StructuralInconsistency { command, .. } => command,
        }
    }

    /// Short kind name, used for batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParseRejected { .. } => "ParseRejected",
            Self::UnsupportedConstruct { .. } => "UnsupportedConstruct",
            Self::StructuralInconsistency { .. } => "StructuralInconsistency",
        }
    }
}

/// What a recoverable repair did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairKind {
    /// A `)` without an open group was dropped
    UnmatchedCloseParen,
    /// A `(` still open at the end was closed
    UnclosedParen,
    /// An embedded command had no `;` or `+`; `;` was assumed
    MissingDelimiter,
    /// No argument type heuristic matched
    UnknownArgType,
    /// A command without a head command was dropped
    MissingHead,
}

impl RepairKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnmatchedCloseParen => "unmatched-close-paren",
            Self::UnclosedParen => "unclosed-paren",
            Self::MissingDelimiter => "missing-delimiter",
            Self::UnknownArgType => "unknown-arg-type",
            Self::MissingHead => "missing-head",
        }
    }
}

/// A non-fatal repair applied while normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: RepairKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: RepairKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}
