//! Token codec
//!
//! Serializes canonical trees back into command tokens and into the flat,
//! kind-prefixed symbol stream consumed and produced by sequence models, and
//! rebuilds trees from such streams.

pub mod symbols;
pub mod tokens;

pub use symbols::{from_symbols, to_symbols, H_NO_EXPAND, V_NO_EXPAND};
pub use tokens::{to_command, to_tokens, TokenOptions};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A tree that breaks a structural invariant, in strict mode
    #[error("{kind} node: {reason}")]
    Structural { kind: &'static str, reason: String },

    #[error("malformed symbol `{0}`")]
    MalformedSymbol(String),
}
