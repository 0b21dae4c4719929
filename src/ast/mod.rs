//! Raw parse tree consumed by the normalizer.
//!
//! Architecture:
//!   Command text → Parser → RawNode → Normalizer → Tree → Codec → Tokens

pub mod types;

pub use types::{RawKind, RawNode, Span};
