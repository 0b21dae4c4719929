//! cmdnorm - Shell command normalizer
//!
//! This library parses a shell command, rewrites it into a canonical, typed
//! command tree and serializes that tree back into command tokens or into a
//! flat symbol stream, so that commands differing only in spelling compare
//! equal.

pub mod ast;
pub mod codec;
pub mod config;
pub mod grammar;
pub mod normalizer;
pub mod parser;
pub mod tree;

pub use codec::{from_symbols, to_symbols, to_tokens, CodecError, TokenOptions};
pub use config::{Settings, SettingsError};
pub use grammar::{ArgSlot, CommandGrammar, GrammarLookup};
pub use normalizer::{Diagnostic, NormalizeError, NormalizeOptions, Normalized, Normalizer};
pub use parser::{parse, ParseException};
pub use tree::{prune, ArgType, NodeId, NodeKind, Tree};
