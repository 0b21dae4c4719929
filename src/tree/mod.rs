//! Canonical command tree
//!
//! The normalized form of a command: head commands, flags, typed arguments,
//! logic operators and substitution wrappers, stored in an index arena.

pub mod types;
pub mod tree;
pub mod prune;
pub mod diff;

pub use diff::diff;
pub use prune::prune;
pub use tree::Tree;
pub use types::{ArgType, Associativity, Direction, Node, NodeId, NodeKind};
