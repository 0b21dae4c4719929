//! Command grammar lookup
//!
//! The normalizer and the token codec never hard-code command knowledge.
//! They ask a [`GrammarLookup`] which positional argument types a head command
//! takes, which flags take an argument, and whether the command's arguments
//! form a boolean predicate expression.

pub mod table;

pub use table::{CommandGrammar, CommandSpec, GrammarError};

use crate::tree::ArgType;
use serde::{Deserialize, Serialize};

/// One positional argument slot of a head command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSlot {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    /// A list slot accepts any number of arguments and is never filled
    #[serde(default, rename = "list")]
    pub is_list: bool,
    #[serde(default, rename = "optional")]
    pub is_optional: bool,
}

impl ArgSlot {
    pub fn new(arg_type: ArgType, is_list: bool, is_optional: bool) -> Self {
        Self {
            arg_type,
            is_list,
            is_optional,
        }
    }
}

/// Read-only queries about head commands and their flags.
///
/// Implementations must be immutable after construction so that one lookup
/// can be shared across concurrent normalization calls.
pub trait GrammarLookup: Send + Sync {
    /// Ordered positional argument slots of `head`. Unknown commands have none.
    fn arg_types_for(&self, head: &str) -> Vec<ArgSlot>;

    /// Argument type taken by `flag` of `head`, if the flag takes one.
    fn flag_arg_type(&self, head: &str, flag: &str) -> Option<ArgType>;

    /// Whether `token` must be kept as one flag rather than split into
    /// single-character flags.
    fn is_long_option(&self, head: &str, token: &str) -> bool;

    /// Whether the arguments of `head` form a boolean predicate expression
    /// (`find`-style commands).
    fn is_predicate(&self, head: &str) -> bool;

    /// Whether clustered short options of `head` are split (`-la` to `-l -a`).
    fn splits_flags(&self, head: &str) -> bool {
        !self.is_predicate(head)
    }
}
