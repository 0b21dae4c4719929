//! Grammar table
//!
//! A [`GrammarLookup`] backed by a declarative table, loaded from JSON or
//! YAML. A table covering common utilities is embedded in the crate.
//!
//! ```json
//! { "commands": [
//!     { "name": "head",
//!       "arguments": [{ "type": "File", "list": true, "optional": true }],
//!       "flags": { "-n": "Number", "-q": null } }
//! ] }
//! ```

use super::{ArgSlot, GrammarLookup};
use crate::tree::ArgType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BUILTIN_GRAMMAR: &str = include_str!("builtin.json");

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("cannot read grammar {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON grammar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML grammar: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("command `{0}` is declared twice")]
    Duplicate(String),

    #[error("unsupported grammar file extension: {0}")]
    UnsupportedFormat(String),
}

/// Grammar entry of one head command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub predicate: bool,
    /// Defaults to splitting unless the command is a predicate command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_flags: Option<bool>,
    #[serde(default)]
    pub arguments: Vec<ArgSlot>,
    /// Flag spelling to the type of its argument; `null` for plain switches
    #[serde(default)]
    pub flags: IndexMap<String, Option<ArgType>>,
}

impl CommandSpec {
    pub fn splits_flags(&self) -> bool {
        self.split_flags.unwrap_or(!self.predicate)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GrammarFile {
    commands: Vec<CommandSpec>,
}

/// Table-driven grammar keyed by head command name.
#[derive(Debug, Clone, Default)]
pub struct CommandGrammar {
    commands: IndexMap<String, CommandSpec>,
}

impl CommandGrammar {
    /// The grammar embedded in the crate.
    pub fn builtin() -> Result<Self, GrammarError> {
        Self::from_json(BUILTIN_GRAMMAR)
    }

    pub fn from_json(text: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_json::from_str(text)?;
        Self::from_specs(file.commands)
    }

    pub fn from_yaml(text: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_yaml::from_str(text)?;
        Self::from_specs(file.commands)
    }

    /// Load a table file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, GrammarError> {
        let text = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("yaml" | "yml") => Self::from_yaml(&text),
            other => Err(GrammarError::UnsupportedFormat(other.unwrap_or("").to_string())),
        }
    }

    pub fn from_specs(specs: Vec<CommandSpec>) -> Result<Self, GrammarError> {
        let mut commands = IndexMap::with_capacity(specs.len());
        for spec in specs {
            if commands.contains_key(&spec.name) {
                return Err(GrammarError::Duplicate(spec.name));
            }
            commands.insert(spec.name.clone(), spec);
        }
        Ok(Self { commands })
    }

    /// Entries of `other` replace same-named entries of `self`; new ones are
    /// appended.
    pub fn overlay(mut self, other: CommandGrammar) -> Self {
        for (name, spec) in other.commands {
            self.commands.insert(name, spec);
        }
        self
    }

    pub fn get(&self, head: &str) -> Option<&CommandSpec> {
        self.commands.get(head)
    }

    pub fn contains(&self, head: &str) -> bool {
        self.commands.contains_key(head)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_json(&self) -> Result<String, GrammarError> {
        let file = GrammarFile {
            commands: self.commands.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl GrammarLookup for CommandGrammar {
    fn arg_types_for(&self, head: &str) -> Vec<ArgSlot> {
        self.get(head).map(|c| c.arguments.clone()).unwrap_or_default()
    }

    fn flag_arg_type(&self, head: &str, flag: &str) -> Option<ArgType> {
        self.get(head)?.flags.get(flag).copied().flatten()
    }

    fn is_long_option(&self, head: &str, token: &str) -> bool {
        if token.starts_with("--") {
            return true;
        }
        token.len() > 2
            && self
                .get(head)
                .map_or(false, |c| c.flags.contains_key(token))
    }

    fn is_predicate(&self, head: &str) -> bool {
        self.get(head).map_or(false, |c| c.predicate)
    }

    fn splits_flags(&self, head: &str) -> bool {
        self.get(head).map_or(true, |c| c.splits_flags())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let grammar = CommandGrammar::builtin().unwrap();
        assert!(grammar.contains("find"));
        assert!(grammar.contains("xargs"));
        assert!(grammar.is_predicate("find"));
        assert!(!grammar.is_predicate("ls"));
        assert!(!grammar.splits_flags("find"));
        assert!(grammar.splits_flags("ls"));
        assert!(grammar.splits_flags("no-such-command"));
    }

    #[test]
    fn test_flag_arg_types() {
        let grammar = CommandGrammar::builtin().unwrap();
        assert_eq!(grammar.flag_arg_type("find", "-name"), Some(ArgType::Pattern));
        assert_eq!(grammar.flag_arg_type("find", "-perm"), Some(ArgType::Permission));
        assert_eq!(grammar.flag_arg_type("find", "-exec"), Some(ArgType::Utility));
        assert_eq!(grammar.flag_arg_type("find", "-print"), None);
        assert_eq!(grammar.flag_arg_type("head", "-n"), Some(ArgType::Number));
        assert_eq!(grammar.flag_arg_type("ls", "-l"), None);
        assert_eq!(grammar.flag_arg_type("nope", "-n"), None);
    }

    #[test]
    fn test_long_options() {
        let grammar = CommandGrammar::builtin().unwrap();
        assert!(grammar.is_long_option("ls", "--color"));
        assert!(grammar.is_long_option("grep", "--anything"));
        assert!(grammar.is_long_option("find", "-name"));
        assert!(!grammar.is_long_option("ls", "-la"));
        assert!(!grammar.is_long_option("ls", "-l"));
    }

    #[test]
    fn test_arg_slots() {
        let grammar = CommandGrammar::builtin().unwrap();
        let slots = grammar.arg_types_for("chmod");
        assert_eq!(slots[0], ArgSlot::new(ArgType::Permission, false, false));
        assert_eq!(slots[1], ArgSlot::new(ArgType::File, true, false));
        assert!(grammar.arg_types_for("unknown").is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let text = "
commands:
  - name: pick
    predicate: true
    arguments:
      - type: File
        list: true
    flags:
      -size: Size
      -quiet: null
";
        let grammar = CommandGrammar::from_yaml(text).unwrap();
        assert_eq!(grammar.flag_arg_type("pick", "-size"), Some(ArgType::Size));
        assert_eq!(grammar.flag_arg_type("pick", "-quiet"), None);
        assert!(grammar.is_long_option("pick", "-quiet"));
        assert!(grammar.is_predicate("pick"));
        assert_eq!(grammar.arg_types_for("pick"), vec![ArgSlot::new(ArgType::File, true, false)]);
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let text = r#"{"commands": [{"name": "ls"}, {"name": "ls"}]}"#;
        assert!(matches!(
            CommandGrammar::from_json(text),
            Err(GrammarError::Duplicate(name)) if name == "ls"
        ));
    }

    #[test]
    fn test_overlay_replaces_entries() {
        let base = CommandGrammar::builtin().unwrap();
        let count = base.len();
        let extra = CommandGrammar::from_json(
            r#"{"commands": [{"name": "ls", "split_flags": false}, {"name": "fd", "predicate": true}]}"#,
        )
        .unwrap();
        let merged = base.overlay(extra);
        assert_eq!(merged.len(), count + 1);
        assert!(!merged.splits_flags("ls"));
        assert!(merged.is_predicate("fd"));
    }

    #[test]
    fn test_json_export_reloads() {
        let grammar = CommandGrammar::builtin().unwrap();
        let reloaded = CommandGrammar::from_json(&grammar.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.get("find"), grammar.get("find"));
    }
}
