//! Settings file
//!
//! Normalization and token output switches plus an optional extra grammar
//! table, loaded from TOML:
//!
//! ```toml
//! grammar = "commands.yaml"
//!
//! [normalize]
//! normalize_digits = false
//!
//! [tokens]
//! ignore_flag_order = true
//! ```

use crate::codec::TokenOptions;
use crate::grammar::{CommandGrammar, GrammarError};
use crate::normalizer::NormalizeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub normalize: NormalizeOptions,
    pub tokens: TokenOptions,
    /// Grammar table overlaid on the built-in one
    pub grammar: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a settings file. A relative `grammar` path is taken relative to
    /// the settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&text)?;
        if let (Some(grammar), Some(dir)) = (settings.grammar.as_ref(), path.parent()) {
            if grammar.is_relative() {
                settings.grammar = Some(dir.join(grammar));
            }
        }
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// The built-in grammar, overlaid with the configured table if any.
    pub fn grammar(&self) -> Result<CommandGrammar, SettingsError> {
        let builtin = CommandGrammar::builtin()?;
        match &self.grammar {
            Some(path) => Ok(builtin.overlay(CommandGrammar::load(path)?)),
            None => Ok(builtin),
        }
    }
}
