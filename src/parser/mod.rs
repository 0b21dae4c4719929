//! Parser module for shell commands
//!
//! This module contains the lexer and parser that turn command text into the
//! raw parse tree consumed by the normalizer.

pub mod types;
pub mod lexer;
pub mod parser;

// Re-exports
pub use types::ParseException;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse, Parser};
