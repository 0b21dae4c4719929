//! Recursive Descent Parser for Shell Commands
//!
//! This parser consumes tokens from the lexer and produces a raw parse tree.
//! It recognizes enough of the shell grammar to hand the normalizer either a
//! supported tree or a node of a kind the normalizer rejects.
//!
//! Grammar (simplified):
//!   list         ::= pipeline ((;|&|&&|'||'|NEWLINE) pipeline)*
//!   pipeline     ::= command ('|' command)*
//!   command      ::= simple_command | compound | function_def | subshell
//!   simple_cmd   ::= (assignment)* word (word | redirection)*
//!   compound     ::= for | while | until | if | case | { ... }

use crate::ast::types::{RawKind, RawNode, Span};
use crate::parser::lexer::{Lexer, Token, TokenType};
use crate::parser::types::{ParseException, MAX_INPUT_SIZE, MAX_TOKENS};

lazy_static::lazy_static! {
    /// Reserved words that open a compound command, with their closing word
    static ref COMPOUND_OPENERS: Vec<(&'static str, RawKind, &'static str)> = vec![
        ("for", RawKind::For, "done"),
        ("select", RawKind::For, "done"),
        ("while", RawKind::While, "done"),
        ("until", RawKind::Until, "done"),
        ("if", RawKind::If, "fi"),
        ("case", RawKind::Case, "esac"),
        ("{", RawKind::Group, "}"),
    ];
}

fn closer_for(word: &str) -> Option<(RawKind, &'static str)> {
    COMPOUND_OPENERS
        .iter()
        .find(|(open, _, _)| *open == word)
        .map(|(_, kind, close)| (*kind, *close))
}

/// Check if a word is an assignment: NAME=value or NAME+=value
fn is_assignment(source: &str) -> bool {
    let name_end = source
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(source.len());
    if name_end == 0 || source.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    let after = &source[name_end..];
    after.starts_with('=') || after.starts_with("+=")
}

/// Main parser struct
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    input: String,
    /// Offset of `input` within the outermost command text
    base: usize,
}

impl Parser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Parser {
            tokens: Vec::new(),
            pos: 0,
            input: String::new(),
            base: 0,
        }
    }

    /// Parse a command line into a raw parse tree.
    pub fn parse(&mut self, input: &str) -> Result<RawNode, ParseException> {
        self.parse_nested(input, 0, 0)
    }

    /// Parse a substitution body located at byte `base` of the outer text.
    pub(crate) fn parse_nested(&mut self, input: &str, base: usize, depth: usize) -> Result<RawNode, ParseException> {
        if input.len() > MAX_INPUT_SIZE {
            return Err(ParseException::new(
                format!("Input too large: {} bytes exceeds limit of {}", input.len(), MAX_INPUT_SIZE),
                1,
                1,
            ));
        }

        self.input = input.to_string();
        self.base = base;
        self.tokens = Lexer::nested(input, base, depth).tokenize()?;
        self.pos = 0;

        if self.tokens.len() > MAX_TOKENS {
            return Err(ParseException::new(
                format!("Too many tokens: {} exceeds limit of {}", self.tokens.len(), MAX_TOKENS),
                1,
                1,
            ));
        }

        self.skip_newlines();
        if self.check(TokenType::Eof) {
            return Err(self.error("empty command"));
        }

        let node = self.parse_list()?;
        self.skip_newlines();
        if !self.check(TokenType::Eof) {
            let tok = self.current().value.clone();
            return Err(self.error(format!("syntax error near unexpected token `{}'", tok)));
        }
        Ok(node)
    }

    // -------------------------------------------------------------------------
    // Token helpers
    // -------------------------------------------------------------------------

    fn current(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_type(&self, offset: usize) -> TokenType {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.token_type)
            .unwrap_or(TokenType::Eof)
    }

    fn check(&self, t: TokenType) -> bool {
        self.current().token_type == t
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenType::Newline) {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseException {
        let local = self.current().start.saturating_sub(self.base);
        ParseException::at(message, &self.input, local)
    }

    /// Source text of a token (spelling before unquoting).
    fn source_of(&self, tok: &Token) -> &str {
        let start = tok.start.saturating_sub(self.base);
        let end = tok.end.saturating_sub(self.base);
        self.input.get(start..end).unwrap_or("")
    }

    // -------------------------------------------------------------------------
    // Lists and pipelines
    // -------------------------------------------------------------------------

    fn parse_list(&mut self) -> Result<RawNode, ParseException> {
        let mut parts = vec![self.parse_pipeline()?];

        while self.current().token_type.is_list_operator() {
            let op = self.advance();
            parts.push(RawNode::new(RawKind::Operator, op.value.clone(), Vec::new(), op.span()));
            self.skip_newlines();
            if matches!(self.current().token_type, TokenType::Eof | TokenType::RParen) {
                break;
            }
            parts.push(self.parse_pipeline()?);
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        let span = RawNode::covering(&parts);
        Ok(RawNode::new(RawKind::List, "", parts, span))
    }

    fn parse_pipeline(&mut self) -> Result<RawNode, ParseException> {
        let mut parts = vec![self.parse_command()?];

        while matches!(self.current().token_type, TokenType::Pipe | TokenType::PipeAmp) {
            let pipe = self.advance();
            parts.push(RawNode::new(RawKind::Pipe, pipe.value.clone(), Vec::new(), pipe.span()));
            self.skip_newlines();
            parts.push(self.parse_command()?);
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        let span = RawNode::covering(&parts);
        Ok(RawNode::new(RawKind::Pipeline, "", parts, span))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn parse_command(&mut self) -> Result<RawNode, ParseException> {
        let tok = self.current().clone();
        match tok.token_type {
            TokenType::LParen => self.parse_subshell(),
            TokenType::Word if !tok.quoted => {
                if tok.value == "function" {
                    return self.parse_function_def();
                }
                if let Some((kind, closer)) = closer_for(&tok.value) {
                    return self.parse_compound(kind, closer);
                }
                if self.peek_type(1) == TokenType::LParen && self.peek_type(2) == TokenType::RParen {
                    return self.parse_function_def();
                }
                self.parse_simple_command()
            }
            TokenType::Word | TokenType::Redirect | TokenType::Heredoc => self.parse_simple_command(),
            TokenType::Eof => Err(self.error("syntax error: unexpected end of file")),
            _ => Err(self.error(format!("syntax error near unexpected token `{}'", tok.value))),
        }
    }

    fn parse_simple_command(&mut self) -> Result<RawNode, ParseException> {
        let mut parts: Vec<RawNode> = Vec::new();
        let mut seen_word = false;

        loop {
            match self.current().token_type {
                TokenType::Word => {
                    let tok = self.advance();
                    if !seen_word && is_assignment(self.source_of(&tok)) {
                        let span = tok.span();
                        parts.push(RawNode::new(RawKind::Assignment, tok.value, tok.parts, span));
                    } else {
                        seen_word = true;
                        parts.push(tok.into_word_node());
                    }
                }
                TokenType::Redirect | TokenType::Heredoc => {
                    let op = self.advance();
                    if !self.check(TokenType::Word) {
                        return Err(self.error(format!("syntax error near `{}'", op.value)));
                    }
                    let target = self.advance().into_word_node();
                    let kind = if op.token_type == TokenType::Heredoc {
                        RawKind::Heredoc
                    } else {
                        RawKind::Redirect
                    };
                    let span = Span::new(op.start, target.span.end);
                    parts.push(RawNode::new(kind, op.value, vec![target], span));
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err(self.error("syntax error: expected command"));
        }
        Ok(RawNode::command(parts))
    }

    /// Consume a compound command up to its closing reserved word. The body
    /// is not kept; the normalizer rejects these nodes by kind.
    fn parse_compound(&mut self, kind: RawKind, closer: &'static str) -> Result<RawNode, ParseException> {
        let open = self.advance();
        let mut expected = vec![closer];

        while let Some(&want) = expected.last() {
            let tok = self.advance();
            match tok.token_type {
                TokenType::Eof => return Err(self.error("syntax error: unexpected end of file")),
                TokenType::Word if !tok.quoted => {
                    if tok.value == want {
                        expected.pop();
                        if expected.is_empty() {
                            let span = Span::new(open.start, tok.end);
                            return Ok(RawNode::new(kind, open.value, Vec::new(), span));
                        }
                    } else if let Some((_, inner)) = closer_for(&tok.value) {
                        expected.push(inner);
                    }
                }
                _ => {}
            }
        }
        Err(self.error("syntax error: unexpected end of file"))
    }

    /// `name() body` or `function name [()] body`
    fn parse_function_def(&mut self) -> Result<RawNode, ParseException> {
        let mut name = self.advance();
        if name.value == "function" && !name.quoted {
            let start = name.start;
            name = self.advance();
            name.start = start;
        }
        if self.check(TokenType::LParen) {
            self.advance(); // (
            if !self.check(TokenType::RParen) {
                return Err(self.error("syntax error near unexpected token `('"));
            }
            self.advance(); // )
        }
        self.skip_newlines();
        let body = self.parse_command()?;
        let span = Span::new(name.start, body.span.end);
        Ok(RawNode::new(RawKind::Function, name.value, Vec::new(), span))
    }

    fn parse_subshell(&mut self) -> Result<RawNode, ParseException> {
        let open = self.advance();
        let mut depth = 1usize;
        loop {
            let tok = self.advance();
            match tok.token_type {
                TokenType::Eof => return Err(self.error("syntax error: unexpected end of file")),
                TokenType::LParen => depth += 1,
                TokenType::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let span = Span::new(open.start, tok.end);
                        return Ok(RawNode::new(RawKind::Subshell, "(", Vec::new(), span));
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command line into a raw parse tree.
pub fn parse(input: &str) -> Result<RawNode, ParseException> {
    Parser::new().parse(input)
}
