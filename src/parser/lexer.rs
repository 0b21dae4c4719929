//! Lexer for Shell Commands
//!
//! The lexer tokenizes a command line into a stream of tokens that the parser
//! consumes. It handles:
//! - Operators and delimiters
//! - Words (with quoting rules and escapes)
//! - Command, process and parameter substitutions inside words
//! - Comments
//!
//! All positions are byte offsets into the outermost command text, so a
//! substitution body lexed on its own reports spans in outer coordinates.

use crate::ast::types::{RawKind, RawNode, Span};
use crate::parser::parser::Parser;
use crate::parser::types::{ParseException, MAX_PARSER_DEPTH};

/// Token types for the shell lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // End of input
    Eof,

    // Separators
    Newline,
    Semicolon,
    Amp, // &

    // Operators
    Pipe,    // |
    PipeAmp, // |&
    AndAnd,  // &&
    OrOr,    // ||

    // Redirections (value holds the operator, including any fd prefix)
    Redirect,
    Heredoc, // << and <<-

    // Grouping
    LParen, // (
    RParen, // )

    Word,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Newline => "NEWLINE",
            Self::Semicolon => ";",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::PipeAmp => "|&",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Redirect => "REDIRECT",
            Self::Heredoc => "<<",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Word => "WORD",
        }
    }

    /// Separators that end a pipeline inside a list.
    pub fn is_list_operator(&self) -> bool {
        matches!(
            self,
            Self::Semicolon | Self::Amp | Self::AndAnd | Self::OrOr | Self::Newline
        )
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Unquoted value for words, operator text otherwise
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// Expansions found inside a word
    pub parts: Vec<RawNode>,
    /// Whether any part of the word was quoted or escaped
    pub quoted: bool,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            token_type,
            value: value.into(),
            start,
            end,
            parts: Vec::new(),
            quoted: false,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Convert a word token into a raw word node.
    pub fn into_word_node(self) -> RawNode {
        let span = self.span();
        RawNode::new(RawKind::Word, self.value, self.parts, span)
    }
}

/// Redirection operators, longest first.
const REDIRECT_OPS: &[&str] = &["&>>", "<<<", ">>", ">&", ">|", "<>", "<&", "&>", ">", "<"];

/// Check if a character ends a word token
fn is_word_boundary(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | ';' | '&' | '|' | '(' | ')' | '<' | '>')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lexer over a (possibly nested) command text
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Offset of `input` inside the outermost command text
    base: usize,
    depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::nested(input, 0, 0)
    }

    /// Lexer for a substitution body located at `base` in the outer text.
    pub fn nested(input: &'a str, base: usize, depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            base,
            depth,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseException> {
        loop {
            self.skip_whitespace();
            match self.current() {
                None => break,
                Some('#') => self.skip_comment(),
                Some(_) => {
                    let token = self.next_token()?;
                    self.tokens.push(token);
                }
            }
        }

        let end = self.base + self.pos;
        self.tokens.push(Token::new(TokenType::Eof, "", end, end));
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseException {
        ParseException::at(message, self.input, self.pos)
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.current() {
                Some(' ') | Some('\t') => self.pos += 1,
                // Line continuation
                Some('\\') if self.peek(1) == Some('\n') => self.pos += 2,
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseException> {
        let start = self.pos;
        let rest = self.rest();
        let c0 = self.current().unwrap_or('\0');
        let c1 = self.peek(1);

        let op = |tt: TokenType, text: &str| (tt, text.len());
        let matched = if c0 == '\n' {
            Some(op(TokenType::Newline, "\n"))
        } else if rest.starts_with("<<<") {
            Some(op(TokenType::Redirect, "<<<"))
        } else if rest.starts_with("<<-") {
            Some(op(TokenType::Heredoc, "<<-"))
        } else if rest.starts_with("<<") {
            Some(op(TokenType::Heredoc, "<<"))
        } else if (c0 == '<' || c0 == '>') && c1 == Some('(') {
            // Process substitution starts a word
            None
        } else if rest.starts_with("&&") {
            Some(op(TokenType::AndAnd, "&&"))
        } else if rest.starts_with("||") {
            Some(op(TokenType::OrOr, "||"))
        } else if rest.starts_with("|&") {
            Some(op(TokenType::PipeAmp, "|&"))
        } else if let Some(r) = REDIRECT_OPS.iter().find(|r| rest.starts_with(**r)) {
            Some(op(TokenType::Redirect, *r))
        } else {
            match c0 {
                '|' => Some(op(TokenType::Pipe, "|")),
                '&' => Some(op(TokenType::Amp, "&")),
                ';' => {
                    if rest.starts_with(";;") {
                        Some(op(TokenType::Semicolon, ";;"))
                    } else {
                        Some(op(TokenType::Semicolon, ";"))
                    }
                }
                '(' => Some(op(TokenType::LParen, "(")),
                ')' => Some(op(TokenType::RParen, ")")),
                _ => None,
            }
        };

        if let Some((token_type, len)) = matched {
            self.pos += len;
            let value = &self.input[start..self.pos];
            return Ok(Token::new(token_type, value, self.base + start, self.base + self.pos));
        }

        let word = self.read_word()?;

        // fd-prefixed redirection: 2>file, 2>&1
        if !word.quoted
            && word.parts.is_empty()
            && !word.value.is_empty()
            && word.value.chars().all(|c| c.is_ascii_digit())
        {
            if let Some(r) = REDIRECT_OPS.iter().find(|r| self.rest().starts_with(**r)) {
                self.pos += r.len();
                let value = &self.input[start..self.pos];
                return Ok(Token::new(TokenType::Redirect, value, self.base + start, self.base + self.pos));
            }
        }

        Ok(word)
    }

    fn read_word(&mut self) -> Result<Token, ParseException> {
        let start = self.pos;
        let mut value = String::new();
        let mut parts = Vec::new();
        let mut quoted = false;

        while let Some(c) = self.current() {
            match c {
                '<' | '>' if self.pos == start && self.peek(1) == Some('(') => {
                    self.read_process_substitution(&mut value, &mut parts)?;
                }
                c if is_word_boundary(c) => break,
                '\\' => {
                    self.pos += 1;
                    quoted = true;
                    match self.bump() {
                        Some('\n') => {}
                        Some(next) => value.push(next),
                        None => value.push('\\'),
                    }
                }
                '\'' => {
                    quoted = true;
                    self.pos += 1;
                    let close = self
                        .rest()
                        .find('\'')
                        .ok_or_else(|| self.error("unexpected EOF while looking for matching `''"))?;
                    value.push_str(&self.rest()[..close]);
                    self.pos += close + 1;
                }
                '"' => {
                    quoted = true;
                    self.read_double_quoted(&mut value, &mut parts)?;
                }
                '$' => self.read_dollar(&mut value, &mut parts)?,
                '`' => self.read_backtick(&mut value, &mut parts)?,
                '~' if self.pos == start => self.read_tilde(&mut value, &mut parts),
                _ => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        let mut token = Token::new(TokenType::Word, value, self.base + start, self.base + self.pos);
        token.parts = parts;
        token.quoted = quoted;
        Ok(token)
    }

    fn read_double_quoted(&mut self, value: &mut String, parts: &mut Vec<RawNode>) -> Result<(), ParseException> {
        self.pos += 1; // opening quote
        loop {
            match self.current() {
                None => return Err(self.error("unexpected EOF while looking for matching `\"'")),
                Some('"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.bump() {
                        Some(n @ ('$' | '`' | '"' | '\\')) => value.push(n),
                        Some('\n') => {}
                        Some(n) => {
                            value.push('\\');
                            value.push(n);
                        }
                        None => return Err(self.error("unexpected EOF while looking for matching `\"'")),
                    }
                }
                Some('$') => self.read_dollar(value, parts)?,
                Some('`') => self.read_backtick(value, parts)?,
                Some(c) => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// `$(...)`, `$((...))`, `${...}`, `$name`, `$1`, `$?` or a literal `$`.
    fn read_dollar(&mut self, value: &mut String, parts: &mut Vec<RawNode>) -> Result<(), ParseException> {
        let start = self.pos;
        match self.peek(1) {
            Some('(') if self.peek(2) == Some('(') => {
                // Arithmetic expansion is kept opaque
                let close = self.find_matching_paren(start + 2)?;
                self.pos = close + 1;
                self.push_part(RawKind::Parameter, start, value, parts, Vec::new());
            }
            Some('(') => {
                let body_start = start + 2;
                let close = self.find_matching_paren(body_start)?;
                let inner = self.parse_body(body_start, close)?;
                self.pos = close + 1;
                self.push_part(RawKind::CommandSubstitution, start, value, parts, vec![inner]);
            }
            Some('{') => {
                let close = self.rest()[2..]
                    .find('}')
                    .map(|i| start + 2 + i)
                    .ok_or_else(|| self.error("unexpected EOF while looking for matching `}'"))?;
                self.pos = close + 1;
                self.push_part(RawKind::Parameter, start, value, parts, Vec::new());
            }
            Some(c) if is_name_char(c) => {
                self.pos += 1;
                if c.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    while self.current().map_or(false, is_name_char) {
                        self.pos += 1;
                    }
                }
                self.push_part(RawKind::Parameter, start, value, parts, Vec::new());
            }
            Some('?' | '@' | '*' | '#' | '$' | '!' | '-') => {
                self.pos += 2;
                self.push_part(RawKind::Parameter, start, value, parts, Vec::new());
            }
            _ => {
                value.push('$');
                self.pos += 1;
            }
        }
        Ok(())
    }

    fn read_backtick(&mut self, value: &mut String, parts: &mut Vec<RawNode>) -> Result<(), ParseException> {
        let start = self.pos;
        let body_start = start + 1;
        let mut i = body_start;
        let bytes = self.input.as_bytes();
        while i < bytes.len() && bytes[i] != b'`' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return Err(self.error("unexpected EOF while looking for matching ``'"));
        }
        let inner = self.parse_body(body_start, i)?;
        self.pos = i + 1;
        self.push_part(RawKind::CommandSubstitution, start, value, parts, vec![inner]);
        Ok(())
    }

    fn read_process_substitution(&mut self, value: &mut String, parts: &mut Vec<RawNode>) -> Result<(), ParseException> {
        let start = self.pos;
        let body_start = start + 2;
        let close = self.find_matching_paren(body_start)?;
        let inner = self.parse_body(body_start, close)?;
        self.pos = close + 1;
        self.push_part(RawKind::ProcessSubstitution, start, value, parts, vec![inner]);
        Ok(())
    }

    fn read_tilde(&mut self, value: &mut String, parts: &mut Vec<RawNode>) {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.current() {
            if c == '/' || is_word_boundary(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.push_part(RawKind::Tilde, start, value, parts, Vec::new());
    }

    /// Record the source text `start..pos` both in the word value and as a part.
    fn push_part(
        &self,
        kind: RawKind,
        start: usize,
        value: &mut String,
        parts: &mut Vec<RawNode>,
        inner: Vec<RawNode>,
    ) {
        let text = &self.input[start..self.pos];
        value.push_str(text);
        let span = Span::new(self.base + start, self.base + self.pos);
        parts.push(RawNode::new(kind, text, inner, span));
    }

    /// Index of the `)` closing a group whose body begins at `from`.
    fn find_matching_paren(&self, from: usize) -> Result<usize, ParseException> {
        let bytes = self.input.as_bytes();
        let mut depth = 1usize;
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'\'' => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'\'' {
                        i += 1;
                    }
                }
                b'"' => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'"' {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Err(self.error("unexpected EOF while looking for matching `)'"))
    }

    /// Parse a substitution body `input[from..to]` into a raw tree.
    fn parse_body(&self, from: usize, to: usize) -> Result<RawNode, ParseException> {
        if self.depth >= MAX_PARSER_DEPTH {
            return Err(self.error("substitutions nested too deeply"));
        }
        let body = &self.input[from..to];
        Parser::new().parse_nested(body, self.base + from, self.depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_simple_words() {
        let tokens = Lexer::new("ls -la /tmp").tokenize().unwrap();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["ls", "-la", "/tmp", ""]);
        assert_eq!(tokens[2].span(), Span::new(7, 11));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            types("a | b && c; d &"),
            vec![
                TokenType::Word,
                TokenType::Pipe,
                TokenType::Word,
                TokenType::AndAnd,
                TokenType::Word,
                TokenType::Semicolon,
                TokenType::Word,
                TokenType::Amp,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_quotes_keep_source_span() {
        let tokens = Lexer::new("find . -name '*.txt'").tokenize().unwrap();
        let pattern = &tokens[3];
        assert_eq!(pattern.value, "*.txt");
        assert_eq!(pattern.end - pattern.start, pattern.value.len() + 2);
        assert!(pattern.quoted);
    }

    #[test]
    fn test_escaped_paren_and_semicolon() {
        let tokens = Lexer::new(r"find . \( -exec rm {} \;").tokenize().unwrap();
        assert_eq!(tokens[2].value, "(");
        assert_eq!(tokens[2].token_type, TokenType::Word);
        assert_eq!(tokens[6].value, ";");
        assert_eq!(tokens[6].token_type, TokenType::Word);
    }

    #[test]
    fn test_fd_redirect() {
        let tokens = Lexer::new("cmd 2>&1").tokenize().unwrap();
        assert_eq!(tokens[1].token_type, TokenType::Redirect);
        assert_eq!(tokens[1].value, "2>&");
        assert_eq!(tokens[2].value, "1");
    }

    #[test]
    fn test_command_substitution_part() {
        let tokens = Lexer::new("echo $(date +%s)").tokenize().unwrap();
        let word = &tokens[1];
        assert_eq!(word.parts.len(), 1);
        assert_eq!(word.parts[0].kind, RawKind::CommandSubstitution);
        let inner = &word.parts[0].parts[0];
        assert_eq!(inner.kind, RawKind::Command);
        assert_eq!(inner.parts[0].span, Span::new(7, 11));
    }

    #[test]
    fn test_process_substitution_word() {
        let tokens = Lexer::new("diff <(ls a) <(ls b)").tokenize().unwrap();
        assert_eq!(tokens[1].parts[0].kind, RawKind::ProcessSubstitution);
        assert!(tokens[1].value.starts_with("<("));
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(Lexer::new("echo 'abc").tokenize().is_err());
        assert!(Lexer::new("echo \"abc").tokenize().is_err());
        assert!(Lexer::new("echo $(ls").tokenize().is_err());
    }

    #[test]
    fn test_comment_skipped() {
        assert_eq!(types("ls # list"), vec![TokenType::Word, TokenType::Eof]);
    }
}
