//! The tokenizer.
//!
//! Turns input text into a flat token stream for the parser. Tokens carry
//! cooked payloads — string escapes are resolved here, so the parser and the
//! atom codec only ever see final text — plus a [`TextSpan`] for
//! diagnostics.
//!
//! String literals come in two forms that cook to the same payload:
//! escaped `"..."` (with `\" \\ \n \r \t \0 \uXXXX`) and verbatim `@"..."`
//! (internal quotes doubled, newlines allowed). Line (`//`) and block
//! (`/* */`) comments are skipped.
//!
//! Lexical failure is unrecoverable: an `InvalidToken` diagnostic is
//! recorded and [`lex`] returns `None`.

use crate::diag::{DiagCode, Diagnostics};
use crate::span::{TextPosition, TextSpan};

/// A lexed token's kind and payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Name(String),
    /// A string literal, cooked.
    Str(String),
    /// A character literal, cooked.
    CharLit(char),
    /// Numeric text: optional sign, digits, optional fraction and exponent.
    Number(String),
    LAngle,
    RAngle,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    /// The map opener `#[`.
    HashBracket,
    Equals,
    Comma,
    Dot,
    ColonColon,
    Eof,
}

impl TokenKind {
    /// A short rendering for diagnostic messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Name(name) => format!("name \"{}\"", name),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::CharLit(_) => "char literal".to_string(),
            TokenKind::Number(text) => format!("number {}", text),
            TokenKind::LAngle => "'<'".to_string(),
            TokenKind::RAngle => "'>'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::HashBracket => "'#['".to_string(),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::ColonColon => "'::'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextSpan,
}

/// Tokenizes `input`, recording lexical errors into `diags`.
///
/// On success the returned stream always ends with an `Eof` token.
pub fn lex(file: &str, input: &str, diags: &mut Diagnostics) -> Option<Vec<Token>> {
    Lexer::new(file, input).run(diags)
}

struct Lexer<'a> {
    file: &'a str,
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a str, input: &'a str) -> Self {
        Lexer {
            file,
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn position(&self) -> (usize, TextPosition) {
        (self.pos, TextPosition::new(self.line, self.column))
    }

    fn span_from(&self, start: (usize, TextPosition)) -> TextSpan {
        let (offset, start_pos) = start;
        TextSpan::new(
            self.file,
            offset,
            self.pos - offset,
            start_pos,
            TextPosition::new(self.line, self.column),
        )
    }

    fn error(&self, diags: &mut Diagnostics, start: (usize, TextPosition), message: String) {
        diags.error(DiagCode::InvalidToken, message, self.span_from(start));
    }

    fn run(mut self, diags: &mut Diagnostics) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            if !self.skip_trivia(diags) {
                return None;
            }
            let start = self.position();
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        span: self.span_from(start),
                    });
                    return Some(tokens);
                }
            };
            let kind = if c.is_ascii_alphabetic() || c == '_' {
                self.lex_name()
            } else if c.is_ascii_digit()
                || ((c == '-' || c == '+') && self.peek_second().is_some_and(|d| d.is_ascii_digit()))
            {
                self.lex_number()
            } else if c == '"' {
                self.bump();
                match self.lex_escaped_string(diags, start) {
                    Some(text) => TokenKind::Str(text),
                    None => return None,
                }
            } else if c == '@' {
                self.bump();
                if self.peek() != Some('"') {
                    self.error(diags, start, "expected '\"' after '@'".to_string());
                    return None;
                }
                self.bump();
                match self.lex_verbatim_string(diags, start) {
                    Some(text) => TokenKind::Str(text),
                    None => return None,
                }
            } else if c == '\'' {
                self.bump();
                match self.lex_char(diags, start) {
                    Some(c) => TokenKind::CharLit(c),
                    None => return None,
                }
            } else {
                self.bump();
                match c {
                    '<' => TokenKind::LAngle,
                    '>' => TokenKind::RAngle,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '=' => TokenKind::Equals,
                    ',' => TokenKind::Comma,
                    '.' => TokenKind::Dot,
                    '#' => {
                        if self.peek() == Some('[') {
                            self.bump();
                            TokenKind::HashBracket
                        } else {
                            self.error(diags, start, "expected '[' after '#'".to_string());
                            return None;
                        }
                    }
                    ':' => {
                        if self.peek() == Some(':') {
                            self.bump();
                            TokenKind::ColonColon
                        } else {
                            self.error(diags, start, "expected ':' after ':'".to_string());
                            return None;
                        }
                    }
                    other => {
                        self.error(diags, start, format!("unexpected character '{}'", other));
                        return None;
                    }
                }
            };
            tokens.push(Token {
                kind,
                span: self.span_from(start),
            });
        }
    }

    /// Skips whitespace and comments. Returns `false` on an unterminated
    /// block comment.
    fn skip_trivia(&mut self, diags: &mut Diagnostics) -> bool {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let start = self.position();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.error(diags, start, "unterminated block comment".to_string());
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }

    fn lex_name(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Name(self.input[start..self.pos].to_string())
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut ahead = self.input[self.pos..].chars();
            ahead.next();
            let mut next = ahead.next();
            if matches!(next, Some('-') | Some('+')) {
                next = ahead.next();
            }
            if next.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.peek(), Some('-') | Some('+')) {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        TokenKind::Number(self.input[start..self.pos].to_string())
    }

    fn lex_escaped_string(
        &mut self,
        diags: &mut Diagnostics,
        start: (usize, TextPosition),
    ) -> Option<String> {
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Some(text),
                Some('\\') => match self.lex_escape(diags, start) {
                    Some(c) => text.push(c),
                    None => return None,
                },
                Some('\n') | None => {
                    self.error(diags, start, "unterminated string literal".to_string());
                    return None;
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn lex_verbatim_string(
        &mut self,
        diags: &mut Diagnostics,
        start: (usize, TextPosition),
    ) -> Option<String> {
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.bump();
                        text.push('"');
                    } else {
                        return Some(text);
                    }
                }
                Some(c) => text.push(c),
                None => {
                    self.error(diags, start, "unterminated string literal".to_string());
                    return None;
                }
            }
        }
    }

    fn lex_char(&mut self, diags: &mut Diagnostics, start: (usize, TextPosition)) -> Option<char> {
        let c = match self.bump() {
            Some('\\') => self.lex_escape(diags, start)?,
            Some('\'') | Some('\n') | None => {
                self.error(diags, start, "empty or unterminated char literal".to_string());
                return None;
            }
            Some(c) => c,
        };
        if self.bump() == Some('\'') {
            Some(c)
        } else {
            self.error(diags, start, "unterminated char literal".to_string());
            None
        }
    }

    fn lex_escape(&mut self, diags: &mut Diagnostics, start: (usize, TextPosition)) -> Option<char> {
        match self.bump() {
            Some('"') => Some('"'),
            Some('\'') => Some('\''),
            Some('\\') => Some('\\'),
            Some('n') => Some('\n'),
            Some('r') => Some('\r'),
            Some('t') => Some('\t'),
            Some('0') => Some('\0'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self.bump().and_then(|c| c.to_digit(16));
                    match digit {
                        Some(d) => code = code * 16 + d,
                        None => {
                            self.error(
                                diags,
                                start,
                                "expected four hex digits after '\\u'".to_string(),
                            );
                            return None;
                        }
                    }
                }
                match char::from_u32(code) {
                    Some(c) => Some(c),
                    None => {
                        self.error(diags, start, "invalid unicode escape".to_string());
                        None
                    }
                }
            }
            other => {
                let shown = other.map(|c| c.to_string()).unwrap_or_default();
                self.error(diags, start, format!("invalid escape '\\{}'", shown));
                None
            }
        }
    }
}
