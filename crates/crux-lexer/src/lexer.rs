//! Tokenizer for Crux source text.
//!
//! Scans raw bytes into a token stream:
//! - Numbers, identifiers, and `$hex` seed suffixes
//! - Operator symbols, including the dot-prefixed cog forms
//! - `//` line comments (skipped)
//! - Newlines and `!` section breaks as explicit tokens
//!
//! Lexing stops at the first failure; errors carry the byte offset of
//! the offending character.

use crate::token::{Token, TokenKind};
use crux_types::{Result, SourceFile, Span, SyntaxError};

pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Lexer {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
        }
    }

    /// Scans the whole file. The returned stream always ends with an
    /// [`TokenKind::Eof`] token.
    pub fn lex(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks();
            if self.at_end() {
                break;
            }
            tokens.push(self.scan_token()?);
        }
        tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos)));
        Ok(tokens)
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn error(&self, message: impl Into<String>, position: usize) -> SyntaxError {
        SyntaxError::new(message, position, vec![], self.source_file)
    }

    /// Skips spaces, tabs, carriage returns, and `//` comments. Newlines
    /// are significant and stay in the stream.
    fn skip_blanks(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    // ── Scanning ────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Result<Token> {
        let start = self.pos;
        let single = |kind, me: &Self| Ok(Token::new(kind, Span::new(start, me.pos)));

        match self.peek() {
            Some(b'\n') => {
                self.advance();
                single(TokenKind::Newline, self)
            }
            Some(b'!') => {
                self.advance();
                single(TokenKind::SectionBreak, self)
            }
            Some(b'0'..=b'9') => self.scan_number(),
            Some(b'-') => {
                if self.peek_at(1) == Some(b'>') {
                    self.advance();
                    self.advance();
                    single(TokenKind::Arrow, self)
                } else if matches!(self.peek_at(1), Some(b'0'..=b'9')) {
                    self.scan_number()
                } else {
                    Err(self.error("unexpected character '-'", start))
                }
            }
            Some(b'a'..=b'z' | b'A'..=b'Z') => Ok(self.scan_identifier()),
            Some(b'_') => {
                if matches!(self.peek_at(1), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
                    Ok(self.scan_identifier())
                } else {
                    self.advance();
                    single(TokenKind::Underscore, self)
                }
            }
            Some(b'$') => self.scan_seed(),
            Some(b'.') => Ok(self.scan_dot()),
            Some(b':') => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::ColonEq, self)
                } else {
                    single(TokenKind::Colon, self)
                }
            }
            Some(b'=') => {
                self.advance();
                single(TokenKind::Eq, self)
            }
            Some(b'[') => {
                self.advance();
                single(TokenKind::LBracket, self)
            }
            Some(b']') => {
                self.advance();
                single(TokenKind::RBracket, self)
            }
            Some(b'(') => {
                self.advance();
                single(TokenKind::LParen, self)
            }
            Some(b')') => {
                self.advance();
                single(TokenKind::RParen, self)
            }
            Some(b'{') => {
                self.advance();
                single(TokenKind::LBrace, self)
            }
            Some(b'}') => {
                self.advance();
                single(TokenKind::RBrace, self)
            }
            Some(b',') => {
                self.advance();
                single(TokenKind::Comma, self)
            }
            Some(b'|') => {
                self.advance();
                single(TokenKind::Pipe, self)
            }
            Some(b'\\') => {
                self.advance();
                single(TokenKind::Backslash, self)
            }
            Some(b'/') => {
                self.advance();
                single(TokenKind::Slash, self)
            }
            Some(b'+') => {
                self.advance();
                single(TokenKind::Plus, self)
            }
            Some(b'*') => {
                self.advance();
                single(TokenKind::Star, self)
            }
            Some(b'^') => {
                self.advance();
                single(TokenKind::Caret, self)
            }
            Some(b'~') => {
                self.advance();
                single(TokenKind::Tilde, self)
            }
            Some(b'@') => {
                self.advance();
                single(TokenKind::At, self)
            }
            Some(_) => {
                let ch = self.source_file.source[start..]
                    .chars()
                    .next()
                    .unwrap_or('?');
                Err(self.error(format!("unexpected character '{ch}'"), start))
            }
            None => single(TokenKind::Eof, self),
        }
    }

    /// Scans an integer or decimal, with an optional leading minus.
    /// A decimal point must be followed by a digit, so `0..3` keeps its
    /// range dots and `12.` leaves the dot to the cog operator.
    fn scan_number(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.advance();
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        let text = &self.source_file.source[start..self.pos];
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid number '{text}'"), start))?;
        Ok(Token::new(TokenKind::Number(value), Span::new(start, self.pos)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.advance();
        }
        let name = self.source_file.source[start..self.pos].to_string();
        Token::new(TokenKind::Ident(name), Span::new(start, self.pos))
    }

    /// Scans `$` followed by one or more hex digits.
    fn scan_seed(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance();
        let hex_start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')
        ) {
            self.advance();
        }
        if self.pos == hex_start {
            return Err(self.error("expected hex digits after '$'", start));
        }
        let hex = self.source_file.source[hex_start..self.pos].to_string();
        Ok(Token::new(TokenKind::Seed(hex), Span::new(start, self.pos)))
    }

    /// Disambiguates the dot family: `..`, `.*`, `.^`, `.~`, `.->`,
    /// `.name`, or the bare cog dot.
    fn scan_dot(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        let kind = match self.peek() {
            Some(b'.') => {
                self.advance();
                TokenKind::DotDot
            }
            Some(b'*') => {
                self.advance();
                TokenKind::CogStar
            }
            Some(b'^') => {
                self.advance();
                TokenKind::CogCaret
            }
            Some(b'~') => {
                self.advance();
                TokenKind::CogTilde
            }
            Some(b'-') if self.peek_at(1) == Some(b'>') => {
                self.advance();
                self.advance();
                TokenKind::CogArrow
            }
            Some(b'a'..=b'z' | b'A'..=b'Z') => {
                let ident = self.scan_identifier();
                let span = Span::new(start, ident.span.end);
                let name = match ident.kind {
                    TokenKind::Ident(name) => name,
                    _ => String::new(),
                };
                return Token::new(TokenKind::CogIdent(name), span);
            }
            _ => TokenKind::Dot,
        };
        Token::new(kind, Span::new(start, self.pos))
    }
}
