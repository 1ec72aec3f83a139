//! Parser state and token cursor.
//!
//! The grammar is parsed by ordered alternatives with no recovery: the
//! first statement that fails aborts the parse. Failures are reported at
//! the rightmost byte offset any alternative reached, together with the
//! set of tokens that would have allowed the parse to continue there.

use crux_lexer::{Token, TokenKind};
use crux_types::ast::{Ident, Num, Program};
use crux_types::{SourceFile, Span, SyntaxError};

/// Maximum expression nesting depth before the parser gives up.
pub(crate) const MAX_DEPTH: usize = 64;

/// Rightmost failure seen so far.
struct Failure {
    position: usize,
    found: String,
    expected: Vec<String>,
}

pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    furthest: Failure,
    pub(crate) depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let found = tokens
            .first()
            .map(|t| describe(&t.kind))
            .unwrap_or_else(|| "end of input".to_string());
        Parser {
            tokens,
            pos: 0,
            source_file,
            furthest: Failure {
                position: 0,
                found,
                expected: Vec::new(),
            },
            depth: 0,
        }
    }

    /// Parses a complete program, consuming the parser.
    pub fn parse(mut self) -> crux_types::Result<Program> {
        match self.parse_program() {
            Some(program) => Ok(program),
            None => Err(self.syntax_error()),
        }
    }

    // ── Token Cursor ────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// The token kind `offset` positions ahead, saturating at Eof.
    pub(crate) fn look_ahead(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Consumes and returns the current token. Never moves past Eof.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn source_len(&self) -> usize {
        self.source_file.source.len()
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(0))
    }

    /// Discriminant-level match against the current token.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    /// Consumes the current token when it matches.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Runs `parse` one nesting level down. Every recursion point in the
    /// grammar passes through here, bounding the parse stack on inputs
    /// like an unclosed run of opening brackets.
    pub(crate) fn descend<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return self.fail("shallower nesting");
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Failure Tracking ────────────────────────────────────────────────

    /// Consumes the current token when it matches; otherwise records
    /// `what` as expected here and fails.
    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.fail(what)
        }
    }

    /// Records that `what` would have been accepted at the current token.
    /// Only the rightmost failure position is kept; ties accumulate.
    pub(crate) fn note_expected(&mut self, what: &str) {
        let position = self.peek().span.start;
        if position > self.furthest.position {
            self.furthest = Failure {
                position,
                found: describe(self.peek_kind()),
                expected: vec![what.to_string()],
            };
        } else if position == self.furthest.position
            && !self.furthest.expected.iter().any(|e| e == what)
        {
            self.furthest.found = describe(self.peek_kind());
            self.furthest.expected.push(what.to_string());
        }
    }

    pub(crate) fn fail<T>(&mut self, what: &str) -> Option<T> {
        self.note_expected(what);
        None
    }

    fn syntax_error(&self) -> SyntaxError {
        SyntaxError::new(
            format!("unexpected {}", self.furthest.found),
            self.furthest.position,
            self.furthest.expected.clone(),
            self.source_file,
        )
    }

    // ── Shared Leaf Parsers ─────────────────────────────────────────────

    pub(crate) fn parse_ident(&mut self) -> Option<Ident> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => self.fail("an identifier"),
        }
    }

    pub(crate) fn parse_num(&mut self) -> Option<Num> {
        match self.peek_kind() {
            TokenKind::Number(value) => {
                let value = *value;
                let span = self.advance().span;
                Some(Num::new(value, span))
            }
            _ => self.fail("a number"),
        }
    }

    /// An optional `$hex` seed, merged into `span` when present.
    pub(crate) fn eat_seed(&mut self, span: &mut Span) -> Option<String> {
        if let TokenKind::Seed(hex) = self.peek_kind() {
            let hex = hex.clone();
            *span = span.merge(self.advance().span);
            return Some(hex);
        }
        None
    }
}

/// How a token reads inside an error message.
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Newline => "newline".to_string(),
        other => format!("'{other}'"),
    }
}
