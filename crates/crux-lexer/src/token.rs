//! Token definitions for the Crux lexer.

use crux_types::Span;
use std::fmt;

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ────────────────────────────────────────────────────────
    /// `42`, `3.5`, `-2`
    Number(f64),
    /// `melody`, `m`, `t`: names, named operators, and postfix letters
    Ident(String),
    /// `$1f`: a hex seed suffix
    Seed(String),

    // ── Delimiters ──────────────────────────────────────────────────────
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // ── Punctuation ─────────────────────────────────────────────────────
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `:=`
    ColonEq,
    /// `=`
    Eq,
    /// `|`
    Pipe,
    /// `\`
    Backslash,
    /// `/`
    Slash,
    /// `+`
    Plus,
    /// `@`
    At,
    /// `_`
    Underscore,
    /// `..`
    DotDot,

    // ── Operators ───────────────────────────────────────────────────────
    /// `*`
    Star,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `->`
    Arrow,
    /// `.`: the cog form of `*`
    Dot,
    /// `.*`
    CogStar,
    /// `.^`
    CogCaret,
    /// `.~`
    CogTilde,
    /// `.->`
    CogArrow,
    /// `.m`, `.j`, …: a dot-prefixed named operator
    CogIdent(String),

    // ── Layout ──────────────────────────────────────────────────────────
    /// `!`: a section break
    SectionBreak,
    Newline,
    Eof,
}

impl TokenKind {
    /// Maps operator tokens to `(name, cog)` for registry lookup.
    /// The bare cog dot resolves to the `*` combine.
    pub fn op_name(&self) -> Option<(&str, bool)> {
        match self {
            TokenKind::Star => Some(("*", false)),
            TokenKind::Caret => Some(("^", false)),
            TokenKind::Tilde => Some(("~", false)),
            TokenKind::Arrow => Some(("->", false)),
            TokenKind::Dot | TokenKind::CogStar => Some(("*", true)),
            TokenKind::CogCaret => Some(("^", true)),
            TokenKind::CogTilde => Some(("~", true)),
            TokenKind::CogArrow => Some(("->", true)),
            TokenKind::CogIdent(name) => Some((name, true)),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::Seed(hex) => write!(f, "${hex}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::ColonEq => write!(f, ":="),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Backslash => write!(f, "\\"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::At => write!(f, "@"),
            TokenKind::Underscore => write!(f, "_"),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Tilde => write!(f, "~"),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::CogStar => write!(f, ".*"),
            TokenKind::CogCaret => write!(f, ".^"),
            TokenKind::CogTilde => write!(f, ".~"),
            TokenKind::CogArrow => write!(f, ".->"),
            TokenKind::CogIdent(name) => write!(f, ".{name}"),
            TokenKind::SectionBreak => write!(f, "!"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_operators() {
        assert_eq!(TokenKind::Star.to_string(), "*");
        assert_eq!(TokenKind::Arrow.to_string(), "->");
        assert_eq!(TokenKind::CogCaret.to_string(), ".^");
        assert_eq!(TokenKind::CogIdent("m".into()).to_string(), ".m");
        assert_eq!(TokenKind::DotDot.to_string(), "..");
    }

    #[test]
    fn test_display_layout() {
        assert_eq!(TokenKind::Newline.to_string(), "newline");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
        assert_eq!(TokenKind::SectionBreak.to_string(), "!");
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(TokenKind::Number(3.5).to_string(), "3.5");
        assert_eq!(TokenKind::Seed("1f".into()).to_string(), "$1f");
        assert_eq!(TokenKind::Ident("melody".into()).to_string(), "melody");
    }

    #[test]
    fn test_op_name_resolution() {
        assert_eq!(TokenKind::Star.op_name(), Some(("*", false)));
        assert_eq!(TokenKind::Dot.op_name(), Some(("*", true)));
        assert_eq!(TokenKind::CogStar.op_name(), Some(("*", true)));
        assert_eq!(TokenKind::CogArrow.op_name(), Some(("->", true)));
        assert_eq!(
            TokenKind::CogIdent("j".into()).op_name(),
            Some(("j", true))
        );
        assert_eq!(TokenKind::Comma.op_name(), None);
        assert_eq!(TokenKind::Ident("m".into()).op_name(), None);
    }
}
