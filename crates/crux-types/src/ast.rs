//! Abstract syntax tree for Crux programs.
//!
//! Every node carries a [`Span`] pointing back into the source text.
//! Large recursive types are boxed to keep enum variants small.

use crate::Span;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Top Level
// ═══════════════════════════════════════════════════════════════════════

/// A complete program: one or more sections separated by `!` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub sections: Vec<Section>,
    pub span: Span,
}

/// A run of statements between section breaks. The section's result is
/// the value of its last bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A single newline-terminated statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Statement { kind, span }
    }

    /// The expression carried by this statement, if any.
    pub fn expr(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Assign { expr, .. }
            | StatementKind::Macro { expr, .. }
            | StatementKind::Expr(expr) => Some(expr),
            StatementKind::OpAlias { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `name := expr`: evaluate once, bind the resulting mot.
    Assign { name: Ident, expr: Expr },
    /// `name = expr`: bind the expression itself; re-evaluated at each
    /// reference with the environment captured here.
    Macro { name: Ident, expr: Expr },
    /// `name = *`: bind an operator synonym.
    OpAlias { name: Ident, op: BinOp },
    /// A bare expression; candidate for the section result.
    Expr(Expr),
}

// ═══════════════════════════════════════════════════════════════════════
// Identifiers and Numbers
// ═══════════════════════════════════════════════════════════════════════

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// A numeric literal with the span of its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Num {
    pub value: f64,
    pub span: Span,
}

impl Num {
    pub fn new(value: f64, span: Span) -> Self {
        Num { value, span }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Leaves ──────────────────────────────────────────────────────────
    /// `[0, 1:2, {0..3}]`: a bracketed mot literal.
    MotLit(Vec<MotEntry>),
    /// `0..3`: one unit pip per integer step, direction preserved.
    Range { start: Num, end: Num },
    /// `melody`: a reference to a bound name.
    Var(String),

    // ── Composition ─────────────────────────────────────────────────────
    /// `a * b`, `a .^ b`, `a m b`: a registered binary operator.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `a, b`: sequential concatenation.
    FollowedBy { left: Box<Expr>, right: Box<Expr> },
    /// `a/`, `a t`, `a:3`, `a\1`, `a z`: a postfix transform.
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    /// `(a)`: grouping.
    Paren(Box<Expr>),
    /// `@0 [1, 2] @3 [4]`: explicit slot placement; uncovered slots are
    /// filled with rest pips.
    AtIndex(Vec<AtEntry>),
    /// `{[0, 1], [2]}`: a random choice between expressions, with an
    /// optional `$hex` seed.
    Curly {
        options: Vec<Expr>,
        seed: Option<String>,
    },
}

/// A binary operator surface: its name and whether it was written in
/// the dot-prefixed cog form.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    /// `"*"`, `"^"`, `"->"`, `"~"`, or a named operator such as `"m"`.
    pub name: String,
    /// True for `.`, `.*`, `.^`, `.->`, `.~`, `.m`, and the rest of the
    /// dot-prefixed family.
    pub cog: bool,
}

impl BinOp {
    pub fn new(name: impl Into<String>, cog: bool) -> Self {
        BinOp {
            name: name.into(),
            cog,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cog {
            write!(f, ".{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A postfix transform. Counts are random values so `[0]:{1..3}` can
/// repeat a randomly chosen number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// `/`: divide every time scale by the operand's length.
    Subdivide,
    /// `t`: merge adjacent pips with equal step and tag.
    Tie,
    /// `: n`: concatenate the operand with itself `n` times.
    Repeat(RandNum),
    /// `\ n`: drop the trailing `n` pips.
    Drop(RandNum),
    /// `z`: read nested values column-wise into one flat mot.
    Zip,
}

/// One `@index value` entry of an [`ExprKind::AtIndex`] expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AtEntry {
    pub index: usize,
    pub value: Expr,
    pub span: Span,
}

// ═══════════════════════════════════════════════════════════════════════
// Mot Literal Entries
// ═══════════════════════════════════════════════════════════════════════

/// One comma-separated entry of a bracketed mot literal.
#[derive(Debug, Clone, PartialEq)]
pub enum MotEntry {
    /// A single pip value.
    Pip(PipLit),
    /// `0..3`: splices one unit pip per integer step.
    Range { start: Num, end: Num, span: Span },
    /// `[0, 1]`: a nested group that flattening will subdivide.
    Nested { entries: Vec<MotEntry>, span: Span },
}

impl MotEntry {
    pub fn span(&self) -> Span {
        match self {
            MotEntry::Pip(pip) => pip.span,
            MotEntry::Range { span, .. } | MotEntry::Nested { span, .. } => *span,
        }
    }
}

/// A literal pip: a step (possibly random), an optional time scale, and
/// an optional tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PipLit {
    pub step: RandNum,
    /// `None` means the unit time scale.
    pub time_scale: Option<Num>,
    pub tag: Option<String>,
    pub span: Span,
}

/// A numeric value that may be resolved randomly at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum RandNum {
    /// A plain literal number.
    Lit(Num),
    /// `{0..7}`: a uniformly chosen integer in the inclusive range.
    Range {
        start: Num,
        end: Num,
        seed: Option<String>,
        span: Span,
    },
    /// `{0, 3, 5}`: a uniformly chosen option.
    Choice {
        options: Vec<Num>,
        seed: Option<String>,
        span: Span,
    },
}

impl RandNum {
    pub fn span(&self) -> Span {
        match self {
            RandNum::Lit(num) => num.span,
            RandNum::Range { span, .. } | RandNum::Choice { span, .. } => *span,
        }
    }

    /// The seed token attached to this value, if any.
    pub fn seed(&self) -> Option<&str> {
        match self {
            RandNum::Lit(_) => None,
            RandNum::Range { seed, .. } | RandNum::Choice { seed, .. } => seed.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_display() {
        assert_eq!(BinOp::new("*", false).to_string(), "*");
        assert_eq!(BinOp::new("*", true).to_string(), ".*");
        assert_eq!(BinOp::new("m", true).to_string(), ".m");
        assert_eq!(BinOp::new("->", false).to_string(), "->");
    }

    #[test]
    fn test_statement_expr_accessor() {
        let span = Span::point(0);
        let expr = Expr::new(ExprKind::Var("a".into()), span);
        let stmt = Statement::new(StatementKind::Expr(expr.clone()), span);
        assert_eq!(stmt.expr(), Some(&expr));

        let alias = Statement::new(
            StatementKind::OpAlias {
                name: Ident::new("stack", span),
                op: BinOp::new("*", false),
            },
            span,
        );
        assert_eq!(alias.expr(), None);
    }

    #[test]
    fn test_randnum_span_covers_range() {
        let rn = RandNum::Range {
            start: Num::new(0.0, Span::new(1, 2)),
            end: Num::new(7.0, Span::new(4, 5)),
            seed: None,
            span: Span::new(0, 6),
        };
        assert_eq!(rn.span(), Span::new(0, 6));
        assert_eq!(rn.seed(), None);
    }
}
