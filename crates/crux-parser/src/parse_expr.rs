//! Expression parsing.
//!
//! Precedence, loosest to tightest:
//! 1. `,` sequential concatenation
//! 2. Binary operators (`*`, `^`, `->`, `~`, named letters, cog forms)
//! 3. Postfix transforms (`/`, `t`, `: n`, `\ n`, `z`)
//! 4. Primaries (literals, ranges, references, `(…)`, `{…}`, `@…`)
//!
//! All binary operators share one precedence level and associate left.

use crate::parser::Parser;
use crux_lexer::TokenKind;
use crux_types::ast::{AtEntry, BinOp, Expr, ExprKind, MotEntry, PipLit, PostfixOp, RandNum};
use crux_types::REST_TAG;

/// Tokens that can open a primary expression. Used to decide whether a
/// bare identifier is an operator or a reference.
fn starts_primary(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number(_)
            | TokenKind::Ident(_)
            | TokenKind::LBracket
            | TokenKind::LParen
            | TokenKind::LBrace
            | TokenKind::At
            | TokenKind::Underscore
    )
}

impl<'src> Parser<'src> {
    // ═══════════════════════════════════════════════════════════════════
    // Entry Point
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.descend(Self::parse_sequence)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ═══════════════════════════════════════════════════════════════════

    /// `Sequence = Combine { "," Combine }`
    fn parse_sequence(&mut self) -> Option<Expr> {
        let mut left = self.parse_combine()?;
        while self.eat(&TokenKind::Comma) {
            let right = self.parse_combine()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::FollowedBy {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// `Combine = Postfix { BinOp Postfix }`
    fn parse_combine(&mut self) -> Option<Expr> {
        let mut left = self.parse_postfix()?;
        while let Some(op) = self.peek_binary_op() {
            self.advance();
            let right = self.parse_postfix()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// An operator at the current token, without consuming it. A bare
    /// identifier counts only when a primary follows, so a trailing
    /// reference is never mistaken for an operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        if let Some((name, cog)) = self.peek_kind().op_name() {
            return Some(BinOp::new(name, cog));
        }
        if let TokenKind::Ident(name) = self.peek_kind() {
            if starts_primary(self.look_ahead(1)) {
                return Some(BinOp::new(name.clone(), false));
            }
        }
        None
    }

    /// `Postfix = Primary { "/" | "t" | "z" | ":" Count | "\" Count }`
    ///
    /// The letters `t` and `z` are claimed here, so they are not
    /// available as binary operator names.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Slash => {
                    self.advance();
                    PostfixOp::Subdivide
                }
                TokenKind::Ident(name) if name == "t" => {
                    self.advance();
                    PostfixOp::Tie
                }
                TokenKind::Ident(name) if name == "z" => {
                    self.advance();
                    PostfixOp::Zip
                }
                TokenKind::Colon => {
                    self.advance();
                    PostfixOp::Repeat(self.parse_count()?)
                }
                TokenKind::Backslash => {
                    self.advance();
                    PostfixOp::Drop(self.parse_count()?)
                }
                _ => break,
            };
            let span = expr.span.merge(self.previous_span());
            expr = Expr::new(
                ExprKind::Postfix {
                    op,
                    operand: Box::new(expr),
                },
                span,
            );
        }
        Some(expr)
    }

    /// A repeat or drop count: a literal or a braced random value.
    fn parse_count(&mut self) -> Option<RandNum> {
        match self.peek_kind() {
            TokenKind::Number(_) => Some(RandNum::Lit(self.parse_num()?)),
            TokenKind::LBrace => self.parse_rand_braces(),
            _ => self.fail("a count"),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Primaries
    // ═══════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.peek_kind() {
            TokenKind::LBracket => self.parse_mot_literal(),
            TokenKind::LParen => {
                let start = self.advance().span;
                let inner = self.parse_expression()?;
                let end = self.expect(&TokenKind::RParen, "')'")?.span;
                Some(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    start.merge(end),
                ))
            }
            TokenKind::LBrace => self.parse_curly(),
            TokenKind::At => self.parse_at_index(),
            TokenKind::Number(_) => self.parse_number_primary(),
            TokenKind::Underscore => {
                let span = self.advance().span;
                let pip = PipLit {
                    step: RandNum::Lit(crux_types::ast::Num::new(0.0, span)),
                    time_scale: None,
                    tag: Some(REST_TAG.to_string()),
                    span,
                };
                Some(Expr::new(ExprKind::MotLit(vec![MotEntry::Pip(pip)]), span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Expr::new(ExprKind::Var(name), span))
            }
            _ => self.fail("an expression"),
        }
    }

    /// A bare number is a one-pip mot; `a..b` is a static range, one
    /// unit pip per integer step.
    fn parse_number_primary(&mut self) -> Option<Expr> {
        let start = self.parse_num()?;
        if self.eat(&TokenKind::DotDot) {
            let end = self.parse_num()?;
            let span = start.span.merge(end.span);
            return Some(Expr::new(ExprKind::Range { start, end }, span));
        }
        let mut span = start.span;
        let mut time_scale = None;
        if self.eat(&TokenKind::Pipe) {
            let num = self.parse_num()?;
            span = span.merge(num.span);
            time_scale = Some(num);
        }
        let pip = PipLit {
            step: RandNum::Lit(start),
            time_scale,
            tag: None,
            span,
        };
        Some(Expr::new(ExprKind::MotLit(vec![MotEntry::Pip(pip)]), span))
    }

    /// `{a, b, c}$seed` is a random choice between comma-separated
    /// options, so an option wanting a sequence must parenthesize it.
    /// Empty braces parse; choosing from them fails at evaluation time.
    fn parse_curly(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let mut options = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                options.push(self.descend(Self::parse_combine)?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(&TokenKind::RBrace, "'}'")?.span;
        let mut span = start.merge(end);
        let seed = self.eat_seed(&mut span);
        Some(Expr::new(ExprKind::Curly { options, seed }, span))
    }

    /// `@0 [1, 2] @3 [4]`: explicit slot placement. Values bind at
    /// postfix strength, so a following binary operator applies to the
    /// whole placement.
    fn parse_at_index(&mut self) -> Option<Expr> {
        let mut span = self.current_span();
        let mut entries = Vec::new();
        while self.check(&TokenKind::At) {
            let at_span = self.advance().span;
            let index = self.parse_slot_index()?;
            let value = self.descend(Self::parse_postfix)?;
            let entry_span = at_span.merge(value.span);
            span = span.merge(entry_span);
            entries.push(AtEntry {
                index,
                value,
                span: entry_span,
            });
        }
        Some(Expr::new(ExprKind::AtIndex(entries), span))
    }

    fn parse_slot_index(&mut self) -> Option<usize> {
        match self.peek_kind() {
            TokenKind::Number(value) if value.fract() == 0.0 && *value >= 0.0 => {
                let index = *value as usize;
                self.advance();
                Some(index)
            }
            _ => self.fail("a non-negative integer index"),
        }
    }
}
