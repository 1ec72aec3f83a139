//! Mot literal and pip value parsing.
//!
//! A bracketed literal holds comma-separated entries: single pips,
//! `a..b` range splices, and nested bracketed groups. A pip is a step
//! (literal, braced random value, folded arithmetic, or `_` for a rest)
//! followed by optional `:`/`|` suffixes for duration and tag.

use crate::parser::Parser;
use crux_lexer::TokenKind;
use crux_types::ast::{Expr, ExprKind, MotEntry, Num, PipLit, RandNum};
use crux_types::{Span, REST_TAG};

impl<'src> Parser<'src> {
    /// `MotLit = "[" [ Entry { "," Entry } ] "]"`: newlines are allowed
    /// after the opening bracket and after commas.
    pub(crate) fn parse_mot_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let (entries, span) = self.parse_entry_list(start)?;
        Some(Expr::new(ExprKind::MotLit(entries), span))
    }

    /// Entries up to and including the closing bracket. The opening
    /// bracket is already consumed; its span is passed in.
    fn parse_entry_list(&mut self, start: Span) -> Option<(Vec<MotEntry>, Span)> {
        self.skip_newlines();
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                entries.push(self.parse_mot_entry()?);
                if self.eat(&TokenKind::Comma) {
                    self.skip_newlines();
                    continue;
                }
                self.note_expected("','");
                break;
            }
        }
        let end = self.expect(&TokenKind::RBracket, "']'")?.span;
        Some((entries, start.merge(end)))
    }

    /// `Entry = Nested | Range | Pip`
    fn parse_mot_entry(&mut self) -> Option<MotEntry> {
        match self.peek_kind() {
            TokenKind::LBracket => {
                let start = self.advance().span;
                let (entries, span) = self.descend(|p| p.parse_entry_list(start))?;
                Some(MotEntry::Nested { entries, span })
            }
            TokenKind::Number(_) if matches!(self.look_ahead(1), TokenKind::DotDot) => {
                let start = self.parse_num()?;
                self.advance();
                let end = self.parse_num()?;
                let span = start.span.merge(end.span);
                Some(MotEntry::Range { start, end, span })
            }
            _ => Some(MotEntry::Pip(self.parse_pip_entry()?)),
        }
    }

    /// `Pip = Step { ":" (Number | Tag) | "|" Number }`
    fn parse_pip_entry(&mut self) -> Option<PipLit> {
        let (step, mut span, mut tag) = match self.peek_kind() {
            TokenKind::Number(_) => {
                let num = self.parse_num()?;
                let span = num.span;
                (RandNum::Lit(num), span, None)
            }
            TokenKind::LBrace => {
                let rand = self.parse_rand_braces()?;
                let span = rand.span();
                (rand, span, None)
            }
            TokenKind::LParen => {
                let num = self.parse_pip_arith()?;
                let span = num.span;
                (RandNum::Lit(num), span, None)
            }
            TokenKind::Underscore => {
                let span = self.advance().span;
                (
                    RandNum::Lit(Num::new(0.0, span)),
                    span,
                    Some(REST_TAG.to_string()),
                )
            }
            _ => return self.fail("a pip value"),
        };

        let mut time_scale = None;
        loop {
            match self.peek_kind() {
                TokenKind::Colon => match self.look_ahead(1) {
                    TokenKind::Number(_) => {
                        self.advance();
                        let num = self.parse_num()?;
                        span = span.merge(num.span);
                        time_scale = Some(num);
                    }
                    TokenKind::Ident(_) => {
                        self.advance();
                        let ident = self.parse_ident()?;
                        span = span.merge(ident.span);
                        tag = Some(strip_tag_suffix(&ident.name));
                    }
                    _ => {
                        self.advance();
                        return self.fail("a duration or tag");
                    }
                },
                TokenKind::Pipe => {
                    self.advance();
                    let num = self.parse_num()?;
                    span = span.merge(num.span);
                    time_scale = Some(num);
                }
                _ => break,
            }
        }

        Some(PipLit {
            step,
            time_scale,
            tag,
            span,
        })
    }

    /// `"{" Number ".." Number "}"` or `"{" Number { "," Number } "}"`,
    /// with an optional `$hex` seed after the closing brace.
    pub(crate) fn parse_rand_braces(&mut self) -> Option<RandNum> {
        let start = self.advance().span;
        let first = self.parse_num()?;

        if self.eat(&TokenKind::DotDot) {
            let end = self.parse_num()?;
            let close = self.expect(&TokenKind::RBrace, "'}'")?.span;
            let mut span = start.merge(close);
            let seed = self.eat_seed(&mut span);
            return Some(RandNum::Range {
                start: first,
                end,
                seed,
                span,
            });
        }

        let mut options = vec![first];
        while self.eat(&TokenKind::Comma) {
            options.push(self.parse_num()?);
        }
        let close = self.expect(&TokenKind::RBrace, "'}'")?.span;
        let mut span = start.merge(close);
        let seed = self.eat_seed(&mut span);
        Some(RandNum::Choice {
            options,
            seed,
            span,
        })
    }

    /// Parenthesized arithmetic over literal numbers, folded to a
    /// constant left to right. An adjacent negative literal acts as
    /// subtraction, so `(3 -1)` folds to 2.
    fn parse_pip_arith(&mut self) -> Option<Num> {
        let start = self.advance().span;
        let mut value = self.parse_num()?.value;
        loop {
            match self.peek_kind() {
                TokenKind::Plus => {
                    self.advance();
                    value += self.parse_num()?.value;
                }
                TokenKind::Star => {
                    self.advance();
                    value *= self.parse_num()?.value;
                }
                TokenKind::Slash => {
                    self.advance();
                    value /= self.parse_num()?.value;
                }
                TokenKind::Number(n) if *n < 0.0 => {
                    value += *n;
                    self.advance();
                }
                _ => break,
            }
        }
        let end = self.expect(&TokenKind::RParen, "')'")?.span;
        Some(Num::new(value, start.merge(end)))
    }
}

/// Canonical output writes tags with a trailing `0`; reading strips it
/// so the round trip preserves the tag.
fn strip_tag_suffix(name: &str) -> String {
    name.strip_suffix('0').unwrap_or(name).to_string()
}
