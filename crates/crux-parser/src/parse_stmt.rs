//! Program, section, and statement parsing.
//!
//! A program is a sequence of newline-terminated statements. A line
//! holding a bare `!` closes the current section and opens the next one.

use crate::parser::Parser;
use crux_lexer::TokenKind;
use crux_types::ast::{BinOp, Program, Section, Statement, StatementKind};
use crux_types::Span;

impl<'src> Parser<'src> {
    /// `Program = { Statement | "!" }`
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let total = Span::new(0, self.source_len());
        let mut sections = Vec::new();
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.at_end() {
            if self.check(&TokenKind::SectionBreak) {
                self.advance();
                if !self.at_end() && !self.check(&TokenKind::Newline) {
                    return self.fail("newline");
                }
                sections.push(self.close_section(std::mem::take(&mut statements)));
            } else {
                let statement = self.parse_statement()?;
                statements.push(statement);
                if !self.at_end() && !self.check(&TokenKind::Newline) {
                    return self.fail("newline");
                }
            }
            self.skip_newlines();
        }
        sections.push(self.close_section(statements));

        Some(Program {
            sections,
            span: total,
        })
    }

    fn close_section(&self, statements: Vec<Statement>) -> Section {
        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::point(self.current_span().start),
        };
        Section { statements, span }
    }

    /// `Statement = Ident ":=" Expr | Ident "=" (Op | Expr) | Expr`
    fn parse_statement(&mut self) -> Option<Statement> {
        if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            match self.look_ahead(1) {
                TokenKind::ColonEq => return self.parse_assign(),
                TokenKind::Eq => return self.parse_binding(),
                _ => {}
            }
        }
        let expr = self.parse_expression()?;
        let span = expr.span;
        Some(Statement::new(StatementKind::Expr(expr), span))
    }

    /// `name := expr`: evaluated eagerly at the point of definition.
    fn parse_assign(&mut self) -> Option<Statement> {
        let name = self.parse_ident()?;
        self.advance();
        let expr = self.parse_expression()?;
        let span = name.span.merge(expr.span);
        Some(Statement::new(StatementKind::Assign { name, expr }, span))
    }

    /// `name = expr` (macro) or `name = *` (operator alias). The right
    /// side is an alias only when it is a single operator symbol.
    fn parse_binding(&mut self) -> Option<Statement> {
        let name = self.parse_ident()?;
        self.advance();

        let alias_op = self
            .peek_kind()
            .op_name()
            .map(|(op_name, cog)| BinOp::new(op_name, cog));
        if let Some(op) = alias_op {
            if matches!(self.look_ahead(1), TokenKind::Newline | TokenKind::Eof) {
                let op_span = self.advance().span;
                let span = name.span.merge(op_span);
                return Some(Statement::new(StatementKind::OpAlias { name, op }, span));
            }
        }

        let expr = self.parse_expression()?;
        let span = name.span.merge(expr.span);
        Some(Statement::new(StatementKind::Macro { name, expr }, span))
    }
}
