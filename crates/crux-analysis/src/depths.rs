//! The leaf walker.
//!
//! Analysis never evaluates anything. It walks the final section's
//! analyzed expression and collects one [`LeafInfo`] per contributing
//! mot source, where a leaf is a literal, a range, or a reference to an
//! eager binding. Depth counts binary operator applications between the
//! root and the leaf; everything else (sequencing, grouping, postfix
//! transforms, placement, choice) is transparent.
//!
//! References resolve through a map built from the statements before the
//! analyzed expression. Macros substitute their definition at the
//! reference's depth; eager bindings collapse to a single leaf because
//! evaluation has already flattened them by the time they are referenced.
//! Undeclared names contribute nothing, and a visiting set keeps
//! self-referential macros from recursing.

use crux_types::ast::{Expr, ExprKind, MotEntry, Program, RandNum, Statement, StatementKind};
use crux_types::Span;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One mot source feeding the analyzed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafInfo {
    /// Pips this leaf produces, counting through nesting and ranges.
    pub pip_count: usize,
    /// Static duration in unit-pip terms.
    pub duration: f64,
    /// Source offsets of the step numbers, including range endpoints and
    /// choice options but not time scales or seeds.
    pub numeric_offsets: Vec<usize>,
    pub span: Span,
    /// Binary operator applications above this leaf.
    pub depth: u32,
}

enum Bound<'a> {
    Eager(&'a Expr),
    Macro(&'a Expr),
}

/// Collects the leaves of a program's analyzed expression in source
/// order. The analyzed expression is the final section's last bare
/// expression statement, falling back to that section's last statement
/// carrying an expression; earlier sections contribute bindings only.
pub fn leaf_infos(program: &Program) -> Vec<LeafInfo> {
    let statements: Vec<&Statement> = program
        .sections
        .iter()
        .flat_map(|s| s.statements.iter())
        .collect();
    let Some(last_section) = program.sections.last() else {
        return Vec::new();
    };
    let preceding = statements.len() - last_section.statements.len();
    let mut target: Option<(usize, &Expr)> = None;
    for (i, statement) in last_section.statements.iter().enumerate() {
        if let StatementKind::Expr(expr) = &statement.kind {
            target = Some((preceding + i, expr));
        }
    }
    if target.is_none() {
        for (i, statement) in last_section.statements.iter().enumerate() {
            if let Some(expr) = statement.expr() {
                target = Some((preceding + i, expr));
            }
        }
    }
    let Some((index, expr)) = target else {
        return Vec::new();
    };

    let mut bindings: HashMap<&str, Bound> = HashMap::new();
    for statement in &statements[..index] {
        match &statement.kind {
            StatementKind::Assign { name, expr } => {
                bindings.insert(&name.name, Bound::Eager(expr));
            }
            StatementKind::Macro { name, expr } => {
                bindings.insert(&name.name, Bound::Macro(expr));
            }
            StatementKind::OpAlias { .. } | StatementKind::Expr(_) => {}
        }
    }

    let mut walker = Walker {
        bindings,
        visiting: HashSet::new(),
        leaves: Vec::new(),
    };
    walker.walk(expr, 0);
    walker.leaves
}

/// Duration of the first leaf at the greatest depth, the program's
/// fundamental cell. Zero when there are no leaves.
pub(crate) fn effective_duration(leaves: &[LeafInfo]) -> f64 {
    let Some(deepest) = leaves.iter().map(|l| l.depth).max() else {
        return 0.0;
    };
    leaves
        .iter()
        .find(|l| l.depth == deepest)
        .map_or(0.0, |l| l.duration)
}

struct Walker<'a> {
    bindings: HashMap<&'a str, Bound<'a>>,
    visiting: HashSet<&'a str>,
    leaves: Vec<LeafInfo>,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, expr: &'a Expr, depth: u32) {
        match &expr.kind {
            ExprKind::MotLit(entries) => {
                let stats = literal_stats(entries);
                self.leaves.push(LeafInfo {
                    pip_count: stats.pip_count,
                    duration: stats.duration,
                    numeric_offsets: stats.offsets,
                    span: expr.span,
                    depth,
                });
            }
            ExprKind::Range { start, end } => {
                let count = range_count(start.value, end.value);
                self.leaves.push(LeafInfo {
                    pip_count: count,
                    duration: count as f64,
                    numeric_offsets: vec![start.span.start, end.span.start],
                    span: expr.span,
                    depth,
                });
            }
            ExprKind::Var(name) => self.walk_reference(name, expr.span, depth),
            ExprKind::Binary { left, right, .. } => {
                self.walk(left, depth + 1);
                self.walk(right, depth + 1);
            }
            ExprKind::FollowedBy { left, right } => {
                self.walk(left, depth);
                self.walk(right, depth);
            }
            ExprKind::Postfix { operand, .. } => self.walk(operand, depth),
            ExprKind::Paren(inner) => self.walk(inner, depth),
            ExprKind::AtIndex(entries) => {
                for entry in entries {
                    self.walk(&entry.value, depth);
                }
            }
            ExprKind::Curly { options, .. } => {
                for option in options {
                    self.walk(option, depth);
                }
            }
        }
    }

    fn walk_reference(&mut self, name: &'a str, span: Span, depth: u32) {
        match self.bindings.get(name) {
            Some(Bound::Macro(expr)) => {
                if self.visiting.insert(name) {
                    let expr = *expr;
                    self.walk(expr, depth);
                    self.visiting.remove(name);
                }
            }
            Some(Bound::Eager(expr)) => {
                if self.visiting.insert(name) {
                    let expr = *expr;
                    let inner = self.collect_sub(expr);
                    self.visiting.remove(name);
                    let pip_count = inner.iter().map(|l| l.pip_count).sum();
                    let duration = effective_duration(&inner);
                    let numeric_offsets = inner
                        .iter()
                        .flat_map(|l| l.numeric_offsets.iter().copied())
                        .collect();
                    self.leaves.push(LeafInfo {
                        pip_count,
                        duration,
                        numeric_offsets,
                        span,
                        depth,
                    });
                }
            }
            None => {}
        }
    }

    /// Walks a bound expression into a scratch list, leaving the main
    /// list untouched.
    fn collect_sub(&mut self, expr: &'a Expr) -> Vec<LeafInfo> {
        let saved = std::mem::take(&mut self.leaves);
        self.walk(expr, 0);
        std::mem::replace(&mut self.leaves, saved)
    }
}

struct LiteralStats {
    pip_count: usize,
    /// Top-level values after range splicing; the flattening divisor.
    slots: usize,
    duration: f64,
    offsets: Vec<usize>,
}

fn literal_stats(entries: &[MotEntry]) -> LiteralStats {
    let mut stats = LiteralStats {
        pip_count: 0,
        slots: 0,
        duration: 0.0,
        offsets: Vec::new(),
    };
    for entry in entries {
        match entry {
            MotEntry::Pip(pip) => {
                stats.pip_count += 1;
                stats.slots += 1;
                stats.duration += pip.time_scale.as_ref().map_or(1.0, |n| n.value);
                push_step_offsets(&pip.step, &mut stats.offsets);
            }
            MotEntry::Range { start, end, .. } => {
                let count = range_count(start.value, end.value);
                stats.pip_count += count;
                stats.slots += count;
                stats.duration += count as f64;
                stats.offsets.push(start.span.start);
                stats.offsets.push(end.span.start);
            }
            MotEntry::Nested { entries, .. } => {
                let inner = literal_stats(entries);
                stats.pip_count += inner.pip_count;
                stats.slots += 1;
                if inner.slots > 0 {
                    stats.duration += inner.duration / inner.slots as f64;
                }
                stats.offsets.extend(inner.offsets);
            }
        }
    }
    stats
}

fn push_step_offsets(step: &RandNum, offsets: &mut Vec<usize>) {
    match step {
        RandNum::Lit(num) => offsets.push(num.span.start),
        RandNum::Range { start, end, .. } => {
            offsets.push(start.span.start);
            offsets.push(end.span.start);
        }
        RandNum::Choice { options, .. } => {
            for option in options {
                offsets.push(option.span.start);
            }
        }
    }
}

/// Pips an inclusive integer range produces, in either direction.
pub(crate) fn range_count(start: f64, end: f64) -> usize {
    let a = start.round() as i64;
    let b = end.round() as i64;
    (a - b).unsigned_abs() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_count_directions() {
        assert_eq!(range_count(0.0, 3.0), 4);
        assert_eq!(range_count(3.0, 0.0), 4);
        assert_eq!(range_count(-2.0, 2.0), 5);
        assert_eq!(range_count(5.0, 5.0), 1);
    }

    #[test]
    fn test_range_count_rounds_endpoints() {
        assert_eq!(range_count(0.6, 2.4), 2);
    }

    #[test]
    fn test_effective_duration_empty() {
        assert_eq!(effective_duration(&[]), 0.0);
    }
}
