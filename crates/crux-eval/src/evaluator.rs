//! The tree-walking evaluator.
//!
//! Walks a parsed program section by section, threading one
//! [`Environment`] across section breaks. Every operator produces a new
//! mot with freshly allocated pips; inputs are never mutated. Pips
//! created from other pips record provenance edges in the context.

use crate::context::EvalContext;
use crate::env::{Binding, Environment};
use crate::error::{EvalError, EvalResult};
use crate::registry::{Combine, Family, OperatorKind, Registry};
use crate::rng::{uniform_int, SeededRng};
use crux_types::ast::{
    AtEntry, BinOp, Expr, ExprKind, MotEntry, PostfixOp, Program, RandNum, Statement,
    StatementKind,
};
use crux_types::{Mot, MotValue, Pip, PipId, Span};

pub struct Evaluator<'ctx> {
    /// Bindings accumulate across the whole program; section breaks do
    /// not clear them.
    pub env: Environment,
    registry: Registry,
    ctx: &'ctx mut EvalContext,
}

impl<'ctx> Evaluator<'ctx> {
    pub fn new(ctx: &'ctx mut EvalContext) -> Self {
        Self::with_registry(ctx, Registry::new())
    }

    pub fn with_registry(ctx: &'ctx mut EvalContext, registry: Registry) -> Self {
        Evaluator {
            env: Environment::new(),
            registry,
            ctx,
        }
    }

    /// Adds or replaces an operator binding for this evaluator.
    pub fn register(&mut self, family: Family, name: &str, op: OperatorKind) {
        self.registry.register(family, name, op);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Program Driver
    // ═══════════════════════════════════════════════════════════════════

    /// Evaluates all sections and returns one flattened mot per section:
    /// the value of its last bare expression statement, or an empty mot.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Vec<Mot>> {
        let mut sections = Vec::with_capacity(program.sections.len());
        for section in &program.sections {
            let mut result = None;
            for statement in &section.statements {
                if let Some(mot) = self.eval_statement(statement)? {
                    result = Some(mot);
                }
            }
            let mot = match result {
                Some(mot) => mot,
                None => self.make_mot(Vec::new()),
            };
            sections.push(mot);
        }
        Ok(sections)
    }

    /// Evaluates one statement. Bare expressions return their mot; the
    /// binding forms return `None`.
    pub fn eval_statement(&mut self, statement: &Statement) -> EvalResult<Option<Mot>> {
        match &statement.kind {
            StatementKind::Assign { name, expr } => {
                let mot = self.eval_expr(expr)?;
                let mot = self.flatten(mot);
                self.env.define(&name.name, Binding::Mot(mot));
                Ok(None)
            }
            StatementKind::Macro { name, expr } => {
                let captured = self.env.snapshot();
                self.env.define(
                    &name.name,
                    Binding::Thunk {
                        expr: expr.clone(),
                        captured,
                    },
                );
                Ok(None)
            }
            StatementKind::OpAlias { name, op } => {
                self.env.define(&name.name, Binding::Alias(op.clone()));
                Ok(None)
            }
            StatementKind::Expr(expr) => {
                let mot = self.eval_expr(expr)?;
                Ok(Some(self.flatten(mot)))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Mot> {
        match &expr.kind {
            ExprKind::MotLit(entries) => self.eval_mot_literal(entries),
            ExprKind::Range { start, end } => Ok(self.expand_range(start.value, end.value)),
            ExprKind::Var(name) => self.eval_var(name),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, op, right),
            ExprKind::FollowedBy { left, right } => self.eval_followed_by(left, right),
            ExprKind::Postfix { op, operand } => self.eval_postfix(op, operand),
            ExprKind::Paren(inner) => self.eval_expr(inner),
            ExprKind::AtIndex(entries) => self.eval_at_index(entries),
            ExprKind::Curly { options, seed } => {
                self.eval_curly(options, seed.as_deref(), expr.span)
            }
        }
    }

    // ── Leaves ──────────────────────────────────────────────────────────

    fn eval_mot_literal(&mut self, entries: &[MotEntry]) -> EvalResult<Mot> {
        let values = self.literal_values(entries)?;
        Ok(self.make_mot(values))
    }

    /// Builds the values of a literal: random steps resolve now, range
    /// entries splice, nested groups become nested mots.
    fn literal_values(&mut self, entries: &[MotEntry]) -> EvalResult<Vec<MotValue>> {
        let mut values = Vec::new();
        for entry in entries {
            match entry {
                MotEntry::Pip(pip) => {
                    let step = self.resolve_rand(&pip.step)?;
                    let time_scale = pip.time_scale.as_ref().map(|n| n.value).unwrap_or(1.0);
                    let created = self.fresh_pip(step, time_scale, pip.tag.clone());
                    values.push(MotValue::Pip(created));
                }
                MotEntry::Range { start, end, .. } => {
                    for step in range_steps(start.value, end.value) {
                        let created = self.fresh_pip(step, 1.0, None);
                        values.push(MotValue::Pip(created));
                    }
                }
                MotEntry::Nested { entries, .. } => {
                    let inner_values = self.literal_values(entries)?;
                    let inner = self.make_mot(inner_values);
                    values.push(MotValue::Mot(inner));
                }
            }
        }
        Ok(values)
    }

    fn expand_range(&mut self, start: f64, end: f64) -> Mot {
        let mut values = Vec::new();
        for step in range_steps(start, end) {
            let pip = self.fresh_pip(step, 1.0, None);
            values.push(MotValue::Pip(pip));
        }
        self.make_mot(values)
    }

    /// Resolves a reference. Eager bindings yield a fresh copy whose
    /// pips point back at the stored ones; macros re-evaluate their
    /// expression under the captured environment.
    fn eval_var(&mut self, name: &str) -> EvalResult<Mot> {
        let binding = match self.env.get(name) {
            Some(binding) => binding.clone(),
            None => return Err(EvalError::UndeclaredIdentifier(name.to_string())),
        };
        match binding {
            Binding::Mot(stored) => Ok(self.copy_mot(&stored)),
            Binding::Thunk { expr, captured } => {
                let saved = std::mem::replace(&mut self.env, captured);
                let result = self.eval_expr(&expr);
                self.env = saved;
                result
            }
            Binding::Alias(op) => Err(EvalError::TypeMismatch(format!(
                "Mot required, but '{name}' is an alias for '{op}'"
            ))),
        }
    }

    // ── Binary Operators ────────────────────────────────────────────────

    fn eval_binary(&mut self, left: &Expr, op: &BinOp, right: &Expr) -> EvalResult<Mot> {
        let lhs = self.eval_expr(left)?;
        let lhs = self.flatten(lhs);
        let rhs = self.eval_expr(right)?;
        let rhs = self.flatten(rhs);
        let (family, kind) = self.resolve_op(op)?;
        if lhs.is_empty() || rhs.is_empty() {
            return Ok(self.make_mot(Vec::new()));
        }
        let result = match kind {
            OperatorKind::Combine(combine) => match family {
                Family::Fan => self.apply_fan(&lhs, &rhs, combine),
                Family::Cog => self.apply_cog(&lhs, &rhs, combine),
            },
            OperatorKind::Rotate => match family {
                Family::Fan => self.rotate_fan(&lhs, &rhs),
                Family::Cog => self.rotate_cog(&lhs, &rhs),
            },
        };
        Ok(result)
    }

    /// Aliases resolve through the environment first; anything else
    /// must be present in the registry.
    fn resolve_op(&self, op: &BinOp) -> EvalResult<(Family, OperatorKind)> {
        let (name, cog) = match self.env.get(&op.name) {
            Some(Binding::Alias(alias)) if !op.cog => (alias.name.clone(), alias.cog),
            _ => (op.name.clone(), op.cog),
        };
        let family = if cog { Family::Cog } else { Family::Fan };
        match self.registry.lookup(family, &name) {
            Some(kind) => Ok((family, kind)),
            None => match self.env.get(&op.name) {
                Some(Binding::Mot(_) | Binding::Thunk { .. }) => Err(EvalError::TypeMismatch(
                    format!("'{}' is bound to a Mot, not an operator", op.name),
                )),
                _ => Err(EvalError::UndeclaredIdentifier(format!("operator '{op}'"))),
            },
        }
    }

    /// Fan: `L*R` outputs; the right operand indexes the copy, the left
    /// cycles within it.
    fn apply_fan(&mut self, left: &Mot, right: &Mot, combine: Combine) -> Mot {
        let l: Vec<&Pip> = left.pips().collect();
        let r: Vec<&Pip> = right.pips().collect();
        let mut values = Vec::with_capacity(l.len() * r.len());
        for i in 0..l.len() * r.len() {
            let lp = l[i % l.len()];
            let rp = r[i / l.len()];
            let (step, time_scale) = combine(lp, rp);
            let pip = self.derive_pip(step, time_scale, lp.tag.clone(), &[lp.id, rp.id]);
            values.push(MotValue::Pip(pip));
        }
        self.make_mot(values)
    }

    /// Cog: `L` outputs; the right operand tiles cyclically.
    fn apply_cog(&mut self, left: &Mot, right: &Mot, combine: Combine) -> Mot {
        let l: Vec<&Pip> = left.pips().collect();
        let r: Vec<&Pip> = right.pips().collect();
        let mut values = Vec::with_capacity(l.len());
        for (i, lp) in l.iter().enumerate() {
            let rp = r[i % r.len()];
            let (step, time_scale) = combine(lp, rp);
            let pip = self.derive_pip(step, time_scale, lp.tag.clone(), &[lp.id, rp.id]);
            values.push(MotValue::Pip(pip));
        }
        self.make_mot(values)
    }

    /// Fan rotate: one block per right-hand pip, each a copy of the
    /// left operand rotated by `round(step)`. Steps and time scales
    /// pass through; only positions move. Negative offsets wrap.
    fn rotate_fan(&mut self, left: &Mot, right: &Mot) -> Mot {
        let l: Vec<&Pip> = left.pips().collect();
        let r: Vec<&Pip> = right.pips().collect();
        let len = l.len() as i64;
        let mut values = Vec::with_capacity(l.len() * r.len());
        for i in 0..l.len() * r.len() {
            let offset_pip = r[i / l.len()];
            let offset = offset_pip.step.round() as i64;
            let src = l[((i % l.len()) as i64 + offset).rem_euclid(len) as usize];
            let pip =
                self.derive_pip(src.step, src.time_scale, src.tag.clone(), &[src.id, offset_pip.id]);
            values.push(MotValue::Pip(pip));
        }
        self.make_mot(values)
    }

    /// Cog rotate: the left operand's length, offsets tiled from the
    /// right.
    fn rotate_cog(&mut self, left: &Mot, right: &Mot) -> Mot {
        let l: Vec<&Pip> = left.pips().collect();
        let r: Vec<&Pip> = right.pips().collect();
        let len = l.len() as i64;
        let mut values = Vec::with_capacity(l.len());
        for i in 0..l.len() {
            let offset_pip = r[i % r.len()];
            let offset = offset_pip.step.round() as i64;
            let src = l[(i as i64 + offset).rem_euclid(len) as usize];
            let pip =
                self.derive_pip(src.step, src.time_scale, src.tag.clone(), &[src.id, offset_pip.id]);
            values.push(MotValue::Pip(pip));
        }
        self.make_mot(values)
    }

    // ── Sequence, Placement, Choice ─────────────────────────────────────

    /// `,` concatenates values as they are: no new pips, no edges, and
    /// nested structure passes through.
    fn eval_followed_by(&mut self, left: &Expr, right: &Expr) -> EvalResult<Mot> {
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        let mut values = lhs.values;
        values.extend(rhs.values);
        Ok(self.make_mot(values))
    }

    /// `@i v …`: values land at explicit slots; uncovered slots up to
    /// the highest index are filled with rest pips. A multi-pip value
    /// occupies its slot as a nested mot.
    fn eval_at_index(&mut self, entries: &[AtEntry]) -> EvalResult<Mot> {
        if entries.is_empty() {
            return Ok(self.make_mot(Vec::new()));
        }
        let width = entries.iter().map(|e| e.index).max().unwrap_or(0) + 1;
        let mut slots: Vec<Option<MotValue>> = vec![None; width];
        for entry in entries {
            let value = self.eval_expr(&entry.value)?;
            let value = self.flatten(value);
            slots[entry.index] = if value.len() == 1 {
                value.values.into_iter().next()
            } else {
                Some(MotValue::Mot(value))
            };
        }
        let mut values = Vec::with_capacity(width);
        for slot in slots {
            match slot {
                Some(value) => values.push(value),
                None => {
                    let id = self.ctx.next_pip_id();
                    values.push(MotValue::Pip(Pip::rest(id)));
                }
            }
        }
        Ok(self.make_mot(values))
    }

    /// `{a, b}`: picks one option uniformly and evaluates it.
    fn eval_curly(
        &mut self,
        options: &[Expr],
        seed: Option<&str>,
        span: Span,
    ) -> EvalResult<Mot> {
        if options.is_empty() {
            return Err(EvalError::EmptyChoice);
        }
        let draw = self.draw(seed, span.start);
        let index = ((draw * options.len() as f64) as usize).min(options.len() - 1);
        self.eval_expr(&options[index])
    }

    // ── Postfix Transforms ──────────────────────────────────────────────

    fn eval_postfix(&mut self, op: &PostfixOp, operand: &Expr) -> EvalResult<Mot> {
        let mot = self.eval_expr(operand)?;
        match op {
            PostfixOp::Zip => Ok(self.zip_columns(mot)),
            PostfixOp::Subdivide => {
                let flat = self.flatten(mot);
                Ok(self.subdivide(flat))
            }
            PostfixOp::Tie => {
                let flat = self.flatten(mot);
                Ok(self.tie(flat))
            }
            PostfixOp::Repeat(count) => {
                let flat = self.flatten(mot);
                let n = self.resolve_count(count)?;
                Ok(self.repeat(flat, n))
            }
            PostfixOp::Drop(count) => {
                let flat = self.flatten(mot);
                let n = self.resolve_count(count)?;
                Ok(self.drop_trailing(flat, n))
            }
        }
    }

    /// `/`: every time scale divided by the operand's length.
    fn subdivide(&mut self, mot: Mot) -> Mot {
        let len = mot.len();
        if len == 0 {
            return self.make_mot(Vec::new());
        }
        let divisor = len as f64;
        let mut values = Vec::with_capacity(len);
        for pip in mot.pips() {
            let scaled =
                self.derive_pip(pip.step, pip.time_scale / divisor, pip.tag.clone(), &[pip.id]);
            values.push(MotValue::Pip(scaled));
        }
        self.make_mot(values)
    }

    /// `t`: adjacent pips with equal step and tag merge into one pip
    /// whose time scale is the run's sum and whose provenance covers
    /// the whole run. Unmerged pips pass through unchanged.
    fn tie(&mut self, mot: Mot) -> Mot {
        let pips: Vec<Pip> = mot.pips().cloned().collect();
        let mut values = Vec::new();
        let mut i = 0;
        while i < pips.len() {
            let mut j = i + 1;
            while j < pips.len() && pips[j].step == pips[i].step && pips[j].tag == pips[i].tag {
                j += 1;
            }
            if j - i == 1 {
                values.push(MotValue::Pip(pips[i].clone()));
            } else {
                let run = &pips[i..j];
                let total: f64 = run.iter().map(|p| p.time_scale).sum();
                let parents: Vec<PipId> = run.iter().map(|p| p.id).collect();
                let merged = self.derive_pip(pips[i].step, total, pips[i].tag.clone(), &parents);
                values.push(MotValue::Pip(merged));
            }
            i = j;
        }
        self.make_mot(values)
    }

    /// `: n`: `n` fresh copies of the operand in sequence; zero yields
    /// the empty mot.
    fn repeat(&mut self, mot: Mot, n: usize) -> Mot {
        let mut values = Vec::with_capacity(mot.len() * n);
        for _ in 0..n {
            for pip in mot.pips() {
                let copied = self.copy_pip(pip);
                values.push(MotValue::Pip(copied));
            }
        }
        self.make_mot(values)
    }

    /// `\ n`: removes the trailing `n` pips; survivors pass through.
    /// Dropping more than the length yields the empty mot.
    fn drop_trailing(&mut self, mot: Mot, n: usize) -> Mot {
        let keep = mot.len().saturating_sub(n);
        let values: Vec<MotValue> = mot.values.into_iter().take(keep).collect();
        self.make_mot(values)
    }

    /// `z`: reads nested values column-wise: column `c` takes the
    /// `c`-th value of each nested mot, skipping mots that are too
    /// short. A plain pip is a one-element column. The only operator
    /// that inspects nested structure; values pass through unchanged.
    fn zip_columns(&mut self, mot: Mot) -> Mot {
        let width = mot
            .values
            .iter()
            .map(|v| match v {
                MotValue::Pip(_) => 1,
                MotValue::Mot(inner) => inner.len(),
            })
            .max()
            .unwrap_or(0);
        let mut values = Vec::new();
        for column in 0..width {
            for value in &mot.values {
                match value {
                    MotValue::Pip(pip) => {
                        if column == 0 {
                            values.push(MotValue::Pip(pip.clone()));
                        }
                    }
                    MotValue::Mot(inner) => {
                        if let Some(entry) = inner.values.get(column) {
                            values.push(entry.clone());
                        }
                    }
                }
            }
        }
        self.make_mot(values)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Shared Machinery
    // ═══════════════════════════════════════════════════════════════════

    /// Replaces nested mots with their pips, dividing each time scale by
    /// the nested mot's slot count. Already-flat mots pass through.
    fn flatten(&mut self, mot: Mot) -> Mot {
        if mot.is_flat() {
            return mot;
        }
        let mut values = Vec::new();
        for value in &mot.values {
            match value {
                MotValue::Pip(pip) => values.push(MotValue::Pip(pip.clone())),
                MotValue::Mot(inner) => {
                    let k = inner.len();
                    if k == 0 {
                        continue;
                    }
                    let flat = self.flatten(inner.clone());
                    let divisor = k as f64;
                    for pip in flat.pips() {
                        let scaled = self.derive_pip(
                            pip.step,
                            pip.time_scale / divisor,
                            pip.tag.clone(),
                            &[pip.id],
                        );
                        values.push(MotValue::Pip(scaled));
                    }
                }
            }
        }
        self.make_mot(values)
    }

    /// A fresh deep copy of a stored mot; every copied pip points back
    /// at its source.
    fn copy_mot(&mut self, source: &Mot) -> Mot {
        let mut values = Vec::with_capacity(source.len());
        for value in &source.values {
            match value {
                MotValue::Pip(pip) => {
                    let copied = self.copy_pip(pip);
                    values.push(MotValue::Pip(copied));
                }
                MotValue::Mot(inner) => {
                    let copied = self.copy_mot(inner);
                    values.push(MotValue::Mot(copied));
                }
            }
        }
        self.make_mot(values)
    }

    fn copy_pip(&mut self, source: &Pip) -> Pip {
        self.derive_pip(
            source.step,
            source.time_scale,
            source.tag.clone(),
            &[source.id],
        )
    }

    fn fresh_pip(&mut self, step: f64, time_scale: f64, tag: Option<String>) -> Pip {
        self.derive_pip(step, time_scale, tag, &[])
    }

    /// Allocates a pip and records one provenance edge per parent.
    fn derive_pip(
        &mut self,
        step: f64,
        time_scale: f64,
        tag: Option<String>,
        parents: &[PipId],
    ) -> Pip {
        let id = self.ctx.next_pip_id();
        for &parent in parents {
            self.ctx.provenance.add_edge(id, parent);
        }
        let mut pip = Pip::new(step, time_scale, id);
        pip.tag = tag;
        pip
    }

    /// Allocates a mot id and records membership for its top-level pips.
    fn make_mot(&mut self, values: Vec<MotValue>) -> Mot {
        let id = self.ctx.next_mot_id();
        for pip in values.iter().filter_map(MotValue::as_pip) {
            self.ctx.provenance.record_membership(pip.id, id);
        }
        Mot::new(id, values)
    }

    // ── Random Values ───────────────────────────────────────────────────

    /// Resolves a random value to a concrete finite number. Seeded
    /// draws replay identically; unseeded draws advance the ambient
    /// stream.
    fn resolve_rand(&mut self, rand: &RandNum) -> EvalResult<f64> {
        let value = match rand {
            RandNum::Lit(num) => num.value,
            RandNum::Range {
                start,
                end,
                seed,
                span,
            } => {
                let draw = self.draw(seed.as_deref(), span.start);
                uniform_int(draw, start.value, end.value)
            }
            RandNum::Choice {
                options,
                seed,
                span,
            } => {
                if options.is_empty() {
                    return Err(EvalError::EmptyChoice);
                }
                let draw = self.draw(seed.as_deref(), span.start);
                let index = ((draw * options.len() as f64) as usize).min(options.len() - 1);
                options[index].value
            }
        };
        if !value.is_finite() {
            return Err(EvalError::UnsupportedRandNum(format!(
                "non-finite value {value}"
            )));
        }
        Ok(value)
    }

    fn resolve_count(&mut self, rand: &RandNum) -> EvalResult<usize> {
        Ok(self.resolve_rand(rand)?.round().max(0.0) as usize)
    }

    fn draw(&mut self, seed: Option<&str>, position: usize) -> f64 {
        match seed {
            Some(seed) => SeededRng::warmed(seed, position).next_f64(),
            None => self.ctx.ambient.next_f64(),
        }
    }
}

/// Integer steps from `start` to `end` inclusive, direction preserved.
fn range_steps(start: f64, end: f64) -> Vec<f64> {
    let a = start.round() as i64;
    let b = end.round() as i64;
    if a <= b {
        (a..=b).map(|v| v as f64).collect()
    } else {
        (b..=a).rev().map(|v| v as f64).collect()
    }
}
