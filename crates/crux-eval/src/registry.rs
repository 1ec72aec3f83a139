//! The operator registry.
//!
//! Binary operators come in two families over the same names: fan
//! (plain symbols) iterates the full product of both operands, cog
//! (dot-prefixed) keeps the left operand's length and tiles the right.
//! Each name maps to a pairwise combine, except rotation, which the
//! evaluator handles structurally because it moves positions instead of
//! combining values.

use crux_types::Pip;
use std::collections::HashMap;

/// How a binary operator iterates its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `L*R` output pips: `out[i] = combine(left[i mod L], right[i div L])`.
    Fan,
    /// `L` output pips: `out[i] = combine(left[i], right[i mod R])`.
    Cog,
}

/// Pairwise combine: the (step, time scale) of one output pip.
pub type Combine = fn(&Pip, &Pip) -> (f64, f64);

#[derive(Debug, Clone, Copy)]
pub enum OperatorKind {
    Combine(Combine),
    /// Positional rotation by `round(step)` of the right-hand pip.
    Rotate,
}

fn transpose(left: &Pip, right: &Pip) -> (f64, f64) {
    (left.step + right.step, left.time_scale * right.time_scale)
}

fn expand(left: &Pip, right: &Pip) -> (f64, f64) {
    (left.step * right.step, left.time_scale * right.time_scale)
}

#[derive(Debug, Clone)]
pub struct Registry {
    fan: HashMap<String, OperatorKind>,
    cog: HashMap<String, OperatorKind>,
}

impl Registry {
    /// The default operator table. `p` exists only in the fan family.
    pub fn new() -> Self {
        let mut registry = Registry {
            fan: HashMap::new(),
            cog: HashMap::new(),
        };
        for family in [Family::Fan, Family::Cog] {
            registry.register(family, "*", OperatorKind::Combine(transpose));
            registry.register(family, "^", OperatorKind::Combine(expand));
            registry.register(family, "~", OperatorKind::Rotate);
            registry.register(family, "->", OperatorKind::Combine(transpose));
            // TODO: confirm the intended combines for the lettered
            // operators against recorded player output; until then they
            // share the transpose combine and hosts override as needed.
            for name in ["m", "l", "j", "g", "r"] {
                registry.register(family, name, OperatorKind::Combine(transpose));
            }
        }
        registry.register(Family::Fan, "p", OperatorKind::Combine(transpose));
        registry
    }

    /// Adds or replaces an operator binding. Public so hosts can
    /// install their own combines over the provisional defaults.
    pub fn register(&mut self, family: Family, name: &str, op: OperatorKind) {
        let table = match family {
            Family::Fan => &mut self.fan,
            Family::Cog => &mut self.cog,
        };
        table.insert(name.to_string(), op);
    }

    pub fn lookup(&self, family: Family, name: &str) -> Option<OperatorKind> {
        let table = match family {
            Family::Fan => &self.fan,
            Family::Cog => &self.cog,
        };
        table.get(name).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_types::PipId;

    fn pip(step: f64, time_scale: f64) -> Pip {
        Pip::new(step, time_scale, PipId(0))
    }

    #[test]
    fn test_default_table_covers_both_families() {
        let registry = Registry::new();
        for name in ["*", "^", "~", "->", "m", "l", "j", "g", "r"] {
            assert!(registry.lookup(Family::Fan, name).is_some(), "fan {name}");
            assert!(registry.lookup(Family::Cog, name).is_some(), "cog {name}");
        }
    }

    #[test]
    fn test_p_has_no_cog_form() {
        let registry = Registry::new();
        assert!(registry.lookup(Family::Fan, "p").is_some());
        assert!(registry.lookup(Family::Cog, "p").is_none());
    }

    #[test]
    fn test_unknown_name_misses() {
        let registry = Registry::new();
        assert!(registry.lookup(Family::Fan, "q").is_none());
    }

    #[test]
    fn test_star_combines_add_step_multiply_time() {
        let registry = Registry::new();
        let Some(OperatorKind::Combine(combine)) = registry.lookup(Family::Fan, "*") else {
            panic!("'*' should be a combine");
        };
        assert_eq!(combine(&pip(2.0, 2.0), &pip(3.0, 0.5)), (5.0, 1.0));
    }

    #[test]
    fn test_caret_multiplies_steps() {
        let registry = Registry::new();
        let Some(OperatorKind::Combine(combine)) = registry.lookup(Family::Cog, "^") else {
            panic!("'^' should be a combine");
        };
        assert_eq!(combine(&pip(2.0, 1.0), &pip(3.0, 1.0)), (6.0, 1.0));
    }

    #[test]
    fn test_tilde_is_structural() {
        let registry = Registry::new();
        assert!(matches!(
            registry.lookup(Family::Fan, "~"),
            Some(OperatorKind::Rotate)
        ));
    }

    #[test]
    fn test_host_override_replaces_default() {
        fn widen(left: &Pip, right: &Pip) -> (f64, f64) {
            (left.step, left.time_scale + right.time_scale)
        }
        let mut registry = Registry::new();
        registry.register(Family::Fan, "m", OperatorKind::Combine(widen));
        let Some(OperatorKind::Combine(combine)) = registry.lookup(Family::Fan, "m") else {
            panic!()
        };
        assert_eq!(combine(&pip(1.0, 1.0), &pip(9.0, 2.0)), (1.0, 3.0));
    }
}
