//! The evaluation environment.
//!
//! One flat scope of name bindings. Later definitions shadow earlier
//! ones; macro bindings capture a snapshot of the environment as it was
//! at definition time, which also keeps a macro from referring to
//! itself.

use crux_types::ast::{BinOp, Expr};
use crux_types::Mot;
use std::collections::BTreeMap;

/// What a name is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    /// `name := expr`: the mot evaluated at definition time.
    Mot(Mot),
    /// `name = expr`: the expression plus the environment captured at
    /// definition time; re-evaluated at each reference.
    Thunk { expr: Expr, captured: Environment },
    /// `name = *`: an operator synonym.
    Alias(BinOp),
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: BTreeMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn define(&mut self, name: &str, binding: Binding) {
        self.bindings.insert(name.to_string(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// A copy of the current bindings, for macro capture.
    pub fn snapshot(&self) -> Environment {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_types::Mot;

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("a", Binding::Mot(Mot::detached(vec![])));
        assert!(matches!(env.get("a"), Some(Binding::Mot(_))));
        assert!(env.get("b").is_none());
    }

    #[test]
    fn test_later_definitions_shadow() {
        let mut env = Environment::new();
        env.define("a", Binding::Mot(Mot::detached(vec![])));
        env.define("a", Binding::Alias(BinOp::new("*", false)));
        assert!(matches!(env.get("a"), Some(Binding::Alias(_))));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let mut env = Environment::new();
        env.define("a", Binding::Mot(Mot::detached(vec![])));
        let snapshot = env.snapshot();
        env.define("b", Binding::Mot(Mot::detached(vec![])));
        assert!(snapshot.get("b").is_none());
        assert!(snapshot.get("a").is_some());
    }
}
