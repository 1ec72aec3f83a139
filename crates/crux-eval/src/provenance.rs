//! Derivation tracking.
//!
//! Every pip an operator creates records edges to the pips it came
//! from, and every mot records which pips appeared in it at top level.
//! The graph answers "where did this pip come from" transitively and
//! can be reset between runs.

use crux_types::{MotId, PipId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ProvenanceGraph {
    parents: HashMap<PipId, HashSet<PipId>>,
    memberships: HashMap<PipId, HashSet<MotId>>,
    enabled: bool,
}

impl ProvenanceGraph {
    pub fn new(enabled: bool) -> Self {
        ProvenanceGraph {
            parents: HashMap::new(),
            memberships: HashMap::new(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records that `child` was derived from `parent`. No-op when
    /// tracking is disabled.
    pub fn add_edge(&mut self, child: PipId, parent: PipId) {
        if !self.enabled {
            return;
        }
        self.parents.entry(child).or_default().insert(parent);
    }

    /// Records that `pip` appeared at top level in mot `mot`.
    pub fn record_membership(&mut self, pip: PipId, mot: MotId) {
        if !self.enabled {
            return;
        }
        self.memberships.entry(pip).or_default().insert(mot);
    }

    /// Direct parents of a pip, if it has any recorded.
    pub fn parents(&self, pip: PipId) -> Option<&HashSet<PipId>> {
        self.parents.get(&pip)
    }

    /// Mots a pip has appeared in.
    pub fn mots_of(&self, pip: PipId) -> Option<&HashSet<MotId>> {
        self.memberships.get(&pip)
    }

    /// All transitive ancestors of a pip. Iterative depth-first walk;
    /// shared ancestry is reported once.
    pub fn ancestors(&self, pip: PipId) -> HashSet<PipId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<PipId> = self
            .parents
            .get(&pip)
            .map(|direct| direct.iter().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if seen.insert(current) {
                if let Some(next) = self.parents.get(&current) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        seen
    }

    pub fn edge_count(&self) -> usize {
        self.parents.values().map(HashSet::len).sum()
    }

    /// Drops all recorded edges and memberships.
    pub fn reset(&mut self) {
        self.parents.clear();
        self.memberships.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pip(id: u64) -> PipId {
        PipId(id)
    }

    #[test]
    fn test_direct_parents() {
        let mut graph = ProvenanceGraph::new(true);
        graph.add_edge(pip(3), pip(1));
        graph.add_edge(pip(3), pip(2));
        let parents = graph.parents(pip(3)).unwrap();
        assert_eq!(parents.len(), 2);
        assert!(parents.contains(&pip(1)));
        assert!(parents.contains(&pip(2)));
    }

    #[test]
    fn test_ancestors_follow_chains() {
        let mut graph = ProvenanceGraph::new(true);
        graph.add_edge(pip(2), pip(1));
        graph.add_edge(pip(3), pip(2));
        graph.add_edge(pip(4), pip(3));
        let ancestors = graph.ancestors(pip(4));
        assert_eq!(ancestors, HashSet::from([pip(1), pip(2), pip(3)]));
    }

    #[test]
    fn test_ancestors_dedup_diamonds() {
        let mut graph = ProvenanceGraph::new(true);
        graph.add_edge(pip(4), pip(2));
        graph.add_edge(pip(4), pip(3));
        graph.add_edge(pip(2), pip(1));
        graph.add_edge(pip(3), pip(1));
        let ancestors = graph.ancestors(pip(4));
        assert_eq!(ancestors, HashSet::from([pip(1), pip(2), pip(3)]));
    }

    #[test]
    fn test_ancestors_of_root_is_empty() {
        let graph = ProvenanceGraph::new(true);
        assert!(graph.ancestors(pip(1)).is_empty());
    }

    #[test]
    fn test_membership() {
        let mut graph = ProvenanceGraph::new(true);
        graph.record_membership(pip(1), MotId(1));
        graph.record_membership(pip(1), MotId(2));
        let mots = graph.mots_of(pip(1)).unwrap();
        assert_eq!(mots.len(), 2);
    }

    #[test]
    fn test_disabled_graph_records_nothing() {
        let mut graph = ProvenanceGraph::new(false);
        graph.add_edge(pip(2), pip(1));
        graph.record_membership(pip(2), MotId(1));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.parents(pip(2)).is_none());
        assert!(graph.mots_of(pip(2)).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut graph = ProvenanceGraph::new(true);
        graph.add_edge(pip(2), pip(1));
        graph.record_membership(pip(2), MotId(1));
        graph.reset();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.mots_of(pip(2)).is_none());
        // Still enabled after a reset.
        graph.add_edge(pip(4), pip(3));
        assert_eq!(graph.edge_count(), 1);
    }
}
