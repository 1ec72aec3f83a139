//! Evaluation context: id allocation, the ambient random stream, and
//! the provenance graph.
//!
//! The context is the only mutable state shared across an evaluation.
//! Two runs with fresh contexts share nothing, so seeded runs replay
//! identically.

use crate::provenance::ProvenanceGraph;
use crate::rng::SeededRng;
use crux_types::{MotId, PipId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Counter mixed into entropy seeds so contexts created within the same
/// clock tick still differ.
static CONTEXT_SALT: AtomicU64 = AtomicU64::new(0);

fn entropy_seed() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let salt = CONTEXT_SALT.fetch_add(1, Ordering::Relaxed);
    format!("{nanos}-{salt}")
}

/// Construction options for [`EvalContext`].
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Record derivation edges and mot membership during evaluation.
    pub provenance: bool,
    /// Seed for the ambient generator; `None` draws fresh entropy.
    pub ambient_seed: Option<String>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            provenance: true,
            ambient_seed: None,
        }
    }
}

pub struct EvalContext {
    next_pip: u64,
    next_mot: u64,
    /// Stream for unseeded random values.
    pub ambient: SeededRng,
    pub provenance: ProvenanceGraph,
}

impl EvalContext {
    /// A context with fresh entropy for the ambient stream.
    pub fn new() -> Self {
        Self::with_options(EvalOptions::default())
    }

    /// A fully deterministic context: the ambient stream is seeded.
    pub fn with_seed(seed: &str) -> Self {
        Self::with_options(EvalOptions {
            ambient_seed: Some(seed.to_string()),
            ..EvalOptions::default()
        })
    }

    pub fn with_options(options: EvalOptions) -> Self {
        let seed = options.ambient_seed.unwrap_or_else(entropy_seed);
        EvalContext {
            next_pip: 1,
            next_mot: 1,
            ambient: SeededRng::new(&seed),
            provenance: ProvenanceGraph::new(options.provenance),
        }
    }

    /// Mot id 0 stays reserved for detached mots.
    pub fn next_mot_id(&mut self) -> MotId {
        let id = MotId(self.next_mot);
        self.next_mot += 1;
        id
    }

    pub fn next_pip_id(&mut self) -> PipId {
        let id = PipId(self.next_pip);
        self.next_pip += 1;
        id
    }

    /// Clears provenance and restarts id allocation for a fresh run.
    pub fn reset(&mut self) {
        self.next_pip = 1;
        self.next_mot = 1;
        self.provenance.reset();
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
