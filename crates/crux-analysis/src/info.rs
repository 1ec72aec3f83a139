//! Whole-program summary.

use crate::depths::{effective_duration, leaf_infos};
use crux_types::ast::Program;
use serde::{Deserialize, Serialize};

/// Static totals for a program's analyzed expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgramInfo {
    /// Pips contributed by every leaf.
    pub pip_count: usize,
    /// Greatest leaf depth; 0 for a program without binary operators.
    pub pip_depth: u32,
    /// Duration of the fundamental cell: the first leaf at the greatest
    /// depth.
    pub duration: f64,
}

pub fn program_info(program: &Program) -> ProgramInfo {
    let leaves = leaf_infos(program);
    let pip_count = leaves.iter().map(|l| l.pip_count).sum();
    let pip_depth = leaves.iter().map(|l| l.depth).max().unwrap_or(0);
    let duration = effective_duration(&leaves);
    ProgramInfo {
        pip_count,
        pip_depth,
        duration,
    }
}
