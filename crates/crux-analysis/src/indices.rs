//! Per-leaf views derived from the walker.

use crate::depths::leaf_infos;
use crux_types::ast::Program;

/// Depth of each leaf in source order, root at 0.
pub fn depths_from_root(program: &Program) -> Vec<u32> {
    leaf_infos(program).iter().map(|l| l.depth).collect()
}

/// Greatest leaf depth, 0 when the program has no leaves.
pub fn height_from_leaves(program: &Program) -> u32 {
    leaf_infos(program).iter().map(|l| l.depth).max().unwrap_or(0)
}

/// Step-number source offsets of every leaf exactly at `depth`, one
/// group per leaf in source order.
pub fn offsets_at_depth(program: &Program, depth: u32) -> Vec<Vec<usize>> {
    leaf_infos(program)
        .into_iter()
        .filter(|l| l.depth == depth)
        .map(|l| l.numeric_offsets)
        .collect()
}

/// Same grouping for every leaf at `depth` or deeper.
pub fn offsets_at_or_above(program: &Program, depth: u32) -> Vec<Vec<usize>> {
    leaf_infos(program)
        .into_iter()
        .filter(|l| l.depth >= depth)
        .map(|l| l.numeric_offsets)
        .collect()
}
