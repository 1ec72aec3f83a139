//! Crux engine facade: the full pipeline behind one typed API.
//!
//! ```text
//! Crux Source → Lexer → Parser → AST → Evaluator → per-section Mots
//!                                  └──→ Analyzer  → static metrics
//! ```
//!
//! Evaluation and analysis are independent consumers of the same AST:
//! [`interp`] runs both and merges their results, while the
//! `*_from_root` and `numeric_value_indices_*` functions answer static
//! questions without drawing a single random value.
//!
//! ```
//! let result = crux::interp_seeded("[0, 1] * [12]", "demo").unwrap();
//! assert_eq!(result.sections[0].to_string(), "[12, 13]");
//! assert_eq!(result.pip_count, 3);
//! ```

use crux_types::ast::Program;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crux_analysis::{LeafInfo, ProgramInfo};
pub use crux_eval::{
    Binding, Environment, EvalContext, EvalError, EvalOptions, Evaluator, Family, OperatorKind,
    ProvenanceGraph, Registry, SeededRng,
};
pub use crux_types::ast;
pub use crux_types::{Mot, MotId, MotValue, Pip, PipId, SourceFile, Span, SyntaxError};

/// File name used for diagnostics on sources passed as plain strings.
const SOURCE_NAME: &str = "<crux>";

/// Any way a Crux program can fail.
#[derive(Debug, Error)]
pub enum CruxError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// An evaluated program together with its metadata.
///
/// `pip_count` and `pip_depth` come from static analysis and are stable
/// across runs; `duration` is dynamic: the largest per-section total
/// time scale the evaluation actually produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpResult {
    /// One flattened mot per section, in source order.
    pub sections: Vec<Mot>,
    pub pip_count: usize,
    pub pip_depth: u32,
    pub duration: f64,
}

/// Parses `source` into a program without evaluating it.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let file = SourceFile::new(SOURCE_NAME, source);
    crux_parser::parse(&file)
}

/// Parses and evaluates `source` with fresh ambient entropy.
pub fn interp(source: &str) -> Result<InterpResult, CruxError> {
    interp_with(source, EvalContext::new())
}

/// Parses and evaluates `source` reproducibly: the same seed replays
/// the same draws, pip ids, and results.
pub fn interp_seeded(source: &str, seed: &str) -> Result<InterpResult, CruxError> {
    interp_with(source, EvalContext::with_seed(seed))
}

fn interp_with(source: &str, mut ctx: EvalContext) -> Result<InterpResult, CruxError> {
    let program = parse(source)?;
    let info = crux_analysis::program_info(&program);
    let sections = Evaluator::new(&mut ctx).eval_program(&program)?;
    let duration = sections.iter().map(Mot::duration).fold(0.0, f64::max);
    Ok(InterpResult {
        sections,
        pip_count: info.pip_count,
        pip_depth: info.pip_depth,
        duration,
    })
}

/// Static totals for `source`; random values stay unresolved.
pub fn program_info(source: &str) -> Result<ProgramInfo, CruxError> {
    Ok(crux_analysis::program_info(&parse(source)?))
}

/// Leaf mots of the final expression paired with their depths, in
/// source order. Each [`LeafInfo`] locates its leaf by span and step
/// offsets and carries the leaf's static pip count and duration.
pub fn mot_depths_from_root(source: &str) -> Result<Vec<LeafInfo>, CruxError> {
    Ok(crux_analysis::leaf_infos(&parse(source)?))
}

/// Greatest leaf depth of the final expression.
pub fn height_from_leaves(source: &str) -> Result<u32, CruxError> {
    Ok(crux_analysis::height_from_leaves(&parse(source)?))
}

/// Source offsets of the step numbers of every leaf exactly at `depth`,
/// grouped per leaf.
pub fn numeric_value_indices_at_depth(
    source: &str,
    depth: u32,
) -> Result<Vec<Vec<usize>>, CruxError> {
    Ok(crux_analysis::offsets_at_depth(&parse(source)?, depth))
}

/// Same grouping for every leaf at `depth` or deeper.
pub fn numeric_value_indices_at_depth_or_above(
    source: &str,
    depth: u32,
) -> Result<Vec<Vec<usize>>, CruxError> {
    Ok(crux_analysis::offsets_at_or_above(&parse(source)?, depth))
}
