//! Evaluator for Crux programs.
//!
//! Turns a parsed [`Program`](crux_types::ast::Program) into one mot per
//! section. The heart of the crate is [`Evaluator`], which owns the
//! binding [`Environment`] and borrows an [`EvalContext`] for id
//! allocation, ambient randomness, and the provenance graph:
//!
//! ```
//! use crux_eval::{EvalContext, Evaluator};
//! use crux_types::SourceFile;
//!
//! let source = SourceFile::new("<demo>", "[0, 1, 2] * [10]");
//! let program = crux_parser::parse(&source).unwrap();
//! let mut ctx = EvalContext::with_seed("demo");
//! let sections = Evaluator::new(&mut ctx).eval_program(&program).unwrap();
//! assert_eq!(sections[0].to_string(), "[10, 11, 12]");
//! ```

mod context;
mod env;
mod error;
mod evaluator;
mod provenance;
mod registry;
mod rng;

pub use context::{EvalContext, EvalOptions};
pub use env::{Binding, Environment};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use provenance::ProvenanceGraph;
pub use registry::{Combine, Family, OperatorKind, Registry};
pub use rng::{fnv1a, uniform_int, SeededRng};
