//! Shared types for the Crux motif language.
//!
//! This crate holds everything the lexer, parser, evaluator, and static
//! analysis agree on: source [`Span`]s and [`SourceFile`]s, the [`ast`],
//! the runtime [`Mot`] and [`Pip`] values, and [`SyntaxError`].

pub mod ast;

mod error;
mod mot;
mod span;

pub use error::SyntaxError;
pub use mot::{Mot, MotId, MotValue, Pip, PipId, REST_TAG};
pub use span::{SourceFile, Span};

/// Convenience alias used by the lexer and parser.
pub type Result<T> = std::result::Result<T, SyntaxError>;
