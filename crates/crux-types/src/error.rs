//! Syntax errors.
//!
//! Lexing and parsing stop at the first failure and report the rightmost
//! point reached, together with the set of tokens that would have allowed
//! the parse to continue. Errors serialize to JSON for host tooling.

use crate::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lexing or parsing failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Human-readable description of what was found.
    pub message: String,
    /// Byte offset of the failure in the source text.
    pub position: usize,
    /// 1-based line of the failure.
    pub line: u32,
    /// 1-based column of the failure.
    pub col: u32,
    /// Descriptions of tokens that would have allowed the parse to
    /// continue, in the order the grammar tried them.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub expected: Vec<String>,
}

impl SyntaxError {
    /// Builds an error at `position`, resolving line and column against
    /// the source file.
    pub fn new(
        message: impl Into<String>,
        position: usize,
        expected: Vec<String>,
        file: &SourceFile,
    ) -> Self {
        let (line, col) = file.line_col(position);
        SyntaxError {
            message: message.into(),
            position,
            line,
            col,
            expected,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)?;
        if !self.expected.is_empty() {
            write!(f, " (expected {})", self.expected.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}
