//! Recursive descent parser for the Crux motif language.
//!
//! The entry point is [`parse`], which tokenizes a [`SourceFile`] and
//! parses it into a [`Program`]. Parsing stops at the first failure and
//! reports the rightmost position reached with the set of expected
//! tokens.

mod parse_expr;
mod parse_stmt;
mod parse_value;
mod parser;

pub use parser::Parser;

use crux_types::ast::Program;
use crux_types::{Result, SourceFile};

/// Tokenizes and parses a source file.
pub fn parse(source_file: &SourceFile) -> Result<Program> {
    let tokens = crux_lexer::lex(source_file)?;
    Parser::new(tokens, source_file).parse()
}
