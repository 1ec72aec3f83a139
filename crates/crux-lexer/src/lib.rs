//! Tokenizer for the Crux motif language.
//!
//! The entry point is [`lex`], which scans a [`SourceFile`] into a
//! token stream ending in [`TokenKind::Eof`].

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use crux_types::{Result, SourceFile};

/// Tokenizes a source file.
pub fn lex(source_file: &SourceFile) -> Result<Vec<Token>> {
    Lexer::new(source_file).lex()
}
