// src/errors/lexer.rs
//! Lexer errors (E0xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(
        code(E0002),
        help("strings cannot span lines; add a closing '\"' before the line ends")
    )]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("unterminated block comment")]
    #[diagnostic(code(E0003), help("add a closing '*/'"))]
    UnterminatedBlockComment {
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("integer literal out of range")]
    #[diagnostic(code(E0004), help("integer constants must fit in 0..32767"))]
    IntegerOutOfRange {
        #[label("does not fit in 0..32767")]
        span: SourceSpan,
    },
}
