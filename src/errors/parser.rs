// src/errors/parser.rs
//! Parser errors (E1xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("expected '{expected}', found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("unexpected token '{found}' starting an expression")]
    #[diagnostic(code(E1002))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("expected a valid type")]
    #[diagnostic(code(E1003), help("types are 'int', 'char', 'boolean', or a class name"))]
    ExpectedType {
        #[label("expected type")]
        span: SourceSpan,
    },

    #[error("variable cannot be of type 'void'")]
    #[diagnostic(code(E1004))]
    VoidVariable {
        #[label("'void' is only valid as a return type")]
        span: SourceSpan,
    },

    #[error("expected identifier, found '{found}'")]
    #[diagnostic(code(E1005))]
    ExpectedIdentifier {
        found: String,
        #[label("expected identifier")]
        span: SourceSpan,
    },

    #[error("expected a statement (let, if, while, do, return), found '{found}'")]
    #[diagnostic(code(E1006))]
    ExpectedStatement {
        found: String,
        #[label("not a statement")]
        span: SourceSpan,
    },

    #[error("the 'do' keyword must be followed by a subroutine call")]
    #[diagnostic(code(E1007))]
    DoWithoutCall {
        #[label("not a subroutine call")]
        span: SourceSpan,
    },

    #[error("class '{class}' must declare at least one constructor")]
    #[diagnostic(code(E1008))]
    MissingConstructor {
        class: String,
        #[label("class declared here")]
        span: SourceSpan,
    },

    #[error("class variables must be declared before subroutines")]
    #[diagnostic(code(E1009))]
    VarAfterSubroutine {
        #[label("declaration appears after a subroutine")]
        span: SourceSpan,
    },

    #[error("only 'static', 'field', 'constructor', 'function', or 'method' are allowed in class scope")]
    #[diagnostic(code(E1010))]
    InvalidClassMember {
        #[label("not a class member")]
        span: SourceSpan,
    },

    #[error("unexpected tokens after class definition")]
    #[diagnostic(code(E1011), help("a single file can contain only one class"))]
    TrailingTokens {
        #[label("starts here")]
        span: SourceSpan,
    },
}
