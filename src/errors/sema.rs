// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("duplicate class '{name}'")]
    #[diagnostic(code(E2001))]
    DuplicateClass {
        name: String,
        #[label("class already registered")]
        span: SourceSpan,
    },

    #[error("duplicate subroutine '{name}' in class '{class}'")]
    #[diagnostic(code(E2002))]
    DuplicateSubroutine {
        class: String,
        name: String,
        #[label("already declared in this class")]
        span: SourceSpan,
    },

    #[error("duplicate symbol '{name}'")]
    #[diagnostic(
        code(E2003),
        help("subroutine-scope names may not shadow class-scope names")
    )]
    DuplicateSymbol {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
        #[label("first declared here")]
        previous: SourceSpan,
    },

    #[error("unknown identifier '{name}'")]
    #[diagnostic(code(E2004))]
    UnknownIdentifier {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("unknown class '{name}'")]
    #[diagnostic(code(E2005))]
    UnknownClass {
        name: String,
        #[label("no class with this name")]
        span: SourceSpan,
    },

    #[error("class '{class}' has no subroutine '{name}'")]
    #[diagnostic(code(E2006))]
    UnknownSubroutine {
        class: String,
        name: String,
        #[label("not found")]
        span: SourceSpan,
    },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(E2007))]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2008))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("type mismatch on binary operator '{op}'")]
    #[diagnostic(code(E2009))]
    BinaryTypeMismatch {
        op: char,
        #[label("operand types do not fit this operator")]
        span: SourceSpan,
    },

    #[error("condition must be boolean, found {found}")]
    #[diagnostic(code(E2010))]
    ConditionNotBoolean {
        found: String,
        #[label("expected boolean")]
        span: SourceSpan,
    },

    #[error("'{name}' is not an Array")]
    #[diagnostic(code(E2011))]
    NotAnArray {
        name: String,
        #[label("indexed here")]
        span: SourceSpan,
    },

    #[error("'return' without a value in a non-void subroutine")]
    #[diagnostic(code(E2012))]
    MissingReturnValue {
        #[label("expected a return value")]
        span: SourceSpan,
    },

    #[error("'return' with a value in a void subroutine")]
    #[diagnostic(code(E2013))]
    ReturnValueInVoid {
        #[label("void subroutines return nothing")]
        span: SourceSpan,
    },

    #[error("subroutine '{name}' is missing a trailing 'return' statement")]
    #[diagnostic(code(E2014))]
    MissingReturn {
        name: String,
        #[label("subroutine declared here")]
        span: SourceSpan,
    },

    #[error("a constructor must end with 'return this;'")]
    #[diagnostic(code(E2015))]
    ConstructorMustReturnThis {
        #[label("returns something else")]
        span: SourceSpan,
    },

    #[error("a constructor must declare its own class as return type")]
    #[diagnostic(code(E2016))]
    ConstructorReturnType {
        #[label("wrong return type")]
        span: SourceSpan,
    },

    #[error("'this' cannot be used inside a function")]
    #[diagnostic(code(E2017), help("functions are static; use a method or constructor"))]
    ThisInFunction {
        #[label("used here")]
        span: SourceSpan,
    },

    #[error("cannot call method '{name}' without a receiver here")]
    #[diagnostic(
        code(E2018),
        help("bare method calls are only valid inside another method of the same class")
    )]
    MethodCallWithoutReceiver {
        name: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("'{class}.{name}' is not a method")]
    #[diagnostic(code(E2019), help("call functions and constructors through the class name"))]
    NotAMethod {
        class: String,
        name: String,
        #[label("called through an instance")]
        span: SourceSpan,
    },

    #[error("cannot call method '{class}.{name}' through the class name")]
    #[diagnostic(code(E2020), help("methods need an instance receiver"))]
    MethodCallOnClass {
        class: String,
        name: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("type '{found}' has no subroutines")]
    #[diagnostic(code(E2021))]
    ReceiverNotAnObject {
        found: String,
        #[label("receiver has a primitive type")]
        span: SourceSpan,
    },
}

/// Program-level validation of the `Main.main` entry point. These have
/// no single source location, so they render as plain driver errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MainEntryError {
    #[error("'Main.main' was not found; the program entry point is missing")]
    Missing,
    #[error("'Main.main' must be a function, not a method or constructor")]
    NotAFunction,
    #[error("'Main.main' must have a 'void' return type")]
    NotVoid,
}
