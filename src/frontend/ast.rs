// src/frontend/ast.rs

use crate::frontend::token::{Keyword, Span};

/// Unique identifier for expression nodes. Analysis results are keyed
/// by these ids (see `sema::ExpressionData`), so the AST itself stays
/// immutable after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

/// A syntactic type: a primitive or class base name plus optional
/// generic arguments. Only the `Array<T>` display form uses generics;
/// checking treats `Array<T>` as `Array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub base: String,
    pub generics: Vec<TypeExpr>,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(base: impl Into<String>, span: Span) -> Self {
        Self {
            base: base.into(),
            generics: Vec::new(),
            span,
        }
    }
}

/// A Jack translation unit: exactly one class.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub vars: Vec<ClassVarDec>,
    pub subs: Vec<SubroutineDec>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassVarKind {
    Static,
    Field,
}

/// `static int x, y;` / `field Point p;`
#[derive(Debug, Clone)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub ty: TypeExpr,
    pub names: Vec<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl SubroutineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubroutineKind::Constructor => "constructor",
            SubroutineKind::Function => "function",
            SubroutineKind::Method => "method",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubroutineDec {
    pub kind: SubroutineKind,
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
    pub locals: Vec<VarDec>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: String,
    pub span: Span,
}

/// `var int i, sum;`
#[derive(Debug, Clone)]
pub struct VarDec {
    pub ty: TypeExpr,
    pub names: Vec<Ident>,
    pub span: Span,
}

/// A declared name with its location.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    Return(ReturnStmt),
}

/// `let name = value;` or `let name[index] = value;`
#[derive(Debug, Clone)]
pub struct LetStmt {
    pub name: String,
    pub name_span: Span,
    pub index: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Vec<Stmt>,
    pub else_branch: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `do expr;`; the parser guarantees `call` is `ExprKind::Call`.
#[derive(Debug, Clone)]
pub struct DoStmt {
    pub call: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(u16),
    StringLit(String),
    KeywordLit(KeywordConst),
    Identifier(IdentExpr),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Index(Box<IndexExpr>),
    Call(Box<CallExpr>),
}

impl Expr {
    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call(_))
    }
}

/// `true`, `false`, `null`, `this`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConst {
    True,
    False,
    Null,
    This,
}

impl KeywordConst {
    pub fn from_keyword(kw: Keyword) -> Option<KeywordConst> {
        match kw {
            Keyword::True => Some(KeywordConst::True),
            Keyword::False => Some(KeywordConst::False),
            Keyword::Null => Some(KeywordConst::Null),
            Keyword::This => Some(KeywordConst::This),
            _ => None,
        }
    }
}

/// A name in expression position. `generics` is populated only for the
/// `Array<T>` display form.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    pub generics: Vec<TypeExpr>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: char,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: char,
    pub operand: Expr,
}

/// `base[index]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub base: Expr,
    pub index: Expr,
}

/// `name(args)` or `receiver.name(args)`.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub receiver: Option<Expr>,
    pub name: String,
    pub name_span: Span,
    pub args: Vec<Expr>,
}
