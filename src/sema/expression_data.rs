// src/sema/expression_data.rs
//
// Per-unit analysis results, keyed by expression NodeId. The AST stays
// immutable after parsing; the analyzer writes each slot exactly once
// and code generation only reads.

use rustc_hash::FxHashMap;

use crate::frontend::ast::NodeId;
use crate::sema::type_pool::TypeId;

/// How a resolved call pushes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Bare method call inside a method: push `pointer 0`.
    This,
    /// Explicit receiver expression: generate it, leaving the object on
    /// the stack.
    Value,
}

/// Dispatch decision for a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Function or constructor: no implicit `this`; a receiver, if
    /// written, was a class name and produces no code.
    Static { class: String },
    /// Instance method: the receiver object is argument 0.
    Method { class: String, receiver: Receiver },
}

/// Side tables produced by analysis and consumed by code generation.
#[derive(Debug, Default)]
pub struct ExpressionData {
    types: FxHashMap<NodeId, TypeId>,
    calls: FxHashMap<NodeId, CallTarget>,
}

impl ExpressionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(&mut self, id: NodeId, ty: TypeId) {
        self.types.insert(id, ty);
    }

    pub fn type_of(&self, id: NodeId) -> Option<TypeId> {
        self.types.get(&id).copied()
    }

    pub fn record_call(&mut self, id: NodeId, target: CallTarget) {
        self.calls.insert(id, target);
    }

    pub fn call_target(&self, id: NodeId) -> Option<&CallTarget> {
        self.calls.get(&id)
    }
}
