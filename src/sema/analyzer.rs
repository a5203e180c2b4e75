// src/sema/analyzer.rs

mod expr;

use crate::errors::SemanticError;
use crate::frontend::ast::*;
use crate::frontend::token::Span;
use crate::sema::expression_data::ExpressionData;
use crate::sema::registry::GlobalRegistry;
use crate::sema::symbol_table::{SymbolKind, SymbolTable};
use crate::sema::type_pool::{TypeId, TypePool};

/// Semantic analysis of one class: resolves identifiers, verifies
/// types, and populates the class's symbol table. The registry is
/// read-only here; the analyzer writes only its unit's table and
/// expression side tables.
///
/// Analysis is fail-fast: the first error aborts the unit.
pub struct Analyzer<'a> {
    registry: &'a GlobalRegistry,
    types: &'a TypePool,
    class_name: String,
    class_type: TypeId,
    sub_kind: SubroutineKind,
    return_type: TypeId,
    data: ExpressionData,
}

impl<'a> Analyzer<'a> {
    pub fn new(registry: &'a GlobalRegistry, types: &'a TypePool) -> Self {
        Self {
            registry,
            types,
            class_name: String::new(),
            class_type: types.well_known().void,
            sub_kind: SubroutineKind::Function,
            return_type: types.well_known().void,
            data: ExpressionData::new(),
        }
    }

    /// Walk the class: define class-scope variables, then analyse each
    /// subroutine against a fresh subroutine scope.
    pub fn analyse_class(
        mut self,
        class: &Class,
        table: &mut SymbolTable,
    ) -> Result<ExpressionData, SemanticError> {
        self.class_name = class.name.clone();
        self.class_type = self.types.intern_base(&class.name);

        for dec in &class.vars {
            self.check_type_exists(&dec.ty)?;
            let ty = self.types.intern_type_expr(&dec.ty);
            let kind = match dec.kind {
                ClassVarKind::Static => SymbolKind::Static,
                ClassVarKind::Field => SymbolKind::Field,
            };
            for name in &dec.names {
                self.define(table, &name.name, ty, kind, name.span)?;
            }
        }

        for sub in &class.subs {
            self.analyse_subroutine(sub, table)?;
        }

        Ok(self.data)
    }

    fn analyse_subroutine(
        &mut self,
        sub: &SubroutineDec,
        table: &mut SymbolTable,
    ) -> Result<(), SemanticError> {
        self.sub_kind = sub.kind;
        self.check_type_exists(&sub.return_type)?;
        self.return_type = self.types.intern_type_expr(&sub.return_type);

        if sub.kind == SubroutineKind::Constructor && self.return_type != self.class_type {
            return Err(SemanticError::ConstructorReturnType {
                span: sub.return_type.span.into(),
            });
        }

        table.start_subroutine(&sub.name);

        // A method receives its object as argument 0.
        if sub.kind == SubroutineKind::Method {
            self.define(table, "this", self.class_type, SymbolKind::Arg, sub.span)?;
        }

        for param in &sub.params {
            self.check_type_exists(&param.ty)?;
            let ty = self.types.intern_type_expr(&param.ty);
            self.define(table, &param.name, ty, SymbolKind::Arg, param.span)?;
        }
        for dec in &sub.locals {
            self.check_type_exists(&dec.ty)?;
            let ty = self.types.intern_type_expr(&dec.ty);
            for name in &dec.names {
                self.define(table, &name.name, ty, SymbolKind::Local, name.span)?;
            }
        }

        if !matches!(sub.body.last(), Some(Stmt::Return(_))) {
            return Err(SemanticError::MissingReturn {
                name: sub.name.clone(),
                span: sub.span.into(),
            });
        }

        self.analyse_statements(&sub.body, table)?;
        table.end_subroutine();
        Ok(())
    }

    fn analyse_statements(
        &mut self,
        stmts: &[Stmt],
        table: &SymbolTable,
    ) -> Result<(), SemanticError> {
        for stmt in stmts {
            match stmt {
                Stmt::Let(s) => self.analyse_let(s, table)?,
                Stmt::If(s) => self.analyse_if(s, table)?,
                Stmt::While(s) => self.analyse_while(s, table)?,
                Stmt::Do(s) => {
                    // The call's result is discarded; any return type,
                    // including void, is acceptable.
                    self.analyse_expression(&s.call, table)?;
                }
                Stmt::Return(s) => self.analyse_return(s, table)?,
            }
        }
        Ok(())
    }

    fn analyse_let(&mut self, stmt: &LetStmt, table: &SymbolTable) -> Result<(), SemanticError> {
        let Some(target) = table.lookup(&stmt.name).cloned() else {
            return Err(SemanticError::UnknownIdentifier {
                name: stmt.name.clone(),
                span: stmt.name_span.into(),
            });
        };

        if let Some(index) = &stmt.index {
            // Array elements are word-sized untyped cells, treated as int.
            if !self.types.is_array(target.ty) {
                return Err(SemanticError::NotAnArray {
                    name: stmt.name.clone(),
                    span: stmt.name_span.into(),
                });
            }
            let index_ty = self.analyse_expression(index, table)?;
            self.expect_type(self.types.well_known().int, index_ty, index.span)?;
            let value_ty = self.analyse_expression(&stmt.value, table)?;
            self.expect_type(self.types.well_known().int, value_ty, stmt.value.span)?;
        } else {
            let value_ty = self.analyse_expression(&stmt.value, table)?;
            self.expect_type(target.ty, value_ty, stmt.value.span)?;
        }
        Ok(())
    }

    fn analyse_if(&mut self, stmt: &IfStmt, table: &SymbolTable) -> Result<(), SemanticError> {
        self.analyse_condition(&stmt.cond, table)?;
        self.analyse_statements(&stmt.then_branch, table)?;
        if let Some(else_branch) = &stmt.else_branch {
            self.analyse_statements(else_branch, table)?;
        }
        Ok(())
    }

    fn analyse_while(
        &mut self,
        stmt: &WhileStmt,
        table: &SymbolTable,
    ) -> Result<(), SemanticError> {
        self.analyse_condition(&stmt.cond, table)?;
        self.analyse_statements(&stmt.body, table)
    }

    fn analyse_condition(&mut self, cond: &Expr, table: &SymbolTable) -> Result<(), SemanticError> {
        let ty = self.analyse_expression(cond, table)?;
        if ty != self.types.well_known().boolean {
            return Err(SemanticError::ConditionNotBoolean {
                found: self.types.display(ty),
                span: cond.span.into(),
            });
        }
        Ok(())
    }

    fn analyse_return(
        &mut self,
        stmt: &ReturnStmt,
        table: &SymbolTable,
    ) -> Result<(), SemanticError> {
        if self.sub_kind == SubroutineKind::Constructor {
            let Some(value) = &stmt.value else {
                return Err(SemanticError::ConstructorMustReturnThis {
                    span: stmt.span.into(),
                });
            };
            if !matches!(value.kind, ExprKind::KeywordLit(KeywordConst::This)) {
                return Err(SemanticError::ConstructorMustReturnThis {
                    span: value.span.into(),
                });
            }
            self.analyse_expression(value, table)?;
            return Ok(());
        }

        if self.return_type == self.types.well_known().void {
            if let Some(value) = &stmt.value {
                return Err(SemanticError::ReturnValueInVoid {
                    span: value.span.into(),
                });
            }
            return Ok(());
        }

        let Some(value) = &stmt.value else {
            return Err(SemanticError::MissingReturnValue {
                span: stmt.span.into(),
            });
        };
        let ty = self.analyse_expression(value, table)?;
        self.expect_type(self.return_type, ty, value.span)
    }

    /// Every declared type must name a known class; primitive names
    /// always qualify.
    fn check_type_exists(&self, ty: &TypeExpr) -> Result<(), SemanticError> {
        if !self.registry.class_exists(&ty.base) {
            return Err(SemanticError::UnknownClass {
                name: ty.base.clone(),
                span: ty.span.into(),
            });
        }
        for arg in &ty.generics {
            self.check_type_exists(arg)?;
        }
        Ok(())
    }

    fn define(
        &self,
        table: &mut SymbolTable,
        name: &str,
        ty: TypeId,
        kind: SymbolKind,
        span: Span,
    ) -> Result<(), SemanticError> {
        table
            .define(name, ty, kind, span)
            .map(|_| ())
            .map_err(|e| SemanticError::DuplicateSymbol {
                name: e.name,
                span: span.into(),
                previous: e.previous.into(),
            })
    }

    pub(crate) fn expect_type(
        &self,
        expected: TypeId,
        found: TypeId,
        span: Span,
    ) -> Result<(), SemanticError> {
        if self.types.compatible(expected, found) {
            return Ok(());
        }
        Err(SemanticError::TypeMismatch {
            expected: self.types.display(expected),
            found: self.types.display(found),
            span: span.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;

    fn analyse(source: &str) -> Result<(SymbolTable, ExpressionData), SemanticError> {
        analyse_with(&[], source)
    }

    /// Parse `source` plus any sibling classes, register everything,
    /// then analyse the first class of `source`.
    fn analyse_with(
        siblings: &[&str],
        source: &str,
    ) -> Result<(SymbolTable, ExpressionData), SemanticError> {
        let types = TypePool::new();
        let registry = GlobalRegistry::with_standard_library(&types);

        let mut class = None;
        for (i, text) in std::iter::once(&source)
            .chain(siblings.iter())
            .enumerate()
        {
            let mut parser = Parser::new(text);
            let parsed = parser.parse().expect("test sources must parse");
            registry
                .register_class_decl(&parsed, &types)
                .expect("registration");
            if i == 0 {
                class = Some(parsed);
            }
        }
        let class = class.expect("one source required");

        let mut table = SymbolTable::new();
        let analyzer = Analyzer::new(&registry, &types);
        let data = analyzer.analyse_class(&class, &mut table)?;
        Ok((table, data))
    }

    #[test]
    fn class_vars_and_locals_get_indices() {
        let (table, _) = analyse(
            "class Point {
                field int x, y;
                static int count;
                constructor Point new(int ax) {
                    var int t;
                    let x = ax;
                    let t = 0;
                    return this;
                }
            }",
        )
        .expect("clean analysis");

        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.index_of("y"), Some(1));
        assert_eq!(table.index_of("count"), Some(0));
        assert_eq!(table.kind_of("count"), Some(SymbolKind::Static));
        assert_eq!(table.var_count(SymbolKind::Field), 2);
    }

    #[test]
    fn method_defines_this_at_arg_zero() {
        let (mut table, _) = analyse(
            "class Point {
                field int x;
                constructor Point new() { return this; }
                method int shifted(int dx) { return x + dx; }
            }",
        )
        .expect("clean analysis");

        assert!(table.enter_subroutine("shifted"));
        assert_eq!(table.index_of("this"), Some(0));
        assert_eq!(table.index_of("dx"), Some(1));
        assert_eq!(table.kind_of("this"), Some(SymbolKind::Arg));
    }

    #[test]
    fn function_args_start_at_zero() {
        let (mut table, _) = analyse(
            "class A {
                constructor A new() { return this; }
                function int twice(int n) { return n + n; }
            }",
        )
        .expect("clean analysis");

        assert!(table.enter_subroutine("twice"));
        assert_eq!(table.index_of("n"), Some(0));
    }

    #[test]
    fn binary_type_mismatch_is_reported() {
        let err = analyse(
            "class A {
                constructor A new() {
                    var int b;
                    let b = 1 + true;
                    return this;
                }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::BinaryTypeMismatch { op: '+', .. }
        ));
    }

    #[test]
    fn condition_must_be_boolean() {
        let err = analyse(
            "class A {
                constructor A new() {
                    while (1) { do Output.println(); }
                    return this;
                }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ConditionNotBoolean { .. }));
    }

    #[test]
    fn unknown_identifier_is_fatal() {
        let err = analyse(
            "class A {
                constructor A new() { let nope = 1; return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownIdentifier { name, .. } if name == "nope"
        ));
    }

    #[test]
    fn unknown_class_in_declaration() {
        let err = analyse(
            "class A {
                field Widget w;
                constructor A new() { return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownClass { name, .. } if name == "Widget"
        ));
    }

    #[test]
    fn duplicate_symbol_and_shadowing_are_rejected() {
        let err = analyse(
            "class A {
                field int x;
                constructor A new() { var int x; return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::DuplicateSymbol { name, .. } if name == "x"
        ));
    }

    #[test]
    fn indexed_let_requires_array_and_int() {
        let err = analyse(
            "class A {
                field int x;
                constructor A new() { let x[0] = 1; return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::NotAnArray { .. }));

        analyse(
            "class A {
                field Array a;
                constructor A new() { let a[2] = 7; return this; }
            }",
        )
        .expect("array write is clean");
    }

    #[test]
    fn null_assigns_to_class_types() {
        analyse_with(
            &["class B { constructor B new() { return this; } }"],
            "class A {
                field B other;
                constructor A new() { let other = null; return this; }
            }",
        )
        .expect("null unifies with class types");

        let err = analyse(
            "class A {
                field int x;
                constructor A new() { let x = null; return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn return_shape_is_checked() {
        let err = analyse(
            "class A {
                constructor A new() { return this; }
                function void f() { return 1; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ReturnValueInVoid { .. }));

        let err = analyse(
            "class A {
                constructor A new() { return this; }
                function int g() { return; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::MissingReturnValue { .. }));

        let err = analyse(
            "class A {
                constructor A new() { return this; }
                function void h() { do Output.println(); }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::MissingReturn { .. }));
    }

    #[test]
    fn constructor_must_return_this() {
        let err = analyse(
            "class A {
                constructor A new() { return 1; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ConstructorMustReturnThis { .. }));
    }

    #[test]
    fn constructor_return_type_must_match_class() {
        let err = analyse(
            "class A {
                constructor int new() { return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ConstructorReturnType { .. }));
    }

    #[test]
    fn this_is_forbidden_in_functions() {
        let err = analyse(
            "class A {
                constructor A new() { return this; }
                function A me() { return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ThisInFunction { .. }));
    }
}
