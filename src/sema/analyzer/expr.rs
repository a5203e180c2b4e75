// src/sema/analyzer/expr.rs
//
// Expression typing and call resolution. Every expression node the
// analyzer visits gets its type recorded in the unit's ExpressionData;
// call sites additionally get a dispatch target.

use crate::errors::SemanticError;
use crate::frontend::ast::*;
use crate::frontend::token::Span;
use crate::sema::analyzer::Analyzer;
use crate::sema::expression_data::{CallTarget, Receiver};
use crate::sema::registry::MethodSignature;
use crate::sema::symbol_table::SymbolTable;
use crate::sema::type_pool::TypeId;

impl<'a> Analyzer<'a> {
    pub(crate) fn analyse_expression(
        &mut self,
        expr: &Expr,
        table: &SymbolTable,
    ) -> Result<TypeId, SemanticError> {
        let ty = match &expr.kind {
            ExprKind::IntLit(_) => self.types.well_known().int,
            ExprKind::StringLit(_) => self.types.well_known().string,
            ExprKind::KeywordLit(value) => self.analyse_keyword_lit(*value, expr.span)?,
            ExprKind::Identifier(ident) => {
                let Some(ty) = table.type_of(&ident.name) else {
                    return Err(SemanticError::UnknownIdentifier {
                        name: ident.name.clone(),
                        span: expr.span.into(),
                    });
                };
                ty
            }
            ExprKind::Unary(unary) => self.analyse_unary(unary, table)?,
            ExprKind::Binary(binary) => self.analyse_binary(binary, expr.span, table)?,
            ExprKind::Index(index) => self.analyse_index(index, table)?,
            ExprKind::Call(call) => self.analyse_call(expr.id, call, expr.span, table)?,
        };

        self.data.record_type(expr.id, ty);
        Ok(ty)
    }

    fn analyse_keyword_lit(
        &mut self,
        value: KeywordConst,
        span: Span,
    ) -> Result<TypeId, SemanticError> {
        match value {
            KeywordConst::True | KeywordConst::False => Ok(self.types.well_known().boolean),
            KeywordConst::Null => Ok(self.types.well_known().null),
            KeywordConst::This => {
                if self.sub_kind == SubroutineKind::Function {
                    return Err(SemanticError::ThisInFunction { span: span.into() });
                }
                Ok(self.class_type)
            }
        }
    }

    fn analyse_unary(
        &mut self,
        unary: &UnaryExpr,
        table: &SymbolTable,
    ) -> Result<TypeId, SemanticError> {
        let operand = self.analyse_expression(&unary.operand, table)?;
        let int = self.types.well_known().int;
        let boolean = self.types.well_known().boolean;

        match unary.op {
            '-' => {
                self.expect_type(int, operand, unary.operand.span)?;
                Ok(int)
            }
            // '~' flips int bitwise and boolean logically.
            _ => {
                if operand == int || operand == boolean {
                    Ok(operand)
                } else {
                    Err(SemanticError::BinaryTypeMismatch {
                        op: unary.op,
                        span: unary.operand.span.into(),
                    })
                }
            }
        }
    }

    fn analyse_binary(
        &mut self,
        binary: &BinaryExpr,
        span: Span,
        table: &SymbolTable,
    ) -> Result<TypeId, SemanticError> {
        let left = self.analyse_expression(&binary.left, table)?;
        let right = self.analyse_expression(&binary.right, table)?;
        let int = self.types.well_known().int;
        let boolean = self.types.well_known().boolean;

        let both_int = left == int && right == int;
        match binary.op {
            '+' | '-' | '*' | '/' | '&' | '|' if both_int => Ok(int),
            '<' | '>' if both_int => Ok(boolean),
            '=' if self.types.compatible(left, right)
                || self.types.compatible(right, left) =>
            {
                Ok(boolean)
            }
            op => Err(SemanticError::BinaryTypeMismatch {
                op,
                span: span.into(),
            }),
        }
    }

    fn analyse_index(
        &mut self,
        index: &IndexExpr,
        table: &SymbolTable,
    ) -> Result<TypeId, SemanticError> {
        let int = self.types.well_known().int;

        let base = self.analyse_expression(&index.base, table)?;
        if !self.types.is_array(base) {
            return Err(SemanticError::TypeMismatch {
                expected: "Array".to_string(),
                found: self.types.display(base),
                span: index.base.span.into(),
            });
        }
        let index_ty = self.analyse_expression(&index.index, table)?;
        self.expect_type(int, index_ty, index.index.span)?;
        Ok(int)
    }

    /// Resolve a call through its receiver shape, check the argument
    /// list against the signature, and record the dispatch target.
    fn analyse_call(
        &mut self,
        id: NodeId,
        call: &CallExpr,
        span: Span,
        table: &SymbolTable,
    ) -> Result<TypeId, SemanticError> {
        let (sig, target) = self.resolve_call(call, table)?;

        if call.args.len() != sig.params.len() {
            return Err(SemanticError::WrongArgumentCount {
                expected: sig.params.len(),
                found: call.args.len(),
                span: span.into(),
            });
        }
        for (arg, &param) in call.args.iter().zip(&sig.params) {
            let arg_ty = self.analyse_expression(arg, table)?;
            self.expect_type(param, arg_ty, arg.span)?;
        }

        self.data.record_call(id, target);
        Ok(sig.return_type)
    }

    fn resolve_call(
        &mut self,
        call: &CallExpr,
        table: &SymbolTable,
    ) -> Result<(MethodSignature, CallTarget), SemanticError> {
        match &call.receiver {
            // Bare call: a function/constructor of the current class,
            // or a method on the implicit `this` of a method body.
            None => {
                let class = self.class_name.clone();
                let sig = self.lookup_signature(&class, call)?;
                if sig.is_static() {
                    let target = CallTarget::Static { class };
                    Ok((sig, target))
                } else {
                    if self.sub_kind != SubroutineKind::Method {
                        return Err(SemanticError::MethodCallWithoutReceiver {
                            name: call.name.clone(),
                            span: call.name_span.into(),
                        });
                    }
                    let target = CallTarget::Method {
                        class,
                        receiver: Receiver::This,
                    };
                    Ok((sig, target))
                }
            }
            Some(receiver) => {
                // A bare identifier receiver is a variable if defined,
                // otherwise a class name.
                if let ExprKind::Identifier(ident) = &receiver.kind {
                    if table.lookup(&ident.name).is_none() {
                        let class = ident.name.clone();
                        if !self.registry.class_exists(&class) {
                            return Err(SemanticError::UnknownClass {
                                name: class,
                                span: receiver.span.into(),
                            });
                        }
                        let sig = self.lookup_signature(&class, call)?;
                        if !sig.is_static() {
                            return Err(SemanticError::MethodCallOnClass {
                                class,
                                name: call.name.clone(),
                                span: call.name_span.into(),
                            });
                        }
                        let target = CallTarget::Static { class };
                        return Ok((sig, target));
                    }
                }

                // Any other receiver is a value; its class carries the
                // method. The variable case lands here too, so the
                // receiver expression gets a recorded type either way.
                let receiver_ty = self.analyse_expression(receiver, table)?;
                let Some(class) = self.types.class_name(receiver_ty) else {
                    return Err(SemanticError::ReceiverNotAnObject {
                        found: self.types.display(receiver_ty),
                        span: receiver.span.into(),
                    });
                };
                let sig = self.lookup_signature(&class, call)?;
                if sig.is_static() {
                    return Err(SemanticError::NotAMethod {
                        class,
                        name: call.name.clone(),
                        span: call.name_span.into(),
                    });
                }
                let target = CallTarget::Method {
                    class,
                    receiver: Receiver::Value,
                };
                Ok((sig, target))
            }
        }
    }

    fn lookup_signature(
        &self,
        class: &str,
        call: &CallExpr,
    ) -> Result<MethodSignature, SemanticError> {
        self.registry.signature(class, &call.name).ok_or_else(|| {
            SemanticError::UnknownSubroutine {
                class: class.to_string(),
                name: call.name.clone(),
                span: call.name_span.into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;
    use crate::sema::expression_data::ExpressionData;
    use crate::sema::registry::GlobalRegistry;
    use crate::sema::type_pool::TypePool;

    fn analyse_all(sources: &[&str]) -> Result<Vec<ExpressionData>, SemanticError> {
        let types = TypePool::new();
        let registry = GlobalRegistry::with_standard_library(&types);

        let mut classes = Vec::new();
        for text in sources {
            let mut parser = Parser::new(text);
            let class = parser.parse().expect("test sources must parse");
            registry
                .register_class_decl(&class, &types)
                .expect("registration");
            classes.push(class);
        }

        classes
            .into_iter()
            .map(|class| {
                let mut table = SymbolTable::new();
                Analyzer::new(&registry, &types).analyse_class(&class, &mut table)
            })
            .collect()
    }

    fn analyse_one(source: &str) -> Result<ExpressionData, SemanticError> {
        analyse_all(&[source]).map(|mut v| v.remove(0))
    }

    #[test]
    fn static_call_through_class_name() {
        analyse_one(
            "class A {
                constructor A new() {
                    do Output.printInt(Math.max(1, 2));
                    return this;
                }
            }",
        )
        .expect("clean analysis");
    }

    #[test]
    fn method_call_on_variable() {
        analyse_all(&[
            "class Counter {
                field int n;
                constructor Counter new() { let n = 0; return this; }
                method void bump() { let n = n + 1; return; }
                method int value() { return n; }
            }",
            "class Main {
                constructor Main new() { return this; }
                function void main() {
                    var Counter c;
                    var int v;
                    let c = Counter.new();
                    do c.bump();
                    let v = c.value();
                    return;
                }
            }",
        ])
        .expect("clean analysis");
    }

    #[test]
    fn bare_method_call_inside_method() {
        analyse_one(
            "class A {
                constructor A new() { return this; }
                method void helper() { return; }
                method void work() { do helper(); return; }
            }",
        )
        .expect("clean analysis");
    }

    #[test]
    fn bare_method_call_outside_method_is_rejected() {
        let err = analyse_one(
            "class A {
                constructor A new() { return this; }
                method void helper() { return; }
                function void work() { do helper(); return; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::MethodCallWithoutReceiver { .. }
        ));
    }

    #[test]
    fn method_through_class_name_is_rejected() {
        let err = analyse_one(
            "class A {
                constructor A new() { return this; }
                method void m() { return; }
                function void f() { do A.m(); return; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::MethodCallOnClass { .. }));
    }

    #[test]
    fn function_through_instance_is_rejected() {
        let err = analyse_all(&[
            "class B {
                constructor B new() { return this; }
                function void f() { return; }
            }",
            "class A {
                constructor A new() {
                    var B b;
                    let b = B.new();
                    do b.f();
                    return this;
                }
            }",
        ])
        .unwrap_err();
        assert!(matches!(err, SemanticError::NotAMethod { .. }));
    }

    #[test]
    fn unknown_receiver_class() {
        let err = analyse_one(
            "class A {
                constructor A new() { do Nope.f(); return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::UnknownClass { name, .. } if name == "Nope"));
    }

    #[test]
    fn unknown_subroutine_on_known_class() {
        let err = analyse_one(
            "class A {
                constructor A new() { do Math.cbrt(8); return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownSubroutine { class, .. } if class == "Math"
        ));
    }

    #[test]
    fn argument_count_and_types_are_checked() {
        let err = analyse_one(
            "class A {
                constructor A new() { do Math.max(1); return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::WrongArgumentCount {
                expected: 2,
                found: 1,
                ..
            }
        ));

        let err = analyse_one(
            "class A {
                constructor A new() { do Math.max(1, true); return this; }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn call_result_type_flows_into_expressions() {
        let err = analyse_one(
            "class A {
                constructor A new() {
                    var boolean b;
                    let b = Math.max(1, 2);
                    return this;
                }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn array_access_is_int_and_needs_int_index() {
        analyse_one(
            "class A {
                field Array a;
                constructor A new() {
                    var int x;
                    let x = a[3] + 1;
                    return this;
                }
            }",
        )
        .expect("array read is int");

        let err = analyse_one(
            "class A {
                field Array a;
                constructor A new() {
                    var int x;
                    let x = a[true];
                    return this;
                }
            }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn string_literal_has_string_type() {
        analyse_one(
            "class A {
                field String s;
                constructor A new() { let s = \"hi\"; return this; }
            }",
        )
        .expect("string literal assigns to String");
    }

    #[test]
    fn equality_accepts_null_against_objects() {
        analyse_one(
            "class A {
                field String s;
                constructor A new() {
                    var boolean b;
                    let b = s = null;
                    return this;
                }
            }",
        )
        .expect("null comparison");
    }

    #[test]
    fn expression_types_are_recorded() {
        let types = TypePool::new();
        let registry = GlobalRegistry::with_standard_library(&types);
        let mut parser = Parser::new(
            "class A {
                constructor A new() {
                    var int x;
                    let x = 1 + 2;
                    return this;
                }
            }",
        );
        let class = parser.parse().expect("parse");
        registry.register_class_decl(&class, &types).expect("register");

        let mut table = SymbolTable::new();
        let data = Analyzer::new(&registry, &types)
            .analyse_class(&class, &mut table)
            .expect("analysis");

        let int = types.well_known().int;
        let recorded: Vec<_> = (0..64)
            .filter_map(|id| data.type_of(NodeId(id)))
            .collect();
        // 1, 2, 1 + 2, and `this` all carry a resolved type.
        assert_eq!(recorded.iter().filter(|&&ty| ty == int).count(), 3);
        assert!(recorded.contains(&types.intern_base("A")));
    }

    #[test]
    fn call_targets_are_recorded() {
        let data = analyse_one(
            "class A {
                constructor A new() {
                    do Output.println();
                    return this;
                }
            }",
        )
        .expect("clean analysis");

        // Exactly one call site in the class; find its target.
        let mut found = None;
        for id in 0..64 {
            if let Some(target) = data.call_target(NodeId(id)) {
                found = Some(target.clone());
            }
        }
        assert_eq!(
            found,
            Some(CallTarget::Static {
                class: "Output".to_string()
            })
        );
    }
}
