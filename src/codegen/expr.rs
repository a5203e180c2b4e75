// src/codegen/expr.rs

use std::io::{self, Write};

use crate::codegen::writer::{ArithOp, Segment};
use crate::codegen::Generator;
use crate::frontend::ast::*;
use crate::sema::expression_data::{CallTarget, Receiver};

impl<'a, W: Write> Generator<'a, W> {
    /// Post-order emission: operands first, operator last.
    pub(crate) fn compile_expression(&mut self, expr: &Expr) -> io::Result<()> {
        match &expr.kind {
            ExprKind::IntLit(value) => self.writer.push(Segment::Constant, *value),
            ExprKind::StringLit(value) => self.compile_string(value),
            ExprKind::KeywordLit(value) => self.compile_keyword(*value),
            ExprKind::Identifier(ident) => {
                let Some(symbol) = self.table.lookup(&ident.name).cloned() else {
                    unreachable!("analysis resolved '{}'", ident.name);
                };
                self.writer.push(symbol.kind.into(), symbol.index)
            }
            ExprKind::Unary(unary) => {
                self.compile_expression(&unary.operand)?;
                let op = if unary.op == '-' {
                    ArithOp::Neg
                } else {
                    ArithOp::Not
                };
                self.writer.arith(op)
            }
            ExprKind::Binary(binary) => {
                self.compile_expression(&binary.left)?;
                self.compile_expression(&binary.right)?;
                match binary.op {
                    '+' => self.writer.arith(ArithOp::Add),
                    '-' => self.writer.arith(ArithOp::Sub),
                    '&' => self.writer.arith(ArithOp::And),
                    '|' => self.writer.arith(ArithOp::Or),
                    '<' => self.writer.arith(ArithOp::Lt),
                    '>' => self.writer.arith(ArithOp::Gt),
                    '=' => self.writer.arith(ArithOp::Eq),
                    '*' => self.writer.call("Math.multiply", 2),
                    '/' => self.writer.call("Math.divide", 2),
                    op => unreachable!("parser admits no binary operator '{op}'"),
                }
            }
            ExprKind::Index(index) => {
                self.compile_expression(&index.base)?;
                self.compile_expression(&index.index)?;
                self.writer.arith(ArithOp::Add)?;
                self.writer.pop(Segment::Pointer, 1)?;
                self.writer.push(Segment::That, 0)
            }
            ExprKind::Call(call) => self.compile_call(expr.id, call),
        }
    }

    /// Build the string object at runtime, one appendChar per character.
    fn compile_string(&mut self, value: &str) -> io::Result<()> {
        self.writer.push(Segment::Constant, value.len() as u16)?;
        self.writer.call("String.new", 1)?;
        for c in value.chars() {
            self.writer.push(Segment::Constant, c as u16)?;
            self.writer.call("String.appendChar", 2)?;
        }
        Ok(())
    }

    fn compile_keyword(&mut self, value: KeywordConst) -> io::Result<()> {
        match value {
            KeywordConst::True => {
                self.writer.push(Segment::Constant, 0)?;
                self.writer.arith(ArithOp::Not)
            }
            KeywordConst::False | KeywordConst::Null => self.writer.push(Segment::Constant, 0),
            KeywordConst::This => self.writer.push(Segment::Pointer, 0),
        }
    }

    fn compile_call(&mut self, id: NodeId, call: &CallExpr) -> io::Result<()> {
        let Some(target) = self.data.call_target(id).cloned() else {
            unreachable!("analysis resolved call '{}'", call.name);
        };

        let n_args = call.args.len() as u16;
        match target {
            CallTarget::Static { class } => {
                for arg in &call.args {
                    self.compile_expression(arg)?;
                }
                self.writer.call(&format!("{class}.{}", call.name), n_args)
            }
            CallTarget::Method { class, receiver } => {
                match receiver {
                    Receiver::This => self.writer.push(Segment::Pointer, 0)?,
                    Receiver::Value => {
                        let Some(object) = &call.receiver else {
                            unreachable!("method target without receiver expression");
                        };
                        self.compile_expression(object)?;
                    }
                }
                for arg in &call.args {
                    self.compile_expression(arg)?;
                }
                self.writer
                    .call(&format!("{class}.{}", call.name), n_args + 1)
            }
        }
    }
}
