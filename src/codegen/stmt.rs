// src/codegen/stmt.rs

use std::io::{self, Write};

use crate::codegen::writer::{ArithOp, Segment};
use crate::codegen::Generator;
use crate::frontend::ast::*;

impl<'a, W: Write> Generator<'a, W> {
    pub(crate) fn compile_statements(&mut self, stmts: &[Stmt]) -> io::Result<()> {
        for stmt in stmts {
            match stmt {
                Stmt::Let(s) => self.compile_let(s)?,
                Stmt::If(s) => self.compile_if(s)?,
                Stmt::While(s) => self.compile_while(s)?,
                Stmt::Do(s) => self.compile_do(s)?,
                Stmt::Return(s) => self.compile_return(s)?,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self, stmt: &LetStmt) -> io::Result<()> {
        let Some(target) = self.table.lookup(&stmt.name).cloned() else {
            unreachable!("analysis resolved '{}'", stmt.name);
        };

        match &stmt.index {
            // Compute the cell address, then the value; write through
            // `that` with the value parked in temp 0.
            Some(index) => {
                self.writer.push(target.kind.into(), target.index)?;
                self.compile_expression(index)?;
                self.writer.arith(ArithOp::Add)?;
                self.compile_expression(&stmt.value)?;
                self.writer.pop(Segment::Temp, 0)?;
                self.writer.pop(Segment::Pointer, 1)?;
                self.writer.push(Segment::Temp, 0)?;
                self.writer.pop(Segment::That, 0)
            }
            None => {
                self.compile_expression(&stmt.value)?;
                self.writer.pop(target.kind.into(), target.index)
            }
        }
    }

    fn compile_if(&mut self, stmt: &IfStmt) -> io::Result<()> {
        let n = self.next_if_label();
        let else_label = format!("IF_ELSE_{n}");
        let end_label = format!("IF_END_{n}");

        self.compile_expression(&stmt.cond)?;
        self.writer.arith(ArithOp::Not)?;
        self.writer.if_goto(&else_label)?;
        self.compile_statements(&stmt.then_branch)?;
        self.writer.goto(&end_label)?;
        self.writer.label(&else_label)?;
        if let Some(else_branch) = &stmt.else_branch {
            self.compile_statements(else_branch)?;
        }
        self.writer.label(&end_label)
    }

    fn compile_while(&mut self, stmt: &WhileStmt) -> io::Result<()> {
        let n = self.next_while_label();
        let top_label = format!("WHILE_{n}");
        let end_label = format!("WHILE_END_{n}");

        self.writer.label(&top_label)?;
        self.compile_expression(&stmt.cond)?;
        self.writer.arith(ArithOp::Not)?;
        self.writer.if_goto(&end_label)?;
        self.compile_statements(&stmt.body)?;
        self.writer.goto(&top_label)?;
        self.writer.label(&end_label)
    }

    fn compile_do(&mut self, stmt: &DoStmt) -> io::Result<()> {
        self.compile_expression(&stmt.call)?;
        self.writer.pop(Segment::Temp, 0)
    }

    fn compile_return(&mut self, stmt: &ReturnStmt) -> io::Result<()> {
        match &stmt.value {
            Some(value) => self.compile_expression(value)?,
            None => self.writer.push(Segment::Constant, 0)?,
        }
        self.writer.ret()
    }
}
