// src/codegen/mod.rs
//! Lowers a class AST into textual Hack VM code, consulting the
//! symbol-table history and the analyzer's expression side tables.

mod expr;
mod stmt;
pub mod writer;

pub use writer::{ArithOp, Segment, VmWriter};

use std::io::{self, Write};

use crate::frontend::ast::{Class, SubroutineDec, SubroutineKind};
use crate::sema::expression_data::ExpressionData;
use crate::sema::symbol_table::{SymbolKind, SymbolTable};

/// Generate VM code for one analyzed class.
pub fn compile_class<W: Write>(
    class: &Class,
    table: &mut SymbolTable,
    data: &ExpressionData,
    out: W,
) -> io::Result<()> {
    let mut generator = Generator {
        table,
        data,
        writer: VmWriter::new(out),
        class_name: &class.name,
        if_count: 0,
        while_count: 0,
    };
    for sub in &class.subs {
        generator.compile_subroutine(sub)?;
    }
    Ok(())
}

struct Generator<'a, W: Write> {
    table: &'a mut SymbolTable,
    data: &'a ExpressionData,
    writer: VmWriter<W>,
    class_name: &'a str,
    if_count: u32,
    while_count: u32,
}

impl<'a, W: Write> Generator<'a, W> {
    fn compile_subroutine(&mut self, sub: &SubroutineDec) -> io::Result<()> {
        if !self.table.enter_subroutine(&sub.name) {
            unreachable!("analysis left no scope snapshot for {}", sub.name);
        }
        self.if_count = 0;
        self.while_count = 0;

        let name = format!("{}.{}", self.class_name, sub.name);
        self.writer
            .function(&name, self.table.var_count(SymbolKind::Local))?;

        match sub.kind {
            SubroutineKind::Constructor => {
                // Allocate the object and point `this` at it.
                self.writer
                    .push(Segment::Constant, self.table.var_count(SymbolKind::Field))?;
                self.writer.call("Memory.alloc", 1)?;
                self.writer.pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                // The receiver arrives as argument 0.
                self.writer.push(Segment::Argument, 0)?;
                self.writer.pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&sub.body)
    }

    fn next_if_label(&mut self) -> u32 {
        let n = self.if_count;
        self.if_count += 1;
        n
    }

    fn next_while_label(&mut self) -> u32 {
        let n = self.while_count;
        self.while_count += 1;
        n
    }
}
