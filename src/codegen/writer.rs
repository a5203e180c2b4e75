// src/codegen/writer.rs

use std::fmt;
use std::io::{self, Write};

use crate::sema::symbol_table::SymbolKind;

/// The Hack VM's addressable memory classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        f.write_str(name)
    }
}

impl From<SymbolKind> for Segment {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Static => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Arg => Segment::Argument,
            SymbolKind::Local => Segment::Local,
        }
    }
}

/// Arithmetic and logic commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
        };
        f.write_str(name)
    }
}

/// Emits textual VM instructions, one per line.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "push {segment} {index}")
    }

    pub fn pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "pop {segment} {index}")
    }

    pub fn arith(&mut self, op: ArithOp) -> io::Result<()> {
        writeln!(self.out, "{op}")
    }

    pub fn label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "label {label}")
    }

    pub fn goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "goto {label}")
    }

    pub fn if_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "if-goto {label}")
    }

    pub fn call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.out, "call {name} {n_args}")
    }

    pub fn function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.out, "function {name} {n_locals}")
    }

    pub fn ret(&mut self) -> io::Result<()> {
        writeln!(self.out, "return")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut VmWriter<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        let mut writer = VmWriter::new(&mut buf);
        f(&mut writer);
        String::from_utf8(buf).expect("vm text is ascii")
    }

    #[test]
    fn emits_one_instruction_per_line() {
        let text = written(|w| {
            w.push(Segment::Constant, 7).unwrap();
            w.arith(ArithOp::Neg).unwrap();
            w.pop(Segment::Local, 0).unwrap();
        });
        assert_eq!(text, "push constant 7\nneg\npop local 0\n");
    }

    #[test]
    fn branching_and_calls() {
        let text = written(|w| {
            w.label("WHILE_0").unwrap();
            w.if_goto("WHILE_END_0").unwrap();
            w.goto("WHILE_0").unwrap();
            w.call("Math.multiply", 2).unwrap();
            w.function("Main.main", 1).unwrap();
            w.ret().unwrap();
        });
        assert_eq!(
            text,
            "label WHILE_0\nif-goto WHILE_END_0\ngoto WHILE_0\n\
             call Math.multiply 2\nfunction Main.main 1\nreturn\n"
        );
    }

    #[test]
    fn segments_follow_symbol_kinds() {
        assert_eq!(Segment::from(SymbolKind::Static), Segment::Static);
        assert_eq!(Segment::from(SymbolKind::Field), Segment::This);
        assert_eq!(Segment::from(SymbolKind::Arg), Segment::Argument);
        assert_eq!(Segment::from(SymbolKind::Local), Segment::Local);
    }
}
