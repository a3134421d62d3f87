//! VM code emitter.
use super::ir::{Command, Instruction, Segment};

use log::trace;
use std::{
    io::{self, Write},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Source of globally unique label numbers.
///
/// Never reset. Share one counter between every compilation unit
/// of a run, including units compiled on different threads, so
/// label names never collide.
#[derive(Debug, Default)]
pub struct LabelCounter(AtomicUsize);

impl LabelCounter {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Take the next number.
    #[inline]
    pub fn next_number(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// The number the next call to [`next_number`](LabelCounter::next_number) will return.
    #[inline]
    pub fn peek(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Append only writer of VM text.
///
/// Each call renders exactly one line. Nothing is buffered
/// here beyond what the underlying writer does.
pub struct VmWriter<'c, W: Write> {
    out: W,
    labels: &'c LabelCounter,
}

impl<'c, W: Write> VmWriter<'c, W> {
    pub fn new(out: W, labels: &'c LabelCounter) -> Self {
        Self { out, labels }
    }

    /// Unwrap the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Mint a label name that is unique for the whole run.
    pub fn new_label(&self) -> String {
        format!("LABEL{}", self.labels.next_number())
    }

    #[inline]
    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.emit(Instruction::Push(segment, index))
    }

    #[inline]
    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.emit(Instruction::Pop(segment, index))
    }

    #[inline]
    pub fn write_arithmetic(&mut self, command: Command) -> io::Result<()> {
        self.emit(Instruction::Arithmetic(command))
    }

    #[inline]
    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        self.emit(Instruction::Label(label))
    }

    #[inline]
    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.emit(Instruction::Goto(label))
    }

    #[inline]
    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        self.emit(Instruction::IfGoto(label))
    }

    #[inline]
    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        self.emit(Instruction::Call(name, n_args))
    }

    #[inline]
    pub fn write_function(&mut self, name: &str, n_vars: u16) -> io::Result<()> {
        self.emit(Instruction::Function(name, n_vars))
    }

    #[inline]
    pub fn write_return(&mut self) -> io::Result<()> {
        self.emit(Instruction::Return)
    }

    fn emit(&mut self, instr: Instruction) -> io::Result<()> {
        trace!("{instr}");
        writeln!(self.out, "{instr}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_writer_lines() {
        let labels = LabelCounter::new();
        let mut writer = VmWriter::new(Vec::new(), &labels);
        writer.write_function("Main.main", 2).unwrap();
        writer.write_push(Segment::Constant, 7).unwrap();
        writer.write_pop(Segment::That, 0).unwrap();
        writer.write_arithmetic(Command::Not).unwrap();
        writer.write_if("IFLABEL0").unwrap();
        writer.write_call("Math.multiply", 2).unwrap();
        writer.write_return().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "function Main.main 2\n\
             push constant 7\n\
             pop that 0\n\
             not\n\
             if-goto IFLABEL0\n\
             call Math.multiply 2\n\
             return\n"
        );
    }

    #[test]
    fn test_labels_shared_between_writers() {
        let labels = LabelCounter::new();
        let first = VmWriter::new(io::sink(), &labels);
        let second = VmWriter::new(io::sink(), &labels);

        assert_eq!(first.new_label(), "LABEL0");
        assert_eq!(second.new_label(), "LABEL1");
        assert_eq!(first.new_label(), "LABEL2");
        assert_eq!(labels.peek(), 3);
    }
}
