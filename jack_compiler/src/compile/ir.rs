use super::symbol::SymbolKind;
use std::fmt;

/// Named memory region of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    /// Fields of the current object, based at `pointer 0`.
    This,
    /// Array element window, based at `pointer 1`.
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Segment::Constant => write!(f, "constant"),
            Segment::Argument => write!(f, "argument"),
            Segment::Local    => write!(f, "local"),
            Segment::Static   => write!(f, "static"),
            Segment::This     => write!(f, "this"),
            Segment::That     => write!(f, "that"),
            Segment::Pointer  => write!(f, "pointer"),
            Segment::Temp     => write!(f, "temp"),
        }
    }
}

/// Storage kinds map onto segments one to one.
impl From<SymbolKind> for Segment {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Static => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local => Segment::Local,
        }
    }
}

/// Zero operand arithmetic and logic commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
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

impl fmt::Display for Command {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Add => write!(f, "add"),
            Command::Sub => write!(f, "sub"),
            Command::Neg => write!(f, "neg"),
            Command::Eq  => write!(f, "eq"),
            Command::Gt  => write!(f, "gt"),
            Command::Lt  => write!(f, "lt"),
            Command::And => write!(f, "and"),
            Command::Or  => write!(f, "or"),
            Command::Not => write!(f, "not"),
        }
    }
}

/// Single line of VM code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(Command),
    Label(&'a str),
    Goto(&'a str),
    IfGoto(&'a str),
    /// Subroutine name and number of arguments.
    Call(&'a str, u16),
    /// Subroutine name and number of local variables.
    Function(&'a str, u16),
    Return,
}

/// Outputs instruction as VM text.
impl<'a> fmt::Display for Instruction<'a> {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Push(segment, index)   => write!(f, "push {segment} {index}"),
            Instruction::Pop(segment, index)    => write!(f, "pop {segment} {index}"),
            Instruction::Arithmetic(command)    => write!(f, "{command}"),
            Instruction::Label(label)           => write!(f, "label {label}"),
            Instruction::Goto(label)            => write!(f, "goto {label}"),
            Instruction::IfGoto(label)          => write!(f, "if-goto {label}"),
            Instruction::Call(name, n_args)     => write!(f, "call {name} {n_args}"),
            Instruction::Function(name, n_vars) => write!(f, "function {name} {n_vars}"),
            Instruction::Return                 => write!(f, "return"),
        }
    }
}
