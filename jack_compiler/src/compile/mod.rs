mod engine;
mod ir;
mod symbol;
mod writer;

pub use engine::{CompilationEngine, SubroutineKind};
pub use ir::{Command, Instruction, Segment};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
pub use writer::{LabelCounter, VmWriter};

use crate::{
    lex::LexError,
    token_stream::{Expected, TokenError},
    tokens::{Span, TokenKind},
};
use smol_str::SmolStr;
use std::{error, fmt, io};

/// Fatal compilation failure.
///
/// The first error aborts the compilation unit. Any output already
/// written for the unit is incomplete and should be discarded.
#[derive(Debug)]
pub enum CompileError {
    /// Unrecognised character or token shape.
    Lex(LexError),
    /// Current token does not fit the grammar rule being compiled.
    Syntax {
        expected: Expected,
        found: TokenKind,
        span: Span,
    },
    /// Identifier used as a variable is in neither scope.
    UndefinedSymbol { name: SmolStr, span: Span },
    /// Source ended in the middle of the class.
    EndOfInput { span: Span },
    /// Output could not be written.
    Io(io::Error),
}

impl CompileError {
    /// Location in the source the error points to.
    ///
    /// Output errors have no location.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Lex(err) => Some(err.span()),
            Self::Syntax { span, .. } | Self::UndefinedSymbol { span, .. } | Self::EndOfInput { span } => Some(span),
            Self::Io(_) => None,
        }
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Lex(err) => fmt::Display::fmt(err, f),
            Self::Syntax { expected, found, .. } => {
                write!(f, "syntax error: expected {expected}, found {found}")
            }
            Self::UndefinedSymbol { name, .. } => write!(f, "undefined symbol '{name}'"),
            Self::EndOfInput { .. } => write!(f, "unexpected end of input"),
            Self::Io(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl From<TokenError> for CompileError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Mismatch { expected, found, span } => CompileError::Syntax { expected, found, span },
            TokenError::EndOfSource { span } => CompileError::EndOfInput { span },
            TokenError::Lex(err) => CompileError::Lex(err),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::Io(err)
    }
}
