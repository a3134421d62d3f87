//! Application errors
use jack_compiler::compile::CompileError;
use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub struct CliError {
    pub kind: ErrorKind,
}

impl std::error::Error for CliError {}

#[derive(Debug)]
pub enum ErrorKind {
    Compile(CompileError),
    Io(std::io::Error),
    Config(serde_yaml::Error),
    /// Path is neither a `.jack` file nor a directory.
    InvalidInput(PathBuf),
    /// Some units of a batch failed. Each was already reported.
    Failed { failed: usize, total: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jackc error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::InvalidInput(path) => write!(f, "not a .jack file or directory: {}", path.display()),
            Self::Failed { failed, total } => write!(f, "{failed} of {total} classes failed to compile"),
        }
    }
}

impl From<ErrorKind> for CliError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<CompileError> for CliError {
    fn from(err: CompileError) -> Self {
        Self {
            kind: ErrorKind::Compile(err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
