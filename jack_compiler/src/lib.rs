//! Compiler from Jack classes to stack machine VM text.
//!
//! Compilation is a single pass. Tokens are pulled on demand and
//! VM instructions are written as soon as each construct is
//! recognised.
pub mod compile;
pub mod lex;
pub mod token_stream;
pub mod tokens;

use compile::{CompilationEngine, CompileError, LabelCounter, VmWriter};
use lex::Lexer;
use std::io::Write;
use token_stream::TokenStream;

/// Compile one class into VM text.
///
/// Uses its own label counter, so labels start from zero. Use
/// [`compile_to`] when several classes must share label numbers.
pub fn compile_str(source: &str) -> Result<String, CompileError> {
    let labels = LabelCounter::new();
    let output = compile_to(source, Vec::new(), &labels)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Compile one class, writing VM text to the given output.
///
/// On error the output may hold a partial translation.
pub fn compile_to<W: Write>(source: &str, out: W, labels: &LabelCounter) -> Result<W, CompileError> {
    let stream = TokenStream::new(Lexer::new(source));
    let writer = VmWriter::new(out, labels);
    CompilationEngine::new(stream, writer).compile_class()
}
