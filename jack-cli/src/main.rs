//! Entrypoint for CLI
mod batch;
mod conf;
mod error;

use std::{env, fs, path::Path, process, time::Instant};

use jack_compiler::lex::{debug_print_lexer, Lexer};
use log::{error, info};

use crate::error::CliResult;

const VERSION: &str = env!("CARGO_PKG_VERSION");

static USAGE: &str = r#"
usage: jackc CMD PATH

commands:
    build   Compile a .jack file, or every .jack file in a directory
    tokens  Print the token stream of a .jack file

examples:
    jackc build Pong
    jackc build Pong/Main.jack
    jackc tokens Pong/Ball.jack

configuration:
    An optional jackc.yaml next to the sources may set
    `output_dir` (default "output") and `extension` (default "vm").
"#;

fn run_build(path: impl AsRef<Path>) -> CliResult<()> {
    info!("compiling {}", path.as_ref().display());

    let start = Instant::now();
    let result = batch::build(path.as_ref());
    let end = Instant::now();

    info!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    result
}

fn run_tokens(path: impl AsRef<Path>) -> CliResult<()> {
    let source_code = fs::read_to_string(path.as_ref())?;
    debug_print_lexer(Lexer::new(source_code.as_str()));
    Ok(())
}

fn main() {
    if let Err(err) = simple_logger::SimpleLogger::new().env().init() {
        eprintln!("failed to initialise logger: {err}");
    }

    let result = match parse_args() {
        Some(Cmd::Build { path }) => run_build(path),
        Some(Cmd::Tokens { path }) => run_tokens(path),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    };

    if let Err(err) = result {
        error!("{err}");
        process::exit(1);
    }
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;

    // don't format me T.T
    match cmd.as_str() {
        "build" => Some(Cmd::Build { path: args.next()? }),
        "tokens" => Some(Cmd::Tokens { path: args.next()? }),
        _ => None,
    }
}

fn print_usage() {
    println!("jackc v{VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile file or directory
    Build { path: String },
    /// Dump tokens
    Tokens { path: String },
}
