//! Compiles a set of classes into VM files.
use crate::{
    conf::BuildConf,
    error::{CliError, CliResult, ErrorKind},
};
use jack_compiler::compile::{CompileError, LabelCounter};
use log::{error, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const SOURCE_EXTENSION: &str = "jack";

/// Classes to compile, and the directory they were found in.
#[derive(Debug)]
pub struct Sources {
    pub base_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl Sources {
    /// Collect a single `.jack` file, or every `.jack` file directly
    /// inside a directory, sorted by name.
    pub fn discover(input: &Path) -> CliResult<Self> {
        if input.is_dir() {
            let mut files = Vec::new();
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_source(&path) {
                    files.push(path);
                }
            }
            files.sort();

            Ok(Self {
                base_dir: input.to_path_buf(),
                files,
            })
        } else if input.is_file() && is_source(input) {
            let base_dir = match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };

            Ok(Self {
                base_dir,
                files: vec![input.to_path_buf()],
            })
        } else {
            Err(ErrorKind::InvalidInput(input.to_path_buf()).into())
        }
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

/// Compile every class found at the input path.
///
/// A failing class is reported and skipped. The rest of the batch
/// still compiles, and the failure count is returned as an error at
/// the end. Label numbers are unique across the whole batch.
pub fn build(input: &Path) -> CliResult<()> {
    let sources = Sources::discover(input)?;
    let conf = BuildConf::load(&sources.base_dir)?;

    let output_dir = sources.base_dir.join(&conf.output_dir);
    fs::create_dir_all(&output_dir)?;

    let labels = LabelCounter::new();
    let total = sources.files.len();
    let mut failed = 0;

    for filepath in &sources.files {
        match compile_file(filepath, &output_dir, &conf.extension, &labels) {
            Ok(outpath) => info!("compiled {} -> {}", filepath.display(), outpath.display()),
            Err(err) => {
                failed += 1;
                report(filepath, &err);
            }
        }
    }

    info!("{} of {total} classes compiled", total - failed);

    if failed > 0 {
        return Err(ErrorKind::Failed { failed, total }.into());
    }

    Ok(())
}

/// Compile one class, writing the output file only when the whole
/// class compiled.
pub fn compile_file(filepath: &Path, output_dir: &Path, extension: &str, labels: &LabelCounter) -> CliResult<PathBuf> {
    let source_code = fs::read_to_string(filepath)?;
    let output = jack_compiler::compile_to(&source_code, Vec::new(), labels)?;

    let stem = filepath.file_stem().unwrap_or_default();
    let outpath = output_dir.join(stem).with_extension(extension);
    fs::write(&outpath, output)?;

    Ok(outpath)
}

/// Print the error prefixed with its source position, when it has one.
fn report(filepath: &Path, err: &CliError) {
    if let ErrorKind::Compile(compile_err) = &err.kind {
        if let Some((line, column)) = position(compile_err) {
            error!("{}:{line}:{column}: {compile_err}", filepath.display());
            return;
        }
    }
    error!("{}: {err}", filepath.display());
}

/// One based line and column of a compile error.
pub fn position(err: &CompileError) -> Option<(usize, usize)> {
    err.span().map(|span| (span.line, span.column))
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jackc-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_discover_sorted() {
        let dir = scratch_dir("discover");
        fs::write(dir.join("Main.jack"), "class Main {}").unwrap();
        fs::write(dir.join("Ball.jack"), "class Ball {}").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let sources = Sources::discover(&dir).unwrap();
        let names: Vec<_> = sources
            .files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Ball.jack", "Main.jack"]);
    }

    #[test]
    fn test_build_continues_after_failure() {
        let dir = scratch_dir("build");
        fs::write(
            dir.join("A.jack"),
            "class A { function void f() { if (true) { } return; } }",
        )
        .unwrap();
        fs::write(dir.join("B.jack"), "class B { function void f() { let x = 1; } }").unwrap();
        fs::write(
            dir.join("C.jack"),
            "class C { function void f() { while (false) { } return; } }",
        )
        .unwrap();

        let err = build(&dir).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Failed { failed: 1, total: 3 }));

        let output_dir = dir.join("output");
        assert!(output_dir.join("A.vm").exists());
        assert!(!output_dir.join("B.vm").exists());

        // Labels continue from the previous class.
        let c = fs::read_to_string(output_dir.join("C.vm")).unwrap();
        assert!(c.contains("label WHILELABEL2"), "{c}");
    }

    #[test]
    fn test_undefined_position() {
        let err = jack_compiler::compile_str("class A {\n  function void f() {\n    let x = 1;\n  }\n}").unwrap_err();
        assert_eq!(position(&err), Some((3, 9)));
    }
}
