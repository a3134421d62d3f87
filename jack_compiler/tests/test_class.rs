use jack_compiler::{
    compile::{CompilationEngine, LabelCounter, VmWriter},
    compile_str,
    lex::Lexer,
    token_stream::TokenStream,
};

/// Join instruction lines into VM text.
fn vm(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[test]
fn test_compile_main() {
    let output = compile_str(include_str!("Main.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            "function Main.main 0",
            "push constant 1",
            "push constant 2",
            "add",
            "call Output.printInt 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_compile_point() {
    let output = compile_str(include_str!("Point.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            // Receiver takes local 0 in a constructor.
            "function Point.new 1",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push pointer 0",
            "return",
            "function Point.getX 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
            // Parameters start at argument 1 in a method.
            "function Point.distance 1",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "call Point.getX 1",
            "sub",
            "pop local 0",
            "push local 0",
            "call Math.abs 1",
            "return",
        ])
    );
}

#[test]
fn test_compile_constants() {
    let output = compile_str(include_str!("Strings.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            "function Strings.greet 0",
            "push constant 2",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "return",
            "function Strings.flags 1",
            "push constant 1",
            "neg",
            "pop local 0",
            "push constant 0",
            "not",
            "pop local 0",
            "push constant 0",
            "pop local 0",
            "push local 0",
            "push constant 1",
            "push constant 2",
            "call Math.multiply 2",
            "push constant 3",
            "call Math.divide 2",
            "push constant 0",
            "gt",
            "and",
            "return",
        ])
    );
}

#[test]
fn test_empty_class() {
    assert_eq!(compile_str("class Empty { }").unwrap(), "");
}

#[test]
fn test_static_and_field_counts() {
    let output = compile_str(
        "class Counter {
            static int total, peak;
            field int a, b, c;
            constructor Counter new() { let peak = 9; return this; }
        }",
    )
    .unwrap();

    assert_eq!(
        output,
        vm(&[
            "function Counter.new 1",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push constant 9",
            "pop static 1",
            "push pointer 0",
            "return",
        ])
    );
}

#[test]
fn test_engine_with_writer() {
    let labels = LabelCounter::new();
    let stream = TokenStream::new(Lexer::new(include_str!("Main.jack")));
    let writer = VmWriter::new(Vec::new(), &labels);
    let output = CompilationEngine::new(stream, writer).compile_class().unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("function Main.main 0\n"));
    assert_eq!(labels.peek(), 0);
}
