use jack_compiler::{compile::LabelCounter, compile_str, compile_to};

/// Join instruction lines into VM text.
fn vm(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[test]
fn test_compile_control_flow() {
    let output = compile_str(include_str!("Control.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            "function Control.abs 0",
            "push argument 0",
            "push constant 0",
            "lt",
            "not",
            "if-goto IFLABEL0",
            "push argument 0",
            "neg",
            "pop argument 0",
            "goto IFLABEL1",
            "label IFLABEL0",
            "label IFLABEL1",
            "push argument 0",
            "return",
            "function Control.sum 2",
            "push constant 0",
            "pop local 0",
            "push constant 0",
            "pop local 1",
            "label WHILELABEL2",
            "push local 0",
            "push argument 0",
            "lt",
            "not",
            "if-goto WHILELABEL3",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "push local 0",
            "push constant 3",
            "eq",
            "not",
            "if-goto IFLABEL4",
            "push local 1",
            "pop local 1",
            "goto IFLABEL5",
            "label IFLABEL4",
            "push local 1",
            "push local 0",
            "add",
            "pop local 1",
            "label IFLABEL5",
            "goto WHILELABEL2",
            "label WHILELABEL3",
            "push local 1",
            "return",
        ])
    );
}

#[test]
fn test_compile_array_assignment() {
    let output = compile_str(include_str!("Arrays.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            "function Arrays.copy 0",
            "push argument 0",
            "push argument 1",
            "add",
            "push argument 0",
            "push argument 2",
            "add",
            "pop pointer 1",
            "push that 0",
            "push constant 1",
            "add",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_no_precedence() {
    let output = compile_str("class A { function int f() { return 1 + 2 * 3; } }").unwrap();
    assert_eq!(
        output,
        vm(&[
            "function A.f 0",
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "return",
        ])
    );
}

#[test]
fn test_method_call_on_self() {
    let output = compile_str(
        "class Game {
            method void run() {
                do draw(1, 2);
                return;
            }
        }",
    )
    .unwrap();

    assert_eq!(
        output,
        vm(&[
            "function Game.run 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "push constant 1",
            "push constant 2",
            "call Game.draw 3",
            "pop temp 0",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_implicit_void_return() {
    let output = compile_str("class A { function void f() { do Sys.halt(); } }").unwrap();
    assert_eq!(
        output,
        vm(&[
            "function A.f 0",
            "call Sys.halt 0",
            "pop temp 0",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_variable_shadows_class_name() {
    // A local named like a class makes the call a method call on the local.
    let output = compile_str(
        "class A {
            function void f() {
                var Screen Output;
                do Output.println();
                return;
            }
        }",
    )
    .unwrap();

    assert_eq!(
        output,
        vm(&[
            "function A.f 1",
            "push local 0",
            "call Screen.println 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_duplicate_declaration_replaces() {
    let output = compile_str("class A { function void f() { var int a, a; let a = 1; return; } }").unwrap();
    assert_eq!(
        output,
        vm(&[
            "function A.f 2",
            "push constant 1",
            "pop local 1",
            "push constant 0",
            "return",
        ])
    );
}

#[test]
fn test_labels_unique_across_units() {
    let labels = LabelCounter::new();
    let source = "class A { function void f() { while (true) { } return; } }";

    let first = compile_to(source, Vec::new(), &labels).unwrap();
    let second = compile_to(source, Vec::new(), &labels).unwrap();

    let first = String::from_utf8(first).unwrap();
    let second = String::from_utf8(second).unwrap();
    assert!(first.contains("label WHILELABEL0\n"));
    assert!(first.contains("if-goto WHILELABEL1\n"));
    assert!(second.contains("label WHILELABEL2\n"));
    assert!(second.contains("if-goto WHILELABEL3\n"));
    assert_eq!(labels.peek(), 4);
}

#[test]
fn test_sibling_ifs_get_distinct_labels() {
    let output = compile_str(include_str!("Branches.jack")).unwrap();
    assert_eq!(
        output,
        vm(&[
            "function Branches.sign 0",
            "push argument 0",
            "push constant 0",
            "lt",
            "not",
            "if-goto IFLABEL0",
            "push constant 1",
            "neg",
            "return",
            "goto IFLABEL1",
            "label IFLABEL0",
            "label IFLABEL1",
            "push argument 0",
            "push constant 0",
            "gt",
            "not",
            "if-goto IFLABEL2",
            "push constant 1",
            "return",
            "goto IFLABEL3",
            "label IFLABEL2",
            "label IFLABEL3",
            "push constant 0",
            "return",
        ])
    );

    let labels: std::collections::BTreeSet<_> = output
        .lines()
        .filter_map(|line| line.strip_prefix("label "))
        .collect();
    assert_eq!(labels.len(), 4);
}
