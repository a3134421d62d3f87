use jack_compiler::{
    compile::{CompileError, LabelCounter},
    compile_str, compile_to,
    lex::LexError,
    token_stream::Expected,
    tokens::{Keyword, Symbol, TokenKind},
};

#[test]
fn test_undefined_symbol() {
    let labels = LabelCounter::new();
    let mut output = Vec::new();
    let source = "class Main { function void f() { var int a; let b = 1; return; } }";

    let err = compile_to(source, &mut output, &labels).unwrap_err();
    match err {
        CompileError::UndefinedSymbol { name, span } => {
            assert_eq!(name, "b");
            assert_eq!(span.fragment(source), "b");
        }
        err => panic!("unexpected error: {err}"),
    }

    // Nothing after the header was written.
    assert_eq!(String::from_utf8(output).unwrap(), "function Main.f 1\n");
}

#[test]
fn test_undefined_array() {
    let err = compile_str("class A { function int f() { return xs[0]; } }").unwrap_err();
    assert!(matches!(err, CompileError::UndefinedSymbol { ref name, .. } if name == "xs"));
}

#[test]
fn test_integer_overflow() {
    let err = compile_str("class A { function void f() { var int x; let x = 40000; return; } }").unwrap_err();
    assert!(matches!(err, CompileError::Lex(LexError::IntegerOverflow { .. })));
}

#[test]
fn test_unknown_character() {
    let err = compile_str("class A { # }").unwrap_err();
    match err {
        CompileError::Lex(LexError::UnknownCharacter { character, span }) => {
            assert_eq!(character, '#');
            assert_eq!((span.line, span.column), (1, 11));
        }
        err => panic!("unexpected error: {err}"),
    }
}

#[test]
fn test_unterminated_string() {
    let err = compile_str("class A { function void f() { do Output.printString(\"oops); } }").unwrap_err();
    assert!(matches!(err, CompileError::Lex(LexError::UnterminatedString { .. })));
}

#[test]
fn test_missing_expression() {
    let err = compile_str("class A { function int f() { return } }").unwrap_err();
    match err {
        CompileError::Syntax { expected, found, .. } => {
            assert_eq!(expected, Expected::Construct("expression term"));
            assert_eq!(found, TokenKind::Symbol(Symbol::RightBrace));
        }
        err => panic!("unexpected error: {err}"),
    }
}

#[test]
fn test_missing_semicolon() {
    let err = compile_str("class A { function void f() { var int x; let x = 1 return; } }").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(err.span().map(|span| span.column), Some(52));
}

#[test]
fn test_not_a_statement() {
    let err = compile_str("class A { function void f() { int x; } }").unwrap_err();
    match err {
        CompileError::Syntax { expected, found, .. } => {
            assert_eq!(expected, Expected::Construct("statement"));
            assert_eq!(found, TokenKind::Keyword(Keyword::Int));
        }
        err => panic!("unexpected error: {err}"),
    }
}

#[test]
fn test_missing_class_keyword() {
    let err = compile_str("Main { }").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Syntax {
            expected: Expected::Keyword(Keyword::Class),
            ..
        }
    ));
}

#[test]
fn test_end_of_input() {
    let err = compile_str("class Main { function void main() {").unwrap_err();
    assert!(matches!(err, CompileError::EndOfInput { .. }));
    assert_eq!(err.to_string(), "unexpected end of input");

    let err = compile_str("").unwrap_err();
    assert!(matches!(err, CompileError::EndOfInput { .. }));
}

#[test]
fn test_trailing_tokens() {
    let err = compile_str("class A { } class B { }").unwrap_err();
    match err {
        CompileError::Syntax { expected, found, span } => {
            assert_eq!(expected, Expected::EndOfSource);
            assert_eq!(found, TokenKind::Keyword(Keyword::Class));
            assert_eq!(span.column, 13);
        }
        err => panic!("unexpected error: {err}"),
    }
}

#[test]
fn test_error_message() {
    let err = compile_str("class A { function void f() { let 1 = 2; } }").unwrap_err();
    assert_eq!(err.to_string(), "syntax error: expected identifier, found integer 1");
}

#[test]
fn test_string_character_out_of_range() {
    let err = compile_str("class A { function String f() { return \"\u{AC00}\"; } }").unwrap_err();
    match err {
        CompileError::Lex(LexError::UnsupportedCharacter { character, .. }) => assert_eq!(character, '\u{AC00}'),
        err => panic!("unexpected error: {err}"),
    }

    // Highest loadable code still compiles.
    let output = compile_str("class A { function String f() { return \"\u{7FFF}\"; } }").unwrap();
    assert!(output.contains("push constant 32767\n"));
}

#[test]
fn test_end_of_input_after_newline() {
    let err = compile_str("class A {\n  function void f() {\n").unwrap_err();
    match err {
        CompileError::EndOfInput { span } => {
            assert_eq!(span.start, 32);
            assert_eq!((span.line, span.column), (3, 1));
        }
        err => panic!("unexpected error: {err}"),
    }
}
