//! Single pass compilation of one class.
//!
//! Each grammar production is a method that consumes its tokens and
//! emits VM code as soon as a construct is recognised. No syntax tree
//! is built, so every decision is made from the current token and
//! what has already been consumed.
use super::{
    ir::{Command, Segment},
    symbol::{Symbol, SymbolKind, SymbolTable},
    writer::VmWriter,
    CompileError,
};
use crate::{
    token_stream::{Expected, TokenStream},
    tokens::{BinaryOp, Keyword, Span, Symbol as Sym, TokenType, UnaryOp},
};

use log::debug;
use smol_str::SmolStr;
use std::{fmt, io::Write};

/// Name bound to the receiver object.
const RECEIVER: &str = "this";

// Runtime library routines.
const MEMORY_ALLOC: &str = "Memory.alloc";
const STRING_NEW: &str = "String.new";
const STRING_APPEND_CHAR: &str = "String.appendChar";
const MATH_MULTIPLY: &str = "Math.multiply";
const MATH_DIVIDE: &str = "Math.divide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl fmt::Display for SubroutineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constructor => write!(f, "constructor"),
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
        }
    }
}

/// Identifier resolved in the position before a `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    /// A variable, which becomes the call's receiver.
    Variable(Symbol),
    /// Not a variable in either scope, so taken as a class name.
    ClassName(SmolStr),
}

/// Signature of the subroutine being compiled.
struct Subroutine {
    name: SmolStr,
    kind: SubroutineKind,
    /// `None` for `void`.
    return_type: Option<SmolStr>,
}

/// Recursive descent compiler for one class.
pub struct CompilationEngine<'a, 'c, W: Write> {
    tokens: TokenStream<'a>,
    writer: VmWriter<'c, W>,
    /// Statics and fields. Lives for the whole class.
    class_scope: SymbolTable,
    /// Arguments and locals. Reset for every subroutine.
    subroutine_scope: SymbolTable,
    class_name: SmolStr,
}

impl<'a, 'c, W: Write> CompilationEngine<'a, 'c, W> {
    pub fn new(tokens: TokenStream<'a>, writer: VmWriter<'c, W>) -> Self {
        Self {
            tokens,
            writer,
            class_scope: SymbolTable::default(),
            subroutine_scope: SymbolTable::default(),
            class_name: SmolStr::default(),
        }
    }

    /// Compile the whole class and hand back the output.
    ///
    /// The class must be the only thing in the source.
    pub fn compile_class(mut self) -> Result<W, CompileError> {
        self.tokens.advance()?;
        self.tokens.consume_keyword(Keyword::Class)?;
        self.class_name = self.tokens.consume_identifier()?;
        debug!("compiling class {}", self.class_name);
        self.tokens.consume_symbol(Sym::LeftBrace)?;

        while !self.tokens.is_symbol(Sym::RightBrace) {
            match self.tokens.as_keyword()? {
                Keyword::Static => self.compile_class_var_dec(SymbolKind::Static)?,
                Keyword::Field => self.compile_class_var_dec(SymbolKind::Field)?,
                Keyword::Constructor => self.compile_subroutine(SubroutineKind::Constructor)?,
                Keyword::Function => self.compile_subroutine(SubroutineKind::Function)?,
                Keyword::Method => self.compile_subroutine(SubroutineKind::Method)?,
                _ => return Err(self.unexpected(Expected::Construct("class variable or subroutine declaration"))),
            }
        }

        // The closing brace is left as the current token.
        if self.tokens.has_more() {
            self.tokens.advance()?;
            return Err(self.unexpected(Expected::EndOfSource));
        }

        Ok(self.writer.into_inner())
    }

    #[cold]
    fn unexpected(&self, expected: Expected) -> CompileError {
        self.tokens.mismatch(expected).into()
    }
}

/// Declarations
impl<'a, 'c, W: Write> CompilationEngine<'a, 'c, W> {
    /// `('static' | 'field') type name (',' name)* ';'`
    fn compile_class_var_dec(&mut self, kind: SymbolKind) -> Result<(), CompileError> {
        self.tokens.advance()?;
        self.compile_var_names(kind)
    }

    /// `'var' type name (',' name)* ';'`
    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_keyword(Keyword::Var)?;
        self.compile_var_names(SymbolKind::Local)
    }

    fn compile_var_names(&mut self, kind: SymbolKind) -> Result<(), CompileError> {
        let ty = self.compile_type()?;

        loop {
            let name = self.tokens.consume_identifier()?;
            self.declare(&name, &ty, kind);

            if !self.tokens.is_symbol(Sym::Comma) {
                break;
            }
            self.tokens.advance()?;
        }

        self.tokens.consume_symbol(Sym::Semicolon)?;
        Ok(())
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn compile_type(&mut self) -> Result<SmolStr, CompileError> {
        let ty = match self.tokens.token_type()? {
            TokenType::Keyword => match self.tokens.as_keyword()? {
                keyword @ (Keyword::Int | Keyword::Char | Keyword::Boolean) => SmolStr::from(keyword.as_str()),
                _ => return Err(self.unexpected(Expected::Construct("type"))),
            },
            TokenType::Identifier => SmolStr::from(self.tokens.as_identifier()?),
            _ => return Err(self.unexpected(Expected::Construct("type"))),
        };
        self.tokens.advance()?;
        Ok(ty)
    }

    fn declare(&mut self, name: &str, ty: &str, kind: SymbolKind) {
        let scope = match kind {
            SymbolKind::Static | SymbolKind::Field => &mut self.class_scope,
            SymbolKind::Argument | SymbolKind::Local => &mut self.subroutine_scope,
        };
        scope.define(name, ty, kind);
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) name '(' parameterList ')' body`
    fn compile_subroutine(&mut self, kind: SubroutineKind) -> Result<(), CompileError> {
        self.subroutine_scope.reset();
        self.tokens.advance()?;

        let return_type = if self.tokens.is_keyword(Keyword::Void) {
            self.tokens.advance()?;
            None
        } else {
            Some(self.compile_type()?)
        };
        let name = self.tokens.consume_identifier()?;
        debug!("compiling {kind} {}.{name}", self.class_name);

        // The receiver is bound before any declared parameter. In a
        // method it is the incoming argument 0. A constructor has no
        // incoming receiver, so it gets a local slot instead.
        match kind {
            SubroutineKind::Method => {
                self.subroutine_scope.define(RECEIVER, &self.class_name, SymbolKind::Argument);
            }
            SubroutineKind::Constructor => {
                self.subroutine_scope.define(RECEIVER, &self.class_name, SymbolKind::Local);
            }
            SubroutineKind::Function => {}
        }

        self.tokens.consume_symbol(Sym::LeftParen)?;
        self.compile_parameter_list()?;
        self.tokens.consume_symbol(Sym::RightParen)?;

        let subroutine = Subroutine {
            name,
            kind,
            return_type,
        };
        self.compile_subroutine_body(&subroutine)
    }

    /// `((type name) (',' type name)*)?`
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.tokens.is_symbol(Sym::RightParen) {
            return Ok(());
        }

        loop {
            let ty = self.compile_type()?;
            let name = self.tokens.consume_identifier()?;
            self.declare(&name, &ty, SymbolKind::Argument);

            if !self.tokens.is_symbol(Sym::Comma) {
                return Ok(());
            }
            self.tokens.advance()?;
        }
    }

    /// `'{' varDec* statements '}'`
    ///
    /// Compiled in two phases. The function header carries the number
    /// of locals, so all `var` declarations are registered before
    /// anything is emitted.
    fn compile_subroutine_body(&mut self, subroutine: &Subroutine) -> Result<(), CompileError> {
        self.tokens.consume_symbol(Sym::LeftBrace)?;

        while self.tokens.is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let function_name = format!("{}.{}", self.class_name, subroutine.name);
        let n_locals = self.subroutine_scope.var_count(SymbolKind::Local);
        self.writer.write_function(&function_name, n_locals)?;

        match subroutine.kind {
            SubroutineKind::Constructor => {
                let n_fields = self.class_scope.var_count(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, n_fields)?;
                self.writer.write_call(MEMORY_ALLOC, 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        let returned = self.compile_statements()?;

        // Every call leaves one value on the stack, void or not.
        if subroutine.return_type.is_none() && !returned {
            self.writer.write_push(Segment::Constant, 0)?;
            self.writer.write_return()?;
        }

        self.tokens.consume_symbol(Sym::RightBrace)?;
        Ok(())
    }
}

/// Statements
impl<'a, 'c, W: Write> CompilationEngine<'a, 'c, W> {
    /// Compiles statements up to, but not including, the closing brace.
    ///
    /// Returns `true` when the last statement was a `return`.
    fn compile_statements(&mut self) -> Result<bool, CompileError> {
        let mut returned = false;

        while !self.tokens.is_symbol(Sym::RightBrace) {
            let keyword = self.tokens.as_keyword().ok();
            match keyword {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Err(self.unexpected(Expected::Construct("statement"))),
            }
            returned = keyword == Some(Keyword::Return);
        }

        Ok(returned)
    }

    /// `'{' statements '}'`
    fn compile_block(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_symbol(Sym::LeftBrace)?;
        self.compile_statements()?;
        self.tokens.consume_symbol(Sym::RightBrace)?;
        Ok(())
    }

    /// `'let' name ('[' expression ']')? '=' expression ';'`
    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_keyword(Keyword::Let)?;
        let span = self.tokens.span();
        let name = self.tokens.consume_identifier()?;
        let target = self.resolve_variable(&name, span)?;

        if self.tokens.is_symbol(Sym::LeftBracket) {
            self.tokens.advance()?;

            // Element address first, value second.
            self.push_variable(&target)?;
            self.compile_expression()?;
            self.tokens.consume_symbol(Sym::RightBracket)?;
            self.writer.write_arithmetic(Command::Add)?;

            self.tokens.consume_symbol(Sym::Eq)?;
            self.compile_expression()?;

            // The right hand side may have repointed `that`, so the
            // value is parked while the saved address is restored.
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.tokens.consume_symbol(Sym::Eq)?;
            self.compile_expression()?;
            self.writer.write_pop(Segment::from(target.kind), target.index)?;
        }

        self.tokens.consume_symbol(Sym::Semicolon)?;
        Ok(())
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    fn compile_if(&mut self) -> Result<(), CompileError> {
        let else_label = format!("IF{}", self.writer.new_label());
        let end_label = format!("IF{}", self.writer.new_label());

        self.tokens.consume_keyword(Keyword::If)?;
        self.compile_condition()?;
        self.writer.write_if(&else_label)?;

        self.compile_block()?;
        self.writer.write_goto(&end_label)?;
        self.writer.write_label(&else_label)?;

        if self.tokens.is_keyword(Keyword::Else) {
            self.tokens.advance()?;
            self.compile_block()?;
        }
        self.writer.write_label(&end_label)?;

        Ok(())
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self) -> Result<(), CompileError> {
        let top_label = format!("WHILE{}", self.writer.new_label());
        let bottom_label = format!("WHILE{}", self.writer.new_label());

        self.writer.write_label(&top_label)?;
        self.tokens.consume_keyword(Keyword::While)?;
        self.compile_condition()?;
        self.writer.write_if(&bottom_label)?;

        self.compile_block()?;
        self.writer.write_goto(&top_label)?;
        self.writer.write_label(&bottom_label)?;

        Ok(())
    }

    /// Parenthesised condition, left negated on the stack so a
    /// following `if-goto` jumps when it is false.
    fn compile_condition(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_symbol(Sym::LeftParen)?;
        self.compile_expression()?;
        self.tokens.consume_symbol(Sym::RightParen)?;
        self.writer.write_arithmetic(Command::Not)?;
        Ok(())
    }

    /// `'do' subroutineCall ';'`
    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_keyword(Keyword::Do)?;
        self.compile_term()?;
        self.tokens.consume_symbol(Sym::Semicolon)?;

        // Discard the returned value.
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    /// `'return' expression? ';'`
    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.tokens.consume_keyword(Keyword::Return)?;

        if self.tokens.is_symbol(Sym::Semicolon) {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return()?;

        self.tokens.consume_symbol(Sym::Semicolon)?;
        Ok(())
    }
}

/// Expressions
impl<'a, 'c, W: Write> CompilationEngine<'a, 'c, W> {
    /// `term (op term)*`
    ///
    /// Operators have no precedence. They are applied strictly
    /// left to right as they are encountered.
    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;

        while let Some(op) = self.tokens.binary_operator()? {
            self.tokens.advance()?;
            self.compile_term()?;
            self.write_binary_op(op)?;
        }

        Ok(())
    }

    fn write_binary_op(&mut self, op: BinaryOp) -> Result<(), CompileError> {
        match op {
            BinaryOp::Add => self.writer.write_arithmetic(Command::Add)?,
            BinaryOp::Sub => self.writer.write_arithmetic(Command::Sub)?,
            BinaryOp::Mul => self.writer.write_call(MATH_MULTIPLY, 2)?,
            BinaryOp::Div => self.writer.write_call(MATH_DIVIDE, 2)?,
            BinaryOp::And => self.writer.write_arithmetic(Command::And)?,
            BinaryOp::Or => self.writer.write_arithmetic(Command::Or)?,
            BinaryOp::Lt => self.writer.write_arithmetic(Command::Lt)?,
            BinaryOp::Gt => self.writer.write_arithmetic(Command::Gt)?,
            BinaryOp::Eq => self.writer.write_arithmetic(Command::Eq)?,
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        match self.tokens.token_type()? {
            TokenType::IntConst => {
                let value = self.tokens.as_int()?;
                self.writer.write_push(Segment::Constant, value)?;
                self.tokens.advance()?;
            }
            TokenType::StringConst => {
                let text = SmolStr::from(self.tokens.as_string()?);
                self.compile_string(&text)?;
                self.tokens.advance()?;
            }
            TokenType::Keyword => {
                match self.tokens.as_keyword()? {
                    Keyword::True => {
                        // All bits set.
                        self.writer.write_push(Segment::Constant, 1)?;
                        self.writer.write_arithmetic(Command::Neg)?;
                    }
                    Keyword::False | Keyword::Null => self.writer.write_push(Segment::Constant, 0)?,
                    Keyword::This => self.writer.write_push(Segment::Pointer, 0)?,
                    _ => return Err(self.unexpected(Expected::Construct("expression term"))),
                }
                self.tokens.advance()?;
            }
            TokenType::Identifier => self.compile_identifier_term()?,
            TokenType::Symbol => {
                if self.tokens.is_symbol(Sym::LeftParen) {
                    self.tokens.advance()?;
                    self.compile_expression()?;
                    self.tokens.consume_symbol(Sym::RightParen)?;
                } else if let Some(op) = self.tokens.unary_operator()? {
                    self.tokens.advance()?;
                    self.compile_term()?;
                    match op {
                        UnaryOp::Neg => self.writer.write_arithmetic(Command::Neg)?,
                        UnaryOp::Not => self.writer.write_arithmetic(Command::Not)?,
                    }
                } else {
                    return Err(self.unexpected(Expected::Construct("expression term")));
                }
            }
        }

        Ok(())
    }

    /// Builds a new string object one character at a time.
    fn compile_string(&mut self, text: &str) -> Result<(), CompileError> {
        // The lexer bounds the length to a valid constant.
        let length = text.encode_utf16().count() as u16;
        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call(STRING_NEW, 1)?;

        for code in text.encode_utf16() {
            self.writer.write_push(Segment::Constant, code)?;
            self.writer.write_call(STRING_APPEND_CHAR, 2)?;
        }

        Ok(())
    }

    /// Variable read, array read, or subroutine call, decided by
    /// the token following the identifier.
    fn compile_identifier_term(&mut self) -> Result<(), CompileError> {
        let span = self.tokens.span();
        let name = self.tokens.consume_identifier()?;

        if self.tokens.is_symbol(Sym::Dot) {
            // (className | varName) '.' subroutineName '(' expressionList ')'
            self.tokens.advance()?;
            let subroutine_name = self.tokens.consume_identifier()?;

            let (target, receiver) = match self.resolve(&name) {
                Resolution::Variable(symbol) => {
                    self.push_variable(&symbol)?;
                    (symbol.ty, 1)
                }
                Resolution::ClassName(class_name) => (class_name, 0),
            };

            let n_args = self.compile_expression_list()?;
            self.writer
                .write_call(&format!("{target}.{subroutine_name}"), n_args + receiver)?;
        } else if self.tokens.is_symbol(Sym::LeftBracket) {
            // varName '[' expression ']'
            let array = self.resolve_variable(&name, span)?;
            self.tokens.advance()?;

            self.push_variable(&array)?;
            self.compile_expression()?;
            self.tokens.consume_symbol(Sym::RightBracket)?;
            self.writer.write_arithmetic(Command::Add)?;

            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::That, 0)?;
        } else if self.tokens.is_symbol(Sym::LeftParen) {
            // subroutineName '(' expressionList ')' on the current object.
            self.writer.write_push(Segment::Pointer, 0)?;
            let n_args = self.compile_expression_list()?;
            self.writer
                .write_call(&format!("{}.{name}", self.class_name), n_args + 1)?;
        } else {
            let symbol = self.resolve_variable(&name, span)?;
            self.push_variable(&symbol)?;
        }

        Ok(())
    }

    /// `'(' (expression (',' expression)*)? ')'`
    ///
    /// Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        self.tokens.consume_symbol(Sym::LeftParen)?;

        let mut count = 0;
        if !self.tokens.is_symbol(Sym::RightParen) {
            loop {
                self.compile_expression()?;
                count += 1;

                if !self.tokens.is_symbol(Sym::Comma) {
                    break;
                }
                self.tokens.advance()?;
            }
        }

        self.tokens.consume_symbol(Sym::RightParen)?;
        Ok(count)
    }
}

/// Scope resolution
impl<'a, 'c, W: Write> CompilationEngine<'a, 'c, W> {
    /// Subroutine scope shadows class scope.
    #[inline]
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    fn resolve(&self, name: &str) -> Resolution {
        match self.lookup(name) {
            Some(symbol) => Resolution::Variable(symbol.clone()),
            None => Resolution::ClassName(SmolStr::from(name)),
        }
    }

    fn resolve_variable(&self, name: &str, span: Span) -> Result<Symbol, CompileError> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| CompileError::UndefinedSymbol {
                name: SmolStr::from(name),
                span,
            })
    }

    #[inline]
    fn push_variable(&mut self, symbol: &Symbol) -> Result<(), CompileError> {
        self.writer
            .write_push(Segment::from(symbol.kind), symbol.index)?;
        Ok(())
    }
}
