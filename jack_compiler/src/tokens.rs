use smol_str::SmolStr;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Classified lexeme.
///
/// Identifiers and string constants own their text, so a token
/// stays meaningful after the lexer has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier in the set of reserved words.
    Keyword(Keyword),
    Symbol(Symbol),
    Ident(SmolStr),
    /// Integer constant in the range `0..=32767`.
    Int(u16),
    /// String constant without the surrounding quotes.
    Str(SmolStr),
}

impl TokenKind {
    #[inline]
    pub fn token_type(&self) -> TokenType {
        match self {
            Self::Keyword(_) => TokenType::Keyword,
            Self::Symbol(_) => TokenType::Symbol,
            Self::Ident(_) => TokenType::Identifier,
            Self::Int(_) => TokenType::IntConst,
            Self::Str(_) => TokenType::StringConst,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Self::Symbol(symbol) => write!(f, "'{symbol}'"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Int(value) => write!(f, "integer {value}"),
            Self::Str(text) => write!(f, "string \"{text}\""),
        }
    }
}

/// Token classification without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    Identifier,
    IntConst,
    StringConst,
}

impl fmt::Display for TokenType {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword     => write!(f, "keyword"),
            Self::Symbol      => write!(f, "symbol"),
            Self::Identifier  => write!(f, "identifier"),
            Self::IntConst    => write!(f, "integer constant"),
            Self::StringConst => write!(f, "string constant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        use Keyword as K;
        match self {
            K::Class       => "class",
            K::Constructor => "constructor",
            K::Function    => "function",
            K::Method      => "method",
            K::Field       => "field",
            K::Static      => "static",
            K::Var         => "var",
            K::Int         => "int",
            K::Char        => "char",
            K::Boolean     => "boolean",
            K::Void        => "void",
            K::True        => "true",
            K::False       => "false",
            K::Null        => "null",
            K::This        => "this",
            K::Let         => "let",
            K::Do          => "do",
            K::If          => "if",
            K::Else        => "else",
            K::While       => "while",
            K::Return      => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Keyword as K;
        match s {
            "class" => Ok(K::Class),
            "constructor" => Ok(K::Constructor),
            "function" => Ok(K::Function),
            "method" => Ok(K::Method),
            "field" => Ok(K::Field),
            "static" => Ok(K::Static),
            "var" => Ok(K::Var),
            "int" => Ok(K::Int),
            "char" => Ok(K::Char),
            "boolean" => Ok(K::Boolean),
            "void" => Ok(K::Void),
            "true" => Ok(K::True),
            "false" => Ok(K::False),
            "null" => Ok(K::Null),
            "this" => Ok(K::This),
            "let" => Ok(K::Let),
            "do" => Ok(K::Do),
            "if" => Ok(K::If),
            "else" => Ok(K::Else),
            "while" => Ok(K::While),
            "return" => Ok(K::Return),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Symbol {
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Amp,          // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~
}

impl Symbol {
    #[rustfmt::skip]
    pub fn from_char(c: char) -> Option<Self> {
        use Symbol as S;
        match c {
            '{' => Some(S::LeftBrace),
            '}' => Some(S::RightBrace),
            '(' => Some(S::LeftParen),
            ')' => Some(S::RightParen),
            '[' => Some(S::LeftBracket),
            ']' => Some(S::RightBracket),
            '.' => Some(S::Dot),
            ',' => Some(S::Comma),
            ';' => Some(S::Semicolon),
            '+' => Some(S::Plus),
            '-' => Some(S::Minus),
            '*' => Some(S::Star),
            '/' => Some(S::Slash),
            '&' => Some(S::Amp),
            '|' => Some(S::Pipe),
            '<' => Some(S::Less),
            '>' => Some(S::Greater),
            '=' => Some(S::Eq),
            '~' => Some(S::Tilde),
            _   => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_char(&self) -> char {
        use Symbol as S;
        match self {
            S::LeftBrace    => '{',
            S::RightBrace   => '}',
            S::LeftParen    => '(',
            S::RightParen   => ')',
            S::LeftBracket  => '[',
            S::RightBracket => ']',
            S::Dot          => '.',
            S::Comma        => ',',
            S::Semicolon    => ';',
            S::Plus         => '+',
            S::Minus        => '-',
            S::Star         => '*',
            S::Slash        => '/',
            S::Amp          => '&',
            S::Pipe         => '|',
            S::Less         => '<',
            S::Greater      => '>',
            S::Eq           => '=',
            S::Tilde        => '~',
        }
    }

    #[rustfmt::skip]
    pub fn binary_op(&self) -> Option<BinaryOp> {
        use Symbol as S;
        match self {
            S::Plus    => Some(BinaryOp::Add),
            S::Minus   => Some(BinaryOp::Sub),
            S::Star    => Some(BinaryOp::Mul),
            S::Slash   => Some(BinaryOp::Div),
            S::Amp     => Some(BinaryOp::And),
            S::Pipe    => Some(BinaryOp::Or),
            S::Less    => Some(BinaryOp::Lt),
            S::Greater => Some(BinaryOp::Gt),
            S::Eq      => Some(BinaryOp::Eq),
            _          => None,
        }
    }

    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self {
            Self::Minus => Some(UnaryOp::Neg),
            Self::Tilde => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Infix operator. The grammar gives them all equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `~`
    Not,
}

/// Chunk of source code, encoded as starting and ending byte positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// End position of bytes in source, exclusive.
    pub end: usize,
    /// Line of the first character, starting at 1.
    pub line: usize,
    /// Column of the first character, starting at 1.
    pub column: usize,
}

impl Span {
    #[inline]
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Slice the span's text out of the source it was lexed from.
    #[inline]
    pub fn fragment<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}
