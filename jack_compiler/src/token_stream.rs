//! Cursor over the lexed tokens, holding one current token.
use crate::{
    lex::{LexError, Lexer},
    tokens::{BinaryOp, Keyword, Span, Symbol, Token, TokenKind, TokenType, UnaryOp},
};

use smol_str::SmolStr;
use std::{error, fmt, iter::Peekable};

/// Pull based stream of tokens.
///
/// Tokens are lazily lexed. The stream exposes exactly one
/// current token, which is replaced by [`TokenStream::advance`].
/// There is no rewinding. The one token of look ahead kept
/// internally only serves [`TokenStream::has_more`].
pub struct TokenStream<'a> {
    lexer: Peekable<Lexer<'a>>,
    /// Keep reference to the source so errors
    /// can point past its end.
    original: &'a str,
    current: Option<Token>,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            original: lexer.source_code(),
            lexer: lexer.peekable(),
            current: None,
        }
    }

    /// Indicates whether another token follows the current one.
    ///
    /// A pending lexical error counts as more input, so it
    /// surfaces on the next call to `advance`.
    #[inline]
    pub fn has_more(&mut self) -> bool {
        self.lexer.peek().is_some()
    }

    /// Replace the current token with the next one in the source.
    pub fn advance(&mut self) -> Result<(), TokenError> {
        match self.lexer.next() {
            Some(Ok(token)) => {
                self.current = Some(token);
                Ok(())
            }
            Some(Err(err)) => Err(TokenError::Lex(err)),
            None => Err(TokenError::EndOfSource { span: self.end_span() }),
        }
    }

    #[inline]
    pub fn current(&self) -> Result<&Token, TokenError> {
        self.current
            .as_ref()
            .ok_or_else(|| TokenError::EndOfSource { span: self.end_span() })
    }

    /// Span of the current token, or the end of the source when
    /// the stream has not been advanced yet.
    pub fn span(&self) -> Span {
        match &self.current {
            Some(token) => token.span,
            None => self.end_span(),
        }
    }

    fn end_span(&self) -> Span {
        // Counted from the end offset, so a trailing newline starts a new line.
        let line = self.original.matches('\n').count() + 1;
        let last_line = self.original.rsplit('\n').next().unwrap_or_default();

        Span {
            start: self.original.len(),
            end: self.original.len(),
            line,
            column: last_line.chars().count() + 1,
        }
    }

    #[inline]
    pub fn token_type(&self) -> Result<TokenType, TokenError> {
        self.current().map(|token| token.kind.token_type())
    }

    /// Build an error describing the current token as unexpected.
    pub fn mismatch(&self, expected: Expected) -> TokenError {
        match &self.current {
            Some(token) => TokenError::Mismatch {
                expected,
                found: token.kind.clone(),
                span: token.span,
            },
            None => TokenError::EndOfSource { span: self.end_span() },
        }
    }
}

/// Type specific extractors.
///
/// Each fails with [`TokenError::Mismatch`] when the current
/// token has a different classification.
impl<'a> TokenStream<'a> {
    pub fn as_keyword(&self) -> Result<Keyword, TokenError> {
        match self.current()?.kind {
            TokenKind::Keyword(keyword) => Ok(keyword),
            _ => Err(self.mismatch(Expected::Type(TokenType::Keyword))),
        }
    }

    pub fn as_symbol(&self) -> Result<Symbol, TokenError> {
        match self.current()?.kind {
            TokenKind::Symbol(symbol) => Ok(symbol),
            _ => Err(self.mismatch(Expected::Type(TokenType::Symbol))),
        }
    }

    pub fn as_identifier(&self) -> Result<&str, TokenError> {
        match &self.current()?.kind {
            TokenKind::Ident(name) => Ok(name.as_str()),
            _ => Err(self.mismatch(Expected::Type(TokenType::Identifier))),
        }
    }

    pub fn as_int(&self) -> Result<u16, TokenError> {
        match self.current()?.kind {
            TokenKind::Int(value) => Ok(value),
            _ => Err(self.mismatch(Expected::Type(TokenType::IntConst))),
        }
    }

    pub fn as_string(&self) -> Result<&str, TokenError> {
        match &self.current()?.kind {
            TokenKind::Str(text) => Ok(text.as_str()),
            _ => Err(self.mismatch(Expected::Type(TokenType::StringConst))),
        }
    }

    /// Operator of the current symbol when it is a binary operator.
    ///
    /// Fails when the current token is not a symbol.
    #[inline]
    pub fn binary_operator(&self) -> Result<Option<BinaryOp>, TokenError> {
        self.as_symbol().map(|symbol| symbol.binary_op())
    }

    #[inline]
    pub fn is_binary_operator(&self) -> Result<bool, TokenError> {
        self.binary_operator().map(|op| op.is_some())
    }

    /// Operator of the current symbol when it is a unary operator.
    ///
    /// Fails when the current token is not a symbol.
    #[inline]
    pub fn unary_operator(&self) -> Result<Option<UnaryOp>, TokenError> {
        self.as_symbol().map(|symbol| symbol.unary_op())
    }

    #[inline]
    pub fn is_unary_operator(&self) -> Result<bool, TokenError> {
        self.unary_operator().map(|op| op.is_some())
    }
}

/// Matching helpers used by the grammar routines.
impl<'a> TokenStream<'a> {
    /// Tests the current token against a symbol without consuming it.
    #[inline]
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        matches!(&self.current, Some(Token { kind: TokenKind::Symbol(s), .. }) if *s == symbol)
    }

    /// Tests the current token against a keyword without consuming it.
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current, Some(Token { kind: TokenKind::Keyword(k), .. }) if *k == keyword)
    }

    /// Advances past the current token, which must be the given symbol.
    pub fn consume_symbol(&mut self, symbol: Symbol) -> Result<(), TokenError> {
        if self.is_symbol(symbol) {
            self.advance()
        } else {
            Err(self.mismatch(Expected::Symbol(symbol)))
        }
    }

    /// Advances past the current token, which must be the given keyword.
    pub fn consume_keyword(&mut self, keyword: Keyword) -> Result<(), TokenError> {
        if self.is_keyword(keyword) {
            self.advance()
        } else {
            Err(self.mismatch(Expected::Keyword(keyword)))
        }
    }

    /// Takes the name of the current identifier token and
    /// advances past it.
    pub fn consume_identifier(&mut self) -> Result<SmolStr, TokenError> {
        let name = SmolStr::from(self.as_identifier()?);
        self.advance()?;
        Ok(name)
    }
}

/// What the active grammar rule wanted to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Type(TokenType),
    Keyword(Keyword),
    Symbol(Symbol),
    /// Grammar construct, such as "statement" or "type".
    Construct(&'static str),
    EndOfSource,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Type(token_type) => write!(f, "{token_type}"),
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Self::Symbol(symbol) => write!(f, "'{symbol}'"),
            Self::Construct(name) => f.write_str(name),
            Self::EndOfSource => write!(f, "end of source"),
        }
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: Expected,
        found: TokenKind,
        span: Span,
    },
    EndOfSource {
        span: Span,
    },
    Lex(LexError),
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch { expected, found, .. } => {
                write!(f, "encountered unexpected {found}, expected {expected}")
            }
            E::EndOfSource { .. } => write!(f, "unexpected end of source code"),
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for TokenError {
    fn from(err: LexError) -> Self {
        TokenError::Lex(err)
    }
}
