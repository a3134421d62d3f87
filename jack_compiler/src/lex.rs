//! Lexical analysis (tokenizer)
use crate::tokens::{Keyword, Span, Symbol, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use smol_str::SmolStr;
use std::{error, fmt, iter::Iterator, str::CharIndices};

/// Largest value of an integer constant.
pub const MAX_INT: u16 = 32767;

/// Print the token stream as a table, stopping at the first error.
pub fn debug_print_lexer(lexer: Lexer) {
    let source = lexer.source_code();
    println!("Source Byte Count: {}", source.len());
    println!("offset | line:col | token                | fragment");

    for result in lexer {
        match result {
            Ok(token) => {
                let position = format!("{}:{}", token.span.line, token.span.column);
                let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
                let fragment = token.span.fragment(source);
                println!("{:6} | {position: <8} | {kind: <20} | {fragment}", token.span.start);
            }
            Err(err) => {
                println!("{err}");
                break;
            }
        }
    }
}

/// Lexical analyzer.
///
/// Whitespace and all three comment styles (`//`, `/* */` and `/** */`)
/// are skipped, so only significant tokens are produced.
pub struct Lexer<'a> {
    source: SourceText<'a>,
    token_start: SourcePos,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos {
                position: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Returns `None` when the end of the source is reached.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            self.consume_whitespace();
            self.start_token();

            let (_, next_char) = self.source.next_char()?;
            match next_char {
                '/' => match self.source.peek_char() {
                    Some('/') => self.consume_line_comment(),
                    Some('*') => {
                        if let Err(err) = self.consume_block_comment() {
                            return Some(Err(err));
                        }
                    }
                    _ => return Some(Ok(self.make_token(TokenKind::Symbol(Symbol::Slash)))),
                },
                '"' => return Some(self.consume_string()),
                '0'..='9' => return Some(self.consume_number()),
                '_' | 'a'..='z' | 'A'..='Z' => return Some(Ok(self.consume_ident())),
                c => {
                    return Some(match Symbol::from_char(c) {
                        Some(symbol) => Ok(self.make_token(TokenKind::Symbol(symbol))),
                        None => Err(LexError::UnknownCharacter {
                            character: c,
                            span: self.make_span(),
                        }),
                    })
                }
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.position();
    }

    fn make_span(&self) -> Span {
        Span {
            start: self.token_start.position,
            end: self.source.offset,
            line: self.token_start.line,
            column: self.token_start.column,
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            span: self.make_span(),
        }
    }

    fn token_fragment(&self) -> &'a str {
        self.make_span().fragment(self.source.original)
    }

    fn consume_whitespace(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn consume_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a block comment, including documentation comments,
    /// which may span multiple lines.
    fn consume_block_comment(&mut self) -> Result<(), LexError> {
        // Opening star.
        self.source.next_char();

        loop {
            match self.source.next_char() {
                Some((_, '*')) if self.source.peek_char() == Some('/') => {
                    self.source.next_char();
                    return Ok(());
                }
                Some(_) => continue,
                None => {
                    return Err(LexError::UnterminatedComment {
                        span: self.make_span(),
                    })
                }
            }
        }
    }

    fn consume_ident(&mut self) -> Token {
        while let Some('_' | 'a'..='z' | 'A'..='Z' | '0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let fragment = self.token_fragment();
        let token_kind = match fragment.parse::<Keyword>() {
            Ok(keyword) => TokenKind::Keyword(keyword),
            Err(_) => TokenKind::Ident(SmolStr::from(fragment)),
        };
        self.make_token(token_kind)
    }

    fn consume_number(&mut self) -> Result<Token, LexError> {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        match self.token_fragment().parse::<u16>() {
            Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenKind::Int(value))),
            _ => Err(LexError::IntegerOverflow {
                span: self.make_span(),
            }),
        }
    }

    /// String constants have no escape sequences and may not
    /// contain a newline or a double quote.
    ///
    /// Every character is pushed as a constant, so its code must
    /// not exceed [`MAX_INT`].
    fn consume_string(&mut self) -> Result<Token, LexError> {
        let mut unsupported = None;

        loop {
            match self.source.next_char() {
                Some((_, '"')) => break,
                Some((_, '\n')) | None => {
                    return Err(LexError::UnterminatedString {
                        span: self.make_span(),
                    })
                }
                Some((_, c)) if u32::from(c) > u32::from(MAX_INT) => {
                    unsupported.get_or_insert(c);
                }
                Some(_) => continue,
            }
        }

        if let Some(character) = unsupported {
            return Err(LexError::UnsupportedCharacter {
                character,
                span: self.make_span(),
            });
        }

        let fragment = self.token_fragment();
        let text = &fragment[1..fragment.len() - 1];

        // The code generator pushes the length as a constant.
        if text.encode_utf16().count() > usize::from(MAX_INT) {
            return Err(LexError::StringOverflow {
                span: self.make_span(),
            });
        }

        Ok(self.make_token(TokenKind::Str(SmolStr::from(text))))
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    /// Keep reference to the source so the lexer can
    /// slice fragments from it.
    original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// An important semantic feature of `MultiPeek` is that peeking advances
    /// the internal peek cursor by 1. The peek cursor offset is restored
    /// to 0 when calling `MultiPeek::next()` or `MultiPeek::reset_peek()`.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position of the next unconsumed character.
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> SourcePos {
        SourcePos {
            position: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        let (index, c) = self.source.next()?;
        self.offset = index + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some((index, c))
    }

    /// Look at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.source.reset_peek();
        let c = self.source.peek().map(|(_, c)| *c);
        self.source.reset_peek();
        c
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SourcePos {
    position: usize,
    line: usize,
    column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnknownCharacter { character: char, span: Span },
    UnterminatedString { span: Span },
    /// Character in a string constant whose code exceeds [`MAX_INT`].
    UnsupportedCharacter { character: char, span: Span },
    UnterminatedComment { span: Span },
    /// Integer constant larger than [`MAX_INT`].
    IntegerOverflow { span: Span },
    /// String constant too long for its length to be pushed as a constant.
    StringOverflow { span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            Self::UnknownCharacter { span, .. }
            | Self::UnterminatedString { span }
            | Self::UnsupportedCharacter { span, .. }
            | Self::UnterminatedComment { span }
            | Self::IntegerOverflow { span }
            | Self::StringOverflow { span } => span,
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownCharacter { character, .. } => {
                write!(f, "lexical error: unknown character {character:?}")
            }
            Self::UnterminatedString { .. } => write!(f, "lexical error: unterminated string constant"),
            Self::UnsupportedCharacter { character, .. } => {
                write!(f, "lexical error: character {character:?} is outside the constant range")
            }
            Self::UnterminatedComment { .. } => write!(f, "lexical error: unterminated block comment"),
            Self::IntegerOverflow { .. } => {
                write!(f, "lexical error: integer constant exceeds {MAX_INT}")
            }
            Self::StringOverflow { .. } => {
                write!(f, "lexical error: string constant longer than {MAX_INT} characters")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|result| result.unwrap().kind).collect()
    }

    #[test]
    fn test_symbols_split_without_whitespace() {
        use Symbol as S;
        use TokenKind as T;

        assert_eq!(
            kinds("a[i]=b+1;"),
            vec![
                T::Ident("a".into()),
                T::Symbol(S::LeftBracket),
                T::Ident("i".into()),
                T::Symbol(S::RightBracket),
                T::Symbol(S::Eq),
                T::Ident("b".into()),
                T::Symbol(S::Plus),
                T::Int(1),
                T::Symbol(S::Semicolon),
            ]
        );
    }

    #[test]
    fn test_span_position() {
        let tokens = Lexer::new("let\n  x").collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
        assert_eq!(tokens[1].span.start, 6);
        assert_eq!(tokens[1].span.size(), 1);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("x /* never closed").nth(1).unwrap().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }
}
