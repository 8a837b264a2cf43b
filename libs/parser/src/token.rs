//! Token types for the Newton lexer

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use std::fmt;

/// Token types for the Newton expression lexer
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum TokenType {
    // Literals
    Identifier,
    Number,

    // Vector operator keywords
    Dot,   // dot
    Cross, // cross

    // Operators
    Plus,     // +
    Minus,    // -
    Multiply, // *
    Divide,   // /
    Exponent, // **

    // Delimiters
    OpenParen,  // (
    CloseParen, // )
    Comma,      // ,
    Semicolon,  // ;

    // End of input
    Eof,

    // Error
    Error,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenType::Identifier => "identifier",
            TokenType::Number => "number",
            TokenType::Dot => "'dot'",
            TokenType::Cross => "'cross'",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Multiply => "'*'",
            TokenType::Divide => "'/'",
            TokenType::Exponent => "'**'",
            TokenType::OpenParen => "'('",
            TokenType::CloseParen => "')'",
            TokenType::Comma => "','",
            TokenType::Semicolon => "';'",
            TokenType::Eof => "end of input",
            TokenType::Error => "invalid token",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SourceLocation {
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A token in a Newton expression
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        value: String,
        position: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            value,
            position,
            line,
            column,
        }
    }

    pub fn eof(position: usize, line: usize, column: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position, line, column)
    }

    pub fn error(message: String, position: usize, line: usize, column: usize) -> Self {
        Self::new(TokenType::Error, message, position, line, column)
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Human readable form for diagnostics, e.g. `identifier 'mass'`.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Identifier | TokenType::Number => {
                format!("{} '{}'", self.token_type, self.value)
            }
            _ => self.token_type.to_string(),
        }
    }
}

/// Buffered token sequence with arbitrary lookahead.
///
/// The stream always ends in an `Eof` token, and peeking past the end keeps
/// returning it.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (position, line, column) = tokens
                .last()
                .map(|t| (t.position + t.value.len(), t.line, t.column + t.value.len()))
                .unwrap_or((0, 1, 1));
            tokens.push(Token::eof(position, line, column));
        }
        Self { tokens, cursor: 0 }
    }

    pub fn from_source(source: &str) -> Result<Self> {
        Ok(Self::new(Lexer::new(source).tokenize()?))
    }

    /// `peek(1)` is the next unconsumed token.
    pub fn peek(&self, k: usize) -> &Token {
        let index = (self.cursor + k.saturating_sub(1)).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn peek_is(&self, k: usize, token_type: TokenType) -> bool {
        self.peek(k).token_type == token_type
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek(1).clone();
        if token.token_type != TokenType::Eof {
            self.cursor += 1;
        }
        token
    }

    /// Consume the next token, failing unless it has the given type.
    pub fn expect(&mut self, token_type: TokenType) -> Result<Token> {
        let next = self.peek(1);
        if next.token_type == token_type {
            Ok(self.advance())
        } else {
            Err(Error::Syntax {
                expected: token_type.to_string(),
                found: next.describe(),
                location: next.location(),
            })
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek_is(1, TokenType::Eof)
    }
}
