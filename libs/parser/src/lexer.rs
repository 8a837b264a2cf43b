//! Newton lexer - tokenizes expression source
//!
//! Produces identifiers, numeric literals (with optional fraction and
//! exponent), the arithmetic operators `+ - * / **`, delimiters and the
//! `dot` / `cross` keywords. `#` starts a line comment and `/* */` encloses a
//! block comment.

use crate::error::{Error, Result};
use crate::token::{SourceLocation, Token, TokenType};

static KEYWORDS: phf::Map<&'static str, TokenType> = phf::phf_map! {
    "dot" => TokenType::Dot,
    "cross" => TokenType::Cross,
};

/// The Newton lexer
pub struct Lexer {
    position: usize,
    line: usize,
    column: usize,
    chars: Vec<char>,
    current_char: Option<char>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            position: 0,
            line: 1,
            column: 1,
            chars,
            current_char,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if let Some(c) = self.current_char {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    /// Whether the cursor sits on an exponent suffix such as `e3` or `E-3`.
    /// A bare `e` starts an identifier instead, as in `3eV`.
    fn at_exponent(&self) -> bool {
        let is_digit = |c: Option<char>| matches!(c, Some(c) if c.is_ascii_digit());
        matches!(self.current_char, Some('e') | Some('E'))
            && match self.peek() {
                Some('+') | Some('-') => is_digit(self.peek_at(2)),
                next => is_digit(next),
            }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char, Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip one comment if the cursor sits on one. Returns whether anything
    /// was skipped.
    fn skip_comment(&mut self) -> std::result::Result<bool, String> {
        match (self.current_char, self.peek()) {
            (Some('#'), _) => {
                while let Some(c) = self.current_char {
                    self.advance();
                    if c == '\n' {
                        break;
                    }
                }
                Ok(true)
            }
            (Some('/'), Some('*')) => {
                self.advance(); // Skip '/'
                self.advance(); // Skip '*'

                while let Some(c) = self.current_char {
                    if c == '*' && self.peek() == Some('/') {
                        self.advance();
                        self.advance();
                        return Ok(true);
                    }
                    self.advance();
                }
                Err("Unterminated block comment".into())
            }
            _ => Ok(false),
        }
    }

    fn read_identifier(&mut self) -> String {
        let start_pos = self.position;

        while matches!(self.current_char, Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        self.chars[start_pos..self.position].iter().collect()
    }

    fn read_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.current_char, Some(c) if c.is_ascii_digit()) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Read a numeric literal: `123`, `4.5`, `.5`, `6.02e23`, `1E-3`.
    fn read_number(&mut self) -> String {
        let start_pos = self.position;

        self.read_digits();

        if self.current_char == Some('.') && matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance(); // Skip '.'
            self.read_digits();
        }

        if self.at_exponent() {
            self.advance();
            if matches!(self.current_char, Some('+') | Some('-')) {
                self.advance();
            }
            self.read_digits();
        }

        self.chars[start_pos..self.position].iter().collect()
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            match self.skip_comment() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(message) => {
                    return Token::error(message, self.position, self.line, self.column)
                }
            }
        }

        let position = self.position;
        let line = self.line;
        let column = self.column;

        let Some(c) = self.current_char else {
            return Token::eof(position, line, column);
        };

        let single = |token_type: TokenType| {
            Token::new(token_type, c.to_string(), position, line, column)
        };

        match c {
            '(' => {
                self.advance();
                single(TokenType::OpenParen)
            }
            ')' => {
                self.advance();
                single(TokenType::CloseParen)
            }
            ',' => {
                self.advance();
                single(TokenType::Comma)
            }
            ';' => {
                self.advance();
                single(TokenType::Semicolon)
            }
            '+' => {
                self.advance();
                single(TokenType::Plus)
            }
            '-' => {
                self.advance();
                single(TokenType::Minus)
            }
            '/' => {
                self.advance();
                single(TokenType::Divide)
            }
            '*' => {
                self.advance();
                if self.current_char == Some('*') {
                    self.advance();
                    Token::new(TokenType::Exponent, "**".into(), position, line, column)
                } else {
                    single(TokenType::Multiply)
                }
            }
            c if c.is_ascii_digit()
                || (c == '.' && matches!(self.peek(), Some(n) if n.is_ascii_digit())) =>
            {
                let value = self.read_number();
                Token::new(TokenType::Number, value, position, line, column)
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                let token_type = KEYWORDS
                    .get(ident.as_str())
                    .copied()
                    .unwrap_or(TokenType::Identifier);
                Token::new(token_type, ident, position, line, column)
            }
            _ => {
                self.advance();
                Token::error(
                    format!("Unexpected character: {}", c),
                    position,
                    line,
                    column,
                )
            }
        }
    }

    /// Tokenize the whole input. The returned vector ends with `Eof`; the
    /// first error token aborts with [`Error::Lex`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.token_type {
                TokenType::Error => {
                    return Err(Error::Lex {
                        location: SourceLocation {
                            position: token.position,
                            line: token.line,
                            column: token.column,
                        },
                        message: token.value,
                    })
                }
                TokenType::Eof => {
                    tokens.push(token);
                    return Ok(tokens);
                }
                _ => tokens.push(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = matches!(token.token_type, TokenType::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn types(input: &str) -> Vec<TokenType> {
        tokenize(input).into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_identifiers_and_keywords() {
        let tokens = tokenize("mass dot cross dotted _x1");
        assert_eq!(tokens[0].token_type, TokenType::Identifier);
        assert_eq!(tokens[0].value, "mass");
        assert_eq!(tokens[1].token_type, TokenType::Dot);
        assert_eq!(tokens[2].token_type, TokenType::Cross);
        assert_eq!(tokens[3].token_type, TokenType::Identifier);
        assert_eq!(tokens[3].value, "dotted");
        assert_eq!(tokens[4].value, "_x1");
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.14 .5 6.02e23 1E-3");
        let values: Vec<&str> = tokens[..5].iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["42", "3.14", ".5", "6.02e23", "1E-3"]);
        assert!(tokens[..5]
            .iter()
            .all(|t| t.token_type == TokenType::Number));
    }

    #[test]
    fn test_number_followed_by_e_identifier() {
        let tokens = tokenize("3eV 2energy 1e+ 4E-2x");
        let pairs: Vec<(TokenType, &str)> = tokens
            .iter()
            .map(|t| (t.token_type, t.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (TokenType::Number, "3"),
                (TokenType::Identifier, "eV"),
                (TokenType::Number, "2"),
                (TokenType::Identifier, "energy"),
                (TokenType::Number, "1"),
                (TokenType::Identifier, "e"),
                (TokenType::Plus, "+"),
                (TokenType::Number, "4E-2"),
                (TokenType::Identifier, "x"),
                (TokenType::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            types("+ - * / ** ( ) , ;"),
            vec![
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Multiply,
                TokenType::Divide,
                TokenType::Exponent,
                TokenType::OpenParen,
                TokenType::CloseParen,
                TokenType::Comma,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_exponent_binds_before_multiply() {
        assert_eq!(
            types("a***b"),
            vec![
                TokenType::Identifier,
                TokenType::Exponent,
                TokenType::Multiply,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            types("a # trailing\n/* block\n comment */ b"),
            vec![TokenType::Identifier, TokenType::Identifier, TokenType::Eof]
        );
    }

    #[test]
    fn test_line_tracking() {
        let tokens = tokenize("a\n  b");
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_errors() {
        assert_eq!(tokenize("/* open")[0].token_type, TokenType::Error);
        assert!(matches!(
            Lexer::new("a $ b").tokenize(),
            Err(Error::Lex { location, .. }) if location.column == 3
        ));
    }
}
