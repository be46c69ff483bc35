//! Lexer for LDAP filter strings.

use std::fmt;

use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// Token kinds emitted by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Any character outside the grammar (whitespace, digits, ...)
    Illegal,
    /// End of input
    Eof,
    /// Attribute name or value: a run of letters
    Ident,

    Open,  // (
    Close, // )

    And, // &
    Or,  // |
    Neg, // ! (lexed, never accepted by the parser)

    Equal, // =
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Open => "OPEN",
            TokenKind::Close => "CLOSE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Neg => "NEG",
            TokenKind::Equal => "EQUAL",
        };
        f.write_str(name)
    }
}

/// A classified lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }

    pub fn illegal() -> Self {
        Token::new(TokenKind::Illegal, "")
    }
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Lex a maximal run of letters.
fn lex_ident(input: &mut &str) -> PResult<Token> {
    take_while(1.., |c: char| c.is_alphabetic())
        .map(|ident: &str| Token::new(TokenKind::Ident, ident))
        .parse_next(input)
}

/// Lex a single character. Anything outside the grammar is consumed and
/// reported as illegal with its text dropped.
fn lex_punct(input: &mut &str) -> PResult<Token> {
    any.map(|c: char| {
        let kind = match c {
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            '&' => TokenKind::And,
            '|' => TokenKind::Or,
            '!' => TokenKind::Neg,
            '=' => TokenKind::Equal,
            _ => return Token::illegal(),
        };
        Token::new(kind, c)
    })
    .parse_next(input)
}

fn lex_token(input: &mut &str) -> PResult<Token> {
    if input.is_empty() {
        return Ok(Token::eof());
    }

    alt((lex_ident, lex_punct)).parse_next(input)
}

/// Turns a filter string into tokens, one per call to [`Lexer::lex`].
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    remaining: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { remaining: input }
    }

    /// Read exactly one token. Returns `Eof` for every call once the input
    /// is exhausted.
    pub fn lex(&mut self) -> Token {
        match lex_token(&mut self.remaining) {
            Ok(tok) => tok,
            // lex_punct accepts any char, so this only happens at the end
            Err(_) => Token::eof(),
        }
    }
}

/// Yields tokens up to, but not including, `Eof`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let tok = self.lex();
        (tok.kind != TokenKind::Eof).then_some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|tok| tok.kind).collect()
    }

    #[test]
    fn test_token_sequence() {
        let mut lexer = Lexer::new("&hello() 1=|");
        assert_eq!(lexer.lex().kind, TokenKind::And);
        assert_eq!(lexer.lex(), Token::new(TokenKind::Ident, "hello"));
        assert_eq!(lexer.lex().kind, TokenKind::Open);
        assert_eq!(lexer.lex().kind, TokenKind::Close);
        assert_eq!(lexer.lex(), Token::illegal());
        assert_eq!(lexer.lex(), Token::illegal());
        assert_eq!(lexer.lex().kind, TokenKind::Equal);
        assert_eq!(lexer.lex().kind, TokenKind::Or);
        assert_eq!(lexer.lex(), Token::eof());
        assert_eq!(lexer.lex(), Token::eof());
    }

    #[test]
    fn test_empty_input() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.lex(), Token::eof());
        assert_eq!(lexer.lex(), Token::eof());
    }

    #[test]
    fn test_ident_stops_at_non_letter() {
        let tokens: Vec<Token> = Lexer::new("(name=Jon)").collect();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Open, "("),
                Token::new(TokenKind::Ident, "name"),
                Token::new(TokenKind::Equal, "="),
                Token::new(TokenKind::Ident, "Jon"),
                Token::new(TokenKind::Close, ")"),
            ]
        );
    }

    #[test]
    fn test_digits_split_identifiers() {
        assert_eq!(
            kinds("ab12cd"),
            vec![
                TokenKind::Ident,
                TokenKind::Illegal,
                TokenKind::Illegal,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn test_unicode_letters() {
        let tokens: Vec<Token> = Lexer::new("Zoë=Ärger").collect();
        assert_eq!(tokens[0], Token::new(TokenKind::Ident, "Zoë"));
        assert_eq!(tokens[2], Token::new(TokenKind::Ident, "Ärger"));
    }

    #[test]
    fn test_negation_is_lexed() {
        assert_eq!(kinds("!(a=b)")[0], TokenKind::Neg);
    }
}
