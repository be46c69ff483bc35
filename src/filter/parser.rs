//! Recursive-descent parser for LDAP filter strings.
//!
//! Grammar (in rough EBNF):
//!
//! filter     = ("&" | "|") child* (")" | EOF)
//!            | expression
//! child      = "(" filter
//! expression = "(" IDENT "=" IDENT ")"
//!
//! The opening parenthesis of a nested composite is consumed by the parent
//! before the child is parsed, so `|(&(a=b)(c=d))(e=f)` nests an AND inside
//! an OR while the top-level operator stays bare.

use std::collections::VecDeque;

use thiserror::Error;

use super::ast::Filter;
use super::lexer::{Lexer, Token, TokenKind};

/// The filter string does not conform to the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parse error")]
pub struct ParseError;

/// Never rewound further than this.
const LOOKBEHIND: usize = 2;

/// Deepest composite nesting accepted. Parsing, matching and dropping a
/// tree all recurse once per level.
pub const MAX_DEPTH: usize = 256;

/// Parser state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Most recently scanned tokens, oldest first.
    recent: VecDeque<Token>,
    /// How many of `recent` have been handed back by `unscan`.
    rewound: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            recent: VecDeque::with_capacity(LOOKBEHIND + 1),
            rewound: 0,
        }
    }

    /// Parse the whole input into a filter tree.
    pub fn parse(mut self) -> Result<Filter, ParseError> {
        let filter = self.parse_filter(0)?;

        let trailing = self.scan();
        if trailing.kind != TokenKind::Eof {
            tracing::trace!("Unexpected {} after filter", trailing.kind);
            return Err(ParseError);
        }

        Ok(filter)
    }

    fn scan(&mut self) -> Token {
        if self.rewound > 0 {
            let tok = self.recent[self.recent.len() - self.rewound].clone();
            self.rewound -= 1;
            return tok;
        }

        let tok = self.lexer.lex();
        self.recent.push_back(tok.clone());
        if self.recent.len() > LOOKBEHIND {
            self.recent.pop_front();
        }
        tok
    }

    /// Step back `n` tokens, stopping at the start of the input.
    fn unscan(&mut self, n: usize) {
        debug_assert!(n <= LOOKBEHIND);
        self.rewound = (self.rewound + n).min(self.recent.len());
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let tok = self.scan();
        if tok.kind == expected {
            Ok(tok)
        } else {
            tracing::trace!("Expected {}, got {}", expected, tok.kind);
            Err(ParseError)
        }
    }

    /// Parse a composite if the next token is an operator, otherwise an
    /// expression.
    fn parse_filter(&mut self, depth: usize) -> Result<Filter, ParseError> {
        if depth > MAX_DEPTH {
            tracing::trace!("Nesting deeper than {}", MAX_DEPTH);
            return Err(ParseError);
        }

        let tok = self.scan();

        let mut filter = match tok.kind {
            TokenKind::And => Filter::new_and(),
            TokenKind::Or => Filter::new_or(),
            _ => {
                // Give back the probe and the parent's opening token
                self.unscan(2);
                return self.parse_expression();
            }
        };

        loop {
            let tok = self.scan();
            if matches!(tok.kind, TokenKind::Eof | TokenKind::Close) {
                return Ok(filter);
            }

            let child = self.parse_filter(depth + 1)?;
            filter.append(child);
        }
    }

    /// Parse expression: "(" IDENT "=" IDENT ")"
    fn parse_expression(&mut self) -> Result<Filter, ParseError> {
        self.expect(TokenKind::Open)?;
        let key = self.expect(TokenKind::Ident)?.literal;
        self.expect(TokenKind::Equal)?;
        let value = self.expect(TokenKind::Ident)?.literal;
        self.expect(TokenKind::Close)?;

        Ok(Filter::Equality { key, value })
    }
}

/// Parse an LDAP filter string into a filter tree.
pub fn parse(input: &str) -> Result<Filter, ParseError> {
    let result = Parser::new(input).parse();
    if result.is_err() {
        tracing::debug!("Rejected filter {:?}", input);
    }
    result
}
