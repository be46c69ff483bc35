//! LDAP-style search filters.
//!
//! Syntax:
//!   (key=value)             - attribute has value
//!   &(f1)(f2)...            - AND of the nested filters
//!   |(f1)(f2)...            - OR of the nested filters
//!
//! Keys and values are letters only. Nested composites are wrapped in
//! parentheses (`|(&(a=b)(c=d))(e=f)`), the top-level one is not.
//! Whitespace is not allowed anywhere.

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::Filter;
pub use eval::Input;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{MAX_DEPTH, ParseError, Parser, parse};
