//! OKL expression parser
//!
//! This module turns expression text into [`Expr`] trees:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`expressions`]: Shunting-Yard expression building (tokens → tree)
//! - [`operators`]: Operator descriptors, precedence and associativity
//! - [`token`]: Token definitions
//!
//! Statements are not parsed here; they are assembled through
//! [`crate::ast::statement`].

pub mod expressions;
pub mod lexer;
pub mod operators;
pub mod token;

pub use expressions::{get_expression, ExprError, PairSide};
pub use lexer::{LexError, Lexer};
pub use token::{Token, TokenKind, TokenType};

use crate::ast::expr::Expr;
use crate::diagnostics::{Located, SourceLocation};
use crate::symbols::{ScopeId, SymbolTable};
use thiserror::Error;

/// Parse error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl Located for ParseError {
    fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lex(err) => err.location,
            ParseError::Expr(err) => err.location(),
        }
    }
}

/// Parses `source` without resolving names; every name stays an identifier.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(get_expression(tokens)?)
}

/// Parses `source`, resolving names visible from `scope`.
pub fn parse_expression_in(
    source: &str,
    symbols: &SymbolTable,
    scope: ScopeId,
) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(source).with_symbols(symbols, scope).tokenize()?;
    Ok(get_expression(tokens)?)
}
