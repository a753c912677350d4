//! Tokens fed to the expression builder.
//!
//! A token is either an output token (a value, a name or a type) or an
//! operator token pointing at a static [`Operator`] descriptor. Lexemes with
//! more than one reading (`+`, `*`, `++`, `::`, ...) carry the generic
//! descriptor until the builder resolves them.

use super::operators::{OpType, Operator};
use crate::ast::primitive::Primitive;
use crate::diagnostics::SourceLocation;
use crate::symbols::{FuncId, TypeId, VarId, Vartype};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenType: u32 {
        const IDENTIFIER = 1 << 0;
        const PRIMITIVE  = 1 << 1;
        const CHAR       = 1 << 2;
        const STRING     = 1 << 3;
        const TYPE       = 1 << 4;
        const VARTYPE    = 1 << 5;
        const VARIABLE   = 1 << 6;
        const FUNCTION   = 1 << 7;
        const OP         = 1 << 8;

        /// Tokens that become leaf nodes
        const OUTPUT = Self::IDENTIFIER.bits()
            | Self::PRIMITIVE.bits()
            | Self::CHAR.bits()
            | Self::STRING.bits()
            | Self::TYPE.bits()
            | Self::VARTYPE.bits()
            | Self::VARIABLE.bits()
            | Self::FUNCTION.bits();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Primitive(Primitive),
    /// Char literal contents as written, escapes kept
    Char(String),
    /// String literal contents as written, escapes kept
    Str(String),
    Type(TypeId),
    Vartype(Vartype),
    Variable(VarId),
    Function(FuncId),
    Op(&'static Operator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Token { kind, location }
    }

    pub fn op(op: &'static Operator, location: SourceLocation) -> Self {
        Token::new(TokenKind::Op(op), location)
    }

    pub fn token_type(&self) -> TokenType {
        match &self.kind {
            TokenKind::Identifier(_) => TokenType::IDENTIFIER,
            TokenKind::Primitive(_) => TokenType::PRIMITIVE,
            TokenKind::Char(_) => TokenType::CHAR,
            TokenKind::Str(_) => TokenType::STRING,
            TokenKind::Type(_) => TokenType::TYPE,
            TokenKind::Vartype(_) => TokenType::VARTYPE,
            TokenKind::Variable(_) => TokenType::VARIABLE,
            TokenKind::Function(_) => TokenType::FUNCTION,
            TokenKind::Op(_) => TokenType::OP,
        }
    }

    pub fn is_output(&self) -> bool {
        self.token_type().intersects(TokenType::OUTPUT)
    }

    pub fn as_op(&self) -> Option<&'static Operator> {
        match self.kind {
            TokenKind::Op(op) => Some(op),
            _ => None,
        }
    }

    /// Operator kind, empty for output tokens
    pub fn op_type(&self) -> OpType {
        self.as_op().map_or(OpType::empty(), |op| op.op_type)
    }

    /// Replaces the operator once an ambiguous one is resolved
    pub fn set_op(&mut self, op: &'static Operator) {
        self.kind = TokenKind::Op(op);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Primitive(value) => write!(f, "primitive {}", value),
            TokenKind::Char(value) => write!(f, "char literal '{}'", value),
            TokenKind::Str(value) => write!(f, "string literal \"{}\"", value),
            TokenKind::Type(id) => write!(f, "type #{}", id.0),
            TokenKind::Vartype(vartype) => write!(f, "vartype #{}", vartype.base.0),
            TokenKind::Variable(id) => write!(f, "variable #{}", id.0),
            TokenKind::Function(id) => write!(f, "function #{}", id.0),
            TokenKind::Op(op) => write!(f, "'{}'", op),
        }
    }
}
