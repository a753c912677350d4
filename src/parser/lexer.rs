//! Lexer for OKL expression text
//!
//! Converts source text into the flat [`Token`] stream consumed by the
//! expression builder. Ambiguous operator lexemes are emitted with their
//! generic descriptor; deciding between `+x` and `a + b` is the builder's
//! job. When a [`SymbolTable`] is supplied, identifiers naming a visible
//! symbol come out as `variable`, `function` or `type` tokens.

use super::operators;
use super::token::{Token, TokenKind};
use crate::ast::primitive::Primitive;
use crate::diagnostics::{Located, SourceLocation};
use crate::symbols::{ScopeId, Symbol, SymbolTable, TypeId, Vartype};
use log::trace;
use thiserror::Error;

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        LexError {
            message: message.into(),
            location,
        }
    }
}

impl Located for LexError {
    fn location(&self) -> SourceLocation {
        self.location
    }
}

/// Lexer for OKL expressions
pub struct Lexer<'a> {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    symbols: Option<(&'a SymbolTable, ScopeId)>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            symbols: None,
        }
    }

    /// Resolve identifiers against `scope` while lexing.
    pub fn with_symbols(mut self, symbols: &'a SymbolTable, scope: ScopeId) -> Self {
        self.symbols = Some((symbols, scope));
        self
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            if self.is_at_end() {
                break;
            }
            let token = self.next_token()?;
            trace!("lexed {} at {}", token, token.location);
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self
            .peek()
            .ok_or_else(|| LexError::new("Unexpected end of input", loc))?;

        match ch {
            '"' => self.string_literal(),
            '\'' => self.char_literal(),
            '0'..='9' => self.number_literal(),
            '.' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal()
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(),
            _ => self.operator(),
        }
    }

    /// Longest operator lexeme at the current position
    fn operator(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        for (lexeme, op) in operators::LEXEMES {
            if self.starts_with(lexeme) {
                for _ in 0..lexeme.len() {
                    self.advance();
                }
                return Ok(Token::op(op, loc));
            }
        }

        let ch = self.peek().unwrap_or_default();
        Err(LexError::new(format!("Unexpected character: '{}'", ch), loc))
    }

    /// Parse string literal, keeping escapes as written
    fn string_literal(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        self.advance(); // opening quote
        let value = self.quoted('"', loc, "string")?;
        Ok(Token::new(TokenKind::Str(value), loc))
    }

    /// Parse character literal, keeping escapes as written
    fn char_literal(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        self.advance(); // opening quote
        let value = self.quoted('\'', loc, "character")?;
        if value.is_empty() {
            return Err(LexError::new("Empty character literal", loc));
        }
        Ok(Token::new(TokenKind::Char(value), loc))
    }

    fn quoted(&mut self, quote: char, loc: SourceLocation, what: &str) -> Result<String, LexError> {
        let mut value = String::new();
        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(value);
            }
            if ch == '\n' {
                break;
            }
            value.push(ch);
            if ch == '\\' {
                let escaped = self.advance().ok_or_else(|| {
                    LexError::new(format!("Unterminated {} literal", what), loc)
                })?;
                value.push(escaped);
            }
        }
        Err(LexError::new(format!("Unterminated {} literal", what), loc))
    }

    /// Parse numeric literal: decimal, hex, floating point and suffixes
    fn number_literal(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let mut text = String::new();

        let is_hex = self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x' | 'X'));
        if is_hex {
            text.push(self.advance().unwrap_or('0'));
            text.push(self.advance().unwrap_or('x'));
            self.take_while(&mut text, |c| c.is_ascii_hexdigit());
        } else {
            self.take_while(&mut text, |c| c.is_ascii_digit());
            if self.peek() == Some('.') {
                text.push('.');
                self.advance();
                self.take_while(&mut text, |c| c.is_ascii_digit());
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_ahead(1), Some('+' | '-'));
                let digit_at = if signed { 2 } else { 1 };
                if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    for _ in 0..digit_at {
                        text.extend(self.advance());
                    }
                    self.take_while(&mut text, |c| c.is_ascii_digit());
                }
            }
        }
        self.take_while(&mut text, |c| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F'));

        let value = Primitive::from_literal(&text)
            .ok_or_else(|| LexError::new(format!("Invalid numeric literal: {}", text), loc))?;
        Ok(Token::new(TokenKind::Primitive(value), loc))
    }

    /// Parse identifier, keyword or type
    fn identifier_or_keyword(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ident = self.word();

        if let Some((_, op)) = operators::KEYWORD_OPERATORS
            .iter()
            .find(|(keyword, _)| *keyword == ident)
        {
            return Ok(Token::op(op, loc));
        }

        match ident.as_str() {
            "true" => return Ok(Token::new(TokenKind::Primitive(Primitive::Bool(true)), loc)),
            "false" => return Ok(Token::new(TokenKind::Primitive(Primitive::Bool(false)), loc)),
            "const" => {
                self.skip_whitespace_and_comments()?;
                let base = if self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
                    let name = self.word();
                    self.type_named(&name)
                } else {
                    None
                };
                let Some(base) = base else {
                    return Err(LexError::new("Expected a type after 'const'", loc));
                };
                let vartype = self.pointers(Vartype::new(base).with_const())?;
                return Ok(Token::new(TokenKind::Vartype(vartype), loc));
            }
            _ => {}
        }

        if let Some(id) = self.type_named(&ident) {
            let vartype = self.pointers(Vartype::new(id))?;
            let kind = if vartype.pointer_depth > 0 {
                TokenKind::Vartype(vartype)
            } else {
                TokenKind::Type(id)
            };
            return Ok(Token::new(kind, loc));
        }

        let kind = match self.symbols.and_then(|(table, scope)| table.lookup(scope, &ident)) {
            Some(Symbol::Variable(id)) => TokenKind::Variable(id),
            Some(Symbol::Function(id)) => TokenKind::Function(id),
            Some(Symbol::Type(id)) => TokenKind::Type(id),
            None => TokenKind::Identifier(ident),
        };
        Ok(Token::new(kind, loc))
    }

    /// Builtin type keyword, or a type visible through the symbol table
    fn type_named(&self, name: &str) -> Option<TypeId> {
        if let Some(id) = TypeId::builtin(name) {
            return Some(id);
        }
        match self.symbols?.0.lookup(self.symbols?.1, name)? {
            Symbol::Type(id) => Some(id),
            _ => None,
        }
    }

    /// Folds trailing `*` into the vartype, leaving `*=` alone
    fn pointers(&mut self, mut vartype: Vartype) -> Result<Vartype, LexError> {
        loop {
            self.skip_whitespace_and_comments()?;
            if self.peek() == Some('*') && self.peek_ahead(1) != Some('=') {
                self.advance();
                vartype = vartype.with_pointer();
            } else {
                return Ok(vartype);
            }
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        self.take_while(&mut word, |c| c.is_ascii_alphanumeric() || c == '_');
        word
    }

    fn take_while(&mut self, into: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            into.push(ch);
            self.advance();
        }
    }

    fn starts_with(&self, lexeme: &str) -> bool {
        lexeme
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new("Unterminated block comment", start_loc))
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Shorthand for lexing without a symbol table
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::operators::OpType;

    fn ops(source: &str) -> Vec<OpType> {
        tokenize(source)
            .unwrap()
            .iter()
            .map(|token| token.op_type())
            .collect()
    }

    #[test]
    fn test_longest_match() {
        assert_eq!(
            ops("<<< >>> <<= ->* -> :: .* ++ +"),
            vec![
                OpType::CUDA_CALL_START,
                OpType::CUDA_CALL_END,
                OpType::LEFT_SHIFT_EQ,
                OpType::ARROW_STAR,
                OpType::ARROW,
                OpType::SCOPE_RESOLUTION,
                OpType::DOT_STAR,
                OpType::INCREMENT,
                OpType::PLUS,
            ]
        );
        assert_eq!(ops("a+++b").len(), 4);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 0x1F 3L 1.5f 2.0 .5 1e3 7u").unwrap();
        let values: Vec<Primitive> = tokens
            .into_iter()
            .map(|token| match token.kind {
                TokenKind::Primitive(value) => value,
                other => panic!("expected a primitive, got {:?}", other),
            })
            .collect();
        assert_eq!(
            values,
            vec![
                Primitive::Int(42),
                Primitive::Int(31),
                Primitive::Long(3),
                Primitive::Float(1.5),
                Primitive::Double(2.0),
                Primitive::Double(0.5),
                Primitive::Double(1000.0),
                Primitive::Int(7),
            ]
        );
    }

    #[test]
    fn test_types_and_keywords() {
        let tokens = tokenize("sizeof(const float*) true int").unwrap();
        assert_eq!(tokens[0].op_type(), OpType::SIZEOF);
        assert_eq!(
            tokens[2].kind,
            TokenKind::Vartype(Vartype::new(TypeId::FLOAT).with_const().with_pointer())
        );
        assert_eq!(tokens[3].op_type(), OpType::PARENTHESES_END);
        assert_eq!(tokens[4].kind, TokenKind::Primitive(Primitive::Bool(true)));
        assert_eq!(tokens[5].kind, TokenKind::Type(TypeId::INT));
    }

    #[test]
    fn test_literals_keep_escapes() {
        let tokens = tokenize(r#"'\n' "a\"b""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Char("\\n".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Str("a\\\"b".to_string()));
    }

    #[test]
    fn test_comments_and_locations() {
        let tokens = tokenize("a /* b */ +\n// c\n  d").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].location, SourceLocation::new(1, 11));
        assert_eq!(tokens[2].location, SourceLocation::new(3, 3));
    }

    #[test]
    fn test_symbol_resolution() {
        let mut symbols = SymbolTable::new();
        let scope = symbols.new_scope(ScopeId::GLOBAL);
        let n = symbols.declare_variable(scope, "N", Vartype::new(TypeId::INT));

        let tokens = Lexer::new("N + M").with_symbols(&symbols, scope).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Variable(n));
        assert_eq!(tokens[2].kind, TokenKind::Identifier("M".to_string()));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("const x").unwrap_err().message,
            "Expected a type after 'const'"
        );
        assert_eq!(tokenize("\"open").unwrap_err().message, "Unterminated string literal");
        assert_eq!(tokenize("a $ b").unwrap_err().location, SourceLocation::new(1, 3));
    }
}
