//! Statement nodes.
//!
//! There is no statement parser; trees are assembled through this API and
//! the transforms rewrite them in place. Statements that open a scope carry
//! its [`ScopeId`].

use crate::ast::attribute::{sorted_attributes, AttributeMap};
use crate::ast::expr::Expr;
use crate::constants::INDENT;
use crate::diagnostics::SourceLocation;
use crate::symbols::{ScopeId, SymbolTable, VarId};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatementType: u32 {
        const EMPTY       = 1 << 0;
        const BLOCK       = 1 << 1;
        const EXPRESSION  = 1 << 2;
        const DECLARATION = 1 << 3;
        const FOR         = 1 << 4;
        const IF          = 1 << 5;
        const WHILE       = 1 << 6;
        const RETURN      = 1 << 7;

        const ALL = Self::EMPTY.bits()
            | Self::BLOCK.bits()
            | Self::EXPRESSION.bits()
            | Self::DECLARATION.bits()
            | Self::FOR.bits()
            | Self::IF.bits()
            | Self::WHILE.bits()
            | Self::RETURN.bits();
    }
}

/// One declarator of a declaration statement
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub variable: VarId,
    pub value: Option<Expr>,
}

/// `for (init; check; update) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub scope: ScopeId,
    pub init: Box<Statement>,
    pub check: Box<Statement>,
    pub update: Box<Statement>,
    pub body: Vec<Statement>,
    pub attributes: AttributeMap,
    pub location: SourceLocation,
}

impl ForStatement {
    pub fn new(
        scope: ScopeId,
        init: Statement,
        check: Statement,
        update: Statement,
        location: SourceLocation,
    ) -> Self {
        ForStatement {
            scope,
            init: Box::new(init),
            check: Box::new(check),
            update: Box::new(update),
            body: Vec::new(),
            attributes: AttributeMap::default(),
            location,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Empty {
        location: SourceLocation,
    },
    Block {
        scope: ScopeId,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
    Declaration {
        declarations: Vec<VariableDeclaration>,
        location: SourceLocation,
    },
    For(ForStatement),
    If {
        scope: ScopeId,
        condition: Box<Statement>,
        body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
        location: SourceLocation,
    },
    While {
        scope: ScopeId,
        condition: Box<Statement>,
        body: Vec<Statement>,
        is_do_while: bool,
        location: SourceLocation,
    },
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
}

impl Statement {
    pub fn empty(location: SourceLocation) -> Self {
        Statement::Empty { location }
    }

    /// An expression statement located at its expression
    pub fn expression(expr: Expr) -> Self {
        let location = expr.location();
        Statement::Expression { expr, location }
    }

    /// A single-declarator declaration
    pub fn declaration(variable: VarId, value: Option<Expr>, location: SourceLocation) -> Self {
        Statement::Declaration {
            declarations: vec![VariableDeclaration { variable, value }],
            location,
        }
    }

    pub fn statement_type(&self) -> StatementType {
        match self {
            Statement::Empty { .. } => StatementType::EMPTY,
            Statement::Block { .. } => StatementType::BLOCK,
            Statement::Expression { .. } => StatementType::EXPRESSION,
            Statement::Declaration { .. } => StatementType::DECLARATION,
            Statement::For(_) => StatementType::FOR,
            Statement::If { .. } => StatementType::IF,
            Statement::While { .. } => StatementType::WHILE,
            Statement::Return { .. } => StatementType::RETURN,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::Empty { location }
            | Statement::Block { location, .. }
            | Statement::Expression { location, .. }
            | Statement::Declaration { location, .. }
            | Statement::If { location, .. }
            | Statement::While { location, .. }
            | Statement::Return { location, .. } => *location,
            Statement::For(for_loop) => for_loop.location,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Statement::Empty { .. })
    }

    /// Scope opened by this statement, if any
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            Statement::Block { scope, .. }
            | Statement::If { scope, .. }
            | Statement::While { scope, .. } => Some(*scope),
            Statement::For(for_loop) => Some(for_loop.scope),
            _ => None,
        }
    }

    /// Expressions held directly by this statement. Nested statements
    /// (loop headers, bodies) are not included.
    pub fn exprs_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Statement::Expression { expr, .. } => vec![expr],
            Statement::Declaration { declarations, .. } => declarations
                .iter_mut()
                .filter_map(|decl| decl.value.as_mut())
                .collect(),
            Statement::Return { value, .. } => value.iter_mut().collect(),
            _ => Vec::new(),
        }
    }

    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            Statement::Expression { expr, .. } => vec![expr],
            Statement::Declaration { declarations, .. } => declarations
                .iter()
                .filter_map(|decl| decl.value.as_ref())
                .collect(),
            Statement::Return { value, .. } => value.iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> StatementDisplay<'a> {
        StatementDisplay {
            statement: self,
            symbols,
            depth: 0,
        }
    }
}

pub struct StatementDisplay<'a> {
    statement: &'a Statement,
    symbols: &'a SymbolTable,
    depth: usize,
}

impl StatementDisplay<'_> {
    fn indent(&self) -> String {
        INDENT.repeat(self.depth)
    }

    /// Header form used inside `for (...)`/`if (...)`: no trailing `;`
    fn inline(&self, statement: &Statement) -> String {
        let symbols = self.symbols;
        match statement {
            Statement::Expression { expr, .. } => expr.display(symbols).to_string(),
            Statement::Declaration { declarations, .. } => {
                let Some(first) = declarations.first() else {
                    return String::new();
                };
                let vartype = &symbols.variable(first.variable).vartype;
                let declarators: Vec<String> = declarations
                    .iter()
                    .map(|decl| {
                        let name = &symbols.variable(decl.variable).name;
                        match &decl.value {
                            Some(value) => format!("{} = {}", name, value.display(symbols)),
                            None => name.clone(),
                        }
                    })
                    .collect();
                format!("{} {}", symbols.vartype_name(vartype), declarators.join(", "))
            }
            _ => String::new(),
        }
    }

    fn write_body(&self, f: &mut fmt::Formatter<'_>, body: &[Statement]) -> fmt::Result {
        writeln!(f, "{{")?;
        for statement in body {
            let child = StatementDisplay {
                statement,
                symbols: self.symbols,
                depth: self.depth + 1,
            };
            writeln!(f, "{}", child)?;
        }
        write!(f, "{}}}", self.indent())
    }
}

impl fmt::Display for StatementDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.symbols;
        write!(f, "{}", self.indent())?;
        match self.statement {
            Statement::Empty { .. } => write!(f, ";"),
            Statement::Block { body, .. } => self.write_body(f, body),
            Statement::Expression { .. } | Statement::Declaration { .. } => {
                write!(f, "{};", self.inline(self.statement))
            }
            Statement::For(for_loop) => {
                write!(
                    f,
                    "for ({}; {}; {}",
                    self.inline(&for_loop.init),
                    self.inline(&for_loop.check),
                    self.inline(&for_loop.update)
                )?;
                for attribute in sorted_attributes(&for_loop.attributes) {
                    write!(f, "; {}", attribute.display(symbols))?;
                }
                write!(f, ") ")?;
                self.write_body(f, &for_loop.body)
            }
            Statement::If {
                condition,
                body,
                else_body,
                ..
            } => {
                write!(f, "if ({}) ", self.inline(condition))?;
                self.write_body(f, body)?;
                if let Some(else_body) = else_body {
                    write!(f, " else ")?;
                    self.write_body(f, else_body)?;
                }
                Ok(())
            }
            Statement::While {
                condition,
                body,
                is_do_while,
                ..
            } => {
                if *is_do_while {
                    write!(f, "do ")?;
                    self.write_body(f, body)?;
                    write!(f, " while ({});", self.inline(condition))
                } else {
                    write!(f, "while ({}) ", self.inline(condition))?;
                    self.write_body(f, body)
                }
            }
            Statement::Return { value, .. } => match value {
                Some(value) => write!(f, "return {};", value.display(symbols)),
                None => write!(f, "return;"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::attribute::Attribute;
    use crate::ast::primitive::Primitive;
    use crate::parser::parse_expression_in;
    use crate::symbols::{TypeId, Vartype};

    fn loc() -> SourceLocation {
        SourceLocation::default()
    }

    #[test]
    fn test_declaration_display() {
        let mut symbols = SymbolTable::new();
        let scope = ScopeId::GLOBAL;
        let a = symbols.declare_variable(scope, "a", Vartype::new(TypeId::INT));
        let b = symbols.declare_variable(scope, "b", Vartype::new(TypeId::INT));
        let statement = Statement::Declaration {
            declarations: vec![
                VariableDeclaration {
                    variable: a,
                    value: Some(Expr::primitive(Primitive::Int(1), loc())),
                },
                VariableDeclaration {
                    variable: b,
                    value: None,
                },
            ],
            location: loc(),
        };
        assert_eq!(statement.display(&symbols).to_string(), "int a = 1, b;");
        assert_eq!(statement.statement_type(), StatementType::DECLARATION);
        assert_eq!(statement.exprs().len(), 1);
    }

    #[test]
    fn test_for_display_with_attributes() {
        let mut symbols = SymbolTable::new();
        let scope = symbols.new_scope(ScopeId::GLOBAL);
        let i = symbols.declare_variable(scope, "i", Vartype::new(TypeId::INT));
        let parse = |source: &str| parse_expression_in(source, &symbols, scope).expect("parse failed");

        let mut for_loop = ForStatement::new(
            scope,
            Statement::declaration(i, Some(parse("0")), loc()),
            Statement::expression(parse("i < 10")),
            Statement::expression(parse("++i")),
            loc(),
        );
        for_loop.body.push(Statement::expression(parse("i += 2")));
        for_loop.attributes.insert(
            "tile".to_string(),
            Attribute::new("tile", loc()).with_arg(parse("16")),
        );

        let printed = Statement::For(for_loop).display(&symbols).to_string();
        assert_eq!(
            printed,
            "for (int i = 0; i < 10; ++i; @tile(16)) {\n  i += 2;\n}"
        );
    }

    #[test]
    fn test_nested_display_and_scopes() {
        let symbols = SymbolTable::new();
        let condition = parse_expression_in("x", &symbols, ScopeId::GLOBAL).expect("parse failed");
        let statement = Statement::Block {
            scope: ScopeId(3),
            body: vec![Statement::If {
                scope: ScopeId(4),
                condition: Box::new(Statement::expression(condition)),
                body: vec![Statement::Return {
                    value: None,
                    location: loc(),
                }],
                else_body: Some(vec![Statement::empty(loc())]),
                location: loc(),
            }],
            location: loc(),
        };
        assert_eq!(statement.scope(), Some(ScopeId(3)));
        assert_eq!(
            statement.display(&symbols).to_string(),
            "{\n  if (x) {\n    return;\n  } else {\n    ;\n  }\n}"
        );
    }

    #[test]
    fn test_exprs_mut_skips_nested_statements() {
        let mut statement = Statement::While {
            scope: ScopeId::GLOBAL,
            condition: Box::new(Statement::expression(Expr::primitive(Primitive::Bool(true), loc()))),
            body: vec![],
            is_do_while: true,
            location: loc(),
        };
        assert!(statement.exprs_mut().is_empty());

        let mut statement = Statement::Return {
            value: Some(Expr::empty(loc())),
            location: loc(),
        };
        assert_eq!(statement.exprs_mut().len(), 1);
    }
}
