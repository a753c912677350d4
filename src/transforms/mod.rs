//! Statement and expression rewriting.
//!
//! A transform names the statement or node kinds it cares about and gets
//! called on each match, bottom-up: children are rewritten before their
//! parent sees them. It answers with a [`Rewrite`], and the walker does the
//! substitution so transforms never deal with traversal.
//!
//! The OKL passes built on this are [`tile::TileTransform`],
//! [`dim::DimTransform`] and the [`replacer`] helpers.

pub mod canonical_loop;
pub mod dim;
pub mod replacer;
pub mod tile;

use crate::ast::expr::{Expr, NodeType};
use crate::ast::statement::{Statement, StatementType};
use crate::diagnostics::{Located, SourceLocation};
use crate::symbols::ScopeId;
use canonical_loop::LoopShapeError;
use thiserror::Error;

/// What to do with a visited node
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite<T> {
    Keep,
    Replace(T),
    /// Drop the node: it leaves a statement list, and any other slot is
    /// emptied
    Remove,
}

pub trait StatementTransform {
    fn valid_statement_types(&self) -> StatementType;

    /// Called on every matching statement. `scope` is the scope the
    /// statement lives in.
    fn transform_statement(
        &mut self,
        statement: &mut Statement,
        scope: ScopeId,
    ) -> Result<Rewrite<Statement>, TransformError>;
}

pub trait ExprTransform {
    fn valid_expr_types(&self) -> NodeType;

    fn transform_expr(&mut self, expr: &mut Expr) -> Result<Rewrite<Expr>, TransformError>;
}

/// Transform error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    LoopShape(#[from] LoopShapeError),

    #[error("Too many dimensions, expected {expected} argument(s)")]
    TooManyDimensions {
        expected: usize,
        location: SourceLocation,
    },

    #[error("Missing dimensions, expected {expected} argument(s)")]
    MissingDimensions {
        expected: usize,
        location: SourceLocation,
    },

    #[error("@dimOrder entries must be compile-time integer constants")]
    DimOrderNotConstant { location: SourceLocation },

    #[error("@dimOrder must be a permutation of [0, {count})")]
    DimOrderNotPermutation {
        count: usize,
        location: SourceLocation,
    },

    #[error("@tile expects a tile size argument")]
    MissingTileSize { location: SourceLocation },
}

impl Located for TransformError {
    fn location(&self) -> SourceLocation {
        match self {
            TransformError::LoopShape(err) => err.location(),
            TransformError::TooManyDimensions { location, .. }
            | TransformError::MissingDimensions { location, .. }
            | TransformError::DimOrderNotConstant { location }
            | TransformError::DimOrderNotPermutation { location, .. }
            | TransformError::MissingTileSize { location } => *location,
        }
    }
}

/// Applies `transform` to `statement` and everything below it. A removed
/// root becomes an empty statement.
pub fn apply_statement_transform<T>(
    transform: &mut T,
    statement: &mut Statement,
    scope: ScopeId,
) -> Result<(), TransformError>
where
    T: StatementTransform + ?Sized,
{
    match visit_statement(transform, statement, scope)? {
        Rewrite::Keep => {}
        Rewrite::Replace(replacement) => *statement = replacement,
        Rewrite::Remove => *statement = Statement::empty(statement.location()),
    }
    Ok(())
}

/// Applies `transform` to every statement of a list; removed statements
/// leave the list.
pub fn apply_statement_list_transform<T>(
    transform: &mut T,
    statements: &mut Vec<Statement>,
    scope: ScopeId,
) -> Result<(), TransformError>
where
    T: StatementTransform + ?Sized,
{
    let mut index = 0;
    while index < statements.len() {
        match visit_statement(transform, &mut statements[index], scope)? {
            Rewrite::Keep => index += 1,
            Rewrite::Replace(replacement) => {
                statements[index] = replacement;
                index += 1;
            }
            Rewrite::Remove => {
                statements.remove(index);
            }
        }
    }
    Ok(())
}

fn visit_statement<T>(
    transform: &mut T,
    statement: &mut Statement,
    scope: ScopeId,
) -> Result<Rewrite<Statement>, TransformError>
where
    T: StatementTransform + ?Sized,
{
    let inner = statement.scope().unwrap_or(scope);
    match statement {
        Statement::Block { body, .. } => {
            apply_statement_list_transform(transform, body, inner)?;
        }
        Statement::For(for_loop) => {
            apply_statement_transform(transform, &mut for_loop.init, inner)?;
            apply_statement_transform(transform, &mut for_loop.check, inner)?;
            apply_statement_transform(transform, &mut for_loop.update, inner)?;
            apply_statement_list_transform(transform, &mut for_loop.body, inner)?;
        }
        Statement::If {
            condition,
            body,
            else_body,
            ..
        } => {
            apply_statement_transform(transform, condition, inner)?;
            apply_statement_list_transform(transform, body, inner)?;
            if let Some(else_body) = else_body {
                apply_statement_list_transform(transform, else_body, inner)?;
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            apply_statement_transform(transform, condition, inner)?;
            apply_statement_list_transform(transform, body, inner)?;
        }
        Statement::Empty { .. }
        | Statement::Expression { .. }
        | Statement::Declaration { .. }
        | Statement::Return { .. } => {}
    }

    if transform
        .valid_statement_types()
        .intersects(statement.statement_type())
    {
        transform.transform_statement(statement, scope)
    } else {
        Ok(Rewrite::Keep)
    }
}

/// Applies `transform` to `expr` and every node below it, children first.
/// A removed node becomes an empty node.
pub fn apply_expr_transform<T>(transform: &mut T, expr: &mut Expr) -> Result<(), TransformError>
where
    T: ExprTransform + ?Sized,
{
    for child in expr.children_mut() {
        apply_expr_transform(transform, child)?;
    }

    if !transform.valid_expr_types().intersects(expr.node_type()) {
        return Ok(());
    }
    match transform.transform_expr(expr)? {
        Rewrite::Keep => {}
        Rewrite::Replace(replacement) => *expr = replacement,
        Rewrite::Remove => *expr = Expr::empty(expr.location()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::primitive::Primitive;
    use crate::ast::statement::ForStatement;
    use crate::parser::operators::OpType;
    use crate::parser::parse_expression;
    use crate::symbols::SymbolTable;

    fn loc() -> SourceLocation {
        SourceLocation::default()
    }

    fn expr(source: &str) -> Statement {
        Statement::expression(parse_expression(source).unwrap())
    }

    /// Folds every constant binary node
    struct Folder {
        visited: usize,
    }

    impl ExprTransform for Folder {
        fn valid_expr_types(&self) -> NodeType {
            NodeType::BINARY
        }

        fn transform_expr(&mut self, expr: &mut Expr) -> Result<Rewrite<Expr>, TransformError> {
            self.visited += 1;
            if expr.can_evaluate() {
                Ok(Rewrite::Replace(Expr::primitive(expr.evaluate(), expr.location())))
            } else {
                Ok(Rewrite::Keep)
            }
        }
    }

    /// Drops `return` statements and records the scopes it saw
    struct DropReturns {
        scopes: Vec<ScopeId>,
    }

    impl StatementTransform for DropReturns {
        fn valid_statement_types(&self) -> StatementType {
            StatementType::RETURN | StatementType::EXPRESSION
        }

        fn transform_statement(
            &mut self,
            statement: &mut Statement,
            scope: ScopeId,
        ) -> Result<Rewrite<Statement>, TransformError> {
            self.scopes.push(scope);
            match statement {
                Statement::Return { .. } => Ok(Rewrite::Remove),
                _ => Ok(Rewrite::Keep),
            }
        }
    }

    #[test]
    fn test_expr_walk_is_bottom_up() {
        let mut folder = Folder { visited: 0 };
        let mut tree = parse_expression("f(1 + 2 * 3, x + 1)").unwrap();
        apply_expr_transform(&mut folder, &mut tree).unwrap();

        assert_eq!(folder.visited, 3);
        assert_eq!(tree.display(&SymbolTable::new()).to_string(), "f(7, x + 1)");

        let mut tree = parse_expression("2 * (3 + 4)").unwrap();
        apply_expr_transform(&mut folder, &mut tree).unwrap();
        assert_eq!(tree, Expr::primitive(Primitive::Int(14), tree.location()));
    }

    #[test]
    fn test_statement_removal_and_scopes() {
        let mut symbols = SymbolTable::new();
        let loop_scope = symbols.new_scope(ScopeId::GLOBAL);
        let mut for_loop = ForStatement::new(
            loop_scope,
            Statement::empty(loc()),
            expr("i < 4"),
            Statement::Return {
                value: None,
                location: loc(),
            },
            loc(),
        );
        for_loop.body = vec![
            Statement::Return {
                value: None,
                location: loc(),
            },
            expr("a"),
        ];
        let mut statement = Statement::Block {
            scope: ScopeId::GLOBAL,
            body: vec![Statement::For(for_loop)],
            location: loc(),
        };

        let mut dropper = DropReturns { scopes: Vec::new() };
        apply_statement_transform(&mut dropper, &mut statement, ScopeId::GLOBAL).unwrap();

        let Statement::Block { body, .. } = &statement else {
            panic!("expected a block");
        };
        let Statement::For(for_loop) = &body[0] else {
            panic!("expected a for loop");
        };
        assert!(for_loop.update.is_empty());
        assert_eq!(for_loop.body.len(), 1);
        assert!(dropper.scopes.iter().all(|scope| *scope == loop_scope));
        assert_eq!(dropper.scopes.len(), 4);
    }

    #[test]
    fn test_errors_stop_the_walk() {
        struct Fail;
        impl ExprTransform for Fail {
            fn valid_expr_types(&self) -> NodeType {
                NodeType::LEFT_UNARY
            }
            fn transform_expr(&mut self, expr: &mut Expr) -> Result<Rewrite<Expr>, TransformError> {
                Err(TransformError::MissingTileSize {
                    location: expr.location(),
                })
            }
        }

        let mut tree = parse_expression("a + -b").unwrap();
        let before = tree.clone();
        let err = apply_expr_transform(&mut Fail, &mut tree).unwrap_err();
        assert_eq!(err.to_string(), "@tile expects a tile size argument");
        assert_eq!(tree, before);
        assert!(tree.is_op(OpType::ADD));
    }
}
