//! `@dim` array flattening.
//!
//! A variable declared with `@dim(X, Y)` can be indexed like a function,
//! `A(i, j)`, and is rewritten to a flat subscript `A[i + (X * j)]`.
//! `@dimOrder(1, 0)` permutes the axes before folding.

use super::{
    apply_expr_transform, apply_statement_transform, ExprTransform, Rewrite, StatementTransform,
    TransformError,
};
use crate::ast::attribute::Attribute;
use crate::ast::expr::{Expr, NodeType};
use crate::ast::statement::{Statement, StatementType};
use crate::constants::{DIM_ATTRIBUTE, DIM_ORDER_ATTRIBUTE};
use crate::diagnostics::Diagnostics;
use crate::parser::operators;
use crate::symbols::{ScopeId, SymbolTable};
use log::debug;

pub struct DimTransform<'a> {
    symbols: &'a SymbolTable,
    diagnostics: &'a mut Diagnostics,
    /// Scope rebuilt indices are resolved against
    scope: ScopeId,
}

impl<'a> DimTransform<'a> {
    pub fn new(symbols: &'a SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        DimTransform {
            symbols,
            diagnostics,
            scope: ScopeId::GLOBAL,
        }
    }

    pub fn apply(&mut self, statement: &mut Statement, scope: ScopeId) -> Result<(), TransformError> {
        apply_statement_transform(self, statement, scope)
    }

    /// Flattens the calls in a single expression. `expr` is only updated
    /// when every call in it was flattened.
    pub fn apply_to_expr(&mut self, expr: &mut Expr, scope: ScopeId) -> Result<(), TransformError> {
        self.scope = scope;
        let mut rewritten = expr.clone();
        apply_expr_transform(self, &mut rewritten)?;
        *expr = rewritten;
        Ok(())
    }

    fn fail(&mut self, err: TransformError) -> TransformError {
        self.diagnostics.report(&err);
        err
    }

    /// Axis order from `@dimOrder`, checked against the `@dim` count
    fn dim_order(&mut self, dim_count: usize, attr: &Attribute) -> Result<Vec<usize>, TransformError> {
        if attr.args.len() > dim_count {
            return Err(self.fail(TransformError::TooManyDimensions {
                expected: dim_count,
                location: attr.location,
            }));
        }
        if attr.args.len() < dim_count {
            return Err(self.fail(TransformError::MissingDimensions {
                expected: dim_count,
                location: attr.location,
            }));
        }

        let mut order = Vec::with_capacity(dim_count);
        let mut seen = vec![false; dim_count];
        for arg in &attr.args {
            let Some(axis) = arg.value.evaluate().as_i64() else {
                return Err(self.fail(TransformError::DimOrderNotConstant {
                    location: arg.value.location(),
                }));
            };
            let axis = match usize::try_from(axis) {
                Ok(axis) if axis < dim_count && !seen[axis] => axis,
                _ => {
                    return Err(self.fail(TransformError::DimOrderNotPermutation {
                        count: dim_count,
                        location: attr.location,
                    }));
                }
            };
            seen[axis] = true;
            order.push(axis);
        }
        Ok(order)
    }
}

impl StatementTransform for DimTransform<'_> {
    fn valid_statement_types(&self) -> StatementType {
        StatementType::EXPRESSION | StatementType::DECLARATION
    }

    fn transform_statement(
        &mut self,
        statement: &mut Statement,
        scope: ScopeId,
    ) -> Result<Rewrite<Statement>, TransformError> {
        self.scope = scope;

        // All initializers or none
        let mut rewritten: Vec<Expr> = statement.exprs().into_iter().cloned().collect();
        for expr in &mut rewritten {
            apply_expr_transform(self, expr)?;
        }
        for (slot, expr) in statement.exprs_mut().into_iter().zip(rewritten) {
            *slot = expr;
        }
        Ok(Rewrite::Keep)
    }
}

impl ExprTransform for DimTransform<'_> {
    fn valid_expr_types(&self) -> NodeType {
        NodeType::CALL
    }

    fn transform_expr(&mut self, expr: &mut Expr) -> Result<Rewrite<Expr>, TransformError> {
        let Expr::Call {
            value,
            args,
            location,
        } = expr
        else {
            return Ok(Rewrite::Keep);
        };
        let Expr::Variable { id, .. } = value.as_ref() else {
            return Ok(Rewrite::Keep);
        };

        let symbols = self.symbols;
        let variable = symbols.variable(*id);
        let Some(dim) = variable.attributes.get(DIM_ATTRIBUTE) else {
            return Ok(Rewrite::Keep);
        };

        let dim_count = dim.args.len();
        if let Some(extra) = args.get(dim_count) {
            return Err(self.fail(TransformError::TooManyDimensions {
                expected: dim_count,
                location: extra.location(),
            }));
        }
        if args.len() < dim_count {
            return Err(self.fail(TransformError::MissingDimensions {
                expected: dim_count,
                location: value.location(),
            }));
        }
        if dim_count == 0 {
            return Ok(Rewrite::Keep);
        }

        let order = match variable.attributes.get(DIM_ORDER_ATTRIBUTE) {
            Some(attr) => self.dim_order(dim_count, attr)?,
            None => (0..dim_count).collect(),
        };

        // Horner, last ordered axis innermost: arg + (dim * index)
        let mut index = args[order[dim_count - 1]].clone();
        for &axis in order[..dim_count - 1].iter().rev() {
            let scaled = Expr::parentheses(Expr::binary(
                &operators::MULT,
                dim.args[axis].value.wrap_in_parentheses(),
                index.wrap_in_parentheses(),
            ));
            index = Expr::binary(&operators::ADD, args[axis].wrap_in_parentheses(), scaled);
        }

        let mut flattened = Expr::Subscript {
            value: value.clone(),
            index: Box::new(index),
            location: *location,
        };
        symbols.resolve_identifiers(&mut flattened, self.scope);
        debug!("flattened call to '{}' at {}", variable.name, location);
        Ok(Rewrite::Replace(flattened))
    }
}

/// Applies [`DimTransform`] to `statement` and everything below it
pub fn apply_dim_transforms(
    statement: &mut Statement,
    scope: ScopeId,
    symbols: &SymbolTable,
    diagnostics: &mut Diagnostics,
) -> Result<(), TransformError> {
    DimTransform::new(symbols, diagnostics).apply(statement, scope)
}
