//! `@tile(size, @blockAttrs, @innerAttrs, check=bool)` loop tiling.
//!
//! ```text
//! for (int i = 0; i < N; ++i; @tile(16)) { body }
//! ```
//!
//! becomes
//!
//! ```text
//! for (int _occa_tiled_i = 0; _occa_tiled_i < N; _occa_tiled_i += 16) {
//!   for (int i = _occa_tiled_i; i < (_occa_tiled_i + 16); ++i) {
//!     if (i < N) { body }
//!   }
//! }
//! ```
//!
//! With a compound step `i += S` the block extent is `(16 * (S))`, used for
//! both the block update and the inner bound.

use super::canonical_loop::CanonicalLoop;
use super::replacer::replace_variables;
use super::{apply_statement_transform, Rewrite, StatementTransform, TransformError};
use crate::ast::attribute::{merge_attributes, Attribute};
use crate::ast::expr::Expr;
use crate::ast::statement::{ForStatement, Statement, StatementType};
use crate::constants::{
    DEFAULT_TILE_BOUNDS_CHECK, TILED_ITERATOR_PREFIX, TILE_ATTRIBUTE, TILE_CHECK_KWARG,
    TILE_CONTEXT,
};
use crate::diagnostics::{Diagnostics, SourceLocation};
use crate::parser::operators;
use crate::symbols::{ScopeId, Symbol, SymbolTable, VarId};
use log::debug;
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileOptions {
    /// Prepended to the iterator name to name the block iterator
    pub iterator_prefix: String,
    /// Guard the inner body when `@tile` has no `check` kwarg
    pub default_bounds_check: bool,
    /// Push loop-shape problems to the diagnostics sink
    pub report_loop_errors: bool,
}

impl Default for TileOptions {
    fn default() -> Self {
        TileOptions {
            iterator_prefix: TILED_ITERATOR_PREFIX.to_string(),
            default_bounds_check: DEFAULT_TILE_BOUNDS_CHECK,
            report_loop_errors: true,
        }
    }
}

/// Splits every `@tile` loop into a block loop and an inner loop
pub struct TileTransform<'a> {
    symbols: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    options: TileOptions,
}

impl<'a> TileTransform<'a> {
    pub fn new(symbols: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        TileTransform {
            symbols,
            diagnostics,
            options: TileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TileOptions) -> Self {
        self.options = options;
        self
    }

    /// Tiles every `@tile` loop in `statement`, innermost first
    pub fn apply(&mut self, statement: &mut Statement, scope: ScopeId) -> Result<(), TransformError> {
        apply_statement_transform(self, statement, scope)
    }

    fn bounds_check(&self, attr: &Attribute) -> bool {
        attr.kwargs
            .get(TILE_CHECK_KWARG)
            .and_then(|arg| arg.value.evaluate().as_bool())
            .unwrap_or(self.options.default_bounds_check)
    }

    fn tile(
        &mut self,
        for_loop: &mut ForStatement,
        attr: &Attribute,
        tile_size: &Expr,
        canonical: &CanonicalLoop,
        scope: ScopeId,
    ) -> Result<ForStatement, TransformError> {
        let iterator = canonical.iterator;
        let (block_iter, block_scope) = self.declare_block_iterator(for_loop, iterator, scope);

        // (tile * (step)) for compound steps, tile otherwise
        let tile_size = tile_size.wrap_in_parentheses();
        let extent = match &canonical.update_value {
            Some(step) => Expr::parentheses(Expr::binary(
                &operators::MULT,
                tile_size,
                Expr::parentheses(step.clone()),
            )),
            None => tile_size,
        };

        // Block loop: original init/check moved onto the block iterator
        let mut block_init = for_loop.init.as_ref().clone();
        let mut block_check = for_loop.check.as_ref().clone();
        replace_variables(&mut block_init, iterator, block_iter)?;
        replace_variables(&mut block_check, iterator, block_iter)?;

        let update_location = for_loop.update.location();
        let update_op = if canonical.positive_update {
            &operators::ADD_EQ
        } else {
            &operators::SUB_EQ
        };
        let block_update = Statement::expression(Expr::binary(
            update_op,
            Expr::variable(block_iter, update_location),
            extent.clone(),
        ));

        let mut block = ForStatement::new(
            block_scope,
            block_init,
            block_check,
            block_update,
            for_loop.location,
        );
        if let Some(arg) = attr.args.get(1) {
            merge_attributes(&mut block.attributes, &arg.attributes);
        }

        // Inner loop: iterator starts at the block iterator and covers one extent
        let init_location = for_loop.init.location();
        let inner_init = Statement::declaration(
            iterator,
            Some(Expr::variable(block_iter, init_location)),
            init_location,
        );

        let check_location = for_loop.check.location();
        let extent_op = if canonical.positive_update {
            &operators::ADD
        } else {
            &operators::SUB
        };
        let block_end = Expr::parentheses(Expr::binary(
            extent_op,
            Expr::variable(block_iter, check_location),
            extent,
        ));
        let inner_check = Statement::expression(self.compare(canonical, block_end, check_location));

        let inner_update = mem::replace(
            for_loop.update.as_mut(),
            Statement::empty(update_location),
        );

        let mut inner = ForStatement::new(
            for_loop.scope,
            inner_init,
            inner_check,
            inner_update,
            for_loop.location,
        );
        inner.attributes = mem::take(&mut for_loop.attributes);
        inner.attributes.remove(TILE_ATTRIBUTE);
        if let Some(arg) = attr.args.get(2) {
            merge_attributes(&mut inner.attributes, &arg.attributes);
        }

        inner.body = mem::take(&mut for_loop.body);
        if self.bounds_check(attr) {
            inner.body = vec![self.guard(canonical, inner.scope, inner.body, check_location)];
        }

        block.body.push(Statement::For(inner));
        Ok(block)
    }

    /// Clones the iterator as the block iterator, declared in a new scope
    /// wrapping the loop's own scope
    fn declare_block_iterator(
        &mut self,
        for_loop: &ForStatement,
        iterator: VarId,
        scope: ScopeId,
    ) -> (VarId, ScopeId) {
        let name = format!(
            "{}{}",
            self.options.iterator_prefix,
            self.symbols.variable(iterator).name
        );
        let block_iter = self.symbols.clone_variable(iterator, &name);

        let outer = self.symbols.parent(for_loop.scope).unwrap_or(scope);
        let block_scope = self.symbols.new_scope(outer);
        self.symbols.declare(block_scope, &name, Symbol::Variable(block_iter));
        self.symbols.set_parent(for_loop.scope, Some(block_scope));
        (block_iter, block_scope)
    }

    /// `iterator OP bound`, keeping the side the iterator had in the loop check
    fn compare(
        &self,
        canonical: &CanonicalLoop,
        bound: Expr,
        location: SourceLocation,
    ) -> Expr {
        let iterator = Expr::variable(canonical.iterator, location);
        if canonical.check_value_on_right {
            Expr::binary(canonical.check_op, iterator, bound)
        } else {
            Expr::binary(canonical.check_op, bound, iterator)
        }
    }

    /// `if (iterator OP original_bound) { body }` in its own scope
    fn guard(
        &mut self,
        canonical: &CanonicalLoop,
        parent: ScopeId,
        body: Vec<Statement>,
        location: SourceLocation,
    ) -> Statement {
        let if_scope = self.symbols.new_scope(parent);
        for statement in &body {
            if let Some(child) = statement.scope() {
                self.symbols.set_parent(child, Some(if_scope));
            }
        }

        let condition = self.compare(canonical, canonical.check_value.clone(), location);
        Statement::If {
            scope: if_scope,
            condition: Box::new(Statement::expression(condition)),
            body,
            else_body: None,
            location,
        }
    }
}

impl StatementTransform for TileTransform<'_> {
    fn valid_statement_types(&self) -> StatementType {
        StatementType::FOR
    }

    fn transform_statement(
        &mut self,
        statement: &mut Statement,
        scope: ScopeId,
    ) -> Result<Rewrite<Statement>, TransformError> {
        let Statement::For(for_loop) = statement else {
            return Ok(Rewrite::Keep);
        };
        let Some(attr) = for_loop.attributes.get(TILE_ATTRIBUTE).cloned() else {
            return Ok(Rewrite::Keep);
        };

        let Some(tile_size) = attr.arg(0).filter(|size| !size.is_empty()).cloned() else {
            let err = TransformError::MissingTileSize {
                location: attr.location,
            };
            self.diagnostics.report(&err);
            return Err(err);
        };

        let canonical = match CanonicalLoop::recognize(for_loop, &*self.symbols, TILE_CONTEXT) {
            Ok(canonical) => canonical,
            Err(err) => {
                debug!("not tiling loop at {}: {}", for_loop.location, err);
                if self.options.report_loop_errors {
                    self.diagnostics.report(&err);
                }
                return Err(err.into());
            }
        };

        let block = self.tile(for_loop, &attr, &tile_size, &canonical, scope)?;
        debug!(
            "tiled loop over '{}' at {}",
            self.symbols.variable(canonical.iterator).name,
            block.location
        );
        Ok(Rewrite::Replace(Statement::For(block)))
    }
}

/// Applies [`TileTransform`] with default options
pub fn apply_tile_transforms(
    statement: &mut Statement,
    scope: ScopeId,
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
) -> Result<(), TransformError> {
    TileTransform::new(symbols, diagnostics).apply(statement, scope)
}
