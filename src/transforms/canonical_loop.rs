//! Recognition of canonical `for` loops.
//!
//! OKL loop transforms only accept loops of the shape
//!
//! ```text
//! for (T it = init; it OP bound; it UPDATE)
//! ```
//!
//! where `T` is `char`, `short`, `int` or `long`, `OP` is one of
//! `< <= >= >` (the iterator may sit on either side) and `UPDATE` is `++`,
//! `--`, `+= step` or `-= step`.

use crate::ast::expr::Expr;
use crate::ast::primitive::Primitive;
use crate::ast::statement::{ForStatement, Statement};
use crate::diagnostics::{Diagnostics, Located, SourceLocation};
use crate::parser::operators::{self, OpType, Operator};
use crate::symbols::{SymbolTable, VarId};
use log::debug;
use thiserror::Error;

/// Which part of the loop header is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopShape {
    #[error("Expected a declaration statement")]
    NotADeclaration,
    #[error("Can only have 1 iterator variable")]
    MultipleIterators,
    #[error("Expected iterator to be initialized")]
    Uninitialized,
    #[error("Iterator variable needs to be of type [char, short, int, long]")]
    IteratorType,
    #[error("Expected comparing iterator variable with [<, <=, >=, >]")]
    Check,
    #[error("Expected update iterator variable with [++, --, +=, -=]")]
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{context}] {shape}")]
pub struct LoopShapeError {
    pub shape: LoopShape,
    /// Who asked, e.g. `@tile`
    pub context: String,
    pub location: SourceLocation,
}

impl LoopShapeError {
    fn new(shape: LoopShape, context: &str, location: SourceLocation) -> Self {
        LoopShapeError {
            shape,
            context: context.to_string(),
            location,
        }
    }
}

impl Located for LoopShapeError {
    fn location(&self) -> SourceLocation {
        self.location
    }
}

/// Facts extracted from a canonical loop header
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLoop {
    pub iterator: VarId,
    pub init_value: Expr,
    pub check_op: &'static Operator,
    pub check_value: Expr,
    /// `it < bound` rather than `bound > it`
    pub check_value_on_right: bool,
    pub check_is_inclusive: bool,
    pub update_op: &'static Operator,
    /// Step of `+=`/`-=` updates
    pub update_value: Option<Expr>,
    pub positive_update: bool,
    pub location: SourceLocation,
}

impl CanonicalLoop {
    /// Validates the header of `for_loop` without reporting anything.
    pub fn recognize(
        for_loop: &ForStatement,
        symbols: &SymbolTable,
        context: &str,
    ) -> Result<Self, LoopShapeError> {
        let error = |shape, location| LoopShapeError::new(shape, context, location);

        // Init
        let Statement::Declaration {
            declarations,
            location,
        } = for_loop.init.as_ref()
        else {
            return Err(error(LoopShape::NotADeclaration, for_loop.init.location()));
        };
        if let Some(extra) = declarations.get(1) {
            let location = symbols.variable(extra.variable).location;
            return Err(error(LoopShape::MultipleIterators, location));
        }
        let Some(decl) = declarations.first() else {
            return Err(error(LoopShape::NotADeclaration, *location));
        };

        let iterator = decl.variable;
        let variable = symbols.variable(iterator);
        let is_integer = symbols.type_def(variable.vartype.base).kind.is_integer();
        if !is_integer || variable.vartype.pointer_depth > 0 {
            return Err(error(LoopShape::IteratorType, variable.location));
        }
        let Some(init_value) = decl.value.clone() else {
            return Err(error(LoopShape::Uninitialized, *location));
        };

        let is_iterator = |expr: &Expr| matches!(expr, Expr::Variable { id, .. } if *id == iterator);

        // Check
        let Statement::Expression { expr: check, .. } = for_loop.check.as_ref() else {
            return Err(error(LoopShape::Check, for_loop.check.location()));
        };
        let Expr::Binary {
            op: check_op,
            left,
            right,
            ..
        } = check
        else {
            return Err(error(LoopShape::Check, check.location()));
        };
        let ordering = OpType::LESS_THAN
            | OpType::LESS_THAN_EQ
            | OpType::GREATER_THAN_EQ
            | OpType::GREATER_THAN;
        if !check_op.is(ordering) {
            return Err(error(LoopShape::Check, check.location()));
        }
        let (check_value, check_value_on_right) = if is_iterator(left) {
            (right.as_ref().clone(), true)
        } else if is_iterator(right) {
            (left.as_ref().clone(), false)
        } else {
            return Err(error(LoopShape::Check, check.location()));
        };

        // Update
        let Statement::Expression { expr: update, .. } = for_loop.update.as_ref() else {
            return Err(error(LoopShape::Update, for_loop.update.location()));
        };
        let (update_op, update_value, positive_update) = match update {
            Expr::LeftUnary { op, value, .. } | Expr::RightUnary { op, value, .. }
                if op.is(OpType::INCREMENT | OpType::DECREMENT) && is_iterator(value) =>
            {
                (*op, None, op.is(OpType::INCREMENT))
            }
            Expr::Binary {
                op, left, right, ..
            } if op.is(OpType::ADD_EQ | OpType::SUB_EQ) && is_iterator(left) => {
                (*op, Some(right.as_ref().clone()), op.is(OpType::ADD_EQ))
            }
            _ => return Err(error(LoopShape::Update, update.start_node().location())),
        };

        Ok(CanonicalLoop {
            iterator,
            init_value,
            check_op: *check_op,
            check_value,
            check_value_on_right,
            check_is_inclusive: check_op.is(OpType::LESS_THAN_EQ | OpType::GREATER_THAN_EQ),
            update_op,
            update_value,
            positive_update,
            location: for_loop.location,
        })
    }

    /// Like [`CanonicalLoop::recognize`], reporting a rejected loop to
    /// `diagnostics`.
    pub fn check(
        for_loop: &ForStatement,
        symbols: &SymbolTable,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Self> {
        match Self::recognize(for_loop, symbols, context) {
            Ok(canonical) => Some(canonical),
            Err(err) => {
                debug!("rejected loop at {}: {}", err.location, err);
                diagnostics.report(&err);
                None
            }
        }
    }

    pub fn is_valid(for_loop: &ForStatement, symbols: &SymbolTable) -> bool {
        Self::recognize(for_loop, symbols, "").is_ok()
    }

    fn one(&self) -> Expr {
        Expr::primitive(Primitive::Int(1), self.location)
    }

    /// Number of iterations as an expression:
    /// `bound - init` (`init - bound` when counting down), plus one when the
    /// bound is inclusive, divided by the step rounding up.
    pub fn iteration_count(&self) -> Expr {
        let init = self.init_value.wrap_in_parentheses();
        let bound = self.check_value.wrap_in_parentheses();

        let mut count = if self.positive_update {
            Expr::binary(&operators::SUB, bound, init)
        } else {
            Expr::binary(&operators::SUB, init, bound)
        };
        if self.check_is_inclusive {
            count = Expr::binary(&operators::ADD, count, self.one());
        }

        if let Some(step) = &self.update_value {
            let step = step.wrap_in_parentheses();
            let rounded = Expr::binary(
                &operators::SUB,
                Expr::binary(&operators::ADD, count, step.clone()),
                self.one(),
            );
            count = Expr::binary(&operators::DIV, Expr::parentheses(rounded), step);
        }
        count
    }

    /// Iterator value at block offset `magic`: `init ± magic`, or
    /// `init ± (step * magic)` for compound steps.
    pub fn declaration_value(&self, magic: &Expr) -> Expr {
        let mut offset = magic.wrap_in_parentheses();
        if let Some(step) = &self.update_value {
            offset = Expr::parentheses(Expr::binary(
                &operators::MULT,
                step.wrap_in_parentheses(),
                offset,
            ));
        }

        let op = if self.positive_update {
            &operators::ADD
        } else {
            &operators::SUB
        };
        Expr::binary(op, self.init_value.wrap_in_parentheses(), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression_in;
    use crate::symbols::{ScopeId, TypeId, Vartype};

    struct Header<'a> {
        iter_type: TypeId,
        init: Option<&'a str>,
        check: &'a str,
        update: &'a str,
    }

    fn header<'a>(init: &'a str, check: &'a str, update: &'a str) -> Header<'a> {
        Header {
            iter_type: TypeId::INT,
            init: Some(init),
            check,
            update,
        }
    }

    fn build(symbols: &mut SymbolTable, header: Header) -> ForStatement {
        symbols.declare_variable(ScopeId::GLOBAL, "N", Vartype::new(TypeId::INT));
        let scope = symbols.new_scope(ScopeId::GLOBAL);
        let i = symbols.declare_variable(scope, "i", Vartype::new(header.iter_type));
        let symbols: &SymbolTable = symbols;
        let parse = |source: &str| parse_expression_in(source, symbols, scope).unwrap();

        ForStatement::new(
            scope,
            Statement::declaration(i, header.init.map(&parse), SourceLocation::default()),
            Statement::expression(parse(header.check)),
            Statement::expression(parse(header.update)),
            SourceLocation::default(),
        )
    }

    fn recognize(header: Header) -> (SymbolTable, Result<CanonicalLoop, LoopShapeError>) {
        let mut symbols = SymbolTable::new();
        let for_loop = build(&mut symbols, header);
        let result = CanonicalLoop::recognize(&for_loop, &symbols, "@tile");
        (symbols, result)
    }

    #[test]
    fn test_recognizes_simple_loop() {
        let (symbols, result) = recognize(header("0", "i < N", "++i"));
        let canonical = result.unwrap();

        assert_eq!(symbols.variable(canonical.iterator).name, "i");
        assert!(canonical.check_value_on_right);
        assert!(!canonical.check_is_inclusive);
        assert!(canonical.positive_update);
        assert!(canonical.update_value.is_none());
        assert_eq!(canonical.iteration_count().display(&symbols).to_string(), "N - 0");
    }

    #[test]
    fn test_iterator_on_the_right() {
        let (symbols, result) = recognize(header("N", "0 <= i", "i -= 2"));
        let canonical = result.unwrap();

        assert!(!canonical.check_value_on_right);
        assert!(canonical.check_is_inclusive);
        assert!(!canonical.positive_update);
        assert_eq!(
            canonical.iteration_count().display(&symbols).to_string(),
            "(N - 0 + 1 + 2 - 1) / 2"
        );
    }

    #[test]
    fn test_declaration_value() {
        let (mut symbols, result) = recognize(header("1", "i < N", "i += 4"));
        let canonical = result.unwrap();
        let b = symbols.declare_variable(ScopeId::GLOBAL, "b", Vartype::new(TypeId::INT));
        let magic = Expr::variable(b, SourceLocation::default());

        assert_eq!(
            canonical.declaration_value(&magic).display(&symbols).to_string(),
            "1 + (4 * b)"
        );

        let (symbols, result) = recognize(header("N", "i > 0", "i--"));
        let canonical = result.unwrap();
        let magic = parse_expression_in("x + y", &symbols, ScopeId::GLOBAL).unwrap();
        assert_eq!(
            canonical.declaration_value(&magic).display(&symbols).to_string(),
            "N - (x + y)"
        );
    }

    #[test]
    fn test_shape_errors() {
        let message = |header| recognize(header).1.unwrap_err().to_string();

        assert_eq!(
            message(Header {
                iter_type: TypeId::FLOAT,
                ..header("0", "i < N", "++i")
            }),
            "[@tile] Iterator variable needs to be of type [char, short, int, long]"
        );
        assert_eq!(
            message(Header {
                init: None,
                ..header("0", "i < N", "++i")
            }),
            "[@tile] Expected iterator to be initialized"
        );
        assert_eq!(
            message(header("0", "i != N", "++i")),
            "[@tile] Expected comparing iterator variable with [<, <=, >=, >]"
        );
        assert_eq!(
            message(header("0", "N < 10", "++i")),
            "[@tile] Expected comparing iterator variable with [<, <=, >=, >]"
        );
        assert_eq!(
            message(header("0", "i < N", "i *= 2")),
            "[@tile] Expected update iterator variable with [++, --, +=, -=]"
        );
        assert_eq!(
            message(header("0", "i < N", "N += i")),
            "[@tile] Expected update iterator variable with [++, --, +=, -=]"
        );
    }

    #[test]
    fn test_init_must_be_a_single_declaration() {
        let mut symbols = SymbolTable::new();
        let mut for_loop = build(&mut symbols, header("0", "i < N", "++i"));
        let j = symbols.declare_variable(for_loop.scope, "j", Vartype::new(TypeId::INT));

        if let Statement::Declaration { declarations, .. } = for_loop.init.as_mut() {
            declarations.push(crate::ast::statement::VariableDeclaration {
                variable: j,
                value: None,
            });
        }
        let err = CanonicalLoop::recognize(&for_loop, &symbols, "@tile").unwrap_err();
        assert_eq!(err.shape, LoopShape::MultipleIterators);

        for_loop.init = Box::new(Statement::empty(SourceLocation::new(3, 7)));
        let mut diagnostics = Diagnostics::new();
        assert!(CanonicalLoop::check(&for_loop, &symbols, "@tile", &mut diagnostics).is_none());
        assert_eq!(diagnostics.entries().len(), 1);
        assert_eq!(diagnostics.entries()[0].location, SourceLocation::new(3, 7));
        assert_eq!(
            diagnostics.entries()[0].message,
            "[@tile] Expected a declaration statement"
        );
        assert!(!CanonicalLoop::is_valid(&for_loop, &symbols));
    }
}
