//! Constant folding over expression trees.
//!
//! Folding is purely structural: `++x` folds to `x + 1` and `x++` to `x`
//! without storing anything, since only literals can be folded. Member
//! access, scope resolution, dereference and address-of never fold.

use crate::ast::expr::Expr;
use crate::ast::primitive::Primitive;
use crate::parser::operators::OpType;

impl Expr {
    /// Whether [`Expr::evaluate`] produces a value for this subtree
    pub fn can_evaluate(&self) -> bool {
        match self {
            Expr::Primitive { .. } => true,
            Expr::Parentheses { value, .. } => value.can_evaluate(),
            Expr::LeftUnary { op, value, .. } | Expr::RightUnary { op, value, .. } => {
                op.can_evaluate() && value.can_evaluate()
            }
            Expr::Binary {
                op, left, right, ..
            } => op.can_evaluate() && left.can_evaluate() && right.can_evaluate(),
            Expr::Ternary {
                check,
                on_true,
                on_false,
                ..
            } => check.can_evaluate() && on_true.can_evaluate() && on_false.can_evaluate(),
            Expr::Sizeof { value, .. } => value.can_evaluate(),
            _ => false,
        }
    }

    /// Folds the subtree, or [`Primitive::Undefined`] when it cannot be
    pub fn evaluate(&self) -> Primitive {
        if !self.can_evaluate() {
            return Primitive::Undefined;
        }

        match self {
            Expr::Primitive { value, .. } => *value,
            Expr::Parentheses { value, .. } => value.evaluate(),
            Expr::LeftUnary { op, value, .. } | Expr::RightUnary { op, value, .. } => {
                op.evaluate_unary(value.evaluate())
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                // Only the taken side of a short-circuit needs a value
                let lhs = left.evaluate();
                if op.is(OpType::AND) && lhs.as_bool() == Some(false) {
                    return Primitive::Bool(false);
                }
                if op.is(OpType::OR) && lhs.as_bool() == Some(true) {
                    return Primitive::Bool(true);
                }
                op.evaluate_binary(lhs, right.evaluate())
            }
            Expr::Ternary {
                check,
                on_true,
                on_false,
                ..
            } => match check.evaluate().as_bool() {
                Some(true) => on_true.evaluate(),
                Some(false) => on_false.evaluate(),
                None => Primitive::Undefined,
            },
            Expr::Sizeof { value, .. } => match value.evaluate().size_of() {
                Some(size) => Primitive::Long(size as i64),
                None => Primitive::Undefined,
            },
            _ => Primitive::Undefined,
        }
    }
}
