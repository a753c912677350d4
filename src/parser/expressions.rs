//! Expression building
//!
//! Turns a token sequence into an [`Expr`] tree with a Shunting-Yard pass
//! over an output stack and an operator stack.
//!
//! # Operator resolution
//!
//! Lexemes such as `+`, `*`, `&`, `++` and `::` arrive unresolved. Each one
//! is settled from its neighbours when it is reached: after nothing, an
//! opening bracket, a cast or another prefix/binary operator it is
//! left-unary; otherwise it is binary (or postfix for `++`/`--`). Chains of
//! increments such as `x ++ ++ ++ y` have no single reading and are
//! rejected.
//!
//! # Pairs
//!
//! Opening brackets sit on the operator stack as barriers and remember the
//! output stack height, below which nothing inside them may take operands.
//! When the matching closer arrives the bracket content is folded into a
//! temporary pair node,
//! which is then classified by the token before the opener:
//!
//! - after a value or a closing bracket: call `f(a, b)`, function-style
//!   cast `int(x)`, subscript `a[i]`, kernel launch `k<<<b, t>>>` or a
//!   brace initializer;
//! - otherwise: C-style cast `(T) x`, parentheses `(x)` or tuple `{a, b}`.
//!
//! # Ternaries
//!
//! `?` and `:` are left-unary markers sharing one precedence level. Once a
//! `:` marker is applied, a `check`, `? on_true`, `: on_false` run on the
//! output stack folds into a ternary node. A new `?` leaves pending markers
//! on the stack and a `:` reduces only back to its own `?`, so chains group
//! to the right as in C.

use super::operators::{self, associativity, Associativity, OpType, Operator};
use super::token::{Token, TokenKind};
use crate::ast::expr::{CastKind, Expr};
use crate::diagnostics::{Located, SourceLocation};
use crate::symbols::Vartype;
use log::trace;
use std::fmt;
use thiserror::Error;

/// Which half of a bracket pair could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Opening,
    Closing,
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairSide::Opening => write!(f, "an opening"),
            PairSide::Closing => write!(f, "a closing"),
        }
    }
}

/// Expression building error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Ambiguous operator")]
    AmbiguousOperator { location: SourceLocation },

    #[error("Could not find {side} '{expected}'")]
    MismatchedPair {
        side: PairSide,
        expected: &'static str,
        location: SourceLocation,
    },

    #[error("Unable to apply operator")]
    MissingOperand { location: SourceLocation },

    #[error("'{keyword}' not supported yet")]
    Unsupported {
        keyword: &'static str,
        location: SourceLocation,
    },

    #[error("Unable to form an expression")]
    Malformed { location: SourceLocation },

    #[error("Expected identifier or proper expression before")]
    ExpectedExpression { location: SourceLocation },

    #[error("Must also have threads per block as the second argument")]
    MissingThreadCount { location: SourceLocation },

    #[error("Kernel call only takes 2 arguments")]
    TooManyKernelArguments { location: SourceLocation },
}

impl ExprError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ExprError::AmbiguousOperator { location }
            | ExprError::MismatchedPair { location, .. }
            | ExprError::MissingOperand { location }
            | ExprError::Unsupported { location, .. }
            | ExprError::Malformed { location }
            | ExprError::ExpectedExpression { location }
            | ExprError::MissingThreadCount { location }
            | ExprError::TooManyKernelArguments { location } => *location,
        }
    }
}

impl Located for ExprError {
    fn location(&self) -> SourceLocation {
        ExprError::location(self)
    }
}

/// Builds one expression from `tokens`.
///
/// An empty token list gives an empty node. On error no partial tree is
/// returned.
pub fn get_expression(tokens: Vec<Token>) -> Result<Expr, ExprError> {
    if tokens.is_empty() {
        return Ok(Expr::empty(SourceLocation::default()));
    }
    ExpressionBuilder::new(tokens).build()
}

/// Entry on the operator stack
struct OperatorEntry {
    op: &'static Operator,
    location: SourceLocation,
    /// Target type of a pending C-style cast
    cast: Option<Vartype>,
    /// Token index before an opening bracket
    before_pair: Option<usize>,
    /// Output stack height when an opening bracket was pushed; operators
    /// inside the brackets cannot take operands below it
    output_base: usize,
}

impl OperatorEntry {
    fn new(op: &'static Operator, location: SourceLocation) -> Self {
        OperatorEntry {
            op,
            location,
            cast: None,
            before_pair: None,
            output_base: 0,
        }
    }
}

struct ExpressionBuilder {
    tokens: Vec<Token>,
    output: Vec<Expr>,
    operators: Vec<OperatorEntry>,
    prev: Option<usize>,
    next: Option<usize>,
    /// Index of the `)` closing the most recent C-style cast
    cast_close: Option<usize>,
}

impl ExpressionBuilder {
    fn new(tokens: Vec<Token>) -> Self {
        ExpressionBuilder {
            tokens,
            output: Vec::new(),
            operators: Vec::new(),
            prev: None,
            next: None,
            cast_close: None,
        }
    }

    fn build(mut self) -> Result<Expr, ExprError> {
        let count = self.tokens.len();
        for index in 0..count {
            self.prev = index.checked_sub(1);
            self.next = (index + 1 < count).then_some(index + 1);

            let location = self.tokens[index].location;
            let op = match &self.tokens[index].kind {
                TokenKind::Op(op) => *op,
                kind => {
                    let leaf = leaf_node(kind.clone(), location);
                    self.output.push(leaf);
                    continue;
                }
            };

            if op.is(OpType::PAIR_START) {
                self.operators.push(OperatorEntry {
                    before_pair: self.prev,
                    output_base: self.output.len(),
                    ..OperatorEntry::new(op, location)
                });
            } else if op.is(OpType::PAIR_END) {
                self.close_pair(index)?;
            } else {
                self.apply_faster_operators(index)?;
            }
        }

        self.finish()
    }

    /// Applies what is left on the operator stack and checks that exactly
    /// one expression remains.
    fn finish(mut self) -> Result<Expr, ExprError> {
        while let Some(entry) = self.operators.pop() {
            if entry.op.is(OpType::PAIR_START) {
                return Err(ExprError::MismatchedPair {
                    side: PairSide::Closing,
                    expected: entry.op.pair_counterpart(),
                    location: entry.location,
                });
            }
            self.apply_operator(entry)?;
        }
        self.apply_ternary();

        let Some(expr) = self.output.pop() else {
            return Ok(Expr::empty(self.tokens[0].location));
        };
        if let Some(last) = self.output.last() {
            return Err(ExprError::Malformed {
                location: last.location(),
            });
        }
        // a `?` or `:` marker that never met its partner
        if expr.is_op(OpType::QUESTION_MARK | OpType::COLON) {
            return Err(ExprError::Malformed {
                location: expr.location(),
            });
        }
        Ok(expr)
    }

    /// Resolves the operator at `index`, applies every stacked operator that
    /// binds tighter, then stacks it.
    fn apply_faster_operators(&mut self, index: usize) -> Result<(), ExprError> {
        let location = self.tokens[index].location;
        let Some(mut op) = self.tokens[index].as_op() else {
            return Ok(());
        };

        if op.is_ambiguous() {
            let left_unary = self.operator_is_left_unary(op, location)?;
            op = operators::resolve(op, left_unary);
            self.tokens[index].set_op(op);
        }
        trace!("operator '{}' ({:?}) at {}", op, op.op_type, location);

        let is_prefix = op.is(OpType::LEFT_UNARY) && !op.is(OpType::QUESTION_MARK | OpType::COLON);
        if !is_prefix {
            while let Some(top) = self.operators.last() {
                if top.op.is(OpType::PAIR_START) {
                    break;
                }
                // `?` nests to the right: a pending branch stays open
                if op.is(OpType::QUESTION_MARK) && top.op.is(OpType::QUESTION_MARK | OpType::COLON) {
                    break;
                }
                let faster = op.precedence > top.op.precedence
                    || (op.precedence == top.op.precedence
                        && associativity(top.op.precedence) == Associativity::Left);
                if !faster {
                    break;
                }
                let Some(top) = self.operators.pop() else {
                    break;
                };
                let closes_branch = top.op.is(OpType::QUESTION_MARK);
                self.apply_operator(top)?;
                // a `:` only reduces back to its own `?`
                if op.is(OpType::COLON) && closes_branch {
                    break;
                }
            }
        }

        self.operators.push(OperatorEntry::new(op, location));
        Ok(())
    }

    /// Operator kind of the previous token, treating the `)` that closed a
    /// C-style cast as the cast itself
    fn prev_op_type(&self, prev: usize) -> OpType {
        if self.cast_close == Some(prev) {
            OpType::PAREN_CAST
        } else {
            self.tokens[prev].op_type()
        }
    }

    /// Decides between the prefix and the binary/postfix reading of an
    /// ambiguous operator from the tokens around it.
    fn operator_is_left_unary(
        &self,
        op: &Operator,
        location: SourceLocation,
    ) -> Result<bool, ExprError> {
        let (Some(prev), Some(next)) = (self.prev, self.next) else {
            return Ok(self.prev.is_none());
        };

        let prev_type = self.prev_op_type(prev);
        if prev_type.intersects(OpType::PAIR_START) {
            return Ok(true);
        }

        let prev_is_op = prev_type.intersects(OpType::UNARY | OpType::BINARY);
        if prev_is_op
            && (prev_type.intersects(OpType::LEFT_UNARY) || !prev_type.intersects(OpType::RIGHT_UNARY))
        {
            return Ok(true);
        }

        // Only increments can follow an operand or a postfix operator as prefix
        if !op.is(OpType::INCREMENT | OpType::DECREMENT) {
            return Ok(false);
        }

        let next_type = self.tokens[next].op_type();
        let next_is_op = next_type.intersects(OpType::UNARY | OpType::BINARY);
        if prev_is_op != next_is_op {
            return Ok(prev_is_op);
        }
        // `x ++ y`
        if !prev_is_op {
            return Err(ExprError::AmbiguousOperator { location });
        }

        let chainable = OpType::INCREMENT | OpType::DECREMENT | OpType::PARENTHESES;
        let prev_chainable = prev_type.intersects(chainable);
        if prev_chainable && next_type.intersects(chainable) {
            return Err(ExprError::AmbiguousOperator { location });
        }
        Ok(!prev_chainable)
    }

    /// Output stack height of the innermost open bracket
    fn output_base(&self) -> usize {
        self.operators
            .iter()
            .rev()
            .find(|entry| entry.op.is(OpType::PAIR_START))
            .map_or(0, |entry| entry.output_base)
    }

    fn pop_operand(&mut self, location: SourceLocation) -> Result<Expr, ExprError> {
        if self.output.len() <= self.output_base() {
            return Err(ExprError::MissingOperand { location });
        }
        self.output
            .pop()
            .ok_or(ExprError::MissingOperand { location })
    }

    fn apply_operator(&mut self, entry: OperatorEntry) -> Result<(), ExprError> {
        let op = entry.op;
        trace!("applying '{}' from {}", op, entry.location);

        if op.is(OpType::BINARY) {
            let right = self.pop_operand(entry.location)?;
            let left = self.pop_operand(entry.location)?;
            self.output.push(Expr::binary(op, left, right));
        } else if op.is(OpType::LEFT_UNARY) {
            let value = self.pop_operand(entry.location)?;
            let node = apply_left_unary(entry, value)?;
            self.output.push(node);
            self.apply_ternary();
        } else if op.is(OpType::RIGHT_UNARY) {
            let value = self.pop_operand(entry.location)?;
            self.output.push(Expr::right_unary(op, value));
        } else {
            return Err(ExprError::MissingOperand {
                location: entry.location,
            });
        }
        Ok(())
    }

    /// Folds `check`, `? on_true`, `: on_false` on top of the output stack
    fn apply_ternary(&mut self) {
        let count = self.output.len();
        if count < self.output_base() + 3 {
            return;
        }
        let is_marker = |expr: &Expr, op_type: OpType| {
            matches!(expr, Expr::LeftUnary { op, .. } if op.op_type == op_type)
        };
        if !is_marker(&self.output[count - 2], OpType::QUESTION_MARK)
            || !is_marker(&self.output[count - 1], OpType::COLON)
        {
            return;
        }

        let mut tail = self.output.split_off(count - 3).into_iter();
        if let (
            Some(check),
            Some(Expr::LeftUnary { value: on_true, .. }),
            Some(Expr::LeftUnary { value: on_false, .. }),
        ) = (tail.next(), tail.next(), tail.next())
        {
            let location = check.location();
            self.output.push(Expr::Ternary {
                check: Box::new(check),
                on_true,
                on_false,
                location,
            });
        }
    }

    /// Applies operators back to the matching opener and pushes the pair
    fn close_pair(&mut self, index: usize) -> Result<(), ExprError> {
        let location = self.tokens[index].location;
        let Some(close) = self.tokens[index].as_op() else {
            return Ok(());
        };

        loop {
            let Some(entry) = self.operators.pop() else {
                return Err(ExprError::MismatchedPair {
                    side: PairSide::Opening,
                    expected: close.pair_counterpart(),
                    location,
                });
            };

            if !entry.op.is(OpType::PAIR_START) {
                self.apply_operator(entry)?;
                continue;
            }

            if !close.closes(entry.op) {
                return Err(ExprError::MismatchedPair {
                    side: PairSide::Closing,
                    expected: entry.op.pair_counterpart(),
                    location: entry.location,
                });
            }

            let inside = self.output.len().saturating_sub(entry.output_base);
            let value = match inside {
                0 => Expr::empty(entry.location),
                1 => self.output.pop().ok_or(ExprError::ExpectedExpression {
                    location: entry.location,
                })?,
                _ => {
                    return Err(ExprError::Malformed {
                        location: self.output[entry.output_base + 1].location(),
                    });
                }
            };
            let pair = Expr::Pair {
                op: entry.op,
                value: Box::new(value),
                location: entry.location,
            };
            return self.attach_pair(pair, entry.before_pair, index);
        }
    }

    /// Turns a closed pair into a call, subscript, launch or initializer when
    /// it directly follows a value, otherwise into a standalone node.
    fn attach_pair(
        &mut self,
        pair: Expr,
        before_pair: Option<usize>,
        close_index: usize,
    ) -> Result<(), ExprError> {
        let follows_value = before_pair.is_some_and(|before| {
            before_pair != self.cast_close
                && (self.tokens[before].is_output()
                    || self.tokens[before].op_type().intersects(OpType::PAIR_END))
        });
        let callee = if follows_value { self.output.pop() } else { None };
        let Some(callee) = callee else {
            return self.transform_last_pair(pair, close_index);
        };

        let Expr::Pair {
            op,
            value,
            location: pair_location,
        } = pair
        else {
            return Ok(());
        };
        let location = callee.location();
        trace!("attaching '{}' pair at {}", op, pair_location);

        if op.is(OpType::PARENTHESES_START) {
            let callee_type = callee.as_vartype();
            let args = value.into_args();
            let node = match callee_type {
                Some(vartype) if args.len() == 1 => Expr::Cast {
                    kind: CastKind::Func,
                    vartype,
                    value: Box::new(args.into_iter().next().unwrap_or(Expr::empty(pair_location))),
                    location,
                },
                _ => Expr::Call {
                    value: Box::new(callee),
                    args,
                    location,
                },
            };
            self.output.push(node);
        } else if op.is(OpType::BRACKET_START) {
            self.output.push(Expr::Subscript {
                value: Box::new(callee),
                index: value,
                location,
            });
        } else if op.is(OpType::CUDA_CALL_START) {
            let mut args = value.into_args().into_iter();
            let (blocks, threads) = match (args.next(), args.next(), args.next()) {
                (Some(blocks), Some(threads), None) => (blocks, threads),
                (_, _, Some(extra)) => {
                    return Err(ExprError::TooManyKernelArguments {
                        location: extra.location(),
                    });
                }
                _ => {
                    return Err(ExprError::MissingThreadCount {
                        location: pair_location,
                    });
                }
            };
            self.output.push(Expr::CudaCall {
                value: Box::new(callee),
                blocks: Box::new(blocks),
                threads: Box::new(threads),
                location,
            });
        } else {
            // `T x{...}`-style initializer: both stay on the output stack
            self.output.push(callee);
            self.output.push(Expr::Tuple {
                args: value.into_args(),
                location: pair_location,
            });
        }
        Ok(())
    }

    /// Classifies a pair that does not follow a value
    fn transform_last_pair(&mut self, pair: Expr, close_index: usize) -> Result<(), ExprError> {
        let Expr::Pair {
            op,
            value,
            location,
        } = pair
        else {
            return Ok(());
        };

        if op.is(OpType::PARENTHESES_START) && !value.is_empty() {
            if let Some(vartype) = value.as_vartype() {
                let after_sizeof = self
                    .operators
                    .last()
                    .is_some_and(|top| top.op.is(OpType::SIZEOF));
                if after_sizeof {
                    self.output.push(Expr::Parentheses { value, location });
                } else {
                    trace!("C-style cast at {}", location);
                    self.operators.push(OperatorEntry {
                        cast: Some(vartype),
                        ..OperatorEntry::new(&operators::PAREN_CAST, location)
                    });
                    self.cast_close = Some(close_index);
                }
            } else {
                self.output.push(Expr::Parentheses { value, location });
            }
            return Ok(());
        }

        if op.is(OpType::BRACE_START) {
            self.output.push(Expr::Tuple {
                args: value.into_args(),
                location,
            });
            return Ok(());
        }

        Err(ExprError::ExpectedExpression { location })
    }
}

fn leaf_node(kind: TokenKind, location: SourceLocation) -> Expr {
    match kind {
        TokenKind::Identifier(name) => Expr::Identifier { name, location },
        TokenKind::Primitive(value) => Expr::Primitive { value, location },
        TokenKind::Char(value) => Expr::Char { value, location },
        TokenKind::Str(value) => Expr::Str { value, location },
        TokenKind::Type(id) => Expr::Type { id, location },
        TokenKind::Vartype(vartype) => Expr::Vartype { vartype, location },
        TokenKind::Variable(id) => Expr::Variable { id, location },
        TokenKind::Function(id) => Expr::Function { id, location },
        TokenKind::Op(_) => Expr::empty(location),
    }
}

fn apply_left_unary(entry: OperatorEntry, value: Expr) -> Result<Expr, ExprError> {
    let OperatorEntry {
        op, location, cast, ..
    } = entry;
    let value = Box::new(value);

    let node = if op.is(OpType::PAREN_CAST) {
        let Some(vartype) = cast else {
            return Err(ExprError::Malformed { location });
        };
        Expr::Cast {
            kind: CastKind::Paren,
            vartype,
            value,
            location,
        }
    } else if op.is(OpType::SIZEOF) {
        Expr::Sizeof { value, location }
    } else if op.is(OpType::NEW | OpType::DELETE) {
        return Err(ExprError::Unsupported {
            keyword: op.symbol,
            location,
        });
    } else if op.is(OpType::THROW) {
        Expr::Throw { value, location }
    } else {
        Expr::LeftUnary {
            op,
            value,
            location,
        }
    };
    Ok(node)
}
