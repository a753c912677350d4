//! Operator descriptors
//!
//! Every operator the expression builder understands is a `static`
//! [`Operator`] carrying its lexeme, a single-bit [`OpType`], its precedence
//! and how it folds constants. Lexemes that can be read more than one way
//! (`+`, `-`, `*`, `&`, `++`, `--`, `::`) have an extra generic descriptor
//! whose type is the union of its readings; the builder swaps it for the
//! resolved one once the neighbouring tokens are known.
//!
//! Precedence numbers follow the usual C++ table where a lower number binds
//! tighter. Associativity is a property of the precedence level, see
//! [`associativity`].

use crate::ast::primitive::Primitive;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// One bit per concrete operator, plus the masks used for fast tests.
    ///
    /// Opening and closing pair bits are adjacent so a closer matches its
    /// opener when `close == open << 1`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpType: u64 {
        const NOT              = 1 << 0;
        const POSITIVE         = 1 << 1;
        const NEGATIVE         = 1 << 2;
        const TILDE            = 1 << 3;
        const LEFT_INCREMENT   = 1 << 4;
        const RIGHT_INCREMENT  = 1 << 5;
        const LEFT_DECREMENT   = 1 << 6;
        const RIGHT_DECREMENT  = 1 << 7;

        const ADD              = 1 << 8;
        const SUB              = 1 << 9;
        const MULT             = 1 << 10;
        const DIV              = 1 << 11;
        const MOD              = 1 << 12;

        const LESS_THAN        = 1 << 13;
        const LESS_THAN_EQ     = 1 << 14;
        const EQUAL            = 1 << 15;
        const NOT_EQUAL        = 1 << 16;
        const GREATER_THAN     = 1 << 17;
        const GREATER_THAN_EQ  = 1 << 18;

        const AND              = 1 << 19;
        const OR               = 1 << 20;
        const BIT_AND          = 1 << 21;
        const BIT_OR           = 1 << 22;
        const XOR              = 1 << 23;
        const LEFT_SHIFT       = 1 << 24;
        const RIGHT_SHIFT      = 1 << 25;

        const ASSIGN           = 1 << 26;
        const ADD_EQ           = 1 << 27;
        const SUB_EQ           = 1 << 28;
        const MULT_EQ          = 1 << 29;
        const DIV_EQ           = 1 << 30;
        const MOD_EQ           = 1 << 31;
        const AND_EQ           = 1 << 32;
        const OR_EQ            = 1 << 33;
        const XOR_EQ           = 1 << 34;
        const LEFT_SHIFT_EQ    = 1 << 35;
        const RIGHT_SHIFT_EQ   = 1 << 36;

        const COMMA            = 1 << 37;
        const SCOPE            = 1 << 38;
        const GLOBAL_SCOPE     = 1 << 39;
        const DEREFERENCE      = 1 << 40;
        const ADDRESS          = 1 << 41;
        const DOT              = 1 << 42;
        const DOT_STAR         = 1 << 43;
        const ARROW            = 1 << 44;
        const ARROW_STAR       = 1 << 45;
        const QUESTION_MARK    = 1 << 46;
        const COLON            = 1 << 47;

        const PARENTHESES_START = 1 << 48;
        const PARENTHESES_END   = 1 << 49;
        const BRACKET_START     = 1 << 50;
        const BRACKET_END       = 1 << 51;
        const BRACE_START       = 1 << 52;
        const BRACE_END         = 1 << 53;
        const CUDA_CALL_START   = 1 << 54;
        const CUDA_CALL_END     = 1 << 55;

        const SIZEOF           = 1 << 56;
        const NEW              = 1 << 57;
        const DELETE           = 1 << 58;
        const THROW            = 1 << 59;
        const PAREN_CAST       = 1 << 60;

        // Masks
        const INCREMENT = Self::LEFT_INCREMENT.bits() | Self::RIGHT_INCREMENT.bits();
        const DECREMENT = Self::LEFT_DECREMENT.bits() | Self::RIGHT_DECREMENT.bits();

        const PARENTHESES = Self::PARENTHESES_START.bits() | Self::PARENTHESES_END.bits();
        const BRACKETS    = Self::BRACKET_START.bits() | Self::BRACKET_END.bits();
        const BRACES      = Self::BRACE_START.bits() | Self::BRACE_END.bits();
        const CUDA_CALL   = Self::CUDA_CALL_START.bits() | Self::CUDA_CALL_END.bits();

        const PAIR_START = Self::PARENTHESES_START.bits()
            | Self::BRACKET_START.bits()
            | Self::BRACE_START.bits()
            | Self::CUDA_CALL_START.bits();
        const PAIR_END = Self::PARENTHESES_END.bits()
            | Self::BRACKET_END.bits()
            | Self::BRACE_END.bits()
            | Self::CUDA_CALL_END.bits();
        const PAIR = Self::PAIR_START.bits() | Self::PAIR_END.bits();

        const SPECIAL = Self::SIZEOF.bits()
            | Self::NEW.bits()
            | Self::DELETE.bits()
            | Self::THROW.bits()
            | Self::PAREN_CAST.bits();

        const LEFT_UNARY = Self::NOT.bits()
            | Self::POSITIVE.bits()
            | Self::NEGATIVE.bits()
            | Self::TILDE.bits()
            | Self::LEFT_INCREMENT.bits()
            | Self::LEFT_DECREMENT.bits()
            | Self::DEREFERENCE.bits()
            | Self::ADDRESS.bits()
            | Self::GLOBAL_SCOPE.bits()
            | Self::QUESTION_MARK.bits()
            | Self::COLON.bits()
            | Self::SPECIAL.bits();
        const RIGHT_UNARY = Self::RIGHT_INCREMENT.bits() | Self::RIGHT_DECREMENT.bits();
        const UNARY = Self::LEFT_UNARY.bits() | Self::RIGHT_UNARY.bits();

        const COMPARISON = Self::LESS_THAN.bits()
            | Self::LESS_THAN_EQ.bits()
            | Self::EQUAL.bits()
            | Self::NOT_EQUAL.bits()
            | Self::GREATER_THAN.bits()
            | Self::GREATER_THAN_EQ.bits();

        const ASSIGNMENT = Self::ASSIGN.bits()
            | Self::ADD_EQ.bits()
            | Self::SUB_EQ.bits()
            | Self::MULT_EQ.bits()
            | Self::DIV_EQ.bits()
            | Self::MOD_EQ.bits()
            | Self::AND_EQ.bits()
            | Self::OR_EQ.bits()
            | Self::XOR_EQ.bits()
            | Self::LEFT_SHIFT_EQ.bits()
            | Self::RIGHT_SHIFT_EQ.bits();

        const MEMBER_ACCESS = Self::SCOPE.bits()
            | Self::DOT.bits()
            | Self::DOT_STAR.bits()
            | Self::ARROW.bits()
            | Self::ARROW_STAR.bits();

        const BINARY = Self::ADD.bits()
            | Self::SUB.bits()
            | Self::MULT.bits()
            | Self::DIV.bits()
            | Self::MOD.bits()
            | Self::COMPARISON.bits()
            | Self::AND.bits()
            | Self::OR.bits()
            | Self::BIT_AND.bits()
            | Self::BIT_OR.bits()
            | Self::XOR.bits()
            | Self::LEFT_SHIFT.bits()
            | Self::RIGHT_SHIFT.bits()
            | Self::ASSIGNMENT.bits()
            | Self::COMMA.bits()
            | Self::MEMBER_ACCESS.bits();

        // Readings of the ambiguous lexemes
        const PLUS      = Self::POSITIVE.bits() | Self::ADD.bits();
        const MINUS     = Self::NEGATIVE.bits() | Self::SUB.bits();
        const ASTERISK  = Self::DEREFERENCE.bits() | Self::MULT.bits();
        const AMPERSAND = Self::ADDRESS.bits() | Self::BIT_AND.bits();
        const SCOPE_RESOLUTION = Self::GLOBAL_SCOPE.bits() | Self::SCOPE.bits();

        const AMBIGUOUS = Self::PLUS.bits()
            | Self::MINUS.bits()
            | Self::ASTERISK.bits()
            | Self::AMPERSAND.bits()
            | Self::INCREMENT.bits()
            | Self::DECREMENT.bits()
            | Self::SCOPE_RESOLUTION.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Associativity of each precedence level, indexed by precedence
pub const ASSOCIATIVITY: [Associativity; 17] = [
    Associativity::Left,  // 0  ::
    Associativity::Left,  // 1  postfix, member access
    Associativity::Right, // 2  prefix, casts, sizeof
    Associativity::Left,  // 3  .* ->*
    Associativity::Left,  // 4  * / %
    Associativity::Left,  // 5  + -
    Associativity::Left,  // 6  << >>
    Associativity::Left,  // 7  relational
    Associativity::Left,  // 8  equality
    Associativity::Left,  // 9  &
    Associativity::Left,  // 10 ^
    Associativity::Left,  // 11 |
    Associativity::Left,  // 12 &&
    Associativity::Left,  // 13 ||
    Associativity::Left,  // 14 ? :
    Associativity::Right, // 15 assignment, throw
    Associativity::Left,  // 16 ,
];

pub fn associativity(precedence: u8) -> Associativity {
    ASSOCIATIVITY
        .get(precedence as usize)
        .copied()
        .unwrap_or(Associativity::Left)
}

/// How an operator folds constant operands
#[derive(Debug, Clone, Copy)]
pub enum Evaluator {
    None,
    Unary(fn(Primitive) -> Primitive),
    Binary(fn(Primitive, Primitive) -> Primitive),
}

#[derive(Debug)]
pub struct Operator {
    pub symbol: &'static str,
    pub op_type: OpType,
    pub precedence: u8,
    pub evaluator: Evaluator,
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.op_type == other.op_type && self.symbol == other.symbol
    }
}

impl Eq for Operator {}

impl Operator {
    const fn new(
        symbol: &'static str,
        op_type: OpType,
        precedence: u8,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            symbol,
            op_type,
            precedence,
            evaluator,
        }
    }

    /// True for the generic descriptors that still need resolving
    pub fn is_ambiguous(&self) -> bool {
        self.op_type.intersects(OpType::AMBIGUOUS) && self.op_type.bits().count_ones() > 1
    }

    pub fn is(&self, op_type: OpType) -> bool {
        self.op_type.intersects(op_type)
    }

    /// Whether [`Operator::evaluate_unary`]/[`Operator::evaluate_binary`] can fold
    pub fn can_evaluate(&self) -> bool {
        !matches!(self.evaluator, Evaluator::None)
    }

    pub fn evaluate_unary(&self, value: Primitive) -> Primitive {
        match self.evaluator {
            Evaluator::Unary(f) => f(value),
            _ => Primitive::Undefined,
        }
    }

    pub fn evaluate_binary(&self, left: Primitive, right: Primitive) -> Primitive {
        match self.evaluator {
            Evaluator::Binary(f) => f(left, right),
            _ => Primitive::Undefined,
        }
    }

    /// Lexeme of the other half of a pair operator
    pub fn pair_counterpart(&self) -> &'static str {
        let t = self.op_type;
        if t == OpType::PARENTHESES_START {
            ")"
        } else if t == OpType::PARENTHESES_END {
            "("
        } else if t == OpType::BRACKET_START {
            "]"
        } else if t == OpType::BRACKET_END {
            "["
        } else if t == OpType::BRACE_START {
            "}"
        } else if t == OpType::BRACE_END {
            "{"
        } else if t == OpType::CUDA_CALL_START {
            ">>>"
        } else if t == OpType::CUDA_CALL_END {
            "<<<"
        } else {
            self.symbol
        }
    }

    /// Whether `self` (a closer) closes `open`
    pub fn closes(&self, open: &Operator) -> bool {
        open.op_type.intersects(OpType::PAIR_START)
            && self.op_type.bits() == open.op_type.bits() << 1
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

use Evaluator::{Binary as B, None as N, Unary as U};

// Left unary
pub static NOT: Operator = Operator::new("!", OpType::NOT, 2, U(Primitive::not));
pub static POSITIVE: Operator = Operator::new("+", OpType::POSITIVE, 2, U(Primitive::positive));
pub static NEGATIVE: Operator = Operator::new("-", OpType::NEGATIVE, 2, U(Primitive::negative));
pub static TILDE: Operator = Operator::new("~", OpType::TILDE, 2, U(Primitive::bit_not));
pub static LEFT_INCREMENT: Operator =
    Operator::new("++", OpType::LEFT_INCREMENT, 2, U(Primitive::increment));
pub static LEFT_DECREMENT: Operator =
    Operator::new("--", OpType::LEFT_DECREMENT, 2, U(Primitive::decrement));
pub static DEREFERENCE: Operator = Operator::new("*", OpType::DEREFERENCE, 2, N);
pub static ADDRESS: Operator = Operator::new("&", OpType::ADDRESS, 2, N);
pub static GLOBAL_SCOPE: Operator = Operator::new("::", OpType::GLOBAL_SCOPE, 0, N);
pub static SIZEOF: Operator = Operator::new("sizeof", OpType::SIZEOF, 2, N);
pub static NEW: Operator = Operator::new("new", OpType::NEW, 2, N);
pub static DELETE: Operator = Operator::new("delete", OpType::DELETE, 2, N);
pub static THROW: Operator = Operator::new("throw", OpType::THROW, 15, N);
pub static PAREN_CAST: Operator = Operator::new("()", OpType::PAREN_CAST, 2, N);
pub static QUESTION_MARK: Operator = Operator::new("?", OpType::QUESTION_MARK, 14, N);
pub static COLON: Operator = Operator::new(":", OpType::COLON, 14, N);

// Right unary
pub static RIGHT_INCREMENT: Operator =
    Operator::new("++", OpType::RIGHT_INCREMENT, 1, U(identity));
pub static RIGHT_DECREMENT: Operator =
    Operator::new("--", OpType::RIGHT_DECREMENT, 1, U(identity));

// Binary
pub static SCOPE: Operator = Operator::new("::", OpType::SCOPE, 0, N);
pub static DOT: Operator = Operator::new(".", OpType::DOT, 1, N);
pub static ARROW: Operator = Operator::new("->", OpType::ARROW, 1, N);
pub static DOT_STAR: Operator = Operator::new(".*", OpType::DOT_STAR, 3, N);
pub static ARROW_STAR: Operator = Operator::new("->*", OpType::ARROW_STAR, 3, N);
pub static MULT: Operator = Operator::new("*", OpType::MULT, 4, B(Primitive::mul));
pub static DIV: Operator = Operator::new("/", OpType::DIV, 4, B(Primitive::div));
pub static MOD: Operator = Operator::new("%", OpType::MOD, 4, B(Primitive::rem));
pub static ADD: Operator = Operator::new("+", OpType::ADD, 5, B(Primitive::add));
pub static SUB: Operator = Operator::new("-", OpType::SUB, 5, B(Primitive::sub));
pub static LEFT_SHIFT: Operator = Operator::new("<<", OpType::LEFT_SHIFT, 6, B(Primitive::shl));
pub static RIGHT_SHIFT: Operator = Operator::new(">>", OpType::RIGHT_SHIFT, 6, B(Primitive::shr));
pub static LESS_THAN: Operator =
    Operator::new("<", OpType::LESS_THAN, 7, B(Primitive::less_than));
pub static LESS_THAN_EQ: Operator =
    Operator::new("<=", OpType::LESS_THAN_EQ, 7, B(Primitive::less_than_eq));
pub static GREATER_THAN: Operator =
    Operator::new(">", OpType::GREATER_THAN, 7, B(Primitive::greater_than));
pub static GREATER_THAN_EQ: Operator =
    Operator::new(">=", OpType::GREATER_THAN_EQ, 7, B(Primitive::greater_than_eq));
pub static EQUAL: Operator = Operator::new("==", OpType::EQUAL, 8, B(Primitive::equal));
pub static NOT_EQUAL: Operator = Operator::new("!=", OpType::NOT_EQUAL, 8, B(Primitive::not_equal));
pub static BIT_AND: Operator = Operator::new("&", OpType::BIT_AND, 9, B(Primitive::bit_and));
pub static XOR: Operator = Operator::new("^", OpType::XOR, 10, B(Primitive::bit_xor));
pub static BIT_OR: Operator = Operator::new("|", OpType::BIT_OR, 11, B(Primitive::bit_or));
pub static AND: Operator = Operator::new("&&", OpType::AND, 12, B(Primitive::and));
pub static OR: Operator = Operator::new("||", OpType::OR, 13, B(Primitive::or));
pub static ASSIGN: Operator = Operator::new("=", OpType::ASSIGN, 15, N);
pub static ADD_EQ: Operator = Operator::new("+=", OpType::ADD_EQ, 15, N);
pub static SUB_EQ: Operator = Operator::new("-=", OpType::SUB_EQ, 15, N);
pub static MULT_EQ: Operator = Operator::new("*=", OpType::MULT_EQ, 15, N);
pub static DIV_EQ: Operator = Operator::new("/=", OpType::DIV_EQ, 15, N);
pub static MOD_EQ: Operator = Operator::new("%=", OpType::MOD_EQ, 15, N);
pub static AND_EQ: Operator = Operator::new("&=", OpType::AND_EQ, 15, N);
pub static OR_EQ: Operator = Operator::new("|=", OpType::OR_EQ, 15, N);
pub static XOR_EQ: Operator = Operator::new("^=", OpType::XOR_EQ, 15, N);
pub static LEFT_SHIFT_EQ: Operator = Operator::new("<<=", OpType::LEFT_SHIFT_EQ, 15, N);
pub static RIGHT_SHIFT_EQ: Operator = Operator::new(">>=", OpType::RIGHT_SHIFT_EQ, 15, N);
pub static COMMA: Operator = Operator::new(",", OpType::COMMA, 16, B(second));

// Pairs
pub static PARENTHESES_START: Operator = Operator::new("(", OpType::PARENTHESES_START, 0, N);
pub static PARENTHESES_END: Operator = Operator::new(")", OpType::PARENTHESES_END, 0, N);
pub static BRACKET_START: Operator = Operator::new("[", OpType::BRACKET_START, 0, N);
pub static BRACKET_END: Operator = Operator::new("]", OpType::BRACKET_END, 0, N);
pub static BRACE_START: Operator = Operator::new("{", OpType::BRACE_START, 0, N);
pub static BRACE_END: Operator = Operator::new("}", OpType::BRACE_END, 0, N);
pub static CUDA_CALL_START: Operator = Operator::new("<<<", OpType::CUDA_CALL_START, 0, N);
pub static CUDA_CALL_END: Operator = Operator::new(">>>", OpType::CUDA_CALL_END, 0, N);

// Unresolved lexemes
pub static PLUS: Operator = Operator::new("+", OpType::PLUS, 5, N);
pub static MINUS: Operator = Operator::new("-", OpType::MINUS, 5, N);
pub static ASTERISK: Operator = Operator::new("*", OpType::ASTERISK, 4, N);
pub static AMPERSAND: Operator = Operator::new("&", OpType::AMPERSAND, 9, N);
pub static INCREMENT: Operator = Operator::new("++", OpType::INCREMENT, 1, N);
pub static DECREMENT: Operator = Operator::new("--", OpType::DECREMENT, 1, N);
pub static SCOPE_RESOLUTION: Operator = Operator::new("::", OpType::SCOPE_RESOLUTION, 0, N);

/// Postfix `x++`/`x--` fold to `x`
fn identity(value: Primitive) -> Primitive {
    value
}

fn second(_: Primitive, right: Primitive) -> Primitive {
    right
}

/// Lexemes in longest-match order for the lexer
pub static LEXEMES: &[(&str, &Operator)] = &[
    ("<<<", &CUDA_CALL_START),
    (">>>", &CUDA_CALL_END),
    ("<<=", &LEFT_SHIFT_EQ),
    (">>=", &RIGHT_SHIFT_EQ),
    ("->*", &ARROW_STAR),
    ("::", &SCOPE_RESOLUTION),
    ("->", &ARROW),
    (".*", &DOT_STAR),
    ("++", &INCREMENT),
    ("--", &DECREMENT),
    ("+=", &ADD_EQ),
    ("-=", &SUB_EQ),
    ("*=", &MULT_EQ),
    ("/=", &DIV_EQ),
    ("%=", &MOD_EQ),
    ("&=", &AND_EQ),
    ("|=", &OR_EQ),
    ("^=", &XOR_EQ),
    ("<<", &LEFT_SHIFT),
    (">>", &RIGHT_SHIFT),
    ("<=", &LESS_THAN_EQ),
    (">=", &GREATER_THAN_EQ),
    ("==", &EQUAL),
    ("!=", &NOT_EQUAL),
    ("&&", &AND),
    ("||", &OR),
    ("+", &PLUS),
    ("-", &MINUS),
    ("*", &ASTERISK),
    ("&", &AMPERSAND),
    ("/", &DIV),
    ("%", &MOD),
    ("<", &LESS_THAN),
    (">", &GREATER_THAN),
    ("=", &ASSIGN),
    ("!", &NOT),
    ("~", &TILDE),
    ("|", &BIT_OR),
    ("^", &XOR),
    (".", &DOT),
    (",", &COMMA),
    ("?", &QUESTION_MARK),
    (":", &COLON),
    ("(", &PARENTHESES_START),
    (")", &PARENTHESES_END),
    ("[", &BRACKET_START),
    ("]", &BRACKET_END),
    ("{", &BRACE_START),
    ("}", &BRACE_END),
];

/// Keywords that behave as prefix operators
pub static KEYWORD_OPERATORS: &[(&str, &Operator)] = &[
    ("sizeof", &SIZEOF),
    ("new", &NEW),
    ("delete", &DELETE),
    ("throw", &THROW),
];

/// Picks the reading of an ambiguous lexeme
pub fn resolve(generic: &Operator, left_unary: bool) -> &'static Operator {
    let t = generic.op_type;
    if t == OpType::PLUS {
        if left_unary { &POSITIVE } else { &ADD }
    } else if t == OpType::MINUS {
        if left_unary { &NEGATIVE } else { &SUB }
    } else if t == OpType::ASTERISK {
        if left_unary { &DEREFERENCE } else { &MULT }
    } else if t == OpType::AMPERSAND {
        if left_unary { &ADDRESS } else { &BIT_AND }
    } else if t == OpType::INCREMENT {
        if left_unary { &LEFT_INCREMENT } else { &RIGHT_INCREMENT }
    } else if t == OpType::DECREMENT {
        if left_unary { &LEFT_DECREMENT } else { &RIGHT_DECREMENT }
    } else if left_unary {
        &GLOBAL_SCOPE
    } else {
        &SCOPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_match_by_shift() {
        assert!(PARENTHESES_END.closes(&PARENTHESES_START));
        assert!(BRACKET_END.closes(&BRACKET_START));
        assert!(BRACE_END.closes(&BRACE_START));
        assert!(CUDA_CALL_END.closes(&CUDA_CALL_START));
        assert!(!BRACKET_END.closes(&PARENTHESES_START));
        assert!(!BRACE_END.closes(&BRACKET_START));
    }

    #[test]
    fn test_ambiguity() {
        assert!(PLUS.is_ambiguous());
        assert!(SCOPE_RESOLUTION.is_ambiguous());
        assert!(!ADD.is_ambiguous());
        assert!(!LEFT_INCREMENT.is_ambiguous());
        assert!(!PARENTHESES_START.is_ambiguous());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(&PLUS, true), &POSITIVE);
        assert_eq!(resolve(&PLUS, false), &ADD);
        assert_eq!(resolve(&AMPERSAND, true), &ADDRESS);
        assert_eq!(resolve(&INCREMENT, false), &RIGHT_INCREMENT);
        assert_eq!(resolve(&SCOPE_RESOLUTION, true), &GLOBAL_SCOPE);
    }

    #[test]
    fn test_masks() {
        assert!(OpType::LEFT_UNARY.contains(OpType::PAREN_CAST));
        assert!(OpType::BINARY.contains(OpType::COMMA));
        assert!(!OpType::BINARY.intersects(OpType::UNARY));
        assert!(!OpType::PAIR.intersects(OpType::UNARY | OpType::BINARY));
    }

    #[test]
    fn test_associativity_table() {
        assert_eq!(associativity(ADD.precedence), Associativity::Left);
        assert_eq!(associativity(ASSIGN.precedence), Associativity::Right);
        assert_eq!(associativity(NEGATIVE.precedence), Associativity::Right);
        assert_eq!(associativity(COLON.precedence), Associativity::Left);
    }

    #[test]
    fn test_evaluators() {
        assert_eq!(
            ADD.evaluate_binary(Primitive::Int(1), Primitive::Int(2)),
            Primitive::Int(3)
        );
        assert_eq!(LEFT_INCREMENT.evaluate_unary(Primitive::Int(1)), Primitive::Int(2));
        assert_eq!(RIGHT_INCREMENT.evaluate_unary(Primitive::Int(1)), Primitive::Int(1));
        assert!(!DOT.can_evaluate());
        assert!(!DEREFERENCE.can_evaluate());
    }
}
