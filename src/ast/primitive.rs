//! Compile-time constant values
//!
//! [`Primitive`] is what constant folding produces. Arithmetic follows the C
//! usual conversions in a reduced form: `bool` promotes to `int`, then the
//! wider of the two operand ranks wins (`int < long < float < double`).
//! Integer arithmetic wraps; integer division or remainder by zero, and any
//! operation on an [`Primitive::Undefined`] operand, yields `Undefined`.

use std::fmt;

/// A folded constant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Primitive {
    #[default]
    Undefined,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Int,
    Long,
    Float,
    Double,
}

impl Rank {
    fn is_integer(self) -> bool {
        matches!(self, Rank::Int | Rank::Long)
    }
}

impl Primitive {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Primitive::Undefined)
    }

    /// Integer view of the value; floating values are truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Undefined => None,
            Primitive::Bool(b) => Some(*b as i64),
            Primitive::Int(n) => Some(*n as i64),
            Primitive::Long(n) => Some(*n),
            Primitive::Float(x) => Some(*x as i64),
            Primitive::Double(x) => Some(*x as i64),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Undefined => None,
            Primitive::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Primitive::Int(n) => Some(*n as f64),
            Primitive::Long(n) => Some(*n as f64),
            Primitive::Float(x) => Some(*x as f64),
            Primitive::Double(x) => Some(*x),
        }
    }

    /// C truthiness
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Undefined => None,
            Primitive::Bool(b) => Some(*b),
            Primitive::Int(n) => Some(*n != 0),
            Primitive::Long(n) => Some(*n != 0),
            Primitive::Float(x) => Some(*x != 0.0),
            Primitive::Double(x) => Some(*x != 0.0),
        }
    }

    /// Byte width of the value's type, as `sizeof` reports it
    pub fn size_of(&self) -> Option<usize> {
        match self {
            Primitive::Undefined => None,
            Primitive::Bool(_) => Some(1),
            Primitive::Int(_) | Primitive::Float(_) => Some(4),
            Primitive::Long(_) | Primitive::Double(_) => Some(8),
        }
    }

    /// Parses a numeric literal as written in source.
    ///
    /// Accepts decimal and `0x` hexadecimal integers with `u`/`l` suffixes
    /// and floating literals with an optional exponent and `f` suffix.
    pub fn from_literal(text: &str) -> Option<Primitive> {
        let lower = text.to_ascii_lowercase();
        let is_hex = lower.starts_with("0x");
        let is_float = !is_hex && (lower.contains('.') || lower.contains('e'));

        if is_float {
            let (digits, single) = match lower.strip_suffix('f') {
                Some(rest) => (rest, true),
                None => (lower.trim_end_matches('l'), false),
            };
            let value = digits.parse::<f64>().ok()?;
            return Some(if single {
                Primitive::Float(value as f32)
            } else {
                Primitive::Double(value)
            });
        }

        let digits = lower.trim_end_matches(['u', 'l']);
        let is_long = lower[digits.len()..].contains('l');
        let value = if is_hex {
            i64::from_str_radix(&digits[2..], 16).ok()?
        } else {
            digits.parse::<i64>().ok()?
        };

        if is_long || i32::try_from(value).is_err() {
            Some(Primitive::Long(value))
        } else {
            Some(Primitive::Int(value as i32))
        }
    }

    fn rank(&self) -> Option<Rank> {
        match self {
            Primitive::Undefined => None,
            Primitive::Bool(_) | Primitive::Int(_) => Some(Rank::Int),
            Primitive::Long(_) => Some(Rank::Long),
            Primitive::Float(_) => Some(Rank::Float),
            Primitive::Double(_) => Some(Rank::Double),
        }
    }

    fn from_integer(rank: Rank, value: i64) -> Primitive {
        match rank {
            Rank::Int => Primitive::Int(value as i32),
            _ => Primitive::Long(value),
        }
    }

    fn from_floating(rank: Rank, value: f64) -> Primitive {
        match rank {
            Rank::Float => Primitive::Float(value as f32),
            _ => Primitive::Double(value),
        }
    }

    fn arithmetic(
        self,
        rhs: Primitive,
        int_op: impl Fn(i64, i64) -> Option<i64>,
        float_op: Option<fn(f64, f64) -> f64>,
    ) -> Primitive {
        let (Some(a), Some(b)) = (self.rank(), rhs.rank()) else {
            return Primitive::Undefined;
        };
        let rank = a.max(b);

        if rank.is_integer() {
            let (Some(x), Some(y)) = (self.as_i64(), rhs.as_i64()) else {
                return Primitive::Undefined;
            };
            return match int_op(x, y) {
                Some(value) => Primitive::from_integer(rank, value),
                None => Primitive::Undefined,
            };
        }

        match (float_op, self.as_f64(), rhs.as_f64()) {
            (Some(op), Some(x), Some(y)) => Primitive::from_floating(rank, op(x, y)),
            _ => Primitive::Undefined,
        }
    }

    fn compare(self, rhs: Primitive, int_cmp: fn(&i64, &i64) -> bool, float_cmp: fn(&f64, &f64) -> bool) -> Primitive {
        let (Some(a), Some(b)) = (self.rank(), rhs.rank()) else {
            return Primitive::Undefined;
        };

        if a.max(b).is_integer() {
            match (self.as_i64(), rhs.as_i64()) {
                (Some(x), Some(y)) => Primitive::Bool(int_cmp(&x, &y)),
                _ => Primitive::Undefined,
            }
        } else {
            match (self.as_f64(), rhs.as_f64()) {
                (Some(x), Some(y)) => Primitive::Bool(float_cmp(&x, &y)),
                _ => Primitive::Undefined,
            }
        }
    }

    // Unary operators

    pub fn positive(self) -> Primitive {
        match self {
            Primitive::Bool(b) => Primitive::Int(b as i32),
            other => other,
        }
    }

    pub fn negative(self) -> Primitive {
        match self {
            Primitive::Undefined => Primitive::Undefined,
            Primitive::Bool(b) => Primitive::Int(-(b as i32)),
            Primitive::Int(n) => Primitive::Int(n.wrapping_neg()),
            Primitive::Long(n) => Primitive::Long(n.wrapping_neg()),
            Primitive::Float(x) => Primitive::Float(-x),
            Primitive::Double(x) => Primitive::Double(-x),
        }
    }

    pub fn not(self) -> Primitive {
        match self.as_bool() {
            Some(b) => Primitive::Bool(!b),
            None => Primitive::Undefined,
        }
    }

    pub fn bit_not(self) -> Primitive {
        match self {
            Primitive::Bool(b) => Primitive::Int(!(b as i32)),
            Primitive::Int(n) => Primitive::Int(!n),
            Primitive::Long(n) => Primitive::Long(!n),
            _ => Primitive::Undefined,
        }
    }

    /// `++x` and `x++` fold to `x + 1`; nothing is stored back
    pub fn increment(self) -> Primitive {
        self.add(Primitive::Int(1))
    }

    pub fn decrement(self) -> Primitive {
        self.sub(Primitive::Int(1))
    }

    // Binary operators

    pub fn add(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x.wrapping_add(y)), Some(|x, y| x + y))
    }

    pub fn sub(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x.wrapping_sub(y)), Some(|x, y| x - y))
    }

    pub fn mul(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x.wrapping_mul(y)), Some(|x, y| x * y))
    }

    pub fn div(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| x.checked_div(y), Some(|x, y| x / y))
    }

    pub fn rem(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| x.checked_rem(y), None)
    }

    pub fn shl(self, rhs: Primitive) -> Primitive {
        self.arithmetic(
            rhs,
            |x, y| u32::try_from(y).ok().and_then(|s| x.checked_shl(s)),
            None,
        )
    }

    pub fn shr(self, rhs: Primitive) -> Primitive {
        self.arithmetic(
            rhs,
            |x, y| u32::try_from(y).ok().and_then(|s| x.checked_shr(s)),
            None,
        )
    }

    pub fn bit_and(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x & y), None)
    }

    pub fn bit_or(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x | y), None)
    }

    pub fn bit_xor(self, rhs: Primitive) -> Primitive {
        self.arithmetic(rhs, |x, y| Some(x ^ y), None)
    }

    pub fn less_than(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::lt, f64::lt)
    }

    pub fn less_than_eq(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::le, f64::le)
    }

    pub fn greater_than(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::gt, f64::gt)
    }

    pub fn greater_than_eq(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::ge, f64::ge)
    }

    pub fn equal(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::eq, f64::eq)
    }

    pub fn not_equal(self, rhs: Primitive) -> Primitive {
        self.compare(rhs, i64::ne, f64::ne)
    }

    pub fn and(self, rhs: Primitive) -> Primitive {
        match (self.as_bool(), rhs.as_bool()) {
            (Some(a), Some(b)) => Primitive::Bool(a && b),
            _ => Primitive::Undefined,
        }
    }

    pub fn or(self, rhs: Primitive) -> Primitive {
        match (self.as_bool(), rhs.as_bool()) {
            (Some(a), Some(b)) => Primitive::Bool(a || b),
            _ => Primitive::Undefined,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Undefined => write!(f, "undefined"),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Int(n) => write!(f, "{}", n),
            Primitive::Long(n) => write!(f, "{}L", n),
            Primitive::Float(x) => write!(f, "{:?}f", x),
            Primitive::Double(x) => write!(f, "{:?}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(Primitive::from_literal("42"), Some(Primitive::Int(42)));
        assert_eq!(Primitive::from_literal("42L"), Some(Primitive::Long(42)));
        assert_eq!(Primitive::from_literal("0x1F"), Some(Primitive::Int(31)));
        assert_eq!(Primitive::from_literal("7u"), Some(Primitive::Int(7)));
        assert_eq!(Primitive::from_literal("3.5"), Some(Primitive::Double(3.5)));
        assert_eq!(Primitive::from_literal("2.5f"), Some(Primitive::Float(2.5)));
        assert_eq!(Primitive::from_literal("1e3"), Some(Primitive::Double(1000.0)));
        assert_eq!(
            Primitive::from_literal("4294967296"),
            Some(Primitive::Long(4294967296))
        );
        assert_eq!(Primitive::from_literal("0xZZ"), None);
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(Primitive::Int(7).div(Primitive::Int(2)), Primitive::Int(3));
        assert_eq!(Primitive::Int(2).div(Primitive::Int(3)), Primitive::Int(0));
        assert_eq!(Primitive::Int(1).div(Primitive::Int(0)), Primitive::Undefined);
    }

    #[test]
    fn test_promotion() {
        assert_eq!(Primitive::Int(1).add(Primitive::Long(2)), Primitive::Long(3));
        assert_eq!(
            Primitive::Int(1).add(Primitive::Double(0.5)),
            Primitive::Double(1.5)
        );
        assert_eq!(
            Primitive::Float(1.5).mul(Primitive::Int(2)),
            Primitive::Float(3.0)
        );
        assert_eq!(Primitive::Bool(true).add(Primitive::Int(1)), Primitive::Int(2));
    }

    #[test]
    fn test_float_remainder_is_undefined() {
        assert_eq!(
            Primitive::Double(1.0).rem(Primitive::Int(2)),
            Primitive::Undefined
        );
        assert_eq!(Primitive::Int(7).rem(Primitive::Int(4)), Primitive::Int(3));
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(
            Primitive::Int(1).less_than(Primitive::Double(1.5)),
            Primitive::Bool(true)
        );
        assert_eq!(Primitive::Int(2).equal(Primitive::Long(2)), Primitive::Bool(true));
        assert_eq!(Primitive::Int(0).or(Primitive::Int(3)), Primitive::Bool(true));
        assert_eq!(Primitive::Int(0).not(), Primitive::Bool(true));
        assert_eq!(Primitive::Undefined.and(Primitive::Bool(true)), Primitive::Undefined);
    }

    #[test]
    fn test_unary() {
        assert_eq!(Primitive::Int(1).increment(), Primitive::Int(2));
        assert_eq!(Primitive::Int(1).decrement(), Primitive::Int(0));
        assert_eq!(Primitive::Int(5).negative(), Primitive::Int(-5));
        assert_eq!(Primitive::Int(0).bit_not(), Primitive::Int(-1));
        assert_eq!(Primitive::Double(1.0).bit_not(), Primitive::Undefined);
    }

    #[test]
    fn test_shifts() {
        assert_eq!(Primitive::Int(1).shl(Primitive::Int(4)), Primitive::Int(16));
        assert_eq!(Primitive::Int(16).shr(Primitive::Int(2)), Primitive::Int(4));
        assert_eq!(Primitive::Int(1).shl(Primitive::Int(-1)), Primitive::Undefined);
    }

    #[test]
    fn test_display() {
        assert_eq!(Primitive::Int(3).to_string(), "3");
        assert_eq!(Primitive::Long(3).to_string(), "3L");
        assert_eq!(Primitive::Double(3.0).to_string(), "3.0");
        assert_eq!(Primitive::Float(0.5).to_string(), "0.5f");
        assert_eq!(Primitive::Bool(false).to_string(), "false");
    }
}
