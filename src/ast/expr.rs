//! Expression node model
//!
//! [`Expr`] is a closed sum type; every variant stores its own children and
//! its [`SourceLocation`]. Generic rewriting goes through
//! [`Expr::children_mut`], which hands out every owned child slot so a
//! walker can substitute nodes without knowing each variant's shape.
//!
//! Cloning is a deep copy. Symbol nodes (`Type`, `Variable`, `Function`)
//! only hold handles into the [`SymbolTable`](crate::symbols::SymbolTable),
//! so dropping or cloning a tree never touches the symbols themselves.

use crate::ast::primitive::Primitive;
use crate::diagnostics::SourceLocation;
use crate::parser::operators::{self, OpType, Operator};
use crate::symbols::{FuncId, TypeId, VarId, Vartype};
use bitflags::bitflags;

bitflags! {
    /// Node tags for fast kind tests
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeType: u64 {
        const EMPTY            = 1 << 0;
        const PRIMITIVE        = 1 << 1;
        const CHAR             = 1 << 2;
        const STRING           = 1 << 3;
        const IDENTIFIER       = 1 << 4;
        const TYPE             = 1 << 5;
        const VARTYPE          = 1 << 6;
        const VARIABLE         = 1 << 7;
        const FUNCTION         = 1 << 8;
        const RAW_OP           = 1 << 9;
        const LEFT_UNARY       = 1 << 10;
        const RIGHT_UNARY      = 1 << 11;
        const BINARY           = 1 << 12;
        const TERNARY          = 1 << 13;
        const PAIR             = 1 << 14;
        const SUBSCRIPT        = 1 << 15;
        const CALL             = 1 << 16;
        const SIZEOF           = 1 << 17;
        const NEW              = 1 << 18;
        const DELETE           = 1 << 19;
        const THROW            = 1 << 20;
        const FUNC_CAST        = 1 << 21;
        const PAREN_CAST       = 1 << 22;
        const CONST_CAST       = 1 << 23;
        const STATIC_CAST      = 1 << 24;
        const REINTERPRET_CAST = 1 << 25;
        const DYNAMIC_CAST     = 1 << 26;
        const PARENTHESES      = 1 << 27;
        const TUPLE            = 1 << 28;
        const CUDA_CALL        = 1 << 29;

        const VALUE = Self::PRIMITIVE.bits()
            | Self::TYPE.bits()
            | Self::VARTYPE.bits()
            | Self::VARIABLE.bits()
            | Self::FUNCTION.bits();
        const OP = Self::LEFT_UNARY.bits()
            | Self::RIGHT_UNARY.bits()
            | Self::BINARY.bits()
            | Self::TERNARY.bits();
        const CAST = Self::FUNC_CAST.bits()
            | Self::PAREN_CAST.bits()
            | Self::CONST_CAST.bits()
            | Self::STATIC_CAST.bits()
            | Self::REINTERPRET_CAST.bits()
            | Self::DYNAMIC_CAST.bits();
    }
}

/// Spelling of a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// `T(x)`
    Func,
    /// `(T) x`
    Paren,
    Const,
    Static,
    Reinterpret,
    Dynamic,
}

impl CastKind {
    pub fn node_type(self) -> NodeType {
        match self {
            CastKind::Func => NodeType::FUNC_CAST,
            CastKind::Paren => NodeType::PAREN_CAST,
            CastKind::Const => NodeType::CONST_CAST,
            CastKind::Static => NodeType::STATIC_CAST,
            CastKind::Reinterpret => NodeType::REINTERPRET_CAST,
            CastKind::Dynamic => NodeType::DYNAMIC_CAST,
        }
    }

    /// Keyword of the named casts
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            CastKind::Const => Some("const_cast"),
            CastKind::Static => Some("static_cast"),
            CastKind::Reinterpret => Some("reinterpret_cast"),
            CastKind::Dynamic => Some("dynamic_cast"),
            CastKind::Func | CastKind::Paren => None,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Empty {
        location: SourceLocation,
    },

    // Leaves
    Primitive {
        value: Primitive,
        location: SourceLocation,
    },
    Char {
        value: String, // as written between the quotes
        location: SourceLocation,
    },
    Str {
        value: String,
        location: SourceLocation,
    },
    Identifier {
        name: String,
        location: SourceLocation,
    },
    Type {
        id: TypeId,
        location: SourceLocation,
    },
    Vartype {
        vartype: Vartype,
        location: SourceLocation,
    },
    Variable {
        id: VarId,
        location: SourceLocation,
    },
    Function {
        id: FuncId,
        location: SourceLocation,
    },

    // Operators
    LeftUnary {
        op: &'static Operator,
        value: Box<Expr>,
        location: SourceLocation,
    },
    RightUnary {
        op: &'static Operator,
        value: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: &'static Operator,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Ternary {
        check: Box<Expr>,
        on_true: Box<Expr>,
        on_false: Box<Expr>,
        location: SourceLocation,
    },

    /// Bracketed content before it is classified; `op` is the opener
    Pair {
        op: &'static Operator,
        value: Box<Expr>,
        location: SourceLocation,
    },

    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        value: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    /// `kernel<<<blocks, threads>>>`
    CudaCall {
        value: Box<Expr>,
        blocks: Box<Expr>,
        threads: Box<Expr>,
        location: SourceLocation,
    },
    Sizeof {
        value: Box<Expr>,
        location: SourceLocation,
    },
    New {
        vartype: Vartype,
        value: Box<Expr>,
        size: Box<Expr>,
        location: SourceLocation,
    },
    Delete {
        value: Box<Expr>,
        is_array: bool,
        location: SourceLocation,
    },
    Throw {
        value: Box<Expr>,
        location: SourceLocation,
    },
    Cast {
        kind: CastKind,
        vartype: Vartype,
        value: Box<Expr>,
        location: SourceLocation,
    },
    Parentheses {
        value: Box<Expr>,
        location: SourceLocation,
    },
    Tuple {
        args: Vec<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn empty(location: SourceLocation) -> Self {
        Expr::Empty { location }
    }

    pub fn primitive(value: Primitive, location: SourceLocation) -> Self {
        Expr::Primitive { value, location }
    }

    pub fn variable(id: VarId, location: SourceLocation) -> Self {
        Expr::Variable { id, location }
    }

    /// `left op right`, located at `left`
    pub fn binary(op: &'static Operator, left: Expr, right: Expr) -> Self {
        let location = left.location();
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            location,
        }
    }

    pub fn left_unary(op: &'static Operator, value: Expr) -> Self {
        let location = value.location();
        Expr::LeftUnary {
            op,
            value: Box::new(value),
            location,
        }
    }

    pub fn right_unary(op: &'static Operator, value: Expr) -> Self {
        let location = value.location();
        Expr::RightUnary {
            op,
            value: Box::new(value),
            location,
        }
    }

    pub fn parentheses(value: Expr) -> Self {
        let location = value.location();
        Expr::Parentheses {
            value: Box::new(value),
            location,
        }
    }

    /// Returns the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Empty { location }
            | Expr::Primitive { location, .. }
            | Expr::Char { location, .. }
            | Expr::Str { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::Type { location, .. }
            | Expr::Vartype { location, .. }
            | Expr::Variable { location, .. }
            | Expr::Function { location, .. }
            | Expr::LeftUnary { location, .. }
            | Expr::RightUnary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Ternary { location, .. }
            | Expr::Pair { location, .. }
            | Expr::Subscript { location, .. }
            | Expr::Call { location, .. }
            | Expr::CudaCall { location, .. }
            | Expr::Sizeof { location, .. }
            | Expr::New { location, .. }
            | Expr::Delete { location, .. }
            | Expr::Throw { location, .. }
            | Expr::Cast { location, .. }
            | Expr::Parentheses { location, .. }
            | Expr::Tuple { location, .. } => *location,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Expr::Empty { .. } => NodeType::EMPTY,
            Expr::Primitive { .. } => NodeType::PRIMITIVE,
            Expr::Char { .. } => NodeType::CHAR,
            Expr::Str { .. } => NodeType::STRING,
            Expr::Identifier { .. } => NodeType::IDENTIFIER,
            Expr::Type { .. } => NodeType::TYPE,
            Expr::Vartype { .. } => NodeType::VARTYPE,
            Expr::Variable { .. } => NodeType::VARIABLE,
            Expr::Function { .. } => NodeType::FUNCTION,
            Expr::LeftUnary { .. } => NodeType::LEFT_UNARY,
            Expr::RightUnary { .. } => NodeType::RIGHT_UNARY,
            Expr::Binary { .. } => NodeType::BINARY,
            Expr::Ternary { .. } => NodeType::TERNARY,
            Expr::Pair { .. } => NodeType::PAIR,
            Expr::Subscript { .. } => NodeType::SUBSCRIPT,
            Expr::Call { .. } => NodeType::CALL,
            Expr::CudaCall { .. } => NodeType::CUDA_CALL,
            Expr::Sizeof { .. } => NodeType::SIZEOF,
            Expr::New { .. } => NodeType::NEW,
            Expr::Delete { .. } => NodeType::DELETE,
            Expr::Throw { .. } => NodeType::THROW,
            Expr::Cast { kind, .. } => kind.node_type(),
            Expr::Parentheses { .. } => NodeType::PARENTHESES,
            Expr::Tuple { .. } => NodeType::TUPLE,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::Empty { .. })
    }

    /// Operator of unary and binary nodes
    pub fn op(&self) -> Option<&'static Operator> {
        match self {
            Expr::LeftUnary { op, .. }
            | Expr::RightUnary { op, .. }
            | Expr::Binary { op, .. }
            | Expr::Pair { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Whether this is an operator node of one of the given kinds
    pub fn is_op(&self, op_type: OpType) -> bool {
        self.op().is_some_and(|op| op.is(op_type))
    }

    /// The type named by a `type` or `vartype` node
    pub fn as_vartype(&self) -> Option<Vartype> {
        match self {
            Expr::Type { id, .. } => Some(Vartype::new(*id)),
            Expr::Vartype { vartype, .. } => Some(vartype.clone()),
            _ => None,
        }
    }

    /// Owned children in source order
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Empty { .. }
            | Expr::Primitive { .. }
            | Expr::Char { .. }
            | Expr::Str { .. }
            | Expr::Identifier { .. }
            | Expr::Type { .. }
            | Expr::Vartype { .. }
            | Expr::Variable { .. }
            | Expr::Function { .. } => Vec::new(),
            Expr::LeftUnary { value, .. }
            | Expr::RightUnary { value, .. }
            | Expr::Pair { value, .. }
            | Expr::Sizeof { value, .. }
            | Expr::Delete { value, .. }
            | Expr::Throw { value, .. }
            | Expr::Cast { value, .. }
            | Expr::Parentheses { value, .. } => vec![value.as_ref()],
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Ternary {
                check,
                on_true,
                on_false,
                ..
            } => vec![check.as_ref(), on_true.as_ref(), on_false.as_ref()],
            Expr::Subscript { value, index, .. } => vec![value.as_ref(), index.as_ref()],
            Expr::Call { value, args, .. } => {
                let mut children: Vec<&Expr> = vec![value.as_ref()];
                children.extend(args.iter());
                children
            }
            Expr::CudaCall {
                value,
                blocks,
                threads,
                ..
            } => vec![value.as_ref(), blocks.as_ref(), threads.as_ref()],
            Expr::New { value, size, .. } => vec![value.as_ref(), size.as_ref()],
            Expr::Tuple { args, .. } => args.iter().collect(),
        }
    }

    /// Every owned child slot, for in-place substitution
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Empty { .. }
            | Expr::Primitive { .. }
            | Expr::Char { .. }
            | Expr::Str { .. }
            | Expr::Identifier { .. }
            | Expr::Type { .. }
            | Expr::Vartype { .. }
            | Expr::Variable { .. }
            | Expr::Function { .. } => Vec::new(),
            Expr::LeftUnary { value, .. }
            | Expr::RightUnary { value, .. }
            | Expr::Pair { value, .. }
            | Expr::Sizeof { value, .. }
            | Expr::Delete { value, .. }
            | Expr::Throw { value, .. }
            | Expr::Cast { value, .. }
            | Expr::Parentheses { value, .. } => vec![value.as_mut()],
            Expr::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Expr::Ternary {
                check,
                on_true,
                on_false,
                ..
            } => vec![check.as_mut(), on_true.as_mut(), on_false.as_mut()],
            Expr::Subscript { value, index, .. } => vec![value.as_mut(), index.as_mut()],
            Expr::Call { value, args, .. } => {
                let mut children: Vec<&mut Expr> = vec![value.as_mut()];
                children.extend(args.iter_mut());
                children
            }
            Expr::CudaCall {
                value,
                blocks,
                threads,
                ..
            } => vec![value.as_mut(), blocks.as_mut(), threads.as_mut()],
            Expr::New { value, size, .. } => vec![value.as_mut(), size.as_mut()],
            Expr::Tuple { args, .. } => args.iter_mut().collect(),
        }
    }

    /// Pre-order visit of the whole subtree
    pub fn walk(&self, visit: &mut dyn FnMut(&Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Leftmost node of the printed expression
    pub fn start_node(&self) -> &Expr {
        match self {
            Expr::RightUnary { value, .. }
            | Expr::Subscript { value, .. }
            | Expr::Call { value, .. }
            | Expr::CudaCall { value, .. } => value.start_node(),
            Expr::Binary { left, .. } => left.start_node(),
            Expr::Ternary { check, .. } => check.start_node(),
            _ => self,
        }
    }

    /// Rightmost node of the printed expression
    pub fn end_node(&self) -> &Expr {
        match self {
            Expr::LeftUnary { value, .. } | Expr::Throw { value, .. } => value.end_node(),
            Expr::Cast {
                kind: CastKind::Paren,
                value,
                ..
            } => value.end_node(),
            Expr::Binary { right, .. } => right.end_node(),
            Expr::Ternary { on_false, .. } => on_false.end_node(),
            _ => self,
        }
    }

    /// A copy that is safe to embed as an operand: leaves and nodes that
    /// already print their own delimiters come back as-is, anything else is
    /// wrapped in parentheses
    pub fn wrap_in_parentheses(&self) -> Expr {
        match self {
            Expr::LeftUnary { .. }
            | Expr::RightUnary { .. }
            | Expr::Binary { .. }
            | Expr::Ternary { .. }
            | Expr::New { .. }
            | Expr::Delete { .. }
            | Expr::Throw { .. }
            | Expr::Cast { .. } => Expr::parentheses(self.clone()),
            _ => self.clone(),
        }
    }

    /// Flattens a comma chain into its operands, left to right.
    ///
    /// `,` is parsed as a left-associative binary operator, so `a, b, c`
    /// arrives as `((a, b), c)`. An empty node yields no arguments.
    pub fn into_args(self) -> Vec<Expr> {
        let mut args = Vec::new();
        let mut node = self;
        loop {
            match node {
                Expr::Binary {
                    op, left, right, ..
                } if op.is(OpType::COMMA) => {
                    args.push(*right);
                    node = *left;
                }
                Expr::Empty { .. } if args.is_empty() => return args,
                other => {
                    args.push(other);
                    break;
                }
            }
        }
        args.reverse();
        args
    }

    /// Joins `args` back into a comma chain; the inverse of [`Expr::into_args`]
    pub fn comma_chain(args: Vec<Expr>, location: SourceLocation) -> Expr {
        args.into_iter()
            .reduce(|left, right| Expr::binary(&operators::COMMA, left, right))
            .unwrap_or(Expr::Empty { location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn parse(source: &str) -> Expr {
        parse_expression(source).expect("parse failed")
    }

    #[test]
    fn test_node_types() {
        assert_eq!(parse("1").node_type(), NodeType::PRIMITIVE);
        assert_eq!(parse("'a'").node_type(), NodeType::CHAR);
        assert_eq!(parse("\"text\"").node_type(), NodeType::STRING);
        assert_eq!(parse("x").node_type(), NodeType::IDENTIFIER);
        assert_eq!(parse("int").node_type(), NodeType::TYPE);
        assert_eq!(parse("-x").node_type(), NodeType::LEFT_UNARY);
        assert_eq!(parse("x++").node_type(), NodeType::RIGHT_UNARY);
        assert_eq!(parse("a + b").node_type(), NodeType::BINARY);
        assert_eq!(parse("(int) x").node_type(), NodeType::PAREN_CAST);
        assert!(parse("(int) x").node_type().intersects(NodeType::CAST));
        assert!(NodeType::VALUE.contains(NodeType::VARIABLE));
    }

    #[test]
    fn test_clone_is_deep() {
        let original = parse("f(a + 1, b)");
        let mut copy = original.clone();
        if let Expr::Call { args, .. } = &mut copy {
            args.clear();
        }
        assert!(matches!(&original, Expr::Call { args, .. } if args.len() == 2));
    }

    #[test]
    fn test_children_mut_substitutes_in_place() {
        let mut expr = parse("a + b * c");
        for child in expr.children_mut() {
            if matches!(child, Expr::Identifier { name, .. } if name == "a") {
                *child = Expr::primitive(Primitive::Int(7), SourceLocation::default());
            }
        }
        let Expr::Binary { left, .. } = &expr else {
            panic!("expected a binary node");
        };
        assert!(matches!(left.as_ref(), Expr::Primitive { value: Primitive::Int(7), .. }));
        assert_eq!(expr.children().len(), 2);
    }

    #[test]
    fn test_start_and_end_nodes() {
        let expr = parse("a + b * c");
        assert!(matches!(expr.start_node(), Expr::Identifier { name, .. } if name == "a"));
        assert!(matches!(expr.end_node(), Expr::Identifier { name, .. } if name == "c"));

        let expr = parse("-x");
        assert!(matches!(expr.start_node(), Expr::LeftUnary { .. }));
        assert!(matches!(expr.end_node(), Expr::Identifier { .. }));
    }

    #[test]
    fn test_wrap_in_parentheses() {
        assert!(matches!(parse("a").wrap_in_parentheses(), Expr::Identifier { .. }));
        assert!(matches!(parse("f(a)").wrap_in_parentheses(), Expr::Call { .. }));
        assert!(matches!(
            parse("a + b").wrap_in_parentheses(),
            Expr::Parentheses { .. }
        ));
    }

    #[test]
    fn test_args_round_trip() {
        let args = parse("0, 1, 2").into_args();
        assert_eq!(args.len(), 3);
        assert!(matches!(args[0], Expr::Primitive { value: Primitive::Int(0), .. }));
        assert!(matches!(args[2], Expr::Primitive { value: Primitive::Int(2), .. }));

        let chain = Expr::comma_chain(args, SourceLocation::default());
        assert_eq!(chain.into_args().len(), 3);
        assert!(Expr::empty(SourceLocation::default()).into_args().is_empty());
    }
}
