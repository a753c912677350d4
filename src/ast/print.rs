//! Source printing and tree dumps for expressions.
//!
//! Handles carry no names, so printing goes through a [`SymbolTable`]:
//! `expr.display(&symbols)` implements [`fmt::Display`] and
//! `expr.debug_tree(&symbols)` renders an indented tree.

use crate::ast::expr::{CastKind, Expr, NodeType};
use crate::parser::operators::OpType;
use crate::symbols::SymbolTable;
use std::fmt;

pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    symbols: &'a SymbolTable,
}

impl Expr {
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> ExprDisplay<'a> {
        ExprDisplay {
            expr: self,
            symbols,
        }
    }

    /// Indented dump of the tree, one node per line
    pub fn debug_tree(&self, symbols: &SymbolTable) -> String {
        let mut out = String::new();
        self.debug_tree_into(symbols, "", &mut out);
        out
    }

    fn debug_tree_into(&self, symbols: &SymbolTable, indent: &str, out: &mut String) {
        let label = match self {
            Expr::LeftUnary { op, .. } | Expr::RightUnary { op, .. } | Expr::Binary { op, .. } => {
                op.symbol.to_string()
            }
            Expr::Pair { op, .. } => format!("{}{}", op.symbol, op.pair_counterpart()),
            Expr::Ternary { .. } => "?:".to_string(),
            Expr::Subscript { .. } => "[]".to_string(),
            Expr::Call { .. } => "()".to_string(),
            Expr::CudaCall { .. } => "<<<>>>".to_string(),
            Expr::Parentheses { .. } => "()".to_string(),
            Expr::Tuple { .. } => "{}".to_string(),
            Expr::Cast { vartype, .. } => symbols.vartype_name(vartype),
            Expr::New { vartype, .. } => symbols.vartype_name(vartype),
            Expr::Sizeof { .. } => "sizeof".to_string(),
            Expr::Delete { .. } => "delete".to_string(),
            Expr::Throw { .. } => "throw".to_string(),
            leaf => leaf.display(symbols).to_string(),
        };
        out.push_str(&format!(
            "{}|---[{}] ({})\n",
            indent,
            label,
            node_type_name(self.node_type())
        ));

        let child_indent = format!("{}|   ", indent);
        for child in self.children() {
            child.debug_tree_into(symbols, &child_indent, out);
        }
    }
}

fn node_type_name(node_type: NodeType) -> &'static str {
    const NAMES: &[(NodeType, &str)] = &[
        (NodeType::EMPTY, "empty"),
        (NodeType::PRIMITIVE, "primitive"),
        (NodeType::CHAR, "char"),
        (NodeType::STRING, "string"),
        (NodeType::IDENTIFIER, "identifier"),
        (NodeType::TYPE, "type"),
        (NodeType::VARTYPE, "vartype"),
        (NodeType::VARIABLE, "variable"),
        (NodeType::FUNCTION, "function"),
        (NodeType::RAW_OP, "raw op"),
        (NodeType::LEFT_UNARY, "left unary"),
        (NodeType::RIGHT_UNARY, "right unary"),
        (NodeType::BINARY, "binary"),
        (NodeType::TERNARY, "ternary"),
        (NodeType::PAIR, "pair"),
        (NodeType::SUBSCRIPT, "subscript"),
        (NodeType::CALL, "call"),
        (NodeType::SIZEOF, "sizeof"),
        (NodeType::NEW, "new"),
        (NodeType::DELETE, "delete"),
        (NodeType::THROW, "throw"),
        (NodeType::FUNC_CAST, "function cast"),
        (NodeType::PAREN_CAST, "paren cast"),
        (NodeType::CONST_CAST, "const_cast"),
        (NodeType::STATIC_CAST, "static_cast"),
        (NodeType::REINTERPRET_CAST, "reinterpret_cast"),
        (NodeType::DYNAMIC_CAST, "dynamic_cast"),
        (NodeType::PARENTHESES, "parentheses"),
        (NodeType::TUPLE, "tuple"),
        (NodeType::CUDA_CALL, "cuda call"),
    ];
    NAMES
        .iter()
        .find(|(t, _)| *t == node_type)
        .map(|(_, name)| *name)
        .unwrap_or("node")
}

impl ExprDisplay<'_> {
    fn sub<'b>(&'b self, expr: &'b Expr) -> ExprDisplay<'b> {
        ExprDisplay {
            expr,
            symbols: self.symbols,
        }
    }

    fn write_list(&self, f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.sub(arg))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.symbols;
        match self.expr {
            Expr::Empty { .. } => Ok(()),
            Expr::Primitive { value, .. } => write!(f, "{}", value),
            Expr::Char { value, .. } => write!(f, "'{}'", value),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::Type { id, .. } => write!(f, "{}", symbols.type_def(*id).name),
            Expr::Vartype { vartype, .. } => write!(f, "{}", symbols.vartype_name(vartype)),
            Expr::Variable { id, .. } => write!(f, "{}", symbols.variable(*id).name),
            Expr::Function { id, .. } => write!(f, "{}", symbols.function(*id).name),

            Expr::LeftUnary { op, value, .. } => {
                let inner = self.sub(value).to_string();
                // `- -x` must not print as `--x`
                let glued = op.symbol.ends_with(|c: char| inner.starts_with(c));
                if glued {
                    write!(f, "{} {}", op, inner)
                } else {
                    write!(f, "{}{}", op, inner)
                }
            }
            Expr::RightUnary { op, value, .. } => write!(f, "{}{}", self.sub(value), op),
            Expr::Binary {
                op, left, right, ..
            } => {
                if op.is(OpType::COMMA) {
                    write!(f, "{}, {}", self.sub(left), self.sub(right))
                } else if op.is(OpType::MEMBER_ACCESS) {
                    write!(f, "{}{}{}", self.sub(left), op, self.sub(right))
                } else {
                    write!(f, "{} {} {}", self.sub(left), op, self.sub(right))
                }
            }
            Expr::Ternary {
                check,
                on_true,
                on_false,
                ..
            } => {
                // `?` nests to the right, so a ternary check needs brackets
                if matches!(check.as_ref(), Expr::Ternary { .. }) {
                    write!(f, "({})", self.sub(check))?;
                } else {
                    write!(f, "{}", self.sub(check))?;
                }
                write!(f, " ? {} : {}", self.sub(on_true), self.sub(on_false))
            }
            Expr::Pair { op, value, .. } => {
                write!(f, "{}{}{}", op, self.sub(value), op.pair_counterpart())
            }
            Expr::Subscript { value, index, .. } => {
                write!(f, "{}[{}]", self.sub(value), self.sub(index))
            }
            Expr::Call { value, args, .. } => {
                write!(f, "{}(", self.sub(value))?;
                self.write_list(f, args)?;
                write!(f, ")")
            }
            Expr::CudaCall {
                value,
                blocks,
                threads,
                ..
            } => write!(
                f,
                "{}<<<{}, {}>>>",
                self.sub(value),
                self.sub(blocks),
                self.sub(threads)
            ),
            Expr::Sizeof { value, .. } => match value.as_ref() {
                Expr::Parentheses { .. } => write!(f, "sizeof{}", self.sub(value)),
                _ => write!(f, "sizeof({})", self.sub(value)),
            },
            Expr::New {
                vartype,
                value,
                size,
                ..
            } => {
                write!(f, "new {}", symbols.vartype_name(vartype))?;
                if !value.is_empty() {
                    write!(f, "({})", self.sub(value))?;
                }
                if !size.is_empty() {
                    write!(f, "[{}]", self.sub(size))?;
                }
                Ok(())
            }
            Expr::Delete {
                value, is_array, ..
            } => {
                if *is_array {
                    write!(f, "delete [] {}", self.sub(value))
                } else {
                    write!(f, "delete {}", self.sub(value))
                }
            }
            Expr::Throw { value, .. } => {
                if value.is_empty() {
                    write!(f, "throw")
                } else {
                    write!(f, "throw {}", self.sub(value))
                }
            }
            Expr::Cast {
                kind,
                vartype,
                value,
                ..
            } => {
                let type_name = symbols.vartype_name(vartype);
                match kind {
                    CastKind::Paren => write!(f, "({}) {}", type_name, self.sub(value)),
                    CastKind::Func => write!(f, "{}({})", type_name, self.sub(value)),
                    named => write!(
                        f,
                        "{}<{}>({})",
                        named.keyword().unwrap_or_default(),
                        type_name,
                        self.sub(value)
                    ),
                }
            }
            Expr::Parentheses { value, .. } => write!(f, "({})", self.sub(value)),
            Expr::Tuple { args, .. } => {
                write!(f, "{{")?;
                self.write_list(f, args)?;
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::primitive::Primitive;
    use crate::diagnostics::SourceLocation;
    use crate::parser::parse_expression;
    use crate::symbols::{TypeId, Vartype};

    fn round_trip(source: &str) -> String {
        let symbols = SymbolTable::new();
        parse_expression(source)
            .expect("parse failed")
            .display(&symbols)
            .to_string()
    }

    #[test]
    fn test_print_operators() {
        assert_eq!(round_trip("a+b*c"), "a + b * c");
        assert_eq!(round_trip("-x"), "-x");
        assert_eq!(round_trip("- -x"), "- -x");
        assert_eq!(round_trip("x++"), "x++");
        assert_eq!(round_trip("a.b->c"), "a.b->c");
        assert_eq!(round_trip("::x"), "::x");
        assert_eq!(round_trip("c ? 1 : 2"), "c ? 1 : 2");
    }

    #[test]
    fn test_print_pairs() {
        assert_eq!(round_trip("f(a,b)"), "f(a, b)");
        assert_eq!(round_trip("f()"), "f()");
        assert_eq!(round_trip("a[i+1]"), "a[i + 1]");
        assert_eq!(round_trip("{1,2}"), "{1, 2}");
        assert_eq!(round_trip("(a)"), "(a)");
        assert_eq!(round_trip("k<<<b, t>>>"), "k<<<b, t>>>");
    }

    #[test]
    fn test_print_casts_and_keywords() {
        assert_eq!(round_trip("(float) x"), "(float) x");
        assert_eq!(round_trip("(const int*) p"), "(const int*) p");
        assert_eq!(round_trip("int(x)"), "int(x)");
        assert_eq!(round_trip("sizeof(int)"), "sizeof(int)");
        assert_eq!(round_trip("sizeof x"), "sizeof(x)");
        assert_eq!(round_trip("throw 1"), "throw 1");
    }

    #[test]
    fn test_print_unparsed_nodes() {
        let symbols = SymbolTable::new();
        let location = SourceLocation::default();
        let x = || Box::new(Expr::Identifier {
            name: "x".to_string(),
            location,
        });

        let cast = Expr::Cast {
            kind: CastKind::Static,
            vartype: Vartype::new(TypeId::INT),
            value: x(),
            location,
        };
        assert_eq!(cast.display(&symbols).to_string(), "static_cast<int>(x)");

        let delete = Expr::Delete {
            value: x(),
            is_array: true,
            location,
        };
        assert_eq!(delete.display(&symbols).to_string(), "delete [] x");

        let new = Expr::New {
            vartype: Vartype::new(TypeId::FLOAT),
            value: Box::new(Expr::empty(location)),
            size: Box::new(Expr::primitive(Primitive::Int(4), location)),
            location,
        };
        assert_eq!(new.display(&symbols).to_string(), "new float[4]");
    }

    #[test]
    fn test_debug_tree() {
        let symbols = SymbolTable::new();
        let tree = parse_expression("1 + x")
            .expect("parse failed")
            .debug_tree(&symbols);
        assert_eq!(
            tree,
            "|---[+] (binary)\n|   |---[1] (primitive)\n|   |---[x] (identifier)\n"
        );
    }
}
