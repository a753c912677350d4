//! Expression and statement trees.

pub mod attribute;
pub mod eval;
pub mod expr;
pub mod primitive;
pub mod print;
pub mod statement;

pub use attribute::{Attribute, AttributeArg, AttributeMap};
pub use expr::{CastKind, Expr, NodeType};
pub use primitive::Primitive;
pub use statement::{ForStatement, Statement, StatementType, VariableDeclaration};
