//! OKL attributes such as `@tile(16, @outer, @inner)` or `@dim(X, Y)`.
//!
//! Attributes are attached to variables and loops by whoever builds the
//! statement tree; the transforms only read them (and strip the ones they
//! consume).

use crate::ast::expr::Expr;
use crate::diagnostics::SourceLocation;
use crate::symbols::SymbolTable;
use rustc_hash::FxHashMap;
use std::fmt;

/// Attribute name -> attribute
pub type AttributeMap = FxHashMap<String, Attribute>;

/// One positional or keyword argument.
///
/// An argument may carry attributes of its own, which is how `@tile` passes
/// attributes down to the loops it generates.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArg {
    pub value: Expr,
    pub attributes: AttributeMap,
}

impl AttributeArg {
    pub fn new(value: Expr) -> Self {
        AttributeArg {
            value,
            attributes: AttributeMap::default(),
        }
    }

    /// An argument with no value, only nested attributes (`@outer`)
    pub fn attributes_only(attributes: impl IntoIterator<Item = Attribute>, location: SourceLocation) -> Self {
        AttributeArg {
            value: Expr::Empty { location },
            attributes: attributes
                .into_iter()
                .map(|attr| (attr.name.clone(), attr))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub args: Vec<AttributeArg>,
    pub kwargs: FxHashMap<String, AttributeArg>,
    pub location: SourceLocation,
}

impl Attribute {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Attribute {
            name: name.into(),
            args: Vec::new(),
            kwargs: FxHashMap::default(),
            location,
        }
    }

    pub fn with_arg(mut self, value: Expr) -> Self {
        self.args.push(AttributeArg::new(value));
        self
    }

    pub fn with_attribute_arg(mut self, arg: AttributeArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.kwargs.insert(name.into(), AttributeArg::new(value));
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Expr> {
        self.args.get(index).map(|arg| &arg.value)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Expr> {
        self.kwargs.get(name).map(|arg| &arg.value)
    }

    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> AttributeDisplay<'a> {
        AttributeDisplay {
            attribute: self,
            symbols,
        }
    }
}

/// Adds every attribute of `from` to `into`, replacing same-named ones
pub fn merge_attributes(into: &mut AttributeMap, from: &AttributeMap) {
    for (name, attr) in from {
        into.insert(name.clone(), attr.clone());
    }
}

/// Attributes sorted by name so printing is deterministic
pub fn sorted_attributes(attributes: &AttributeMap) -> Vec<&Attribute> {
    let mut sorted: Vec<&Attribute> = attributes.values().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

pub struct AttributeDisplay<'a> {
    attribute: &'a Attribute,
    symbols: &'a SymbolTable,
}

impl AttributeDisplay<'_> {
    fn write_arg(&self, f: &mut fmt::Formatter<'_>, arg: &AttributeArg) -> fmt::Result {
        let mut parts = Vec::new();
        if !arg.value.is_empty() {
            parts.push(arg.value.display(self.symbols).to_string());
        }
        for nested in sorted_attributes(&arg.attributes) {
            parts.push(nested.display(self.symbols).to_string());
        }
        write!(f, "{}", parts.join(" "))
    }
}

impl fmt::Display for AttributeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.attribute.name)?;
        if self.attribute.args.is_empty() && self.attribute.kwargs.is_empty() {
            return Ok(());
        }

        write!(f, "(")?;
        let mut first = true;
        for arg in &self.attribute.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            self.write_arg(f, arg)?;
        }

        let mut kwargs: Vec<_> = self.attribute.kwargs.iter().collect();
        kwargs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, arg) in kwargs {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}=", name)?;
            self.write_arg(f, arg)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::primitive::Primitive;

    fn int(value: i32) -> Expr {
        Expr::Primitive {
            value: Primitive::Int(value),
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_args_and_kwargs() {
        let attr = Attribute::new("tile", SourceLocation::new(1, 1))
            .with_arg(int(16))
            .with_kwarg("check", Expr::Primitive {
                value: Primitive::Bool(false),
                location: SourceLocation::default(),
            });

        assert_eq!(attr.arg(0), Some(&int(16)));
        assert!(attr.arg(1).is_none());
        assert!(attr.kwarg("check").is_some());
        assert!(attr.kwarg("missing").is_none());
    }

    #[test]
    fn test_display_with_nested_attributes() {
        let symbols = SymbolTable::new();
        let location = SourceLocation::default();
        let attr = Attribute::new("tile", location)
            .with_arg(int(16))
            .with_attribute_arg(AttributeArg::attributes_only(
                [Attribute::new("outer", location)],
                location,
            ))
            .with_attribute_arg(AttributeArg::attributes_only(
                [Attribute::new("inner", location)],
                location,
            ))
            .with_kwarg("check", int(0));

        assert_eq!(
            attr.display(&symbols).to_string(),
            "@tile(16, @outer, @inner, check=0)"
        );
        assert_eq!(
            Attribute::new("outer", location).display(&symbols).to_string(),
            "@outer"
        );
    }

    #[test]
    fn test_merge_replaces_same_name() {
        let location = SourceLocation::default();
        let mut into = AttributeMap::default();
        into.insert("dim".to_string(), Attribute::new("dim", location).with_arg(int(1)));

        let mut from = AttributeMap::default();
        from.insert("dim".to_string(), Attribute::new("dim", location).with_arg(int(2)));
        from.insert("inner".to_string(), Attribute::new("inner", location));

        merge_attributes(&mut into, &from);
        assert_eq!(into.len(), 2);
        assert_eq!(into["dim"].arg(0), Some(&int(2)));
    }
}
