//! Types, variables, functions and the scopes that name them.
//!
//! Expression nodes never own symbols. A `variable` node holds a [`VarId`],
//! a `type` node a [`TypeId`], and so on; the [`SymbolTable`] owns the
//! entries and must outlive every tree built over it. Scopes form a tree via
//! parent links and are addressed by [`ScopeId`], so a statement can carry
//! its scope without borrowing the table.

use crate::ast::attribute::AttributeMap;
use crate::ast::expr::Expr;
use crate::diagnostics::SourceLocation;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The root scope every table starts with
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// Kinds of types the transforms care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Struct,
}

impl TypeKind {
    /// Types a canonical loop iterator may have
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKind::Char | TypeKind::Short | TypeKind::Int | TypeKind::Long
        )
    }
}

/// Builtin types, registered in this order so their ids are fixed
pub const BUILTIN_TYPES: [(&str, TypeKind); 8] = [
    ("void", TypeKind::Void),
    ("bool", TypeKind::Bool),
    ("char", TypeKind::Char),
    ("short", TypeKind::Short),
    ("int", TypeKind::Int),
    ("long", TypeKind::Long),
    ("float", TypeKind::Float),
    ("double", TypeKind::Double),
];

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    pub const SHORT: TypeId = TypeId(3);
    pub const INT: TypeId = TypeId(4);
    pub const LONG: TypeId = TypeId(5);
    pub const FLOAT: TypeId = TypeId(6);
    pub const DOUBLE: TypeId = TypeId(7);

    /// Id of a builtin type keyword
    pub fn builtin(name: &str) -> Option<TypeId> {
        BUILTIN_TYPES
            .iter()
            .position(|(builtin, _)| *builtin == name)
            .map(|index| TypeId(index as u32))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
}

/// A type as used by a declaration: base type plus qualifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vartype {
    pub base: TypeId,
    pub is_const: bool,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
}

impl Vartype {
    pub fn new(base: TypeId) -> Self {
        Vartype {
            base,
            is_const: false,
            pointer_depth: 0,
        }
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub vartype: Vartype,
    pub attributes: AttributeMap,
    pub location: SourceLocation,
}

impl Variable {
    pub fn new(name: impl Into<String>, vartype: Vartype, location: SourceLocation) -> Self {
        Variable {
            name: name.into(),
            vartype,
            attributes: AttributeMap::default(),
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: Vartype,
    pub location: SourceLocation,
}

/// What a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Type(TypeId),
    Variable(VarId),
    Function(FuncId),
}

#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<ScopeId>,
    names: FxHashMap<String, Symbol>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    types: Vec<TypeDef>,
    variables: Vec<Variable>,
    functions: Vec<Function>,
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding the global scope and the builtin types.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            types: Vec::new(),
            variables: Vec::new(),
            functions: Vec::new(),
            scopes: vec![Scope::default()],
        };
        for (name, kind) in BUILTIN_TYPES {
            table.add_type(ScopeId::GLOBAL, name, kind);
        }
        table
    }

    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            names: FxHashMap::default(),
        });
        ScopeId(self.scopes.len() as u32 - 1)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    /// Moves `scope` under a new parent; used when a statement is nested
    /// inside a freshly generated one
    pub fn set_parent(&mut self, scope: ScopeId, parent: Option<ScopeId>) {
        self.scopes[scope.0 as usize].parent = parent;
    }

    pub fn add_type(&mut self, scope: ScopeId, name: &str, kind: TypeKind) -> TypeId {
        self.types.push(TypeDef {
            name: name.to_string(),
            kind,
        });
        let id = TypeId(self.types.len() as u32 - 1);
        self.declare(scope, name, Symbol::Type(id));
        id
    }

    pub fn add_variable(&mut self, scope: ScopeId, variable: Variable) -> VarId {
        let name = variable.name.clone();
        self.variables.push(variable);
        let id = VarId(self.variables.len() as u32 - 1);
        self.declare(scope, &name, Symbol::Variable(id));
        id
    }

    /// Shorthand for [`SymbolTable::add_variable`] without a location
    pub fn declare_variable(&mut self, scope: ScopeId, name: &str, vartype: Vartype) -> VarId {
        self.add_variable(scope, Variable::new(name, vartype, SourceLocation::default()))
    }

    pub fn add_function(&mut self, scope: ScopeId, function: Function) -> FuncId {
        let name = function.name.clone();
        self.functions.push(function);
        let id = FuncId(self.functions.len() as u32 - 1);
        self.declare(scope, &name, Symbol::Function(id));
        id
    }

    /// Binds `name` in `scope`, shadowing any outer binding
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: Symbol) {
        self.scopes[scope.0 as usize]
            .names
            .insert(name.to_string(), symbol);
    }

    /// Resolves `name` from `scope` outwards
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(symbol) = scope.names.get(name) {
                return Some(*symbol);
            }
            current = scope.parent;
        }
        None
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        self.scopes[scope.0 as usize].names.get(name).copied()
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0 as usize]
    }

    pub fn variable_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.variables[id.0 as usize]
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    /// Copies a variable under a new name. The copy is not declared in any
    /// scope; callers register it with [`SymbolTable::declare`].
    pub fn clone_variable(&mut self, id: VarId, name: &str) -> VarId {
        let mut variable = self.variable(id).clone();
        variable.name = name.to_string();
        self.variables.push(variable);
        VarId(self.variables.len() as u32 - 1)
    }

    /// Source spelling of a vartype, e.g. `const float*`
    pub fn vartype_name(&self, vartype: &Vartype) -> String {
        let mut name = String::new();
        if vartype.is_const {
            name.push_str("const ");
        }
        name.push_str(&self.type_def(vartype.base).name);
        for _ in 0..vartype.pointer_depth {
            name.push('*');
        }
        name
    }

    /// Replaces identifier nodes that name a symbol visible from `scope`
    /// with the matching variable, function or type node. Returns how many
    /// nodes were resolved.
    pub fn resolve_identifiers(&self, expr: &mut Expr, scope: ScopeId) -> usize {
        if let Expr::Identifier { name, location } = expr {
            let location = *location;
            let resolved = match self.lookup(scope, name.as_str()) {
                Some(Symbol::Variable(id)) => Expr::Variable { id, location },
                Some(Symbol::Function(id)) => Expr::Function { id, location },
                Some(Symbol::Type(id)) => Expr::Type { id, location },
                None => return 0,
            };
            *expr = resolved;
            return 1;
        }

        expr.children_mut()
            .into_iter()
            .map(|child| self.resolve_identifiers(child, scope))
            .sum()
    }
}
