//! Symbol substitution over statements and expressions.
//!
//! Swaps every use of one type, variable or function for another of the
//! same kind. Tiling uses it to move a loop header onto the block iterator.

use super::{
    apply_expr_transform, apply_statement_transform, ExprTransform, Rewrite, StatementTransform,
    TransformError,
};
use crate::ast::expr::{Expr, NodeType};
use crate::ast::statement::{Statement, StatementType};
use crate::symbols::{FuncId, ScopeId, Symbol, TypeId, VarId, Vartype};

/// Replaces `from` with `to` wherever it appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolReplacer {
    from: Symbol,
    to: Symbol,
}

impl SymbolReplacer {
    pub fn new(from: Symbol, to: Symbol) -> Self {
        SymbolReplacer { from, to }
    }

    fn replace_vartype(&self, vartype: &mut Vartype) {
        if let (Symbol::Type(from), Symbol::Type(to)) = (self.from, self.to) {
            if vartype.base == from {
                vartype.base = to;
            }
        }
    }
}

impl StatementTransform for SymbolReplacer {
    fn valid_statement_types(&self) -> StatementType {
        StatementType::EXPRESSION | StatementType::DECLARATION | StatementType::RETURN
    }

    fn transform_statement(
        &mut self,
        statement: &mut Statement,
        _scope: ScopeId,
    ) -> Result<Rewrite<Statement>, TransformError> {
        if let (Statement::Declaration { declarations, .. }, Symbol::Variable(from), Symbol::Variable(to)) =
            (&mut *statement, self.from, self.to)
        {
            for decl in declarations.iter_mut().filter(|decl| decl.variable == from) {
                decl.variable = to;
            }
        }

        for expr in statement.exprs_mut() {
            apply_expr_transform(self, expr)?;
        }
        Ok(Rewrite::Keep)
    }
}

impl ExprTransform for SymbolReplacer {
    fn valid_expr_types(&self) -> NodeType {
        match self.from {
            Symbol::Variable(_) => NodeType::VARIABLE,
            Symbol::Function(_) => NodeType::FUNCTION,
            Symbol::Type(_) => {
                NodeType::TYPE | NodeType::VARTYPE | NodeType::CAST | NodeType::NEW
            }
        }
    }

    fn transform_expr(&mut self, expr: &mut Expr) -> Result<Rewrite<Expr>, TransformError> {
        let location = expr.location();
        let rewrite = match (expr, self.from, self.to) {
            (Expr::Variable { id, .. }, Symbol::Variable(from), Symbol::Variable(to)) if *id == from => {
                Rewrite::Replace(Expr::Variable { id: to, location })
            }
            (Expr::Function { id, .. }, Symbol::Function(from), Symbol::Function(to)) if *id == from => {
                Rewrite::Replace(Expr::Function { id: to, location })
            }
            (Expr::Type { id, .. }, Symbol::Type(from), Symbol::Type(to)) if *id == from => {
                Rewrite::Replace(Expr::Type { id: to, location })
            }
            (Expr::Vartype { vartype, .. }, ..)
            | (Expr::Cast { vartype, .. }, ..)
            | (Expr::New { vartype, .. }, ..) => {
                self.replace_vartype(vartype);
                Rewrite::Keep
            }
            _ => Rewrite::Keep,
        };
        Ok(rewrite)
    }
}

fn replace_in_statement(
    statement: &mut Statement,
    from: Symbol,
    to: Symbol,
) -> Result<(), TransformError> {
    let mut replacer = SymbolReplacer::new(from, to);
    let scope = statement.scope().unwrap_or(ScopeId::GLOBAL);
    apply_statement_transform(&mut replacer, statement, scope)
}

fn replace_in_expr(expr: &mut Expr, from: Symbol, to: Symbol) -> Result<(), TransformError> {
    apply_expr_transform(&mut SymbolReplacer::new(from, to), expr)
}

pub fn replace_types(statement: &mut Statement, from: TypeId, to: TypeId) -> Result<(), TransformError> {
    replace_in_statement(statement, Symbol::Type(from), Symbol::Type(to))
}

pub fn replace_variables(statement: &mut Statement, from: VarId, to: VarId) -> Result<(), TransformError> {
    replace_in_statement(statement, Symbol::Variable(from), Symbol::Variable(to))
}

pub fn replace_functions(statement: &mut Statement, from: FuncId, to: FuncId) -> Result<(), TransformError> {
    replace_in_statement(statement, Symbol::Function(from), Symbol::Function(to))
}

pub fn replace_types_in_expr(expr: &mut Expr, from: TypeId, to: TypeId) -> Result<(), TransformError> {
    replace_in_expr(expr, Symbol::Type(from), Symbol::Type(to))
}

pub fn replace_variables_in_expr(expr: &mut Expr, from: VarId, to: VarId) -> Result<(), TransformError> {
    replace_in_expr(expr, Symbol::Variable(from), Symbol::Variable(to))
}

pub fn replace_functions_in_expr(expr: &mut Expr, from: FuncId, to: FuncId) -> Result<(), TransformError> {
    replace_in_expr(expr, Symbol::Function(from), Symbol::Function(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::statement::ForStatement;
    use crate::diagnostics::SourceLocation;
    use crate::parser::parse_expression_in;
    use crate::symbols::{Function, SymbolTable, TypeKind};

    #[test]
    fn test_replace_variables_in_loop_header() {
        let mut symbols = SymbolTable::new();
        let scope = symbols.new_scope(ScopeId::GLOBAL);
        let i = symbols.declare_variable(scope, "i", Vartype::new(TypeId::INT));
        let j = symbols.declare_variable(scope, "j", Vartype::new(TypeId::INT));
        let parse = |source: &str| parse_expression_in(source, &symbols, scope).unwrap();

        let mut statement = Statement::For(ForStatement::new(
            scope,
            Statement::declaration(i, Some(parse("0")), SourceLocation::default()),
            Statement::expression(parse("i < 10")),
            Statement::expression(parse("i += i")),
            SourceLocation::default(),
        ));
        replace_variables(&mut statement, i, j).unwrap();

        assert_eq!(
            statement.display(&symbols).to_string(),
            "for (int j = 0; j < 10; j += j) {\n}"
        );
    }

    #[test]
    fn test_replace_types_and_functions_in_expr() {
        let mut symbols = SymbolTable::new();
        let scope = ScopeId::GLOBAL;
        let real = symbols.add_type(scope, "real", TypeKind::Double);
        let f = symbols.add_function(
            scope,
            Function {
                name: "f".to_string(),
                return_type: Vartype::new(TypeId::VOID),
                location: SourceLocation::default(),
            },
        );
        let g = symbols.add_function(
            scope,
            Function {
                name: "g".to_string(),
                return_type: Vartype::new(TypeId::VOID),
                location: SourceLocation::default(),
            },
        );

        let mut expr = parse_expression_in("f((float*) p, sizeof(float))", &symbols, scope).unwrap();
        replace_types_in_expr(&mut expr, TypeId::FLOAT, real).unwrap();
        replace_functions_in_expr(&mut expr, f, g).unwrap();

        assert_eq!(
            expr.display(&symbols).to_string(),
            "g((real*) p, sizeof(real))"
        );
    }

    #[test]
    fn test_unrelated_symbols_are_kept() {
        let mut symbols = SymbolTable::new();
        let a = symbols.declare_variable(ScopeId::GLOBAL, "a", Vartype::new(TypeId::INT));
        let b = symbols.declare_variable(ScopeId::GLOBAL, "b", Vartype::new(TypeId::INT));
        let c = symbols.declare_variable(ScopeId::GLOBAL, "c", Vartype::new(TypeId::INT));

        let mut expr = parse_expression_in("a * b", &symbols, ScopeId::GLOBAL).unwrap();
        replace_variables_in_expr(&mut expr, c, a).unwrap();
        assert_eq!(expr.display(&symbols).to_string(), "a * b");
        replace_variables_in_expr(&mut expr, a, c).unwrap();
        assert_eq!(expr.display(&symbols).to_string(), "c * b");
    }
}
