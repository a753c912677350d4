// Integration tests for the expression parser

use okl_lang::ast::{Expr, Primitive};
use okl_lang::diagnostics::{Diagnostics, Located};
use okl_lang::parser::operators::OpType;
use okl_lang::parser::{parse_expression, parse_expression_in, ExprError, ParseError, PairSide};
use okl_lang::symbols::{ScopeId, SymbolTable, TypeId, Vartype};

fn parse(source: &str) -> Expr {
    parse_expression(source).expect("Parsing failed")
}

fn eval(source: &str) -> Primitive {
    let expr = parse(source);
    assert!(expr.can_evaluate(), "{} should be evaluable", source);
    expr.evaluate()
}

fn expr_error(source: &str) -> ExprError {
    match parse_expression(source) {
        Err(ParseError::Expr(err)) => err,
        other => panic!("expected an expression error for {:?}, got {:?}", source, other),
    }
}

#[test]
fn test_constant_evaluation() {
    assert_eq!(eval("1 + (2 * 3)"), Primitive::Int(7));
    assert_eq!(
        eval("(1 + 2 / 3.1 * 4.4) / 1.2"),
        Primitive::Double((1.0 + 2.0 / 3.1 * 4.4) / 1.2)
    );
    assert_eq!(eval("7 / 2"), Primitive::Int(3));
    assert_eq!(eval("1 < 2 && 3 >= 3"), Primitive::Bool(true));
    assert_eq!(eval("!(1 == 1) || 0"), Primitive::Bool(false));
}

#[test]
fn test_unary_chains() {
    assert_eq!(eval("++++1"), Primitive::Int(3));
    assert_eq!(eval("1----"), Primitive::Int(1));
    assert_eq!(eval("1 ++ + ++ 2"), Primitive::Int(4));

    assert!(matches!(
        expr_error("x ++ ++ ++ y"),
        ExprError::AmbiguousOperator { .. }
    ));
}

#[test]
fn test_pair_classification() {
    let Expr::Call { value, args, .. } = parse("func(0,1,2,3,4)") else {
        panic!("expected a call");
    };
    assert!(matches!(value.as_ref(), Expr::Identifier { name, .. } if name == "func"));
    let values: Vec<Primitive> = args.iter().map(Expr::evaluate).collect();
    assert_eq!(
        values,
        (0..5).map(Primitive::Int).collect::<Vec<_>>()
    );

    let Expr::Parentheses { value, .. } = parse("(0,1,2,3,4)") else {
        panic!("expected parentheses");
    };
    assert!(value.is_op(OpType::COMMA));

    assert!(matches!(parse("{0,1,2,3,4}"), Expr::Tuple { args, .. } if args.len() == 5));
    assert!(matches!(parse("array[0 + 1]"), Expr::Subscript { .. }));
    assert!(matches!(parse("func<<<0,1>>>"), Expr::CudaCall { .. }));
}

#[test]
fn test_kernel_launch_arity() {
    assert!(matches!(
        expr_error("func<<<0>>>"),
        ExprError::MissingThreadCount { .. }
    ));
    assert!(matches!(
        expr_error("func<<<0,1,2>>>"),
        ExprError::TooManyKernelArguments { .. }
    ));
    assert!(matches!(
        expr_error("func<<<0,1,2,3>>>"),
        ExprError::TooManyKernelArguments { .. }
    ));
}

#[test]
fn test_mismatched_brackets() {
    for source in ["(0,1,2]", "[0,1,2}", "{0,1,2)"] {
        assert!(
            matches!(expr_error(source), ExprError::MismatchedPair { .. }),
            "{} should not parse",
            source
        );
    }

    let err = expr_error("(0,1,2]");
    assert!(matches!(err, ExprError::MismatchedPair { side: PairSide::Closing, .. }));
    assert_eq!(err.to_string(), "Could not find a closing ')'");
}

#[test]
fn test_ternaries() {
    let Expr::Ternary {
        check,
        on_true,
        on_false,
        ..
    } = parse("true ? 1 : 2")
    else {
        panic!("expected a ternary");
    };
    assert_eq!(check.evaluate(), Primitive::Bool(true));
    assert_eq!(on_true.evaluate(), Primitive::Int(1));
    assert_eq!(on_false.evaluate(), Primitive::Int(2));

    let expr = parse("true ? (false ? 1 : (false ? 2 : 3)) : 4");
    assert_eq!(expr.evaluate(), Primitive::Int(3));

    let Expr::Ternary {
        on_true, on_false, ..
    } = &expr
    else {
        panic!("expected a ternary");
    };
    assert_eq!(on_false.evaluate(), Primitive::Int(4));
    let Expr::Parentheses { value: inner, .. } = on_true.as_ref() else {
        panic!("expected a parenthesized ternary");
    };
    let Expr::Ternary {
        on_true: inner_true,
        on_false: inner_false,
        ..
    } = inner.as_ref()
    else {
        panic!("expected a nested ternary");
    };
    assert_eq!(inner_true.evaluate(), Primitive::Int(1));
    assert!(matches!(
        inner_false.as_ref(),
        Expr::Parentheses { value, .. } if matches!(value.as_ref(), Expr::Ternary { .. })
    ));

    assert_eq!(
        expr.display(&SymbolTable::new()).to_string(),
        "true ? (false ? 1 : (false ? 2 : 3)) : 4"
    );
}

#[test]
fn test_chained_ternaries_nest_right() {
    assert_eq!(eval("1 ? 2 : 3 ? 4 : 5"), Primitive::Int(2));
    assert_eq!(eval("false ? 1 : false ? 2 : 3"), Primitive::Int(3));
    assert_eq!(eval("true ? false ? 1 : 2 : 3"), Primitive::Int(2));

    let expr = parse("a ? b ? c : d : e");
    let Expr::Ternary { on_true, .. } = &expr else {
        panic!("expected a ternary");
    };
    assert!(matches!(on_true.as_ref(), Expr::Ternary { .. }));
    assert_eq!(
        expr.display(&SymbolTable::new()).to_string(),
        "a ? b ? c : d : e"
    );
}

#[test]
fn test_brackets_keep_their_operands() {
    for source in ["f(-)", "a(,b)", "x + (*)", "g(1, +)"] {
        assert!(
            matches!(expr_error(source), ExprError::MissingOperand { .. }),
            "{} should not parse",
            source
        );
    }
    assert!(matches!(parse("f()"), Expr::Call { args, .. } if args.is_empty()));
}

#[test]
fn test_resolved_names() {
    let mut symbols = SymbolTable::new();
    let scope = symbols.new_scope(ScopeId::GLOBAL);
    let x = symbols.declare_variable(scope, "x", Vartype::new(TypeId::INT));

    let expr = parse_expression_in("x * 2 + y", &symbols, scope).expect("Parsing failed");
    let mut variables = Vec::new();
    let mut identifiers = Vec::new();
    expr.walk(&mut |node| match node {
        Expr::Variable { id, .. } => variables.push(*id),
        Expr::Identifier { name, .. } => identifiers.push(name.clone()),
        _ => {}
    });
    assert_eq!(variables, vec![x]);
    assert_eq!(identifiers, vec!["y".to_string()]);
    assert!(!expr.can_evaluate());
    assert_eq!(expr.display(&symbols).to_string(), "x * 2 + y");

    // Not visible from the global scope
    let expr = parse_expression_in("x", &symbols, ScopeId::GLOBAL).expect("Parsing failed");
    assert!(matches!(expr, Expr::Identifier { .. }));
}

#[test]
fn test_errors_reach_diagnostics() {
    let mut diagnostics = Diagnostics::new();

    let err = parse_expression("\"abc").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
    diagnostics.report(&err);

    let err = parse_expression("a + (b").unwrap_err();
    let location = err.location();
    diagnostics.report(&err);

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.entries().len(), 2);
    assert_eq!(diagnostics.entries()[1].location, location);
    assert_eq!(
        diagnostics.messages()[1],
        "Could not find a closing ')'"
    );
}
