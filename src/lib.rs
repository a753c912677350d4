//! # Introduction
//!
//! `okl_lang` is the expression and loop-transform core of an OKL/OCCA kernel
//! source-to-source translator. It turns expression tokens into trees with a
//! Shunting-Yard builder and rewrites annotated statements in place.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Expression builder → Expr
//! Statements (built via the API) → Transforms → Statements
//! ```
//!
//! 1. [`parser`]: tokenises expression text and builds [`ast::Expr`] trees,
//!    resolving ambiguous operators (`+x` versus `a + b`, `x++` versus `++x`)
//!    and classifying bracket pairs into calls, subscripts, casts and tuples.
//! 2. [`ast`]: the node model, constant folding and source printing.
//! 3. [`symbols`]: the table that owns types, variables, functions and
//!    scopes. Nodes refer to its entries through typed ids.
//! 4. [`transforms`]: the bottom-up rewrite framework plus the OKL passes:
//!    symbol replacement, canonical-loop recognition, `@tile` and `@dim`.
//! 5. [`diagnostics`]: located error reporting into an explicit sink.
//!
//! ## Example
//!
//! ```
//! use okl_lang::parser::parse_expression;
//! use okl_lang::symbols::SymbolTable;
//!
//! let expr = parse_expression("1 + 2 * 3").unwrap();
//! assert_eq!(expr.evaluate().as_i64(), Some(7));
//! assert_eq!(expr.display(&SymbolTable::new()).to_string(), "1 + 2 * 3");
//! ```

pub mod ast;
pub mod constants;
pub mod diagnostics;
pub mod parser;
pub mod symbols;
pub mod theme;
pub mod transforms;
