//! Script source parser
//!
//! This module transforms script source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! The parser accepts the small JavaScript-like language that algorithm
//! sketches are written in:
//! - Declarations: `let`, `const`, `var`, `function` / `async function`
//! - Statements: `if`/`else`, `for`, `while`, `do`-`while`, `break`, `continue`,
//!   `return`, `throw`, blocks
//! - Expressions: arithmetic, comparison, logical, ternary, calls, member and
//!   index access, array and template literals, `new Error(..)`, `await`
//! - No object literals, arrow functions, classes, regular expressions or modules
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one function per precedence level.
//! Missing semicolons are accepted before `}`, end of input, or a line break.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
