//! # Introduction
//!
//! algovis runs small array algorithms written in a JavaScript-like script
//! language and animates what they do to an array: which element is being
//! looked at, how the array changes, and what the program logs. A run is
//! shown in a terminal UI built with [ratatui](https://docs.rs/ratatui), or
//! printed step by step in headless mode.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → array detection → loop rewriting → Lexer → Parser → Interpreter
//!        → Host calls → VisualState → Pacer (frames / console / nothing)
//! ```
//!
//! 1. [`instrument`]: finds the `const name = [..]` literal that seeds the
//!    array, and rewrites counted `for` loops to highlight, pause and publish
//!    the array on every iteration.
//! 2. [`parser`]: tokenises the source and builds an AST.
//! 3. [`interpreter`]: walks the AST. Programs see only a fixed set of
//!    capabilities (the array, `highlightElement`, `updateArrayData`, `log`,
//!    `delay`, `Math`, error constructors), all reached through [`interpreter::Host`].
//! 4. [`memory`]: runtime values, shared arrays and lexical scopes.
//! 5. [`visual`]: the array buffer, highlight and log, plus the [`visual::Session`]
//!    that owns a run from initialization to its final log line.
//! 6. [`snapshot`]: frames recorded during a run and the playback cursor over them.
//! 7. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported script subset
//!
//! Declarations: `const`, `let`, `var`, `function` / `async function`.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `break`, `continue`,
//! `return`, `throw`. Expressions: arithmetic, comparison, logical and
//! conditional operators, `typeof`, `new Error(..)`, array literals, indexing,
//! `.length`, `push`/`pop`/`slice`/`indexOf`/`includes`/`join`, closures.
//! `await` evaluates its operand in place.

pub mod config;
pub mod instrument;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod parser;
pub mod samples;
pub mod snapshot;
pub mod ui;
pub mod visual;
