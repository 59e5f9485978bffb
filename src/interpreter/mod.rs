//! Script interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: main interpreter with AST execution
//! - [`errors`]: runtime error types
//! - [`host`]: the capability seam between programs and the visualizer
//! - [`builtins`]: `Math`, error constructors, array methods, host dispatch
//!
//! # Execution Model
//!
//! The interpreter walks the AST and executes statements one at a time. A
//! program runs in a function scope whose parent holds only the injected
//! bindings (`dynamicArray`/`arrayData`, `highlightElement`, `updateArrayData`,
//! `log`, `delay`) and the pure built-ins. There is no other way to reach the
//! outside world.
//!
//! `await` evaluates its operand directly: every host operation has finished
//! its pause by the time it returns.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod host;
mod loops;
pub mod ops;
mod statements;

pub use engine::Interpreter;
pub use errors::RuntimeError;
pub use host::Host;

use crate::parser::parser::Parser;

/// Parse `source` and run it against `host` with an intercepted copy of `buffer`
pub fn execute<H: Host + ?Sized>(
    source: &str,
    host: &mut H,
    buffer: &[f64],
    step_limit: u64,
) -> Result<(), RuntimeError> {
    let program = Parser::new(source)?.parse_program()?;
    Interpreter::new(host, buffer)
        .with_step_limit(step_limit)
        .run(&program)
}
