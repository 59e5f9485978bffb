//! Runtime memory model for the script interpreter
//!
//! - [`value`]: runtime values and the implicit conversions between them
//! - [`array`]: shared array buffers with optional access interception
//! - [`scope`]: lexical scope chain and bindings

pub mod array;
pub mod scope;
pub mod value;
