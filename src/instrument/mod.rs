//! Source-text preparation for a run
//!
//! - [`detect`]: finds the `const name = [...]` literal that seeds the array
//! - [`rewriter`]: injects visualization calls into counted loops

pub mod detect;
pub mod rewriter;

pub use detect::{detect_array, DetectedArray, InitError};
pub use rewriter::instrument;
