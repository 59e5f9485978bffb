pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Most of these are `impl Interpreter`; `binary_values` is the pure operator table
pub use binary::binary_values;
