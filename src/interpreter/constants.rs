// Constants for the script interpreter

/// Default number of statements a run may execute before it is aborted
/// (0 disables the limit)
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// Maximum nesting of user function calls
pub const MAX_CALL_DEPTH: usize = 128;

/// Largest length an array may be grown to by index or `length` writes
pub const MAX_ARRAY_LENGTH: usize = 1 << 20;

/// Names under which the visualized array is exposed to programs
pub const ARRAY_BINDINGS: [&str; 2] = ["dynamicArray", "arrayData"];
