//! Runtime error types for the script interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while a program is being evaluated (including syntax errors found when the
//! instrumented text is parsed at run time).
//!
//! All runtime errors are fatal: they halt execution, and the session reports
//! [`RuntimeError::message`] in the log.

use crate::memory::value::Value;
use crate::parser::ast::SourceLocation;
use crate::parser::parser::ParseError;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The instrumented program failed to parse
    #[error("{0}")]
    Syntax(#[from] ParseError),

    /// Reference to a name that is not bound in any scope
    #[error("{name} is not defined")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    /// `let`/`const` redeclared in the same scope
    #[error("Identifier '{name}' has already been declared")]
    AlreadyDeclared {
        name: String,
        location: SourceLocation,
    },

    /// Assignment to a `const` binding
    #[error("Assignment to constant variable.")]
    ConstModification {
        name: String,
        location: SourceLocation,
    },

    /// Operation applied to a value of the wrong kind
    #[error("{message}")]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    /// Numeric argument outside its valid range
    #[error("{message}")]
    RangeError {
        message: String,
        location: SourceLocation,
    },

    /// Uncaught `throw`
    #[error("{}", thrown_message(.value))]
    Thrown {
        value: Value,
        location: SourceLocation,
    },

    /// Call nesting exceeded the configured depth
    #[error("Maximum call stack size exceeded")]
    CallStackOverflow { location: SourceLocation },

    /// Statement budget exhausted
    #[error("Execution step limit of {limit} exceeded (possible infinite loop)")]
    StepLimitExceeded {
        limit: u64,
        location: SourceLocation,
    },

    /// Frame history full
    #[error("Frame history limit of {limit} frames exceeded")]
    FrameLimitExceeded { limit: usize },

    /// The pacer could not present a state change
    #[error("Output error: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }

    /// Message shown to the user (`Error: <message>`)
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Source location where the error occurred, if known
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            RuntimeError::Syntax(err) => Some(err.location),
            RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::AlreadyDeclared { location, .. }
            | RuntimeError::ConstModification { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::RangeError { location, .. }
            | RuntimeError::Thrown { location, .. }
            | RuntimeError::CallStackOverflow { location }
            | RuntimeError::StepLimitExceeded { location, .. } => Some(*location),
            RuntimeError::FrameLimitExceeded { .. } | RuntimeError::Output { .. } => None,
        }
    }
}

/// Message of a thrown value: the `message` of error objects, the printed form otherwise
fn thrown_message(value: &Value) -> String {
    match value {
        Value::Error(err) => err.message.clone(),
        other => other.to_string(),
    }
}
