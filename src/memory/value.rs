//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! in the script interpreter, together with the conversions the language performs
//! implicitly (to string, to number, truthiness).
//!
//! # Value Types
//!
//! - [`Value::Number`]: 64-bit float, the only numeric type
//! - [`Value::Str`], [`Value::Bool`], [`Value::Null`], [`Value::Undefined`]
//! - [`Value::Array`]: shared, mutable array reference (see [`ArrayRef`])
//! - [`Value::Function`]: user-defined closure
//! - [`Value::Native`]: built-in or host-provided callable
//! - [`Value::Error`]: error object created with `new Error(..)`
//! - [`Value::Namespace`]: built-in namespace object such as `Math`

use super::array::ArrayRef;
use super::scope::ScopeRef;
use crate::parser::ast::FunctionDef;
use std::fmt;
use std::rc::Rc;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    Null,
    #[default]
    Undefined,
    Array(ArrayRef),
    Function(Closure),
    Native(Native),
    Error(Rc<ErrorObject>),
    Namespace(Namespace),
}

/// A user function together with the scope it was declared in
#[derive(Clone)]
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub scope: ScopeRef,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({})", self.def.name)
    }
}

/// Error object (`new Error("message")`)
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorObject {
    pub name: String,
    pub message: String,
}

/// Built-in namespace objects reachable from scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Math,
}

/// Callables provided by the host and by the built-in library
#[derive(Debug, Clone)]
pub enum Native {
    /// One of the visualization operations injected into the program scope
    Host(HostFn),
    Math(MathFn),
    /// `Error`, `TypeError`, `RangeError` called without `new`
    ErrorConstructor(&'static str),
    /// Array method bound to its receiver (`list.push`)
    ArrayMethod(ArrayRef, ArrayMethod),
}

/// The visualization operations a program may call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFn {
    Highlight,
    Update,
    Log,
    Delay,
}

impl HostFn {
    /// Name under which the operation is injected into the program scope
    pub fn binding_name(self) -> &'static str {
        match self {
            HostFn::Highlight => "highlightElement",
            HostFn::Update => "updateArrayData",
            HostFn::Log => "log",
            HostFn::Delay => "delay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Floor,
    Ceil,
    Round,
    Trunc,
    Abs,
    Sign,
    Sqrt,
    Pow,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayMethod {
    Push,
    Pop,
    Slice,
    IndexOf,
    Includes,
    Join,
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Get the number value, returns None if not a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    /// Truthiness as used by conditions and logical operators
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null | Value::Undefined => false,
            _ => true,
        }
    }

    /// Numeric conversion (`+value`)
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::Str(s) => string_to_number(s),
            Value::Array(array) => string_to_number(&array.join(",")),
            _ => f64::NAN,
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Undefined => "undefined",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Null | Value::Array(_) | Value::Error(_) | Value::Namespace(_) => "object",
        }
    }

    /// Strict equality (`===`)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(&a.def, &b.def),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => a == b,
            _ => false,
        }
    }

    /// Loose equality (`==`) for the primitive coercions scripts rely on
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => self.to_number() == other.to_number(),
            (Value::Array(_), Value::Str(_) | Value::Number(_)) => {
                Value::str(self.to_string()).loose_equals(other)
            }
            (Value::Str(_) | Value::Number(_), Value::Array(_)) => {
                self.loose_equals(&Value::str(other.to_string()))
            }
            _ => self.strict_equals(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Array(array) => f.write_str(&array.join(",")),
            Value::Function(closure) => {
                write!(f, "function {}() {{ [code] }}", closure.def.name)
            }
            Value::Native(_) => f.write_str("function () { [native code] }"),
            Value::Error(err) => {
                if err.message.is_empty() {
                    f.write_str(&err.name)
                } else {
                    write!(f, "{}: {}", err.name, err.message)
                }
            }
            Value::Namespace(Namespace::Math) => f.write_str("[object Math]"),
        }
    }
}

/// Format a number the way scripts print it: integers without a fraction,
/// `NaN`/`Infinity` spelled out, exponent form for very large or small values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }

    format!("{}", n)
}

/// Format a list of numbers as a compact JSON-style array: `[1,2,3]`
pub fn format_number_list(values: &[f64]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| if v.is_finite() { format_number(*v) } else { "null".to_string() })
        .collect();
    format!("[{}]", items.join(","))
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-1e19), "-10000000000000000000");
    }

    #[test]
    fn test_format_number_list_is_compact() {
        assert_eq!(format_number_list(&[9.0, 7.0, 0.5]), "[9,7,0.5]");
        assert_eq!(format_number_list(&[]), "[]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("0").is_truthy());
        assert!(Value::Array(ArrayRef::new(Vec::new())).is_truthy());
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(Value::Number(1.0).loose_equals(&Value::str("1")));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(0.0).loose_equals(&Value::Null));
        assert!(!Value::Number(1.0).strict_equals(&Value::str("1")));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::str(" 42 ").to_number(), 42.0);
        assert_eq!(Value::str("").to_number(), 0.0);
        assert!(Value::str("abc").to_number().is_nan());
        assert!(Value::Undefined.to_number().is_nan());
    }
}
