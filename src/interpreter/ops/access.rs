//! Element and property access

use crate::interpreter::builtins::{array_method, math_member};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::{Host, Intercepted};
use crate::memory::value::{format_number, Native, Value};
use crate::parser::ast::SourceLocation;

/// Largest valid array index (2^32 - 2)
const MAX_ARRAY_INDEX: f64 = 4_294_967_294.0;

/// Interpret a key as an array index (non-negative integer number or its string form)
pub(crate) fn array_index(key: &Value) -> Option<usize> {
    let n = match key {
        Value::Number(n) => *n,
        Value::Str(s) => {
            let n: f64 = s.parse().ok()?;
            // Only canonical forms such as "3", not "03" or "3.0"
            if format_number(n) != **s {
                return None;
            }
            n
        }
        _ => return None,
    };
    if n >= 0.0 && n.fract() == 0.0 && n <= MAX_ARRAY_INDEX {
        Some(n as usize)
    } else {
        None
    }
}

impl<H: Host + ?Sized> Interpreter<'_, H> {
    /// `target[key]`
    pub(crate) fn get_element(
        &mut self,
        target: &Value,
        key: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (target, array_index(key)) {
            (Value::Array(array), Some(index)) => Intercepted::new(array, &mut *self.host).get(index),
            (Value::Str(s), Some(index)) => Ok(s
                .chars()
                .nth(index)
                .map(|c| Value::str(c.to_string()))
                .unwrap_or_default()),
            _ => self.get_property(target, &key.to_string(), location),
        }
    }

    /// `target.name`
    pub(crate) fn get_property(
        &mut self,
        target: &Value,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = match target {
            Value::Null | Value::Undefined => {
                return Err(RuntimeError::type_error(
                    format!("Cannot read properties of {} (reading '{}')", target, name),
                    location,
                ))
            }
            Value::Array(array) => match name {
                "length" => Value::Number(array.len() as f64),
                _ => array_method(name)
                    .map(|method| Value::Native(Native::ArrayMethod(array.clone(), method)))
                    .unwrap_or_default(),
            },
            Value::Str(s) => match name {
                "length" => Value::Number(s.chars().count() as f64),
                _ => Value::Undefined,
            },
            Value::Namespace(_) => math_member(name),
            Value::Error(err) => match name {
                "message" => Value::str(err.message.as_str()),
                "name" => Value::str(err.name.as_str()),
                _ => Value::Undefined,
            },
            _ => Value::Undefined,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_index() {
        assert_eq!(array_index(&Value::Number(3.0)), Some(3));
        assert_eq!(array_index(&Value::str("12")), Some(12));
        assert_eq!(array_index(&Value::str("03")), None);
        assert_eq!(array_index(&Value::Number(-1.0)), None);
        assert_eq!(array_index(&Value::Number(1.5)), None);
        assert_eq!(array_index(&Value::str("length")), None);
    }
}
