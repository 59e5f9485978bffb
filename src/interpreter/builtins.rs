//! Built-in callables
//!
//! Programs see three kinds of native functions:
//! - the host operations `highlightElement`, `updateArrayData`, `log`, `delay`
//! - the pure library: `Math.*` and the `Error`/`TypeError`/`RangeError` constructors
//! - array methods `push`, `pop`, `slice`, `indexOf`, `includes`, `join`
//!
//! Nothing here reaches outside the interpreter except through the [`Host`].

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::{Host, Intercepted};
use crate::interpreter::ops::binary::pow;
use crate::memory::array::ArrayRef;
use crate::memory::scope::{self, ScopeRef};
use crate::memory::value::{ArrayMethod, ErrorObject, HostFn, MathFn, Native, Value};
use crate::parser::ast::{AstNode, SourceLocation};
use std::rc::Rc;

/// Look up an array method by property name
pub(crate) fn array_method(name: &str) -> Option<ArrayMethod> {
    let method = match name {
        "push" => ArrayMethod::Push,
        "pop" => ArrayMethod::Pop,
        "slice" => ArrayMethod::Slice,
        "indexOf" => ArrayMethod::IndexOf,
        "includes" => ArrayMethod::Includes,
        "join" => ArrayMethod::Join,
        _ => return None,
    };
    Some(method)
}

/// Property of the `Math` namespace
pub(crate) fn math_member(name: &str) -> Value {
    let function = match name {
        "PI" => return Value::Number(std::f64::consts::PI),
        "E" => return Value::Number(std::f64::consts::E),
        "floor" => MathFn::Floor,
        "ceil" => MathFn::Ceil,
        "round" => MathFn::Round,
        "trunc" => MathFn::Trunc,
        "abs" => MathFn::Abs,
        "sign" => MathFn::Sign,
        "sqrt" => MathFn::Sqrt,
        "pow" => MathFn::Pow,
        "min" => MathFn::Min,
        "max" => MathFn::Max,
        _ => return Value::Undefined,
    };
    Value::Native(Native::Math(function))
}

fn make_error(name: &str, message: Option<&Value>) -> Value {
    let message = match message {
        None | Some(Value::Undefined) => String::new(),
        Some(value) => value.to_string(),
    };
    Value::Error(Rc::new(ErrorObject {
        name: name.to_string(),
        message,
    }))
}

fn call_math(function: MathFn, args: &[Value]) -> f64 {
    let arg = |i: usize| args.get(i).map_or(f64::NAN, Value::to_number);

    match function {
        MathFn::Floor => arg(0).floor(),
        MathFn::Ceil => arg(0).ceil(),
        // Halves round towards +Infinity
        MathFn::Round => {
            let x = arg(0);
            if x.is_finite() { (x + 0.5).floor() } else { x }
        }
        MathFn::Trunc => arg(0).trunc(),
        MathFn::Abs => arg(0).abs(),
        MathFn::Sign => {
            let x = arg(0);
            if x == 0.0 || x.is_nan() { x } else { x.signum() }
        }
        MathFn::Sqrt => arg(0).sqrt(),
        MathFn::Pow => pow(arg(0), arg(1)),
        MathFn::Min => args.iter().map(Value::to_number).fold(f64::INFINITY, |acc, x| {
            if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.min(x) }
        }),
        MathFn::Max => args.iter().map(Value::to_number).fold(f64::NEG_INFINITY, |acc, x| {
            if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.max(x) }
        }),
    }
}

/// Resolve `start`/`end` arguments of `slice` against `len`
fn relative_index(arg: Option<&Value>, len: usize, default: usize) -> usize {
    match arg {
        None | Some(Value::Undefined) => default,
        Some(value) => {
            let n = value.to_number();
            let n = if n.is_nan() { 0.0 } else { n.trunc() };
            if n < 0.0 {
                (len as f64 + n).max(0.0) as usize
            } else {
                n.min(len as f64) as usize
            }
        }
    }
}

impl<H: Host + ?Sized> Interpreter<'_, H> {
    pub(crate) fn call_native(
        &mut self,
        native: &Native,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match native {
            Native::Host(op) => {
                self.call_host(*op, &args, location)?;
                Ok(Value::Undefined)
            }
            Native::Math(function) => Ok(Value::Number(call_math(*function, &args))),
            Native::ErrorConstructor(name) => Ok(make_error(name, args.first())),
            Native::ArrayMethod(array, method) => self.call_array_method(array, *method, args),
        }
    }

    fn call_host(
        &mut self,
        op: HostFn,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let first = args.first().cloned().unwrap_or_default();

        match op {
            HostFn::Highlight => self.host.highlight(&first),
            HostFn::Update => match &first {
                Value::Array(array) => {
                    let values = array.to_vec();
                    self.host.update(&values)
                }
                other => Err(RuntimeError::type_error(
                    format!("{} is not iterable", other),
                    location,
                )),
            },
            HostFn::Log => self.host.log(&first.to_string()),
            HostFn::Delay => self.host.delay(first.to_number()),
        }
    }

    fn call_array_method(
        &mut self,
        array: &ArrayRef,
        method: ArrayMethod,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let value = match method {
            ArrayMethod::Push => {
                let len = Intercepted::new(array, &mut *self.host).push(args)?;
                Value::Number(len as f64)
            }
            ArrayMethod::Pop => Intercepted::new(array, &mut *self.host).pop()?,
            ArrayMethod::Slice => {
                let len = array.len();
                let start = relative_index(args.first(), len, 0);
                let end = relative_index(args.get(1), len, len);
                let items = array.items();
                let slice = if start < end { items[start..end].to_vec() } else { Vec::new() };
                Value::Array(ArrayRef::new(slice))
            }
            ArrayMethod::IndexOf => {
                let needle = args.first().cloned().unwrap_or_default();
                let start = relative_index(args.get(1), array.len(), 0);
                let position = array
                    .items()
                    .iter()
                    .skip(start)
                    .position(|item| item.strict_equals(&needle))
                    .map_or(-1.0, |i| (i + start) as f64);
                Value::Number(position)
            }
            ArrayMethod::Includes => {
                let needle = args.first().cloned().unwrap_or_default();
                // Unlike indexOf, includes finds NaN
                let found = array.items().iter().any(|item| match (item, &needle) {
                    (Value::Number(a), Value::Number(b)) if a.is_nan() => b.is_nan(),
                    _ => item.strict_equals(&needle),
                });
                Value::Bool(found)
            }
            ArrayMethod::Join => {
                let separator = match args.first() {
                    None | Some(Value::Undefined) => ",".to_string(),
                    Some(value) => value.to_string(),
                };
                Value::str(array.join(&separator))
            }
        };
        Ok(value)
    }

    /// `new Name(args)`: only the error constructors can be instantiated
    pub(crate) fn evaluate_new(
        &mut self,
        constructor: &str,
        args: &[AstNode],
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let target = scope::lookup(scope, constructor).ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                name: constructor.to_string(),
                location,
            }
        })?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg, scope)?);
        }

        match target {
            Value::Native(Native::ErrorConstructor(name)) => Ok(make_error(name, values.first())),
            _ => Err(RuntimeError::type_error(
                format!("{} is not a constructor", constructor),
                location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    #[test]
    fn test_math_functions() {
        assert_eq!(call_math(MathFn::Floor, &nums(&[2.7])), 2.0);
        assert_eq!(call_math(MathFn::Round, &nums(&[2.5])), 3.0);
        assert_eq!(call_math(MathFn::Round, &nums(&[-2.5])), -2.0);
        assert_eq!(call_math(MathFn::Max, &nums(&[1.0, 9.0, 3.0])), 9.0);
        assert_eq!(call_math(MathFn::Min, &[]), f64::INFINITY);
        assert!(call_math(MathFn::Max, &nums(&[1.0, f64::NAN])).is_nan());
        assert_eq!(call_math(MathFn::Sign, &nums(&[-4.0])), -1.0);
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(None, 5, 0), 0);
        assert_eq!(relative_index(Some(&Value::Number(-2.0)), 5, 0), 3);
        assert_eq!(relative_index(Some(&Value::Number(9.0)), 5, 0), 5);
        assert_eq!(relative_index(Some(&Value::Number(-9.0)), 5, 0), 0);
    }

    #[test]
    fn test_error_constructor_message() {
        match make_error("RangeError", Some(&Value::str("bad"))) {
            Value::Error(err) => {
                assert_eq!(err.name, "RangeError");
                assert_eq!(err.message, "bad");
            }
            other => panic!("expected error object, got {:?}", other),
        }
    }
}
