//! Binary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::Host;
use crate::memory::scope::ScopeRef;
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::cmp::Ordering;

impl<H: Host + ?Sized> Interpreter<'_, H> {
    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
        scope: &ScopeRef,
    ) -> Result<Value, RuntimeError> {
        // Short-circuiting operators yield one of their operands
        match op {
            BinOp::And => {
                let l = self.evaluate_expr(left, scope)?;
                if !l.is_truthy() {
                    return Ok(l);
                }
                self.evaluate_expr(right, scope)
            }
            BinOp::Or => {
                let l = self.evaluate_expr(left, scope)?;
                if l.is_truthy() {
                    return Ok(l);
                }
                self.evaluate_expr(right, scope)
            }
            BinOp::Nullish => {
                let l = self.evaluate_expr(left, scope)?;
                if !l.is_nullish() {
                    return Ok(l);
                }
                self.evaluate_expr(right, scope)
            }
            _ => {
                let l = self.evaluate_expr(left, scope)?;
                let r = self.evaluate_expr(right, scope)?;
                Ok(binary_values(op, &l, &r))
            }
        }
    }
}

/// Apply a binary operator to two evaluated operands
pub fn binary_values(op: BinOp, l: &Value, r: &Value) -> Value {
    use BinOp::*;

    match op {
        Add => {
            let (l, r) = (to_primitive(l), to_primitive(r));
            if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
                Value::str(format!("{}{}", l, r))
            } else {
                Value::Number(l.to_number() + r.to_number())
            }
        }
        Sub => Value::Number(l.to_number() - r.to_number()),
        Mul => Value::Number(l.to_number() * r.to_number()),
        Div => Value::Number(l.to_number() / r.to_number()),
        Mod => Value::Number(l.to_number() % r.to_number()),
        Pow => Value::Number(pow(l.to_number(), r.to_number())),

        Eq => Value::Bool(l.loose_equals(r)),
        Ne => Value::Bool(!l.loose_equals(r)),
        StrictEq => Value::Bool(l.strict_equals(r)),
        StrictNe => Value::Bool(!l.strict_equals(r)),

        Lt => Value::Bool(compare(l, r) == Some(Ordering::Less)),
        Le => Value::Bool(matches!(
            compare(l, r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        Gt => Value::Bool(compare(l, r) == Some(Ordering::Greater)),
        Ge => Value::Bool(matches!(
            compare(l, r),
            Some(Ordering::Greater | Ordering::Equal)
        )),

        And => if l.is_truthy() { r.clone() } else { l.clone() },
        Or => if l.is_truthy() { l.clone() } else { r.clone() },
        Nullish => if l.is_nullish() { r.clone() } else { l.clone() },
    }
}

/// Objects take part in `+` and comparisons through their string form
fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Str(_) | Value::Bool(_) | Value::Null | Value::Undefined => {
            value.clone()
        }
        other => Value::str(other.to_string()),
    }
}

/// Relational comparison: strings compare lexically, everything else numerically.
/// `None` when either side is NaN.
fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (to_primitive(l), to_primitive(r)) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(&b)),
        (a, b) => a.to_number().partial_cmp(&b.to_number()),
    }
}

/// `**` with the NaN cases `f64::powf` answers differently
pub(crate) fn pow(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::array::ArrayRef;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_addition_concatenates_strings() {
        assert_eq!(binary_values(BinOp::Add, &num(1.0), &num(2.0)).to_string(), "3");
        assert_eq!(binary_values(BinOp::Add, &Value::str("a"), &num(1.0)).to_string(), "a1");
        let array = Value::Array(ArrayRef::from_numbers(&[1.0, 2.0]));
        assert_eq!(binary_values(BinOp::Add, &array, &num(3.0)).to_string(), "1,23");
    }

    #[test]
    fn test_arithmetic_edge_cases() {
        assert!(binary_values(BinOp::Div, &num(1.0), &num(0.0))
            .as_number()
            .is_some_and(f64::is_infinite));
        assert_eq!(binary_values(BinOp::Mod, &num(-7.0), &num(3.0)).as_number(), Some(-1.0));
        assert_eq!(binary_values(BinOp::Pow, &num(2.0), &num(10.0)).as_number(), Some(1024.0));
        assert!(binary_values(BinOp::Pow, &num(1.0), &num(f64::NAN))
            .as_number()
            .is_some_and(f64::is_nan));
    }

    #[test]
    fn test_comparisons() {
        assert!(binary_values(BinOp::Lt, &num(1.0), &num(2.0)).is_truthy());
        assert!(binary_values(BinOp::Ge, &num(2.0), &num(2.0)).is_truthy());
        assert!(!binary_values(BinOp::Le, &num(f64::NAN), &num(2.0)).is_truthy());
        assert!(binary_values(BinOp::Lt, &Value::str("10"), &Value::str("9")).is_truthy());
        assert!(!binary_values(BinOp::Lt, &Value::str("10"), &num(9.0)).is_truthy());
    }
}
