//! Assignment evaluation (plain, compound, increment/decrement targets)

use super::access::array_index;
use super::binary::binary_values;
use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::{Host, Intercepted};
use crate::memory::array::ArrayRef;
use crate::memory::scope::{self, ScopeRef};
use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::parser::parser::ParseError;

/// A resolved assignment target; object and key are evaluated once
pub(crate) enum Target {
    Variable(String),
    Element(Value, Value),
    Property(Value, String),
}

impl<H: Host + ?Sized> Interpreter<'_, H> {
    pub(crate) fn evaluate_assignment(
        &mut self,
        lhs: &AstNode,
        rhs: &AstNode,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_target(lhs, scope, location)?;
        let value = self.evaluate_expr(rhs, scope)?;
        self.store(&target, value.clone(), scope, location)?;
        Ok(value)
    }

    pub(crate) fn evaluate_compound_assignment(
        &mut self,
        lhs: &AstNode,
        op: BinOp,
        rhs: &AstNode,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_target(lhs, scope, location)?;
        let current = self.read_target(&target, scope, location)?;
        let rhs = self.evaluate_expr(rhs, scope)?;
        let value = binary_values(op, &current, &rhs);
        self.store(&target, value.clone(), scope, location)?;
        Ok(value)
    }

    pub(crate) fn resolve_target(
        &mut self,
        lhs: &AstNode,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Target, RuntimeError> {
        match lhs {
            AstNode::Variable(name, _) => Ok(Target::Variable(name.clone())),
            AstNode::Index { object, index, .. } => {
                let object = self.evaluate_expr(object, scope)?;
                let key = self.evaluate_expr(index, scope)?;
                Ok(Target::Element(object, key))
            }
            AstNode::Member { object, member, .. } => {
                let object = self.evaluate_expr(object, scope)?;
                Ok(Target::Property(object, member.clone()))
            }
            _ => Err(RuntimeError::Syntax(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location,
            })),
        }
    }

    pub(crate) fn read_target(
        &mut self,
        target: &Target,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match target {
            Target::Variable(name) => self.lookup(name, location, scope),
            Target::Element(object, key) => self.get_element(object, key, location),
            Target::Property(object, name) => self.get_property(object, name, location),
        }
    }

    pub(crate) fn store(
        &mut self,
        target: &Target,
        value: Value,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match target {
            Target::Variable(name) => scope::assign(scope, name, value)
                .map_err(|err| self.scope_error(err, name, location)),

            Target::Element(object, key) => match (object, array_index(key)) {
                (Value::Array(array), Some(index)) => {
                    if index >= MAX_ARRAY_LENGTH {
                        return Err(invalid_length(location));
                    }
                    Intercepted::new(array, &mut *self.host).set(index, value)
                }
                (Value::Array(array), None) if key.to_string() == "length" => {
                    self.set_length(array, &value, location)
                }
                _ => Err(unsupported_store(object, &key.to_string(), location)),
            },

            Target::Property(object, name) => match object {
                Value::Array(array) if name == "length" => self.set_length(array, &value, location),
                _ => Err(unsupported_store(object, name, location)),
            },
        }
    }

    fn set_length(
        &mut self,
        array: &ArrayRef,
        value: &Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let len = array_index(&Value::Number(value.to_number()))
            .filter(|len| *len <= MAX_ARRAY_LENGTH)
            .ok_or_else(|| invalid_length(location))?;
        Intercepted::new(array, &mut *self.host).set_len(len)
    }
}

fn invalid_length(location: SourceLocation) -> RuntimeError {
    RuntimeError::RangeError {
        message: "Invalid array length".to_string(),
        location,
    }
}

/// Only array elements and `length` are writable
fn unsupported_store(object: &Value, name: &str, location: SourceLocation) -> RuntimeError {
    let message = if object.is_nullish() {
        format!("Cannot set properties of {} (setting '{}')", object, name)
    } else {
        format!("Cannot assign to property '{}' of {}", name, object.type_of())
    };
    RuntimeError::type_error(message, location)
}
