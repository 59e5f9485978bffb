//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::Host;
use crate::memory::scope::{self, ScopeRef};
use crate::memory::value::Value;
use crate::parser::ast::*;

impl<H: Host + ?Sized> Interpreter<'_, H> {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        use UnOp::*;

        match op {
            Neg => Ok(Value::Number(-self.evaluate_expr(operand, scope)?.to_number())),
            Plus => Ok(Value::Number(self.evaluate_expr(operand, scope)?.to_number())),
            Not => Ok(Value::Bool(!self.evaluate_expr(operand, scope)?.is_truthy())),
            TypeOf => self.evaluate_typeof(operand, scope),
            PreInc | PreDec | PostInc | PostDec => {
                self.evaluate_inc_dec_op(op, operand, scope, location)
            }
        }
    }

    /// `typeof` on an unbound name yields "undefined" instead of failing
    fn evaluate_typeof(
        &mut self,
        operand: &AstNode,
        scope: &ScopeRef,
    ) -> Result<Value, RuntimeError> {
        let value = match operand {
            AstNode::Variable(name, _) => scope::lookup(scope, name).unwrap_or_default(),
            _ => self.evaluate_expr(operand, scope)?,
        };
        Ok(Value::str(value.type_of()))
    }

    fn evaluate_inc_dec_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_target(operand, scope, location)?;
        let old = self.read_target(&target, scope, location)?.to_number();

        let new = match op {
            UnOp::PreInc | UnOp::PostInc => old + 1.0,
            _ => old - 1.0,
        };
        self.store(&target, Value::Number(new), scope, location)?;

        match op {
            UnOp::PreInc | UnOp::PreDec => Ok(Value::Number(new)),
            _ => Ok(Value::Number(old)),
        }
    }
}
