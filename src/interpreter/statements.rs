// Declaration and conditional statements

use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::Host;
use crate::memory::scope::{self, Binding, ScopeRef};
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, DeclKind, Declarator};

impl<H: Host + ?Sized> Interpreter<'_, H> {
    /// Execute a `let`/`const`/`var` declaration list
    ///
    /// `var` binds in the nearest function scope and may be redeclared; a
    /// `var` without initializer keeps an existing value.
    pub(crate) fn execute_var_decl(
        &mut self,
        kind: DeclKind,
        declarators: &[Declarator],
        scope: &ScopeRef,
    ) -> Result<(), RuntimeError> {
        for decl in declarators {
            let value = match &decl.init {
                Some(init) => self.evaluate_expr(init, scope)?,
                None => Value::Undefined,
            };

            let result = match kind {
                DeclKind::Var => {
                    let target = scope::function_scope(scope);
                    if decl.init.is_none() && target.borrow().has_own(&decl.name) {
                        continue;
                    }
                    // Bound first so the borrow ends before `target` drops
                    let declared = target.borrow_mut().declare(
                        &decl.name,
                        Binding {
                            value,
                            is_const: false,
                            redeclarable: true,
                        },
                    );
                    declared
                }
                DeclKind::Let | DeclKind::Const => scope.borrow_mut().declare(
                    &decl.name,
                    Binding {
                        value,
                        is_const: kind.is_const(),
                        redeclarable: false,
                    },
                ),
            };

            result.map_err(|err| self.scope_error(err, &decl.name, decl.location))?;
        }
        Ok(())
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &AstNode,
        then_branch: &[AstNode],
        else_branch: Option<&[AstNode]>,
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        if self.evaluate_expr(condition, scope)?.is_truthy() {
            self.execute_branch(then_branch, scope)
        } else if let Some(else_branch) = else_branch {
            self.execute_branch(else_branch, scope)
        } else {
            Ok(Flow::Normal)
        }
    }
}
