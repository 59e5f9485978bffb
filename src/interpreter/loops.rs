// Loop statements
//
// Every iteration counts against the step budget, so `while (true) {}` ends
// with a step-limit error instead of hanging.

use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::Host;
use crate::memory::scope::{Scope, ScopeRef};
use crate::parser::ast::AstNode;

/// What a loop does after its body ran
enum Next {
    Continue,
    Exit(Flow),
}

fn after_body(flow: Flow) -> Next {
    match flow {
        Flow::Normal | Flow::Continue => Next::Continue,
        Flow::Break => Next::Exit(Flow::Normal),
        ret @ Flow::Return(_) => Next::Exit(ret),
    }
}

impl<H: Host + ?Sized> Interpreter<'_, H> {
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &[AstNode],
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        loop {
            self.tick()?;
            if !self.evaluate_expr(condition, scope)?.is_truthy() {
                return Ok(Flow::Normal);
            }
            if let Next::Exit(flow) = after_body(self.execute_branch(body, scope)?) {
                return Ok(flow);
            }
        }
    }

    pub(crate) fn execute_do_while(
        &mut self,
        body: &[AstNode],
        condition: &AstNode,
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        loop {
            self.tick()?;
            if let Next::Exit(flow) = after_body(self.execute_branch(body, scope)?) {
                return Ok(flow);
            }
            if !self.evaluate_expr(condition, scope)?.is_truthy() {
                return Ok(Flow::Normal);
            }
        }
    }

    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        // Bindings declared in the header live for the whole loop
        let loop_scope = Scope::block(scope);

        if let Some(init) = init {
            self.execute_statement(init, &loop_scope)?;
        }

        loop {
            self.tick()?;

            if let Some(condition) = condition {
                if !self.evaluate_expr(condition, &loop_scope)?.is_truthy() {
                    return Ok(Flow::Normal);
                }
            }

            if let Next::Exit(flow) = after_body(self.execute_branch(body, &loop_scope)?) {
                return Ok(flow);
            }

            if let Some(increment) = increment {
                self.evaluate_expr(increment, &loop_scope)?;
            }
        }
    }
}
