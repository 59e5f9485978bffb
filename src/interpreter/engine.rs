// Execution engine for the script interpreter

use crate::interpreter::constants::{ARRAY_BINDINGS, DEFAULT_STEP_LIMIT, MAX_CALL_DEPTH};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::host::Host;
use crate::memory::array::ArrayRef;
use crate::memory::scope::{self, Scope, ScopeError, ScopeRef};
use crate::memory::value::{Closure, HostFn, Namespace, Native, Value};
use crate::parser::ast::*;
use crate::parser::parser::ParseError;
use std::rc::Rc;
use tracing::debug;

/// How a statement finished
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Walks a parsed program against a [`Host`]
///
/// The program only sees the bindings installed by [`Interpreter::new`]: the
/// intercepted array, the host operations and the pure built-ins.
pub struct Interpreter<'h, H: Host + ?Sized> {
    /// Receiver of the visualization operations
    pub(crate) host: &'h mut H,

    /// Capability scope: parent of the program scope
    globals: ScopeRef,

    /// Statements executed so far
    steps: u64,

    /// Maximum statements per run (0 = unlimited)
    step_limit: u64,

    /// Current nesting of user function calls
    call_depth: usize,

    /// Current source location being executed
    pub(crate) current_location: SourceLocation,
}

impl<'h, H: Host + ?Sized> Interpreter<'h, H> {
    /// Create an interpreter whose program sees an intercepted copy of `buffer`
    pub fn new(host: &'h mut H, buffer: &[f64]) -> Self {
        let globals = Scope::root();
        {
            let mut g = globals.borrow_mut();

            let array = ArrayRef::intercepted(buffer.iter().copied().map(Value::Number).collect());
            for name in ARRAY_BINDINGS {
                g.define(name, Value::Array(array.clone()));
            }

            for op in [HostFn::Highlight, HostFn::Update, HostFn::Log, HostFn::Delay] {
                g.define(op.binding_name(), Value::Native(Native::Host(op)));
            }

            g.define("Math", Value::Namespace(Namespace::Math));
            for name in ["Error", "TypeError", "RangeError"] {
                g.define(name, Value::Native(Native::ErrorConstructor(name)));
            }
            g.define("NaN", Value::Number(f64::NAN));
            g.define("Infinity", Value::Number(f64::INFINITY));
        }

        Interpreter {
            host,
            globals,
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
            call_depth: 0,
            current_location: SourceLocation::new(1, 1),
        }
    }

    /// Set the statement budget (0 = unlimited)
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    /// Number of statements executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The intercepted array as currently seen by the program
    pub fn array(&self) -> Option<ArrayRef> {
        scope::lookup(&self.globals, ARRAY_BINDINGS[0]).and_then(|v| v.as_array().cloned())
    }

    /// Run the program from start to finish
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let program_scope = Scope::function(&self.globals);

        let result = self.execute_body(&program.nodes, &program_scope);

        // Break cycles between the program scope and closures declared in it
        program_scope.borrow_mut().clear();

        let flow = result?;
        self.finish_body(flow, program.nodes.last().map(AstNode::location))?;
        debug!(steps = self.steps, "program finished");
        Ok(())
    }

    /// Execute a statement list in `scope`, hoisting function declarations first
    pub(crate) fn execute_body(
        &mut self,
        body: &[AstNode],
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        for node in body {
            if let AstNode::FunctionDecl(def) = node {
                let closure = Closure {
                    def: Rc::clone(def),
                    scope: Rc::clone(scope),
                };
                scope
                    .borrow_mut()
                    .define(&def.name, Value::Function(closure));
            }
        }

        for stmt in body {
            let flow = self.execute_statement(stmt, scope)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute a nested statement list in a fresh block scope
    pub(crate) fn execute_branch(
        &mut self,
        body: &[AstNode],
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        let inner = Scope::block(scope);
        self.execute_body(body, &inner)
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(
        &mut self,
        stmt: &AstNode,
        scope: &ScopeRef,
    ) -> Result<Flow, RuntimeError> {
        self.current_location = stmt.location();
        self.tick()?;

        match stmt {
            // Hoisted by execute_body
            AstNode::FunctionDecl(_) | AstNode::Empty { .. } => Ok(Flow::Normal),

            AstNode::VarDecl {
                kind, declarators, ..
            } => {
                self.execute_var_decl(*kind, declarators, scope)?;
                Ok(Flow::Normal)
            }

            AstNode::Block { body, .. } => self.execute_branch(body, scope),

            AstNode::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.evaluate_expr(expr, scope)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(condition, then_branch, else_branch.as_deref(), scope),

            AstNode::While {
                condition, body, ..
            } => self.execute_while(condition, body, scope),

            AstNode::DoWhile {
                body, condition, ..
            } => self.execute_do_while(body, condition, scope),

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                increment.as_deref(),
                body,
                scope,
            ),

            AstNode::Break { .. } => Ok(Flow::Break),
            AstNode::Continue { .. } => Ok(Flow::Continue),

            AstNode::Throw { expr, location } => {
                let value = self.evaluate_expr(expr, scope)?;
                Err(RuntimeError::Thrown {
                    value,
                    location: *location,
                })
            }

            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr, scope)?;
                Ok(Flow::Normal)
            }

            // Bare expressions (e.g. a `for` initializer)
            expr => {
                self.evaluate_expr(expr, scope)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(
        &mut self,
        expr: &AstNode,
        scope: &ScopeRef,
    ) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::NumberLiteral(n, _) => Ok(Value::Number(*n)),
            AstNode::StringLiteral(s, _) => Ok(Value::str(s.as_str())),
            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            AstNode::Null { .. } => Ok(Value::Null),
            AstNode::Undefined { .. } => Ok(Value::Undefined),

            AstNode::TemplateLiteral(parts, _) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(expr) => {
                            out.push_str(&self.evaluate_expr(expr, scope)?.to_string())
                        }
                    }
                }
                Ok(Value::str(out))
            }

            AstNode::ArrayLiteral { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate_expr(element, scope)?);
                }
                Ok(Value::Array(ArrayRef::new(items)))
            }

            AstNode::Variable(name, loc) => self.lookup(name, *loc, scope),

            AstNode::Assignment { lhs, rhs, location } => {
                self.evaluate_assignment(lhs, rhs, scope, *location)
            }

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => self.evaluate_compound_assignment(lhs, *op, rhs, scope, *location),

            AstNode::BinaryOp {
                op, left, right, ..
            } => self.evaluate_binary_op(*op, left, right, scope),

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary_op(*op, operand, scope, *location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.evaluate_expr(condition, scope)?.is_truthy() {
                    self.evaluate_expr(true_expr, scope)
                } else {
                    self.evaluate_expr(false_expr, scope)
                }
            }

            AstNode::Call {
                callee,
                args,
                location,
            } => self.evaluate_call(callee, args, scope, *location),

            AstNode::New {
                constructor,
                args,
                location,
            } => self.evaluate_new(constructor, args, scope, *location),

            AstNode::Index {
                object,
                index,
                location,
            } => {
                let target = self.evaluate_expr(object, scope)?;
                let key = self.evaluate_expr(index, scope)?;
                self.get_element(&target, &key, *location)
            }

            AstNode::Member {
                object,
                member,
                location,
            } => {
                let target = self.evaluate_expr(object, scope)?;
                self.get_property(&target, member, *location)
            }

            // Every host operation finishes its pause before returning
            AstNode::Await { expr, .. } => self.evaluate_expr(expr, scope),

            other => Err(RuntimeError::type_error(
                "Unexpected statement in expression position",
                other.location(),
            )),
        }
    }

    /// Resolve a name through the scope chain
    pub(crate) fn lookup(
        &self,
        name: &str,
        location: SourceLocation,
        scope: &ScopeRef,
    ) -> Result<Value, RuntimeError> {
        scope::lookup(scope, name).ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            location,
        })
    }

    fn evaluate_call(
        &mut self,
        callee: &AstNode,
        args: &[AstNode],
        scope: &ScopeRef,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let function = self.evaluate_expr(callee, scope)?;
        if !function.is_callable() {
            return Err(RuntimeError::type_error(
                format!("{} is not a function", describe_callee(callee)),
                location,
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg, scope)?);
        }
        self.call_value(&function, values, location)
    }

    /// Call a function value with already evaluated arguments
    pub(crate) fn call_value(
        &mut self,
        function: &Value,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match function {
            Value::Function(closure) => self.call_closure(closure, args, location),
            Value::Native(native) => self.call_native(native, args, location),
            other => Err(RuntimeError::type_error(
                format!("{} is not a function", other),
                location,
            )),
        }
    }

    fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallStackOverflow { location });
        }

        let frame = Scope::function(&closure.scope);
        {
            let mut frame = frame.borrow_mut();
            let mut args = args.into_iter();
            for param in &closure.def.params {
                frame.define(param, args.next().unwrap_or_default());
            }
        }

        self.call_depth += 1;
        let result = self.execute_body(&closure.def.body, &frame);
        self.call_depth -= 1;

        let flow = result?;
        let value = match flow {
            Flow::Return(value) => value,
            other => {
                self.finish_body(other, Some(closure.def.location))?;
                Value::Undefined
            }
        };
        self.current_location = location;
        Ok(value)
    }

    /// Reject `break`/`continue` that escaped every loop
    fn finish_body(&self, flow: Flow, location: Option<SourceLocation>) -> Result<(), RuntimeError> {
        let message = match flow {
            Flow::Break => "Illegal break statement",
            Flow::Continue => "Illegal continue statement: no surrounding iteration statement",
            Flow::Normal | Flow::Return(_) => return Ok(()),
        };
        Err(RuntimeError::Syntax(ParseError {
            message: message.to_string(),
            location: location.unwrap_or(self.current_location),
        }))
    }

    /// Count one statement against the step budget
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.step_limit > 0 && self.steps > self.step_limit {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.step_limit,
                location: self.current_location,
            });
        }
        Ok(())
    }

    /// Convert a scope failure into the matching runtime error
    pub(crate) fn scope_error(
        &self,
        err: ScopeError,
        name: &str,
        location: SourceLocation,
    ) -> RuntimeError {
        let name = name.to_string();
        match err {
            ScopeError::AlreadyDeclared => RuntimeError::AlreadyDeclared { name, location },
            ScopeError::NotDefined => RuntimeError::UndefinedVariable { name, location },
            ScopeError::ConstAssignment => RuntimeError::ConstModification { name, location },
        }
    }
}

/// Printable form of a call target for "is not a function" messages
fn describe_callee(callee: &AstNode) -> String {
    match callee {
        AstNode::Variable(name, _) => name.clone(),
        AstNode::Member { object, member, .. } => {
            format!("{}.{}", describe_callee(object), member)
        }
        AstNode::Index { object, .. } => format!("{}[...]", describe_callee(object)),
        AstNode::Call { callee, .. } => format!("{}(...)", describe_callee(callee)),
        _ => "expression".to_string(),
    }
}
