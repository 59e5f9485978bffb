//! Lexical scopes
//!
//! Scopes form a parent chain. Function bodies open a *function scope*, blocks
//! and loop headers open plain block scopes. `let`/`const` bind in the innermost
//! scope while `var` binds in the nearest function scope.

use super::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type ScopeRef = Rc<RefCell<Scope>>;

/// A named binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
    /// Bindings created with `var` may be redeclared
    pub redeclarable: bool,
}

/// Why a declaration or assignment was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    AlreadyDeclared,
    NotDefined,
    ConstAssignment,
}

#[derive(Debug, Default)]
pub struct Scope {
    vars: FxHashMap<String, Binding>,
    parent: Option<ScopeRef>,
    is_function: bool,
}

impl Scope {
    /// The outermost scope
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            is_function: true,
            ..Default::default()
        }))
    }

    pub fn block(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
            is_function: false,
        }))
    }

    pub fn function(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
            is_function: true,
        }))
    }

    /// Declare a binding in this scope
    pub fn declare(&mut self, name: &str, binding: Binding) -> Result<(), ScopeError> {
        if let Some(existing) = self.vars.get(name) {
            if !(existing.redeclarable && binding.redeclarable) {
                return Err(ScopeError::AlreadyDeclared);
            }
        }
        self.vars.insert(name.to_string(), binding);
        Ok(())
    }

    /// Bind `name` unconditionally (parameters, hoisted functions, host bindings)
    pub fn define(&mut self, name: &str, value: Value) {
        self.vars.insert(
            name.to_string(),
            Binding {
                value,
                is_const: false,
                redeclarable: true,
            },
        );
    }

    /// Drop every binding, releasing closures that captured this scope
    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

/// Nearest enclosing function scope (used for `var` and hoisted functions)
pub fn function_scope(scope: &ScopeRef) -> ScopeRef {
    let mut current = Rc::clone(scope);
    loop {
        let parent = {
            let borrowed = current.borrow();
            if borrowed.is_function {
                None
            } else {
                borrowed.parent.clone()
            }
        };
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Resolve `name` through the scope chain
pub fn lookup(scope: &ScopeRef, name: &str) -> Option<Value> {
    let mut current = Some(Rc::clone(scope));
    while let Some(s) = current {
        let borrowed = s.borrow();
        if let Some(binding) = borrowed.vars.get(name) {
            return Some(binding.value.clone());
        }
        current = borrowed.parent.clone();
    }
    None
}

/// Assign to an existing binding found through the scope chain
pub fn assign(scope: &ScopeRef, name: &str, value: Value) -> Result<(), ScopeError> {
    let mut current = Some(Rc::clone(scope));
    while let Some(s) = current {
        let mut borrowed = s.borrow_mut();
        if let Some(binding) = borrowed.vars.get_mut(name) {
            if binding.is_const {
                return Err(ScopeError::ConstAssignment);
            }
            binding.value = value;
            return Ok(());
        }
        current = borrowed.parent.clone();
    }
    Err(ScopeError::NotDefined)
}
