use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use loxc_util::Symbol;

use crate::error::RuntimeError;
use crate::value::Value;

/// A named binding. `scope` back-references the owning scope for identity
/// purposes only -- no evaluation path reads it, matching the grounding
/// source's `Variable`, which carries the same field solely for equality
/// and debug display.
pub struct Variable {
    pub scope: Scope,
    pub name: Symbol,
    pub value: Value,
}

pub type VariableHandle = Rc<RefCell<Variable>>;

struct ScopeData {
    parent: Option<Scope>,
    variables: RefCell<IndexMap<Symbol, VariableHandle>>,
}

/// A lexical scope. Cheaply cloned (an `Rc` to shared scope data); scopes
/// form a strict tree via `parent`, insertion-ordered so a scope's
/// bindings enumerate in declaration order.
#[derive(Clone)]
pub struct Scope(Rc<ScopeData>);

impl Scope {
    fn new(parent: Option<Scope>) -> Self {
        Scope(Rc::new(ScopeData {
            parent,
            variables: RefCell::new(IndexMap::new()),
        }))
    }

    pub fn root() -> Self {
        Scope::new(None)
    }

    pub fn child(parent: &Scope) -> Self {
        Scope::new(Some(parent.clone()))
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.parent.clone()
    }

    /// Declares `name` in this scope, shadowing any existing binding of
    /// the same name in this scope (an outer binding is unaffected).
    /// Returns the fresh handle, initialized to `nil`.
    pub fn create(&self, name: Symbol) -> VariableHandle {
        let handle = Rc::new(RefCell::new(Variable {
            scope: self.clone(),
            name,
            value: Value::Nil,
        }));
        self.0.variables.borrow_mut().insert(name, handle.clone());
        handle
    }

    /// Searches this scope and its ancestors, innermost first.
    pub fn lookup(&self, name: Symbol) -> Option<VariableHandle> {
        if let Some(handle) = self.0.variables.borrow().get(&name) {
            return Some(handle.clone());
        }
        self.0.parent.as_ref().and_then(|p| p.lookup(name))
    }
}

/// Owns the scope tree and tracks which scope is current. Only the
/// interpreter's scope-event handling (driven by the parser's
/// `PushScope`/`PopScope` events) mutates `current`.
pub struct ExecutionContext {
    current: Scope,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self { current: Scope::root() }
    }

    pub fn current(&self) -> &Scope {
        &self.current
    }

    pub fn push(&mut self) {
        self.current = Scope::child(&self.current);
    }

    /// Pops to the enclosing scope. Popping the root scope is a runtime
    /// error, matching the grounding source's `ExecutionContext.pop_scope`.
    pub fn pop(&mut self) -> Result<(), RuntimeError> {
        match self.current.parent() {
            Some(parent) => {
                self.current = parent;
                Ok(())
            }
            None => Err(RuntimeError::General),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
