//! Variable scoping for the interpreter.
//!
//! A stack of scopes keyed by the lower-cased variable name; DWScript
//! identifiers are case-insensitive. Lookups walk from the innermost scope
//! outward.

use dws_runtime::Value;
use rustc_hash::FxHashMap;

/// Scope stack. Always holds at least the global scope.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<FxHashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Single-scope environment holding `bindings`, as used for lambda
    /// bodies.
    pub fn from_bindings(bindings: FxHashMap<String, Value>) -> Self {
        Environment {
            scopes: vec![bindings],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost scope, shadowing outer bindings.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_lowercase(), value);
        }
    }

    /// Overwrite the nearest binding of `name`. Returns `false` if no scope
    /// binds it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        let key = name.to_lowercase();
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&key))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        let key = name.to_lowercase();
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&key))
            .cloned()
    }

    /// Every visible binding, inner scopes shadowing outer ones.
    pub fn capture(&self) -> FxHashMap<String, Value> {
        let mut captured = FxHashMap::default();
        for scope in &self.scopes {
            for (name, value) in scope {
                captured.insert(name.clone(), value.clone());
            }
        }
        captured
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
