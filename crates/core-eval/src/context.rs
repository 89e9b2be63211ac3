use std::collections::BTreeMap;

use crate::{EvalError, Value};

/// Name of the reserved binding holding the most recent evaluation result.
pub const LAST_RESULT: &str = "_";

/// Variable bindings shared by every evaluation in a session.
///
/// Passed explicitly by `&mut`; there is no ambient global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    bindings: BTreeMap<String, Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A fresh context with `_` bound to undefined.
    pub fn new() -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(LAST_RESULT.to_string(), Value::Null);
        Self { bindings }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Bind `name`. The reserved `_` binding is rejected.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<(), EvalError> {
        let name = name.into();
        if name == LAST_RESULT {
            return Err(EvalError::ReservedBinding(name));
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        if name == LAST_RESULT {
            return None;
        }
        self.bindings.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// The single writer of `_`.
    pub fn set_last_result(&mut self, value: Value) {
        self.bindings.insert(LAST_RESULT.to_string(), value);
    }

    pub fn last_result(&self) -> &Value {
        self.bindings.get(LAST_RESULT).unwrap_or(&Value::Null)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
