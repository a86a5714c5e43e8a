//! The three-tier execution environment.

use crate::Value;
use rustc_hash::{FxHashMap, FxHashSet};

/// Variable bindings for one invocation: stores, params, and locals.
///
/// The type checker guarantees the three tiers never share a name, so
/// lookup order is irrelevant. Assigning to a store marks it dirty; the
/// dirty set is what gets committed after a successful run.
#[derive(Default)]
pub struct Environment {
    stores: FxHashMap<String, Value>,
    params: FxHashMap<String, Value>,
    locals: FxHashMap<String, Value>,
    dirty: FxHashSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn define_store(&mut self, name: impl Into<String>, value: Value) {
        self.stores.insert(name.into(), value);
    }

    pub fn define_param(&mut self, name: impl Into<String>, value: Value) {
        self.params.insert(name.into(), value);
    }

    pub fn define_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    /// Drop a scoped binder (comprehension/collect/sort variables).
    pub fn remove_local(&mut self, name: &str) {
        self.locals.remove(name);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.params.get(name))
            .or_else(|| self.stores.get(name))
    }

    /// Overwrite an existing binding. Returns `false` if the name is not
    /// bound anywhere.
    #[must_use]
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.locals.get_mut(name) {
            *slot = value;
            return true;
        }
        if let Some(slot) = self.params.get_mut(name) {
            *slot = value;
            return true;
        }
        if let Some(slot) = self.stores.get_mut(name) {
            *slot = value;
            self.dirty.insert(name.to_string());
            return true;
        }
        false
    }

    /// The current value of a store, if bound.
    pub fn store_value(&self, name: &str) -> Option<&Value> {
        self.stores.get(name)
    }

    /// Whether a store was assigned during this invocation.
    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    /// Whether any store was assigned during this invocation.
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}
