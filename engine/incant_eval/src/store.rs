//! The persistence seam.
//!
//! The engine never talks to storage directly; the host hands `invoke` a
//! [`StoreBackend`] and the engine reads every declared store up front
//! and writes the dirty set back as one call on success. Serializing
//! commits per script id (so concurrent triggers of the same script do
//! not interleave) is the host's responsibility.

use crate::Value;
use incant_ir::ScriptId;
use rustc_hash::FxHashMap;
use std::collections::HashMap;

/// Error surfaced by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("store backend failure: {0}")]
pub struct StoreError(pub String);

/// Per-(script, store) persistence operations.
pub trait StoreBackend {
    /// Read the named stores of one script. Missing names are simply
    /// absent from the result map.
    fn read_values(
        &self,
        id: &ScriptId,
        names: &[String],
    ) -> Result<HashMap<String, Value>, StoreError>;

    /// Write the given store values as one logical transaction.
    fn write_values(&mut self, id: &ScriptId, values: Vec<(String, Value)>)
        -> Result<(), StoreError>;
}

/// In-memory backend used by tests and single-process hosts.
#[derive(Default)]
pub struct MemoryStore {
    values: FxHashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Direct read access for assertions.
    pub fn get(&self, id: &ScriptId, name: &str) -> Option<&Value> {
        self.values
            .get(&(id.as_str().to_string(), name.to_string()))
    }
}

impl StoreBackend for MemoryStore {
    fn read_values(
        &self,
        id: &ScriptId,
        names: &[String],
    ) -> Result<HashMap<String, Value>, StoreError> {
        let mut result = HashMap::new();
        for name in names {
            let key = (id.as_str().to_string(), name.clone());
            if let Some(value) = self.values.get(&key) {
                result.insert(name.clone(), value.clone());
            }
        }
        Ok(result)
    }

    fn write_values(
        &mut self,
        id: &ScriptId,
        values: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        for (name, value) in values {
            self.values
                .insert((id.as_str().to_string(), name), value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_are_keyed_by_script_and_store() {
        let mut store = MemoryStore::new();
        let a = ScriptId::new("!a");
        let b = ScriptId::new("!b");
        store
            .write_values(&a, vec![("n".to_string(), Value::Number(1.0))])
            .unwrap();
        store
            .write_values(&b, vec![("n".to_string(), Value::Number(9.0))])
            .unwrap();

        assert_eq!(store.get(&a, "n"), Some(&Value::Number(1.0)));
        assert_eq!(store.get(&b, "n"), Some(&Value::Number(9.0)));
    }

    #[test]
    fn missing_names_are_absent_from_reads() {
        let store = MemoryStore::new();
        let id = ScriptId::new("!a");
        let read = store.read_values(&id, &["ghost".to_string()]).unwrap();
        assert!(read.is_empty());
    }
}
