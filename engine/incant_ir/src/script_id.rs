//! Script identity for store persistence.

use std::fmt;

/// Identifies one registered script, usually the command name it is bound
/// to (e.g. `!counter`). Store values are keyed by `(ScriptId, store
/// name)` so scripts never observe each other's state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptId(String);

impl ScriptId {
    pub fn new(id: impl Into<String>) -> Self {
        ScriptId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptId {
    fn from(id: &str) -> Self {
        ScriptId::new(id)
    }
}

impl From<String> for ScriptId {
    fn from(id: String) -> Self {
        ScriptId(id)
    }
}
