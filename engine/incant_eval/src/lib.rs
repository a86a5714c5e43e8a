//! Interpreter and runtime for incant.
//!
//! Executes type-checked scripts: runtime [`Value`]s, the three-tier
//! [`Environment`], the [`Host`] clock/RNG seam, the [`StoreBackend`]
//! persistence seam, and the tree-walking interpreter behind
//! [`instantiate`] and [`invoke`]. The engine performs no I/O of its
//! own; everything impure comes in through `Host` and `StoreBackend`.

mod builtins;
mod env;
mod error;
mod host;
mod interp;
mod output;
mod store;
mod value;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;

pub use env::Environment;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use host::{Clock, Host, Rng};
pub use interp::{instantiate, invoke, MAX_EVAL_DEPTH};
pub use output::OutputBuffer;
pub use store::{MemoryStore, StoreBackend, StoreError};
pub use value::{parse_number, render_number, Value};
