//! Static type checker for incant.
//!
//! A single pre-execution pass over the parsed [`Program`]: it resolves
//! every name against the store/param/local namespace, infers and checks
//! every expression type, resolves builtin calls against the closed
//! catalogue, gives empty list literals their element type, and validates
//! `!` string-literal operands as independent programs. Nothing executes
//! before this pass succeeds, and the first error aborts it.

mod builtins;
mod checker;
mod error;


pub use error::{TypeError, TypeErrorKind};

use incant_ir::{Expr, Program, ScriptId, Stmt, Ty};

/// The immutable artifact of a successful `compile`.
///
/// Hosts cache this per script and feed it to `instantiate` once and to
/// `invoke` on every trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledScript {
    pub id: ScriptId,
    /// The original source text, kept so runtime errors can report
    /// line/column positions.
    pub source: String,
    pub stores: Vec<CheckedStore>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// A store declaration with its inferred type.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckedStore {
    pub name: String,
    pub ty: Ty,
    pub init: Expr,
}

/// Type-check a parsed program into a [`CompiledScript`].
///
/// `source` is used only for error positions.
pub fn check(id: ScriptId, source: &str, program: Program) -> Result<CompiledScript, TypeError> {
    let script = checker::TypeChecker::new(source).check(id, program)?;
    tracing::debug!(id = %script.id, stores = script.stores.len(), "type check passed");
    Ok(script)
}
