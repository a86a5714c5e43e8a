//! incant - the embedded scripting engine for chat command scripts.
//!
//! A small statically typed language with persistent, script-scoped
//! stores. The host compiles a script once, seeds its stores once, and
//! invokes it per command trigger:
//!
//! ```
//! use incant::{compile, instantiate, invoke, Host, MemoryStore, StoreBackend};
//! use std::collections::HashMap;
//!
//! let script = compile("!counter", "STORE n = 0; n = n + 1; PRINT 'count: ' + #n;")?;
//!
//! let mut store = MemoryStore::new();
//! let mut host = Host::system();
//! let seeded = instantiate(&script, &mut host)?;
//! store.write_values(&script.id, seeded)?;
//!
//! let output = invoke(&script, &HashMap::new(), &mut store, &mut host)?;
//! assert_eq!(output, "count: 1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The engine performs no I/O of its own: persistence goes through the
//! [`StoreBackend`] seam and all non-determinism (clock, RNG) through
//! [`Host`]. Compilation is all-or-nothing; a script that fails any of
//! the three phases must not be registered.

use std::collections::HashMap;

pub use incant_eval::{
    Clock, Environment, Host, MemoryStore, OutputBuffer, Rng, RuntimeError, RuntimeErrorKind,
    StoreBackend, StoreError, Value, MAX_EVAL_DEPTH,
};
pub use incant_ir::{Builtin, LineCol, ScriptId, Span, Ty};
pub use incant_lexer::LexError;
pub use incant_parse::ParseError;
pub use incant_typeck::{CheckedStore, CompiledScript, TypeError, TypeErrorKind};

/// Error from any compile phase.
///
/// The variant is the stage that rejected the script; each inner error
/// carries the offending span and a positioned, human-readable message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl CompileError {
    /// The phase that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "lex",
            CompileError::Parse(_) => "parse",
            CompileError::Type(_) => "type",
        }
    }

    /// The byte span of the offending construct.
    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span(),
            CompileError::Parse(e) => e.span(),
            CompileError::Type(e) => e.span,
        }
    }
}

/// Compile source text into a [`CompiledScript`].
///
/// Runs the lexer, parser, and type checker in sequence and fails on
/// the first error. Nothing about a failed script is retained.
pub fn compile(id: impl Into<ScriptId>, source: &str) -> Result<CompiledScript, CompileError> {
    let id = id.into();
    tracing::debug!(%id, bytes = source.len(), "compiling script");
    let tokens = incant_lexer::tokenize(source)?;
    let program = incant_parse::parse(source, &tokens)?;
    let script = incant_typeck::check(id, source, program)?;
    Ok(script)
}

/// Evaluate a compiled script's store initializers, in declaration
/// order, producing the values the host must seed its persistence with.
///
/// Run exactly once, at script registration.
pub fn instantiate(
    script: &CompiledScript,
    host: &mut Host,
) -> Result<Vec<(String, Value)>, RuntimeError> {
    incant_eval::instantiate(script, host)
}

/// Run one invocation of a compiled script.
///
/// Binds `params` (caller strings), reads every declared store through
/// the backend, executes the body, and on success writes all dirty
/// stores back as one transaction and returns the concatenated PRINT
/// output. On failure nothing is written and no output is returned.
pub fn invoke(
    script: &CompiledScript,
    params: &HashMap<String, String>,
    store: &mut dyn StoreBackend,
    host: &mut Host,
) -> Result<String, RuntimeError> {
    incant_eval::invoke(script, params, store, host)
}
