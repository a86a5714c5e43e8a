//! Runtime errors.
//!
//! A runtime error aborts the whole invocation: no further statements
//! run, dirty stores are not committed, and the output buffer is
//! discarded. The error pins the expression that failed.

use crate::StoreError;
use incant_ir::{LineCol, Span, Ty};

/// Error raised during script execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {at}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub at: LineCol,
}

impl RuntimeError {
    pub fn new(source: &str, kind: RuntimeErrorKind, span: Span) -> Self {
        RuntimeError {
            kind,
            span,
            at: LineCol::of(source, span.start),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeErrorKind {
    // Invocation setup
    #[error("parameter '{name}' was not supplied by the caller")]
    MissingParameter { name: String },
    #[error("store '{name}' has no persisted value; the script was never instantiated")]
    MissingStore { name: String },
    #[error("store '{name}' holds a value of type '{found}', expected '{expected}'")]
    StoreTypeMismatch {
        name: String,
        expected: Ty,
        found: Ty,
    },

    // Names (defensive; the type checker rejects these statically)
    #[error("'{name}' is not defined")]
    UnknownName { name: String },
    #[error("call to '{name}' was not resolved at compile time")]
    UnresolvedBuiltin { name: String },

    // Operators (defensive; the type checker rejects these statically)
    #[error("operator '{op}' is not supported for a value of type '{found}'")]
    OperatorType { op: String, found: Ty },

    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("'sqrt' requires a non-negative argument, got {value}")]
    NegativeSqrt { value: f64 },

    // Subscripts
    #[error("index must be an integer, got {value}")]
    NonIntegerIndex { value: f64 },
    #[error("index must not be negative, got {value}")]
    NegativeIndex { value: f64 },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    // Ranges
    #[error("range operator '{op}' requires integer operands, got {value}")]
    RangeBoundNotInteger { op: &'static str, value: f64 },

    // Conversions
    #[error("string '{text}' does not represent a valid number")]
    NumberConversion { text: String },
    #[error("string '{text}' cannot be converted to boolean")]
    BoolConversion { text: String },

    // Iteration forms
    #[error("collect over an empty list has no seed value")]
    EmptyCollect,

    // Builtins
    #[error("'{name}' requires {expected}, got '{found}'")]
    BuiltinType {
        name: &'static str,
        expected: &'static str,
        found: Ty,
    },
    #[error("'{name}' of an empty list is undefined")]
    EmptyMinMax { name: &'static str },
    #[error("invalid date format string '{format}'")]
    InvalidDateFormat { format: String },

    // Nested evaluation
    #[error("evaluated code is invalid: {message}")]
    EvalCompile { message: String },
    #[error("STORE declarations are not allowed in evaluated code")]
    EvalStores,
    #[error("PARAMS are not allowed in evaluated code")]
    EvalParams,
    #[error("evaluated code produced no output")]
    EvalNoOutput,
    #[error("nested evaluation exceeded the depth limit of {limit}")]
    EvalDepthExceeded { limit: usize },

    // Persistence
    #[error(transparent)]
    Store(#[from] StoreError),
}
