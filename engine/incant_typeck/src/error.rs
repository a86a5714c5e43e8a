//! Type errors.
//!
//! Every error pins the first offending AST node: the kind describes the
//! mismatch, the span/position locate it. The checker stops at the first
//! error; a script that fails this pass must not be registered at all.

use incant_ir::{BinOp, LineCol, Span, Ty, UnaryOp};

/// Error produced by the type checker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {at}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
    pub at: LineCol,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeErrorKind {
    // Name rules
    #[error("store '{name}' is already defined")]
    DuplicateStore { name: String },
    #[error("parameter '{name}' shadows a store with the same name")]
    ParamShadowsStore { name: String },
    #[error("parameter '{name}' is already defined")]
    DuplicateParam { name: String },
    #[error("variable '{name}' shadows a store with the same name")]
    ShadowsStore { name: String },
    #[error("variable '{name}' shadows a parameter with the same name")]
    ShadowsParam { name: String },
    #[error("variable '{name}' is already defined")]
    Redefined { name: String },
    #[error("'{name}' is not defined")]
    UnknownName { name: String },

    // Statements
    #[error("cannot initialize variable '{name}' of type '{annotated}' with a value of type '{found}'")]
    InitializationMismatch {
        name: String,
        annotated: Ty,
        found: Ty,
    },
    #[error("empty list literal requires an explicit type annotation")]
    AnnotationRequired,
    #[error("cannot assign a value of type '{found}' to '{target}' of type '{expected}'")]
    AssignmentMismatch {
        target: String,
        expected: Ty,
        found: Ty,
    },

    // Operators
    #[error("unary operator '{op}' is not supported for '{ty}' operands")]
    UnaryMismatch { op: UnaryOp, ty: Ty },
    #[error("operator '{op}' is not supported for operands of type '{lhs}' and '{rhs}'")]
    BinaryMismatch { op: BinOp, lhs: Ty, rhs: Ty },
    #[error("ternary condition must be of type 'bool', got '{found}'")]
    TernaryCondNotBool { found: Ty },
    #[error("ternary branches must have the same type, got '{then}' and '{otherwise}'")]
    TernaryBranchMismatch { then: Ty, otherwise: Ty },
    #[error("cannot subscript a value of type '{base}' with an index of type '{index}'")]
    SubscriptMismatch { base: Ty, index: Ty },

    // Lists
    #[error("list element type mismatch: expected '{expected}', got '{found}'")]
    ListElementMismatch { expected: Ty, found: Ty },
    #[error("expected a value of type '{expected}', got an empty list")]
    EmptyListMismatch { expected: Ty },
    #[error("cannot infer the type of an empty list literal here")]
    EmptyListNotAllowed,

    // Iteration forms
    #[error("a value of type '{found}' is not iterable")]
    NotIterable { found: Ty },
    #[error("list comprehension condition must be of type 'bool', got '{found}'")]
    ConditionNotBool { found: Ty },
    #[error("collect expression must produce '{expected}', got '{found}'")]
    CollectBodyMismatch { expected: Ty, found: Ty },

    // Calls
    #[error("'{name}' is not a builtin function")]
    UnknownBuiltin { name: String },
    #[error("'{name}' expects {expected}, got {found}")]
    BuiltinArity {
        name: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("'{name}' expects {expected} as argument {index}, got '{found}'")]
    BuiltinArgMismatch {
        name: &'static str,
        index: usize,
        expected: &'static str,
        found: Ty,
    },

    // sort
    #[error("'sort' requires a list, got '{found}'")]
    SortNotList { found: Ty },
    #[error("'sort' on '{found}' requires a comparator")]
    SortRequiresComparator { found: Ty },
    #[error("sort comparator must be of type 'bool', got '{found}'")]
    SortCmpNotBool { found: Ty },

    // Nested evaluation
    #[error("STORE declarations are not allowed in evaluated code")]
    NestedStores,
    #[error("PARAMS are not allowed in evaluated code")]
    NestedParams,
    #[error("evaluated code is invalid: {message}")]
    NestedInvalid { message: String },
}
