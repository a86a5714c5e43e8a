//! Parse error types.

use incant_ir::{LineCol, Span};

/// Error produced while parsing a token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The workhorse variant: the parser needed one thing and saw another.
    #[error("expected {expected} at {at}, found {found}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
        at: LineCol,
    },

    /// A STORE declaration after PARAMS or after the first statement.
    #[error("STORE declarations must appear before PARAMS and statements ({at})")]
    MisplacedStore { span: Span, at: LineCol },

    /// A PARAMS block after the first statement or a second PARAMS block.
    #[error("PARAMS must appear once, after stores and before statements ({at})")]
    MisplacedParams { span: Span, at: LineCol },

    /// A comprehension directly inside `yeet` without parentheses.
    #[error("nested list comprehensions must be enclosed in parentheses ({at})")]
    NestedComprehension { span: Span, at: LineCol },

    /// A call postfix on anything but a string literal.
    #[error("call target must be a string literal naming a builtin ({at})")]
    CalleeNotLiteral { span: Span, at: LineCol },
}

impl ParseError {
    /// The byte span of the offending token.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::MisplacedStore { span, .. }
            | ParseError::MisplacedParams { span, .. }
            | ParseError::NestedComprehension { span, .. }
            | ParseError::CalleeNotLiteral { span, .. } => *span,
        }
    }
}
