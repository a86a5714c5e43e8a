//! Structured lexer errors.

use incant_ir::{LineCol, Span};

/// Error produced while tokenizing script source.
///
/// Every variant carries the byte span and the precomputed line/column so
/// the host can relay a positioned message without re-reading the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unrecognized character '{ch}' at {at}")]
    UnrecognizedCharacter { ch: char, span: Span, at: LineCol },

    #[error("unterminated string literal starting at {at}")]
    UnterminatedString { span: Span, at: LineCol },

    #[error("invalid escape sequence '\\{ch}' at {at}")]
    InvalidEscape { ch: char, span: Span, at: LineCol },
}

impl LexError {
    pub(crate) fn unrecognized_character(source: &str, ch: char, span: Span) -> Self {
        LexError::UnrecognizedCharacter {
            ch,
            span,
            at: crate::position(source, span),
        }
    }

    pub(crate) fn unterminated_string(source: &str, span: Span) -> Self {
        LexError::UnterminatedString {
            span,
            at: crate::position(source, span),
        }
    }

    pub(crate) fn invalid_escape(source: &str, ch: char, span: Span) -> Self {
        LexError::InvalidEscape {
            ch,
            span,
            at: crate::position(source, span),
        }
    }

    /// The byte span of the offending input.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnrecognizedCharacter { span, .. }
            | LexError::UnterminatedString { span, .. }
            | LexError::InvalidEscape { span, .. } => *span,
        }
    }
}
