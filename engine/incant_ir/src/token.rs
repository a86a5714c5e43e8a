//! Token types for the incant lexer.

use super::Span;
use std::fmt;

/// A token with its span in the source.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Token kinds for incant.
///
/// String literals are stored unescaped; numbers are stored as the
/// parsed `f64` (the language has a single Number type).
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Number literal: 42, 3.14 (sign is handled by unary operators)
    Number(f64),
    /// String literal with escapes already processed: 'hello'
    Str(String),
    /// Identifier
    Ident(String),

    // Statement keywords
    Store,
    Params,
    Let,
    Print,

    // Expression keywords
    True,
    False,
    And,
    Or,
    Not,
    For,
    As,
    If,
    Yeet,
    Collect,
    With,

    // Type keywords
    NumberType,
    StringType,
    BoolType,
    ListType,

    // Operators and punctuation
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    EqEq,       // ==
    NotEq,      // !=
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    Question,   // ?
    Colon,      // :
    Dollar,     // $
    Hash,       // #
    Bang,       // !
    DotDotEq,   // ..=
    DotDotLt,   // ..<
    LParen,     // (
    RParen,     // )
    LBracket,   // [
    RBracket,   // ]
    Comma,      // ,
    Semicolon,  // ;
    Eq,         // =

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(_) => "number literal".to_string(),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.lexeme()),
        }
    }

    /// The fixed source text of keyword and punctuation tokens.
    fn lexeme(&self) -> &'static str {
        match self {
            TokenKind::Store => "STORE",
            TokenKind::Params => "PARAMS",
            TokenKind::Let => "LET",
            TokenKind::Print => "PRINT",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::For => "for",
            TokenKind::As => "as",
            TokenKind::If => "if",
            TokenKind::Yeet => "yeet",
            TokenKind::Collect => "collect",
            TokenKind::With => "with",
            TokenKind::NumberType => "number",
            TokenKind::StringType => "string",
            TokenKind::BoolType => "bool",
            TokenKind::ListType => "list",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Dollar => "$",
            TokenKind::Hash => "#",
            TokenKind::Bang => "!",
            TokenKind::DotDotEq => "..=",
            TokenKind::DotDotLt => "..<",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Eq => "=",
            TokenKind::Number(_)
            | TokenKind::Str(_)
            | TokenKind::Ident(_)
            | TokenKind::Eof => "",
        }
    }

    /// Whether two kinds are the same variant, ignoring payloads.
    #[inline]
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
