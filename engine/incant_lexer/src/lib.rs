//! Lexer for incant, built on logos.
//!
//! A raw logos pass recognizes the fixed token shapes; a conversion pass
//! attaches spans, validates string escapes, and turns logos error slices
//! into structured [`LexError`]s. Whitespace separates tokens and is
//! otherwise insignificant; the language has no comments.

use incant_ir::{LineCol, Span, Token, TokenKind};
use logos::Logos;

mod error;

pub use error::LexError;

/// Raw token from logos (before span attachment and unescaping).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    // Statement keywords (uppercase, as commands read in chat)
    #[token("STORE")]
    Store,
    #[token("PARAMS")]
    Params,
    #[token("LET")]
    Let,
    #[token("PRINT")]
    Print,

    // Expression keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("for")]
    For,
    #[token("as")]
    As,
    #[token("if")]
    If,
    #[token("yeet")]
    Yeet,
    #[token("collect")]
    Collect,
    #[token("with")]
    With,

    // Type keywords
    #[token("number")]
    NumberType,
    #[token("string")]
    StringType,
    #[token("bool")]
    BoolType,
    #[token("list")]
    ListType,

    // Multi-character operators before their prefixes
    #[token("..=")]
    DotDotEq,
    #[token("..<")]
    DotDotLt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("$")]
    Dollar,
    #[token("#")]
    Hash,
    #[token("!")]
    Bang,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,

    // Number literal; the leading sign is a unary operator, not part of
    // the literal
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Single-quoted string literal; escapes are validated in the
    // conversion pass
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,

    // Identifier: ASCII letter start, then letters/digits/underscore
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Ident,
}

/// Lex source text into a token stream terminated by an EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        match result {
            Ok(raw) => {
                let kind = convert_token(source, raw, slice, span)?;
                tokens.push(Token::new(kind, span));
            }
            Err(()) => return Err(classify_error(source, slice, span)),
        }
    }

    let eof = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    tokens.push(Token::new(TokenKind::Eof, eof));
    Ok(tokens)
}

/// Convert a raw token to a `TokenKind`.
fn convert_token(
    source: &str,
    raw: RawToken,
    slice: &str,
    span: Span,
) -> Result<TokenKind, LexError> {
    let kind = match raw {
        RawToken::Number(value) => TokenKind::Number(value),
        RawToken::Str => TokenKind::Str(unescape_string(source, slice, span)?),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::Store => TokenKind::Store,
        RawToken::Params => TokenKind::Params,
        RawToken::Let => TokenKind::Let,
        RawToken::Print => TokenKind::Print,

        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::For => TokenKind::For,
        RawToken::As => TokenKind::As,
        RawToken::If => TokenKind::If,
        RawToken::Yeet => TokenKind::Yeet,
        RawToken::Collect => TokenKind::Collect,
        RawToken::With => TokenKind::With,

        RawToken::NumberType => TokenKind::NumberType,
        RawToken::StringType => TokenKind::StringType,
        RawToken::BoolType => TokenKind::BoolType,
        RawToken::ListType => TokenKind::ListType,

        RawToken::DotDotEq => TokenKind::DotDotEq,
        RawToken::DotDotLt => TokenKind::DotDotLt,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dollar => TokenKind::Dollar,
        RawToken::Hash => TokenKind::Hash,
        RawToken::Bang => TokenKind::Bang,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Eq => TokenKind::Eq,
    };
    Ok(kind)
}

/// Process string escapes. Only `\'`, `\n`, and `\\` are legal.
fn unescape_string(source: &str, slice: &str, span: Span) -> Result<String, LexError> {
    // Slice includes the surrounding quotes.
    let content = &slice[1..slice.len() - 1];
    let mut result = String::with_capacity(content.len());
    let mut chars = content.char_indices();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => result.push('\n'),
            Some((_, '\'')) => result.push('\''),
            Some((_, '\\')) => result.push('\\'),
            Some((_, other)) => {
                // +1 skips the opening quote of the literal
                let at = span.start + u32::try_from(offset).unwrap_or(0) + 1;
                return Err(LexError::invalid_escape(source, other, Span::point(at)));
            }
            // The regex guarantees a character after every backslash.
            None => break,
        }
    }
    Ok(result)
}

/// Classify a logos error slice into a structured error.
fn classify_error(source: &str, slice: &str, span: Span) -> LexError {
    if slice.starts_with('\'') {
        return LexError::unterminated_string(source, span);
    }
    let ch = slice.chars().next().unwrap_or('\0');
    LexError::unrecognized_character(source, ch, span)
}

/// Compute the display position for an error span.
pub(crate) fn position(source: &str, span: Span) -> LineCol {
    LineCol::of(source, span.start)
}
