//! Token cursor for navigating the token stream.

use crate::ParseError;
use incant_ir::{LineCol, Span, Token, TokenKind};

/// Cursor over the lexer's token stream.
///
/// The stream always ends with an EOF token, so `current()` is total.
/// The cursor also keeps the source text for error positions.
pub struct Cursor<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token stream must be EOF-terminated"
        );
        Cursor {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// The span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check the current token's variant, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind().same_kind(kind)
    }

    /// Advance past the current token and return it.
    pub fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consume a token of the given kind or fail with "expected ...".
    pub fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            return Ok(span);
        }
        Err(self.expected(what))
    }

    /// Consume an identifier or fail with "expected ...".
    pub fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let span = self.current_span();
            self.advance();
            return Ok((name, span));
        }
        Err(self.expected(what))
    }

    /// Build an "expected X, found Y" error at the current token.
    pub fn expected(&self, what: &str) -> ParseError {
        let span = self.current_span();
        ParseError::Expected {
            expected: what.to_string(),
            found: self.current_kind().describe(),
            span,
            at: self.position(span),
        }
    }

    /// The display position of a span within the source.
    pub fn position(&self, span: Span) -> LineCol {
        LineCol::of(self.source, span.start)
    }
}
