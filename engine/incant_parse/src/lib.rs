//! Recursive descent parser for incant.
//!
//! Turns the lexer's token stream into an untyped [`Program`]:
//! STORE declarations, then an optional PARAMS block, then at least one
//! statement. Expressions are parsed by precedence climbing in the
//! `expr` module. The parser enforces grammar-level rules only; names
//! and types are the type checker's business.

mod cursor;
mod error;
mod expr;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;

pub use cursor::Cursor;
pub use error::ParseError;

use incant_ir::{ParamDecl, Program, Stmt, StmtKind, StoreDecl, Token, TokenKind, Ty};

/// Parse an EOF-terminated token stream into a program.
///
/// `source` is the text the tokens came from; it is only used to compute
/// line/column positions for errors.
pub fn parse(source: &str, tokens: &[Token]) -> Result<Program, ParseError> {
    let program = Parser::new(source, tokens).parse_program()?;
    tracing::trace!(
        stores = program.stores.len(),
        params = program.params.len(),
        statements = program.body.len(),
        "parsed program"
    );
    Ok(program)
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(source, tokens),
        }
    }

    fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut stores = Vec::new();
        while self.cursor.eat(&TokenKind::Store) {
            stores.push(self.store_decl()?);
        }

        let params = if self.cursor.eat(&TokenKind::Params) {
            self.param_list()?
        } else {
            Vec::new()
        };

        let mut body = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.check(&TokenKind::Store) {
                let span = self.cursor.current_span();
                return Err(ParseError::MisplacedStore {
                    span,
                    at: self.cursor.position(span),
                });
            }
            if self.cursor.check(&TokenKind::Params) {
                let span = self.cursor.current_span();
                return Err(ParseError::MisplacedParams {
                    span,
                    at: self.cursor.position(span),
                });
            }
            body.push(self.statement()?);
        }
        if body.is_empty() {
            return Err(self.cursor.expected("at least one statement"));
        }

        Ok(Program {
            stores,
            params,
            body,
        })
    }

    /// `STORE <name> = <expr>;` - the STORE keyword is already consumed.
    fn store_decl(&mut self) -> Result<StoreDecl, ParseError> {
        let (name, name_span) = self.cursor.expect_ident("store name")?;
        self.cursor
            .expect(&TokenKind::Eq, "'=' after store name")?;
        let init = self.expression()?;
        self.cursor
            .expect(&TokenKind::Semicolon, "';' after store declaration")?;
        Ok(StoreDecl {
            name,
            name_span,
            init,
        })
    }

    /// `PARAMS a, b, c;` - the PARAMS keyword is already consumed.
    /// A trailing comma before the semicolon is tolerated.
    fn param_list(&mut self) -> Result<Vec<ParamDecl>, ParseError> {
        let mut params = Vec::new();
        loop {
            let (name, name_span) = self.cursor.expect_ident("parameter name")?;
            params.push(ParamDecl { name, name_span });
            if !self.cursor.eat(&TokenKind::Comma) || self.cursor.check(&TokenKind::Semicolon) {
                break;
            }
        }
        self.cursor
            .expect(&TokenKind::Semicolon, "';' after parameter list")?;
        Ok(params)
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Print => {
                self.cursor.advance();
                let value = self.expression()?;
                StmtKind::Print { value }
            }
            TokenKind::Let => {
                self.cursor.advance();
                let (name, name_span) = self.cursor.expect_ident("variable name")?;
                let annotation = if self.cursor.eat(&TokenKind::Colon) {
                    Some(self.type_annotation()?)
                } else {
                    None
                };
                self.cursor
                    .expect(&TokenKind::Eq, "'=' in variable definition")?;
                let init = self.expression()?;
                StmtKind::Let {
                    name,
                    name_span,
                    annotation,
                    init,
                }
            }
            TokenKind::Ident(_) => {
                let (target, target_span) = self.cursor.expect_ident("assignment target")?;
                self.cursor.expect(&TokenKind::Eq, "'=' in assignment")?;
                let value = self.expression()?;
                StmtKind::Assign {
                    target,
                    target_span,
                    value,
                }
            }
            _ => return Err(self.cursor.expected("a statement")),
        };
        self.cursor
            .expect(&TokenKind::Semicolon, "';' after statement")?;
        Ok(Stmt {
            kind,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `number | string | bool | list<T>`
    fn type_annotation(&mut self) -> Result<Ty, ParseError> {
        let ty = match self.cursor.current_kind() {
            TokenKind::NumberType => {
                self.cursor.advance();
                Ty::Number
            }
            TokenKind::StringType => {
                self.cursor.advance();
                Ty::String
            }
            TokenKind::BoolType => {
                self.cursor.advance();
                Ty::Bool
            }
            TokenKind::ListType => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Lt, "'<' in list type")?;
                let elem = self.type_annotation()?;
                self.cursor.expect(&TokenKind::Gt, "'>' in list type")?;
                Ty::list(elem)
            }
            _ => return Err(self.cursor.expected("a type")),
        };
        Ok(ty)
    }
}
