//! Expression parsing by precedence climbing.
//!
//! The ladder, weakest to strongest: ternary, `or`, `and`, `not`,
//! equality, comparison, range, additive, multiplicative, unary prefix,
//! postfix subscript/call. Binary operators are left-associative; the
//! ternary is right-associative (both branches restart at the lowest
//! level).

use crate::{ParseError, Parser};
use incant_ir::{BinOp, Expr, ExprKind, SortCmp, TokenKind, UnaryOp};

/// Binding strength; the discriminant order is the precedence ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    Lowest,
    Ternary,
    Or,
    And,
    Not,
    Equality,
    Comparison,
    Range,
    Sum,
    Product,
    Unary,
    Postfix,
}

/// The precedence of a token in infix position, if it can be one.
fn infix_prec(kind: &TokenKind) -> Option<Prec> {
    let prec = match kind {
        TokenKind::Question => Prec::Ternary,
        TokenKind::Or => Prec::Or,
        TokenKind::And => Prec::And,
        TokenKind::EqEq | TokenKind::NotEq => Prec::Equality,
        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => Prec::Comparison,
        TokenKind::DotDotEq | TokenKind::DotDotLt => Prec::Range,
        TokenKind::Plus | TokenKind::Minus => Prec::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Prec::Product,
        TokenKind::LParen | TokenKind::LBracket => Prec::Postfix,
        _ => return None,
    };
    Some(prec)
}

fn binary_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Rem,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::And => BinOp::And,
        TokenKind::Or => BinOp::Or,
        TokenKind::DotDotEq => BinOp::RangeInclusive,
        TokenKind::DotDotLt => BinOp::RangeExclusive,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse a full expression (lowest precedence).
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr(Prec::Lowest)
    }

    pub(crate) fn parse_expr(&mut self, min: Prec) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some(prec) = infix_prec(self.cursor.current_kind()) else {
                break;
            };
            if prec <= min {
                break;
            }
            lhs = self.parse_infix(lhs, prec)?;
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Number(value) => {
                let value = *value;
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Number(value), start))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Str(text), start))
            }
            TokenKind::True => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Bool(true), start))
            }
            TokenKind::False => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Bool(false), start))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Ident(name), start))
            }
            TokenKind::Minus => self.unary(UnaryOp::Neg, Prec::Unary),
            TokenKind::Plus => self.unary(UnaryOp::Plus, Prec::Unary),
            TokenKind::Dollar => self.unary(UnaryOp::ToNumber, Prec::Unary),
            TokenKind::Hash => self.unary(UnaryOp::ToString, Prec::Unary),
            TokenKind::Question => self.unary(UnaryOp::ToBool, Prec::Unary),
            TokenKind::Bang => self.unary(UnaryOp::Eval, Prec::Unary),
            // `not` binds looser than comparisons: `not a == b` negates
            // the comparison.
            TokenKind::Not => self.unary(UnaryOp::Not, Prec::Not),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.expression()?;
                self.cursor
                    .expect(&TokenKind::RParen, "')' after grouped expression")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.list_literal(),
            TokenKind::For => self.comprehension(),
            TokenKind::Collect => self.collect(),
            _ => Err(self.cursor.expected("an expression")),
        }
    }

    fn unary(&mut self, op: UnaryOp, operand_prec: Prec) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let operand = self.parse_expr(operand_prec)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_infix(&mut self, lhs: Expr, prec: Prec) -> Result<Expr, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Question => self.ternary(lhs),
            TokenKind::LParen => self.call(lhs),
            TokenKind::LBracket => self.subscript(lhs),
            kind => {
                let Some(op) = binary_op(kind) else {
                    return Err(self.cursor.expected("a binary operator"));
                };
                self.cursor.advance();
                let rhs = self.parse_expr(prec)?;
                let span = lhs.span.merge(self.cursor.previous_span());
                Ok(Expr::new(
                    ExprKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                ))
            }
        }
    }

    /// `<cond> ? <then> : <otherwise>`; both branches restart at the
    /// lowest level so chained ternaries nest to the right.
    fn ternary(&mut self, cond: Expr) -> Result<Expr, ParseError> {
        self.cursor.advance();
        let then = self.expression()?;
        self.cursor
            .expect(&TokenKind::Colon, "':' in ternary expression")?;
        let otherwise = self.expression()?;
        let span = cond.span.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    /// `'<name>'(<args>)` - the callee must be a string literal. `sort`
    /// gets its own node because of the comparator form.
    fn call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let Some(name) = callee.as_str_literal().map(str::to_string) else {
            let span = self.cursor.current_span();
            return Err(ParseError::CalleeNotLiteral {
                span,
                at: self.cursor.position(span),
            });
        };
        self.cursor.advance(); // (

        if name == "sort" {
            return self.sort_call(callee);
        }

        let mut args = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::RParen) {
                break;
            }
            args.push(self.expression()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                self.cursor
                    .expect(&TokenKind::RParen, "')' after call arguments")?;
                break;
            }
        }
        let span = callee.span.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Call {
                name,
                name_span: callee.span,
                builtin: None,
                args,
            },
            span,
        ))
    }

    /// `'sort'(<list>)` or `'sort'(<list>; <lhs>, <rhs> yeet <cmp>)`.
    fn sort_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let list = self.expression()?;
        let cmp = if self.cursor.eat(&TokenKind::Semicolon) {
            let (lhs, lhs_span) = self.cursor.expect_ident("comparator left operand name")?;
            self.cursor
                .expect(&TokenKind::Comma, "',' between comparator operand names")?;
            let (rhs, rhs_span) = self.cursor.expect_ident("comparator right operand name")?;
            self.cursor
                .expect(&TokenKind::Yeet, "'yeet' in sort comparator")?;
            let body = self.expression()?;
            Some(SortCmp {
                lhs,
                lhs_span,
                rhs,
                rhs_span,
                body: Box::new(body),
            })
        } else {
            None
        };
        self.cursor
            .expect(&TokenKind::RParen, "')' after sort arguments")?;
        let span = callee.span.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Sort {
                list: Box::new(list),
                cmp,
            },
            span,
        ))
    }

    fn subscript(&mut self, base: Expr) -> Result<Expr, ParseError> {
        self.cursor.advance(); // [
        let index = self.expression()?;
        self.cursor
            .expect(&TokenKind::RBracket, "']' after subscript index")?;
        let span = base.span.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Subscript {
                base: Box::new(base),
                index: Box::new(index),
            },
            span,
        ))
    }

    /// `[a, b, c]`; a trailing comma is tolerated. The element type is
    /// filled in by the type checker.
    fn list_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // [
        let mut elems = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::RBracket) {
                break;
            }
            elems.push(self.expression()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                self.cursor
                    .expect(&TokenKind::RBracket, "']' after list elements")?;
                break;
            }
        }
        let span = start.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::List {
                elems,
                elem_ty: None,
            },
            span,
        ))
    }

    /// `for <iter> as <var> [if <cond>] yeet <body>`
    fn comprehension(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // for
        let iter = self.expression()?;
        self.cursor
            .expect(&TokenKind::As, "'as' in list comprehension")?;
        let (var, var_span) = self.cursor.expect_ident("loop variable name")?;
        let cond = if self.cursor.eat(&TokenKind::If) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.cursor
            .expect(&TokenKind::Yeet, "'yeet' in list comprehension")?;
        if self.cursor.check(&TokenKind::For) {
            // Readability rule carried over from the reference grammar.
            let span = self.cursor.current_span();
            return Err(ParseError::NestedComprehension {
                span,
                at: self.cursor.position(span),
            });
        }
        let body = self.expression()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Comprehension {
                iter: Box::new(iter),
                var,
                var_span,
                cond,
                body: Box::new(body),
                body_ty: None,
            },
            span,
        ))
    }

    /// `collect <iter> as <acc>, <elem> with <body>`
    fn collect(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // collect
        let iter = self.expression()?;
        self.cursor
            .expect(&TokenKind::As, "'as' in collect expression")?;
        let (acc, acc_span) = self.cursor.expect_ident("accumulator name")?;
        self.cursor
            .expect(&TokenKind::Comma, "',' in collect expression")?;
        let (elem, elem_span) = self.cursor.expect_ident("element name")?;
        self.cursor
            .expect(&TokenKind::With, "'with' in collect expression")?;
        let body = self.expression()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(Expr::new(
            ExprKind::Collect {
                iter: Box::new(iter),
                acc,
                acc_span,
                elem,
                elem_span,
                body: Box::new(body),
            },
            span,
        ))
    }
}
