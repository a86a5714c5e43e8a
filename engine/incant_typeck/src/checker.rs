//! The type checker pass.

use crate::error::{TypeError, TypeErrorKind};
use crate::{CheckedStore, CompiledScript};
use incant_ir::{
    BinOp, Builtin, Expr, ExprKind, LineCol, Program, ScriptId, Span, Stmt, StmtKind, Ty, UnaryOp,
};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    Store,
    Param,
    Local,
}

/// One entry of the store/param/local namespace.
pub(crate) struct Symbol {
    pub kind: SymbolKind,
    pub ty: Ty,
}

pub(crate) struct TypeChecker<'a> {
    source: &'a str,
    symbols: FxHashMap<String, Symbol>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(source: &'a str) -> Self {
        TypeChecker {
            source,
            symbols: FxHashMap::default(),
        }
    }

    pub(crate) fn err(&self, kind: TypeErrorKind, span: Span) -> TypeError {
        TypeError {
            kind,
            span,
            at: LineCol::of(self.source, span.start),
        }
    }

    pub fn check(mut self, id: ScriptId, program: Program) -> Result<CompiledScript, TypeError> {
        // Stores, in declaration order, each seeing only its predecessors.
        let mut stores = Vec::with_capacity(program.stores.len());
        for mut decl in program.stores {
            if self.symbols.contains_key(&decl.name) {
                return Err(self.err(
                    TypeErrorKind::DuplicateStore { name: decl.name },
                    decl.name_span,
                ));
            }
            let ty = self.expr(&mut decl.init, None)?;
            self.symbols.insert(
                decl.name.clone(),
                Symbol {
                    kind: SymbolKind::Store,
                    ty: ty.clone(),
                },
            );
            stores.push(CheckedStore {
                name: decl.name,
                ty,
                init: decl.init,
            });
        }

        // Params are always strings and may not reuse any name.
        let mut params = Vec::with_capacity(program.params.len());
        for param in program.params {
            if let Some(existing) = self.symbols.get(&param.name) {
                let kind = match existing.kind {
                    SymbolKind::Store => TypeErrorKind::ParamShadowsStore { name: param.name },
                    _ => TypeErrorKind::DuplicateParam { name: param.name },
                };
                return Err(self.err(kind, param.name_span));
            }
            self.symbols.insert(
                param.name.clone(),
                Symbol {
                    kind: SymbolKind::Param,
                    ty: Ty::String,
                },
            );
            params.push(param.name);
        }

        let mut body = Vec::with_capacity(program.body.len());
        for mut stmt in program.body {
            self.stmt(&mut stmt)?;
            body.push(stmt);
        }

        Ok(CompiledScript {
            id,
            source: self.source.to_string(),
            stores,
            params,
            body,
        })
    }

    fn stmt(&mut self, stmt: &mut Stmt) -> Result<(), TypeError> {
        match &mut stmt.kind {
            StmtKind::Let {
                name,
                name_span,
                annotation,
                init,
            } => {
                if let Some(existing) = self.symbols.get(name.as_str()) {
                    let kind = match existing.kind {
                        SymbolKind::Store => TypeErrorKind::ShadowsStore { name: name.clone() },
                        SymbolKind::Param => TypeErrorKind::ShadowsParam { name: name.clone() },
                        SymbolKind::Local => TypeErrorKind::Redefined { name: name.clone() },
                    };
                    return Err(self.err(kind, *name_span));
                }
                if annotation.is_none() && is_all_empty_list(init) {
                    return Err(self.err(TypeErrorKind::AnnotationRequired, init.span));
                }
                let ty = self.expr(init, annotation.as_ref())?;
                if let Some(annotated) = annotation {
                    if *annotated != ty {
                        return Err(self.err(
                            TypeErrorKind::InitializationMismatch {
                                name: name.clone(),
                                annotated: annotated.clone(),
                                found: ty,
                            },
                            init.span,
                        ));
                    }
                }
                self.symbols.insert(
                    name.clone(),
                    Symbol {
                        kind: SymbolKind::Local,
                        ty,
                    },
                );
                Ok(())
            }
            StmtKind::Assign {
                target,
                target_span,
                value,
            } => {
                let Some(symbol) = self.symbols.get(target.as_str()) else {
                    return Err(self.err(
                        TypeErrorKind::UnknownName {
                            name: target.clone(),
                        },
                        *target_span,
                    ));
                };
                let expected = symbol.ty.clone();
                let found = self.expr(value, None)?;
                if found != expected {
                    return Err(self.err(
                        TypeErrorKind::AssignmentMismatch {
                            target: target.clone(),
                            expected,
                            found,
                        },
                        value.span,
                    ));
                }
                Ok(())
            }
            StmtKind::Print { value } => {
                // Every type renders, so checking the expression suffices.
                self.expr(value, None)?;
                Ok(())
            }
        }
    }

    /// Check an expression and return its type.
    ///
    /// `expected` propagates a known target type downwards; it exists so
    /// empty list literals under a `LET` annotation (or nested in a
    /// partly-typed list) can resolve their element type.
    fn expr(&mut self, expr: &mut Expr, expected: Option<&Ty>) -> Result<Ty, TypeError> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Number(_) => Ok(Ty::Number),
            ExprKind::Str(_) => Ok(Ty::String),
            ExprKind::Bool(_) => Ok(Ty::Bool),
            ExprKind::Ident(name) => match self.symbols.get(name.as_str()) {
                Some(symbol) => Ok(symbol.ty.clone()),
                None => Err(self.err(
                    TypeErrorKind::UnknownName { name: name.clone() },
                    span,
                )),
            },
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let operand_ty = self.expr(operand, None)?;
                let operand_span = operand.span;
                if op == UnaryOp::Eval {
                    if let Some(text) = operand.as_str_literal() {
                        // Literal operands compile now; anything else
                        // waits until evaluation.
                        let text = text.to_string();
                        self.check_eval_literal(&text, span)?;
                    }
                }
                self.unary(op, operand_ty, operand_span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;
                let lhs_ty = self.expr(lhs, None)?;
                let rhs_ty = self.expr(rhs, None)?;
                self.binary(op, lhs_ty, rhs_ty, span)
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let cond_ty = self.expr(cond, None)?;
                if !cond_ty.is_bool() {
                    return Err(
                        self.err(TypeErrorKind::TernaryCondNotBool { found: cond_ty }, cond.span)
                    );
                }
                let then_ty = self.expr(then, expected)?;
                let otherwise_ty = self.expr(otherwise, expected)?;
                if then_ty != otherwise_ty {
                    return Err(self.err(
                        TypeErrorKind::TernaryBranchMismatch {
                            then: then_ty,
                            otherwise: otherwise_ty,
                        },
                        span,
                    ));
                }
                Ok(then_ty)
            }
            ExprKind::List { elems, elem_ty } => {
                let expected_elem: Option<Ty> = expected.and_then(Ty::elem).cloned();
                if elems.is_empty() {
                    return match (expected, expected_elem) {
                        (_, Some(elem)) => {
                            *elem_ty = Some(elem.clone());
                            Ok(Ty::list(elem))
                        }
                        (Some(other), None) => Err(self.err(
                            TypeErrorKind::EmptyListMismatch {
                                expected: other.clone(),
                            },
                            span,
                        )),
                        (None, None) => Err(self.err(TypeErrorKind::EmptyListNotAllowed, span)),
                    };
                }

                // Non-empty: typed elements fix the element type, then
                // empty-list elements are checked against it.
                let mut inferred: Option<Ty> = None;
                for elem in elems.iter_mut().filter(|e| !is_all_empty_list(e)) {
                    let ty = self.expr(elem, expected_elem.as_ref())?;
                    match &inferred {
                        None => inferred = Some(ty),
                        Some(previous) if *previous != ty => {
                            return Err(self.err(
                                TypeErrorKind::ListElementMismatch {
                                    expected: previous.clone(),
                                    found: ty,
                                },
                                elem.span,
                            ));
                        }
                        Some(_) => {}
                    }
                }
                let resolved = match (inferred, expected_elem) {
                    (Some(ty), _) => ty,
                    (None, Some(ty)) => ty,
                    (None, None) => {
                        return Err(self.err(TypeErrorKind::EmptyListNotAllowed, span));
                    }
                };
                for elem in elems.iter_mut().filter(|e| is_all_empty_list(e)) {
                    self.expr(elem, Some(&resolved))?;
                }
                *elem_ty = Some(resolved.clone());
                Ok(Ty::list(resolved))
            }
            ExprKind::Subscript { base, index } => {
                let base_ty = self.expr(base, None)?;
                let index_ty = self.expr(index, None)?;
                match (&base_ty, &index_ty) {
                    (Ty::String, Ty::Number) => Ok(Ty::String),
                    (Ty::List(elem), Ty::Number) => Ok((**elem).clone()),
                    _ => Err(self.err(
                        TypeErrorKind::SubscriptMismatch {
                            base: base_ty,
                            index: index_ty,
                        },
                        span,
                    )),
                }
            }
            ExprKind::Call {
                name,
                name_span,
                builtin,
                args,
            } => {
                let Some(resolved) = Builtin::from_name(name) else {
                    return Err(self.err(
                        TypeErrorKind::UnknownBuiltin { name: name.clone() },
                        *name_span,
                    ));
                };
                *builtin = Some(resolved);
                let mut arg_types = Vec::with_capacity(args.len());
                for arg in args.iter_mut() {
                    let ty = self.expr(arg, None)?;
                    arg_types.push((ty, arg.span));
                }
                self.check_builtin(resolved, span, &arg_types)
            }
            ExprKind::Sort { list, cmp } => {
                let list_ty = self.expr(list, None)?;
                let Ty::List(elem) = &list_ty else {
                    return Err(self.err(
                        TypeErrorKind::SortNotList { found: list_ty },
                        list.span,
                    ));
                };
                let elem = (**elem).clone();
                match cmp {
                    None => {
                        if !elem.is_number() {
                            return Err(self.err(
                                TypeErrorKind::SortRequiresComparator {
                                    found: list_ty.clone(),
                                },
                                span,
                            ));
                        }
                    }
                    Some(cmp) => {
                        self.bind_local(&cmp.lhs, cmp.lhs_span, elem.clone())?;
                        let rhs_bound = self.bind_local(&cmp.rhs, cmp.rhs_span, elem);
                        let body_ty = match rhs_bound {
                            Ok(()) => {
                                let result = self.expr(&mut cmp.body, None);
                                self.symbols.remove(&cmp.rhs);
                                result
                            }
                            Err(e) => Err(e),
                        };
                        self.symbols.remove(&cmp.lhs);
                        let body_ty = body_ty?;
                        if !body_ty.is_bool() {
                            return Err(self.err(
                                TypeErrorKind::SortCmpNotBool { found: body_ty },
                                cmp.body.span,
                            ));
                        }
                    }
                }
                Ok(list_ty)
            }
            ExprKind::Comprehension {
                iter,
                var,
                var_span,
                cond,
                body,
                body_ty,
            } => {
                let iter_ty = self.expr(iter, None)?;
                let elem_ty = self.iterable_elem(&iter_ty, iter.span)?;
                self.bind_local(var, *var_span, elem_ty)?;
                let result = (|| {
                    if let Some(cond) = cond {
                        let cond_ty = self.expr(cond, None)?;
                        if !cond_ty.is_bool() {
                            return Err(self.err(
                                TypeErrorKind::ConditionNotBool { found: cond_ty },
                                cond.span,
                            ));
                        }
                    }
                    self.expr(body, None)
                })();
                self.symbols.remove(var.as_str());
                let checked = result?;
                *body_ty = Some(checked.clone());
                Ok(Ty::list(checked))
            }
            ExprKind::Collect {
                iter,
                acc,
                acc_span,
                elem,
                elem_span,
                body,
            } => {
                let iter_ty = self.expr(iter, None)?;
                let elem_ty = self.iterable_elem(&iter_ty, iter.span)?;
                self.bind_local(acc, *acc_span, elem_ty.clone())?;
                let body_ty = match self.bind_local(elem, *elem_span, elem_ty.clone()) {
                    Ok(()) => {
                        let result = self.expr(body, None);
                        self.symbols.remove(elem.as_str());
                        result
                    }
                    Err(e) => Err(e),
                };
                self.symbols.remove(acc.as_str());
                let body_ty = body_ty?;
                if body_ty != elem_ty {
                    return Err(self.err(
                        TypeErrorKind::CollectBodyMismatch {
                            expected: elem_ty,
                            found: body_ty,
                        },
                        body.span,
                    ));
                }
                Ok(elem_ty)
            }
        }
    }

    fn unary(&self, op: UnaryOp, operand_ty: Ty, operand_span: Span) -> Result<Ty, TypeError> {
        let result = match (op, &operand_ty) {
            (UnaryOp::Plus | UnaryOp::Neg, Ty::Number) => Some(Ty::Number),
            (UnaryOp::Not, Ty::Bool) => Some(Ty::Bool),
            (UnaryOp::ToNumber, ty) if ty.is_scalar() => Some(Ty::Number),
            (UnaryOp::ToString, ty) if ty.is_scalar() => Some(Ty::String),
            (UnaryOp::ToBool, ty) if ty.is_scalar() => Some(Ty::Bool),
            (UnaryOp::Eval, Ty::String) => Some(Ty::String),
            _ => None,
        };
        result.ok_or_else(|| {
            self.err(
                TypeErrorKind::UnaryMismatch {
                    op,
                    ty: operand_ty,
                },
                operand_span,
            )
        })
    }

    fn binary(&self, op: BinOp, lhs: Ty, rhs: Ty, span: Span) -> Result<Ty, TypeError> {
        let result = match op {
            BinOp::Add => match (&lhs, &rhs) {
                (Ty::Number, Ty::Number) => Some(Ty::Number),
                (Ty::String, Ty::String) => Some(Ty::String),
                (Ty::List(a), Ty::List(b)) if a == b => Some(lhs.clone()),
                _ => None,
            },
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                match (&lhs, &rhs) {
                    (Ty::Number, Ty::Number) => Some(Ty::Number),
                    _ => None,
                }
            }
            BinOp::Eq | BinOp::Ne => {
                if lhs == rhs {
                    Some(Ty::Bool)
                } else {
                    None
                }
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => match (&lhs, &rhs) {
                (Ty::Number, Ty::Number) | (Ty::String, Ty::String) => Some(Ty::Bool),
                _ => None,
            },
            BinOp::And | BinOp::Or => match (&lhs, &rhs) {
                (Ty::Bool, Ty::Bool) => Some(Ty::Bool),
                _ => None,
            },
            BinOp::RangeInclusive | BinOp::RangeExclusive => match (&lhs, &rhs) {
                (Ty::Number, Ty::Number) => Some(Ty::list(Ty::Number)),
                _ => None,
            },
        };
        result.ok_or_else(|| self.err(TypeErrorKind::BinaryMismatch { op, lhs, rhs }, span))
    }

    /// Element type of a `for`/`collect` iterable.
    fn iterable_elem(&self, ty: &Ty, span: Span) -> Result<Ty, TypeError> {
        match ty {
            Ty::String => Ok(Ty::String),
            Ty::List(elem) => Ok((**elem).clone()),
            _ => Err(self.err(TypeErrorKind::NotIterable { found: ty.clone() }, span)),
        }
    }

    /// Introduce a scoped binder, rejecting any name reuse.
    fn bind_local(&mut self, name: &str, span: Span, ty: Ty) -> Result<(), TypeError> {
        if let Some(existing) = self.symbols.get(name) {
            let kind = match existing.kind {
                SymbolKind::Store => TypeErrorKind::ShadowsStore {
                    name: name.to_string(),
                },
                SymbolKind::Param => TypeErrorKind::ShadowsParam {
                    name: name.to_string(),
                },
                SymbolKind::Local => TypeErrorKind::Redefined {
                    name: name.to_string(),
                },
            };
            return Err(self.err(kind, span));
        }
        self.symbols.insert(
            name.to_string(),
            Symbol {
                kind: SymbolKind::Local,
                ty,
            },
        );
        Ok(())
    }

    /// Compile-time validation of a `!` string-literal operand: the text
    /// must be a self-contained program with no stores and no params.
    fn check_eval_literal(&self, text: &str, span: Span) -> Result<(), TypeError> {
        let tokens = incant_lexer::tokenize(text).map_err(|e| {
            self.err(
                TypeErrorKind::NestedInvalid {
                    message: e.to_string(),
                },
                span,
            )
        })?;
        let program = incant_parse::parse(text, &tokens).map_err(|e| {
            self.err(
                TypeErrorKind::NestedInvalid {
                    message: e.to_string(),
                },
                span,
            )
        })?;
        if !program.stores.is_empty() {
            return Err(self.err(TypeErrorKind::NestedStores, span));
        }
        if !program.params.is_empty() {
            return Err(self.err(TypeErrorKind::NestedParams, span));
        }
        TypeChecker::new(text)
            .check(ScriptId::new("<eval>"), program)
            .map(|_| ())
            .map_err(|e| {
                self.err(
                    TypeErrorKind::NestedInvalid {
                        message: e.to_string(),
                    },
                    span,
                )
            })
    }
}

/// Whether an expression is an empty list literal, possibly containing
/// only (recursively) empty list literals. Such literals cannot name
/// their own element type.
fn is_all_empty_list(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::List { elems, .. } => elems.iter().all(is_all_empty_list),
        _ => false,
    }
}
