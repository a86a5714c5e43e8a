//! The tree-walking interpreter.
//!
//! Executes a type-checked script against the three-tier environment.
//! The type checker has already rejected every statically detectable
//! mismatch; the checks here are the runtime-only ones (bounds, zero
//! divisors, integer-ness, string conversions, nested compilation) plus
//! defensive type checks that mirror the static rules. Any failure
//! aborts the invocation with zero side effects.

use crate::builtins;
use crate::{
    Environment, Host, OutputBuffer, RuntimeError, RuntimeErrorKind, StoreBackend, Value,
};
use incant_ir::{BinOp, Expr, ExprKind, ScriptId, Span, SortCmp, Stmt, StmtKind, Ty, UnaryOp};
use incant_typeck::CompiledScript;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Upper bound on `!` nesting. A script can legally evaluate itself, so
/// the depth is tracked explicitly instead of riding the call stack.
pub const MAX_EVAL_DEPTH: usize = 32;

/// Seed the persisted stores of a freshly registered script.
///
/// Initializers run in declaration order; each sees only the stores
/// declared before it, no params and no locals.
pub fn instantiate(
    script: &CompiledScript,
    host: &mut Host,
) -> Result<Vec<(String, Value)>, RuntimeError> {
    let mut interp = Interpreter::new(script, Environment::new(), host, 0);
    let mut seeded = Vec::with_capacity(script.stores.len());
    for store in &script.stores {
        let value = interp.eval(&store.init)?;
        interp.env.define_store(store.name.clone(), value.clone());
        seeded.push((store.name.clone(), value));
    }
    tracing::debug!(id = %script.id, stores = seeded.len(), "instantiated script");
    Ok(seeded)
}

/// Run one invocation: bind params, read stores, execute, and on success
/// commit dirty stores as one write and return the print output.
pub fn invoke(
    script: &CompiledScript,
    params: &HashMap<String, String>,
    store: &mut dyn StoreBackend,
    host: &mut Host,
) -> Result<String, RuntimeError> {
    let mut env = Environment::new();
    for name in &script.params {
        let Some(text) = params.get(name) else {
            return Err(setup_error(
                script,
                RuntimeErrorKind::MissingParameter { name: name.clone() },
            ));
        };
        env.define_param(name.clone(), Value::string(text.clone()));
    }

    let names: Vec<String> = script.stores.iter().map(|s| s.name.clone()).collect();
    let mut persisted = store
        .read_values(&script.id, &names)
        .map_err(|e| setup_error(script, e.into()))?;
    for decl in &script.stores {
        let Some(value) = persisted.remove(&decl.name) else {
            return Err(setup_error(
                script,
                RuntimeErrorKind::MissingStore {
                    name: decl.name.clone(),
                },
            ));
        };
        let found = value.ty();
        if found != decl.ty {
            return Err(setup_error(
                script,
                RuntimeErrorKind::StoreTypeMismatch {
                    name: decl.name.clone(),
                    expected: decl.ty.clone(),
                    found,
                },
            ));
        }
        env.define_store(decl.name.clone(), value);
    }

    let mut interp = Interpreter::new(script, env, host, 0);
    interp.run()?;
    let Interpreter { env, out, .. } = interp;

    // Commit every store assigned during execution, in declaration
    // order, as one logical transaction.
    let dirty: Vec<(String, Value)> = script
        .stores
        .iter()
        .filter(|decl| env.is_dirty(&decl.name))
        .filter_map(|decl| {
            env.store_value(&decl.name)
                .map(|value| (decl.name.clone(), value.clone()))
        })
        .collect();
    if !dirty.is_empty() {
        tracing::debug!(id = %script.id, stores = dirty.len(), "committing dirty stores");
        store
            .write_values(&script.id, dirty)
            .map_err(|e| setup_error(script, e.into()))?;
    }
    Ok(out.finish())
}

fn setup_error(script: &CompiledScript, kind: RuntimeErrorKind) -> RuntimeError {
    RuntimeError::new(&script.source, kind, Span::DUMMY)
}

pub(crate) struct Interpreter<'a> {
    script: &'a CompiledScript,
    pub(crate) env: Environment,
    pub(crate) out: OutputBuffer,
    pub(crate) host: &'a mut Host,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        script: &'a CompiledScript,
        env: Environment,
        host: &'a mut Host,
        depth: usize,
    ) -> Self {
        Interpreter {
            script,
            env,
            out: OutputBuffer::new(),
            host,
            depth,
        }
    }

    pub(crate) fn run(&mut self) -> Result<(), RuntimeError> {
        let script = self.script;
        for stmt in &script.body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn error(&self, kind: RuntimeErrorKind, span: Span) -> RuntimeError {
        RuntimeError::new(&self.script.source, kind, span)
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match &stmt.kind {
            StmtKind::Let { name, init, .. } => {
                let value = self.eval(init)?;
                self.env.define_local(name.clone(), value);
                Ok(())
            }
            StmtKind::Assign {
                target,
                target_span,
                value,
            } => {
                let value = self.eval(value)?;
                if !self.env.assign(target, value) {
                    return Err(self.error(
                        RuntimeErrorKind::UnknownName {
                            name: target.clone(),
                        },
                        *target_span,
                    ));
                }
                Ok(())
            }
            StmtKind::Print { value } => {
                let value = self.eval(value)?;
                self.out.push(value.render());
                Ok(())
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::string(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Ident(name) => match self.env.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(self.error(
                    RuntimeErrorKind::UnknownName { name: name.clone() },
                    span,
                )),
            },
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                self.unary(*op, value, span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.binary(*op, lhs, rhs, span)
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => match self.eval(cond)? {
                Value::Bool(true) => self.eval(then),
                Value::Bool(false) => self.eval(otherwise),
                other => Err(self.operator_error("?", &other, cond.span)),
            },
            ExprKind::List { elems, elem_ty } => {
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    items.push(self.eval(elem)?);
                }
                let elem = match elem_ty {
                    Some(ty) => ty.clone(),
                    // The checker fills elem_ty in; fall back to the
                    // first element for robustness.
                    None => items.first().map_or(Ty::String, Value::ty),
                };
                Ok(Value::list(elem, items))
            }
            ExprKind::Subscript { base, index } => {
                let base_value = self.eval(base)?;
                let index_value = self.eval(index)?;
                self.subscript(base_value, index_value, span)
            }
            ExprKind::Call {
                name,
                builtin,
                args,
                ..
            } => {
                let Some(builtin) = builtin else {
                    return Err(self.error(
                        RuntimeErrorKind::UnresolvedBuiltin { name: name.clone() },
                        span,
                    ));
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                builtins::apply(*builtin, &values, self.host).map_err(|kind| self.error(kind, span))
            }
            ExprKind::Sort { list, cmp } => {
                let value = self.eval(list)?;
                let (elem, items) = match value {
                    Value::List { elem, items } => (elem, items),
                    other => return Err(self.operator_error("sort", &other, list.span)),
                };
                match cmp {
                    None => {
                        let sorted = self.sort_numeric(items, span)?;
                        Ok(Value::list(elem, sorted))
                    }
                    Some(cmp) => {
                        let sorted = self.sort_with_comparator(cmp, items)?;
                        self.env.remove_local(&cmp.lhs);
                        self.env.remove_local(&cmp.rhs);
                        Ok(Value::list(elem, sorted))
                    }
                }
            }
            ExprKind::Comprehension {
                iter,
                var,
                cond,
                body,
                body_ty,
                ..
            } => {
                let iterable = self.eval(iter)?;
                let elements = self.iterable_elements(iterable, iter.span)?;
                let mut items = Vec::new();
                for element in elements {
                    self.env.define_local(var.clone(), element);
                    let keep = match cond {
                        Some(cond) => match self.eval(cond)? {
                            Value::Bool(b) => b,
                            other => {
                                return Err(self.operator_error("if", &other, cond.span));
                            }
                        },
                        None => true,
                    };
                    if keep {
                        items.push(self.eval(body)?);
                    }
                }
                self.env.remove_local(var);
                let elem = match body_ty {
                    Some(ty) => ty.clone(),
                    None => items.first().map_or(Ty::String, Value::ty),
                };
                Ok(Value::list(elem, items))
            }
            ExprKind::Collect {
                iter,
                acc,
                elem,
                body,
                ..
            } => {
                let iterable = self.eval(iter)?;
                let result = match iterable {
                    // A string fold starts from the empty string and
                    // visits every character.
                    Value::String(s) => {
                        let mut folded = Value::string("");
                        for c in s.chars() {
                            self.env.define_local(acc.clone(), folded);
                            self.env
                                .define_local(elem.clone(), Value::string(c.to_string()));
                            folded = self.eval(body)?;
                        }
                        folded
                    }
                    // A list fold is seeded with the first element and
                    // visits the rest.
                    Value::List { items, .. } => {
                        let mut iter_items = items.into_iter();
                        let Some(mut folded) = iter_items.next() else {
                            return Err(self.error(RuntimeErrorKind::EmptyCollect, iter.span));
                        };
                        for item in iter_items {
                            self.env.define_local(acc.clone(), folded);
                            self.env.define_local(elem.clone(), item);
                            folded = self.eval(body)?;
                        }
                        folded
                    }
                    other => return Err(self.operator_error("collect", &other, iter.span)),
                };
                self.env.remove_local(acc);
                self.env.remove_local(elem);
                Ok(result)
            }
        }
    }

    fn operator_error(&self, op: &str, value: &Value, span: Span) -> RuntimeError {
        self.error(
            RuntimeErrorKind::OperatorType {
                op: op.to_string(),
                found: value.ty(),
            },
            span,
        )
    }

    fn unary(&mut self, op: UnaryOp, value: Value, span: Span) -> Result<Value, RuntimeError> {
        match (op, value) {
            (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),

            (UnaryOp::ToNumber, Value::Number(n)) => Ok(Value::Number(n)),
            (UnaryOp::ToNumber, Value::Bool(b)) => {
                Ok(Value::Number(if b { 1.0 } else { 0.0 }))
            }
            (UnaryOp::ToNumber, Value::String(s)) => match crate::value::parse_number(&s) {
                Some(n) => Ok(Value::Number(n)),
                None => Err(self.error(RuntimeErrorKind::NumberConversion { text: s }, span)),
            },

            (UnaryOp::ToString, Value::String(s)) => Ok(Value::String(s)),
            (UnaryOp::ToString, value @ (Value::Number(_) | Value::Bool(_))) => {
                Ok(Value::string(value.render()))
            }

            (UnaryOp::ToBool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (UnaryOp::ToBool, Value::Number(n)) => Ok(Value::Bool(n != 0.0)),
            (UnaryOp::ToBool, Value::String(s)) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(self.error(RuntimeErrorKind::BoolConversion { text: s }, span)),
            },

            (UnaryOp::Eval, Value::String(source)) => self.eval_source(&source, span),

            (op, value) => Err(self.operator_error(&op.to_string(), &value, span)),
        }
    }

    fn binary(
        &mut self,
        op: BinOp,
        lhs: Value,
        rhs: Value,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let value = match (op, lhs, rhs) {
            (BinOp::Add, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (BinOp::Sub, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (BinOp::Mul, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (BinOp::Div, Value::Number(a), Value::Number(b)) => {
                if b == 0.0 {
                    return Err(self.error(RuntimeErrorKind::DivisionByZero, span));
                }
                Value::Number(a / b)
            }
            (BinOp::Rem, Value::Number(a), Value::Number(b)) => {
                if b == 0.0 {
                    return Err(self.error(RuntimeErrorKind::ModuloByZero, span));
                }
                // Sign follows the divisor: -7 % 3 == 2.
                Value::Number(a - b * (a / b).floor())
            }
            (BinOp::Add, Value::String(a), Value::String(b)) => Value::String(a + &b),
            (BinOp::Add, Value::List { elem, mut items }, Value::List { items: mut tail, .. }) => {
                items.append(&mut tail);
                Value::List { elem, items }
            }

            (BinOp::Eq, a, b) => Value::Bool(a == b),
            (BinOp::Ne, a, b) => Value::Bool(a != b),
            (BinOp::Lt, Value::Number(a), Value::Number(b)) => Value::Bool(a < b),
            (BinOp::Le, Value::Number(a), Value::Number(b)) => Value::Bool(a <= b),
            (BinOp::Gt, Value::Number(a), Value::Number(b)) => Value::Bool(a > b),
            (BinOp::Ge, Value::Number(a), Value::Number(b)) => Value::Bool(a >= b),
            (BinOp::Lt, Value::String(a), Value::String(b)) => Value::Bool(a < b),
            (BinOp::Le, Value::String(a), Value::String(b)) => Value::Bool(a <= b),
            (BinOp::Gt, Value::String(a), Value::String(b)) => Value::Bool(a > b),
            (BinOp::Ge, Value::String(a), Value::String(b)) => Value::Bool(a >= b),

            (BinOp::And, Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
            (BinOp::Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),

            (BinOp::RangeInclusive, Value::Number(a), Value::Number(b)) => {
                self.range(a, b, true, span)?
            }
            (BinOp::RangeExclusive, Value::Number(a), Value::Number(b)) => {
                self.range(a, b, false, span)?
            }

            (op, lhs, _) => return Err(self.operator_error(&op.to_string(), &lhs, span)),
        };
        Ok(value)
    }

    /// Build the list for a range expression. Ranges are directional:
    /// `5..=1` counts down.
    fn range(&self, a: f64, b: f64, inclusive: bool, span: Span) -> Result<Value, RuntimeError> {
        let op = if inclusive { "..=" } else { "..<" };
        for bound in [a, b] {
            if bound.fract() != 0.0 {
                return Err(self.error(
                    RuntimeErrorKind::RangeBoundNotInteger { op, value: bound },
                    span,
                ));
            }
        }
        let start = a as i64;
        let end = b as i64;
        let mut items = Vec::new();
        if start <= end {
            let last = if inclusive { end } else { end - 1 };
            let mut i = start;
            while i <= last {
                items.push(Value::Number(i as f64));
                i += 1;
            }
        } else {
            let last = if inclusive { end } else { end + 1 };
            let mut i = start;
            while i >= last {
                items.push(Value::Number(i as f64));
                i -= 1;
            }
        }
        Ok(Value::list(Ty::Number, items))
    }

    fn subscript(&self, base: Value, index: Value, span: Span) -> Result<Value, RuntimeError> {
        let raw = match index {
            Value::Number(n) => n,
            other => return Err(self.operator_error("[]", &other, span)),
        };
        if raw.fract() != 0.0 {
            return Err(self.error(RuntimeErrorKind::NonIntegerIndex { value: raw }, span));
        }
        if raw < 0.0 {
            return Err(self.error(RuntimeErrorKind::NegativeIndex { value: raw }, span));
        }
        let idx = raw as usize;
        match base {
            Value::String(s) => {
                let len = s.chars().count();
                match s.chars().nth(idx) {
                    Some(c) => Ok(Value::string(c.to_string())),
                    None => Err(self.error(
                        RuntimeErrorKind::IndexOutOfBounds {
                            index: raw as i64,
                            len,
                        },
                        span,
                    )),
                }
            }
            Value::List { items, .. } => match items.get(idx) {
                Some(value) => Ok(value.clone()),
                None => Err(self.error(
                    RuntimeErrorKind::IndexOutOfBounds {
                        index: raw as i64,
                        len: items.len(),
                    },
                    span,
                )),
            },
            other => Err(self.operator_error("[]", &other, span)),
        }
    }

    fn iterable_elements(&self, value: Value, span: Span) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::String(s) => Ok(s
                .chars()
                .map(|c| Value::string(c.to_string()))
                .collect()),
            Value::List { items, .. } => Ok(items),
            other => Err(self.operator_error("for", &other, span)),
        }
    }

    fn sort_numeric(&self, items: Vec<Value>, span: Span) -> Result<Vec<Value>, RuntimeError> {
        merge_sort_by(items, &mut |a, b| match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                Ok(x.partial_cmp(y).unwrap_or(Ordering::Equal))
            }
            (other, _) => Err(self.error(
                RuntimeErrorKind::BuiltinType {
                    name: "sort",
                    expected: "a list of numbers",
                    found: other.ty(),
                },
                span,
            )),
        })
    }

    /// Merge sort driven by the script's comparator. The comparator runs
    /// twice per pair, `(l, r)` then `(r, l)`, to recover an ordering
    /// from the boolean "orders before" answer.
    fn sort_with_comparator(
        &mut self,
        cmp: &SortCmp,
        items: Vec<Value>,
    ) -> Result<Vec<Value>, RuntimeError> {
        if items.len() <= 1 {
            return Ok(items);
        }
        let mut left = items;
        let right = left.split_off(left.len() / 2);
        let left = self.sort_with_comparator(cmp, left)?;
        let right = self.sort_with_comparator(cmp, right)?;

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut li = 0;
        let mut ri = 0;
        while li < left.len() && ri < right.len() {
            if self.compare_pair(cmp, &left[li], &right[ri])? != Ordering::Greater {
                merged.push(left[li].clone());
                li += 1;
            } else {
                merged.push(right[ri].clone());
                ri += 1;
            }
        }
        merged.extend_from_slice(&left[li..]);
        merged.extend_from_slice(&right[ri..]);
        Ok(merged)
    }

    fn compare_pair(
        &mut self,
        cmp: &SortCmp,
        l: &Value,
        r: &Value,
    ) -> Result<Ordering, RuntimeError> {
        if self.comparator_says_before(cmp, l, r)? {
            return Ok(Ordering::Less);
        }
        if self.comparator_says_before(cmp, r, l)? {
            return Ok(Ordering::Greater);
        }
        Ok(Ordering::Equal)
    }

    fn comparator_says_before(
        &mut self,
        cmp: &SortCmp,
        l: &Value,
        r: &Value,
    ) -> Result<bool, RuntimeError> {
        self.env.define_local(cmp.lhs.clone(), l.clone());
        self.env.define_local(cmp.rhs.clone(), r.clone());
        match self.eval(&cmp.body)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.error(
                RuntimeErrorKind::BuiltinType {
                    name: "sort",
                    expected: "a boolean comparator result",
                    found: other.ty(),
                },
                cmp.body.span,
            )),
        }
    }

    /// Evaluate a string as an isolated program: fresh environment, no
    /// stores, no params, shared clock/RNG, bounded nesting depth.
    fn eval_source(&mut self, source: &str, span: Span) -> Result<Value, RuntimeError> {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(self.error(
                RuntimeErrorKind::EvalDepthExceeded {
                    limit: MAX_EVAL_DEPTH,
                },
                span,
            ));
        }
        let tokens = incant_lexer::tokenize(source).map_err(|e| {
            self.error(
                RuntimeErrorKind::EvalCompile {
                    message: e.to_string(),
                },
                span,
            )
        })?;
        let program = incant_parse::parse(source, &tokens).map_err(|e| {
            self.error(
                RuntimeErrorKind::EvalCompile {
                    message: e.to_string(),
                },
                span,
            )
        })?;
        if !program.stores.is_empty() {
            return Err(self.error(RuntimeErrorKind::EvalStores, span));
        }
        if !program.params.is_empty() {
            return Err(self.error(RuntimeErrorKind::EvalParams, span));
        }
        let nested = incant_typeck::check(ScriptId::new("<eval>"), source, program).map_err(|e| {
            self.error(
                RuntimeErrorKind::EvalCompile {
                    message: e.to_string(),
                },
                span,
            )
        })?;

        let output = {
            let mut inner =
                Interpreter::new(&nested, Environment::new(), &mut *self.host, self.depth + 1);
            inner.run()?;
            if inner.out.is_empty() {
                None
            } else {
                Some(inner.out.finish())
            }
        };
        match output {
            Some(text) => Ok(Value::String(text)),
            None => Err(self.error(RuntimeErrorKind::EvalNoOutput, span)),
        }
    }
}

/// Merge sort with a fallible comparator; the sort is stable, like the
/// rest of the language's ordering behavior.
fn merge_sort_by<E>(
    items: Vec<Value>,
    cmp: &mut impl FnMut(&Value, &Value) -> Result<Ordering, E>,
) -> Result<Vec<Value>, E> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, cmp)?;
    let right = merge_sort_by(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut li = 0;
    let mut ri = 0;
    while li < left.len() && ri < right.len() {
        if cmp(&left[li], &right[ri])? != Ordering::Greater {
            merged.push(left[li].clone());
            li += 1;
        } else {
            merged.push(right[ri].clone());
            ri += 1;
        }
    }
    merged.extend_from_slice(&left[li..]);
    merged.extend_from_slice(&right[ri..]);
    Ok(merged)
}
