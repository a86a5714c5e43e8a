//! Builtin signature checking.
//!
//! One arm per catalogue entry; the table in the engine documentation is
//! the contract and must not drift. Anything the checker admits here the
//! evaluator must implement without further type errors.

use crate::checker::TypeChecker;
use crate::error::{TypeError, TypeErrorKind};
use incant_ir::{Builtin, Span, Ty};

impl TypeChecker<'_> {
    /// Check a resolved builtin call and return its result type.
    pub(crate) fn check_builtin(
        &self,
        builtin: Builtin,
        call_span: Span,
        args: &[(Ty, Span)],
    ) -> Result<Ty, TypeError> {
        let name = builtin.name();
        match builtin {
            Builtin::Type => {
                self.arity(name, "exactly 1 argument", args.len() == 1, args, call_span)?;
                Ok(Ty::String)
            }
            Builtin::Length => {
                self.arity(name, "exactly 1 argument", args.len() == 1, args, call_span)?;
                let (ty, span) = &args[0];
                if !ty.is_string() && ty.elem().is_none() {
                    return Err(self.arg_err(name, 1, "a string or list", ty, *span));
                }
                Ok(Ty::Number)
            }
            Builtin::Upper | Builtin::Lower | Builtin::Trim => {
                self.arity(name, "exactly 1 argument", args.len() == 1, args, call_span)?;
                self.arg(name, 1, &Ty::String, "a string", &args[0])?;
                Ok(Ty::String)
            }
            Builtin::Replace => {
                self.arity(name, "exactly 3 arguments", args.len() == 3, args, call_span)?;
                for (index, arg) in args.iter().enumerate() {
                    self.arg(name, index + 1, &Ty::String, "a string", arg)?;
                }
                Ok(Ty::String)
            }
            Builtin::Contains => {
                self.arity(name, "exactly 2 arguments", args.len() == 2, args, call_span)?;
                let (haystack, haystack_span) = &args[0];
                let (needle, needle_span) = &args[1];
                match haystack {
                    Ty::String => {
                        self.arg(name, 2, &Ty::String, "a string", &args[1])?;
                    }
                    Ty::List(elem) => {
                        if needle != elem.as_ref() {
                            return Err(self.arg_err(
                                name,
                                2,
                                "an element of the haystack list",
                                needle,
                                *needle_span,
                            ));
                        }
                    }
                    _ => {
                        return Err(self.arg_err(
                            name,
                            1,
                            "a string or list",
                            haystack,
                            *haystack_span,
                        ));
                    }
                }
                Ok(Ty::Bool)
            }
            Builtin::StartsWith | Builtin::EndsWith => {
                self.arity(name, "exactly 2 arguments", args.len() == 2, args, call_span)?;
                self.arg(name, 1, &Ty::String, "a string", &args[0])?;
                self.arg(name, 2, &Ty::String, "a string", &args[1])?;
                Ok(Ty::Bool)
            }
            Builtin::Abs | Builtin::Round | Builtin::Floor | Builtin::Ceil | Builtin::Sqrt => {
                self.arity(name, "exactly 1 argument", args.len() == 1, args, call_span)?;
                self.arg(name, 1, &Ty::Number, "a number", &args[0])?;
                Ok(Ty::Number)
            }
            Builtin::Pow | Builtin::Random => {
                self.arity(name, "exactly 2 arguments", args.len() == 2, args, call_span)?;
                self.arg(name, 1, &Ty::Number, "a number", &args[0])?;
                self.arg(name, 2, &Ty::Number, "a number", &args[1])?;
                Ok(Ty::Number)
            }
            Builtin::Min | Builtin::Max => {
                self.arity(name, "at least 1 argument", !args.is_empty(), args, call_span)?;
                // Single-list overload: min(list<number>).
                if args.len() == 1 {
                    if let (Ty::List(elem), span) = &args[0] {
                        if !elem.is_number() {
                            return Err(self.arg_err(
                                name,
                                1,
                                "a list of numbers",
                                &args[0].0,
                                *span,
                            ));
                        }
                        return Ok(Ty::Number);
                    }
                }
                for (index, arg) in args.iter().enumerate() {
                    self.arg(name, index + 1, &Ty::Number, "a number", arg)?;
                }
                Ok(Ty::Number)
            }
            Builtin::Timestamp => {
                self.arity(name, "no arguments", args.is_empty(), args, call_span)?;
                Ok(Ty::Number)
            }
            Builtin::Date => {
                self.arity(name, "exactly 1 argument", args.len() == 1, args, call_span)?;
                self.arg(name, 1, &Ty::String, "a string", &args[0])?;
                Ok(Ty::String)
            }
            Builtin::Split => {
                self.arity(
                    name,
                    "1 or 2 arguments",
                    (1..=2).contains(&args.len()),
                    args,
                    call_span,
                )?;
                self.arg(name, 1, &Ty::String, "a string", &args[0])?;
                if let Some(delim) = args.get(1) {
                    self.arg(name, 2, &Ty::String, "a string", delim)?;
                }
                Ok(Ty::list(Ty::String))
            }
            Builtin::Join => {
                self.arity(
                    name,
                    "1 or 2 arguments",
                    (1..=2).contains(&args.len()),
                    args,
                    call_span,
                )?;
                self.arg(name, 1, &Ty::list(Ty::String), "a list of strings", &args[0])?;
                if let Some(delim) = args.get(1) {
                    self.arg(name, 2, &Ty::String, "a string", delim)?;
                }
                Ok(Ty::String)
            }
        }
    }

    fn arity(
        &self,
        name: &'static str,
        expected: &'static str,
        ok: bool,
        args: &[(Ty, Span)],
        call_span: Span,
    ) -> Result<(), TypeError> {
        if ok {
            return Ok(());
        }
        Err(self.err(
            TypeErrorKind::BuiltinArity {
                name,
                expected,
                found: args.len(),
            },
            call_span,
        ))
    }

    fn arg(
        &self,
        name: &'static str,
        index: usize,
        expected_ty: &Ty,
        expected: &'static str,
        arg: &(Ty, Span),
    ) -> Result<(), TypeError> {
        let (ty, span) = arg;
        if ty == expected_ty {
            return Ok(());
        }
        Err(self.arg_err(name, index, expected, ty, *span))
    }

    fn arg_err(
        &self,
        name: &'static str,
        index: usize,
        expected: &'static str,
        found: &Ty,
        span: Span,
    ) -> TypeError {
        self.err(
            TypeErrorKind::BuiltinArgMismatch {
                name,
                index,
                expected,
                found: found.clone(),
            },
            span,
        )
    }
}
