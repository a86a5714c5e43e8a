//! Builtin function implementations.
//!
//! Arity and argument types are verified by the type checker; the
//! checks here mirror them defensively and add the runtime-only ones
//! (negative sqrt, empty list extrema, date format validity). `random`,
//! `timestamp`, and `date` draw from the injected [`Host`] seams.

use crate::{Host, RuntimeErrorKind, Value};
use incant_ir::{Builtin, Ty};
use std::fmt::Write as _;

/// Apply a builtin to already-evaluated arguments.
pub(crate) fn apply(
    builtin: Builtin,
    args: &[Value],
    host: &mut Host,
) -> Result<Value, RuntimeErrorKind> {
    match (builtin, args) {
        (Builtin::Type, [value]) => Ok(Value::string(value.ty().to_string())),

        (Builtin::Length, [Value::String(s)]) => Ok(Value::Number(s.chars().count() as f64)),
        (Builtin::Length, [Value::List { items, .. }]) => Ok(Value::Number(items.len() as f64)),
        (Builtin::Length, [other]) => Err(type_error("length", "a string or list", other)),

        (Builtin::Upper, [value]) => {
            Ok(Value::string(string("upper", value)?.to_uppercase()))
        }
        (Builtin::Lower, [value]) => {
            Ok(Value::string(string("lower", value)?.to_lowercase()))
        }
        (Builtin::Trim, [value]) => Ok(Value::string(string("trim", value)?.trim())),

        (Builtin::Replace, [text, from, to]) => {
            let text = string("replace", text)?;
            let from = string("replace", from)?;
            let to = string("replace", to)?;
            Ok(Value::string(text.replace(from, to)))
        }

        (Builtin::Contains, [Value::String(haystack), needle]) => {
            let needle = string("contains", needle)?;
            Ok(Value::Bool(haystack.contains(needle)))
        }
        (Builtin::Contains, [Value::List { items, .. }, needle]) => {
            Ok(Value::Bool(items.iter().any(|item| item == needle)))
        }
        (Builtin::Contains, [other, _]) => {
            Err(type_error("contains", "a string or list", other))
        }

        (Builtin::StartsWith, [text, prefix]) => {
            let text = string("starts_with", text)?;
            let prefix = string("starts_with", prefix)?;
            Ok(Value::Bool(text.starts_with(prefix)))
        }
        (Builtin::EndsWith, [text, suffix]) => {
            let text = string("ends_with", text)?;
            let suffix = string("ends_with", suffix)?;
            Ok(Value::Bool(text.ends_with(suffix)))
        }

        (Builtin::Abs, [value]) => Ok(Value::Number(number("abs", value)?.abs())),
        (Builtin::Round, [value]) => Ok(Value::Number(number("round", value)?.round())),
        (Builtin::Floor, [value]) => Ok(Value::Number(number("floor", value)?.floor())),
        (Builtin::Ceil, [value]) => Ok(Value::Number(number("ceil", value)?.ceil())),
        (Builtin::Sqrt, [value]) => {
            let value = number("sqrt", value)?;
            if value < 0.0 {
                return Err(RuntimeErrorKind::NegativeSqrt { value });
            }
            Ok(Value::Number(value.sqrt()))
        }
        (Builtin::Pow, [base, exponent]) => {
            let base = number("pow", base)?;
            let exponent = number("pow", exponent)?;
            Ok(Value::Number(base.powf(exponent)))
        }

        (Builtin::Min, args) => extremum("min", args, f64::min),
        (Builtin::Max, args) => extremum("max", args, f64::max),

        (Builtin::Random, [lo, hi]) => {
            let lo = number("random", lo)?;
            let hi = number("random", hi)?;
            Ok(Value::Number(host.rng.uniform(lo, hi)))
        }
        (Builtin::Timestamp, []) => Ok(Value::Number(host.clock.timestamp())),
        (Builtin::Date, [format]) => {
            let format = string("date", format)?;
            let mut rendered = String::new();
            match write!(rendered, "{}", host.clock.now().format(format)) {
                Ok(()) => Ok(Value::string(rendered)),
                Err(_) => Err(RuntimeErrorKind::InvalidDateFormat {
                    format: format.to_string(),
                }),
            }
        }

        (Builtin::Split, args @ ([_] | [_, _])) => {
            let text = string("split", &args[0])?;
            let delimiter = match args.get(1) {
                Some(d) => string("split", d)?,
                None => " ",
            };
            let items: Vec<Value> = if delimiter.is_empty() {
                text.chars().map(|c| Value::string(c.to_string())).collect()
            } else {
                text.split(delimiter).map(Value::string).collect()
            };
            Ok(Value::list(Ty::String, items))
        }
        (Builtin::Join, args @ ([_] | [_, _])) => {
            let Value::List { items, .. } = &args[0] else {
                return Err(type_error("join", "a list of strings", &args[0]));
            };
            let delimiter = match args.get(1) {
                Some(d) => string("join", d)?,
                None => "",
            };
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(string("join", item)?);
            }
            Ok(Value::string(parts.join(delimiter)))
        }

        (builtin, _) => Err(RuntimeErrorKind::BuiltinType {
            name: builtin.name(),
            expected: "different arguments",
            found: Ty::String,
        }),
    }
}

/// Shared implementation of `min`/`max`: 1+ numbers, or one number list.
fn extremum(
    name: &'static str,
    args: &[Value],
    pick: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeErrorKind> {
    let numbers: Vec<f64> = if let [Value::List { items, .. }] = args {
        items
            .iter()
            .map(|item| number(name, item))
            .collect::<Result<_, _>>()?
    } else {
        args.iter()
            .map(|arg| number(name, arg))
            .collect::<Result<_, _>>()?
    };
    let mut best: Option<f64> = None;
    for n in numbers {
        best = Some(match best {
            None => n,
            Some(current) => pick(current, n),
        });
    }
    best.map(Value::Number)
        .ok_or(RuntimeErrorKind::EmptyMinMax { name })
}

fn number(name: &'static str, value: &Value) -> Result<f64, RuntimeErrorKind> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(name, "number arguments", other)),
    }
}

fn string<'v>(name: &'static str, value: &'v Value) -> Result<&'v str, RuntimeErrorKind> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(type_error(name, "string arguments", other)),
    }
}

fn type_error(name: &'static str, expected: &'static str, found: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::BuiltinType {
        name,
        expected,
        found: found.ty(),
    }
}
