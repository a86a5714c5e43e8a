//! Runtime values.

use incant_ir::Ty;
use std::fmt;

/// A runtime value. Lists carry their element descriptor so empty lists
/// stay typed; every element of a list has that structural type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List { elem: Ty, items: Vec<Value> },
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    #[inline]
    pub fn list(elem: Ty, items: Vec<Value>) -> Self {
        Value::List { elem, items }
    }

    /// The structural type of this value.
    pub fn ty(&self) -> Ty {
        match self {
            Value::Bool(_) => Ty::Bool,
            Value::Number(_) => Ty::Number,
            Value::String(_) => Ty::String,
            Value::List { elem, .. } => Ty::list(elem.clone()),
        }
    }

    /// Render the value as user-facing text.
    ///
    /// Numbers drop a trailing `.0`, bools render `true`/`false`,
    /// strings pass through unquoted, lists render as a bracketed,
    /// comma-joined sequence of recursively rendered elements.
    pub fn render(&self) -> String {
        match self {
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Number(n) => render_number(*n),
            Value::String(s) => s.clone(),
            Value::List { items, .. } => {
                let rendered: Vec<String> = items.iter().map(Value::render).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a number the way the language prints it: integral values lose
/// the fractional part entirely.
pub fn render_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        if value == 0.0 {
            // Avoids "-0".
            return "0".to_string();
        }
        return format!("{value:.0}");
    }
    value.to_string()
}

/// Parse the text accepted by the `$` conversion: optional surrounding
/// whitespace, an optional sign, digits, an optional fraction. This is
/// deliberately narrower than `f64::from_str` (no exponents, no `inf`,
/// no leading dot), matching the language's own number grammar.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let unsigned = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    if unsigned.is_empty() {
        return None;
    }
    let mut parts = unsigned.splitn(2, '.');
    let integral = parts.next()?;
    if integral.is_empty() || !integral.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = parts.next() {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_number_drops_trailing_zero() {
        assert_eq!(render_number(42.0), "42");
        assert_eq!(render_number(3.0), "3");
        assert_eq!(render_number(3.5), "3.5");
        assert_eq!(render_number(-2.0), "-2");
        assert_eq!(render_number(-0.0), "0");
    }

    #[test]
    fn render_list_recursively() {
        let value = Value::list(
            Ty::list(Ty::Number),
            vec![
                Value::list(Ty::Number, vec![Value::Number(1.0), Value::Number(2.0)]),
                Value::list(Ty::Number, vec![]),
            ],
        );
        assert_eq!(value.render(), "[[1, 2], []]");
    }

    #[test]
    fn render_strings_unquoted() {
        let value = Value::list(
            Ty::String,
            vec![Value::string("a"), Value::string("b")],
        );
        assert_eq!(value.render(), "[a, b]");
    }

    #[test]
    fn value_ty_of_empty_list() {
        let value = Value::list(Ty::String, vec![]);
        assert_eq!(value.ty(), Ty::list(Ty::String));
    }

    #[test]
    fn parse_number_accepts_signed_decimals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("+7"), Some(7.0));
    }

    #[test]
    fn parse_number_rejects_non_grammar_floats() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number(".5"), None);
        assert_eq!(parse_number("5."), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1 2"), None);
    }
}
