//! The closed builtin function catalogue.
//!
//! Builtins are addressed by a literal name at the call site
//! (`'length'(text)`) and resolved to this enum during type checking, so
//! the interpreter never performs a string-keyed lookup. Signature
//! checking lives in the type checker; implementations live in the
//! evaluator. `sort` is not listed here because its comparator form has
//! its own grammar and AST node.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `type(any) -> string` - structural type name of the argument.
    Type,
    /// `length(string | list<T>) -> number`
    Length,
    /// `upper(string) -> string`
    Upper,
    /// `lower(string) -> string`
    Lower,
    /// `trim(string) -> string`
    Trim,
    /// `replace(string, string, string) -> string`
    Replace,
    /// `contains(string, string) -> bool` or `contains(list<T>, T) -> bool`
    Contains,
    /// `starts_with(string, string) -> bool`
    StartsWith,
    /// `ends_with(string, string) -> bool`
    EndsWith,
    /// `abs(number) -> number`
    Abs,
    /// `min(number, ...) -> number` or `min(list<number>) -> number`
    Min,
    /// `max(number, ...) -> number` or `max(list<number>) -> number`
    Max,
    /// `round(number) -> number`
    Round,
    /// `floor(number) -> number`
    Floor,
    /// `ceil(number) -> number`
    Ceil,
    /// `sqrt(number >= 0) -> number`
    Sqrt,
    /// `pow(number, number) -> number`
    Pow,
    /// `random(number, number) -> number`
    Random,
    /// `timestamp() -> number` - seconds since the Unix epoch.
    Timestamp,
    /// `date(string) -> string` - current date through a strftime format.
    Date,
    /// `split(string[, string]) -> list<string>` - delimiter defaults to a space.
    Split,
    /// `join(list<string>[, string]) -> string` - delimiter defaults to empty.
    Join,
}

impl Builtin {
    /// Resolve a call-site name. Returns `None` for unknown names; the
    /// type checker turns that into an error naming the call site.
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "type" => Builtin::Type,
            "length" => Builtin::Length,
            "upper" => Builtin::Upper,
            "lower" => Builtin::Lower,
            "trim" => Builtin::Trim,
            "replace" => Builtin::Replace,
            "contains" => Builtin::Contains,
            "starts_with" => Builtin::StartsWith,
            "ends_with" => Builtin::EndsWith,
            "abs" => Builtin::Abs,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "round" => Builtin::Round,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "sqrt" => Builtin::Sqrt,
            "pow" => Builtin::Pow,
            "random" => Builtin::Random,
            "timestamp" => Builtin::Timestamp,
            "date" => Builtin::Date,
            "split" => Builtin::Split,
            "join" => Builtin::Join,
            _ => return None,
        };
        Some(builtin)
    }

    /// The call-site name of this builtin.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Type => "type",
            Builtin::Length => "length",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Trim => "trim",
            Builtin::Replace => "replace",
            Builtin::Contains => "contains",
            Builtin::StartsWith => "starts_with",
            Builtin::EndsWith => "ends_with",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Round => "round",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Sqrt => "sqrt",
            Builtin::Pow => "pow",
            Builtin::Random => "random",
            Builtin::Timestamp => "timestamp",
            Builtin::Date => "date",
            Builtin::Split => "split",
            Builtin::Join => "join",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_round_trip() {
        let all = [
            Builtin::Type,
            Builtin::Length,
            Builtin::Upper,
            Builtin::Lower,
            Builtin::Trim,
            Builtin::Replace,
            Builtin::Contains,
            Builtin::StartsWith,
            Builtin::EndsWith,
            Builtin::Abs,
            Builtin::Min,
            Builtin::Max,
            Builtin::Round,
            Builtin::Floor,
            Builtin::Ceil,
            Builtin::Sqrt,
            Builtin::Pow,
            Builtin::Random,
            Builtin::Timestamp,
            Builtin::Date,
            Builtin::Split,
            Builtin::Join,
        ];
        for builtin in all {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
    }

    #[test]
    fn unknown_and_sort_are_not_in_the_catalogue() {
        assert_eq!(Builtin::from_name("frobnicate"), None);
        // sort has its own grammar and AST node
        assert_eq!(Builtin::from_name("sort"), None);
    }
}
