//! Structural type descriptors.

use std::fmt;

/// The type of an incant value or expression.
///
/// Types are compared structurally: two `list<list<number>>` descriptors
/// built independently are equal. There is no nominal typing and no
/// implicit widening anywhere in the language.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ty {
    Bool,
    Number,
    String,
    List(Box<Ty>),
}

impl Ty {
    /// Build a list type with the given element type.
    #[inline]
    pub fn list(elem: Ty) -> Self {
        Ty::List(Box::new(elem))
    }

    /// The element type, if this is a list.
    #[inline]
    pub fn elem(&self) -> Option<&Ty> {
        match self {
            Ty::List(elem) => Some(elem),
            _ => None,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Ty::Number)
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Ty::String)
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Ty::Bool)
    }

    /// Whether values of this type convert with `$`, `#`, and `?`.
    ///
    /// The conversion operators accept every scalar type and reject lists.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Ty::List(_))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Bool => f.write_str("bool"),
            Ty::Number => f.write_str("number"),
            Ty::String => f.write_str("string"),
            Ty::List(elem) => write!(f, "list<{elem}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_nested_list() {
        let ty = Ty::list(Ty::list(Ty::String));
        assert_eq!(ty.to_string(), "list<list<string>>");
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Ty::list(Ty::Number), Ty::list(Ty::Number));
        assert_ne!(Ty::list(Ty::Number), Ty::list(Ty::String));
        assert_ne!(Ty::Number, Ty::list(Ty::Number));
    }

    #[test]
    fn scalar_check() {
        assert!(Ty::Bool.is_scalar());
        assert!(Ty::Number.is_scalar());
        assert!(Ty::String.is_scalar());
        assert!(!Ty::list(Ty::Number).is_scalar());
    }
}
