//! Structural type identities.
//!
//! A [`TypeRef`] is the semantic identity of a type as seen by the resolver:
//! its fully-qualified name, its nullability, and its generic arguments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::syntax::TypeSyntax;
use crate::error::TypeParseError;

/// Semantic identity of a type.
///
/// Two references are equal iff their names, nullability and all generic
/// arguments (recursively) are equal. References serialize to their textual
/// form, e.g. `"List<Int?>"`.
///
/// # Examples
///
/// ```
/// use mg_core::TypeRef;
///
/// let list: TypeRef = "List<Int?>".parse().unwrap();
/// assert_eq!(list.name, "List");
/// assert!(list.arguments[0].nullable);
/// assert_eq!(list.to_string(), "List<Int?>");
///
/// let nullable = list.to_nullable();
/// assert_ne!(list, nullable);
/// assert_eq!(list, nullable.to_non_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Fully-qualified type name.
    pub name: String,
    /// Whether the type admits `null`.
    pub nullable: bool,
    /// Generic type arguments in declaration order.
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    /// Creates a non-null reference without type arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            arguments: Vec::new(),
        }
    }

    /// Creates a non-null generic reference.
    #[must_use]
    pub fn generic(name: impl Into<String>, arguments: impl IntoIterator<Item = Self>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            arguments: arguments.into_iter().collect(),
        }
    }

    /// Returns `true` if the type admits `null`.
    #[inline]
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns a copy of this reference marked nullable.
    #[must_use]
    pub fn to_nullable(&self) -> Self {
        Self {
            nullable: true,
            ..self.clone()
        }
    }

    /// Returns a copy of this reference marked non-null.
    ///
    /// Only the outer type is affected; arguments keep their nullability.
    #[must_use]
    pub fn to_non_null(&self) -> Self {
        Self {
            nullable: false,
            ..self.clone()
        }
    }

    /// Returns the last segment of the qualified name.
    ///
    /// ```
    /// use mg_core::TypeRef;
    ///
    /// assert_eq!(TypeRef::new("com.example.User").simple_name(), "User");
    /// assert_eq!(TypeRef::new("Int").simple_name(), "Int");
    /// ```
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Returns `true` if both references denote the same type once
    /// nullability of the outer type is ignored.
    #[must_use]
    pub fn eq_ignoring_nullability(&self, other: &Self) -> bool {
        self.name == other.name && self.arguments == other.arguments
    }

    fn from_syntax(syntax: TypeSyntax, input: &str) -> Result<Self, TypeParseError> {
        if syntax.name == "*" {
            return Err(TypeParseError::Wildcard {
                input: input.to_owned(),
            });
        }

        let arguments = syntax
            .arguments
            .into_iter()
            .map(|arg| Self::from_syntax(arg, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: syntax.name,
            nullable: syntax.nullable,
            arguments,
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = TypeSyntax::parse(s)?;
        Self::from_syntax(syntax, s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a: TypeRef = "Map<String, List<Int>>".parse().unwrap();
        let b = TypeRef::generic(
            "Map",
            [
                TypeRef::new("String"),
                TypeRef::generic("List", [TypeRef::new("Int")]),
            ],
        );
        assert_eq!(a, b);

        let c: TypeRef = "Map<String, List<Int?>>".parse().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_nullability_helpers() {
        let int: TypeRef = "Int?".parse().unwrap();
        assert!(int.is_nullable());
        assert!(!int.to_non_null().is_nullable());
        assert!(int.eq_ignoring_nullability(&TypeRef::new("Int")));
        assert!(!int.eq_ignoring_nullability(&TypeRef::new("Long")));
    }

    #[test]
    fn test_display_is_canonical() {
        let ty: TypeRef = "Map<String,List< Int? >>?".parse().unwrap();
        assert_eq!(ty.to_string(), "Map<String, List<Int?>>?");
    }

    #[test]
    fn test_wildcard_rejected() {
        assert!(matches!(
            "List<*>".parse::<TypeRef>(),
            Err(TypeParseError::Wildcard { .. })
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let ty: TypeRef = "List<Int?>".parse().unwrap();
        assert_eq!(serde_json::to_string(&ty).unwrap(), r#""List<Int?>""#);

        let parsed: TypeRef = serde_json::from_str(r#""List<Int?>""#).unwrap();
        assert_eq!(parsed, ty);

        assert!(serde_json::from_str::<TypeRef>(r#""List<""#).is_err());
    }
}
