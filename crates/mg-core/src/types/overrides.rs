//! User-declared mapping overrides.
//!
//! Overrides arrive as loose declarations ([`OverrideDecl`]) and are validated
//! into [`MappingOverride`] values before resolution begins. An
//! [`OverrideSet`] holds at most one override per target property.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConflictingOverride;
use crate::FxHashMap;

/// How an override populates its target property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OverrideKind {
    /// Read the named source property.
    Source(String),
    /// Insert the literal text verbatim.
    Constant(String),
    /// Insert the expression text verbatim.
    Expression(String),
    /// Leave the property unpopulated.
    Ignore,
}

/// A validated override for one target property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingOverride {
    /// Target property name.
    pub target: String,
    /// How the target is populated.
    pub kind: OverrideKind,
}

/// An override as declared by the user, before validation.
///
/// At most one of `source`, `constant` and `expression` may be set. `ignore`
/// takes precedence over all of them. A declaration with none of them set
/// maps the same-named source property explicitly.
///
/// # Examples
///
/// ```
/// use mg_core::{OverrideDecl, OverrideKind};
///
/// let decl = OverrideDecl::source("fullName", "name");
/// let validated = decl.validate().unwrap();
/// assert_eq!(validated.kind, OverrideKind::Source("name".to_owned()));
///
/// let conflicting = OverrideDecl {
///     constant: Some("1".to_owned()),
///     expression: Some("it.a + 1".to_owned()),
///     ..OverrideDecl::new("a")
/// };
/// assert!(conflicting.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideDecl {
    /// Target property name.
    pub target: String,
    /// Source property to read instead of the same-named one.
    pub source: Option<String>,
    /// Literal text to assign.
    pub constant: Option<String>,
    /// Expression text to assign.
    pub expression: Option<String>,
    /// Leave the target unpopulated.
    pub ignore: bool,
}

impl OverrideDecl {
    /// Creates an empty declaration for `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Declares `target` to be read from `source`.
    #[must_use]
    pub fn source(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(target)
        }
    }

    /// Declares `target` to be assigned a constant.
    #[must_use]
    pub fn constant(target: impl Into<String>, constant: impl Into<String>) -> Self {
        Self {
            constant: Some(constant.into()),
            ..Self::new(target)
        }
    }

    /// Declares `target` to be assigned an expression.
    #[must_use]
    pub fn expression(target: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            expression: Some(expression.into()),
            ..Self::new(target)
        }
    }

    /// Declares `target` as ignored.
    #[must_use]
    pub fn ignore(target: impl Into<String>) -> Self {
        Self {
            ignore: true,
            ..Self::new(target)
        }
    }

    /// Validates the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictingOverride`] if more than one of `source`,
    /// `constant` and `expression` is set and `ignore` is not.
    pub fn validate(self) -> Result<MappingOverride, ConflictingOverride> {
        if self.ignore {
            return Ok(MappingOverride {
                target: self.target,
                kind: OverrideKind::Ignore,
            });
        }

        let mut kinds = Vec::new();
        if self.source.is_some() {
            kinds.push("source");
        }
        if self.constant.is_some() {
            kinds.push("constant");
        }
        if self.expression.is_some() {
            kinds.push("expression");
        }
        if kinds.len() > 1 {
            return Err(ConflictingOverride {
                target: self.target,
                kinds,
            });
        }

        let kind = match (self.source, self.constant, self.expression) {
            (_, Some(constant), _) => OverrideKind::Constant(constant),
            (_, _, Some(expression)) => OverrideKind::Expression(expression),
            (Some(source), _, _) => OverrideKind::Source(source),
            (None, None, None) => OverrideKind::Source(self.target.clone()),
        };

        Ok(MappingOverride {
            target: self.target,
            kind,
        })
    }
}

/// The overrides in effect for one source/target pair.
///
/// Later overrides for the same target replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    by_target: FxHashMap<String, OverrideKind>,
}

impl OverrideSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every declaration and builds the set.
    ///
    /// All declarations are checked before returning, so every conflict is
    /// reported at once.
    ///
    /// # Errors
    ///
    /// Returns every [`ConflictingOverride`] found.
    pub fn from_decls(
        decls: impl IntoIterator<Item = OverrideDecl>,
    ) -> Result<Self, Vec<ConflictingOverride>> {
        let (set, conflicts) = Self::partition(decls);
        if conflicts.is_empty() {
            Ok(set)
        } else {
            Err(conflicts)
        }
    }

    /// Validates every declaration, returning the set of valid overrides
    /// together with the conflicting ones.
    pub fn partition(
        decls: impl IntoIterator<Item = OverrideDecl>,
    ) -> (Self, Vec<ConflictingOverride>) {
        let mut set = Self::new();
        let mut conflicts = Vec::new();

        for decl in decls {
            match decl.validate() {
                Ok(validated) => set.insert(validated),
                Err(conflict) => conflicts.push(conflict),
            }
        }

        (set, conflicts)
    }

    /// Inserts an override, replacing any earlier one for the same target.
    pub fn insert(&mut self, value: MappingOverride) {
        if let Some(previous) = self.by_target.insert(value.target.clone(), value.kind) {
            warn!(property = %value.target, previous = ?previous, "Replaced earlier override");
        }
    }

    /// Returns the override for `target`, if any.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<&OverrideKind> {
        self.by_target.get(target)
    }

    /// Returns the target names in sorted order.
    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<_> = self.by_target.keys().map(String::as_str).collect();
        targets.sort_unstable();
        targets
    }

    /// Returns the number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    /// Returns `true` if there are no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_wins() {
        let decl = OverrideDecl {
            constant: Some("1".to_owned()),
            expression: Some("x".to_owned()),
            ..OverrideDecl::ignore("a")
        };
        assert_eq!(decl.validate().unwrap().kind, OverrideKind::Ignore);
    }

    #[test]
    fn test_bare_declaration_maps_same_name() {
        let validated = OverrideDecl::new("id").validate().unwrap();
        assert_eq!(validated.kind, OverrideKind::Source("id".to_owned()));
    }

    #[test]
    fn test_constant_and_expression_conflict() {
        let decl = OverrideDecl {
            constant: Some("1".to_owned()),
            ..OverrideDecl::expression("a", "x + 1")
        };
        let error = decl.validate().unwrap_err();
        assert_eq!(error.target, "a");
        assert_eq!(error.kinds, vec!["constant", "expression"]);
    }

    #[test]
    fn test_source_and_constant_conflict() {
        let decl = OverrideDecl {
            constant: Some("1".to_owned()),
            ..OverrideDecl::source("a", "b")
        };
        assert_eq!(decl.validate().unwrap_err().kinds, vec!["source", "constant"]);
    }

    #[test]
    fn test_later_override_replaces_earlier() {
        let set = OverrideSet::from_decls([
            OverrideDecl::source("a", "x"),
            OverrideDecl::constant("a", "42"),
        ])
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a"), Some(&OverrideKind::Constant("42".to_owned())));
    }

    #[test]
    fn test_all_conflicts_reported() {
        let bad = |target: &str| OverrideDecl {
            constant: Some("1".to_owned()),
            ..OverrideDecl::expression(target, "y")
        };
        let conflicts =
            OverrideSet::from_decls([bad("a"), OverrideDecl::ignore("b"), bad("c")]).unwrap_err();
        let targets: Vec<_> = conflicts.iter().map(|c| c.target.as_str()).collect();
        assert_eq!(targets, vec!["a", "c"]);
    }

    #[test]
    fn test_partition_keeps_valid_overrides() {
        let bad = OverrideDecl {
            constant: Some("1".to_owned()),
            ..OverrideDecl::source("a", "x")
        };
        let (set, conflicts) = OverrideSet::partition([bad, OverrideDecl::source("b", "y")]);
        assert_eq!(set.targets(), vec!["b"]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].target, "a");
    }

    #[test]
    fn test_targets_sorted() {
        let set =
            OverrideSet::from_decls([OverrideDecl::ignore("b"), OverrideDecl::ignore("a")]).unwrap();
        assert_eq!(set.targets(), vec!["a", "b"]);
    }

    #[test]
    fn test_decl_deserialization() {
        let decl: OverrideDecl =
            serde_json::from_str(r#"{"target": "a", "expression": "source.x * 2"}"#).unwrap();
        assert_eq!(
            decl.validate().unwrap().kind,
            OverrideKind::Expression("source.x * 2".to_owned())
        );
    }
}
