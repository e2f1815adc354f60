//! Property matching.
//!
//! Pairs every target slot with the value source that will populate it:
//! a source property (by override or by name), a verbatim constant or
//! expression, or nothing at all. Types are not inspected here; that is the
//! resolver's job.

use mg_core::{OverrideKind, OverrideSet, TargetSlot, TypeDescriptor, TypeRef};
use tracing::{debug, warn};

use crate::error::MappingError;

/// What a target slot will be populated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMatch {
    /// A source property.
    Source {
        /// Source property name.
        name: String,
        /// Source property type.
        ty: TypeRef,
        /// Whether an override named the property.
        by_override: bool,
    },
    /// Literal text from an override.
    Constant(String),
    /// Expression text from an override.
    Expression(String),
    /// Explicitly ignored by an override.
    Ignored,
    /// No source property with the slot's name.
    Unmatched,
}

/// A target slot and its match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSlot {
    /// The slot to populate.
    pub slot: TargetSlot,
    /// Where its value comes from.
    pub candidate: SlotMatch,
}

/// Matches every slot of `target` against `source`.
///
/// Overrides take precedence over name matching. Matching is exact and
/// case-sensitive.
///
/// # Errors
///
/// Returns one [`MappingError::PropertyNotFound`] per override naming a
/// source property that `source` does not have. All slots are checked
/// before returning.
pub fn match_properties(
    source: &TypeDescriptor,
    target: &TypeDescriptor,
    overrides: &OverrideSet,
) -> Result<Vec<MatchedSlot>, Vec<MappingError>> {
    let slots = target.target_slots();

    for name in overrides.targets() {
        if !slots.iter().any(|slot| slot.name == name) {
            warn!(
                property = name,
                target_type = %target.name,
                "Override names no constructor parameter or mutable property"
            );
        }
    }

    let mut errors = Vec::new();
    let mut matched = Vec::with_capacity(slots.len());

    for slot in slots {
        let candidate = match overrides.get(&slot.name) {
            Some(OverrideKind::Ignore) => SlotMatch::Ignored,
            Some(OverrideKind::Constant(value)) => SlotMatch::Constant(value.clone()),
            Some(OverrideKind::Expression(text)) => SlotMatch::Expression(text.clone()),
            Some(OverrideKind::Source(name)) => {
                if let Some(property) = source.property(name) {
                    SlotMatch::Source {
                        name: property.name.clone(),
                        ty: property.ty.clone(),
                        by_override: true,
                    }
                } else {
                    errors.push(MappingError::property_not_found(
                        &slot.name,
                        name,
                        source.property_names(),
                    ));
                    continue;
                }
            }
            None => source
                .property(&slot.name)
                .map_or(SlotMatch::Unmatched, |property| SlotMatch::Source {
                    name: property.name.clone(),
                    ty: property.ty.clone(),
                    by_override: false,
                }),
        };

        debug!(property = %slot.name, candidate = ?candidate, "Matched slot");
        matched.push(MatchedSlot { slot, candidate });
    }

    if errors.is_empty() {
        Ok(matched)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_core::{ConstructorDescriptor, OverrideDecl, PropertyDescriptor};

    fn prop(name: &str, ty: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty.parse().unwrap())
    }

    fn overrides(decls: Vec<OverrideDecl>) -> OverrideSet {
        OverrideSet::from_decls(decls).unwrap()
    }

    fn source() -> TypeDescriptor {
        TypeDescriptor::new("S")
            .with_property(prop("x", "Int"))
            .with_property(prop("y", "String"))
    }

    fn target() -> TypeDescriptor {
        let params = [prop("a", "Int"), prop("y", "String"), prop("z", "Long")];
        TypeDescriptor::new("T")
            .with_property(prop("a", "Int"))
            .with_property(prop("y", "String"))
            .with_property(prop("z", "Long"))
            .with_property(prop("note", "String?").settable())
            .with_constructor(ConstructorDescriptor::new(params))
    }

    #[test]
    fn test_match_by_name_and_unmatched() {
        let matched = match_properties(&source(), &target(), &OverrideSet::new()).unwrap();
        let candidates: Vec<_> = matched.iter().map(|m| &m.candidate).collect();

        assert_eq!(candidates[0], &SlotMatch::Unmatched);
        assert_eq!(
            candidates[1],
            &SlotMatch::Source {
                name: "y".to_owned(),
                ty: "String".parse().unwrap(),
                by_override: false,
            }
        );
        assert_eq!(candidates[2], &SlotMatch::Unmatched);
        assert_eq!(matched[3].slot.name, "note");
        assert!(matched[3].slot.mutable);
    }

    #[test]
    fn test_override_kinds() {
        let set = overrides(vec![
            OverrideDecl::source("a", "x"),
            OverrideDecl::constant("z", "0L"),
            OverrideDecl::expression("note", "it.y.trim()"),
            OverrideDecl::ignore("y"),
        ]);
        let matched = match_properties(&source(), &target(), &set).unwrap();

        assert!(matches!(
            &matched[0].candidate,
            SlotMatch::Source { name, by_override: true, .. } if name == "x"
        ));
        assert_eq!(matched[1].candidate, SlotMatch::Ignored);
        assert_eq!(matched[2].candidate, SlotMatch::Constant("0L".to_owned()));
        assert_eq!(
            matched[3].candidate,
            SlotMatch::Expression("it.y.trim()".to_owned())
        );
    }

    #[test]
    fn test_property_not_found_collects_all() {
        let set = overrides(vec![
            OverrideDecl::source("a", "missing"),
            OverrideDecl::source("z", "absent"),
            OverrideDecl::new("y"),
        ]);
        let errors = match_properties(&source(), &target(), &set).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            MappingError::property_not_found(
                "a",
                "missing",
                vec!["x".to_owned(), "y".to_owned()]
            )
        );
        assert!(matches!(
            &errors[1],
            MappingError::PropertyNotFound { source_property, .. } if source_property == "absent"
        ));
    }

    #[test]
    fn test_bare_override_on_missing_source_fails() {
        let set = overrides(vec![OverrideDecl::new("z")]);
        let errors = match_properties(&source(), &target(), &set).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_override_on_unknown_target_is_ignored() {
        let set = overrides(vec![OverrideDecl::constant("nope", "1")]);
        let matched = match_properties(&source(), &target(), &set).unwrap();
        assert_eq!(matched.len(), 4);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let source = TypeDescriptor::new("S").with_property(prop("A", "Int"));
        let matched = match_properties(&source, &target(), &OverrideSet::new()).unwrap();
        assert_eq!(matched[0].candidate, SlotMatch::Unmatched);
    }
}
