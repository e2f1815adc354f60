//! Mapping plans handed to the emitter.
//!
//! A [`MappingResult`] describes, for one source/target pair, which
//! constructor to call and how every populated target property obtains its
//! value. Plans are plain data: the emitter decides how to render them.

use serde::{Deserialize, Serialize};

use super::converter::ConverterRef;
use super::descriptor::ConstructorSignature;
use super::type_ref::TypeRef;

/// How nullability is bridged between a source and a target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Both sides have the same nullability.
    #[default]
    None,
    /// Non-null source into a nullable target.
    Widen,
    /// Nullable into nullable; the conversion only runs for non-null values.
    Propagate,
    /// Nullable source asserted non-null. Only produced when
    /// `enforce_not_null` is enabled, and must be rendered visibly.
    UnsafeUnwrap,
}

/// A single value conversion, possibly composed of element conversions.
///
/// # Examples
///
/// ```
/// use mg_core::{ConversionStep, NullHandling, TypeRef};
///
/// let step = ConversionStep::direct(
///     "Int?".parse().unwrap(),
///     TypeRef::new("Int"),
///     NullHandling::UnsafeUnwrap,
/// );
/// assert!(step.is_direct());
/// assert!(step.requires_unsafe_unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionStep {
    /// Type of the incoming value.
    pub source: TypeRef,
    /// Type of the produced value.
    pub target: TypeRef,
    /// Nullability bridging applied around the conversion.
    pub null_handling: NullHandling,
    /// Converter applied, or `None` for a direct assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterRef>,
    /// Element conversions composed into a container converter, one per
    /// type argument.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ConversionStep>,
}

impl ConversionStep {
    /// Creates a step that needs no converter.
    #[must_use]
    pub fn direct(source: TypeRef, target: TypeRef, null_handling: NullHandling) -> Self {
        Self {
            source,
            target,
            null_handling,
            converter: None,
            elements: Vec::new(),
        }
    }

    /// Returns `true` if no converter is applied at this level.
    #[inline]
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.converter.is_none()
    }

    /// Returns `true` if this step or any element step asserts non-null.
    #[must_use]
    pub fn requires_unsafe_unwrap(&self) -> bool {
        self.null_handling == NullHandling::UnsafeUnwrap
            || self.elements.iter().any(Self::requires_unsafe_unwrap)
    }
}

/// Why a target property could not be populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No source property with the same name, and no override.
    #[error("no source property with a matching name")]
    Unmatched,

    /// No registered converter accepts the pair.
    #[error("no converter from {from} to {to}")]
    NoConverter {
        /// Source type.
        from: TypeRef,
        /// Target type.
        to: TypeRef,
    },

    /// Several converters tie at the best priority.
    #[error("ambiguous converters from {from} to {to}: {}", .candidates.join(", "))]
    AmbiguousConverter {
        /// Source type.
        from: TypeRef,
        /// Target type.
        to: TypeRef,
        /// Names of the tied converters in registration order.
        candidates: Vec<String>,
    },

    /// Nullable source into a non-null target without `enforce_not_null`.
    #[error("nullable {from} cannot be assigned to non-null {to}")]
    NullabilityMismatch {
        /// Source type.
        from: TypeRef,
        /// Target type.
        to: TypeRef,
    },
}

impl UnresolvedReason {
    /// Returns `true` for conversion failures on a matched pair, as opposed to
    /// a missing source property.
    #[inline]
    #[must_use]
    pub const fn is_conversion_failure(&self) -> bool {
        !matches!(self, Self::Unmatched)
    }
}

/// The outcome for one target property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Source property with the same name.
    MatchedByName {
        /// Source property name.
        source: String,
        /// Conversion applied to the source value.
        step: ConversionStep,
    },
    /// Source property named by an override.
    MatchedByOverride {
        /// Source property name.
        source: String,
        /// Conversion applied to the source value.
        step: ConversionStep,
    },
    /// Literal text, inserted verbatim.
    Constant {
        /// The literal.
        value: String,
    },
    /// Expression text, inserted verbatim.
    Expression {
        /// The expression.
        text: String,
    },
    /// Explicitly left unpopulated.
    Ignored,
    /// Could not be populated.
    Unresolved {
        /// Source property involved, if one was matched.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        /// Why resolution failed.
        reason: UnresolvedReason,
    },
}

/// When a property value is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPhase {
    /// Passed as a constructor argument.
    #[default]
    Constructor,
    /// Assigned after construction.
    PostConstruction,
}

/// The resolved outcome for one target property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyMappingPlan {
    /// Target property name.
    pub target: String,
    /// Target property type.
    pub target_type: TypeRef,
    /// How the property is populated.
    pub resolution: Resolution,
    /// When the value is supplied.
    pub phase: AssignmentPhase,
}

impl PropertyMappingPlan {
    /// Creates a plan entry in the constructor phase.
    #[must_use]
    pub fn new(target: impl Into<String>, target_type: TypeRef, resolution: Resolution) -> Self {
        Self {
            target: target.into(),
            target_type,
            resolution,
            phase: AssignmentPhase::Constructor,
        }
    }

    /// Returns `true` if the entry supplies a value.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !self.blocks_construction()
    }

    /// Returns `true` if the entry cannot satisfy a required parameter.
    #[must_use]
    pub const fn blocks_construction(&self) -> bool {
        matches!(
            self.resolution,
            Resolution::Ignored | Resolution::Unresolved { .. }
        )
    }

    /// Returns the source property read by this entry, if any.
    #[must_use]
    pub fn source_property(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::MatchedByName { source, .. } | Resolution::MatchedByOverride { source, .. } => {
                Some(source)
            }
            Resolution::Unresolved { source, .. } => source.as_deref(),
            Resolution::Constant { .. } | Resolution::Expression { .. } | Resolution::Ignored => None,
        }
    }

    /// Returns the conversion step, if the entry reads a source property.
    #[must_use]
    pub const fn step(&self) -> Option<&ConversionStep> {
        match &self.resolution {
            Resolution::MatchedByName { step, .. } | Resolution::MatchedByOverride { step, .. } => {
                Some(step)
            }
            _ => None,
        }
    }

    /// Returns the top-level converter chosen for this entry, if any.
    #[must_use]
    pub fn converter(&self) -> Option<&ConverterRef> {
        self.step().and_then(|step| step.converter.as_ref())
    }

    /// Returns the failure reason for an unresolved entry.
    #[must_use]
    pub const fn unresolved_reason(&self) -> Option<&UnresolvedReason> {
        match &self.resolution {
            Resolution::Unresolved { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A target property that could not be populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedProperty {
    /// Target property name.
    pub name: String,
    /// Target property type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Why it could not be populated.
    pub reason: UnresolvedReason,
}

/// The full plan for one source/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingResult {
    /// Qualified source type name.
    pub source_type: String,
    /// Qualified target type name.
    pub target_type: String,
    /// Signature of the chosen constructor.
    pub constructor: ConstructorSignature,
    /// Declaration index of the chosen constructor.
    pub constructor_index: usize,
    /// Constructor arguments in parameter order, then post-construction
    /// assignments in property declaration order.
    pub properties: Vec<PropertyMappingPlan>,
    /// Matched properties whose conversion failed without blocking
    /// construction. Empty for a complete mapping.
    pub unresolved: Vec<UnresolvedProperty>,
}

impl MappingResult {
    /// Returns the entries passed to the constructor.
    pub fn constructor_arguments(&self) -> impl Iterator<Item = &PropertyMappingPlan> {
        self.properties
            .iter()
            .filter(|p| p.phase == AssignmentPhase::Constructor)
    }

    /// Returns the entries assigned after construction.
    pub fn post_construction(&self) -> impl Iterator<Item = &PropertyMappingPlan> {
        self.properties
            .iter()
            .filter(|p| p.phase == AssignmentPhase::PostConstruction)
    }

    /// Returns the entry for the given target property, if present.
    #[must_use]
    pub fn property(&self, target: &str) -> Option<&PropertyMappingPlan> {
        self.properties.iter().find(|p| p.target == target)
    }

    /// Returns `true` if no matched property was left unresolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns `true` if any entry relies on an unsafe non-null assertion.
    #[must_use]
    pub fn requires_unsafe_unwrap(&self) -> bool {
        self.properties
            .iter()
            .filter_map(PropertyMappingPlan::step)
            .any(ConversionStep::requires_unsafe_unwrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_blocking_resolutions() {
        let ignored = PropertyMappingPlan::new("a", ty("Int"), Resolution::Ignored);
        assert!(ignored.blocks_construction());

        let unresolved = PropertyMappingPlan::new(
            "a",
            ty("Int"),
            Resolution::Unresolved {
                source: None,
                reason: UnresolvedReason::Unmatched,
            },
        );
        assert!(unresolved.blocks_construction());
        assert_eq!(unresolved.unresolved_reason(), Some(&UnresolvedReason::Unmatched));

        let constant = PropertyMappingPlan::new(
            "a",
            ty("Int"),
            Resolution::Constant {
                value: "0".to_owned(),
            },
        );
        assert!(constant.is_resolved());
        assert!(constant.source_property().is_none());
    }

    #[test]
    fn test_nested_unsafe_unwrap() {
        let element = ConversionStep::direct(ty("Int?"), ty("Int"), NullHandling::UnsafeUnwrap);
        let outer = ConversionStep {
            source: ty("List<Int?>"),
            target: ty("List<Int>"),
            null_handling: NullHandling::None,
            converter: Some(ConverterRef {
                index: 0,
                name: "IterableToIterable".to_owned(),
                priority: crate::Priority::BUILTIN,
            }),
            elements: vec![element],
        };
        assert!(!outer.is_direct());
        assert!(outer.requires_unsafe_unwrap());
    }

    #[test]
    fn test_reason_display() {
        let reason = UnresolvedReason::AmbiguousConverter {
            from: ty("Int"),
            to: ty("String"),
            candidates: vec!["A".to_owned(), "B".to_owned()],
        };
        insta::assert_snapshot!(
            reason.to_string(),
            @"ambiguous converters from Int to String: A, B"
        );
        assert!(reason.is_conversion_failure());
        assert!(!UnresolvedReason::Unmatched.is_conversion_failure());
    }

    #[test]
    fn test_resolution_serialization_shape() {
        let plan = PropertyMappingPlan::new(
            "a",
            ty("Int"),
            Resolution::Unresolved {
                source: Some("x".to_owned()),
                reason: UnresolvedReason::NullabilityMismatch {
                    from: ty("Int?"),
                    to: ty("Int"),
                },
            },
        );
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["resolution"]["kind"], "unresolved");
        assert_eq!(value["resolution"]["reason"]["reason"], "nullability_mismatch");
        assert_eq!(value["resolution"]["reason"]["from"], "Int?");
        assert_eq!(value["phase"], "constructor");
    }
}
