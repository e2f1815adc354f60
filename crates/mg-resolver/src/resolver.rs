//! Converter resolution for matched properties.
//!
//! For each matched slot the resolver decides how the source value becomes
//! the target value:
//!
//! 1. Identical types are assigned directly.
//! 2. Nullability is bridged first. A nullable source into a non-null target
//!    fails with [`UnresolvedReason::NullabilityMismatch`] unless
//!    `enforce_not_null` is set, in which case the step records an unsafe
//!    unwrap. Widening and propagation are always allowed.
//! 3. The remaining non-null pair is looked up in the registry. The lowest
//!    priority value wins; a tie at that priority is ambiguous.
//!
//! Resolution never stops early: every slot gets a plan entry.

use mg_core::{
    ConversionStep, NullHandling, PropertyMappingPlan, Resolution, TypeRef, UnresolvedReason,
};
use tracing::debug;

use crate::matcher::{MatchedSlot, SlotMatch};
use crate::registry::{ConverterRegistry, ElementResolver, MAX_COMPOSITION_DEPTH};

/// Resolves conversion steps against a frozen registry.
#[derive(Debug, Clone, Copy)]
pub struct MappingResolver<'a> {
    registry: &'a ConverterRegistry,
    enforce_not_null: bool,
}

impl<'a> MappingResolver<'a> {
    /// Creates a resolver.
    #[must_use]
    pub const fn new(registry: &'a ConverterRegistry, enforce_not_null: bool) -> Self {
        Self {
            registry,
            enforce_not_null,
        }
    }

    /// Produces one plan entry per matched slot, in slot order.
    #[must_use]
    pub fn resolve(&self, slots: Vec<MatchedSlot>) -> Vec<PropertyMappingPlan> {
        slots
            .into_iter()
            .map(|MatchedSlot { slot, candidate }| {
                let resolution = match candidate {
                    SlotMatch::Source {
                        name,
                        ty,
                        by_override,
                    } => match self.resolve_step(&ty, &slot.ty) {
                        Ok(step) if by_override => Resolution::MatchedByOverride { source: name, step },
                        Ok(step) => Resolution::MatchedByName { source: name, step },
                        Err(reason) => {
                            debug!(property = %slot.name, %reason, "Property unresolved");
                            Resolution::Unresolved {
                                source: Some(name),
                                reason,
                            }
                        }
                    },
                    SlotMatch::Constant(value) => Resolution::Constant { value },
                    SlotMatch::Expression(text) => Resolution::Expression { text },
                    SlotMatch::Ignored => Resolution::Ignored,
                    SlotMatch::Unmatched => Resolution::Unresolved {
                        source: None,
                        reason: UnresolvedReason::Unmatched,
                    },
                };
                PropertyMappingPlan::new(slot.name, slot.ty, resolution)
            })
            .collect()
    }

    /// Resolves the conversion of a `source` value into a `target` value.
    ///
    /// # Errors
    ///
    /// Returns the [`UnresolvedReason`] if no conversion is possible.
    pub fn resolve_step(
        &self,
        source: &TypeRef,
        target: &TypeRef,
    ) -> Result<ConversionStep, UnresolvedReason> {
        self.resolve_at(source, target, 0)
    }

    fn resolve_at(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        depth: usize,
    ) -> Result<ConversionStep, UnresolvedReason> {
        if source == target {
            return Ok(ConversionStep::direct(
                source.clone(),
                target.clone(),
                NullHandling::None,
            ));
        }

        let null_handling = match (source.is_nullable(), target.is_nullable()) {
            (true, false) if self.enforce_not_null => NullHandling::UnsafeUnwrap,
            (true, false) => {
                return Err(UnresolvedReason::NullabilityMismatch {
                    from: source.clone(),
                    to: target.clone(),
                });
            }
            (false, true) => NullHandling::Widen,
            (true, true) => NullHandling::Propagate,
            (false, false) => NullHandling::None,
        };

        if source.eq_ignoring_nullability(target) {
            return Ok(ConversionStep::direct(
                source.clone(),
                target.clone(),
                null_handling,
            ));
        }

        if depth >= MAX_COMPOSITION_DEPTH {
            return Err(UnresolvedReason::NoConverter {
                from: source.clone(),
                to: target.clone(),
            });
        }

        let elements = AtDepth {
            resolver: self,
            depth: depth + 1,
        };
        let (from, to) = (source.to_non_null(), target.to_non_null());
        let mut applicable = self.registry.find_applicable(&from, &to, &elements);
        let Some(best) = applicable.first().map(|a| a.converter.priority) else {
            return Err(UnresolvedReason::NoConverter {
                from: source.clone(),
                to: target.clone(),
            });
        };

        let tied = applicable
            .iter()
            .take_while(|a| a.converter.priority == best)
            .count();
        if tied > 1 {
            return Err(UnresolvedReason::AmbiguousConverter {
                from: source.clone(),
                to: target.clone(),
                candidates: applicable[..tied]
                    .iter()
                    .map(|a| a.converter.name.clone())
                    .collect(),
            });
        }

        let chosen = applicable.swap_remove(0);
        debug!(
            converter = %chosen.converter,
            from = %source,
            to = %target,
            depth,
            "Selected converter"
        );

        Ok(ConversionStep {
            source: source.clone(),
            target: target.clone(),
            null_handling,
            converter: Some(chosen.converter),
            elements: chosen.elements,
        })
    }
}

/// Element resolution one composition level deeper.
struct AtDepth<'r, 'a> {
    resolver: &'r MappingResolver<'a>,
    depth: usize,
}

impl ElementResolver for AtDepth<'_, '_> {
    fn resolve_element(&self, source: &TypeRef, target: &TypeRef) -> Option<ConversionStep> {
        self.resolver.resolve_at(source, target, self.depth).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternConverter;
    use mg_core::{Priority, TargetSlot};

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn pattern(name: &str, source: &str, target: &str, priority: u32) -> PatternConverter {
        PatternConverter::parse(name, source, target, Priority::new(priority)).unwrap()
    }

    #[test]
    fn test_identical_types_are_direct() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, false);

        let step = resolver.resolve_step(&ty("List<Int?>?"), &ty("List<Int?>?")).unwrap();
        assert!(step.is_direct());
        assert_eq!(step.null_handling, NullHandling::None);
    }

    #[test]
    fn test_nullability_rules() {
        let registry = ConverterRegistry::standard();
        let strict = MappingResolver::new(&registry, false);
        let lenient = MappingResolver::new(&registry, true);

        assert_eq!(
            strict.resolve_step(&ty("Int?"), &ty("Int")),
            Err(UnresolvedReason::NullabilityMismatch {
                from: ty("Int?"),
                to: ty("Int"),
            })
        );

        let unwrap = lenient.resolve_step(&ty("Int?"), &ty("Int")).unwrap();
        assert!(unwrap.is_direct());
        assert_eq!(unwrap.null_handling, NullHandling::UnsafeUnwrap);

        let widen = strict.resolve_step(&ty("Int"), &ty("Int?")).unwrap();
        assert!(widen.is_direct());
        assert_eq!(widen.null_handling, NullHandling::Widen);

        let propagate = strict.resolve_step(&ty("Int?"), &ty("Long?")).unwrap();
        assert_eq!(propagate.null_handling, NullHandling::Propagate);
        assert_eq!(propagate.converter.unwrap().name, "NumberToNumber");
    }

    #[test]
    fn test_unsafe_unwrap_before_converter() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, true);

        let step = resolver.resolve_step(&ty("Int?"), &ty("Long")).unwrap();
        assert_eq!(step.null_handling, NullHandling::UnsafeUnwrap);
        assert_eq!(step.converter.unwrap().name, "NumberToNumber");
    }

    #[test]
    fn test_lowest_priority_wins_regardless_of_order() {
        for registry in [
            ConverterRegistry::builder()
                .with(pattern("Ten", "Int", "Money", 10))
                .with(pattern("Twenty", "Int", "Money", 20))
                .build(),
            ConverterRegistry::builder()
                .with(pattern("Twenty", "Int", "Money", 20))
                .with(pattern("Ten", "Int", "Money", 10))
                .build(),
        ] {
            let resolver = MappingResolver::new(&registry, false);
            let step = resolver.resolve_step(&ty("Int"), &ty("Money")).unwrap();
            assert_eq!(step.converter.unwrap().name, "Ten");
        }
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let registry = ConverterRegistry::builder()
            .with(pattern("First", "Int", "Money", 10))
            .with(pattern("Second", "*", "Money", 10))
            .with(pattern("Third", "Int", "Money", 20))
            .build();
        let resolver = MappingResolver::new(&registry, false);

        assert_eq!(
            resolver.resolve_step(&ty("Int"), &ty("Money")),
            Err(UnresolvedReason::AmbiguousConverter {
                from: ty("Int"),
                to: ty("Money"),
                candidates: vec!["First".to_owned(), "Second".to_owned()],
            })
        );
    }

    #[test]
    fn test_no_converter() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, false);

        assert_eq!(
            resolver.resolve_step(&ty("Uuid"), &ty("Money")),
            Err(UnresolvedReason::NoConverter {
                from: ty("Uuid"),
                to: ty("Money"),
            })
        );
    }

    #[test]
    fn test_user_converter_beats_builtin() {
        let registry = ConverterRegistry::builder()
            .with_standard_converters()
            .with(pattern("IntToText", "Int", "String", 1000))
            .build();
        let resolver = MappingResolver::new(&registry, false);

        let step = resolver.resolve_step(&ty("Int"), &ty("String")).unwrap();
        assert_eq!(step.converter.unwrap().name, "IntToText");
    }

    #[test]
    fn test_container_composes_element_converter() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, false);

        let step = resolver.resolve_step(&ty("List<Int>"), &ty("Set<Long>")).unwrap();
        assert_eq!(step.converter.as_ref().unwrap().name, "IterableToIterable");
        assert_eq!(step.elements.len(), 1);
        assert_eq!(
            step.elements[0].converter.as_ref().unwrap().name,
            "NumberToNumber"
        );
    }

    #[test]
    fn test_element_nullability_flows_into_container() {
        let registry = ConverterRegistry::standard();
        let strict = MappingResolver::new(&registry, false);
        let lenient = MappingResolver::new(&registry, true);

        assert!(strict.resolve_step(&ty("List<Int?>"), &ty("List<Int>")).is_err());

        let step = lenient.resolve_step(&ty("List<Int?>"), &ty("List<Int>")).unwrap();
        assert!(step.requires_unsafe_unwrap());
    }

    #[test]
    fn test_composition_depth_limit() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, false);

        // Outer container plus one element converter.
        assert!(resolver
            .resolve_step(&ty("List<List<Int>>"), &ty("List<Set<Int>>"))
            .is_ok());

        // A third converter in the chain is refused.
        assert!(resolver
            .resolve_step(&ty("List<List<Int>>"), &ty("List<Set<Long>>"))
            .is_err());

        // Direct steps are accepted at any depth.
        assert!(resolver
            .resolve_step(&ty("List<List<Int>>"), &ty("List<Set<Int?>>"))
            .is_ok());
    }

    #[test]
    fn test_resolve_plan_entries() {
        let registry = ConverterRegistry::standard();
        let resolver = MappingResolver::new(&registry, false);
        let slot = |name: &str, t: &str| TargetSlot {
            name: name.to_owned(),
            ty: ty(t),
            mutable: false,
        };

        let plans = resolver.resolve(vec![
            MatchedSlot {
                slot: slot("a", "Int"),
                candidate: SlotMatch::Source {
                    name: "x".to_owned(),
                    ty: ty("Int"),
                    by_override: true,
                },
            },
            MatchedSlot {
                slot: slot("b", "Int"),
                candidate: SlotMatch::Source {
                    name: "b".to_owned(),
                    ty: ty("Int?"),
                    by_override: false,
                },
            },
            MatchedSlot {
                slot: slot("c", "String"),
                candidate: SlotMatch::Constant("\"n/a\"".to_owned()),
            },
            MatchedSlot {
                slot: slot("d", "String"),
                candidate: SlotMatch::Unmatched,
            },
        ]);

        assert!(matches!(
            &plans[0].resolution,
            Resolution::MatchedByOverride { source, .. } if source == "x"
        ));
        assert_eq!(plans[1].source_property(), Some("b"));
        assert!(plans[1].blocks_construction());
        assert!(plans[2].is_resolved());
        assert_eq!(plans[3].unresolved_reason(), Some(&UnresolvedReason::Unmatched));
    }
}
