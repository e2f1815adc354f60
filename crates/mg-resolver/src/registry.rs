//! Converter registry.
//!
//! The registry holds every [`TypeConverter`] available to one generation run.
//! It is assembled with a [`RegistryBuilder`] and frozen by
//! [`RegistryBuilder::build`]. The frozen [`ConverterRegistry`] has no
//! mutation API, so once it is shared (typically as an
//! `Arc<ConverterRegistry>`) every lookup sees the same converters.
//!
//! # Usage
//!
//! ```
//! use mg_core::{Priority, TypeRef};
//! use mg_resolver::{ConverterRegistry, PatternConverter};
//!
//! let registry = ConverterRegistry::builder()
//!     .with_standard_converters()
//!     .with(PatternConverter::parse("UuidToString", "Uuid", "String", Priority::USER_DEFAULT).unwrap())
//!     .build();
//!
//! let names: Vec<_> = registry.iter().map(|c| c.name).collect();
//! assert!(names.contains(&"UuidToString".to_owned()));
//! ```
//!
//! # Composition
//!
//! Container converters (lists, maps) do not know how to convert their
//! elements. They receive an [`ElementResolver`] and ask it for one
//! [`ConversionStep`] per type argument. The resolver limits how deep such
//! compositions may go; see [`MAX_COMPOSITION_DEPTH`].

use std::fmt;

use mg_core::{Config, ConversionStep, ConverterRef, Priority, TypeRef};
use smallvec::SmallVec;
use tracing::debug;

use crate::converters;

/// Maximum number of converters chained through container composition.
///
/// A container converter at the property level may compose one element
/// converter. Element conversions nested any deeper are only accepted when
/// they are direct (identical types or nullability widening).
pub const MAX_COMPOSITION_DEPTH: usize = 2;

/// Resolves element conversions on behalf of container converters.
pub trait ElementResolver {
    /// Returns a step converting `source` elements to `target` elements, or
    /// `None` if the element pair cannot be converted.
    fn resolve_element(&self, source: &TypeRef, target: &TypeRef) -> Option<ConversionStep>;
}

/// An element resolver that accepts nothing. Useful for probing leaf
/// converters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElements;

impl ElementResolver for NoElements {
    fn resolve_element(&self, _source: &TypeRef, _target: &TypeRef) -> Option<ConversionStep> {
        None
    }
}

/// A rule that converts values of one type into another.
///
/// Implementations must be pure: the same inputs always yield the same
/// answer. `source` and `target` are passed in their non-null forms; the
/// resolver handles nullability around the converter.
pub trait TypeConverter: fmt::Debug + Send + Sync {
    /// Stable, human-readable name.
    fn name(&self) -> &str;

    /// Precedence of this converter. Lower values win.
    fn priority(&self) -> Priority;

    /// Capability predicate.
    ///
    /// Returns `None` if the converter cannot handle the pair. Otherwise
    /// returns the element steps it composes (empty for leaf converters).
    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>>;
}

/// A converter accepted by [`ConverterRegistry::find_applicable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicable {
    /// The accepting converter.
    pub converter: ConverterRef,
    /// Element steps composed by the converter.
    pub elements: Vec<ConversionStep>,
}

/// Collects converters before freezing them into a [`ConverterRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    converters: Vec<Box<dyn TypeConverter>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter. Registration order breaks priority ties when
    /// ordering lookup results.
    pub fn register(&mut self, converter: impl TypeConverter + 'static) -> &mut Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Registers a converter, builder style.
    #[must_use]
    pub fn with(mut self, converter: impl TypeConverter + 'static) -> Self {
        self.register(converter);
        self
    }

    /// Registers the built-in converter library.
    #[must_use]
    pub fn with_standard_converters(mut self) -> Self {
        self.converters.extend(converters::standard());
        self
    }

    /// Drops converters disabled in `config`.
    #[must_use]
    pub fn without_disabled(mut self, config: &Config) -> Self {
        self.converters.retain(|converter| {
            let enabled = config.is_converter_enabled(converter.name());
            if !enabled {
                debug!(converter = converter.name(), "Converter disabled by configuration");
            }
            enabled
        });
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ConverterRegistry {
        debug!(count = self.converters.len(), "Converter registry built");
        ConverterRegistry {
            converters: self.converters,
        }
    }
}

/// The immutable set of converters for one run.
///
/// `ConverterRegistry` is `Send + Sync`; share it across worker threads with
/// an `Arc`.
#[derive(Debug)]
pub struct ConverterRegistry {
    /// Converters in registration order.
    converters: Vec<Box<dyn TypeConverter>>,
}

impl ConverterRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns a registry holding only the built-in converter library.
    #[must_use]
    pub fn standard() -> Self {
        RegistryBuilder::new().with_standard_converters().build()
    }

    /// Returns every converter accepting `source` → `target`, sorted by
    /// priority and then registration order.
    ///
    /// An empty result is not an error.
    #[must_use]
    pub fn find_applicable(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        elements: &dyn ElementResolver,
    ) -> SmallVec<[Applicable; 4]> {
        let mut applicable: SmallVec<[Applicable; 4]> = self
            .converters
            .iter()
            .enumerate()
            .filter_map(|(index, converter)| {
                converter
                    .applies_to(source, target, elements)
                    .map(|elements| Applicable {
                        converter: converter_ref(index, converter.as_ref()),
                        elements,
                    })
            })
            .collect();

        // Stable sort keeps registration order among equal priorities.
        applicable.sort_by_key(|a| a.converter.priority);
        applicable
    }

    /// Iterates the registered converters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = ConverterRef> + '_ {
        self.converters
            .iter()
            .enumerate()
            .map(|(index, converter)| converter_ref(index, converter.as_ref()))
    }

    /// Returns the number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns `true` if no converters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

fn converter_ref(index: usize, converter: &dyn TypeConverter) -> ConverterRef {
    ConverterRef {
        index,
        name: converter.name().to_owned(),
        priority: converter.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternConverter;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn pattern(name: &str, source: &str, target: &str, priority: u32) -> PatternConverter {
        PatternConverter::parse(name, source, target, Priority::new(priority)).unwrap()
    }

    #[test]
    fn test_sorted_by_priority_then_registration() {
        let registry = ConverterRegistry::builder()
            .with(pattern("Late", "Int", "Money", 20))
            .with(pattern("EarlyA", "Int", "Money", 10))
            .with(pattern("EarlyB", "*", "Money", 10))
            .build();

        let found = registry.find_applicable(&ty("Int"), &ty("Money"), &NoElements);
        let names: Vec<_> = found.iter().map(|a| a.converter.name.as_str()).collect();
        assert_eq!(names, vec!["EarlyA", "EarlyB", "Late"]);
        assert_eq!(found[0].converter.index, 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let registry = ConverterRegistry::builder()
            .with(pattern("A", "Int", "Money", 10))
            .build();
        assert!(registry
            .find_applicable(&ty("Long"), &ty("Money"), &NoElements)
            .is_empty());
    }

    #[test]
    fn test_without_disabled() {
        let config = Config {
            disabled_converters: vec!["ToString".to_owned()],
            ..Config::default()
        };
        let registry = ConverterRegistry::builder()
            .with_standard_converters()
            .without_disabled(&config)
            .build();

        assert!(registry.iter().all(|c| c.name != "ToString"));
        assert!(registry
            .find_applicable(&ty("Int"), &ty("String"), &NoElements)
            .is_empty());
    }

    #[test]
    fn test_register_by_reference() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(pattern("A", "Int", "Money", 10))
            .register(pattern("B", "Long", "Money", 10));
        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConverterRegistry>();
    }
}
