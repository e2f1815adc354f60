//! Converter resolution engine for the mapgen mapping generator.
//!
//! Given a source and a target [`TypeDescriptor`], a set of registered
//! converters and optional per-property overrides, this crate computes a
//! deterministic [`MappingResult`]: which constructor to call and how every
//! target property obtains its value.
//!
//! # Overview
//!
//! The main entry point is [`MappingEngine`], which runs three stages per
//! source/target pair:
//!
//! - [`match_properties`]: pairs target slots with source properties,
//!   honoring overrides
//! - [`MappingResolver`]: picks a conversion step per matched pair, bridging
//!   nullability and choosing converters by priority
//! - [`select_constructor`]: chooses the target constructor and schedules
//!   post-construction assignments
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mg_core::{
//!     Config, ConstructorDescriptor, OverrideDecl, PropertyDescriptor, TypeCatalog,
//!     TypeDescriptor, TypeRef,
//! };
//! use mg_resolver::{ConverterRegistry, MappingEngine, MappingRequest};
//!
//! let x = PropertyDescriptor::new("x", TypeRef::new("Int"));
//! let a = PropertyDescriptor::new("a", TypeRef::new("Int"));
//! let catalog = TypeCatalog::from_descriptors([
//!     TypeDescriptor::new("S").with_property(x),
//!     TypeDescriptor::new("T")
//!         .with_property(a.clone())
//!         .with_constructor(ConstructorDescriptor::new([a])),
//! ]);
//!
//! let engine = MappingEngine::new(
//!     Config::default(),
//!     Arc::new(ConverterRegistry::standard()),
//!     catalog,
//! );
//! let request = MappingRequest::new("S", "T").with_override(OverrideDecl::source("a", "x"));
//!
//! let results = engine.resolve_all(&[request]).unwrap();
//! let result = results[0].as_ref().unwrap();
//! assert_eq!(result.properties.len(), 1);
//! assert!(result.is_complete());
//! ```
//!
//! # Architecture
//!
//! ```text
//! MappingEngine (per run)
//!     │
//!     ├── TypeProvider (type shapes, looked up once per request)
//!     │
//!     ├── Arc<ConverterRegistry> (frozen before the first lookup)
//!     │
//!     └── per pair, in parallel with rayon
//!             │
//!             ├── OverrideSet::partition (override validation)
//!             ├── match_properties
//!             ├── MappingResolver
//!             └── select_constructor
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod constructor;
mod converters;
mod error;
mod matcher;
mod registry;
mod resolver;

pub use constructor::{select_constructor, Selection};
pub use converters::{
    ConverterDecl, IterableToIterable, MapToMap, NumberToNumber, PatternConverter,
    StringToBoolean, StringToNumber, ToAny, ToStringConverter, TypePattern,
};
pub use error::{BlockedProperty, Blocker, GenerationError, MappingError, MappingFailure, TypeRole};
pub use matcher::{match_properties, MatchedSlot, SlotMatch};
pub use registry::{
    Applicable, ConverterRegistry, ElementResolver, NoElements, RegistryBuilder, TypeConverter,
    MAX_COMPOSITION_DEPTH,
};
pub use resolver::MappingResolver;

use std::sync::Arc;

use mg_core::{
    Config, ConstructorSignature, MappingResult, OverrideDecl, OverrideSet, TypeDescriptor,
    TypeProvider, MAX_PARALLEL_JOBS_LIMIT,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One source/target pair to map, with its overrides.
///
/// # Examples
///
/// ```
/// use mg_core::{ConstructorSignature, OverrideDecl};
/// use mg_resolver::MappingRequest;
///
/// let request = MappingRequest::new("com.example.UserDto", "com.example.User")
///     .with_override(OverrideDecl::ignore("password"))
///     .with_constructor(ConstructorSignature::parse(&["Long", "String"]).unwrap());
/// assert_eq!(request.overrides.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    /// Qualified source type name.
    pub source: String,
    /// Qualified target type name.
    pub target: String,
    /// Override declarations, validated before matching.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideDecl>,
    /// Pins the target constructor by parameter-type signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorSignature>,
}

impl MappingRequest {
    /// Creates a request without overrides.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            overrides: Vec::new(),
            constructor: None,
        }
    }

    /// Adds an override declaration.
    #[must_use]
    pub fn with_override(mut self, decl: OverrideDecl) -> Self {
        self.overrides.push(decl);
        self
    }

    /// Pins the target constructor.
    #[must_use]
    pub fn with_constructor(mut self, signature: ConstructorSignature) -> Self {
        self.constructor = Some(signature);
        self
    }
}

/// Resolves mapping requests against a type provider and a frozen registry.
///
/// The engine holds no mutable state: resolving the same requests twice
/// yields identical results.
#[derive(Debug, Clone)]
pub struct MappingEngine<P> {
    /// Run configuration.
    config: Config,
    /// Converters shared by all pairs.
    registry: Arc<ConverterRegistry>,
    /// Source of type shapes.
    provider: P,
}

impl<P: TypeProvider> MappingEngine<P> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(config: Config, registry: Arc<ConverterRegistry>, provider: P) -> Self {
        Self {
            config,
            registry,
            provider,
        }
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the shared converter registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    /// Looks up both types of a request.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::TypeNotFound`] if either type is unknown.
    pub fn describe_pair(
        &self,
        request: &MappingRequest,
    ) -> Result<(&TypeDescriptor, &TypeDescriptor), GenerationError> {
        let source = self
            .provider
            .describe(&request.source)
            .ok_or_else(|| GenerationError::type_not_found(&request.source, TypeRole::Source))?;
        let target = self
            .provider
            .describe(&request.target)
            .ok_or_else(|| GenerationError::type_not_found(&request.target, TypeRole::Target))?;
        Ok((source, target))
    }

    /// Resolves one pair.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingFailure`] carrying every error found for the pair:
    /// all conflicting overrides together with all overrides naming unknown
    /// source properties, or the constructor selection failure.
    pub fn resolve_pair(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        request: &MappingRequest,
    ) -> Result<MappingResult, MappingFailure> {
        let fail = |errors: Vec<MappingError>| MappingFailure::new(&source.name, &target.name, errors);

        let (overrides, conflicts) = OverrideSet::partition(request.overrides.iter().cloned());
        let mut errors: Vec<MappingError> = conflicts.into_iter().map(MappingError::from).collect();

        let matched = match match_properties(source, target, &overrides) {
            Ok(matched) if errors.is_empty() => matched,
            Ok(_) => return Err(fail(errors)),
            Err(not_found) => {
                errors.extend(not_found);
                return Err(fail(errors));
            }
        };

        let resolver = MappingResolver::new(&self.registry, self.config.enforce_not_null);
        let plans = resolver.resolve(matched);

        let selection = select_constructor(target, &plans, request.constructor.as_ref())
            .map_err(|err| fail(vec![err]))?;

        debug!(
            source_type = %source.name,
            target_type = %target.name,
            constructor = %selection.signature,
            properties = selection.properties.len(),
            unresolved = selection.unresolved.len(),
            "Resolved mapping"
        );

        Ok(MappingResult {
            source_type: source.name.clone(),
            target_type: target.name.clone(),
            constructor: selection.signature,
            constructor_index: selection.index,
            properties: selection.properties,
            unresolved: selection.unresolved,
        })
    }

    /// Resolves every request, in parallel, preserving request order.
    ///
    /// Each pair succeeds or fails on its own. The worker pool is limited to
    /// [`Config::max_parallel_jobs`] threads when set.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::TypeNotFound`] before resolving anything if
    /// any requested type is unknown, or [`GenerationError::ThreadPool`] if
    /// the worker pool cannot be created.
    pub fn resolve_all(
        &self,
        requests: &[MappingRequest],
    ) -> Result<Vec<Result<MappingResult, MappingFailure>>, GenerationError>
    where
        P: Sync,
    {
        let pairs = requests
            .iter()
            .map(|request| self.describe_pair(request))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            pairs = pairs.len(),
            converters = self.registry.len(),
            enforce_not_null = self.config.enforce_not_null,
            "Resolving mappings"
        );

        let run = || {
            requests
                .par_iter()
                .zip(pairs.par_iter())
                .map(|(request, (source, target))| self.resolve_pair(source, target, request))
                .collect::<Vec<_>>()
        };

        let results = match self.config.max_parallel_jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.min(MAX_PARALLEL_JOBS_LIMIT))
                .build()?
                .install(run),
            None => run(),
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "Some mappings could not be resolved");
        }
        info!(
            resolved = results.len() - failed,
            failed,
            "Mapping resolution complete"
        );

        Ok(results)
    }
}
