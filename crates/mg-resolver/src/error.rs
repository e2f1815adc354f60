//! Error types for the mg-resolver crate.
//!
//! Failures come at three levels:
//!
//! - **Property level**: conversion failures ([`UnresolvedReason`]) are not
//!   errors. They are recorded in the plan and only escalate when they block
//!   every constructor.
//! - **Pair level**: a [`MappingError`] aborts one source/target pair. All
//!   errors of a pair are collected into a single [`MappingFailure`].
//! - **Run level**: a [`GenerationError`] aborts the whole run before any
//!   pair is resolved.
//!
//! # Examples
//!
//! ```
//! use mg_resolver::{MappingError, MappingFailure};
//!
//! fn report(failure: &MappingFailure) {
//!     for err in &failure.errors {
//!         match err {
//!             MappingError::NoMatchingConstructor { target_type, .. } => {
//!                 eprintln!("{target_type}: {err}");
//!             }
//!             other => eprintln!("{other}"),
//!         }
//!     }
//! }
//! ```

use std::fmt;

use mg_core::{ConflictingOverride, ConstructorSignature, TypeRef, UnresolvedReason};

/// Why a target property cannot feed a constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Blocker {
    /// The property is explicitly ignored.
    Ignored,
    /// The property could not be resolved.
    Unresolved(UnresolvedReason),
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => f.write_str("ignored"),
            Self::Unresolved(reason) => write!(f, "{reason}"),
        }
    }
}

/// A required constructor parameter without a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockedProperty {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
    /// Why no value is available.
    pub cause: Blocker,
}

impl fmt::Display for BlockedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.name, self.ty, self.cause)
    }
}

fn list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that abort the mapping of one source/target pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// An override names a source property the source type does not have.
    #[error(
        "override for '{target}' names unknown source property '{source_property}'; available: {}",
        .available.join(", ")
    )]
    PropertyNotFound {
        /// Target property the override belongs to.
        target: String,
        /// The missing source property.
        source_property: String,
        /// Every property the source type does have, in declaration order.
        available: Vec<String>,
    },

    /// An override declares mutually exclusive resolution kinds.
    #[error(transparent)]
    ConflictingOverride(#[from] ConflictingOverride),

    /// No constructor has all of its required parameters satisfied.
    #[error("no constructor of {target_type} can be satisfied; blocked by: {}", list(.blocking))]
    NoMatchingConstructor {
        /// Qualified target type name.
        target_type: String,
        /// Every blocking parameter across all constructors.
        blocking: Vec<BlockedProperty>,
    },

    /// The pinned constructor has unsatisfied required parameters.
    #[error("constructor {signature} cannot be satisfied; unsatisfied: {}", list(.unsatisfied))]
    ExplicitConstructorNotSatisfiable {
        /// The pinned signature.
        signature: ConstructorSignature,
        /// The unsatisfied parameters.
        unsatisfied: Vec<BlockedProperty>,
    },

    /// The pinned signature matches no constructor of the target type.
    #[error("no constructor with signature {signature}; available: {}", list(.available))]
    UnknownConstructor {
        /// The pinned signature.
        signature: ConstructorSignature,
        /// Signatures of every declared constructor.
        available: Vec<ConstructorSignature>,
    },
}

impl MappingError {
    /// Creates a new [`MappingError::PropertyNotFound`] error.
    #[inline]
    pub fn property_not_found(
        target: impl Into<String>,
        source_property: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::PropertyNotFound {
            target: target.into(),
            source_property: source_property.into(),
            available,
        }
    }

    /// Returns `true` if the error stems from override declarations, as
    /// opposed to constructor selection.
    #[inline]
    #[must_use]
    pub const fn is_override_error(&self) -> bool {
        matches!(
            self,
            Self::PropertyNotFound { .. } | Self::ConflictingOverride(_)
        )
    }

    /// Returns `true` if the error stems from constructor selection.
    #[inline]
    #[must_use]
    pub const fn is_constructor_error(&self) -> bool {
        !self.is_override_error()
    }
}

/// Every error of one failed source/target pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot map {source_type} to {target_type}: {}", list(.errors))]
pub struct MappingFailure {
    /// Qualified source type name.
    pub source_type: String,
    /// Qualified target type name.
    pub target_type: String,
    /// All errors found for the pair; never empty.
    pub errors: Vec<MappingError>,
}

impl MappingFailure {
    /// Creates a failure for a pair.
    #[must_use]
    pub fn new(
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        errors: Vec<MappingError>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            target_type: target_type.into(),
            errors,
        }
    }
}

/// Which side of a mapping request a type was named on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRole {
    /// The type values are read from.
    Source,
    /// The type values are written to.
    Target,
}

impl fmt::Display for TypeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Errors that abort a whole generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A requested type is unknown to the type provider.
    #[error("{role} type '{name}' not found")]
    TypeNotFound {
        /// Qualified name as requested.
        name: String,
        /// Side of the request naming it.
        role: TypeRole,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl GenerationError {
    /// Creates a new [`GenerationError::TypeNotFound`] error.
    #[inline]
    pub fn type_not_found(name: impl Into<String>, role: TypeRole) -> Self {
        Self::TypeNotFound {
            name: name.into(),
            role,
        }
    }
}
