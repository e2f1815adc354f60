//! Domain types for the mapping generator.
//!
//! # Module Organization
//!
//! - [`syntax`] - textual type expressions shared with converter patterns
//! - [`type_ref`] - structural type identities
//! - [`descriptor`] - class shapes, properties and constructors
//! - [`overrides`] - user-declared overrides and their validation
//! - [`converter`] - converter identity and priority
//! - [`plan`] - resolved plans handed to the emitter
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use mg_core::{MappingResult, TypeDescriptor, TypeRef};
//! ```

pub mod converter;
pub mod descriptor;
pub mod overrides;
pub mod plan;
pub mod syntax;
pub mod type_ref;

pub use converter::{ConverterRef, Priority};
pub use descriptor::{
    ConstructorDescriptor, ConstructorSignature, PropertyDescriptor, TargetSlot, TypeDescriptor,
};
pub use overrides::{MappingOverride, OverrideDecl, OverrideKind, OverrideSet};
pub use plan::{
    AssignmentPhase, ConversionStep, MappingResult, NullHandling, PropertyMappingPlan, Resolution,
    UnresolvedProperty, UnresolvedReason,
};
pub use syntax::TypeSyntax;
pub use type_ref::TypeRef;
