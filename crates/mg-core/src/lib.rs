//! Core types, configuration, and errors for the mapgen mapping generator.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Structural type identities ([`TypeRef`]) and class shapes
//!   ([`TypeDescriptor`])
//! - Override declarations and their validation ([`OverrideDecl`],
//!   [`OverrideSet`])
//! - Mapping plans handed to the emitter ([`MappingResult`])
//! - Generator configuration ([`Config`])
//! - The type introspection and plan emitter interfaces
//!   ([`TypeProvider`], [`PlanEmitter`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod hash;
pub mod provider;
pub mod types;

pub use config::{Config, OptionValue, DEFAULT_FILENAME_SUFFIX, MAX_PARALLEL_JOBS_LIMIT};
pub use emitter::{EmitUnit, PlanEmitter};
pub use error::{ConfigError, ConflictingOverride, TypeParseError};
pub use hash::{fx_hash_map_with_capacity, FxHashMap, FxHashSet};
pub use provider::{TypeCatalog, TypeProvider};
pub use types::*;
