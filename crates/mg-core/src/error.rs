//! Error types for the mg-core crate.
//!
//! This module provides:
//!
//! - [`ConfigError`] for invalid generator options
//! - [`TypeParseError`] for malformed textual type references
//! - [`ConflictingOverride`] for override declarations that name more than one
//!   way of populating a property

/// Errors that can occur while building a [`Config`](crate::Config) from options.
///
/// # Examples
///
/// ```
/// use mg_core::ConfigError;
///
/// let error = ConfigError::invalid_option("enforceNotNull", "expected a boolean");
/// assert!(error.to_string().contains("enforceNotNull"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An `key=value` option string could not be split.
    #[error("malformed option '{0}', expected key=value")]
    MalformedOption(String),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced when parsing a textual type such as `List<Int?>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    /// The input was empty or whitespace only.
    #[error("empty type reference")]
    Empty,

    /// A character appeared where it is not allowed.
    #[error("unexpected '{found}' at offset {offset} in '{input}'")]
    Unexpected {
        /// The full input.
        input: String,
        /// Byte offset of the offending character.
        offset: usize,
        /// The offending character.
        found: char,
    },

    /// The input ended in the middle of a type.
    #[error("unexpected end of input in '{input}'")]
    UnexpectedEnd {
        /// The full input.
        input: String,
    },

    /// Generic arguments are nested beyond the supported depth.
    #[error("type '{input}' nests deeper than {limit} levels")]
    TooDeep {
        /// The full input.
        input: String,
        /// Maximum nesting depth.
        limit: usize,
    },

    /// A wildcard was used where a concrete type is required.
    #[error("wildcard '*' is not a concrete type in '{input}'")]
    Wildcard {
        /// The full input.
        input: String,
    },
}

impl TypeParseError {
    pub(crate) fn unexpected(input: &str, offset: usize, found: char) -> Self {
        Self::Unexpected {
            input: input.to_owned(),
            offset,
            found,
        }
    }

    pub(crate) fn end(input: &str) -> Self {
        Self::UnexpectedEnd {
            input: input.to_owned(),
        }
    }
}

/// An override declaration that specifies mutually exclusive resolution kinds.
///
/// ```
/// use mg_core::ConflictingOverride;
///
/// let error = ConflictingOverride {
///     target: "name".to_owned(),
///     kinds: vec!["constant", "expression"],
/// };
/// assert_eq!(
///     error.to_string(),
///     "conflicting override for target 'name': constant, expression"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conflicting override for target '{target}': {}", .kinds.join(", "))]
pub struct ConflictingOverride {
    /// Target property named by the override.
    pub target: String,
    /// The resolution kinds that were set together.
    pub kinds: Vec<&'static str>,
}
