//! Generator configuration.
//!
//! Options reach the generator as a loose map from option key to a string,
//! boolean or integer value (see [`OptionValue`]). [`Config::from_options`]
//! validates that map into a typed [`Config`]. Recognized keys are listed in
//! [`keys`]; unknown keys are logged and ignored.
//!
//! All fields implement [`Default`], so a [`Config`] can also be deserialized
//! from a partial JSON object.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Recognized option keys.
pub mod keys {
    /// Allow nullable sources into non-null targets with an explicit
    /// unsafe unwrap.
    pub const ENFORCE_NOT_NULL: &str = "enforceNotNull";
    /// Suffix appended to generated unit names. Only the emitter reads it.
    pub const GENERATED_FILENAME_SUFFIX: &str = "generatedFilenameSuffix";
    /// Comma-separated built-in converter names to leave out of the registry.
    pub const DISABLED_CONVERTERS: &str = "disabledConverters";
    /// Upper bound on worker threads used for resolving pairs.
    pub const MAX_PARALLEL_JOBS: &str = "maxParallelJobs";
}

/// Default value of [`Config::generated_filename_suffix`].
pub const DEFAULT_FILENAME_SUFFIX: &str = "Konverter";

/// Largest accepted value of [`Config::max_parallel_jobs`].
pub const MAX_PARALLEL_JOBS_LIMIT: usize = 256;

/// A raw option value.
///
/// # Examples
///
/// ```
/// use mg_core::OptionValue;
///
/// let (key, value) = OptionValue::parse_assignment("enforceNotNull=true").unwrap();
/// assert_eq!(key, "enforceNotNull");
/// assert_eq!(value.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean flag.
    Bool(bool),
    /// A non-negative integer.
    Integer(u64),
    /// Free text.
    String(String),
}

impl OptionValue {
    /// Interprets the value as a boolean, accepting `"true"` and `"false"`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::String(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Self::Integer(_) => None,
        }
    }

    /// Interprets the value as an integer, accepting decimal strings.
    #[must_use]
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::String(text) => text.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Returns the value as text.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::String(text) => text.clone(),
        }
    }

    /// Splits a `key=value` assignment as given on a command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedOption`] if there is no `=` or the key
    /// is empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Self), ConfigError> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok((
                key.trim().to_owned(),
                Self::String(value.trim().to_owned()),
            )),
            _ => Err(ConfigError::MalformedOption(assignment.to_owned())),
        }
    }
}

/// Configuration for one generation run.
///
/// # Examples
///
/// ```
/// use mg_core::Config;
///
/// let config = Config::default();
/// assert!(!config.enforce_not_null);
/// assert_eq!(config.generated_filename_suffix, "Konverter");
/// assert!(config.is_converter_enabled("ToString"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Permit nullable sources into non-null targets, recording an explicit
    /// unsafe unwrap in the plan.
    pub enforce_not_null: bool,

    /// Suffix for generated unit names.
    pub generated_filename_suffix: String,

    /// Built-in converters to leave out of the registry, by name.
    pub disabled_converters: Vec<String>,

    /// Maximum worker threads for resolving pairs.
    /// `None` means use all available CPU cores. At most
    /// [`MAX_PARALLEL_JOBS_LIMIT`].
    pub max_parallel_jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enforce_not_null: false,
            generated_filename_suffix: DEFAULT_FILENAME_SUFFIX.to_owned(),
            disabled_converters: Vec::new(),
            max_parallel_jobs: None,
        }
    }
}

impl Config {
    /// Builds a configuration from raw options, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for a recognized key with a
    /// value of the wrong type.
    pub fn from_options<'a>(
        options: impl IntoIterator<Item = (&'a str, &'a OptionValue)>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in options {
            config.apply_option(key, value)?;
        }
        Ok(config)
    }

    /// Applies a single option on top of the current values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for a recognized key with a
    /// value of the wrong type.
    pub fn apply_option(&mut self, key: &str, value: &OptionValue) -> Result<(), ConfigError> {
        match key {
            keys::ENFORCE_NOT_NULL => {
                self.enforce_not_null = value
                    .as_bool()
                    .ok_or_else(|| ConfigError::invalid_option(key, "expected a boolean"))?;
            }
            keys::GENERATED_FILENAME_SUFFIX => {
                self.generated_filename_suffix = value.as_text();
            }
            keys::DISABLED_CONVERTERS => {
                self.disabled_converters = value
                    .as_text()
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            keys::MAX_PARALLEL_JOBS => {
                let jobs = value
                    .as_integer()
                    .ok_or_else(|| ConfigError::invalid_option(key, "expected an integer"))?;
                if jobs == 0 {
                    return Err(ConfigError::invalid_option(key, "must be positive"));
                }
                let jobs = usize::try_from(jobs)
                    .ok()
                    .filter(|&jobs| jobs <= MAX_PARALLEL_JOBS_LIMIT)
                    .ok_or_else(|| {
                        ConfigError::invalid_option(
                            key,
                            format!("must be at most {MAX_PARALLEL_JOBS_LIMIT}"),
                        )
                    })?;
                self.max_parallel_jobs = Some(jobs);
            }
            _ => warn!(option = key, "Ignoring unknown option"),
        }
        Ok(())
    }

    /// Returns `true` unless `name` is listed in
    /// [`disabled_converters`](Self::disabled_converters).
    #[must_use]
    pub fn is_converter_enabled(&self, name: &str) -> bool {
        !self.disabled_converters.iter().any(|disabled| disabled == name)
    }
}
