//! Converter identity shared between the registry and mapping plans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Converter precedence. Lower values take precedence.
///
/// # Examples
///
/// ```
/// use mg_core::Priority;
///
/// assert!(Priority::USER_DEFAULT < Priority::BUILTIN);
/// assert!(Priority::BUILTIN < Priority::FALLBACK);
/// assert_eq!(Priority::new(10).to_string(), "10");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub u32);

impl Priority {
    /// Highest possible precedence.
    pub const HIGHEST: Self = Self(0);

    /// Default for user-declared converters.
    pub const USER_DEFAULT: Self = Self(1000);

    /// Built-in structural converters (numbers, containers).
    pub const BUILTIN: Self = Self(3000);

    /// Catch-all converters such as `ToString` and `ToAny`.
    pub const FALLBACK: Self = Self(5000);

    /// Creates a priority from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a registered converter, as recorded in a plan.
///
/// `index` is the registration order within the registry that produced the
/// plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConverterRef {
    /// Registration index.
    pub index: usize,
    /// Converter name.
    pub name: String,
    /// Converter priority.
    pub priority: Priority,
}

impl fmt::Display for ConverterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} (priority {})", self.name, self.index, self.priority)
    }
}
