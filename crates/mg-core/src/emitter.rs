//! Plan emitter interface.
//!
//! Rendering plans into source text is outside the resolver. An emitter
//! receives one [`EmitUnit`] per mapper (a named group of source/target
//! pairs) and turns it into output. Emitters must render constant and
//! expression text verbatim and make
//! [`NullHandling::UnsafeUnwrap`](crate::NullHandling::UnsafeUnwrap) visible
//! using the target language's non-null assertion.

use crate::config::Config;
use crate::types::MappingResult;

/// Everything an emitter needs for one generated unit.
#[derive(Debug, Clone, Copy)]
pub struct EmitUnit<'a> {
    /// Mapper name, used to derive the unit name.
    pub mapper: &'a str,
    /// Output namespace or package.
    pub namespace: &'a str,
    /// Successful plans for this mapper, in request order.
    pub results: &'a [MappingResult],
    /// Run configuration.
    pub config: &'a Config,
}

impl EmitUnit<'_> {
    /// Returns the generated unit name: the mapper name followed by
    /// [`Config::generated_filename_suffix`].
    ///
    /// ```
    /// use mg_core::{Config, EmitUnit};
    ///
    /// let config = Config::default();
    /// let unit = EmitUnit { mapper: "UserMapper", namespace: "com.example", results: &[], config: &config };
    /// assert_eq!(unit.unit_name(), "UserMapperKonverter");
    /// ```
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{}{}", self.mapper, self.config.generated_filename_suffix)
    }
}

/// Renders mapping plans.
pub trait PlanEmitter {
    /// Rendered output for one unit.
    type Output;
    /// Rendering failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Renders one unit.
    ///
    /// # Errors
    ///
    /// Returns the emitter's error type if the unit cannot be rendered.
    fn emit(&mut self, unit: EmitUnit<'_>) -> Result<Self::Output, Self::Error>;
}
