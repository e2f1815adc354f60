//! Generation manifest.
//!
//! A manifest is a JSON document holding everything one generation run
//! needs: options, type shapes, user converters and the mappers to plan.
//!
//! ```json
//! {
//!   "options": { "enforceNotNull": true },
//!   "types": [
//!     { "name": "com.example.UserDto", "properties": [{ "name": "id", "type": "Long" }] }
//!   ],
//!   "converters": [
//!     { "name": "UuidToString", "source": "java.util.UUID", "target": "String", "priority": 10 }
//!   ],
//!   "mappers": [
//!     {
//!       "name": "UserMapper",
//!       "namespace": "com.example.mapping",
//!       "mappings": [{ "source": "com.example.UserDto", "target": "com.example.User" }]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use camino::Utf8Path;
use color_eyre::eyre::WrapErr;
use mg_core::{Config, OptionValue, TypeCatalog};
use mg_resolver::{ConverterDecl, ConverterRegistry, MappingRequest};
use serde::Deserialize;
use tracing::debug;

/// A named group of mappings rendered into one output unit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapperDecl {
    /// Mapper name; the unit name is derived from it.
    pub name: String,
    /// Output namespace.
    #[serde(default)]
    pub namespace: String,
    /// Source/target pairs in output order.
    #[serde(default)]
    pub mappings: Vec<MappingRequest>,
}

/// Input of one generation run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Raw generator options.
    pub options: BTreeMap<String, OptionValue>,
    /// Every type a mapping may refer to.
    pub types: TypeCatalog,
    /// User-declared converters.
    pub converters: Vec<ConverterDecl>,
    /// Mappers to plan.
    pub mappers: Vec<MapperDecl>,
}

impl Manifest {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load(path: &Utf8Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path.as_std_path())
            .wrap_err_with(|| format!("Failed to read manifest {path}"))?;
        Self::parse(&content).wrap_err_with(|| format!("Invalid manifest {path}"))
    }

    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid manifest.
    pub fn parse(content: &str) -> color_eyre::Result<Self> {
        let manifest: Self = serde_json::from_str(content)?;
        debug!(
            types = manifest.types.len(),
            converters = manifest.converters.len(),
            mappers = manifest.mappers.len(),
            "Parsed manifest"
        );
        Ok(manifest)
    }

    /// Builds the run configuration from the manifest options, then applies
    /// `key=value` assignments given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed assignment or a value of the wrong
    /// type.
    pub fn config(&self, assignments: &[String]) -> color_eyre::Result<Config> {
        let mut config = Config::from_options(
            self.options
                .iter()
                .map(|(key, value)| (key.as_str(), value)),
        )?;

        for assignment in assignments {
            let (key, value) = OptionValue::parse_assignment(assignment)?;
            config.apply_option(&key, &value)?;
        }

        Ok(config)
    }

    /// Builds the converter registry: the built-in library minus disabled
    /// converters, followed by the manifest's converters.
    ///
    /// # Errors
    ///
    /// Returns an error if a converter declares a malformed type pattern.
    pub fn registry(&self, config: &Config) -> color_eyre::Result<ConverterRegistry> {
        let mut builder = ConverterRegistry::builder()
            .with_standard_converters()
            .without_disabled(config);

        for decl in &self.converters {
            let converter = decl
                .clone()
                .into_converter()
                .wrap_err_with(|| format!("Invalid converter '{}'", decl.name))?;
            builder.register(converter);
        }

        Ok(builder.build())
    }

    /// Returns every mapping request, mapper by mapper.
    #[must_use]
    pub fn requests(&self) -> Vec<MappingRequest> {
        self.mappers
            .iter()
            .flat_map(|mapper| mapper.mappings.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "options": { "enforceNotNull": "true", "disabledConverters": "ToAny" },
        "types": [
            { "name": "S", "properties": [{ "name": "id", "type": "Int" }] },
            { "name": "T", "properties": [{ "name": "id", "type": "Long" }],
              "constructors": [{ "parameters": [{ "name": "id", "type": "Long" }] }] }
        ],
        "converters": [{ "name": "IntToMoney", "source": "Int", "target": "Money" }],
        "mappers": [
            { "name": "A", "mappings": [{ "source": "S", "target": "T" }] },
            { "name": "B", "namespace": "b", "mappings": [
                { "source": "S", "target": "T" },
                { "source": "T", "target": "S" }
            ] }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.types.len(), 2);
        assert_eq!(manifest.mappers.len(), 2);
        assert_eq!(manifest.mappers[0].namespace, "");
        assert_eq!(manifest.requests().len(), 3);
    }

    #[test]
    fn test_config_with_assignments() {
        let manifest = Manifest::parse(MANIFEST).unwrap();

        let config = manifest.config(&[]).unwrap();
        assert!(config.enforce_not_null);
        assert!(!config.is_converter_enabled("ToAny"));

        let config = manifest
            .config(&["enforceNotNull=false".to_owned(), "maxParallelJobs=2".to_owned()])
            .unwrap();
        assert!(!config.enforce_not_null);
        assert_eq!(config.max_parallel_jobs, Some(2));

        assert!(manifest.config(&["enforceNotNull".to_owned()]).is_err());
    }

    #[test]
    fn test_registry_includes_user_converters() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let config = manifest.config(&[]).unwrap();
        let registry = manifest.registry(&config).unwrap();

        let names: Vec<_> = registry.iter().map(|c| c.name).collect();
        assert!(names.contains(&"IntToMoney".to_owned()));
        assert!(!names.contains(&"ToAny".to_owned()));
        assert_eq!(names.last().map(String::as_str), Some("IntToMoney"));
    }

    #[test]
    fn test_invalid_converter_pattern() {
        let manifest = Manifest {
            converters: vec![ConverterDecl {
                name: "Broken".to_owned(),
                source: "List<".to_owned(),
                target: "String".to_owned(),
                priority: None,
            }],
            ..Manifest::default()
        };
        let err = manifest.registry(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse("{}").unwrap();
        assert!(manifest.requests().is_empty());
        assert!(manifest.types.is_empty());
    }
}
