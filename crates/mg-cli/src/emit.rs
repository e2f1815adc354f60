//! Plan renderers shipped with the binary.
//!
//! [`JsonEmitter`] renders each unit as a JSON object for downstream code
//! generators. [`SummaryEmitter`] renders a human-readable overview.
//! Both make unsafe non-null assertions visible.

use std::fmt::Write;

use mg_core::{
    ConstructorSignature, ConversionStep, EmitUnit, MappingResult, PlanEmitter,
    PropertyMappingPlan, Resolution, UnresolvedProperty,
};
use serde::Serialize;

#[derive(Serialize)]
struct UnitView<'a> {
    unit: String,
    namespace: &'a str,
    mappings: Vec<MappingView<'a>>,
}

#[derive(Serialize)]
struct MappingView<'a> {
    source_type: &'a str,
    target_type: &'a str,
    constructor: &'a ConstructorSignature,
    constructor_index: usize,
    unsafe_unwrap: bool,
    properties: Vec<PropertyView<'a>>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    unresolved: &'a [UnresolvedProperty],
}

#[derive(Serialize)]
struct PropertyView<'a> {
    #[serde(flatten)]
    plan: &'a PropertyMappingPlan,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    unsafe_unwrap: bool,
}

impl<'a> MappingView<'a> {
    fn new(result: &'a MappingResult) -> Self {
        Self {
            source_type: &result.source_type,
            target_type: &result.target_type,
            constructor: &result.constructor,
            constructor_index: result.constructor_index,
            unsafe_unwrap: result.requires_unsafe_unwrap(),
            properties: result
                .properties
                .iter()
                .map(|plan| PropertyView {
                    plan,
                    unsafe_unwrap: plan.step().is_some_and(ConversionStep::requires_unsafe_unwrap),
                })
                .collect(),
            unresolved: &result.unresolved,
        }
    }
}

/// Renders units as JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl PlanEmitter for JsonEmitter {
    type Output = serde_json::Value;
    type Error = serde_json::Error;

    fn emit(&mut self, unit: EmitUnit<'_>) -> Result<Self::Output, Self::Error> {
        serde_json::to_value(UnitView {
            unit: unit.unit_name(),
            namespace: unit.namespace,
            mappings: unit.results.iter().map(MappingView::new).collect(),
        })
    }
}

/// Renders units as indented text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryEmitter;

impl PlanEmitter for SummaryEmitter {
    type Output = String;
    type Error = std::fmt::Error;

    fn emit(&mut self, unit: EmitUnit<'_>) -> Result<Self::Output, Self::Error> {
        let mut out = String::new();

        if unit.namespace.is_empty() {
            writeln!(out, "{}", unit.unit_name())?;
        } else {
            writeln!(out, "{}.{}", unit.namespace, unit.unit_name())?;
        }

        for result in unit.results {
            writeln!(
                out,
                "  {} -> {} {}",
                result.source_type, result.target_type, result.constructor
            )?;
            for plan in &result.properties {
                writeln!(out, "    {:<16} {}", plan.target, describe(plan))?;
            }
            for property in &result.unresolved {
                writeln!(out, "    {:<16} unresolved: {}", property.name, property.reason)?;
            }
        }

        Ok(out)
    }
}

fn describe(plan: &PropertyMappingPlan) -> String {
    let text = match &plan.resolution {
        Resolution::MatchedByName { source, step } | Resolution::MatchedByOverride { source, step } => {
            let mut text = match &step.converter {
                Some(converter) => format!("{source} via {}", converter.name),
                None => source.clone(),
            };
            if step.requires_unsafe_unwrap() {
                text.push_str(" (unsafe unwrap)");
            }
            text
        }
        Resolution::Constant { value } => format!("= {value}"),
        Resolution::Expression { text } => format!("= {{ {text} }}"),
        Resolution::Ignored => "ignored".to_owned(),
        Resolution::Unresolved { reason, .. } => format!("unresolved: {reason}"),
    };

    match plan.phase {
        mg_core::AssignmentPhase::Constructor => text,
        mg_core::AssignmentPhase::PostConstruction => format!("{text} [after construction]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_core::{Config, NullHandling, TypeRef};

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn result() -> MappingResult {
        let mut note = PropertyMappingPlan::new(
            "note",
            ty("String?"),
            Resolution::Constant {
                value: "null".to_owned(),
            },
        );
        note.phase = mg_core::AssignmentPhase::PostConstruction;

        MappingResult {
            source_type: "S".to_owned(),
            target_type: "T".to_owned(),
            constructor: ConstructorSignature::parse(&["Int"]).unwrap(),
            constructor_index: 0,
            properties: vec![
                PropertyMappingPlan::new(
                    "a",
                    ty("Int"),
                    Resolution::MatchedByName {
                        source: "a".to_owned(),
                        step: ConversionStep::direct(ty("Int?"), ty("Int"), NullHandling::UnsafeUnwrap),
                    },
                ),
                note,
            ],
            unresolved: Vec::new(),
        }
    }

    #[test]
    fn test_json_unit() {
        let config = Config::default();
        let results = [result()];
        let unit = EmitUnit {
            mapper: "UserMapper",
            namespace: "com.example",
            results: &results,
            config: &config,
        };

        let value = JsonEmitter.emit(unit).unwrap();
        assert_eq!(value["unit"], "UserMapperKonverter");
        assert_eq!(value["namespace"], "com.example");

        let mapping = &value["mappings"][0];
        assert_eq!(mapping["constructor"][0], "Int");
        assert_eq!(mapping["unsafe_unwrap"], true);
        assert_eq!(mapping["properties"][0]["target"], "a");
        assert_eq!(mapping["properties"][0]["unsafe_unwrap"], true);
        assert_eq!(mapping["properties"][0]["resolution"]["step"]["null_handling"], "unsafe_unwrap");
        assert!(mapping["properties"][1].get("unsafe_unwrap").is_none());
        assert_eq!(mapping["properties"][1]["phase"], "post_construction");
        assert!(mapping.get("unresolved").is_none());
    }

    #[test]
    fn test_summary_unit() {
        let config = Config {
            generated_filename_suffix: "Mapper".to_owned(),
            ..Config::default()
        };
        let results = [result()];
        let unit = EmitUnit {
            mapper: "User",
            namespace: "",
            results: &results,
            config: &config,
        };

        let text = SummaryEmitter.emit(unit).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "UserMapper");
        assert_eq!(lines[1], "  S -> T (Int)");
        assert!(lines[2].ends_with("a (unsafe unwrap)"));
        assert!(lines[3].ends_with("= null [after construction]"));
    }
}
