//! Built-in and user-declared converters.
//!
//! The built-in library covers structural conversions every mapper needs:
//!
//! | name | accepts | priority |
//! | --- | --- | --- |
//! | `NumberToNumber` | between distinct numeric types | [`Priority::BUILTIN`] |
//! | `StringToNumber` | `String` to a numeric type | [`Priority::BUILTIN`] |
//! | `StringToBoolean` | `String` to `Boolean` | [`Priority::BUILTIN`] |
//! | `IterableToIterable` | between iterable families, composing the element | [`Priority::BUILTIN`] |
//! | `MapToMap` | between map families, composing key and value | [`Priority::BUILTIN`] |
//! | `ToString` | anything but `String` to `String` | [`Priority::FALLBACK`] |
//! | `ToAny` | anything but `Any` to `Any` | [`Priority::FALLBACK`] |
//!
//! Well-known types are recognized by their simple name, so `Int` and
//! `kotlin.Int` are both numeric.
//!
//! User converters are declared as [`PatternConverter`]s: a name, a source
//! and a target [`TypePattern`], and a priority.

use mg_core::{ConversionStep, Priority, TypeParseError, TypeRef, TypeSyntax};
use serde::{Deserialize, Serialize};

use crate::registry::{ElementResolver, TypeConverter};

const NUMERIC: &[&str] = &["Byte", "Short", "Int", "Long", "Float", "Double"];
const ITERABLES: &[&str] = &[
    "Iterable",
    "Collection",
    "List",
    "MutableList",
    "Set",
    "MutableSet",
    "Array",
];
const MAPS: &[&str] = &["Map", "MutableMap"];

fn is_one_of(ty: &TypeRef, names: &[&str]) -> bool {
    names.contains(&ty.simple_name())
}

fn is_plain(ty: &TypeRef, name: &str) -> bool {
    ty.arguments.is_empty() && ty.simple_name() == name
}

fn is_numeric(ty: &TypeRef) -> bool {
    ty.arguments.is_empty() && is_one_of(ty, NUMERIC)
}

/// Returns the built-in library in registration order.
pub(crate) fn standard() -> Vec<Box<dyn TypeConverter>> {
    vec![
        Box::new(NumberToNumber),
        Box::new(StringToNumber),
        Box::new(StringToBoolean),
        Box::new(IterableToIterable),
        Box::new(MapToMap),
        Box::new(ToStringConverter),
        Box::new(ToAny),
    ]
}

/// Converts between distinct numeric types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberToNumber;

impl TypeConverter for NumberToNumber {
    fn name(&self) -> &str {
        "NumberToNumber"
    }

    fn priority(&self) -> Priority {
        Priority::BUILTIN
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (is_numeric(source) && is_numeric(target) && source.simple_name() != target.simple_name())
            .then(Vec::new)
    }
}

/// Parses a `String` into a numeric type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToNumber;

impl TypeConverter for StringToNumber {
    fn name(&self) -> &str {
        "StringToNumber"
    }

    fn priority(&self) -> Priority {
        Priority::BUILTIN
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (is_plain(source, "String") && is_numeric(target)).then(Vec::new)
    }
}

/// Parses a `String` into a `Boolean`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToBoolean;

impl TypeConverter for StringToBoolean {
    fn name(&self) -> &str {
        "StringToBoolean"
    }

    fn priority(&self) -> Priority {
        Priority::BUILTIN
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (is_plain(source, "String") && is_plain(target, "Boolean")).then(Vec::new)
    }
}

/// Rebuilds an iterable as another iterable, converting each element.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterableToIterable;

impl TypeConverter for IterableToIterable {
    fn name(&self) -> &str {
        "IterableToIterable"
    }

    fn priority(&self) -> Priority {
        Priority::BUILTIN
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        if !is_one_of(source, ITERABLES) || !is_one_of(target, ITERABLES) {
            return None;
        }
        let ([source_element], [target_element]) =
            (source.arguments.as_slice(), target.arguments.as_slice())
        else {
            return None;
        };

        elements
            .resolve_element(source_element, target_element)
            .map(|step| vec![step])
    }
}

/// Rebuilds a map as another map, converting keys and values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapToMap;

impl TypeConverter for MapToMap {
    fn name(&self) -> &str {
        "MapToMap"
    }

    fn priority(&self) -> Priority {
        Priority::BUILTIN
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        if !is_one_of(source, MAPS) || !is_one_of(target, MAPS) {
            return None;
        }
        let ([source_key, source_value], [target_key, target_value]) =
            (source.arguments.as_slice(), target.arguments.as_slice())
        else {
            return None;
        };

        let key = elements.resolve_element(source_key, target_key)?;
        let value = elements.resolve_element(source_value, target_value)?;
        Some(vec![key, value])
    }
}

/// Renders any value as a `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToStringConverter;

impl TypeConverter for ToStringConverter {
    fn name(&self) -> &str {
        "ToString"
    }

    fn priority(&self) -> Priority {
        Priority::FALLBACK
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (is_plain(target, "String") && !is_plain(source, "String")).then(Vec::new)
    }
}

/// Upcasts any value to `Any`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToAny;

impl TypeConverter for ToAny {
    fn name(&self) -> &str {
        "ToAny"
    }

    fn priority(&self) -> Priority {
        Priority::FALLBACK
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (is_plain(target, "Any") && !is_plain(source, "Any")).then(Vec::new)
    }
}

/// A structural pattern over [`TypeRef`]s.
///
/// `*` matches any type; `Name<P1, P2>` matches a type with that exact
/// qualified name and matching arguments. Nullability is ignored.
///
/// # Examples
///
/// ```
/// use mg_resolver::TypePattern;
///
/// let pattern = TypePattern::parse("List<*>").unwrap();
/// assert!(pattern.matches(&"List<Int>".parse().unwrap()));
/// assert!(pattern.matches(&"List<String?>?".parse().unwrap()));
/// assert!(!pattern.matches(&"Set<Int>".parse().unwrap()));
/// assert!(!pattern.matches(&"List".parse().unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypePattern {
    /// Matches any type.
    Any,
    /// Matches a named type with matching arguments.
    Named {
        /// Qualified name.
        name: String,
        /// Argument patterns.
        arguments: Vec<TypePattern>,
    },
}

impl TypePattern {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TypeParseError`] for malformed input.
    pub fn parse(input: &str) -> Result<Self, TypeParseError> {
        TypeSyntax::parse(input).map(Self::from_syntax)
    }

    fn from_syntax(syntax: TypeSyntax) -> Self {
        if syntax.name == "*" {
            return Self::Any;
        }
        Self::Named {
            name: syntax.name,
            arguments: syntax.arguments.into_iter().map(Self::from_syntax).collect(),
        }
    }

    /// Returns `true` if `ty` matches this pattern.
    #[must_use]
    pub fn matches(&self, ty: &TypeRef) -> bool {
        match self {
            Self::Any => true,
            Self::Named { name, arguments } => {
                *name == ty.name
                    && arguments.len() == ty.arguments.len()
                    && arguments
                        .iter()
                        .zip(&ty.arguments)
                        .all(|(pattern, arg)| pattern.matches(arg))
            }
        }
    }
}

/// A user-declared converter matching source and target patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConverter {
    name: String,
    source: TypePattern,
    target: TypePattern,
    priority: Priority,
}

impl PatternConverter {
    /// Creates a converter from patterns.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: TypePattern,
        target: TypePattern,
        priority: Priority,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            priority,
        }
    }

    /// Creates a converter from textual patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TypeParseError`] if either pattern is malformed.
    pub fn parse(
        name: impl Into<String>,
        source: &str,
        target: &str,
        priority: Priority,
    ) -> Result<Self, TypeParseError> {
        Ok(Self::new(
            name,
            TypePattern::parse(source)?,
            TypePattern::parse(target)?,
            priority,
        ))
    }
}

impl TypeConverter for PatternConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn applies_to(
        &self,
        source: &TypeRef,
        target: &TypeRef,
        _elements: &dyn ElementResolver,
    ) -> Option<Vec<ConversionStep>> {
        (self.source.matches(source) && self.target.matches(target)).then(Vec::new)
    }
}

/// A converter as declared in configuration.
///
/// ```
/// use mg_resolver::ConverterDecl;
///
/// let decl: ConverterDecl = serde_json::from_str(
///     r#"{"name": "UuidToString", "source": "Uuid", "target": "String"}"#,
/// ).unwrap();
/// let converter = decl.into_converter().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterDecl {
    /// Converter name.
    pub name: String,
    /// Source pattern.
    pub source: String,
    /// Target pattern.
    pub target: String,
    /// Priority; defaults to [`Priority::USER_DEFAULT`].
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl ConverterDecl {
    /// Parses the patterns into a [`PatternConverter`].
    ///
    /// # Errors
    ///
    /// Returns [`TypeParseError`] if either pattern is malformed.
    pub fn into_converter(self) -> Result<PatternConverter, TypeParseError> {
        PatternConverter::parse(
            self.name,
            &self.source,
            &self.target,
            self.priority.unwrap_or(Priority::USER_DEFAULT),
        )
    }
}
