//! Class shapes supplied by the type introspection collaborator.
//!
//! A [`TypeDescriptor`] is an immutable snapshot of a source or target class:
//! its readable properties and its constructors. Descriptors are taken once
//! per generation run and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::type_ref::TypeRef;
use crate::FxHashSet;

/// A readable attribute of a type, or a constructor parameter.
///
/// # Examples
///
/// ```
/// use mg_core::{PropertyDescriptor, TypeRef};
///
/// let id = PropertyDescriptor::new("id", TypeRef::new("Long"));
/// assert!(id.required);
/// assert!(!id.mutable);
///
/// let note = PropertyDescriptor::new("note", "String?".parse().unwrap())
///     .optional()
///     .settable();
/// assert!(!note.required);
/// assert!(note.mutable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,

    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Whether a value must be supplied when constructing.
    ///
    /// For constructor parameters, `false` means the parameter has a default.
    #[serde(default = "default_required")]
    pub required: bool,

    /// Whether the property can be assigned after construction.
    #[serde(default)]
    pub mutable: bool,
}

const fn default_required() -> bool {
    true
}

impl PropertyDescriptor {
    /// Creates a required, read-only property.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            mutable: false,
        }
    }

    /// Marks the property as defaultable.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks the property as settable after construction.
    #[must_use]
    pub fn settable(mut self) -> Self {
        self.mutable = true;
        self
    }
}

/// A constructor of a target type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    /// Parameters in positional order.
    pub parameters: Vec<PropertyDescriptor>,
}

impl ConstructorDescriptor {
    /// Creates a constructor from its parameters.
    #[must_use]
    pub fn new(parameters: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Returns the parameter-type signature used to pin a constructor.
    #[must_use]
    pub fn signature(&self) -> ConstructorSignature {
        ConstructorSignature(self.parameters.iter().map(|p| p.ty.clone()).collect())
    }

    /// Returns the parameters without a default value.
    pub fn required_parameters(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Returns the parameter with the given name, if any.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Ordered parameter types identifying a constructor.
///
/// ```
/// use mg_core::ConstructorSignature;
///
/// let sig = ConstructorSignature::parse(&["Int", "String?"]).unwrap();
/// assert_eq!(sig.to_string(), "(Int, String?)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstructorSignature(pub Vec<TypeRef>);

impl ConstructorSignature {
    /// Parses each parameter type of a signature.
    ///
    /// # Errors
    ///
    /// Returns the first [`TypeParseError`](crate::TypeParseError) encountered.
    pub fn parse(types: &[&str]) -> Result<Self, crate::TypeParseError> {
        types
            .iter()
            .map(|t| t.parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for ConstructorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// A property the matcher must try to populate on the target.
///
/// Slots are derived from constructor parameters and mutable properties; see
/// [`TypeDescriptor::target_slots`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetSlot {
    /// Property name.
    pub name: String,
    /// Type expected at this slot.
    pub ty: TypeRef,
    /// Whether the slot can be assigned after construction.
    pub mutable: bool,
}

/// Shape of a source or target class.
///
/// # Examples
///
/// ```
/// use mg_core::{ConstructorDescriptor, PropertyDescriptor, TypeDescriptor, TypeRef};
///
/// let a = PropertyDescriptor::new("a", TypeRef::new("Int"));
/// let target = TypeDescriptor::new("com.example.Target")
///     .with_property(a.clone())
///     .with_constructor(ConstructorDescriptor::new([a]));
///
/// assert_eq!(target.package(), "com.example");
/// assert_eq!(target.simple_name(), "Target");
/// assert_eq!(target.target_slots().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified name.
    pub name: String,

    /// Readable properties in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,

    /// Constructors in declaration order.
    #[serde(default)]
    pub constructors: Vec<ConstructorDescriptor>,
}

impl TypeDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a constructor.
    #[must_use]
    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Returns the package part of the qualified name (empty if none).
    #[must_use]
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(package, _)| package)
    }

    /// Returns the unqualified type name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(_, name)| name)
    }

    /// Returns the property with the given name, if any.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns the names of all readable properties in declaration order.
    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }

    /// Returns every slot a mapping may populate, in a stable order.
    ///
    /// Constructor parameters come first (constructors in declaration order,
    /// parameters in positional order), deduplicated by name and type. Mutable
    /// properties that are not already covered follow in declaration order.
    #[must_use]
    pub fn target_slots(&self) -> Vec<TargetSlot> {
        let mut seen: FxHashSet<(&str, &TypeRef)> = FxHashSet::default();
        let mut slots = Vec::new();

        for param in self.constructors.iter().flat_map(|c| &c.parameters) {
            if seen.insert((param.name.as_str(), &param.ty)) {
                let mutable = self
                    .property(&param.name)
                    .is_some_and(|p| p.mutable && p.ty == param.ty);
                slots.push(TargetSlot {
                    name: param.name.clone(),
                    ty: param.ty.clone(),
                    mutable,
                });
            }
        }

        for property in self.properties.iter().filter(|p| p.mutable) {
            if seen.insert((property.name.as_str(), &property.ty)) {
                slots.push(TargetSlot {
                    name: property.name.clone(),
                    ty: property.ty.clone(),
                    mutable: true,
                });
            }
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, ty: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty.parse().unwrap())
    }

    #[test]
    fn test_package_and_simple_name() {
        let ty = TypeDescriptor::new("com.example.model.User");
        assert_eq!(ty.package(), "com.example.model");
        assert_eq!(ty.simple_name(), "User");

        let bare = TypeDescriptor::new("User");
        assert_eq!(bare.package(), "");
        assert_eq!(bare.simple_name(), "User");
    }

    #[test]
    fn test_target_slots_order_and_dedup() {
        let a = prop("a", "Int");
        let b = prop("b", "String");
        let c = prop("c", "Long").settable();
        let ty = TypeDescriptor::new("T")
            .with_property(a.clone())
            .with_property(b.clone())
            .with_property(c)
            .with_constructor(ConstructorDescriptor::new([a.clone()]))
            .with_constructor(ConstructorDescriptor::new([a, b]));

        let names: Vec<_> = ty.target_slots().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_target_slots_same_name_different_type() {
        let ty = TypeDescriptor::new("T")
            .with_constructor(ConstructorDescriptor::new([prop("a", "Int")]))
            .with_constructor(ConstructorDescriptor::new([prop("a", "String")]));

        let slots = ty.target_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].ty.name, "Int");
        assert_eq!(slots[1].ty.name, "String");
    }

    #[test]
    fn test_mutable_constructor_parameter_slot() {
        let a = prop("a", "Int").settable();
        let ty = TypeDescriptor::new("T")
            .with_property(a.clone())
            .with_constructor(ConstructorDescriptor::new([a]));

        let slots = ty.target_slots();
        assert_eq!(slots.len(), 1);
        assert!(slots[0].mutable);
    }

    #[test]
    fn test_constructor_helpers() {
        let ctor = ConstructorDescriptor::new([prop("a", "Int"), prop("b", "String?").optional()]);
        assert_eq!(ctor.signature().to_string(), "(Int, String?)");
        assert_eq!(ctor.required_parameters().count(), 1);
        assert!(ctor.parameter("b").is_some());
        assert!(ctor.parameter("z").is_none());
    }

    #[test]
    fn test_descriptor_deserialization_defaults() {
        let json = r#"{
            "name": "com.example.User",
            "properties": [{"name": "id", "type": "Long"}],
            "constructors": [{"parameters": [{"name": "id", "type": "Long", "required": false}]}]
        }"#;
        let ty: TypeDescriptor = serde_json::from_str(json).unwrap();
        assert!(ty.properties[0].required);
        assert!(!ty.properties[0].mutable);
        assert!(!ty.constructors[0].parameters[0].required);
    }
}
