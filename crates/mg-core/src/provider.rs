//! Type introspection interface.
//!
//! The resolver never inspects source code itself. It asks a
//! [`TypeProvider`] for the shape of each named type. Answers must be
//! deterministic for the same name within one run.
//!
//! [`TypeCatalog`] is the in-memory provider used by the driver and in tests.

use serde::{Deserialize, Serialize};

use crate::types::TypeDescriptor;
use crate::{fx_hash_map_with_capacity, FxHashMap};

/// Supplies type shapes by qualified name.
pub trait TypeProvider {
    /// Returns the descriptor for `name`, or `None` if the type is unknown.
    fn describe(&self, name: &str) -> Option<&TypeDescriptor>;
}

/// An in-memory [`TypeProvider`].
///
/// # Examples
///
/// ```
/// use mg_core::{TypeCatalog, TypeDescriptor, TypeProvider};
///
/// let catalog = TypeCatalog::from_descriptors([TypeDescriptor::new("com.example.User")]);
/// assert!(catalog.describe("com.example.User").is_some());
/// assert!(catalog.describe("com.example.Missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeDescriptor>", into = "Vec<TypeDescriptor>")]
pub struct TypeCatalog {
    /// Descriptors in insertion order.
    descriptors: Vec<TypeDescriptor>,
    /// Index into `descriptors` by qualified name.
    by_name: FxHashMap<String, usize>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from descriptors; later duplicates replace earlier ones.
    #[must_use]
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let descriptors = descriptors.into_iter();
        let capacity = descriptors.size_hint().0;
        let mut catalog = Self {
            descriptors: Vec::with_capacity(capacity),
            by_name: fx_hash_map_with_capacity(capacity),
        };
        for descriptor in descriptors {
            catalog.insert(descriptor);
        }
        catalog
    }

    /// Adds a descriptor, replacing any existing one with the same name.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        if let Some(&index) = self.by_name.get(&descriptor.name) {
            self.descriptors[index] = descriptor;
        } else {
            self.by_name
                .insert(descriptor.name.clone(), self.descriptors.len());
            self.descriptors.push(descriptor);
        }
    }

    /// Returns the number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.iter()
    }
}

impl TypeProvider for TypeCatalog {
    fn describe(&self, name: &str) -> Option<&TypeDescriptor> {
        self.by_name.get(name).map(|&index| &self.descriptors[index])
    }
}

impl From<Vec<TypeDescriptor>> for TypeCatalog {
    fn from(descriptors: Vec<TypeDescriptor>) -> Self {
        Self::from_descriptors(descriptors)
    }
}

impl From<TypeCatalog> for Vec<TypeDescriptor> {
    fn from(catalog: TypeCatalog) -> Self {
        catalog.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropertyDescriptor, TypeRef};

    #[test]
    fn test_insert_replaces_by_name() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(TypeDescriptor::new("a.User"));
        catalog.insert(
            TypeDescriptor::new("a.User")
                .with_property(PropertyDescriptor::new("id", TypeRef::new("Long"))),
        );

        assert_eq!(catalog.len(), 1);
        let user = catalog.describe("a.User").unwrap();
        assert_eq!(user.properties.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let catalog = TypeCatalog::from_descriptors([
            TypeDescriptor::new("b.B"),
            TypeDescriptor::new("a.A"),
        ]);
        let names: Vec<_> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b.B", "a.A"]);
    }

    #[test]
    fn test_deserialize_from_list() {
        let catalog: TypeCatalog =
            serde_json::from_str(r#"[{"name": "a.A"}, {"name": "a.B"}]"#).unwrap();
        assert!(catalog.describe("a.B").is_some());
        assert!(!catalog.is_empty());
    }
}
