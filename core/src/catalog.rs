//! The boundary to whatever knows which generators exist.
//!
//! [`GeneratorCatalog`] is implemented by the filesystem collection registry
//! in `schematic-catalog`; [`MemoryCatalog`] is an in-process implementation
//! for embedding and tests.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::GeneratorDescription;

/// Lookup failures.
///
/// Load failures behind a lookup (unreadable manifest, bad JSON) are
/// reported through the same two variants, with the cause in `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No collection with this name is known or it failed to load.
    #[error("collection \"{name}\" cannot be resolved{}", detail_suffix(.detail))]
    CollectionNotFound {
        /// Requested collection.
        name: String,
        /// Underlying cause, if any.
        detail: Option<String>,
    },

    /// The collection exists but has no such generator.
    #[error("schematic \"{name}\" not found in collection \"{collection}\"{}", detail_suffix(.detail))]
    GeneratorNotFound {
        /// Collection that was searched.
        collection: String,
        /// Requested generator.
        name: String,
        /// Underlying cause, if any.
        detail: Option<String>,
    },
}

impl CatalogError {
    /// A plain collection-not-found error.
    pub fn collection_not_found(name: &str) -> Self {
        Self::CollectionNotFound {
            name: name.to_string(),
            detail: None,
        }
    }

    /// A plain generator-not-found error.
    pub fn generator_not_found(collection: &str, name: &str) -> Self {
        Self::GeneratorNotFound {
            collection: collection.to_string(),
            name: name.to_string(),
            detail: None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Source of generator names and descriptions.
pub trait GeneratorCatalog {
    /// Lists the visible generators of a collection, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CollectionNotFound`] for unknown collections.
    fn list_names(&self, collection_name: &str) -> Result<Vec<String>, CatalogError>;

    /// Describes one generator; `generator_name` may be an alias.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CollectionNotFound`] or
    /// [`CatalogError::GeneratorNotFound`].
    fn describe(
        &self,
        collection_name: &str,
        generator_name: &str,
    ) -> Result<GeneratorDescription, CatalogError>;
}

/// In-memory catalog.
///
/// Hidden and private generators are left out of [`list_names`](GeneratorCatalog::list_names);
/// aliases are resolved by [`describe`](GeneratorCatalog::describe).
///
/// # Examples
///
/// ```
/// use schematic_core::*;
///
/// let mut catalog = MemoryCatalog::new();
/// let mut component = GeneratorDescription::new("core", "component", "component/schema.json");
/// component.aliases = vec!["c".into()];
/// catalog.insert(component);
///
/// assert_eq!(catalog.list_names("core").unwrap(), vec!["component"]);
/// let found = catalog.describe("core", "c").unwrap();
/// assert_eq!(found.name, "c");
/// assert_eq!(found.canonical_name, "component");
/// assert!(catalog.describe("core", "pipe").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    collections: BTreeMap<String, BTreeMap<String, GeneratorDescription>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a generator under its collection and canonical name.
    pub fn insert(&mut self, description: GeneratorDescription) {
        self.collections
            .entry(description.collection_name.clone())
            .or_default()
            .insert(description.canonical_name.clone(), description);
    }

    /// Registers an empty collection.
    pub fn add_collection(&mut self, name: &str) {
        self.collections.entry(name.to_string()).or_default();
    }

    fn collection(
        &self,
        name: &str,
    ) -> Result<&BTreeMap<String, GeneratorDescription>, CatalogError> {
        self.collections
            .get(name)
            .ok_or_else(|| CatalogError::collection_not_found(name))
    }
}

impl GeneratorCatalog for MemoryCatalog {
    fn list_names(&self, collection_name: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .collection(collection_name)?
            .values()
            .filter(|d| !d.hidden && !d.private)
            .map(|d| d.canonical_name.clone())
            .collect())
    }

    fn describe(
        &self,
        collection_name: &str,
        generator_name: &str,
    ) -> Result<GeneratorDescription, CatalogError> {
        let generators = self.collection(collection_name)?;
        let found = generators.get(generator_name).or_else(|| {
            generators
                .values()
                .find(|d| d.aliases.iter().any(|a| a == generator_name))
        });

        match found {
            Some(description) => Ok(GeneratorDescription {
                name: generator_name.to_string(),
                ..description.clone()
            }),
            None => Err(CatalogError::generator_not_found(
                collection_name,
                generator_name,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_identifier() {
        let err = CatalogError::collection_not_found("@acme/kit");
        assert_eq!(err.to_string(), "collection \"@acme/kit\" cannot be resolved");

        let err = CatalogError::GeneratorNotFound {
            collection: "core".into(),
            name: "pipe".into(),
            detail: Some("schema.json: invalid JSON".into()),
        };
        assert_eq!(
            err.to_string(),
            "schematic \"pipe\" not found in collection \"core\": schema.json: invalid JSON"
        );
    }

    #[test]
    fn test_hidden_and_private_are_not_listed() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(GeneratorDescription::new("core", "component", "a.json"));
        let mut hidden = GeneratorDescription::new("core", "ng-new", "b.json");
        hidden.hidden = true;
        catalog.insert(hidden);
        let mut private = GeneratorDescription::new("core", "internal", "c.json");
        private.private = true;
        catalog.insert(private);

        assert_eq!(catalog.list_names("core").unwrap(), vec!["component"]);
        assert!(catalog.describe("core", "internal").is_ok());
    }

    #[test]
    fn test_unknown_collection() {
        let catalog = MemoryCatalog::new();
        assert_eq!(
            catalog.list_names("nope").unwrap_err(),
            CatalogError::collection_not_found("nope")
        );
        assert_eq!(
            catalog.describe("nope", "x").unwrap_err(),
            CatalogError::collection_not_found("nope")
        );
    }
}
