//! Collection manifests (`collection.json`).
//!
//! A manifest names a collection and lists its generators. Schema documents
//! are referenced by path, relative to the manifest's directory, and are not
//! read here.
//!
//! # Examples
//!
//! ```
//! use schematic_catalog::CollectionManifest;
//!
//! let manifest: CollectionManifest = serde_json::from_str(r#"{
//!     "name": "@acme/kit",
//!     "schematics": {
//!         "widget": {
//!             "description": "Creates a widget",
//!             "schema": "./widget/schema.json",
//!             "aliases": ["w"]
//!         },
//!         "internal": { "private": true }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(manifest.visible_names(), vec!["widget"]);
//! let (canonical, entry) = manifest.find("w").unwrap();
//! assert_eq!(canonical, "widget");
//! assert_eq!(entry.schema.as_deref(), Some("./widget/schema.json"));
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of a collection manifest.
pub const MANIFEST_FILE: &str = "collection.json";

/// File name of the package metadata that may point at a manifest.
pub const PACKAGE_FILE: &str = "package.json";

/// One generator entry of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchematicEntry {
    /// One-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Entry point understood by the generation engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    /// Schema document path, relative to the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Alternate names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Left out of listings.
    pub hidden: bool,
    /// Left out of listings; only callable by exact name.
    pub private: bool,
}

impl SchematicEntry {
    /// Returns `true` if the entry shows up in listings.
    pub fn is_listed(&self) -> bool {
        !self.hidden && !self.private
    }
}

/// A parsed `collection.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionManifest {
    /// Collection name; the directory name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Collection description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generators keyed by canonical name.
    #[serde(default)]
    pub schematics: BTreeMap<String, SchematicEntry>,
}

impl CollectionManifest {
    /// Loads a manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ManifestError::IoError) if the file cannot
    /// be read, or [`JsonError`](crate::ManifestError::JsonError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ManifestError::IoError) if the file cannot
    /// be written, or [`JsonError`](crate::ManifestError::JsonError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Adds or replaces a generator entry.
    pub fn with_schematic(mut self, name: &str, entry: SchematicEntry) -> Self {
        self.schematics.insert(name.to_string(), entry);
        self
    }

    /// Returns the manifest's own name, or `fallback` when it has none.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }

    /// Finds a generator by canonical name, then by alias.
    pub fn find(&self, name: &str) -> Option<(&str, &SchematicEntry)> {
        if let Some((canonical, entry)) = self.schematics.get_key_value(name) {
            return Some((canonical.as_str(), entry));
        }
        self.schematics
            .iter()
            .find(|(_, entry)| entry.aliases.iter().any(|a| a == name))
            .map(|(canonical, entry)| (canonical.as_str(), entry))
    }

    /// Names of listed generators, sorted.
    pub fn visible_names(&self) -> Vec<String> {
        self.schematics
            .iter()
            .filter(|(_, entry)| entry.is_listed())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// The fields of a `package.json` that locate a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageMetadata {
    /// Package name, used as the collection name when the manifest has none.
    pub name: Option<String>,
    /// Manifest path, relative to the package directory.
    pub schematics: Option<String>,
}

impl PackageMetadata {
    /// Loads package metadata from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let metadata = serde_json::from_reader(reader)?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CollectionManifest {
        serde_json::from_str(
            r#"{
                "schematics": {
                    "component": {"schema": "./component/schema.json", "aliases": ["c"]},
                    "service": {"description": "Creates a service", "aliases": ["s"]},
                    "ng-new": {"hidden": true},
                    "workspace": {"private": true}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest: CollectionManifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.name.is_none());
        assert!(manifest.schematics.is_empty());
        assert_eq!(manifest.name_or("fallback"), "fallback");
    }

    #[test]
    fn test_empty_name_uses_fallback() {
        let manifest: CollectionManifest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(manifest.name_or("dir"), "dir");
    }

    #[test]
    fn test_visible_names_skip_hidden_and_private() {
        assert_eq!(sample().visible_names(), vec!["component", "service"]);
    }

    #[test]
    fn test_find_by_alias_and_exact_name() {
        let manifest = sample();
        assert_eq!(manifest.find("s").unwrap().0, "service");
        assert_eq!(manifest.find("workspace").unwrap().0, "workspace");
        assert!(manifest.find("pipe").is_none());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);

        let original = sample().with_schematic(
            "guard",
            SchematicEntry {
                factory: Some("./guard/index#guard".into()),
                ..Default::default()
            },
        );
        original.save(&path).unwrap();

        let loaded = CollectionManifest::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            CollectionManifest::load(&path),
            Err(crate::ManifestError::JsonError(_))
        ));
    }

    #[test]
    fn test_package_metadata_ignores_other_fields() {
        let metadata: PackageMetadata = serde_json::from_str(
            r#"{"name": "@acme/kit", "version": "1.0.0", "schematics": "./schematics/collection.json"}"#,
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("@acme/kit"));
        assert_eq!(metadata.schematics.as_deref(), Some("./schematics/collection.json"));

        let bare: PackageMetadata = serde_json::from_str(r#"{"version": "1.0.0"}"#).unwrap();
        assert_eq!(bare, PackageMetadata::default());
    }
}
