//! Filesystem collection registry with a builder for multiple sources.
//!
//! Provides [`CollectionRegistry`], a [`GeneratorCatalog`] backed by
//! `collection.json` manifests on disk, and [`CollectionRegistryBuilder`]
//! for assembling one from search roots and explicit manifests.
//!
//! # Loading patterns
//!
//! ```no_run
//! use schematic_catalog::CollectionRegistry;
//! use schematic_core::GeneratorCatalog;
//!
//! // Scan a node_modules-style tree
//! let registry = CollectionRegistry::from_search_root("node_modules").unwrap();
//!
//! // Combine sources; the first collection registered under a name wins
//! let registry = CollectionRegistry::builder()
//!     .manifest("schematics/collection.json")
//!     .search_root("node_modules")
//!     .build()
//!     .unwrap();
//!
//! for name in registry.list_names("@schematics/core").unwrap() {
//!     println!("{name}");
//! }
//! ```
//!
//! Manifests are indexed when the registry is built. Schema documents are
//! read on [`describe`](GeneratorCatalog::describe), every time.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use schematic_core::{CatalogError, GeneratorCatalog, GeneratorDescription};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ManifestError, Result};
use crate::manifest::{CollectionManifest, MANIFEST_FILE, PACKAGE_FILE, PackageMetadata};

/// Describes where collections are registered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    /// A directory scanned for collections in itself, `*/` and `@scope/*/`.
    ///
    /// A package directory's manifest is the one its `package.json` names in
    /// `"schematics"`, else its `collection.json`.
    SearchRoot(PathBuf),
    /// A single manifest file.
    Manifest(PathBuf),
}

#[derive(Debug)]
struct LoadedCollection {
    manifest_path: PathBuf,
    manifest: CollectionManifest,
}

impl LoadedCollection {
    fn base_dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new("."))
    }
}

#[derive(Debug)]
enum CollectionEntry {
    Loaded(LoadedCollection),
    /// The manifest was found but could not be read.
    Broken { manifest_path: PathBuf, detail: String },
}

/// Generators from `collection.json` manifests on disk.
///
/// Implements [`GeneratorCatalog`]:
///
/// - `list_names` returns the generators that are neither hidden nor private;
/// - `describe` resolves aliases and loads the schema document, resolving its
///   path against the manifest's directory.
///
/// A manifest that was found but failed to parse is still registered under
/// its directory name, so lookups report why it cannot be resolved.
#[derive(Debug)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, CollectionEntry>,
    sources: Vec<CollectionSource>,
}

impl CollectionRegistry {
    /// Returns a new [`CollectionRegistryBuilder`].
    pub fn builder() -> CollectionRegistryBuilder {
        CollectionRegistryBuilder::new()
    }

    /// Registers every collection found under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::IoError`] if `root` cannot be read.
    pub fn from_search_root(root: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().search_root(root).build()
    }

    /// Registers the single collection described by `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed.
    pub fn from_manifest(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().manifest(path).build()
    }

    fn empty(sources: Vec<CollectionSource>) -> Self {
        Self {
            collections: BTreeMap::new(),
            sources,
        }
    }

    fn insert(&mut self, name: String, entry: CollectionEntry) {
        if let Some(existing) = self.collections.get(&name) {
            debug!(
                collection = %name,
                kept = %existing.manifest_path().display(),
                ignored = %entry.manifest_path().display(),
                "duplicate collection, keeping first"
            );
            return;
        }
        debug!(collection = %name, manifest = %entry.manifest_path().display(), "registered collection");
        self.collections.insert(name, entry);
    }

    /// Returns `true` if a collection with this name is registered.
    pub fn contains(&self, collection_name: &str) -> bool {
        self.collections.contains_key(collection_name)
    }

    /// Returns the number of registered collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns `true` if no collection is registered.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Returns registered collection names in lexicographic order.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Path of the manifest a collection was registered from.
    pub fn manifest_path(&self, collection_name: &str) -> Option<&Path> {
        self.collections
            .get(collection_name)
            .map(CollectionEntry::manifest_path)
    }

    /// The parsed manifest of a collection, if it loaded.
    pub fn manifest(&self, collection_name: &str) -> Option<&CollectionManifest> {
        match self.collections.get(collection_name)? {
            CollectionEntry::Loaded(loaded) => Some(&loaded.manifest),
            CollectionEntry::Broken { .. } => None,
        }
    }

    /// Returns the sources the registry was built from.
    pub fn sources(&self) -> &[CollectionSource] {
        &self.sources
    }

    fn loaded(&self, collection_name: &str) -> std::result::Result<&LoadedCollection, CatalogError> {
        match self.collections.get(collection_name) {
            Some(CollectionEntry::Loaded(loaded)) => Ok(loaded),
            Some(CollectionEntry::Broken {
                manifest_path,
                detail,
            }) => Err(CatalogError::CollectionNotFound {
                name: collection_name.to_string(),
                detail: Some(format!("{}: {detail}", manifest_path.display())),
            }),
            None => Err(CatalogError::collection_not_found(collection_name)),
        }
    }
}

impl CollectionEntry {
    fn manifest_path(&self) -> &Path {
        match self {
            Self::Loaded(loaded) => &loaded.manifest_path,
            Self::Broken { manifest_path, .. } => manifest_path,
        }
    }
}

impl GeneratorCatalog for CollectionRegistry {
    fn list_names(&self, collection_name: &str) -> std::result::Result<Vec<String>, CatalogError> {
        Ok(self.loaded(collection_name)?.manifest.visible_names())
    }

    fn describe(
        &self,
        collection_name: &str,
        generator_name: &str,
    ) -> std::result::Result<GeneratorDescription, CatalogError> {
        let collection = self.loaded(collection_name)?;
        let (canonical, entry) = collection
            .manifest
            .find(generator_name)
            .ok_or_else(|| CatalogError::generator_not_found(collection_name, generator_name))?;

        let mut description = match &entry.schema {
            Some(schema) => {
                let path = collection.base_dir().join(schema);
                let document = load_schema(&path).map_err(|err| CatalogError::GeneratorNotFound {
                    collection: collection_name.to_string(),
                    name: generator_name.to_string(),
                    detail: Some(format!("{}: {err}", path.display())),
                })?;
                debug!(schematic = %canonical, schema = %path.display(), "loaded schema document");
                GeneratorDescription::new(collection_name, canonical, path).with_schema(document)
            }
            None => GeneratorDescription::new(collection_name, canonical, &collection.manifest_path),
        };

        description.name = generator_name.to_string();
        description.description = entry.description.clone();
        description.aliases = entry.aliases.clone();
        description.hidden = entry.hidden;
        description.private = entry.private;
        description.factory = entry.factory.clone();
        Ok(description)
    }
}

pub(crate) fn load_schema(path: &Path) -> Result<Value> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let document = serde_json::from_reader(reader)?;
    Ok(document)
}

/// Builder for a [`CollectionRegistry`].
///
/// Sources are registered in the order they are added. When two sources
/// define the same collection name the first one wins.
///
/// - A missing search root is skipped.
/// - A broken manifest found while scanning is registered as unresolvable.
/// - A broken explicit manifest fails the build.
///
/// # Example
///
/// ```no_run
/// use schematic_catalog::CollectionRegistry;
///
/// let registry = CollectionRegistry::builder()
///     .search_root("./schematics")
///     .search_root("./node_modules")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct CollectionRegistryBuilder {
    sources: Vec<CollectionSource>,
}

impl CollectionRegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory to scan for collections.
    pub fn search_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CollectionSource::SearchRoot(path.into()));
        self
    }

    /// Adds one manifest file.
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CollectionSource::Manifest(path.into()));
        self
    }

    /// Indexes every configured source.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit manifest cannot be loaded or if an
    /// existing search root cannot be listed.
    pub fn build(self) -> Result<CollectionRegistry> {
        let mut registry = CollectionRegistry::empty(self.sources.clone());

        for source in &self.sources {
            match source {
                CollectionSource::Manifest(path) => {
                    let manifest = CollectionManifest::load(path)?;
                    let fallback = fallback_name(path).ok_or_else(|| {
                        ManifestError::InvalidManifest(format!(
                            "{}: collection has no name",
                            path.display()
                        ))
                    })?;
                    let name = manifest.name_or(&fallback).to_string();
                    registry.insert(
                        name,
                        CollectionEntry::Loaded(LoadedCollection {
                            manifest_path: path.clone(),
                            manifest,
                        }),
                    );
                }
                CollectionSource::SearchRoot(root) => {
                    if !root.is_dir() {
                        debug!(root = %root.display(), "search root does not exist, skipping");
                        continue;
                    }
                    for (path, fallback) in scan_root(root)? {
                        match CollectionManifest::load(&path) {
                            Ok(manifest) => {
                                let name = manifest.name_or(&fallback).to_string();
                                registry.insert(
                                    name,
                                    CollectionEntry::Loaded(LoadedCollection {
                                        manifest_path: path,
                                        manifest,
                                    }),
                                );
                            }
                            Err(err) => {
                                warn!(manifest = %path.display(), error = %err, "failed to load collection manifest");
                                registry.insert(
                                    fallback,
                                    CollectionEntry::Broken {
                                        manifest_path: path,
                                        detail: err.to_string(),
                                    },
                                );
                            }
                        }
                    }
                }
            }
        }

        Ok(registry)
    }
}

/// Name of the directory holding a manifest.
fn fallback_name(manifest_path: &Path) -> Option<String> {
    manifest_path
        .parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Finds manifests under `root` along with their fallback names.
///
/// Entries are visited in sorted order so the first-wins rule is stable.
fn scan_root(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut found = Vec::new();

    if let Some(name) = fallback_name(&root.join(MANIFEST_FILE)) {
        found.extend(package_manifest(root, name));
    }

    for dir in sorted_subdirs(root)? {
        let label = dir_name(&dir);
        if label.starts_with('@') {
            for package in sorted_subdirs(&dir)? {
                let name = format!("{label}/{}", dir_name(&package));
                found.extend(package_manifest(&package, name));
            }
        } else {
            found.extend(package_manifest(&dir, label));
        }
    }

    Ok(found)
}

/// Locates the manifest of one package directory.
///
/// The `"schematics"` field of `package.json` takes precedence over a
/// `collection.json` next to it; the package name replaces `fallback`.
fn package_manifest(dir: &Path, fallback: String) -> Option<(PathBuf, String)> {
    let package_file = dir.join(PACKAGE_FILE);
    let metadata = if package_file.is_file() {
        match PackageMetadata::load(&package_file) {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!(package = %package_file.display(), error = %err, "ignoring unreadable package metadata");
                PackageMetadata::default()
            }
        }
    } else {
        PackageMetadata::default()
    };

    let name = metadata.name.filter(|name| !name.is_empty()).unwrap_or(fallback);
    if let Some(schematics) = metadata.schematics {
        return Some((dir.join(schematics), name));
    }

    let manifest = dir.join(MANIFEST_FILE);
    manifest.is_file().then_some((manifest, name))
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
