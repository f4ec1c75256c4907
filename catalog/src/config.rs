//! Workspace configuration for the `schematic` CLI.
//!
//! Defines the YAML-serializable configuration that selects the default
//! collection, where collections are searched, which engine runs generators
//! and where analytics go. Every section is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! cli:
//!   default_collection: "@schematics/core"
//! collections:
//!   - ./schematics
//!   - ./node_modules
//! engine:
//!   command: my-engine
//!   args: ["--stdin"]
//! analytics:
//!   enabled: true
//!   log_file: .schematic/analytics.jsonl
//! schemas:
//!   common.json: ./schemas/common.json
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use schematic_core::{DEFAULT_COLLECTION, DispatchConfig, SchemaRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ManifestError};
use crate::registry::{CollectionRegistryBuilder, load_schema};

/// File name looked up by [`WorkspaceConfig::discover`].
pub const CONFIG_FILE: &str = ".schematic.yml";

/// Search root used when no collections are configured.
pub const DEFAULT_SEARCH_ROOT: &str = "node_modules";

/// CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Collection that bare generator names resolve against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_collection: Option<String>,
}

/// External generation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program to spawn.
    pub command: String,
    /// Arguments passed before anything else.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Analytics settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Whether events are reported at all.
    pub enabled: bool,
    /// Append events as JSON lines to this file instead of logging them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Top-level workspace configuration.
///
/// Loaded from `.schematic.yml`. Relative paths are resolved against the
/// directory holding the file.
///
/// # Examples
///
/// ```
/// use schematic_catalog::WorkspaceConfig;
///
/// let config: WorkspaceConfig = serde_yaml::from_str("cli:\n  default_collection: core\n").unwrap();
/// assert_eq!(config.default_collection(), "core");
///
/// let empty = WorkspaceConfig::default();
/// assert_eq!(empty.default_collection(), "@schematics/core");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// CLI defaults.
    pub cli: CliConfig,
    /// Directories searched for collections, in priority order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<PathBuf>,
    /// Engine that runs generators; requests are printed when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,
    /// Analytics settings.
    pub analytics: AnalyticsConfig,
    /// Shared schema documents, keyed by the id `$ref`s use.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, PathBuf>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            cli: CliConfig::default(),
            collections: Vec::new(),
            engine: None,
            analytics: AnalyticsConfig::default(),
            schemas: BTreeMap::new(),
            base_dir: None,
        }
    }
}

impl WorkspaceConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`YamlError`](ConfigError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or [`YamlError`](ConfigError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Looks for `.schematic.yml` in `start` and its ancestors.
    ///
    /// Returns `Ok(None)` when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a found file cannot be loaded.
    pub fn discover(start: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        for dir in start.as_ref().ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                debug!(config = %candidate.display(), "found workspace config");
                return Self::load(candidate).map(Some);
            }
        }
        Ok(None)
    }

    /// Directory the configuration was loaded from.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// The configured default collection, or the built-in one.
    pub fn default_collection(&self) -> &str {
        self.cli
            .default_collection
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COLLECTION)
    }

    /// Settings for the dispatcher.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new(self.default_collection())
    }

    /// Resolves `path` against the configuration's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Collection search roots with relative paths resolved.
    pub fn collection_roots(&self) -> Vec<PathBuf> {
        self.collections
            .iter()
            .map(|path| self.resolve_path(path))
            .collect()
    }

    /// Analytics log file with a relative path resolved.
    pub fn analytics_log_file(&self) -> Option<PathBuf> {
        self.analytics
            .log_file
            .as_deref()
            .map(|path| self.resolve_path(path))
    }

    /// A registry builder searching `extra_roots` first, then the configured
    /// roots, or `node_modules` next to the config when none are configured.
    pub fn registry_builder(&self, extra_roots: &[PathBuf]) -> CollectionRegistryBuilder {
        let mut roots = self.collection_roots();
        if roots.is_empty() {
            roots.push(self.resolve_path(Path::new(DEFAULT_SEARCH_ROOT)));
        }
        extra_roots
            .iter()
            .cloned()
            .chain(roots)
            .fold(CollectionRegistryBuilder::new(), |builder, root| {
                builder.search_root(root)
            })
    }

    /// Loads the shared schema documents.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::SchemaDocument`] naming the first document
    /// that cannot be read or parsed.
    pub fn schema_registry(&self) -> Result<SchemaRegistry, ManifestError> {
        let mut registry = SchemaRegistry::new();
        for (id, path) in &self.schemas {
            let path = self.resolve_path(path);
            let document = load_schema(&path).map_err(|err| ManifestError::SchemaDocument {
                detail: err.to_string(),
                path: path.clone(),
            })?;
            debug!(id = %id, schema = %path.display(), "registered shared schema");
            registry.register(id.clone(), document);
        }
        Ok(registry)
    }
}
