//! Collection manifests, the filesystem generator registry and workspace
//! configuration.
//!
//! This crate provides the on-disk side of `schematic`: it reads
//! `collection.json` manifests, found directly or through a package's
//! `package.json`, serves them through the
//! [`GeneratorCatalog`](schematic_core::GeneratorCatalog) trait, and loads the
//! `.schematic.yml` workspace configuration.
//!
//! # Quick start
//!
//! ```no_run
//! use schematic_catalog::{CollectionRegistry, WorkspaceConfig};
//! use schematic_core::{GenerateCommand, GenerateOptions};
//!
//! let config = WorkspaceConfig::discover(".").unwrap().unwrap_or_default();
//! let registry = config.registry_builder(&[]).build().unwrap();
//!
//! let mut command = GenerateCommand::new(config.dispatch_config(), &registry)
//!     .with_schema_registry(config.schema_registry().unwrap());
//! let spec = command.initialize(&GenerateOptions::default()).unwrap();
//! println!("{} schematics available", spec.subcommand_count());
//! ```

mod config;
mod error;
mod manifest;
mod registry;

pub use config::{
    AnalyticsConfig, CONFIG_FILE, CliConfig, DEFAULT_SEARCH_ROOT, EngineConfig, WorkspaceConfig,
};
pub use error::{ConfigError, ManifestError, Result};
pub use manifest::{CollectionManifest, MANIFEST_FILE, PACKAGE_FILE, PackageMetadata, SchematicEntry};
pub use registry::{CollectionRegistry, CollectionRegistryBuilder, CollectionSource};
