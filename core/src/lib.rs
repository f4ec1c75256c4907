//! Core of the schematic `generate` command.
//!
//! This crate turns the generators of a collection into a typed command
//! surface and dispatches the one the user selected:
//!
//! - [`GeneratorIdentifier`] — resolves `name` / `collection:name` against a
//!   default collection.
//! - [`GeneratorCatalog`] — the boundary to whatever knows which generators
//!   exist ([`MemoryCatalog`] is an in-process implementation).
//! - [`build_subcommand`] — converts a generator's JSON-Schema into a
//!   [`SubcommandDescription`] of typed [`OptionSpec`]s.
//! - [`SubcommandRegistry`] — keys subcommands by bare name or
//!   `collection:name` and assembles the [`CommandSpec`].
//! - [`GenerateCommand`] — initialization, dispatch to a
//!   [`GenerationEngine`], and analytics through an [`AnalyticsSink`].
//!
//! # Example
//!
//! ```
//! use schematic_core::*;
//! use serde_json::json;
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert(
//!     GeneratorDescription::new("@schematics/core", "component", "component/schema.json")
//!         .with_schema(json!({
//!             "properties": {
//!                 "name": {"type": "string", "$default": {"$source": "argv", "index": 0}},
//!                 "skipTests": {"type": "boolean", "default": false}
//!             }
//!         })),
//! );
//!
//! let options = GenerateOptions::for_schematic("component");
//! let mut command = GenerateCommand::new(DispatchConfig::default(), &catalog);
//! command.initialize(&options).unwrap();
//!
//! let sub = command.selected_subcommand().unwrap();
//! assert_eq!(sub.positionals()[0].name, "name");
//! assert!(sub.find_option("--no-skip-tests").is_some());
//!
//! let outcome = command.run(&options, &mut PrintEngine::sink()).unwrap();
//! assert_eq!(outcome, RunOutcome::Exited(0));
//!
//! let path = command.report_analytics(&options, &NullSink).unwrap();
//! assert_eq!(path, vec!["generate", "@schematics_core", "component"]);
//! ```

mod analytics;
mod builder;
mod catalog;
mod command;
mod identifier;
mod schema_registry;
mod subcommands;
mod types;
mod validate;

pub use analytics::{AnalyticsError, AnalyticsSink, EVENT_ROOT, NullSink, event_path};
pub use builder::{SchemaBuildError, build_subcommand};
pub use catalog::{CatalogError, GeneratorCatalog, MemoryCatalog};
pub use command::{
    DEFAULT_COLLECTION, DispatchConfig, DispatchError, EngineError, GenerateCommand,
    GenerateOptions, GenerationEngine, GenerationRequest, PrintEngine, RunOutcome,
};
pub use identifier::{COLLECTION_SEPARATOR, GeneratorIdentifier};
pub use schema_registry::SchemaRegistry;
pub use subcommands::{GENERATE_COMMAND, SCHEMATIC_OPTION, SubcommandRegistry, subcommand_key};
pub use types::*;
pub use validate::{ValidationError, validate_subcommand};
