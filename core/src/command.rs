//! The `generate` command: initialization, dispatch and analytics.
//!
//! A [`GenerateCommand`] is created per invocation. [`initialize`](GenerateCommand::initialize)
//! discovers the generators of the selected collection and builds the
//! [`CommandSpec`]; [`run`](GenerateCommand::run) either asks for help or
//! hands a [`GenerationRequest`] to the [`GenerationEngine`];
//! [`report_analytics`](GenerateCommand::report_analytics) emits the event
//! path. Each step resolves the identifier from the raw options again.
//!
//! # Example
//!
//! ```
//! use schematic_core::*;
//! use serde_json::json;
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert(
//!     GeneratorDescription::new("core", "component", "component/schema.json")
//!         .with_schema(json!({"properties": {"flat": {"type": "boolean"}}})),
//! );
//! catalog.insert(GeneratorDescription::new("core", "service", "collection.json"));
//!
//! let mut command = GenerateCommand::new(DispatchConfig::new("core"), &catalog);
//! let spec = command.initialize(&GenerateOptions::default()).unwrap();
//!
//! // `service` has no schema, so only `component` is registered
//! assert_eq!(spec.subcommand_count(), 1);
//!
//! let outcome = command.run(&GenerateOptions::default(), &mut PrintEngine::sink()).unwrap();
//! assert_eq!(outcome, RunOutcome::Help { schematic_hint: true });
//! assert_eq!(outcome.exit_code(), 0);
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    AnalyticsSink, CatalogError, CommandSpec, GeneratorCatalog, GeneratorIdentifier,
    SchemaBuildError, SchemaRegistry, SubcommandDescription, SubcommandRegistry, build_subcommand,
    event_path, subcommand_key,
};

/// Collection used when neither the user nor the configuration names one.
pub const DEFAULT_COLLECTION: &str = "@schematics/core";

/// Opaque error produced by a generation engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Settings the dispatcher needs from the surrounding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Collection that bare generator names resolve against.
    pub default_collection: String,
}

impl DispatchConfig {
    /// Creates a config with the given default collection.
    pub fn new(default_collection: impl Into<String>) -> Self {
        Self {
            default_collection: default_collection.into(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION)
    }
}

/// Raw options of one `generate` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// `name` or `collection:name`.
    pub schematic: Option<String>,
    /// Arguments after `--`, forwarded untouched.
    pub schematic_options: Vec<String>,
    /// `--debug`.
    pub debug: bool,
    /// `--dry-run`.
    pub dry_run: bool,
    /// `--force`.
    pub force: bool,
}

impl GenerateOptions {
    /// Options selecting `schematic` and nothing else.
    pub fn for_schematic(schematic: &str) -> Self {
        Self {
            schematic: Some(schematic.to_string()),
            ..Self::default()
        }
    }
}

/// What the generation engine is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Resolved collection.
    pub collection_name: String,
    /// Generator name as invoked.
    pub schematic_name: String,
    /// Pass-through arguments.
    pub schematic_options: Vec<String>,
    /// Debug mode.
    pub debug: bool,
    /// Dry run.
    pub dry_run: bool,
    /// Overwrite existing files.
    pub force: bool,
}

/// The component that actually materializes a generator.
pub trait GenerationEngine {
    /// Runs the request and returns the process-style exit code.
    ///
    /// # Errors
    ///
    /// Any failure is forwarded to the caller unchanged.
    fn run(&mut self, request: &GenerationRequest) -> Result<i32, EngineError>;
}

/// Engine that writes the request as pretty JSON instead of running it.
#[derive(Debug)]
pub struct PrintEngine<W> {
    out: W,
}

impl<W: Write> PrintEngine<W> {
    /// Prints requests to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl PrintEngine<std::io::Sink> {
    /// An engine that discards everything.
    pub fn sink() -> Self {
        Self::new(std::io::sink())
    }
}

impl<W: Write> GenerationEngine for PrintEngine<W> {
    fn run(&mut self, request: &GenerationRequest) -> Result<i32, EngineError> {
        serde_json::to_writer_pretty(&mut self.out, request)?;
        writeln!(self.out)?;
        Ok(0)
    }
}

/// Result of [`GenerateCommand::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No generator selected; the caller should print help.
    Help {
        /// Exactly one subcommand is registered, so suggest its own help.
        schematic_hint: bool,
    },
    /// The engine ran and exited with this code.
    Exited(i32),
}

impl RunOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Help { .. } => 0,
            Self::Exited(code) => code,
        }
    }
}

/// Errors surfaced by the `generate` command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Unknown collection or generator.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A generator's schema could not be turned into options.
    #[error(transparent)]
    SchemaBuild(#[from] SchemaBuildError),

    /// The generation engine failed.
    #[error("{0}")]
    Engine(EngineError),
}

/// Per-invocation state of the `generate` command.
pub struct GenerateCommand<'a> {
    config: DispatchConfig,
    catalog: &'a dyn GeneratorCatalog,
    schema_registry: SchemaRegistry,
    collection_name: Option<String>,
    schematic_name: Option<String>,
    long_schematic_name: Option<String>,
    spec: Option<CommandSpec>,
}

impl<'a> GenerateCommand<'a> {
    /// Creates a command reading generators from `catalog`.
    pub fn new(config: DispatchConfig, catalog: &'a dyn GeneratorCatalog) -> Self {
        Self {
            config,
            catalog,
            schema_registry: SchemaRegistry::new(),
            collection_name: None,
            schematic_name: None,
            long_schematic_name: None,
            spec: None,
        }
    }

    /// Uses `registry` to resolve `$ref`s to shared schema documents.
    pub fn with_schema_registry(mut self, registry: SchemaRegistry) -> Self {
        self.schema_registry = registry;
        self
    }

    fn resolve(&self, options: &GenerateOptions) -> GeneratorIdentifier {
        GeneratorIdentifier::resolve(
            options.schematic.as_deref(),
            &self.config.default_collection,
        )
    }

    /// Discovers generators and builds the command surface.
    ///
    /// With a generator selected only that generator is described; otherwise
    /// every listed generator of the collection is, in name order.
    /// Generators without a schema document are skipped.
    ///
    /// # Errors
    ///
    /// Catalog lookups and schema conversion failures are returned as-is.
    pub fn initialize(&mut self, options: &GenerateOptions) -> Result<&CommandSpec, DispatchError> {
        let id = self.resolve(options);
        let collection = id.collection_name.clone();
        self.collection_name = Some(collection.clone());
        self.schematic_name = id.generator_name.clone();

        let mut names = match id.generator_name.filter(|name| !name.is_empty()) {
            Some(name) => vec![name],
            None => self.catalog.list_names(&collection)?,
        };
        names.sort();

        let mut registry = SubcommandRegistry::new();
        for name in &names {
            let description = self.catalog.describe(&collection, name)?;
            self.long_schematic_name = Some(description.canonical_name.clone());

            let Some(schema) = description.schema_document.as_ref() else {
                debug!(collection = %collection, schematic = %name, "no schema document, skipping");
                continue;
            };

            let built = build_subcommand(
                name,
                &description.definition_path,
                &self.schema_registry,
                schema,
            )?;
            let subcommand = SubcommandDescription {
                description: built.description.or(description.description),
                aliases: description.aliases,
                ..built
            };
            let key = registry.register(
                &collection,
                &self.config.default_collection,
                name,
                subcommand,
            );
            debug!(key = %key, "registered subcommand");
        }

        Ok(&*self.spec.insert(registry.into_command_spec()))
    }

    /// Dispatches the selected generator, or asks for help if there is none.
    ///
    /// # Errors
    ///
    /// Engine failures are returned as [`DispatchError::Engine`].
    pub fn run(
        &self,
        options: &GenerateOptions,
        engine: &mut dyn GenerationEngine,
    ) -> Result<RunOutcome, DispatchError> {
        let id = self.resolve(options);
        let Some((collection, schematic)) = id.parts() else {
            return Ok(RunOutcome::Help {
                schematic_hint: self.spec.as_ref().map(CommandSpec::subcommand_count) == Some(1),
            });
        };

        let request = GenerationRequest {
            collection_name: collection.to_string(),
            schematic_name: schematic.to_string(),
            schematic_options: options.schematic_options.clone(),
            debug: options.debug,
            dry_run: options.dry_run,
            force: options.force,
        };
        info!(collection = %collection, schematic = %schematic, dry_run = request.dry_run, "dispatching schematic");

        engine
            .run(&request)
            .map(RunOutcome::Exited)
            .map_err(DispatchError::Engine)
    }

    /// Emits the analytics event for this invocation.
    ///
    /// Returns the emitted path, or `None` when no generator is selected.
    /// Sink failures are logged and otherwise ignored.
    pub fn report_analytics(
        &self,
        options: &GenerateOptions,
        sink: &dyn AnalyticsSink,
    ) -> Option<Vec<String>> {
        let id = self.resolve(options);
        let (collection, schematic) = id.parts()?;
        let path = event_path(collection, schematic, self.long_schematic_name.as_deref());

        if let Err(err) = sink.report(&path, options) {
            debug!(error = %err, "analytics event dropped");
        }
        Some(path)
    }

    /// The subcommand registered for the generator selected at initialization.
    pub fn selected_subcommand(&self) -> Option<&SubcommandDescription> {
        let collection = self.collection_name.as_deref()?;
        let schematic = self.schematic_name.as_deref()?;
        let key = subcommand_key(collection, &self.config.default_collection, schematic);
        self.spec.as_ref()?.subcommands()?.get(&key)
    }

    /// Collection resolved by [`initialize`](Self::initialize).
    pub fn collection_name(&self) -> Option<&str> {
        self.collection_name.as_deref()
    }

    /// Generator name resolved by [`initialize`](Self::initialize).
    pub fn schematic_name(&self) -> Option<&str> {
        self.schematic_name.as_deref()
    }

    /// Canonical name of the last generator described.
    pub fn long_schematic_name(&self) -> Option<&str> {
        self.long_schematic_name.as_deref()
    }

    /// The command surface built by [`initialize`](Self::initialize).
    pub fn command_spec(&self) -> Option<&CommandSpec> {
        self.spec.as_ref()
    }

    /// The configuration this command resolves against.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}
