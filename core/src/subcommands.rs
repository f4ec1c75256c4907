//! Registration of built subcommands and assembly of the command surface.
//!
//! Generators from the default collection are registered under their bare
//! name (`component`); generators from any other collection under
//! `collection:name` (`@acme/kit:widget`). Once every generator is
//! registered, [`SubcommandRegistry::into_command_spec`] embeds the finished
//! map in the `schematic` option of a new [`CommandSpec`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::identifier::COLLECTION_SEPARATOR;
use crate::{CommandOption, CommandSpec, OptionKind, SubcommandDescription};

/// Name of the `generate` command.
pub const GENERATE_COMMAND: &str = "generate";

/// Name of the option that selects the generator to run.
pub const SCHEMATIC_OPTION: &str = "schematic";

/// Computes the registry key for a generator.
///
/// # Examples
///
/// ```
/// use schematic_core::subcommand_key;
///
/// assert_eq!(subcommand_key("core", "core", "component"), "component");
/// assert_eq!(subcommand_key("third-party", "core", "widget"), "third-party:widget");
/// ```
pub fn subcommand_key(collection_name: &str, default_collection: &str, generator_name: &str) -> String {
    if collection_name == default_collection {
        generator_name.to_string()
    } else {
        format!("{collection_name}{COLLECTION_SEPARATOR}{generator_name}")
    }
}

/// Accumulates subcommand descriptions keyed by invocation key.
///
/// Keys iterate in lexicographic order.
///
/// # Examples
///
/// ```
/// use schematic_core::*;
///
/// let mut registry = SubcommandRegistry::new();
/// registry.register("core", "core", "service", SubcommandDescription::new("service"));
/// registry.register("core", "core", "component", SubcommandDescription::new("component"));
///
/// let spec = registry.into_command_spec();
/// let keys: Vec<&str> = spec.subcommands().unwrap().keys().map(String::as_str).collect();
/// assert_eq!(keys, vec!["component", "service"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubcommandRegistry {
    subcommands: BTreeMap<String, SubcommandDescription>,
}

impl SubcommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subcommand` and returns the key it was stored under.
    ///
    /// A later registration under the same key replaces the earlier one.
    pub fn register(
        &mut self,
        collection_name: &str,
        default_collection: &str,
        generator_name: &str,
        subcommand: SubcommandDescription,
    ) -> String {
        let key = subcommand_key(collection_name, default_collection, generator_name);
        self.subcommands.insert(key.clone(), subcommand);
        key
    }

    /// Looks up a registered subcommand by key.
    pub fn get(&self, key: &str) -> Option<&SubcommandDescription> {
        self.subcommands.get(key)
    }

    /// Returns an iterator over keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.subcommands.keys().map(String::as_str)
    }

    /// Returns the number of registered subcommands.
    pub fn len(&self) -> usize {
        self.subcommands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.subcommands.is_empty()
    }

    /// Builds the `generate` command surface around the finished map.
    pub fn into_command_spec(self) -> CommandSpec {
        let switch = |name: &str, description: &str| CommandOption {
            name: name.to_string(),
            kind: OptionKind::Boolean,
            description: description.to_string(),
            default: Some(Value::Bool(false)),
            positional: None,
            subcommands: None,
        };

        CommandSpec {
            name: GENERATE_COMMAND.to_string(),
            aliases: vec!["g".to_string()],
            description: "Generates and/or modifies files based on a schematic.".to_string(),
            options: vec![
                CommandOption {
                    name: SCHEMATIC_OPTION.to_string(),
                    kind: OptionKind::string(),
                    description: "The schematic or collection:schematic to generate.".to_string(),
                    default: None,
                    positional: Some(0),
                    subcommands: Some(self.subcommands),
                },
                switch("debug", "Enables debug mode."),
                switch("dry-run", "Run through without making any changes."),
                switch("force", "Forces overwriting of files."),
            ],
        }
    }
}
