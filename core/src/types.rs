//! Type definitions for generator descriptions and their CLI rendering.
//!
//! This module defines the data model shared by the resolver, the schema
//! builder and the dispatcher. Everything here is plain data designed for
//! serialization with [`serde`], so a built command surface can be dumped as
//! JSON or YAML and compared in tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element type of an array option.
///
/// Only primitives are allowed; nested arrays and objects cannot be
/// expressed on a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// String element.
    String,
    /// Boolean element.
    Boolean,
    /// Floating point element.
    Number,
    /// Integer element.
    Integer,
}

impl PrimitiveKind {
    /// Returns the schema type name for this primitive.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Integer => "integer",
        }
    }
}

/// Semantic type of a generator option.
///
/// This is a closed set: every schema property is mapped onto one of these
/// variants, and anything else is rejected by the builder.
///
/// # Examples
///
/// ```
/// use schematic_core::{OptionKind, PrimitiveKind};
///
/// let kind = OptionKind::Array { items: PrimitiveKind::String };
/// assert_eq!(kind.type_name(), "array");
/// assert!(OptionKind::Boolean.is_boolean());
/// assert!(OptionKind::Number { integer: true }.takes_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    /// Free-form string, optionally restricted to `choices`.
    String {
        /// Allowed values taken from the schema's `enum`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
    },
    /// Boolean switch.
    Boolean,
    /// Numeric value.
    Number {
        /// Declared as `integer` rather than `number`.
        #[serde(default)]
        integer: bool,
    },
    /// Repeated primitive value.
    Array {
        /// Element type.
        items: PrimitiveKind,
    },
}

impl OptionKind {
    /// A plain string option with no choices.
    pub fn string() -> Self {
        Self::String {
            choices: Vec::new(),
        }
    }

    /// Returns the schema type name for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Boolean => "boolean",
            Self::Number { integer: true } => "integer",
            Self::Number { integer: false } => "number",
            Self::Array { .. } => "array",
        }
    }

    /// Returns `true` for boolean switches.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Returns `true` when the option consumes a value on the command line.
    pub fn takes_value(&self) -> bool {
        !self.is_boolean()
    }

    /// Returns `true` when the option may be given more than once.
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Array { .. })
    }
}

/// One CLI option derived from a schema property.
///
/// An option is addressed either by a flag (`--skip-tests`) or, when the
/// schema marks it as coming from `argv`, by a positional index. Never both.
///
/// Use [`flag`](OptionSpec::flag) or [`positional`](OptionSpec::positional)
/// to create one, then chain builder methods.
///
/// # Examples
///
/// ```
/// use schematic_core::{OptionKind, OptionSpec};
///
/// let skip = OptionSpec::flag("skipTests", OptionKind::Boolean)
///     .with_description("Do not create spec files");
/// assert_eq!(skip.flag.as_deref(), Some("--skip-tests"));
/// assert_eq!(skip.canonical_name(), "--skip-tests");
///
/// let name = OptionSpec::positional("name", OptionKind::string(), 0).required();
/// assert_eq!(name.positional, Some(0));
/// assert!(name.flag.is_none());
/// assert_eq!(name.canonical_name(), "name");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Property name as declared in the schema (e.g. `skipTests`).
    pub name: String,
    /// Long flag (e.g. `--skip-tests`); `None` for positionals.
    pub flag: Option<String>,
    /// Semantic type.
    pub kind: OptionKind,
    /// Default value declared by the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Listed in the schema's `required` array.
    #[serde(default)]
    pub required: bool,
    /// Positional index when the value comes from `argv`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional: Option<usize>,
    /// Additional flag forms (`-n`, `--dry`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Negated form of a boolean flag (e.g. `--no-skip-tests`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negation: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Omitted from help output.
    #[serde(default)]
    pub hidden: bool,
    /// Marked with `x-deprecated`.
    #[serde(default)]
    pub deprecated: bool,
    /// Schema `format` hint (e.g. `path`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl OptionSpec {
    /// Creates a flag option named after `name` in dashed form.
    pub fn flag(name: &str, kind: OptionKind) -> Self {
        Self {
            flag: Some(format!("--{}", dasherize(name))),
            ..Self::bare(name, kind)
        }
    }

    /// Creates a positional option at `index`.
    pub fn positional(name: &str, kind: OptionKind, index: usize) -> Self {
        Self {
            positional: Some(index),
            ..Self::bare(name, kind)
        }
    }

    fn bare(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            flag: None,
            kind,
            default: None,
            required: false,
            positional: None,
            aliases: Vec::new(),
            negation: None,
            description: None,
            hidden: false,
            deprecated: false,
            format: None,
        }
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds an alias flag form.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the negated flag form.
    pub fn with_negation(mut self, negation: &str) -> Self {
        self.negation = Some(negation.to_string());
        self
    }

    /// Returns the flag if there is one, the property name otherwise.
    pub fn canonical_name(&self) -> &str {
        self.flag.as_deref().unwrap_or(&self.name)
    }

    /// Checks if `token` addresses this option (flag, negation or alias).
    ///
    /// # Examples
    ///
    /// ```
    /// use schematic_core::{OptionKind, OptionSpec};
    ///
    /// let flat = OptionSpec::flag("flat", OptionKind::Boolean)
    ///     .with_negation("--no-flat")
    ///     .with_alias("-f");
    /// assert!(flat.matches("--flat"));
    /// assert!(flat.matches("--no-flat"));
    /// assert!(flat.matches("-f"));
    /// assert!(!flat.matches("--flatten"));
    /// ```
    pub fn matches(&self, token: &str) -> bool {
        self.flag.as_deref() == Some(token)
            || self.negation.as_deref() == Some(token)
            || self.aliases.iter().any(|a| a == token)
    }
}

/// CLI-facing rendering of one generator's schema.
///
/// Built once per generator by [`build_subcommand`](crate::build_subcommand)
/// and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use schematic_core::{OptionKind, OptionSpec, SubcommandDescription};
///
/// let sub = SubcommandDescription::new("component")
///     .with_option(OptionSpec::positional("name", OptionKind::string(), 0))
///     .with_option(OptionSpec::flag("flat", OptionKind::Boolean));
///
/// assert_eq!(sub.options.len(), 2);
/// assert_eq!(sub.positionals().len(), 1);
/// assert!(sub.find_option("--flat").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubcommandDescription {
    /// Generator name the subcommand was built for.
    pub name: String,
    /// Short description from the schema document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// File holding the long description, relative paths already resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description_path: Option<PathBuf>,
    /// Alternate generator names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Options in deterministic (property-name) order.
    pub options: Vec<OptionSpec>,
}

impl SubcommandDescription {
    /// Creates an empty subcommand description.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Finds an option by flag, negation or alias.
    pub fn find_option(&self, token: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.matches(token))
    }

    /// Positional options ordered by index.
    pub fn positionals(&self) -> Vec<&OptionSpec> {
        let mut positionals: Vec<&OptionSpec> = self
            .options
            .iter()
            .filter(|o| o.positional.is_some())
            .collect();
        positionals.sort_by_key(|o| o.positional);
        positionals
    }

    /// Flag options in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter().filter(|o| o.flag.is_some())
    }
}

/// A generator as reported by a [`GeneratorCatalog`](crate::GeneratorCatalog).
///
/// `name` is what the caller asked for (possibly an alias); `canonical_name`
/// is the generator's identifier inside its collection and is what analytics
/// report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorDescription {
    /// Name used for the lookup.
    pub name: String,
    /// Canonical name inside the collection.
    pub canonical_name: String,
    /// Owning collection.
    pub collection_name: String,
    /// Description from the collection manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw input schema, if the generator declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_document: Option<Value>,
    /// Schema file, or the collection manifest when there is no schema.
    pub definition_path: PathBuf,
    /// Alternate names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Not listed.
    #[serde(default)]
    pub hidden: bool,
    /// Not listed; still addressable by exact name.
    #[serde(default)]
    pub private: bool,
    /// Factory reference understood by the generation engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
}

impl GeneratorDescription {
    /// Creates a description with only the required fields.
    pub fn new(
        collection_name: &str,
        canonical_name: &str,
        definition_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: canonical_name.to_string(),
            canonical_name: canonical_name.to_string(),
            collection_name: collection_name.to_string(),
            description: None,
            schema_document: None,
            definition_path: definition_path.into(),
            aliases: Vec::new(),
            hidden: false,
            private: false,
            factory: None,
        }
    }

    /// Attaches a schema document.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema_document = Some(schema);
        self
    }
}

/// Top-level option of a [`CommandSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Option name (`schematic`, `dry-run`, ...).
    pub name: String,
    /// Semantic type.
    pub kind: OptionKind,
    /// Help text.
    pub description: String,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Positional index for positional options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional: Option<usize>,
    /// Registered generator subcommands, keyed by invocation key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommands: Option<BTreeMap<String, SubcommandDescription>>,
}

/// Immutable description of the `generate` command surface.
///
/// Produced by [`SubcommandRegistry::into_command_spec`](crate::SubcommandRegistry::into_command_spec)
/// once every subcommand is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command name.
    pub name: String,
    /// Command aliases.
    pub aliases: Vec<String>,
    /// Short description.
    pub description: String,
    /// Top-level options in display order.
    pub options: Vec<CommandOption>,
}

impl CommandSpec {
    /// Finds a top-level option by name.
    pub fn find_option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The subcommand map attached to the option that carries one.
    pub fn subcommands(&self) -> Option<&BTreeMap<String, SubcommandDescription>> {
        self.options.iter().find_map(|o| o.subcommands.as_ref())
    }

    /// Number of registered subcommands (zero when none are attached).
    pub fn subcommand_count(&self) -> usize {
        self.subcommands().map_or(0, BTreeMap::len)
    }
}

/// Converts a property name to its dashed flag form.
///
/// A dash is inserted at every lower-to-upper case boundary, underscores and
/// spaces become dashes, and the result is lowercased.
///
/// # Examples
///
/// ```
/// use schematic_core::dasherize;
///
/// assert_eq!(dasherize("skipTests"), "skip-tests");
/// assert_eq!(dasherize("dry_run"), "dry-run");
/// assert_eq!(dasherize("HTML"), "html");
/// assert_eq!(dasherize("name"), "name");
/// assert_eq!(dasherize("_name"), "name");
/// ```
pub fn dasherize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for ch in name.chars() {
        if ch == '_' || ch == ' ' {
            out.push('-');
        } else if ch.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out.trim_start_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_option_creation() {
        let opt = OptionSpec::flag("skipTests", OptionKind::Boolean)
            .with_default(json!(false))
            .with_description("Skip tests");

        assert_eq!(opt.flag.as_deref(), Some("--skip-tests"));
        assert_eq!(opt.default, Some(json!(false)));
        assert!(opt.positional.is_none());
        assert!(!opt.kind.takes_value());
    }

    #[test]
    fn test_positional_option() {
        let opt = OptionSpec::positional("name", OptionKind::string(), 0).required();
        assert_eq!(opt.positional, Some(0));
        assert!(opt.required);
        assert!(!opt.matches("name"));
    }

    #[test]
    fn test_positionals_sorted_by_index() {
        let sub = SubcommandDescription::new("thing")
            .with_option(OptionSpec::positional("second", OptionKind::string(), 1))
            .with_option(OptionSpec::flag("flat", OptionKind::Boolean))
            .with_option(OptionSpec::positional("first", OptionKind::string(), 0));

        let names: Vec<&str> = sub.positionals().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(sub.flags().count(), 1);
    }

    #[test]
    fn test_option_kind_serializes_tagged() {
        let kind = OptionKind::Array {
            items: PrimitiveKind::Number,
        };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value, json!({"type": "array", "items": "number"}));

        let back: OptionKind = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(back, OptionKind::string());
    }

    #[test]
    fn test_dasherize_boundaries() {
        assert_eq!(dasherize("lintFix"), "lint-fix");
        assert_eq!(dasherize("v2Routes"), "v2-routes");
        assert_eq!(dasherize("already-dashed"), "already-dashed");
    }

    #[test]
    fn test_dasherize_drops_leading_separators() {
        assert_eq!(dasherize("_private"), "private");
        assert_eq!(dasherize("__dirname"), "dirname");
        assert_eq!(dasherize("-x"), "x");
        assert_eq!(OptionSpec::flag("_name", OptionKind::string()).flag.as_deref(), Some("--name"));
    }
}
