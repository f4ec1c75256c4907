//! Conversion of generator schema documents into subcommand descriptions.
//!
//! Every entry under `properties` becomes one [`OptionSpec`]. The property's
//! declared `type` picks an [`OptionKind`]; anything outside the closed set
//! (objects, `null`, nested arrays) is rejected with
//! [`SchemaBuildError::UnsupportedPropertyKind`].
//!
//! Recognized property keywords:
//!
//! | keyword | effect |
//! |---|---|
//! | `type`, `enum`, `items` | option kind and choices |
//! | `default` | default value |
//! | `$default: {"$source": "argv", "index": N}` | positional argument `N` |
//! | `alias`, `aliases` | extra flag forms |
//! | `x-negatable: false` | no `--no-*` form for a boolean |
//! | `visible: false`, `hidden: true` | hidden from help |
//! | `x-deprecated` | deprecated marker |
//! | `$ref` | resolved through the [`SchemaRegistry`] first |
//!
//! At document level, `required`, `description` and `$longDescription` are
//! read.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use schematic_core::*;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "description": "Creates a component",
//!     "properties": {
//!         "name": {"type": "string", "$default": {"$source": "argv", "index": 0}},
//!         "flat": {"type": "boolean", "default": false}
//!     },
//!     "required": ["name"]
//! });
//!
//! let sub = build_subcommand(
//!     "component",
//!     Path::new("component/schema.json"),
//!     &SchemaRegistry::new(),
//!     &schema,
//! )
//! .unwrap();
//!
//! let flat = sub.find_option("--flat").unwrap();
//! assert_eq!(flat.negation.as_deref(), Some("--no-flat"));
//! assert_eq!(sub.positionals()[0].name, "name");
//! assert!(sub.positionals()[0].required);
//! ```

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::dasherize;
use crate::validate::{ValidationError, validate_subcommand};
use crate::{OptionKind, OptionSpec, PrimitiveKind, SchemaRegistry, SubcommandDescription};

/// Errors raised while converting a schema document.
///
/// These surface during command initialization, before any generator runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    /// The document (or its `properties`) has the wrong shape.
    #[error("invalid schema for generator {generator}: {message}")]
    InvalidDocument {
        /// Generator being built.
        generator: String,
        /// What is wrong.
        message: String,
    },

    /// A property type that cannot be expressed as a CLI option.
    #[error("unsupported type {kind} for option {property} of generator {generator}")]
    UnsupportedPropertyKind {
        /// Generator being built.
        generator: String,
        /// Offending property.
        property: String,
        /// Type as declared in the schema.
        kind: String,
    },

    /// A `$ref` that does not resolve.
    #[error("unresolved reference {reference} for option {property} of generator {generator}")]
    UnresolvedReference {
        /// Generator being built.
        generator: String,
        /// Property carrying the reference.
        property: String,
        /// The reference string.
        reference: String,
    },

    /// The built description failed structural validation.
    #[error("invalid options for generator {generator}: {source}")]
    Invalid {
        /// Generator being built.
        generator: String,
        /// First validation failure.
        #[source]
        source: ValidationError,
    },
}

/// Builds the subcommand description for one generator.
///
/// `definition_path` is the schema file the document was read from; it only
/// anchors relative paths such as `$longDescription` and is never read.
/// The result depends on nothing but the arguments.
///
/// # Errors
///
/// Returns [`SchemaBuildError`] for malformed documents, unsupported
/// property types, broken `$ref`s, and clashing flags.
pub fn build_subcommand(
    generator_name: &str,
    definition_path: &Path,
    registry: &SchemaRegistry,
    schema: &Value,
) -> Result<SubcommandDescription, SchemaBuildError> {
    let invalid = |message: &str| SchemaBuildError::InvalidDocument {
        generator: generator_name.to_string(),
        message: message.to_string(),
    };

    let document = schema
        .as_object()
        .ok_or_else(|| invalid("document is not an object"))?;

    let required: Vec<&str> = match document.get("required") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(_) => return Err(invalid("\"required\" is not an array")),
    };

    let properties = match document.get("properties") {
        None => None,
        Some(Value::Object(properties)) => Some(properties),
        Some(_) => return Err(invalid("\"properties\" is not an object")),
    };

    let mut options = Vec::new();
    for (name, property) in properties.into_iter().flatten() {
        let property = registry.dereference(property, schema).map_err(|reference| {
            SchemaBuildError::UnresolvedReference {
                generator: generator_name.to_string(),
                property: name.clone(),
                reference,
            }
        })?;
        let option = build_option(name, property, required.contains(&name.as_str()))
            .map_err(|kind| SchemaBuildError::UnsupportedPropertyKind {
                generator: generator_name.to_string(),
                property: name.clone(),
                kind,
            })?;
        options.push(option);
    }

    let long_description_path = document
        .get("$longDescription")
        .and_then(Value::as_str)
        .map(|rel| {
            definition_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(rel)
        });

    let subcommand = SubcommandDescription {
        name: generator_name.to_string(),
        description: document
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        long_description_path,
        aliases: Vec::new(),
        options,
    };

    if let Some(source) = validate_subcommand(&subcommand).into_iter().next() {
        return Err(SchemaBuildError::Invalid {
            generator: generator_name.to_string(),
            source,
        });
    }

    Ok(subcommand)
}

/// Converts one property. On failure returns the unsupported type name.
fn build_option(name: &str, property: &Value, required: bool) -> Result<OptionSpec, String> {
    let empty = Map::new();
    let prop = property.as_object().unwrap_or(&empty);
    let kind = property_kind(prop)?;

    let positional = prop
        .get("$default")
        .filter(|d| d.get("$source").and_then(Value::as_str) == Some("argv"))
        .and_then(|d| d.get("index"))
        .and_then(Value::as_u64)
        .and_then(|index| usize::try_from(index).ok());

    let mut option = match positional {
        Some(index) => OptionSpec::positional(name, kind, index),
        None => OptionSpec::flag(name, kind),
    };

    option.required = required;
    option.default = prop.get("default").cloned();
    option.description = prop
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);
    option.format = prop.get("format").and_then(Value::as_str).map(String::from);
    option.hidden = prop.get("visible").and_then(Value::as_bool) == Some(false)
        || prop.get("hidden").and_then(Value::as_bool) == Some(true);
    option.deprecated = match prop.get("x-deprecated") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(_)) => true,
        _ => false,
    };

    if option.flag.is_some() {
        let aliases = prop
            .get("aliases")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .chain(prop.get("alias"))
            .filter_map(Value::as_str);
        option.aliases = aliases.map(alias_flag).collect();

        let negatable = prop.get("x-negatable").and_then(Value::as_bool) != Some(false);
        if option.kind.is_boolean() && negatable {
            option.negation = Some(format!("--no-{}", dasherize(name)));
        }
    }

    Ok(option)
}

fn property_kind(prop: &Map<String, Value>) -> Result<OptionKind, String> {
    match prop.get("type") {
        Some(Value::String(ty)) => kind_from_type(ty, prop),
        Some(Value::Array(types)) => {
            let concrete: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            match concrete.as_slice() {
                [single] => kind_from_type(single, prop),
                _ => Err(concrete.join("|")),
            }
        }
        None if prop.contains_key("enum") => Ok(OptionKind::String {
            choices: enum_choices(prop),
        }),
        None => Err("untyped".to_string()),
        Some(other) => Err(other.to_string()),
    }
}

fn kind_from_type(ty: &str, prop: &Map<String, Value>) -> Result<OptionKind, String> {
    match ty {
        "string" => Ok(OptionKind::String {
            choices: enum_choices(prop),
        }),
        "boolean" => Ok(OptionKind::Boolean),
        "number" => Ok(OptionKind::Number { integer: false }),
        "integer" => Ok(OptionKind::Number { integer: true }),
        "array" => {
            let item_type = prop
                .get("items")
                .and_then(|items| items.get("type"))
                .and_then(Value::as_str);
            let items = match item_type {
                Some("string") | None => PrimitiveKind::String,
                Some("boolean") => PrimitiveKind::Boolean,
                Some("number") => PrimitiveKind::Number,
                Some("integer") => PrimitiveKind::Integer,
                Some(other) => return Err(format!("array<{other}>")),
            };
            Ok(OptionKind::Array { items })
        }
        other => Err(other.to_string()),
    }
}

fn enum_choices(prop: &Map<String, Value>) -> Vec<String> {
    prop.get("enum")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn alias_flag(alias: &str) -> String {
    if alias.starts_with('-') {
        alias.to_string()
    } else if alias.chars().count() == 1 {
        format!("-{alias}")
    } else {
        format!("--{}", dasherize(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(schema: &Value) -> Result<SubcommandDescription, SchemaBuildError> {
        build_subcommand(
            "component",
            Path::new("/collections/core/component/schema.json"),
            &SchemaRegistry::new(),
            schema,
        )
    }

    fn component_schema() -> Value {
        json!({
            "$id": "SchematicsComponent",
            "description": "Creates a new component",
            "$longDescription": "./component-long.md",
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name of the component",
                    "$default": {"$source": "argv", "index": 0}
                },
                "path": {
                    "type": "string",
                    "format": "path",
                    "visible": false
                },
                "skipTests": {
                    "type": "boolean",
                    "default": false,
                    "alias": "S"
                },
                "export": {
                    "type": "boolean",
                    "x-negatable": false
                },
                "style": {
                    "enum": ["css", "scss", "less"],
                    "default": "css"
                },
                "port": {"type": "integer", "default": 4200},
                "ratio": {"type": ["number", "null"]},
                "tags": {"type": "array", "items": {"type": "string"}, "aliases": ["t", "tag"]},
                "legacy": {"type": "string", "x-deprecated": "use style"}
            },
            "required": ["name"]
        })
    }

    #[test]
    fn test_every_property_becomes_an_option() {
        let sub = build(&component_schema()).unwrap();
        assert_eq!(sub.name, "component");
        assert_eq!(sub.options.len(), 9);
        assert_eq!(sub.description.as_deref(), Some("Creates a new component"));
    }

    #[test]
    fn test_kinds() {
        let sub = build(&component_schema()).unwrap();
        let kind = |flag: &str| sub.find_option(flag).unwrap().kind.clone();

        assert_eq!(kind("--skip-tests"), OptionKind::Boolean);
        assert_eq!(kind("--port"), OptionKind::Number { integer: true });
        assert_eq!(kind("--ratio"), OptionKind::Number { integer: false });
        assert_eq!(
            kind("--tags"),
            OptionKind::Array {
                items: PrimitiveKind::String
            }
        );
        assert_eq!(
            kind("--style"),
            OptionKind::String {
                choices: vec!["css".into(), "scss".into(), "less".into()]
            }
        );
    }

    #[test]
    fn test_positional_and_required() {
        let sub = build(&component_schema()).unwrap();
        let positionals = sub.positionals();
        assert_eq!(positionals.len(), 1);
        assert_eq!(positionals[0].name, "name");
        assert_eq!(positionals[0].positional, Some(0));
        assert!(positionals[0].flag.is_none());
        assert!(positionals[0].required);

        assert!(!sub.find_option("--skip-tests").unwrap().required);
    }

    #[test]
    fn test_defaults_and_metadata() {
        let sub = build(&component_schema()).unwrap();

        let skip = sub.find_option("--skip-tests").unwrap();
        assert_eq!(skip.default, Some(json!(false)));
        assert_eq!(skip.aliases, vec!["-S"]);

        let path = sub.find_option("--path").unwrap();
        assert!(path.hidden);
        assert_eq!(path.format.as_deref(), Some("path"));

        assert!(sub.find_option("--legacy").unwrap().deprecated);
        assert_eq!(sub.find_option("--port").unwrap().default, Some(json!(4200)));

        let tags = sub.find_option("--tags").unwrap();
        assert_eq!(tags.aliases, vec!["-t", "--tag"]);
    }

    #[test]
    fn test_boolean_negation() {
        let sub = build(&component_schema()).unwrap();
        assert_eq!(
            sub.find_option("--skip-tests").unwrap().negation.as_deref(),
            Some("--no-skip-tests")
        );
        assert!(sub.find_option("--no-skip-tests").is_some());
        assert!(sub.find_option("--export").unwrap().negation.is_none());
    }

    #[test]
    fn test_long_description_path_is_relative_to_schema() {
        let sub = build(&component_schema()).unwrap();
        assert_eq!(
            sub.long_description_path.as_deref(),
            Some(Path::new("/collections/core/component/./component-long.md"))
        );
    }

    #[test]
    fn test_deterministic() {
        let schema = component_schema();
        let first = build(&schema).unwrap();
        let second = build(&schema).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_rejects_object_property() {
        let schema = json!({"properties": {"nested": {"type": "object"}}});
        assert_eq!(
            build(&schema).unwrap_err(),
            SchemaBuildError::UnsupportedPropertyKind {
                generator: "component".into(),
                property: "nested".into(),
                kind: "object".into(),
            }
        );
    }

    #[test]
    fn test_rejects_nested_array_and_untyped() {
        let schema = json!({"properties": {"grid": {"type": "array", "items": {"type": "array"}}}});
        assert!(matches!(
            build(&schema).unwrap_err(),
            SchemaBuildError::UnsupportedPropertyKind { kind, .. } if kind == "array<array>"
        ));

        let schema = json!({"properties": {"anything": {}}});
        assert!(matches!(
            build(&schema).unwrap_err(),
            SchemaBuildError::UnsupportedPropertyKind { kind, .. } if kind == "untyped"
        ));
    }

    #[test]
    fn test_rejects_ambiguous_union() {
        let schema = json!({"properties": {"mode": {"type": ["string", "boolean"]}}});
        assert!(matches!(
            build(&schema).unwrap_err(),
            SchemaBuildError::UnsupportedPropertyKind { kind, .. } if kind == "string|boolean"
        ));
    }

    #[test]
    fn test_resolves_local_reference() {
        let schema = json!({
            "definitions": {"style": {"type": "string", "enum": ["css", "scss"]}},
            "properties": {"style": {"$ref": "#/definitions/style"}}
        });
        let sub = build(&schema).unwrap();
        assert_eq!(
            sub.find_option("--style").unwrap().kind,
            OptionKind::String {
                choices: vec!["css".into(), "scss".into()]
            }
        );
    }

    #[test]
    fn test_resolves_registered_reference() {
        let mut registry = SchemaRegistry::new();
        registry.register("common.json", json!({"definitions": {"flag": {"type": "boolean"}}}));
        let schema = json!({"properties": {"lint": {"$ref": "common.json#/definitions/flag"}}});

        let sub = build_subcommand("component", Path::new("schema.json"), &registry, &schema).unwrap();
        assert!(sub.find_option("--no-lint").is_some());
    }

    #[test]
    fn test_unresolved_reference() {
        let schema = json!({"properties": {"style": {"$ref": "#/definitions/missing"}}});
        assert_eq!(
            build(&schema).unwrap_err(),
            SchemaBuildError::UnresolvedReference {
                generator: "component".into(),
                property: "style".into(),
                reference: "#/definitions/missing".into(),
            }
        );
    }

    #[test]
    fn test_invalid_document_shapes() {
        assert!(matches!(
            build(&json!("nope")).unwrap_err(),
            SchemaBuildError::InvalidDocument { .. }
        ));
        assert!(matches!(
            build(&json!({"properties": []})).unwrap_err(),
            SchemaBuildError::InvalidDocument { .. }
        ));
    }

    #[test]
    fn test_document_without_properties_is_empty() {
        let sub = build(&json!({"type": "object"})).unwrap();
        assert!(sub.options.is_empty());
    }

    #[test]
    fn test_clashing_flags_fail_validation() {
        let schema = json!({
            "properties": {
                "flat": {"type": "boolean"},
                "noFlat": {"type": "boolean"}
            }
        });
        assert!(matches!(
            build(&schema).unwrap_err(),
            SchemaBuildError::Invalid {
                source: ValidationError::DuplicateFlag(_),
                ..
            }
        ));
    }

    #[test]
    fn test_leading_underscore_clashes_with_plain_name() {
        let schema = json!({
            "properties": {
                "name": {"type": "string"},
                "_name": {"type": "string"}
            }
        });
        match build(&schema).unwrap_err() {
            SchemaBuildError::Invalid { source, .. } => {
                assert_eq!(source, ValidationError::DuplicateFlag("--name".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
