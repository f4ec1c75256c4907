//! Help rendering for the dynamically built `generate` surface.
//!
//! The [`CommandSpec`] and each [`SubcommandDescription`] are converted into
//! `clap::Command`s purely for rendering; parsing of generator options is the
//! engine's job.

use std::collections::HashSet;

use clap::{Arg, ArgAction, Command};
use schematic_core::{CommandSpec, OptionKind, OptionSpec, SubcommandDescription};
use serde_json::Value;
use tracing::debug;

/// Program name shown in usage lines.
pub const BIN_NAME: &str = "schematic";

/// Printed when exactly one schematic is available.
pub fn schematic_hint() -> String {
    format!("To see help for a schematic run:\n  {BIN_NAME} generate <schematic> --help")
}

/// Builds the `generate` command with one clap subcommand per schematic.
pub fn generate_command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(spec.name.clone())
        .bin_name(format!("{BIN_NAME} {}", spec.name))
        .about(spec.description.clone())
        .override_usage(format!(
            "{BIN_NAME} {} [OPTIONS] [SCHEMATIC] [-- <ARGS>...]",
            spec.name
        ))
        .after_help("Arguments after `--` are passed to the schematic unchanged.")
        .visible_aliases(spec.aliases.clone())
        .disable_help_subcommand(true)
        .subcommand_value_name("SCHEMATIC")
        .subcommand_help_heading("Schematics");

    let mut taken = HashSet::new();
    for option in &spec.options {
        match &option.subcommands {
            Some(subcommands) => {
                for (key, sub) in subcommands {
                    taken.insert(key.clone());
                    let aliases: Vec<String> = sub
                        .aliases
                        .iter()
                        .filter(|alias| !subcommands.contains_key(alias.as_str()))
                        .filter(|alias| taken.insert((*alias).clone()))
                        .cloned()
                        .collect();
                    let mut entry = Command::new(key.clone()).visible_aliases(aliases);
                    if let Some(description) = &sub.description {
                        entry = entry.about(description.clone());
                    }
                    cmd = cmd.subcommand(entry);
                }
            }
            None if option.kind.is_boolean() => {
                cmd = cmd.arg(
                    Arg::new(option.name.clone())
                        .long(option.name.clone())
                        .action(ArgAction::SetTrue)
                        .help(option.description.clone()),
                );
            }
            None => {
                cmd = cmd.arg(
                    Arg::new(option.name.clone())
                        .long(option.name.clone())
                        .help(option.description.clone()),
                );
            }
        }
    }

    cmd
}

/// Builds the help command for one schematic, registered under `key`.
pub fn subcommand_command(key: &str, sub: &SubcommandDescription) -> Command {
    let mut cmd = Command::new(key.to_string())
        .bin_name(format!("{BIN_NAME} generate {key}"))
        .disable_help_flag(true)
        .disable_version_flag(true);

    if let Some(description) = &sub.description {
        cmd = cmd.about(description.clone());
    }
    if let Some(path) = &sub.long_description_path {
        match std::fs::read_to_string(path) {
            Ok(text) => cmd = cmd.long_about(text),
            Err(err) => debug!(path = %path.display(), error = %err, "long description unavailable"),
        }
    }
    if !sub.aliases.is_empty() {
        cmd = cmd.after_help(format!("Aliases: {}", sub.aliases.join(", ")));
    }

    let positionals = sub.positionals();
    let mut all_required = true;
    for (slot, option) in positionals.iter().enumerate() {
        all_required &= option.required;
        let is_last = slot + 1 == positionals.len();
        let mut arg = describe(Arg::new(option.name.clone()), option)
            .index(slot + 1)
            .value_name(option.name.to_uppercase())
            .required(all_required);
        if option.kind.is_multiple() && is_last {
            arg = arg.num_args(1..);
        }
        cmd = cmd.arg(arg);
    }

    for option in sub.flags() {
        cmd = cmd.arg(flag_arg(option));
        if let Some(negation) = &option.negation {
            cmd = cmd.arg(
                Arg::new(format!("{}:negated", option.name))
                    .long(long_name(negation))
                    .action(ArgAction::SetTrue)
                    .hide(option.hidden)
                    .help(format!("Negates {}", option.canonical_name())),
            );
        }
    }

    cmd
}

fn flag_arg(option: &OptionSpec) -> Arg {
    let mut arg = describe(Arg::new(option.name.clone()), option);
    if let Some(flag) = &option.flag {
        arg = arg.long(long_name(flag));
    }

    let mut has_short = false;
    for alias in &option.aliases {
        match short_alias(alias) {
            Some(short) if !has_short => {
                arg = arg.short(short);
                has_short = true;
            }
            Some(short) => arg = arg.visible_short_alias(short),
            None => arg = arg.visible_alias(long_name(alias)),
        }
    }

    match &option.kind {
        OptionKind::Boolean => arg.action(ArgAction::SetTrue),
        OptionKind::Array { items } => arg
            .action(ArgAction::Append)
            .value_name(items.type_name().to_uppercase()),
        kind => arg
            .action(ArgAction::Set)
            .value_name(kind.type_name().to_uppercase())
            .required(option.required),
    }
}

fn describe(mut arg: Arg, option: &OptionSpec) -> Arg {
    let mut help = option.description.clone().unwrap_or_default();
    if option.deprecated {
        help = format!("{help} (deprecated)").trim_start().to_string();
    }
    if !help.is_empty() {
        arg = arg.help(help);
    }
    let choices = match &option.kind {
        OptionKind::String { choices } => choices.as_slice(),
        _ => &[][..],
    };
    if !choices.is_empty() {
        arg = arg.value_parser(clap::builder::PossibleValuesParser::new(choices.to_vec()));
    }
    let default = option
        .default
        .as_ref()
        .and_then(default_text)
        .filter(|value| choices.is_empty() || choices.contains(value));
    if let Some(default) = default {
        if !option.kind.is_boolean() && !option.required {
            arg = arg.default_value(default);
        }
    }
    arg.hide(option.hidden)
}

fn default_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn long_name(flag: &str) -> String {
    flag.trim_start_matches('-').to_string()
}

fn short_alias(alias: &str) -> Option<char> {
    let rest = alias.strip_prefix('-')?;
    if rest.starts_with('-') {
        return None;
    }
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Rendered help for the whole `generate` command.
pub fn render_generate_help(spec: &CommandSpec) -> String {
    generate_command(spec).render_help().to_string()
}

/// Rendered help for one schematic.
pub fn render_subcommand_help(key: &str, sub: &SubcommandDescription) -> String {
    subcommand_command(key, sub).render_long_help().to_string()
}
