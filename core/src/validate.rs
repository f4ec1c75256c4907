//! Structural validation of built subcommand descriptions.
//!
//! The schema builder runs these checks on every description it produces so
//! that clashing flags or positional slots are reported at startup instead
//! of confusing the argument parser later.
//!
//! # Examples
//!
//! ```
//! use schematic_core::*;
//!
//! let sub = SubcommandDescription::new("component")
//!     .with_option(OptionSpec::flag("flat", OptionKind::Boolean));
//! assert!(validate_subcommand(&sub).is_empty());
//!
//! // Invalid: two options claim the same flag
//! let bad = SubcommandDescription::new("component")
//!     .with_option(OptionSpec::flag("flat", OptionKind::Boolean))
//!     .with_option(OptionSpec::flag("Flat", OptionKind::Boolean));
//! assert!(!validate_subcommand(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{OptionSpec, SubcommandDescription};

/// Subcommand validation errors.
///
/// Each variant describes a specific structural problem. The `Display` impl
/// provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Subcommand name is empty or whitespace-only.
    #[error("subcommand name cannot be empty")]
    EmptySubcommandName,
    /// An option has an empty property name.
    #[error("option name cannot be empty")]
    EmptyOptionName,
    /// Short alias does not look like `-x`.
    #[error("invalid short flag format: {0}")]
    InvalidShortFlag(String),
    /// Long flag does not start with `--` or is too short.
    #[error("invalid long flag format: {0}")]
    InvalidLongFlag(String),
    /// An option is neither a flag nor a positional, or is both.
    #[error("option {0} must be either a flag or a positional")]
    AmbiguousOption(String),
    /// Two options share a flag, negation or alias.
    #[error("duplicate flag in scope: {0}")]
    DuplicateFlag(String),
    /// Two positionals share an index.
    #[error("duplicate positional index {index} for {name}")]
    DuplicatePositional {
        /// The contested index.
        index: usize,
        /// The second option claiming it.
        name: String,
    },
}

/// Validates a subcommand description.
///
/// Every problem found is returned, in option order. An option that is
/// malformed on its own is not checked for clashes.
pub fn validate_subcommand(sub: &SubcommandDescription) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if sub.name.trim().is_empty() {
        errors.push(ValidationError::EmptySubcommandName);
    }

    let mut seen_flags: HashSet<&str> = HashSet::new();
    let mut seen_positions: HashSet<usize> = HashSet::new();

    for option in &sub.options {
        if let Some(error) = check_option(option) {
            errors.push(error);
            continue;
        }

        if let Some(index) = option.positional {
            if !seen_positions.insert(index) {
                errors.push(ValidationError::DuplicatePositional {
                    index,
                    name: option.name.clone(),
                });
            }
        }

        let tokens = option
            .flag
            .iter()
            .chain(option.negation.iter())
            .chain(option.aliases.iter());
        for token in tokens {
            if !seen_flags.insert(token.as_str()) {
                errors.push(ValidationError::DuplicateFlag(token.clone()));
            }
        }
    }

    errors
}

fn check_option(option: &OptionSpec) -> Option<ValidationError> {
    if option.name.trim().is_empty() {
        return Some(ValidationError::EmptyOptionName);
    }

    if option.flag.is_some() == option.positional.is_some() {
        return Some(ValidationError::AmbiguousOption(option.name.clone()));
    }

    let longs = option.flag.iter().chain(option.negation.iter());
    for long in longs {
        if !is_long_flag(long) {
            return Some(ValidationError::InvalidLongFlag(long.clone()));
        }
    }

    for alias in &option.aliases {
        if alias.starts_with("--") {
            if !is_long_flag(alias) {
                return Some(ValidationError::InvalidLongFlag(alias.clone()));
            }
        } else if !alias.starts_with('-') || alias.chars().count() != 2 {
            return Some(ValidationError::InvalidShortFlag(alias.clone()));
        }
    }

    None
}

fn is_long_flag(flag: &str) -> bool {
    flag.starts_with("--") && flag.len() >= 3 && !flag.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use crate::OptionKind;

    use super::*;

    #[test]
    fn test_rejects_duplicate_negation() {
        // `noFlat` dasherizes to the negation of `flat`
        let sub = SubcommandDescription::new("component")
            .with_option(OptionSpec::flag("flat", OptionKind::Boolean).with_negation("--no-flat"))
            .with_option(OptionSpec::flag("noFlat", OptionKind::Boolean));

        assert_eq!(
            validate_subcommand(&sub),
            vec![ValidationError::DuplicateFlag("--no-flat".to_string())]
        );
    }

    #[test]
    fn test_rejects_duplicate_positional() {
        let sub = SubcommandDescription::new("component")
            .with_option(OptionSpec::positional("name", OptionKind::string(), 0))
            .with_option(OptionSpec::positional("path", OptionKind::string(), 0));

        assert_eq!(
            validate_subcommand(&sub),
            vec![ValidationError::DuplicatePositional {
                index: 0,
                name: "path".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_bad_short_alias() {
        let sub = SubcommandDescription::new("component")
            .with_option(OptionSpec::flag("flat", OptionKind::Boolean).with_alias("f"));

        assert_eq!(
            validate_subcommand(&sub),
            vec![ValidationError::InvalidShortFlag("f".to_string())]
        );
    }

    #[test]
    fn test_rejects_empty_subcommand_name() {
        let sub = SubcommandDescription::new("  ");
        assert_eq!(
            validate_subcommand(&sub),
            vec![ValidationError::EmptySubcommandName]
        );
    }

    #[test]
    fn test_accepts_valid_subcommand() {
        let sub = SubcommandDescription::new("component")
            .with_option(OptionSpec::positional("name", OptionKind::string(), 0))
            .with_option(
                OptionSpec::flag("skipTests", OptionKind::Boolean)
                    .with_negation("--no-skip-tests")
                    .with_alias("-S"),
            )
            .with_option(OptionSpec::flag("style", OptionKind::string()).with_alias("--css"));

        assert!(validate_subcommand(&sub).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let sub = SubcommandDescription::new("")
            .with_option(OptionSpec::flag("flat", OptionKind::Boolean).with_alias("f"))
            .with_option(OptionSpec::positional("name", OptionKind::string(), 0))
            .with_option(OptionSpec::positional("path", OptionKind::string(), 0))
            .with_option(OptionSpec::flag("style", OptionKind::string()).with_alias("-s"))
            .with_option(OptionSpec::flag("skip", OptionKind::Boolean).with_alias("-s"));

        assert_eq!(
            validate_subcommand(&sub),
            vec![
                ValidationError::EmptySubcommandName,
                ValidationError::InvalidShortFlag("f".to_string()),
                ValidationError::DuplicatePositional {
                    index: 0,
                    name: "path".to_string()
                },
                ValidationError::DuplicateFlag("-s".to_string()),
            ]
        );
    }
}
