//! Generator identifier resolution.
//!
//! A raw identifier is either a bare generator name (`component`), which is
//! looked up in the default collection, or `collection:name`. Only the first
//! `:` separates the two parts, so `a:b:c` names generator `b:c` in
//! collection `a`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between collection and generator name.
pub const COLLECTION_SEPARATOR: char = ':';

/// A resolved `(collection, generator)` pair.
///
/// The generator name is absent when the user did not select one (for
/// example `schematic generate` with no argument).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorIdentifier {
    /// Collection the generator is looked up in.
    pub collection_name: String,
    /// Generator name, if one was given.
    pub generator_name: Option<String>,
}

impl GeneratorIdentifier {
    /// Resolves a raw identifier against `default_collection`.
    ///
    /// Never fails: a malformed collection part is only detected later, when
    /// the catalog cannot find it.
    ///
    /// # Examples
    ///
    /// ```
    /// use schematic_core::GeneratorIdentifier;
    ///
    /// let id = GeneratorIdentifier::resolve(Some("component"), "@schematics/core");
    /// assert_eq!(id.collection_name, "@schematics/core");
    /// assert_eq!(id.generator_name.as_deref(), Some("component"));
    ///
    /// let id = GeneratorIdentifier::resolve(Some("@acme/kit:widget"), "@schematics/core");
    /// assert_eq!(id.collection_name, "@acme/kit");
    /// assert_eq!(id.generator_name.as_deref(), Some("widget"));
    ///
    /// let id = GeneratorIdentifier::resolve(None, "@schematics/core");
    /// assert!(id.generator_name.is_none());
    /// ```
    pub fn resolve(raw: Option<&str>, default_collection: &str) -> Self {
        match raw {
            Some(raw) => match raw.split_once(COLLECTION_SEPARATOR) {
                Some((collection, name)) => Self {
                    collection_name: collection.to_string(),
                    generator_name: Some(name.to_string()),
                },
                None => Self {
                    collection_name: default_collection.to_string(),
                    generator_name: Some(raw.to_string()),
                },
            },
            None => Self {
                collection_name: default_collection.to_string(),
                generator_name: None,
            },
        }
    }

    /// Returns `true` when both collection and generator are non-empty.
    pub fn is_complete(&self) -> bool {
        self.parts().is_some()
    }

    /// Returns `(collection, generator)` when the identifier is complete.
    pub fn parts(&self) -> Option<(&str, &str)> {
        if self.collection_name.is_empty() {
            return None;
        }
        self.generator_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| (self.collection_name.as_str(), name))
    }
}

impl fmt::Display for GeneratorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.generator_name {
            Some(name) => write!(f, "{}{COLLECTION_SEPARATOR}{name}", self.collection_name),
            None => f.write_str(&self.collection_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "core";

    #[test]
    fn test_bare_name_uses_default_collection() {
        for raw in ["component", "service", "my/thing", "@scope/x"] {
            let id = GeneratorIdentifier::resolve(Some(raw), DEFAULT);
            assert_eq!(id.collection_name, DEFAULT);
            assert_eq!(id.generator_name.as_deref(), Some(raw));
        }
    }

    #[test]
    fn test_collection_prefix_overrides_default() {
        let id = GeneratorIdentifier::resolve(Some("third-party:widget"), DEFAULT);
        assert_eq!(id.collection_name, "third-party");
        assert_eq!(id.generator_name.as_deref(), Some("widget"));
    }

    #[test]
    fn test_splits_on_first_separator_only() {
        let id = GeneratorIdentifier::resolve(Some("A:B:C"), DEFAULT);
        assert_eq!(id.collection_name, "A");
        assert_eq!(id.generator_name.as_deref(), Some("B:C"));
    }

    #[test]
    fn test_empty_parts_are_kept_verbatim() {
        let id = GeneratorIdentifier::resolve(Some(":widget"), DEFAULT);
        assert_eq!(id.collection_name, "");
        assert_eq!(id.generator_name.as_deref(), Some("widget"));
        assert!(!id.is_complete());
        assert!(id.parts().is_none());

        let id = GeneratorIdentifier::resolve(Some("kit:"), DEFAULT);
        assert_eq!(id.collection_name, "kit");
        assert_eq!(id.generator_name.as_deref(), Some(""));
        assert!(!id.is_complete());
    }

    #[test]
    fn test_absent_input_has_no_generator() {
        let id = GeneratorIdentifier::resolve(None, DEFAULT);
        assert_eq!(id.collection_name, DEFAULT);
        assert!(id.generator_name.is_none());
        assert!(!id.is_complete());
    }

    #[test]
    fn test_display() {
        let id = GeneratorIdentifier::resolve(Some("component"), DEFAULT);
        assert_eq!(id.to_string(), "core:component");
        assert_eq!(GeneratorIdentifier::resolve(None, DEFAULT).to_string(), "core");
    }
}
