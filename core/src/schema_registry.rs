//! Resolution of `$ref` pointers inside generator schema documents.
//!
//! Schemas may point at local definitions (`#/definitions/style`,
//! `#/$defs/style`) or at documents registered under an id
//! (`common.json#/definitions/style`). The registry only resolves pointers;
//! it never validates values.

use std::collections::BTreeMap;

use serde_json::Value;

/// Upper bound on chained `$ref` hops before giving up.
const MAX_REF_DEPTH: usize = 32;

/// Known schema documents, addressable by id.
///
/// # Examples
///
/// ```
/// use schematic_core::SchemaRegistry;
/// use serde_json::json;
///
/// let mut registry = SchemaRegistry::new();
/// registry.register("common.json", json!({"definitions": {"style": {"type": "string"}}}));
///
/// let root = json!({});
/// let resolved = registry.resolve("common.json#/definitions/style", &root).unwrap();
/// assert_eq!(resolved["type"], "string");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    documents: BTreeMap<String, Value>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `document` under `id`, replacing any previous document.
    pub fn register(&mut self, id: impl Into<String>, document: Value) {
        self.documents.insert(id.into(), document);
    }

    /// Returns `true` if a document is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Resolves a single `$ref` string.
    ///
    /// A reference starting with `#` is looked up in `root`; anything else is
    /// split at `#` into a registered document id and a JSON pointer.
    pub fn resolve<'a>(&'a self, reference: &str, root: &'a Value) -> Option<&'a Value> {
        self.resolve_with_base(reference, root).map(|(_, value)| value)
    }

    /// Like [`resolve`](Self::resolve), also returning the document the
    /// target lives in.
    fn resolve_with_base<'a>(
        &'a self,
        reference: &str,
        root: &'a Value,
    ) -> Option<(&'a Value, &'a Value)> {
        let (doc_id, fragment) = match reference.split_once('#') {
            Some((id, fragment)) => (id, fragment),
            None => (reference, ""),
        };

        let document = if doc_id.is_empty() {
            root
        } else {
            self.documents.get(doc_id)?
        };

        let target = if fragment.is_empty() {
            document
        } else {
            document.pointer(fragment)?
        };
        Some((document, target))
    }

    /// Follows `$ref` chains starting at `value` until a concrete schema is
    /// reached.
    ///
    /// Local `#` references are resolved against the document holding the
    /// reference, so a registered document may use its own definitions.
    /// Returns the unresolvable reference on failure.
    pub fn dereference<'a>(&'a self, value: &'a Value, root: &'a Value) -> Result<&'a Value, String> {
        let mut base = root;
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            match current.get("$ref").and_then(Value::as_str) {
                Some(reference) => {
                    let (document, target) = self
                        .resolve_with_base(reference, base)
                        .ok_or_else(|| reference.to_string())?;
                    base = document;
                    current = target;
                }
                None => return Ok(current),
            }
        }
        current
            .get("$ref")
            .and_then(Value::as_str)
            .map_or_else(|| Ok(current), |r| Err(r.to_string()))
    }
}
