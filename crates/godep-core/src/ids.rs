//! Stable graph identifiers for package names.

use std::collections::HashMap;

/// Escape special characters for a double-quoted DOT string.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// The identifier of a package is its quoted, escaped name.
///
/// Names are already unique and escaping is injective, so identifiers never collide.
pub fn derive_node_id(name: &str) -> String {
    format!("\"{}\"", escape_label(name))
}

/// Memoized name to identifier mapping, filled lazily during rendering.
#[derive(Debug, Default)]
pub struct IdTable {
    ids: HashMap<String, String>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for `name`, derived on first use.
    pub fn id(&mut self, name: &str) -> &str {
        self.ids
            .entry(name.to_string())
            .or_insert_with(|| derive_node_id(name))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
