//! Plugin name -> id resolution.
//!
//! Plugin ids are globally assigned by the Sage ecosystem; until the tool
//! talks to a real registry service, ids come from a table in the tool
//! configuration. The trait keeps the seam open for a remote-backed
//! resolver.

use std::collections::BTreeMap;

/// Resolves a plugin's common name to its globally assigned id.
pub trait PluginRegistry {
    fn resolve(&self, name: &str) -> Option<u64>;
}

/// Registry backed by a static table from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    table: BTreeMap<String, u64>,
}

impl StaticRegistry {
    pub fn new(table: BTreeMap<String, u64>) -> Self {
        Self { table }
    }
}

impl PluginRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Option<u64> {
        self.table.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        let registry = StaticRegistry::new(BTreeMap::from([("simple".to_string(), 37)]));
        assert_eq!(registry.resolve("simple"), Some(37));
        assert_eq!(registry.resolve("unknown"), None);
    }
}
