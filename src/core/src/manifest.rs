//! Plugin manifest resolution.
//!
//! A plugin declares its identity in a `sage.json` file at the root of its
//! source directory. Built images carry the same identity as container
//! labels under the `waggle.plugin.*` namespace, which is how `run` recovers
//! the manifest without access to the source tree.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{NodeError, Result};

/// Label namespace shared by the build (producer) and run (consumer) paths.
pub const LABEL_NAMESPACE: &str = "waggle";

/// Image label carrying the plugin id.
pub const LABEL_ID: &str = "waggle.plugin.id";
/// Image label carrying the plugin version.
pub const LABEL_VERSION: &str = "waggle.plugin.version";
/// Image label carrying the plugin name.
pub const LABEL_NAME: &str = "waggle.plugin.name";

/// Manifest file name expected in a plugin directory.
pub const MANIFEST_FILE: &str = "sage.json";

/// The declared identity of a plugin.
///
/// `build_args` keeps its `sage.json` declaration order; the build command
/// shape is a compatibility contract and must not depend on hash ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    pub id: u64,
    pub name: String,
    pub version: String,
    pub build_args: IndexMap<String, String>,
}

/// Partially-parsed manifest used to report the full missing-field set.
#[derive(Debug, Deserialize)]
struct RawManifest {
    id: Option<u64>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    build_args: IndexMap<String, String>,
}

impl RawManifest {
    fn validate(self) -> Result<PluginManifest> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id".to_string());
        }
        if self.name.is_none() {
            missing.push("name".to_string());
        }
        if self.version.is_none() {
            missing.push("version".to_string());
        }
        if !missing.is_empty() {
            return Err(NodeError::ManifestIncomplete { missing });
        }
        Ok(PluginManifest {
            id: self.id.unwrap(),
            name: self.name.unwrap(),
            version: self.version.unwrap(),
            build_args: self.build_args,
        })
    }
}

impl PluginManifest {
    /// Load and validate the manifest from a plugin source directory.
    ///
    /// Unknown fields (`architecture`, `inputs`, `metadata`, ...) are
    /// ignored; only `id`, `name` and `version` are required.
    pub fn load(plugin_dir: &Path) -> Result<Self> {
        let path = plugin_dir.join(MANIFEST_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NodeError::ManifestMissing)
            }
            Err(e) => return Err(e.into()),
        };
        let raw: RawManifest = serde_json::from_str(&text)?;
        raw.validate()
    }

    /// Recover a manifest from a built image's label set.
    ///
    /// Labels carry no build args; those only matter at build time.
    pub fn from_labels(labels: &HashMap<String, String>) -> Result<Self> {
        let raw = RawManifest {
            id: labels.get(LABEL_ID).and_then(|v| v.parse().ok()),
            name: labels.get(LABEL_NAME).cloned(),
            version: labels.get(LABEL_VERSION).cloned(),
            build_args: IndexMap::new(),
        };
        raw.validate()
    }
}
