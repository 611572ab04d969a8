//! Generated compose overlay declaring one service per plugin.
//!
//! The overlay sits next to the main compose file and is picked up with
//! `docker-compose -f docker-compose.yml -f docker-compose.plugins.yml`.
//! Plugins read their credentials from a file mount; the environment block
//! duplicates identity so plugins without file access still work.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::credentials::Credential;
use crate::error::Result;
use crate::identity::{
    PluginIdentity, ENV_PLUGIN_HOST, ENV_PLUGIN_ID, ENV_PLUGIN_INSTANCE, ENV_PLUGIN_PASSWORD,
    ENV_PLUGIN_USERNAME, ENV_PLUGIN_VERSION,
};

/// File name of the generated overlay.
pub const OVERLAY_FILE: &str = "docker-compose.plugins.yml";

/// Split a `waggle/plugin-{name}:{version}` image reference.
pub fn parse_plugin_image_ref(image: &str) -> Option<(String, String)> {
    let re = Regex::new(r"^waggle/plugin-(\S+):(\S+)$").expect("valid pattern");
    let caps = re.captures(image)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// One plugin service entry in the overlay.
#[derive(Debug, Clone, Serialize)]
pub struct PluginService {
    pub image: String,
    pub restart: String,
    pub networks: Vec<String>,
    pub volumes: Vec<String>,
    pub environment: Vec<String>,
}

impl PluginService {
    pub fn new(image: &str, identity: &PluginIdentity, credential: &Credential) -> Self {
        Self {
            image: image.to_string(),
            restart: "always".to_string(),
            networks: vec!["waggle".to_string()],
            volumes: vec![format!(
                "${{WAGGLE_ETC_ROOT}}/plugins/{}/plugin.credentials:/plugin/plugin.credentials:ro",
                credential.username
            )],
            environment: vec![
                format!("{}=rabbitmq", ENV_PLUGIN_HOST),
                format!("{}={}", ENV_PLUGIN_ID, identity.id),
                format!("{}={}", ENV_PLUGIN_VERSION, identity.version),
                format!("{}={}", ENV_PLUGIN_INSTANCE, identity.instance),
                format!("{}={}", ENV_PLUGIN_USERNAME, credential.username),
                format!("{}={}", ENV_PLUGIN_PASSWORD, credential.password),
            ],
        }
    }
}

/// The overlay document, services keyed by account name in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeOverlay {
    pub version: String,
    pub services: IndexMap<String, PluginService>,
}

impl Default for ComposeOverlay {
    fn default() -> Self {
        Self {
            version: "3".to_string(),
            services: IndexMap::new(),
        }
    }
}

impl ComposeOverlay {
    /// Add a service entry named after the plugin's broker account.
    pub fn add_plugin(&mut self, image: &str, identity: &PluginIdentity, credential: &Credential) {
        self.services.insert(
            credential.username.clone(),
            PluginService::new(image, identity, credential),
        );
    }

    /// Serialize and write the overlay into the project directory.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(OVERLAY_FILE);
        let yaml = serde_yaml::to_string(self).expect("overlay serializes");
        std::fs::write(&path, yaml)?;
        Ok(path)
    }
}
