//! Tool configuration.
//!
//! Loaded from an optional `waggle-node.toml` in the project directory;
//! every field has a local-development default so a bare checkout works
//! without any configuration.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file name looked up in the project directory.
pub const CONFIG_FILE: &str = "waggle-node.toml";

/// Top-level tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Message broker configuration
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Static plugin name -> id table used by the compose overlay flow
    #[serde(default = "default_plugin_ids")]
    pub plugin_ids: BTreeMap<String, u64>,

    /// Env file passed to plugin containers
    #[serde(default = "default_env_file")]
    pub env_file: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            plugin_ids: default_plugin_ids(),
            env_file: default_env_file(),
        }
    }
}

/// Broker admin access and provisioning strategy.
///
/// The admin tuple is explicit configuration handed to the provisioner, not
/// process-wide state.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Management admin username
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Management admin password
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// Management API base URL
    #[serde(default = "default_management_url")]
    pub management_url: String,

    /// Which provisioning strategy to use
    #[serde(default)]
    pub provisioner: ProvisionerKind,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            management_url: default_management_url(),
            provisioner: ProvisionerKind::default(),
        }
    }
}

/// Account provisioning strategy, selected per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionerKind {
    /// `rabbitmqctl` inside the running stack; blanket permissions
    #[default]
    Rabbitmqctl,
    /// Management HTTP API; scoped permissions, idempotent hash check
    ManagementApi,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_management_url() -> String {
    "http://localhost:15672".to_string()
}

fn default_env_file() -> String {
    "waggle-node.env".to_string()
}

fn default_plugin_ids() -> BTreeMap<String, u64> {
    BTreeMap::from([("simple".to_string(), 37)])
}

impl NodeConfig {
    /// Load configuration from `<dir>/waggle-node.toml`, falling back to
    /// defaults if the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;
        Ok(config)
    }
}
