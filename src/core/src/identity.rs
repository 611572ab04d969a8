//! Canonical plugin identity and naming scheme.

use crate::manifest::PluginManifest;

/// Environment variable names injected into every plugin container.
pub const ENV_PLUGIN_HOST: &str = "WAGGLE_PLUGIN_HOST";
pub const ENV_PLUGIN_ID: &str = "WAGGLE_PLUGIN_ID";
pub const ENV_PLUGIN_VERSION: &str = "WAGGLE_PLUGIN_VERSION";
pub const ENV_PLUGIN_INSTANCE: &str = "WAGGLE_PLUGIN_INSTANCE";
pub const ENV_PLUGIN_USERNAME: &str = "WAGGLE_PLUGIN_USERNAME";
pub const ENV_PLUGIN_PASSWORD: &str = "WAGGLE_PLUGIN_PASSWORD";

/// Derived naming tuple for one plugin run.
///
/// `instance` distinguishes multiple concurrent runs of the same plugin
/// version. It is reserved and currently always 0; account names embed it so
/// the scheme does not change when multi-instance support lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginIdentity {
    pub id: u64,
    pub name: String,
    pub version: String,
    pub instance: u32,
}

impl PluginIdentity {
    /// Derive the identity for instance 0 of a manifest.
    pub fn from_manifest(manifest: &PluginManifest) -> Self {
        Self {
            id: manifest.id,
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            instance: 0,
        }
    }

    /// Broker account name, also used as the credential directory name.
    ///
    /// Uniqueness per running stack is assumed, not enforced; a colliding
    /// run silently overwrites the account.
    pub fn account_name(&self) -> String {
        format!("plugin-{}-{}-{}", self.id, self.version, self.instance)
    }

    /// Private inbound queue for this account.
    pub fn inbound_queue(&self) -> String {
        format!("to-{}", self.account_name())
    }

    /// Container name, scoped by compose project so stacks do not collide.
    pub fn container_name(&self, project: &str) -> String {
        format!(
            "{}_plugin-{}-{}-{}",
            project, self.name, self.version, self.instance
        )
    }
}
