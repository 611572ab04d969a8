//! `deploy` — provision a set of plugins and generate the compose overlay.
//!
//! The long-running alternative to `run`: instead of attaching one plugin
//! interactively, every named plugin gets a broker account, a credentials
//! file and a service entry in `docker-compose.plugins.yml`, so the whole
//! set comes up with the stack.

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Args;
use waggle_node_core::compose::{parse_plugin_image_ref, ComposeOverlay};
use waggle_node_core::config::NodeConfig;
use waggle_node_core::credentials::Credential;
use waggle_node_core::docker::Compose;
use waggle_node_core::identity::PluginIdentity;
use waggle_node_core::provision::provisioner_for;
use waggle_node_core::registry::{PluginRegistry, StaticRegistry};

use crate::output;

#[derive(Args)]
pub struct DeployArgs {
    /// Plugin image references (waggle/plugin-{name}:{version})
    #[arg(required = true)]
    pub plugins: Vec<String>,
}

pub async fn execute(
    args: DeployArgs,
    project: &str,
    config: &NodeConfig,
    project_dir: &Path,
) -> Result<i32> {
    let registry = StaticRegistry::new(config.plugin_ids.clone());
    let compose = Compose::new(project);
    let provisioner = provisioner_for(&config.broker, &compose)?;

    let mut overlay = ComposeOverlay::default();
    for image in &args.plugins {
        let (name, version) = parse_plugin_image_ref(image)
            .ok_or_else(|| anyhow!("unrecognized plugin image reference: {}", image))?;
        let id = registry
            .resolve(&name)
            .ok_or_else(|| anyhow!("no plugin id registered for '{}'", name))?;

        let identity = PluginIdentity {
            id,
            name,
            version,
            instance: 0,
        };
        let credential = Credential::generate(identity.account_name());

        output::print_info(&format!("Setting up {}", image));
        provisioner.provision(&identity, &credential).await?;
        credential.write_file(project_dir)?;
        overlay.add_plugin(image, &identity, &credential);
    }

    let path = overlay.write(project_dir)?;
    output::print_success(&format!("Wrote {}", path.display()));
    Ok(0)
}
