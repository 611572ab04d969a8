//! `run` — provision credentials and run one plugin against the stack.

use anyhow::Result;
use clap::Args;
use tracing::warn;
use waggle_node_core::command::run_command;
use waggle_node_core::config::NodeConfig;
use waggle_node_core::credentials::Credential;
use waggle_node_core::docker::{self, Compose};
use waggle_node_core::identity::PluginIdentity;
use waggle_node_core::manifest::PluginManifest;
use waggle_node_core::provision::provisioner_for;

use crate::output;

#[derive(Args)]
pub struct RunArgs {
    /// Plugin image to run
    pub plugin: String,
}

pub async fn execute(args: RunArgs, project: &str, config: &NodeConfig) -> Result<i32> {
    if !docker::image_exists(&args.plugin).await? {
        output::print_info(&format!(
            "Did not find plugin {} locally. Pulling from remote...",
            args.plugin
        ));
        docker::pull_image(&args.plugin).await?;
    }

    let labels = docker::inspect_labels(&args.plugin).await?;
    let manifest = PluginManifest::from_labels(&labels)?;
    let identity = PluginIdentity::from_manifest(&manifest);
    let credential = Credential::generate(identity.account_name());

    output::print_info(&format!("Setting up {}", args.plugin));
    let compose = Compose::new(project);
    let provisioner = provisioner_for(&config.broker, &compose)?;
    provisioner.provision(&identity, &credential).await?;

    let network = compose.network();
    let name = identity.container_name(project);

    // clear stale state from an earlier run of the same plugin
    docker::remove_container(&name).await?;

    output::print_info(&format!("Running {}", args.plugin));
    let cmd = run_command(
        &identity,
        &credential,
        &network,
        &name,
        &config.env_file,
        &args.plugin,
    );

    let result = tokio::select! {
        result = docker::run_passthrough(&cmd) => result.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => Ok(130),
    };

    // guaranteed cleanup: success, failure or interrupt all land here
    output::print_info(&format!("Cleaning up {}", args.plugin));
    if let Err(e) = docker::remove_container(&name).await {
        warn!(container = %name, "failed to remove container: {}", e);
    }

    result
}
