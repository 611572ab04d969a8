//! `build` — build a plugin image from a source directory.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use waggle_node_core::command::{build_command, image_name};
use waggle_node_core::docker;
use waggle_node_core::manifest::PluginManifest;

#[derive(Args)]
pub struct BuildArgs {
    /// Additional K=V build arguments passed to the engine
    #[arg(long = "build-arg", value_name = "K=V")]
    pub build_args: Vec<String>,

    /// Base directory of the plugin to build
    pub plugin_dir: PathBuf,
}

/// Build the image and print its tag to stdout.
///
/// Engine output goes to stderr so stdout carries only the tag, which lets
/// callers do `waggle-node run $(waggle-node build dir)`.
pub async fn execute(args: BuildArgs) -> Result<i32> {
    if !args.plugin_dir.is_dir() {
        bail!("argument must point to base directory of a plugin");
    }

    let manifest = PluginManifest::load(&args.plugin_dir)?;
    let cmd = build_command(
        &args.plugin_dir.to_string_lossy(),
        &args.build_args,
        &manifest,
    );

    let code = docker::run_with_stdout_to_stderr(&cmd).await?;
    println!("{}", image_name(&manifest));
    Ok(code)
}
