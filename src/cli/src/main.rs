//! waggle-node - Command-line interface for the virtual Waggle environment.
//!
//! Provides commands for stack lifecycle, plugin builds, plugin runs and
//! project scaffolding.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waggle_node_core::config::NodeConfig;
use waggle_node_core::docker::Compose;

use commands::{build, deploy, newplugin, run, stack};

/// waggle-node - virtual Waggle development environment
#[derive(Parser)]
#[command(
    name = "waggle-node",
    version = "0.1.0",
    about = "waggle-node - virtual Waggle development environment",
    long_about = "CLI tool for operating a local virtual Waggle stack: build, run and \
                  scaffold plugins against a Docker Compose environment.",
    propagate_version = true
)]
pub struct Cli {
    /// Project name scoping all compose operations (default: directory name)
    #[arg(short = 'p', long, global = true, env = "WAGGLE_PROJECT_NAME")]
    project_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the virtual waggle environment
    Up,

    /// Stop the virtual waggle environment
    Down,

    /// Show virtual waggle system logs
    Logs(stack::LogsArgs),

    /// Show virtual waggle system report for debugging
    Report,

    /// Build a plugin for virtual waggle from a directory
    Build(build::BuildArgs),

    /// Run a plugin inside the virtual waggle environment
    Run(run::RunArgs),

    /// Generate a new plugin
    Newplugin(newplugin::NewPluginArgs),

    /// Provision plugins and generate the compose overlay
    Deploy(deploy::DeployArgs),
}

/// Compose project names default to the working directory's basename.
fn default_project_name(project_dir: &std::path::Path) -> String {
    project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "waggle".to_string())
}

async fn dispatch(cli: Cli, project_dir: PathBuf) -> Result<i32> {
    let project = cli
        .project_name
        .clone()
        .unwrap_or_else(|| default_project_name(&project_dir));
    let config = NodeConfig::load(&project_dir)?;
    let compose = Compose::new(&project);

    match cli.command {
        Commands::Up => stack::up(&compose).await,
        Commands::Down => stack::down(&compose, &project_dir).await,
        Commands::Logs(args) => stack::logs(&compose, args).await,
        Commands::Report => stack::report(&compose).await,
        Commands::Build(args) => build::execute(args).await,
        Commands::Run(args) => run::execute(args, &project, &config).await,
        Commands::Newplugin(args) => newplugin::execute(args, &project_dir),
        Commands::Deploy(args) => deploy::execute(args, &project, &config, &project_dir).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let project_dir = match std::env::current_dir().context("Could not determine working directory")
    {
        Ok(dir) => dir,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let code = match dispatch(cli, project_dir).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_project_name_uses_directory_basename() {
        assert_eq!(
            default_project_name(Path::new("/home/user/my-node")),
            "my-node"
        );
    }

    #[test]
    fn build_accepts_repeated_build_args() {
        let cli = Cli::parse_from([
            "waggle-node",
            "build",
            "--build-arg",
            "K1=V1",
            "--build-arg",
            "K2=V2",
            "plugin-simple",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.build_args, ["K1=V1", "K2=V2"]);
                assert_eq!(args.plugin_dir, Path::new("plugin-simple"));
            }
            _ => panic!("expected build subcommand"),
        }
    }

    #[test]
    fn project_name_is_global() {
        let cli = Cli::parse_from(["waggle-node", "up", "-p", "mystack"]);
        assert_eq!(cli.project_name.as_deref(), Some("mystack"));
    }
}
