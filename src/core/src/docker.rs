//! Subprocess seams around `docker` and `docker-compose`.
//!
//! Long-running invocations (`up`, `logs -f`, plugin runs) pass stdio
//! through and surface the child's exit code; housekeeping invocations are
//! quieted and treat "resource already absent" as success.

use std::collections::HashMap;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{NodeError, Result};

fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Run a command with inherited stdio and return its exit code.
pub async fn run_passthrough(argv: &[String]) -> Result<i32> {
    debug!(command = ?argv, "running");
    let status = Command::new(&argv[0]).args(&argv[1..]).status().await?;
    Ok(exit_code(status))
}

/// Run a command with stdout redirected onto our stderr.
///
/// `build` streams engine output this way so the only thing on stdout is
/// the resulting image tag.
pub async fn run_with_stdout_to_stderr(argv: &[String]) -> Result<i32> {
    debug!(command = ?argv, "running (stdout redirected)");
    let mut child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdout(Stdio::piped())
        .spawn()?;
    if let Some(mut stdout) = child.stdout.take() {
        tokio::io::copy(&mut stdout, &mut tokio::io::stderr()).await?;
    }
    let status = child.wait().await?;
    Ok(exit_code(status))
}

/// Run a command discarding all output, returning whether it succeeded.
pub async fn run_quiet(argv: &[String]) -> Result<bool> {
    debug!(command = ?argv, "running (quiet)");
    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    Ok(status.success())
}

/// Check whether an image is present in the local engine cache.
pub async fn image_exists(image: &str) -> Result<bool> {
    run_quiet(&[
        "docker".to_string(),
        "inspect".to_string(),
        image.to_string(),
    ])
    .await
}

/// Pull an image from the remote registry, streaming progress through.
pub async fn pull_image(image: &str) -> Result<()> {
    let code = run_passthrough(&[
        "docker".to_string(),
        "pull".to_string(),
        image.to_string(),
    ])
    .await?;
    if code != 0 {
        return Err(NodeError::PullFailed(image.to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct InspectRecord {
    #[serde(rename = "ContainerConfig")]
    container_config: Option<InspectConfig>,
    #[serde(rename = "Config")]
    config: Option<InspectConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct InspectConfig {
    #[serde(rename = "Labels")]
    labels: Option<HashMap<String, String>>,
}

/// Read the label set from a local image.
pub async fn inspect_labels(image: &str) -> Result<HashMap<String, String>> {
    let output = Command::new("docker")
        .args(["inspect", image])
        .stderr(Stdio::null())
        .output()
        .await?;
    if !output.status.success() {
        return Err(NodeError::ImageNotFound(image.to_string()));
    }

    let records: Vec<InspectRecord> = serde_json::from_slice(&output.stdout)?;
    let mut labels = HashMap::new();
    for record in records {
        let config = record.container_config.or(record.config).unwrap_or_default();
        labels.extend(config.labels.unwrap_or_default());
    }
    Ok(labels)
}

/// Forcibly remove a container. An absent container is success.
pub async fn remove_container(name: &str) -> Result<()> {
    run_quiet(&[
        "docker".to_string(),
        "rm".to_string(),
        "-f".to_string(),
        name.to_string(),
    ])
    .await?;
    Ok(())
}

/// `docker-compose` invocations scoped to one project name.
#[derive(Debug, Clone)]
pub struct Compose {
    project: String,
}

impl Compose {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    /// The compose network plugins attach to.
    pub fn network(&self) -> String {
        format!("{}_waggle", self.project)
    }

    fn command(&self, args: &[&str]) -> Vec<String> {
        let mut cmd = vec![
            "docker-compose".to_string(),
            "-p".to_string(),
            self.project.clone(),
        ];
        cmd.extend(args.iter().map(|s| s.to_string()));
        cmd
    }

    /// Start the stack detached.
    pub async fn up(&self) -> Result<i32> {
        run_passthrough(&self.command(&["up", "-d"])).await
    }

    /// Stop the stack, removing orphaned containers.
    pub async fn down(&self) -> Result<i32> {
        run_passthrough(&self.command(&["down", "--remove-orphans"])).await
    }

    /// Stream stack logs.
    pub async fn logs(&self, follow: bool) -> Result<i32> {
        let args: &[&str] = if follow { &["logs", "-f"] } else { &["logs"] };
        run_passthrough(&self.command(args)).await
    }

    /// Run a command inside the rabbitmq service, output streamed through.
    pub async fn exec_rabbitmq(&self, args: &[&str]) -> Result<i32> {
        let mut exec = vec!["exec", "rabbitmq"];
        exec.extend(args);
        run_passthrough(&self.command(&exec)).await
    }

    /// Run a command inside the rabbitmq service, output discarded.
    pub async fn exec_rabbitmq_quiet(&self, args: &[&str]) -> Result<bool> {
        let mut exec = vec!["exec", "rabbitmq"];
        exec.extend(args);
        run_quiet(&self.command(&exec)).await
    }
}
