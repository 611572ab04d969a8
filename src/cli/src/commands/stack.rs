//! Stack lifecycle commands: `up`, `down`, `logs`, `report`.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use waggle_node_core::docker::Compose;
use waggle_node_core::stack::remove_generated_files;

use crate::output;

#[derive(Args)]
pub struct LogsArgs {
    /// Follow log output
    #[arg(short = 'f')]
    pub follow: bool,
}

/// Start the stack detached; the compose exit code becomes ours.
pub async fn up(compose: &Compose) -> Result<i32> {
    Ok(compose.up().await?)
}

/// Stop the stack and clean up generated TLS material and port markers.
///
/// Credential files from prior runs are left in place.
pub async fn down(compose: &Compose, project_dir: &Path) -> Result<i32> {
    let code = compose.down().await?;
    for path in remove_generated_files(project_dir)? {
        output::print_info(&format!("Cleaned up {}", path.display()));
    }
    Ok(code)
}

/// Stream stack logs.
pub async fn logs(compose: &Compose, args: LogsArgs) -> Result<i32> {
    Ok(compose.logs(args.follow).await?)
}

/// Print broker queue and shovel status for debugging.
///
/// Diagnostic output only; rabbitmqctl exit codes are not propagated.
pub async fn report(compose: &Compose) -> Result<i32> {
    output::print_header("RabbitMQ Queue Status");
    compose.exec_rabbitmq(&["rabbitmqctl", "list_queues"]).await?;

    output::print_header("RabbitMQ Shovel Status");
    compose
        .exec_rabbitmq(&["rabbitmqctl", "eval", "rabbit_shovel_status:status()."])
        .await?;

    Ok(0)
}
