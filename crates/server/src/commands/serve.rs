//! Handler for the `serve` command.

use anyhow::{Context, Result};
use helpix_scheduler::{MatchingService, ScheduleConfig, Scheduler};
use std::sync::Arc;

/// Run the scheduler until Ctrl-C, then drain it.
pub(crate) async fn handle_serve_command(
    service: Arc<MatchingService>,
    schedule: ScheduleConfig,
) -> Result<()> {
    let handle = Scheduler::new(service, schedule).spawn();
    eprintln!("helpix: scheduler running, press Ctrl-C to stop");

    let waited = tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C");
    tracing::info!(target: "helpix::server", "shutting down");
    handle.shutdown().await;
    waited
}
