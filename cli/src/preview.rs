//! Live-preview server over the compiled output.
//!
//! Delegates to the external `live-server` npm tool. The keep-alive loop
//! runs until Ctrl-C or until the server itself dies; there is no cleanup
//! to perform on exit.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::output::OutputContext;

/// Serve `directory` with live-server and block until interrupted.
///
/// When live-server is not installed, prints the npm install hint and
/// returns without error — preview is an optional convenience.
///
/// # Errors
///
/// Returns an error if the server exits with a failure or cannot be
/// polled.
pub async fn serve(ctx: &OutputContext, directory: &Path) -> Result<()> {
    if !live_server_installed().await {
        ctx.warn("live-server not found. Install it with:");
        ctx.info("    npm install -g live-server");
        return Ok(());
    }

    ctx.info(&format!(
        "Serving {} at http://localhost:8080",
        directory.display()
    ));
    let mut child = tokio::process::Command::new("live-server")
        .current_dir(directory)
        .spawn()
        .context("failed to spawn live-server")?;

    loop {
        if let Some(status) = child.try_wait().context("polling live-server")? {
            anyhow::ensure!(status.success(), "live-server exited with {status}");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn live_server_installed() -> bool {
    tokio::process::Command::new("live-server")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}
