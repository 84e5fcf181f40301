//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator. Orchestration code matches on
//! these; everything else propagates them with context.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

// ── Runtime errors ────────────────────────────────────────────────────────────

/// Failures from the Docker runtime port. Surfaced immediately — no retries.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The docker binary could not be spawned at all.
    #[error("failed to run `docker {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A docker invocation ran but exited non-zero.
    #[error("`docker {command}` failed with {status}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

// ── Orchestration errors ──────────────────────────────────────────────────────

/// Errors surfaced by the build/run orchestration.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler image could not be built.
    #[error("failed to build the compiler image")]
    BuildFailed(#[source] RuntimeError),

    /// The compile container exited with a failure.
    #[error("failed to run the compiler container")]
    RunFailed(#[source] RuntimeError),

    /// The sketch directory does not exist.
    #[error("directory '{}' does not exist", .0.display())]
    InvalidDirectory(PathBuf),
}
