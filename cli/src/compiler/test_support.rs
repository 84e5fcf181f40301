//! Shared test doubles for compiler lifecycle tests.
//!
//! `StubDocker` replays canned listings and journals every docker
//! subcommand it is asked to run, so tests can assert on exactly which
//! commands an operation issued and in what order.

use std::cell::RefCell;
use std::path::Path;

use crate::docker::{Docker, RunParams, run_args};
use crate::domain::RuntimeError;

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

/// A `CommandFailed` for the given command line, exit code 1.
pub fn command_failed(command: &str) -> RuntimeError {
    RuntimeError::CommandFailed {
        command: command.to_string(),
        status: exit_status(1),
        stderr: String::new(),
    }
}

/// Scriptable `Docker` double — canned listings plus a call journal.
///
/// Any subcommand whose leading word appears in `fail_on` returns a
/// `CommandFailed`; everything else succeeds.
#[derive(Default)]
pub struct StubDocker {
    /// Stdout replayed by `list_images`.
    pub images: String,
    /// Stdout replayed by `list_containers`.
    pub containers: String,
    /// Leading words of subcommands that should fail (e.g. `"rmi"`).
    pub fail_on: Vec<&'static str>,
    /// Journal of issued subcommands, in order.
    pub calls: RefCell<Vec<String>>,
}

impl StubDocker {
    pub fn with_images(images: &str) -> Self {
        Self {
            images: images.to_string(),
            ..Self::default()
        }
    }

    pub fn with_containers(containers: &str) -> Self {
        Self {
            containers: containers.to_string(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<(), RuntimeError> {
        let op = call.split(' ').next().unwrap_or_default().to_string();
        self.calls.borrow_mut().push(call.clone());
        if self.fail_on.contains(&op.as_str()) {
            return Err(command_failed(&call));
        }
        Ok(())
    }
}

impl Docker for StubDocker {
    async fn list_images(&self, filter: &str) -> Result<String, RuntimeError> {
        self.record(format!("images {filter}"))?;
        Ok(self.images.clone())
    }

    async fn tag_image(&self, source: &str, target: &str) -> Result<(), RuntimeError> {
        self.record(format!("tag {source} {target}"))
    }

    async fn remove_image(&self, reference: &str, force: bool) -> Result<(), RuntimeError> {
        let flag = if force { " -f" } else { "" };
        self.record(format!("rmi{flag} {reference}"))
    }

    async fn prune_images(&self) -> Result<(), RuntimeError> {
        self.record("prune".to_string())
    }

    async fn list_containers(&self, name: &str) -> Result<String, RuntimeError> {
        self.record(format!("ps {name}"))?;
        Ok(self.containers.clone())
    }

    async fn stop_container(&self, name: &str) -> Result<(), RuntimeError> {
        self.record(format!("stop {name}"))
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), RuntimeError> {
        let flag = if force { " -f" } else { "" };
        self.record(format!("rm{flag} {name}"))
    }

    async fn build_image(
        &self,
        dockerfile: &Path,
        _context: &Path,
        debug: bool,
    ) -> Result<(), RuntimeError> {
        let flag = if debug { " debug" } else { "" };
        self.record(format!("build {}{flag}", dockerfile.display()))
    }

    async fn run_container(&self, params: &RunParams<'_>) -> Result<(), RuntimeError> {
        self.record(format!("run {}", run_args(params).join(" ")))
    }

    async fn server_version(&self) -> Result<String, RuntimeError> {
        self.record("version".to_string())?;
        Ok("27.0.3".to_string())
    }
}
