//! Run orchestration — mount the sketch directory and launch a compile.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::compiler::container;
use crate::docker::{CONTAINER_NAME, Docker, IMAGE_NAME, RunParams, run_args};
use crate::domain::CompileError;
use crate::output::OutputContext;

/// In-container root under which the sketch directory is mounted.
const MOUNT_ROOT: &str = "/mapped";

/// Compile entrypoint baked into the image.
const COMPILE_SCRIPT: &str = "/js/compile.py";

/// A host directory bound into the container for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    /// Absolute host directory.
    pub host: PathBuf,
    /// Mount point inside the container, `/mapped/<basename>`.
    pub container: String,
}

impl VolumeBinding {
    /// Derive the binding for a sketch directory.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidDirectory` when the path does not
    /// name an existing directory.
    pub fn for_directory(directory: &Path) -> Result<Self, CompileError> {
        let host = std::path::absolute(directory)
            .map_err(|_| CompileError::InvalidDirectory(directory.to_path_buf()))?;
        if !host.is_dir() {
            return Err(CompileError::InvalidDirectory(host));
        }
        let basename = host
            .file_name()
            .ok_or_else(|| CompileError::InvalidDirectory(host.clone()))?
            .to_string_lossy()
            .into_owned();
        Ok(Self {
            container: format!("{MOUNT_ROOT}/{basename}"),
            host,
        })
    }

    /// Render the `-v` argument, `hostAbsPath:/mapped/<basename>`.
    #[must_use]
    pub fn to_arg(&self) -> String {
        format!("{}:{}", self.host.display(), self.container)
    }
}

/// What the container executes. Exactly one mode per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Image default entrypoint — release compile.
    Default,
    /// `/bin/bash` for poking at the toolchain by hand.
    InteractiveShell,
    /// Compile with optimization off and debug symbols kept.
    DebugCompile,
}

impl RunMode {
    /// Interactive wins over debug; everything else is the default compile.
    #[must_use]
    pub fn select(interactive: bool, debug: bool) -> Self {
        if interactive {
            Self::InteractiveShell
        } else if debug {
            Self::DebugCompile
        } else {
            Self::Default
        }
    }

    /// Command appended after the image; empty keeps the entrypoint.
    #[must_use]
    pub fn command(self) -> Vec<String> {
        match self {
            Self::Default => Vec::new(),
            Self::InteractiveShell => vec!["/bin/bash".to_string()],
            Self::DebugCompile => vec![
                "python".to_string(),
                COMPILE_SCRIPT.to_string(),
                "--debug".to_string(),
            ],
        }
    }
}

/// One container run.
pub struct RunRequest<'a> {
    /// Sketch directory to mount.
    pub directory: &'a Path,
    /// Open an interactive shell instead of compiling.
    pub interactive: bool,
    /// Compile with debug flags.
    pub debug: bool,
    /// Attach `-it` — only when the invoking process has a terminal.
    pub attach_tty: bool,
}

/// Launch the compile (or shell) container over the given directory.
///
/// The directory is validated before any runtime command is issued, and
/// the reserved container name is cleared so the daemon accepts the new
/// instance.
///
/// # Errors
///
/// Returns `CompileError::InvalidDirectory` for a missing directory and
/// `CompileError::RunFailed` when the container exits non-zero.
pub async fn run(
    docker: &impl Docker,
    ctx: &OutputContext,
    request: &RunRequest<'_>,
) -> Result<VolumeBinding> {
    let volume = VolumeBinding::for_directory(request.directory)?;

    container::remove_if_present(docker, CONTAINER_NAME)
        .await
        .context("clearing the compile container")?;

    let mode = RunMode::select(request.interactive, request.debug);
    let command = mode.command();
    let params = RunParams {
        image: IMAGE_NAME,
        name: CONTAINER_NAME,
        volume: &volume.to_arg(),
        tty: request.attach_tty,
        command: &command,
    };

    ctx.header("Running compiler container");
    ctx.kv("Command", &format!("docker {}", run_args(&params).join(" ")));

    docker
        .run_container(&params)
        .await
        .map_err(CompileError::RunFailed)?;
    Ok(volume)
}
