//! Docker CLI abstraction — enables test doubles for all `docker` commands.
//!
//! Every other module talks to the daemon through the [`Docker`] trait;
//! nothing else in the crate spawns processes against the runtime. The
//! production implementation shells out to the `docker` binary via
//! [`tokio::process::Command`], one blocking call at a time.

use std::path::Path;
use std::process::Stdio;

use crate::domain::RuntimeError;

/// Canonical repository name of the compiler image.
pub const IMAGE_NAME: &str = "fastled-wasm-compiler";

/// Reserved name of the singleton compile container.
pub const CONTAINER_NAME: &str = "fastled-wasm-compiler";

/// The emscripten toolchain baked into the image is amd64-only.
pub const PLATFORM: &str = "linux/amd64";

/// Parameters for `docker run`. Struct-based to avoid breaking
/// test doubles on future parameter additions.
pub struct RunParams<'a> {
    /// Image reference to run.
    pub image: &'a str,
    /// Container name (`--name`).
    pub name: &'a str,
    /// Volume bind argument, `hostAbsPath:/mapped/<basename>`.
    pub volume: &'a str,
    /// Attach an interactive terminal (`-it`).
    pub tty: bool,
    /// Command appended after the image; empty keeps the default entrypoint.
    pub command: &'a [String],
}

/// Build the full `docker run` argument vector for the given parameters.
#[must_use]
pub fn run_args(params: &RunParams<'_>) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        params.name.to_string(),
        "--platform".to_string(),
        PLATFORM.to_string(),
    ];
    if params.tty {
        args.push("-it".to_string());
    }
    args.push("-v".to_string());
    args.push(params.volume.to_string());
    args.push(params.image.to_string());
    args.extend(params.command.iter().cloned());
    args
}

/// Build the full `docker build` argument vector.
#[must_use]
pub fn build_args(dockerfile: &Path, context: &Path, debug: bool) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "--platform".to_string(),
        PLATFORM.to_string(),
        "-t".to_string(),
        IMAGE_NAME.to_string(),
    ];
    if debug {
        args.push("--build-arg".to_string());
        args.push("DEBUG=1".to_string());
    }
    args.push("-f".to_string());
    args.push(dockerfile.display().to_string());
    args.push(context.display().to_string());
    args
}

/// Abstraction over the docker CLI, enabling test doubles.
///
/// Methods either capture output (queries) or inherit stdio (build/run,
/// where streaming matters). A non-zero exit from any command surfaces as
/// [`RuntimeError::CommandFailed`] carrying the subcommand and status.
#[allow(async_fn_in_trait)]
pub trait Docker {
    /// Run `docker images --format {{.Repository}}:{{.Tag}} --filter reference=<filter>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn list_images(&self, filter: &str) -> Result<String, RuntimeError>;

    /// Run `docker tag <source> <target>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn tag_image(&self, source: &str, target: &str) -> Result<(), RuntimeError>;

    /// Run `docker rmi [-f] <reference>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn remove_image(&self, reference: &str, force: bool) -> Result<(), RuntimeError>;

    /// Run `docker image prune -f` (dangling layers only).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn prune_images(&self) -> Result<(), RuntimeError>;

    /// Run `docker ps -a --filter name=<name> --format {{.Names}}`.
    ///
    /// Includes stopped containers; the filter is a substring match on the
    /// daemon side, so callers must still compare names exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn list_containers(&self, name: &str) -> Result<String, RuntimeError>;

    /// Run `docker stop <name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn stop_container(&self, name: &str) -> Result<(), RuntimeError>;

    /// Run `docker rm [-f] <name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn remove_container(&self, name: &str, force: bool) -> Result<(), RuntimeError>;

    /// Run `docker build` with inherited stdio so build output streams.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn build_image(
        &self,
        dockerfile: &Path,
        context: &Path,
        debug: bool,
    ) -> Result<(), RuntimeError>;

    /// Run `docker run` with inherited stdio (interactive pass-through).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    async fn run_container(&self, params: &RunParams<'_>) -> Result<(), RuntimeError>;

    /// Run `docker version --format {{.Server.Version}}` and return the
    /// trimmed version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable (i.e. docker missing
    /// or not running).
    async fn server_version(&self) -> Result<String, RuntimeError>;
}

/// Production implementation — shells out to the `docker` binary.
pub struct DockerCli;

impl DockerCli {
    /// Spawn docker with captured output and check the exit status.
    async fn capture(args: &[&str]) -> Result<std::process::Output, RuntimeError> {
        let output = tokio::process::Command::new("docker")
            .args(args)
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command: args.join(" "),
                source,
            })?;
        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                command: args.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }

    /// Spawn docker with inherited stdio and check the exit status.
    async fn stream(args: &[String]) -> Result<(), RuntimeError> {
        let status = tokio::process::Command::new("docker")
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command: args.join(" "),
                source,
            })?;
        if !status.success() {
            return Err(RuntimeError::CommandFailed {
                command: args.join(" "),
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

impl Docker for DockerCli {
    async fn list_images(&self, filter: &str) -> Result<String, RuntimeError> {
        let output = Self::capture(&[
            "images",
            "--format",
            "{{.Repository}}:{{.Tag}}",
            "--filter",
            &format!("reference={filter}"),
        ])
        .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn tag_image(&self, source: &str, target: &str) -> Result<(), RuntimeError> {
        Self::capture(&["tag", source, target]).await.map(|_| ())
    }

    async fn remove_image(&self, reference: &str, force: bool) -> Result<(), RuntimeError> {
        let mut args = vec!["rmi"];
        if force {
            args.push("-f");
        }
        args.push(reference);
        Self::capture(&args).await.map(|_| ())
    }

    async fn prune_images(&self) -> Result<(), RuntimeError> {
        Self::capture(&["image", "prune", "-f"]).await.map(|_| ())
    }

    async fn list_containers(&self, name: &str) -> Result<String, RuntimeError> {
        let output = Self::capture(&[
            "ps",
            "-a",
            "--filter",
            &format!("name={name}"),
            "--format",
            "{{.Names}}",
        ])
        .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn stop_container(&self, name: &str) -> Result<(), RuntimeError> {
        Self::capture(&["stop", name]).await.map(|_| ())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), RuntimeError> {
        let mut args = vec!["rm"];
        if force {
            args.push("-f");
        }
        args.push(name);
        Self::capture(&args).await.map(|_| ())
    }

    async fn build_image(
        &self,
        dockerfile: &Path,
        context: &Path,
        debug: bool,
    ) -> Result<(), RuntimeError> {
        Self::stream(&build_args(dockerfile, context, debug)).await
    }

    async fn run_container(&self, params: &RunParams<'_>) -> Result<(), RuntimeError> {
        Self::stream(&run_args(params)).await
    }

    async fn server_version(&self) -> Result<String, RuntimeError> {
        let output = Self::capture(&["version", "--format", "{{.Server.Version}}"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
