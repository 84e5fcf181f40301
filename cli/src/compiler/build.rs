//! Build orchestration — decide whether a build is needed and run it.

use std::path::Path;

use anyhow::Result;

use crate::compiler::{container, evict, registry, rotate};
use crate::docker::{CONTAINER_NAME, Docker};
use crate::domain::CompileError;
use crate::output::OutputContext;

/// Oldest daemon known to handle the platform-pinned BuildKit flow.
const DOCKER_MIN_VERSION: semver::Version = semver::Version::new(20, 10, 0);

/// Inputs for one build cycle.
pub struct BuildOptions<'a> {
    /// Build definition the image is created from.
    pub dockerfile: &'a Path,
    /// Build context directory.
    pub context: &'a Path,
    /// Rebuild even when an image already exists.
    pub force: bool,
    /// Pass `DEBUG=1` to the build: no optimization, debug symbols kept.
    pub debug: bool,
    /// Image versions retained after rotation.
    pub keep_images: usize,
}

/// Build the compiler image if forced or missing; returns whether a build
/// ran.
///
/// A successful build is followed by rotation of the displaced versions,
/// eviction of the oldest past the retention limit, and a prune of
/// dangling layers.
///
/// # Errors
///
/// Returns `CompileError::BuildFailed` when the build itself fails, and
/// the underlying runtime error for any of the surrounding steps.
pub async fn ensure_built(
    docker: &impl Docker,
    ctx: &OutputContext,
    opts: &BuildOptions<'_>,
) -> Result<bool> {
    if !opts.force && !registry::list_versions(docker).await?.is_empty() {
        return Ok(false);
    }

    check_prerequisites(docker).await?;
    anyhow::ensure!(
        opts.dockerfile.is_file(),
        "build file not found at {}",
        opts.dockerfile.display()
    );

    // The next run reuses the reserved name; clear it before building so a
    // stale container never blocks the fresh one.
    if container::remove_if_present(docker, CONTAINER_NAME).await? {
        ctx.info(&format!("Removed existing container: {CONTAINER_NAME}"));
    }

    ctx.header("Building compiler image");
    ctx.kv(
        "Build file",
        &opts.dockerfile.display().to_string(),
    );
    docker
        .build_image(opts.dockerfile, opts.context, opts.debug)
        .await
        .map_err(CompileError::BuildFailed)?;

    let versions = registry::list_versions(docker).await?;
    rotate::rotate(docker, &versions).await?;

    // Rotation renames references, so re-query before deciding eviction.
    let versions = registry::list_versions(docker).await?;
    if let Some(oldest) = evict::evict(docker, &versions, opts.keep_images).await? {
        ctx.info(&format!("Removed oldest image: {oldest}"));
    }

    docker.prune_images().await?;
    ctx.success("Compiler image built.");
    Ok(true)
}

/// Fail early with a friendly message when the daemon is unreachable or
/// too old for the build flow.
async fn check_prerequisites(docker: &impl Docker) -> Result<()> {
    let version = docker
        .server_version()
        .await
        .map_err(|e| anyhow::Error::from(e).context("Docker daemon not reachable. Is Docker running?"))?;
    if let Ok(v) = semver::Version::parse(version.trim())
        && v < DOCKER_MIN_VERSION
    {
        anyhow::bail!("Docker {v} is too old; {DOCKER_MIN_VERSION} or newer is required.");
    }
    Ok(())
}
