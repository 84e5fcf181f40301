//! Singleton compile container lifecycle.
//!
//! The daemon refuses to create a second container under a taken name, so
//! the reserved name is checked and cleared before every build and run
//! rather than assumed free. Two concurrent invocations of the tool can
//! still race between the check and the create; that window is accepted.

use anyhow::Result;

use crate::compiler::registry;
use crate::docker::{CONTAINER_NAME, Docker};
use crate::domain::RuntimeError;
use crate::output::OutputContext;

/// True iff a container with exactly `name` exists, running or stopped.
///
/// The daemon's `name=` filter matches substrings, so the listing is
/// compared line-by-line for an exact match.
///
/// # Errors
///
/// Returns an error if the container listing command fails.
pub async fn exists(docker: &impl Docker, name: &str) -> Result<bool, RuntimeError> {
    let listing = docker.list_containers(name).await?;
    Ok(listing.lines().any(|line| line.trim() == name))
}

/// Force-remove the named container if it exists; returns whether it did.
///
/// Must run before every rebuild and before a fresh run — the singleton
/// invariant is enforced, not assumed.
///
/// # Errors
///
/// Returns an error if the listing or removal command fails.
pub async fn remove_if_present(docker: &impl Docker, name: &str) -> Result<bool, RuntimeError> {
    if exists(docker, name).await? {
        docker.remove_container(name, true).await?;
        return Ok(true);
    }
    Ok(false)
}

/// Stop and remove the compile container, delete every tracked image
/// version, and prune dangling layers.
///
/// Destructive and irreversible; only ever run on explicit request. Each
/// step is best-effort — a failure is warned about and the clean moves on.
///
/// # Errors
///
/// Currently always returns `Ok`; the signature leaves room for a
/// non-best-effort step.
pub async fn clean(docker: &impl Docker, ctx: &OutputContext) -> Result<()> {
    match exists(docker, CONTAINER_NAME).await {
        Ok(true) => {
            ctx.info(&format!("Stopping and removing {CONTAINER_NAME}..."));
            if let Err(e) = docker.stop_container(CONTAINER_NAME).await {
                ctx.warn(&format!("could not stop container: {e}"));
            }
            if let Err(e) = docker.remove_container(CONTAINER_NAME, false).await {
                ctx.warn(&format!("could not remove container: {e}"));
            }
        }
        Ok(false) => ctx.info(&format!("No container found for {CONTAINER_NAME}.")),
        Err(e) => ctx.warn(&format!("could not query containers: {e}")),
    }

    ctx.info(&format!("Removing all {CONTAINER_NAME} images..."));
    let pb = ctx
        .show_progress()
        .then(|| crate::output::progress::spinner("removing compiler images..."));
    match registry::list_versions(docker).await {
        Ok(versions) => {
            for version in &versions {
                if let Err(e) = docker.remove_image(&version.reference(), true).await {
                    ctx.warn(&format!("could not remove {version}: {e}"));
                }
            }
        }
        Err(e) => ctx.warn(&format!("could not list images: {e}")),
    }
    if let Err(e) = docker.prune_images().await {
        ctx.warn(&format!("could not prune dangling images: {e}"));
    }
    if let Some(pb) = pb {
        crate::output::progress::finish_ok(&pb, "compiler images removed");
    }

    ctx.success("Clean finished.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::test_support::StubDocker;

    #[tokio::test]
    async fn exists_requires_an_exact_name_match() {
        let docker = StubDocker::with_containers("fastled-wasm-compiler-old\n");
        assert!(!exists(&docker, CONTAINER_NAME).await.expect("exists"));

        let docker = StubDocker::with_containers("fastled-wasm-compiler\n");
        assert!(exists(&docker, CONTAINER_NAME).await.expect("exists"));
    }

    #[tokio::test]
    async fn exists_false_on_empty_listing() {
        let docker = StubDocker::default();
        assert!(!exists(&docker, CONTAINER_NAME).await.expect("exists"));
    }

    #[tokio::test]
    async fn remove_if_present_clears_a_stale_container() {
        let docker = StubDocker::with_containers("fastled-wasm-compiler\n");
        let removed = remove_if_present(&docker, CONTAINER_NAME)
            .await
            .expect("remove");
        assert!(removed);
        assert_eq!(
            docker.calls(),
            vec!["ps fastled-wasm-compiler", "rm -f fastled-wasm-compiler"]
        );
    }

    #[tokio::test]
    async fn remove_if_present_then_exists_is_false() {
        let docker = StubDocker::with_containers("fastled-wasm-compiler\n");
        remove_if_present(&docker, CONTAINER_NAME)
            .await
            .expect("remove");
        // The double's listing is static, so drop it for the re-check the
        // way the daemon would after an rm -f.
        let docker = StubDocker::default();
        assert!(!exists(&docker, CONTAINER_NAME).await.expect("exists"));
    }

    #[tokio::test]
    async fn remove_if_present_issues_nothing_when_absent() {
        let docker = StubDocker::default();
        let removed = remove_if_present(&docker, CONTAINER_NAME)
            .await
            .expect("remove");
        assert!(!removed);
        assert_eq!(docker.calls(), vec!["ps fastled-wasm-compiler"]);
    }

    #[tokio::test]
    async fn clean_removes_container_images_and_dangling_layers() {
        let docker = StubDocker {
            containers: "fastled-wasm-compiler\n".to_string(),
            images: "fastled-wasm-compiler:latest\nfastled-wasm-compiler-1:latest\n".to_string(),
            ..StubDocker::default()
        };
        let ctx = OutputContext::new(true, true);
        clean(&docker, &ctx).await.expect("clean");
        assert_eq!(
            docker.calls(),
            vec![
                "ps fastled-wasm-compiler",
                "stop fastled-wasm-compiler",
                "rm fastled-wasm-compiler",
                "images fastled-wasm-compiler*",
                "rmi -f fastled-wasm-compiler:latest",
                "rmi -f fastled-wasm-compiler-1:latest",
                "prune",
            ]
        );
    }

    #[tokio::test]
    async fn clean_continues_past_failing_steps() {
        let docker = StubDocker {
            containers: "fastled-wasm-compiler\n".to_string(),
            images: "fastled-wasm-compiler:latest\n".to_string(),
            fail_on: vec!["stop", "rmi"],
            ..StubDocker::default()
        };
        let ctx = OutputContext::new(true, true);
        clean(&docker, &ctx).await.expect("clean is best-effort");
        // The failing stop and rmi did not prevent the prune.
        assert_eq!(docker.calls().last().map(String::as_str), Some("prune"));
    }
}
