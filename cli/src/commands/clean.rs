//! `fastled-wasm --clean` — remove the compile container and all images.

use anyhow::Result;

use crate::compiler::container;
use crate::docker::Docker;
use crate::output::OutputContext;

/// Run the clean. Destructive; short-circuits every other flag.
///
/// # Errors
///
/// Returns an error only if a non-best-effort step is added; every
/// current step logs and continues.
pub async fn run(docker: &impl Docker, ctx: &OutputContext) -> Result<()> {
    container::clean(docker, ctx).await
}
