//! Default command — build the compiler image if needed, then compile.

use std::path::PathBuf;

use anyhow::Result;

use crate::compiler::build::{self, BuildOptions};
use crate::compiler::run::{self, RunRequest};
use crate::docker::Docker;
use crate::output::OutputContext;
use crate::preview;

/// Subdirectory the in-container compiler writes its output to.
const OUTPUT_SUBDIR: &str = "fastled_js";

/// Resolved inputs for one compile invocation.
pub struct CompileArgs {
    /// Sketch directory to compile.
    pub directory: PathBuf,
    /// Dockerfile the compiler image is built from.
    pub dockerfile: PathBuf,
    /// Rebuild the image even when one exists.
    pub build: bool,
    /// Open an interactive shell instead of compiling.
    pub interactive: bool,
    /// Serve the compiled output afterwards.
    pub open: bool,
    /// Build and compile with debug flags.
    pub debug: bool,
    /// Image versions retained after a build.
    pub keep_images: usize,
}

/// Run the compile workflow: build-if-needed, then the container run,
/// then the optional preview server.
///
/// # Errors
///
/// Returns an error if the build or the container run fails.
pub async fn run(docker: &impl Docker, ctx: &OutputContext, args: &CompileArgs) -> Result<()> {
    build::ensure_built(
        docker,
        ctx,
        &BuildOptions {
            dockerfile: &args.dockerfile,
            context: std::path::Path::new("."),
            force: args.build,
            debug: args.debug,
            keep_images: args.keep_images,
        },
    )
    .await?;

    run::run(
        docker,
        ctx,
        &RunRequest {
            directory: &args.directory,
            interactive: args.interactive,
            debug: args.debug,
            attach_tty: ctx.is_tty,
        },
    )
    .await?;

    let output_dir = args.directory.join(OUTPUT_SUBDIR);
    if !args.interactive {
        ctx.success(&format!("Output written to {}", output_dir.display()));
    }

    if args.open {
        preview::serve(ctx, &output_dir).await?;
    }
    Ok(())
}
