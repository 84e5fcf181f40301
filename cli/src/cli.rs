//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::commands;
use crate::compiler::evict::KEEP_IMAGES;
use crate::config::FastledConfig;
use crate::docker::DockerCli;
use crate::output::OutputContext;

/// Compile a FastLED sketch to WebAssembly in a Docker container
#[derive(Parser)]
#[command(name = "fastled-wasm", version)]
pub struct Cli {
    /// Sketch directory to mount into the compiler container
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Rebuild the compiler image before running
    #[arg(short, long)]
    pub build: bool,

    /// Remove the compile container and all compiler images, then exit
    #[arg(short, long)]
    pub clean: bool,

    /// Open an interactive shell in the container instead of compiling
    #[arg(short, long)]
    pub interactive: bool,

    /// Serve the compiled output with live-server after compiling
    #[arg(short, long)]
    pub open: bool,

    /// Compile with debug flags: optimization off, debug symbols kept
    #[arg(long)]
    pub debug: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestration fails; `--clean` is
    /// best-effort and only fails on setup problems.
    pub async fn run(self, ctx: &OutputContext) -> Result<()> {
        let docker = DockerCli;

        // --clean short-circuits everything else.
        if self.clean {
            return commands::clean::run(&docker, ctx).await;
        }

        let config = FastledConfig::load()?;
        let args = commands::compile::CompileArgs {
            directory: config.resolve_directory(self.directory),
            dockerfile: config.resolve_dockerfile(),
            build: self.build,
            interactive: self.interactive,
            open: self.open,
            debug: self.debug,
            keep_images: config.keep_images.unwrap_or(KEEP_IMAGES),
        };
        commands::compile::run(&docker, ctx, &args).await
    }
}
