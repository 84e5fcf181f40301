//! fastled-wasm — compile FastLED sketches to WebAssembly in Docker.

use clap::Parser;

use fastled_wasm_cli::cli::Cli;
use fastled_wasm_cli::output::OutputContext;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let ctx = OutputContext::new(cli.no_color, cli.quiet);

    // A half-completed build or run is left as-is on interrupt; the next
    // invocation's existence checks self-heal the daemon state.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nOperation cancelled by user.");
            std::process::exit(0);
        }
    });

    if let Err(e) = cli.run(&ctx).await {
        ctx.error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
