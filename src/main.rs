// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap (usage errors exit early)
// 2. Set up logging to stderr
// 3. Start the renderer (browser or plain HTTP)
// 4. Run the crawl, printing links to stdout as they are found
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;
mod crawl;
mod logging;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{Crawler, Emitter};
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse before anything else so --help/--version/usage errors are
    // handled by clap (usage errors exit with status 2)
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli.render_options();
    let renderer = render::initialize(cli.renderer, &options)
        .await
        .context("Could not start the renderer")?;

    let emitter = Emitter::new(std::io::stdout(), cli.output_format());
    Crawler::new(cli.crawl_config(), renderer, emitter)
        .run()
        .await?;

    Ok(())
}
