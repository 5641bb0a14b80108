//! ignitekv CLI - scaffold and deploy a JSON server on Cloudflare Workers KV
//!
//! This is the main entry point for the ignitekv command-line interface.

mod cli;
mod output;
mod prompts;
mod run;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Every fatal error surfaces exactly once, then exit 1.
    if let Err(err) = run::run(cli).await {
        output::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Spinners carry the progress story; logs stay quiet unless asked.
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
