//! oncoscreen CLI - serve the screening form or screen one submission.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*};

use oncoscreen_cli::{log_filter, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter()?)
        .init();

    let cli = Cli::parse();

    info!("oncoscreen starting...");

    match cli.command {
        Commands::Serve(cmd) => cmd.run().await?,
        Commands::Predict(cmd) => cmd.run().await?,
    }

    Ok(())
}
