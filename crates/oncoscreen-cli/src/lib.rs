//! oncoscreen CLI Library
//!
//! This crate provides the command-line interface for oncoscreen:
//!
//! - **Serve**: host the screening form over HTTP
//! - **Predict**: screen one comma-separated submission and print the verdict
//!
//! # Example
//!
//! ```bash
//! # Serve the form
//! oncoscreen serve --artifacts-dir ./artifacts --port 8501
//!
//! # Screen one submission
//! oncoscreen predict --artifacts-dir ./artifacts "11.76,21.6,74.72,..."
//! ```

pub mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use commands::{PredictCommand, ServeCommand};

/// oncoscreen - breast tumor screening from 30 cell-nucleus measurements
#[derive(Parser, Debug)]
#[command(name = "oncoscreen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the screening form over HTTP
    Serve(ServeCommand),

    /// Screen one comma-separated submission
    Predict(PredictCommand),
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;

/// Log filter: `RUST_LOG` plus `info` for oncoscreen and HTTP request traces.
pub fn log_filter() -> CliResult<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("oncoscreen=info".parse()?)
        .add_directive("tower_http=info".parse()?))
}
