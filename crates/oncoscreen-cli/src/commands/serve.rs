//! Serve Command Implementation
//!
//! Hosts the screening form over HTTP until Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;
use oncoscreen_serving::{Server, ServerConfig};
use std::path::PathBuf;
use tracing::{error, info};

/// Serve the screening form over HTTP
///
/// Settings are taken from `--config` (JSON) when given, otherwise from the
/// defaults; any flag passed explicitly overrides both.
///
/// # Example
///
/// ```bash
/// oncoscreen serve \
///     --artifacts-dir ./artifacts \
///     --host 127.0.0.1 \
///     --port 8501
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct ServeCommand {
    /// Directory containing scaler.json, model_spec.json and dense/params.json
    #[arg(long, short = 'd', env = "ONCOSCREEN_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p', env = "ONCOSCREEN_PORT")]
    pub port: Option<u16>,

    /// JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,
}

impl ServeCommand {
    /// Execute the serve command
    pub async fn run(&self) -> Result<()> {
        let config = self.resolve_config()?;
        info!("Artifacts directory: {:?}", config.artifacts_dir);
        info!("Listening on {}", config.socket_addr());

        let server = Server::new(config).context("Failed to start server")?;
        server
            .serve(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Received shutdown signal, stopping server...");
            })
            .await
            .context("Server error")?;
        Ok(())
    }

    /// Merge the config file (if any) with explicit flags.
    pub fn resolve_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_json_file(path)
                .with_context(|| format!("Failed to read config {:?}", path))?,
            None => ServerConfig::default(),
        };
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts_dir = dir.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(limit) = self.max_body_bytes {
            config.max_body_bytes = limit;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_defaults() {
        let config = ServeCommand::default().resolve_config().unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oncoscreen.json");
        std::fs::write(&path, r#"{"host": "10.0.0.1", "port": 9000}"#).unwrap();

        let cmd = ServeCommand {
            port: Some(9100),
            artifacts_dir: Some(PathBuf::from("/srv/artifacts")),
            config: Some(path),
            ..Default::default()
        };
        let config = cmd.resolve_config().unwrap();
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 9100);
        assert_eq!(config.artifacts_dir, PathBuf::from("/srv/artifacts"));
    }

    #[test]
    fn test_missing_config_file() {
        let cmd = ServeCommand {
            config: Some(PathBuf::from("/nonexistent/oncoscreen.json")),
            ..Default::default()
        };
        assert!(cmd.resolve_config().is_err());
    }
}
