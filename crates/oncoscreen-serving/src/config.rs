//! Server configuration for oncoscreen.
//!
//! Configuration can be built in code with [`ServerConfig::builder`] or read
//! from a JSON file with [`ServerConfig::from_json_file`]; the CLI applies its
//! flags on top of whichever it starts from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the HTTP form server.
///
/// # Example
///
/// ```
/// use oncoscreen_serving::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .host("127.0.0.1")
///     .port(8501)
///     .artifacts_dir("./artifacts")
///     .build();
/// assert_eq!(config.socket_addr(), "127.0.0.1:8501");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to (default: "0.0.0.0")
    pub host: String,

    /// Port to listen on (default: 8501)
    pub port: u16,

    /// Directory holding the scaler, model and image
    pub artifacts_dir: PathBuf,

    /// File names inside `artifacts_dir`
    pub artifacts: ArtifactConfig,

    /// Maximum accepted request body in bytes (default: 64KB)
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            artifacts_dir: PathBuf::from("./artifacts"),
            artifacts: ArtifactConfig::default(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{:?}: {}", path, e)))?;
        serde_json::from_str(&json)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{:?}: {}", path, e)))
    }

    /// Get the socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }
        if !self.artifacts_dir.is_dir() {
            return Err(ConfigError::ArtifactsDirNotFound(self.artifacts_dir.clone()));
        }
        Ok(())
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    artifacts_dir: Option<PathBuf>,
    artifacts: Option<ArtifactConfig>,
    max_body_bytes: Option<usize>,
}

impl ServerConfigBuilder {
    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port number.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the artifact directory.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the artifact file names.
    pub fn artifacts(mut self, config: ArtifactConfig) -> Self {
        self.artifacts = Some(config);
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_bytes(mut self, size: usize) -> Self {
        self.max_body_bytes = Some(size);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerConfig {
        let default = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(default.host),
            port: self.port.unwrap_or(default.port),
            artifacts_dir: self.artifacts_dir.unwrap_or(default.artifacts_dir),
            artifacts: self.artifacts.unwrap_or(default.artifacts),
            max_body_bytes: self.max_body_bytes.unwrap_or(default.max_body_bytes),
        }
    }
}

/// File names of the artifacts, relative to the artifact directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Scaler parameters
    pub scaler_file: PathBuf,

    /// Classifier layer layout
    pub model_spec_file: PathBuf,

    /// Classifier weights
    pub params_file: PathBuf,

    /// Image shown at the top of the page
    pub image_file: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            scaler_file: PathBuf::from("scaler.json"),
            model_spec_file: PathBuf::from("model_spec.json"),
            params_file: PathBuf::from("dense").join("params.json"),
            image_file: PathBuf::from("cancer_image.png"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid port number
    #[error("Invalid port number: port cannot be 0")]
    InvalidPort,

    /// Invalid body limit
    #[error("Invalid body limit: must be greater than 0")]
    InvalidBodyLimit,

    /// Artifact directory not found
    #[error("Artifact directory not found: {0}")]
    ArtifactsDirNotFound(PathBuf),

    /// Invalid configuration file
    #[error("Invalid configuration file: {0}")]
    InvalidConfigFile(String),
}
