//! Configuration management for AskPDF services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Uploaded document storage configuration
    pub storage: StorageConfig,

    /// QA oracle (inference endpoint) configuration
    pub oracle: OracleConfig,

    /// Retrieval and synthesis knobs
    pub qa: QaConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory uploaded PDFs are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleConfig {
    /// Oracle provider: inference, mock
    #[serde(default = "default_oracle_provider")]
    pub provider: String,

    /// Inference endpoint URL
    #[serde(default = "default_oracle_url")]
    pub api_url: String,

    /// API key for the inference endpoint
    pub api_key: Option<String>,

    /// Model identifier (informational, the endpoint pins the model)
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

/// Knobs for chunking, parallel scoring, and answer synthesis.
///
/// Defaults mirror the tuned production values; every field can be
/// overridden per process via config files or APP__QA__* variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QaConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of top-scoring chunks kept for synthesis
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Bounded scoring pool size (also caps concurrent oracle calls)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Final answers scoring strictly below this are suppressed
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,

    /// Minimum combined-context length worth a final oracle call
    #[serde(default = "default_min_combined_context_len")]
    pub min_combined_context_len: usize,

    /// Answer length cap for per-chunk scoring
    #[serde(default = "default_per_chunk_max_answer_len")]
    pub per_chunk_max_answer_len: usize,

    /// Answer length cap for the combined-context pass
    #[serde(default = "default_combined_max_answer_len")]
    pub combined_max_answer_len: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 120 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_upload_dir() -> String { "./uploads".to_string() }
fn default_max_upload_bytes() -> usize { 25 * 1024 * 1024 }
fn default_oracle_provider() -> String { "inference".to_string() }
fn default_oracle_url() -> String {
    "https://api-inference.huggingface.co/models/deepset/roberta-base-squad2".to_string()
}
fn default_oracle_model() -> String { crate::DEFAULT_QA_MODEL.to_string() }
fn default_oracle_timeout() -> u64 { 30 }
fn default_chunk_size() -> usize { 500 }
fn default_chunk_overlap() -> usize { 100 }
fn default_top_k() -> usize { 3 }
fn default_worker_count() -> usize { 5 }
fn default_low_confidence_threshold() -> f64 { 0.1 }
fn default_min_combined_context_len() -> usize { 50 }
fn default_per_chunk_max_answer_len() -> usize { 100 }
fn default_combined_max_answer_len() -> usize { 150 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "askpdf".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl OracleConfig {
    /// Get per-call oracle timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            storage: StorageConfig::default(),
            oracle: OracleConfig::default(),
            qa: QaConfig::default(),
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_oracle_provider(),
            api_url: default_oracle_url(),
            api_key: None,
            model: default_oracle_model(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            worker_count: default_worker_count(),
            low_confidence_threshold: default_low_confidence_threshold(),
            min_combined_context_len: default_min_combined_context_len(),
            per_chunk_max_answer_len: default_per_chunk_max_answer_len(),
            combined_max_answer_len: default_combined_max_answer_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.qa.chunk_size, 500);
        assert_eq!(config.qa.chunk_overlap, 100);
        assert_eq!(config.qa.top_k, 3);
        assert_eq!(config.qa.worker_count, 5);
    }

    #[test]
    fn test_qa_thresholds() {
        let config = QaConfig::default();
        assert_eq!(config.low_confidence_threshold, 0.1);
        assert_eq!(config.min_combined_context_len, 50);
        assert!(config.per_chunk_max_answer_len < config.combined_max_answer_len);
    }
}
