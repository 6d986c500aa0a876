//! AskPDF Common Library
//!
//! Shared code for the AskPDF services including:
//! - Error types and handling
//! - Configuration management
//! - Answer-oracle client abstraction
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod oracle;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use oracle::{AnswerOracle, OracleAnswer, ScoreOptions};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default extractive QA model served by the inference endpoint
pub const DEFAULT_QA_MODEL: &str = "deepset/roberta-base-squad2";
