//! Feed-Harvest: record extraction from lazily loading web feeds
//!
//! This crate drives an endlessly scrolling feed through an injected page
//! probe until the caller cancels, then turns the captured markup into
//! fixed-shape ad records with normalized media links and timing fields.

pub mod acquisition;
pub mod config;
pub mod extract;
pub mod output;

use thiserror::Error;

pub use acquisition::ProbeError;
pub use output::OutputError;

/// Main error type for Feed-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Feed-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use acquisition::{ContentAcquisitionController, PageProbe, Snapshot};
pub use config::Config;
pub use extract::{AdRecord, MediaBundle, MediaKind, MediaResolver, RecordExtractor};
