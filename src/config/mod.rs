//! Configuration module for Feed-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the plain-text keyword lists that tag extraction runs.
//!
//! # Example
//!
//! ```no_run
//! use feed_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Stall episode length: {}", config.acquisition.max_stalls);
//! ```

mod keywords;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AcquisitionConfig, Config, MediaConfig, OutputConfig, SelectorConfig, TriggerKind,
};

// Re-export parser functions
pub use keywords::{load_keywords, parse_keywords};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
