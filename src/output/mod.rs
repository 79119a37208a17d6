//! Output module for persisting harvest results
//!
//! This module handles:
//! - Naming result files safely from keywords
//! - Writing the captured HTML alongside JSON and CSV renderings of the records

mod csv;
mod files;

pub use csv::format_csv;
pub use files::{safe_filename, sanitize_keyword, write_json, write_outputs, WrittenFiles};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
