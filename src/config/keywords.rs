//! Keyword lists: one keyword per line, `#` starts a comment line.

use crate::ConfigError;
use std::path::Path;

/// Loads keywords from a text file
///
/// Blank lines and lines starting with `#` are skipped; surrounding whitespace
/// is trimmed.
pub fn load_keywords(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let keywords = parse_keywords(&content);
    tracing::info!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}

/// Parses keywords from already loaded text
pub fn parse_keywords(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
