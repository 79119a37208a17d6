use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use feed_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Item selector: {}", config.selectors.item_container);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// ```
/// use feed_harvest::config::parse_config;
///
/// let config = parse_config("[acquisition]\nmax-stalls = 5\n").unwrap();
/// assert_eq!(config.acquisition.max_stalls, 5);
/// assert_eq!(config.output.directory, "scraped_data");
/// ```
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so extracted data can be traced back to the selector set
/// that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[acquisition]
max-stalls = 4
scroll-wait-ms = 1500
max-wait-ms = 6000
trigger-strategies = ["load-more-control", "synthetic-events"]

[selectors]
item-container = "article.ad"
library-id = "span.lib"

[media]
base-url = "https://cdn.example.com/"

[output]
directory = "./out"
file-prefix = "ads"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.acquisition.max_stalls, 4);
        assert_eq!(config.acquisition.scroll_wait_ms, 1500);
        assert_eq!(
            config.acquisition.trigger_strategies,
            vec![TriggerKind::LoadMoreControl, TriggerKind::SyntheticEvents]
        );
        assert_eq!(config.selectors.item_container, "article.ad");
        // Unspecified selectors keep their defaults
        assert_eq!(config.selectors.media_container, "div._7jyg");
        assert_eq!(
            config.media.base_url.as_deref(),
            Some("https://cdn.example.com/")
        );
        assert_eq!(config.output.file_prefix, "ads");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.acquisition.max_stalls, 3);
        assert_eq!(config.acquisition.success_window, 10);
        assert_eq!(config.acquisition.trigger_strategies.len(), 4);
        assert!(config
            .media
            .video_extensions
            .contains(&".mp4".to_string()));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_trigger_strategy_is_rejected() {
        let result = parse_config("[acquisition]\ntrigger-strategies = [\"pray\"]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[acquisition]
max-stalls = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("[output]\ndirectory = \"a\"\n");
        let file2 = create_temp_config("[output]\ndirectory = \"b\"\n");

        let (_, hash1) = load_config_with_hash(file1.path()).unwrap();
        let (_, hash2) = load_config_with_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
