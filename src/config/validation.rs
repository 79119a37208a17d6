use crate::config::types::{AcquisitionConfig, Config, MediaConfig, OutputConfig, SelectorConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_acquisition_config(&config.acquisition)?;
    validate_selector_config(&config.selectors)?;
    validate_media_config(&config.media)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates acquisition timing and escalation settings
fn validate_acquisition_config(config: &AcquisitionConfig) -> Result<(), ConfigError> {
    if config.max_stalls < 1 {
        return Err(ConfigError::Validation(format!(
            "max_stalls must be >= 1, got {}",
            config.max_stalls
        )));
    }

    if config.scroll_wait_ms > config.max_wait_ms {
        return Err(ConfigError::Validation(format!(
            "scroll_wait_ms ({}ms) must not exceed max_wait_ms ({}ms)",
            config.scroll_wait_ms, config.max_wait_ms
        )));
    }

    if config.success_window < 1 {
        return Err(ConfigError::Validation(
            "success_window must be >= 1".to_string(),
        ));
    }

    for (name, value) in [
        ("performance_threshold", config.performance_threshold),
        (
            "high_performance_threshold",
            config.high_performance_threshold,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 0 and 1, got {}",
                name, value
            )));
        }
    }

    if config.performance_threshold > config.high_performance_threshold {
        return Err(ConfigError::Validation(format!(
            "performance_threshold ({}) must not exceed high_performance_threshold ({})",
            config.performance_threshold, config.high_performance_threshold
        )));
    }

    validate_css_selector("loading-indicator-selector", &config.loading_indicator_selector)?;
    for selector in &config.load_more_selectors {
        validate_css_selector("load-more-selectors", selector)?;
    }

    Ok(())
}

/// Validates that every field selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (key, selector) in config.entries() {
        validate_css_selector(key, selector)?;
    }
    Ok(())
}

fn validate_css_selector(key: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            key
        )));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} = '{}': {:?}", key, selector, e))
    })?;

    Ok(())
}

/// Validates media extension sets and the optional base URL
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    for (name, extensions) in [
        ("image_extensions", &config.image_extensions),
        ("video_extensions", &config.video_extensions),
        ("audio_extensions", &config.audio_extensions),
    ] {
        if extensions.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }

        for ext in extensions {
            let valid = ext.len() > 1
                && ext.starts_with('.')
                && ext[1..].chars().all(|c| c.is_ascii_alphanumeric());
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "{} entry '{}' must look like '.ext'",
                    name, ext
                )));
            }
        }
    }

    if let Some(base) = &config.base_url {
        let url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "base_url '{}' cannot be used as a base",
                base
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
