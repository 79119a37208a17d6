//! Page probe trait and error types
//!
//! A probe is the only way the acquisition loop touches the page. Live
//! browser sessions and scripted test doubles both sit behind it.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors a page probe can report
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The call failed but the page is still usable
    #[error("Transient probe failure: {0}")]
    Transient(String),

    /// The page session is gone; nothing further can be read from it
    #[error("Page session lost: {0}")]
    SessionLost(String),
}

impl ProbeError {
    /// Whether the acquisition run must stop on this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::SessionLost(_))
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Trait for anything that can observe and drive a rendered page
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Current total scroll height of the document, in pixels
    async fn scroll_height(&self) -> ProbeResult<u64>;

    /// Number of elements matching a CSS selector
    async fn count_matching_elements(&self, selector: &str) -> ProbeResult<usize>;

    /// Runs a script in the page and returns its value
    async fn execute_script(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Whether at least one element matches a CSS selector
    async fn is_element_present(&self, selector: &str) -> ProbeResult<bool>;

    /// Clicks the first element matching a CSS selector
    async fn click(&self, selector: &str) -> ProbeResult<()>;

    /// Serialized markup of the whole page
    async fn capture_markup(&self) -> ProbeResult<String>;
}

#[async_trait]
impl<T: PageProbe + ?Sized> PageProbe for Arc<T> {
    async fn scroll_height(&self) -> ProbeResult<u64> {
        (**self).scroll_height().await
    }

    async fn count_matching_elements(&self, selector: &str) -> ProbeResult<usize> {
        (**self).count_matching_elements(selector).await
    }

    async fn execute_script(&self, script: &str) -> ProbeResult<serde_json::Value> {
        (**self).execute_script(script).await
    }

    async fn is_element_present(&self, selector: &str) -> ProbeResult<bool> {
        (**self).is_element_present(selector).await
    }

    async fn click(&self, selector: &str) -> ProbeResult<()> {
        (**self).click(selector).await
    }

    async fn capture_markup(&self) -> ProbeResult<String> {
        (**self).capture_markup().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_loss_is_fatal() {
        assert!(ProbeError::SessionLost("window closed".into()).is_fatal());
        assert!(!ProbeError::Transient("script timeout".into()).is_fatal());
    }
}
