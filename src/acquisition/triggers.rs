//! Escalation strategies run when a scroll cycle produced no growth
//!
//! Each strategy is one attempt to coax the feed into loading more. They
//! are independent: a failing strategy is reported and the next one still
//! runs.

use async_trait::async_trait;
use std::time::Duration;

use crate::acquisition::probe::{PageProbe, ProbeResult};
use crate::config::{AcquisitionConfig, TriggerKind};

/// Scrolls to the very bottom of the document
pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Returns the current vertical scroll offset
pub const SCROLL_POSITION_SCRIPT: &str = "return window.pageYOffset;";

/// Moves the viewport up a little
pub const SCROLL_BACK_SCRIPT: &str = "window.scrollBy(0, -500);";

/// Fires scroll, resize and mouse-move events at the page
pub const SYNTHETIC_EVENTS_SCRIPT: &str = r#"
window.dispatchEvent(new Event('scroll'));
window.dispatchEvent(new Event('resize'));
document.dispatchEvent(new MouseEvent('mousemove', {
    view: window,
    bubbles: true,
    cancelable: true,
    clientX: window.innerWidth / 2,
    clientY: window.innerHeight / 2
}));
"#;

/// One way of triggering more content to load
#[async_trait]
pub trait LoadTrigger: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Performs the attempt
    async fn trigger(&self, probe: &dyn PageProbe) -> ProbeResult<()>;
}

/// Waits longer while the feed's loading indicator is visible
#[derive(Debug, Clone)]
pub struct LoadingIndicatorWait {
    pub selector: String,
    pub wait: Duration,
}

#[async_trait]
impl LoadTrigger for LoadingIndicatorWait {
    fn name(&self) -> &'static str {
        "loading-indicator"
    }

    async fn trigger(&self, probe: &dyn PageProbe) -> ProbeResult<()> {
        if probe.is_element_present(&self.selector).await? {
            tracing::info!("Loading indicator visible, waiting {:?}", self.wait);
            tokio::time::sleep(self.wait).await;
        }
        Ok(())
    }
}

/// Clicks the first visible "load more" style control
#[derive(Debug, Clone)]
pub struct LoadMoreControl {
    pub selectors: Vec<String>,
    pub wait: Duration,
}

#[async_trait]
impl LoadTrigger for LoadMoreControl {
    fn name(&self) -> &'static str {
        "load-more-control"
    }

    async fn trigger(&self, probe: &dyn PageProbe) -> ProbeResult<()> {
        for selector in &self.selectors {
            if probe.is_element_present(selector).await? {
                tracing::info!("Activating load-more control: {}", selector);
                probe.click(selector).await?;
                tokio::time::sleep(self.wait).await;
                return Ok(());
            }
        }

        tracing::debug!("No load-more control present");
        Ok(())
    }
}

/// Scrolls up a little and back to the bottom
#[derive(Debug, Clone)]
pub struct ScrollJiggle {
    pub settle: Duration,
}

#[async_trait]
impl LoadTrigger for ScrollJiggle {
    fn name(&self) -> &'static str {
        "scroll-jiggle"
    }

    async fn trigger(&self, probe: &dyn PageProbe) -> ProbeResult<()> {
        probe.execute_script(SCROLL_BACK_SCRIPT).await?;
        tokio::time::sleep(self.settle).await;
        probe.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
        Ok(())
    }
}

/// Dispatches synthetic scroll/resize/mouse-move events
#[derive(Debug, Clone, Default)]
pub struct SyntheticEvents;

#[async_trait]
impl LoadTrigger for SyntheticEvents {
    fn name(&self) -> &'static str {
        "synthetic-events"
    }

    async fn trigger(&self, probe: &dyn PageProbe) -> ProbeResult<()> {
        probe.execute_script(SYNTHETIC_EVENTS_SCRIPT).await?;
        Ok(())
    }
}

/// Builds the configured strategies, in configured order
pub fn build_triggers(config: &AcquisitionConfig) -> Vec<Box<dyn LoadTrigger>> {
    config
        .trigger_strategies
        .iter()
        .map(|kind| -> Box<dyn LoadTrigger> {
            match kind {
                TriggerKind::LoadingIndicator => Box::new(LoadingIndicatorWait {
                    selector: config.loading_indicator_selector.clone(),
                    wait: Duration::from_millis(config.load_wait_ms),
                }),
                TriggerKind::LoadMoreControl => Box::new(LoadMoreControl {
                    selectors: config.load_more_selectors.clone(),
                    wait: Duration::from_millis(config.load_more_wait_ms),
                }),
                TriggerKind::ScrollJiggle => Box::new(ScrollJiggle {
                    settle: Duration::from_millis(config.settle_delay_ms),
                }),
                TriggerKind::SyntheticEvents => Box::new(SyntheticEvents),
            }
        })
        .collect()
}
