//! Scroll driving and escalation

use std::time::Duration;

use crate::acquisition::probe::{PageProbe, ProbeError, ProbeResult};
use crate::acquisition::triggers::{
    build_triggers, LoadTrigger, SCROLL_POSITION_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
};
use crate::config::AcquisitionConfig;

/// Outcome of one escalation round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationReport {
    /// Strategies that completed
    pub succeeded: Vec<&'static str>,
    /// Strategies that failed with a transient error
    pub failed: Vec<&'static str>,
}

/// Issues scroll commands and runs escalation strategies
pub struct ScrollDriver {
    settle_delay: Duration,
    bottom_margin: u64,
    incremental_steps: u32,
    triggers: Vec<Box<dyn LoadTrigger>>,
}

impl ScrollDriver {
    /// Creates a driver with the configured timing and strategies
    pub fn new(config: &AcquisitionConfig) -> Self {
        Self::with_triggers(config, build_triggers(config))
    }

    /// Creates a driver with an explicit set of strategies
    pub fn with_triggers(config: &AcquisitionConfig, triggers: Vec<Box<dyn LoadTrigger>>) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            bottom_margin: config.bottom_margin,
            incremental_steps: config.incremental_steps,
            triggers,
        }
    }

    /// Scrolls to the bottom of the page
    ///
    /// If the viewport still ends up far from the bottom, a few
    /// quarter-height scrolls are issued before a final jump to the bottom.
    pub async fn scroll_to_bottom(&self, probe: &dyn PageProbe) -> ProbeResult<()> {
        probe.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
        tokio::time::sleep(self.settle_delay).await;

        let position = probe
            .execute_script(SCROLL_POSITION_SCRIPT)
            .await?
            .as_f64()
            .unwrap_or(0.0)
            .max(0.0) as u64;
        let height = probe.scroll_height().await?;

        if position.saturating_add(self.bottom_margin) < height {
            let step = height / 4;
            tracing::debug!(
                "Far from bottom (position {} of {}), scrolling in {} steps of {}",
                position,
                height,
                self.incremental_steps,
                step
            );
            for _ in 0..self.incremental_steps {
                probe
                    .execute_script(&format!("window.scrollBy(0, {});", step))
                    .await?;
                tokio::time::sleep(self.settle_delay).await;
            }
        }

        probe.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
        Ok(())
    }

    /// Runs every escalation strategy once, in order
    ///
    /// A transient failure of one strategy is logged and does not stop the
    /// others. A fatal error stops the round and is returned.
    pub async fn trigger_alternate_load(&self, probe: &dyn PageProbe) -> Result<EscalationReport, ProbeError> {
        let mut report = EscalationReport::default();

        for trigger in &self.triggers {
            match trigger.trigger(probe).await {
                Ok(()) => report.succeeded.push(trigger.name()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Load trigger {} failed: {}", trigger.name(), e);
                    report.failed.push(trigger.name());
                }
            }
        }

        Ok(report)
    }

    /// Names of the configured strategies, in order
    pub fn trigger_names(&self) -> Vec<&'static str> {
        self.triggers.iter().map(|t| t.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Records scripts and answers the position query with a fixed offset
    struct RecordingPage {
        position: u64,
        height: u64,
        scripts: Mutex<Vec<String>>,
    }

    impl RecordingPage {
        fn new(position: u64, height: u64) -> Self {
            Self {
                position,
                height,
                scripts: Mutex::new(Vec::new()),
            }
        }

        fn scripts(&self) -> Vec<String> {
            self.scripts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageProbe for RecordingPage {
        async fn scroll_height(&self) -> ProbeResult<u64> {
            Ok(self.height)
        }

        async fn count_matching_elements(&self, _selector: &str) -> ProbeResult<usize> {
            Ok(0)
        }

        async fn execute_script(&self, script: &str) -> ProbeResult<Value> {
            self.scripts.lock().unwrap().push(script.to_string());
            if script == SCROLL_POSITION_SCRIPT {
                return Ok(Value::from(self.position));
            }
            Ok(Value::Null)
        }

        async fn is_element_present(&self, _selector: &str) -> ProbeResult<bool> {
            Ok(false)
        }

        async fn click(&self, _selector: &str) -> ProbeResult<()> {
            Ok(())
        }

        async fn capture_markup(&self) -> ProbeResult<String> {
            Ok(String::new())
        }
    }

    struct Failing(ProbeError);

    #[async_trait]
    impl LoadTrigger for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn trigger(&self, _probe: &dyn PageProbe) -> ProbeResult<()> {
            Err(match &self.0 {
                ProbeError::Transient(m) => ProbeError::Transient(m.clone()),
                ProbeError::SessionLost(m) => ProbeError::SessionLost(m.clone()),
            })
        }
    }

    struct Counting(&'static str);

    #[async_trait]
    impl LoadTrigger for Counting {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn trigger(&self, _probe: &dyn PageProbe) -> ProbeResult<()> {
            Ok(())
        }
    }

    fn fast_config() -> AcquisitionConfig {
        AcquisitionConfig {
            settle_delay_ms: 1,
            ..AcquisitionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_scroll_near_bottom_skips_increments() {
        let page = RecordingPage::new(4500, 5000);
        let driver = ScrollDriver::with_triggers(&fast_config(), Vec::new());

        driver.scroll_to_bottom(&page).await.unwrap();
        assert_eq!(
            page.scripts(),
            vec![
                SCROLL_TO_BOTTOM_SCRIPT.to_string(),
                SCROLL_POSITION_SCRIPT.to_string(),
                SCROLL_TO_BOTTOM_SCRIPT.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_scroll_far_from_bottom_uses_quarter_steps() {
        let page = RecordingPage::new(0, 8000);
        let driver = ScrollDriver::with_triggers(&fast_config(), Vec::new());

        driver.scroll_to_bottom(&page).await.unwrap();
        let scripts = page.scripts();
        let steps = scripts
            .iter()
            .filter(|s| s.as_str() == "window.scrollBy(0, 2000);")
            .count();
        assert_eq!(steps, 3);
        assert_eq!(scripts.last().unwrap(), SCROLL_TO_BOTTOM_SCRIPT);
    }

    #[tokio::test]
    async fn test_transient_trigger_failure_does_not_stop_others() {
        let driver = ScrollDriver::with_triggers(
            &fast_config(),
            vec![
                Box::new(Failing(ProbeError::Transient("no element".into()))),
                Box::new(Counting("second")),
            ],
        );

        let report = driver
            .trigger_alternate_load(&RecordingPage::new(0, 0))
            .await
            .unwrap();
        assert_eq!(report.failed, vec!["failing"]);
        assert_eq!(report.succeeded, vec!["second"]);
    }

    #[tokio::test]
    async fn test_fatal_trigger_failure_propagates() {
        let driver = ScrollDriver::with_triggers(
            &fast_config(),
            vec![
                Box::new(Failing(ProbeError::SessionLost("closed".into()))),
                Box::new(Counting("never")),
            ],
        );

        let result = driver.trigger_alternate_load(&RecordingPage::new(0, 0)).await;
        assert!(matches!(result, Err(ProbeError::SessionLost(_))));
    }

    #[tokio::test]
    async fn test_default_triggers_issue_scripts() {
        let config = AcquisitionConfig {
            settle_delay_ms: 1,
            load_wait_ms: 1,
            load_more_wait_ms: 1,
            ..AcquisitionConfig::default()
        };
        let page = RecordingPage::new(0, 0);
        let driver = ScrollDriver::new(&config);

        let report = driver.trigger_alternate_load(&page).await.unwrap();
        assert_eq!(report.succeeded.len(), 4);
        assert!(page
            .scripts()
            .iter()
            .any(|s| s.as_str() == crate::acquisition::triggers::SYNTHETIC_EVENTS_SCRIPT));
    }
}
