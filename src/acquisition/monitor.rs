//! Page growth detection
//!
//! Growth is judged on two signals: scroll height and the number of item
//! containers. Either one increasing counts.

use chrono::{DateTime, Utc};

use crate::acquisition::probe::{PageProbe, ProbeResult};

/// One observation of the page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthSample {
    pub scroll_height: u64,
    pub item_count: usize,
    pub captured_at: DateTime<Utc>,
}

/// Samples the page and remembers the previous observation
#[derive(Debug, Clone)]
pub struct PageGrowthMonitor {
    item_selector: String,
    last: Option<GrowthSample>,
}

impl PageGrowthMonitor {
    /// Creates a monitor counting elements that match `item_selector`
    pub fn new(item_selector: impl Into<String>) -> Self {
        Self {
            item_selector: item_selector.into(),
            last: None,
        }
    }

    /// Reads scroll height and item count from the page
    pub async fn sample(&self, probe: &dyn PageProbe) -> ProbeResult<GrowthSample> {
        let scroll_height = probe.scroll_height().await?;
        let item_count = probe.count_matching_elements(&self.item_selector).await?;
        Ok(GrowthSample {
            scroll_height,
            item_count,
            captured_at: Utc::now(),
        })
    }

    /// True if either signal increased between the two samples
    pub fn has_grown(previous: &GrowthSample, current: &GrowthSample) -> bool {
        current.scroll_height > previous.scroll_height || current.item_count > previous.item_count
    }

    /// Takes a sample and compares it with the previous one
    ///
    /// The first sample only establishes a baseline and never counts as
    /// growth. A failed sample leaves the previous observation in place.
    pub async fn observe(&mut self, probe: &dyn PageProbe) -> ProbeResult<bool> {
        let current = self.sample(probe).await?;
        let grown = match &self.last {
            Some(previous) => Self::has_grown(previous, &current),
            None => false,
        };

        tracing::debug!(
            "Page sample: height={} items={} grown={}",
            current.scroll_height,
            current.item_count,
            grown
        );

        self.last = Some(current);
        Ok(grown)
    }

    /// Most recent successful sample
    pub fn last_sample(&self) -> Option<&GrowthSample> {
        self.last.as_ref()
    }

    /// Forgets the previous sample so the next observation is a new baseline
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::probe::ProbeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Probe whose height and item count are set directly by the test
    struct FixedPage {
        size: Mutex<(u64, usize)>,
        fail: Mutex<bool>,
    }

    impl FixedPage {
        fn new(height: u64, items: usize) -> Self {
            Self {
                size: Mutex::new((height, items)),
                fail: Mutex::new(false),
            }
        }

        fn set(&self, height: u64, items: usize) {
            *self.size.lock().unwrap() = (height, items);
        }
    }

    #[async_trait]
    impl PageProbe for FixedPage {
        async fn scroll_height(&self) -> ProbeResult<u64> {
            if *self.fail.lock().unwrap() {
                return Err(ProbeError::Transient("height unavailable".into()));
            }
            Ok(self.size.lock().unwrap().0)
        }

        async fn count_matching_elements(&self, _selector: &str) -> ProbeResult<usize> {
            Ok(self.size.lock().unwrap().1)
        }

        async fn execute_script(&self, _script: &str) -> ProbeResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
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

    fn sample(scroll_height: u64, item_count: usize) -> GrowthSample {
        GrowthSample {
            scroll_height,
            item_count,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_grown() {
        assert!(PageGrowthMonitor::has_grown(&sample(100, 5), &sample(200, 5)));
        assert!(PageGrowthMonitor::has_grown(&sample(100, 5), &sample(100, 6)));
        assert!(!PageGrowthMonitor::has_grown(&sample(100, 5), &sample(100, 5)));
        // Shrinking is not growth
        assert!(!PageGrowthMonitor::has_grown(&sample(100, 5), &sample(90, 4)));
    }

    #[tokio::test]
    async fn test_first_observation_is_baseline() {
        let page = FixedPage::new(1000, 10);
        let mut monitor = PageGrowthMonitor::new(".item");

        assert!(!monitor.observe(&page).await.unwrap());
        assert_eq!(monitor.last_sample().unwrap().scroll_height, 1000);

        page.set(1500, 10);
        assert!(monitor.observe(&page).await.unwrap());

        assert!(!monitor.observe(&page).await.unwrap());

        page.set(1500, 12);
        assert!(monitor.observe(&page).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_sample_keeps_previous() {
        let page = FixedPage::new(1000, 10);
        let mut monitor = PageGrowthMonitor::new(".item");
        monitor.observe(&page).await.unwrap();

        *page.fail.lock().unwrap() = true;
        assert!(monitor.observe(&page).await.is_err());
        assert_eq!(monitor.last_sample().unwrap().scroll_height, 1000);

        *page.fail.lock().unwrap() = false;
        page.set(1200, 10);
        assert!(monitor.observe(&page).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_starts_new_baseline() {
        let page = FixedPage::new(1000, 10);
        let mut monitor = PageGrowthMonitor::new(".item");
        monitor.observe(&page).await.unwrap();

        monitor.reset();
        assert!(monitor.last_sample().is_none());

        page.set(2000, 20);
        assert!(!monitor.observe(&page).await.unwrap());
    }
}
