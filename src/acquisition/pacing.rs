//! Adaptive wait between scroll cycles

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::AcquisitionConfig;

const SLOW_DOWN: f64 = 1.2;
const SPEED_UP: f64 = 0.9;

/// Wait that lengthens while cycles keep failing and shortens while they succeed
///
/// The success rate is taken over a rolling window of recent attempts. The
/// wait always stays within `[base, max]`.
#[derive(Debug, Clone)]
pub struct AdaptiveWait {
    base: Duration,
    max: Duration,
    current: Duration,
    window: VecDeque<bool>,
    capacity: usize,
    low_threshold: f64,
    high_threshold: f64,
}

impl AdaptiveWait {
    pub fn new(config: &AcquisitionConfig) -> Self {
        let base = Duration::from_millis(config.scroll_wait_ms);
        Self {
            base,
            max: Duration::from_millis(config.max_wait_ms).max(base),
            current: base,
            window: VecDeque::with_capacity(config.success_window),
            capacity: config.success_window.max(1),
            low_threshold: config.performance_threshold,
            high_threshold: config.high_performance_threshold,
        }
    }

    /// Records the outcome of one cycle and returns the adjusted wait
    pub fn record(&mut self, success: bool) -> Duration {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(success);

        let rate = self.success_rate();
        if rate < self.low_threshold {
            self.current = self.scaled(SLOW_DOWN);
            tracing::debug!("Success rate {:.2}, slowing down to {:?}", rate, self.current);
        } else if rate > self.high_threshold && self.current > self.base {
            self.current = self.scaled(SPEED_UP);
            tracing::debug!("Success rate {:.2}, speeding up to {:?}", rate, self.current);
        }

        self.current
    }

    fn scaled(&self, factor: f64) -> Duration {
        let millis = (self.current.as_millis() as f64 * factor).round() as u64;
        Duration::from_millis(millis).clamp(self.base, self.max)
    }

    /// Fraction of successful attempts in the window; 1.0 before any attempt
    pub fn success_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 1.0;
        }
        let successes = self.window.iter().filter(|s| **s).count();
        successes as f64 / self.window.len() as f64
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Back to the base wait with an empty window
    pub fn reset(&mut self) {
        self.current = self.base;
        self.window.clear();
    }
}
