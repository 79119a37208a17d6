//! Content acquisition loop
//!
//! The loop scrolls, waits, samples the page and escalates when nothing new
//! appeared. It has no natural end: a feed that stops growing may simply be
//! slow, so only cancellation finishes a run. Stall episodes are logged and
//! counted, then the loop keeps going.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::acquisition::driver::ScrollDriver;
use crate::acquisition::monitor::PageGrowthMonitor;
use crate::acquisition::pacing::AdaptiveWait;
use crate::acquisition::probe::{PageProbe, ProbeError, ProbeResult};
use crate::acquisition::Snapshot;
use crate::config::{AcquisitionConfig, Config};
use crate::HarvestError;

/// Consecutive-stall bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceState {
    pub stall_count: u32,
    pub max_stalls: u32,
}

impl ConvergenceState {
    pub fn new(max_stalls: u32) -> Self {
        Self {
            stall_count: 0,
            max_stalls,
        }
    }

    pub fn record_growth(&mut self) {
        self.stall_count = 0;
    }

    pub fn record_stall(&mut self) {
        self.stall_count += 1;
    }

    /// True once `max_stalls` consecutive stalls have been seen
    pub fn episode_reached(&self) -> bool {
        self.stall_count >= self.max_stalls
    }

    pub fn reset(&mut self) {
        self.stall_count = 0;
    }
}

/// Counters describing a run so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionStats {
    pub iterations: u64,
    pub growth_events: u64,
    pub stalls: u64,
    pub stall_episodes: u64,
    pub escalations: u64,
    pub transient_errors: u64,
    /// Escalation strategies that failed without ending the run
    pub failed_triggers: u64,
    pub current_wait: Duration,
    pub success_rate: f64,
    pub last_scroll_height: u64,
    pub last_item_count: usize,
}

/// Drives a page until cancelled and captures its markup
pub struct ContentAcquisitionController<P> {
    probe: P,
    driver: ScrollDriver,
    monitor: PageGrowthMonitor,
    pacing: AdaptiveWait,
    state: ConvergenceState,
    stats: AcquisitionStats,
    episode_pause: Duration,
}

impl<P: PageProbe> ContentAcquisitionController<P> {
    /// Creates a controller for `probe` using the acquisition settings and item selector of `config`
    pub fn new(probe: P, config: &Config) -> Self {
        Self::with_driver(
            probe,
            &config.acquisition,
            ScrollDriver::new(&config.acquisition),
            PageGrowthMonitor::new(config.selectors.item_container.clone()),
        )
    }

    /// Creates a controller with an explicit driver and monitor
    pub fn with_driver(
        probe: P,
        config: &AcquisitionConfig,
        driver: ScrollDriver,
        monitor: PageGrowthMonitor,
    ) -> Self {
        let pacing = AdaptiveWait::new(config);
        let stats = Self::fresh_stats(&pacing);

        Self {
            probe,
            driver,
            monitor,
            pacing,
            state: ConvergenceState::new(config.max_stalls),
            stats,
            episode_pause: Duration::from_millis(config.load_wait_ms),
        }
    }

    fn fresh_stats(pacing: &AdaptiveWait) -> AcquisitionStats {
        AcquisitionStats {
            current_wait: pacing.current(),
            success_rate: pacing.success_rate(),
            ..AcquisitionStats::default()
        }
    }

    /// Discards everything observed by a previous run
    fn begin_run(&mut self) {
        self.state = ConvergenceState::new(self.state.max_stalls);
        self.monitor.reset();
        self.pacing.reset();
        self.stats = Self::fresh_stats(&self.pacing);
    }

    /// Runs until `cancel` fires, then captures the page
    ///
    /// Cancellation is honored between iterations; an iteration that has
    /// started always completes. Transient probe failures count as cycles
    /// without growth. Each run starts from a new baseline with its own
    /// stall count, wait and stats.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Probe`] when the page session is lost, either
    /// during the loop or while capturing the final markup.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<Snapshot, HarvestError> {
        tracing::info!("Starting acquisition; the run ends only when cancelled");
        let started = Instant::now();
        self.begin_run();

        let baseline = self.monitor.observe(&self.probe).await;
        self.absorb(baseline.map(|_| ()))?;
        self.refresh_sample_stats();

        while !cancel.is_cancelled() {
            self.stats.iterations += 1;
            self.iterate().await?;

            if self.stats.iterations % 10 == 0 {
                tracing::info!(
                    "Progress: {} iterations, {} items, height {}, wait {:?}, success rate {:.2}",
                    self.stats.iterations,
                    self.stats.last_item_count,
                    self.stats.last_scroll_height,
                    self.stats.current_wait,
                    self.stats.success_rate
                );
            }
        }

        tracing::info!(
            "Acquisition cancelled after {} iterations in {:?}",
            self.stats.iterations,
            started.elapsed()
        );

        let markup = self.probe.capture_markup().await?;
        Ok(Snapshot::new(markup))
    }

    /// One scroll cycle, with escalation when nothing grew
    async fn iterate(&mut self) -> Result<(), ProbeError> {
        let cycle = self.scroll_cycle().await;
        let grew = self.absorb(cycle)?.unwrap_or(false);

        self.stats.current_wait = self.pacing.record(grew);
        self.stats.success_rate = self.pacing.success_rate();

        if grew {
            self.state.record_growth();
            self.stats.growth_events += 1;
        } else {
            self.state.record_stall();
            self.stats.stalls += 1;
            self.stats.escalations += 1;
            tracing::debug!(
                "No growth ({}/{}), escalating",
                self.state.stall_count,
                self.state.max_stalls
            );

            let report = self.driver.trigger_alternate_load(&self.probe).await?;
            self.stats.failed_triggers += report.failed.len() as u64;
            tracing::debug!(
                "Escalation finished: succeeded {:?}, failed {:?}",
                report.succeeded,
                report.failed
            );

            let resample = self.monitor.observe(&self.probe).await;
            if self.absorb(resample)?.unwrap_or(false) {
                tracing::debug!("Escalation produced new content");
                self.state.record_growth();
                self.stats.growth_events += 1;
            }
        }
        self.refresh_sample_stats();

        if self.state.episode_reached() {
            self.stats.stall_episodes += 1;
            tracing::info!(
                "No new content after {} consecutive attempts; the feed may be exhausted or slow, continuing until cancelled",
                self.state.stall_count
            );
            self.state.reset();
            tokio::time::sleep(self.episode_pause).await;
        }

        Ok(())
    }

    /// Scroll, wait, sample; true if the page grew
    async fn scroll_cycle(&mut self) -> ProbeResult<bool> {
        self.driver.scroll_to_bottom(&self.probe).await?;
        tokio::time::sleep(self.pacing.current()).await;
        self.monitor.observe(&self.probe).await
    }

    /// Passes fatal errors through and turns transient ones into `None`
    fn absorb<T>(&mut self, result: ProbeResult<T>) -> Result<Option<T>, ProbeError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_fatal() => {
                tracing::error!("Page probe failed fatally: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Transient probe failure, treating as no growth: {}", e);
                self.stats.transient_errors += 1;
                Ok(None)
            }
        }
    }

    fn refresh_sample_stats(&mut self) {
        if let Some(sample) = self.monitor.last_sample() {
            self.stats.last_scroll_height = sample.scroll_height;
            self.stats.last_item_count = sample.item_count;
        }
    }

    /// Current consecutive-stall count
    pub fn stall_count(&self) -> u32 {
        self.state.stall_count
    }

    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn into_probe(self) -> P {
        self.probe
    }
}
