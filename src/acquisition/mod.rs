//! Content acquisition from a lazily loading feed
//!
//! This module contains everything that talks to a live page:
//! - [`PageProbe`], the injected view of the page
//! - growth detection and scroll driving
//! - escalation strategies for stalled feeds
//! - the acquisition loop, which runs until cancelled and yields a [`Snapshot`]

mod cancel;
mod controller;
mod driver;
mod monitor;
mod pacing;
mod probe;
mod triggers;

pub use cancel::{cancel_after, cancel_on_ctrl_c};
pub use controller::{AcquisitionStats, ContentAcquisitionController, ConvergenceState};
pub use driver::{EscalationReport, ScrollDriver};
pub use monitor::{GrowthSample, PageGrowthMonitor};
pub use pacing::AdaptiveWait;
pub use probe::{PageProbe, ProbeError, ProbeResult};
pub use triggers::{
    build_triggers, LoadMoreControl, LoadTrigger, LoadingIndicatorWait, ScrollJiggle,
    SyntheticEvents, SCROLL_BACK_SCRIPT, SCROLL_POSITION_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
    SYNTHETIC_EVENTS_SCRIPT,
};

use chrono::{DateTime, Utc};

/// Page markup captured at one instant
///
/// Read-only once taken; extraction works on snapshots so it never touches
/// the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    markup: String,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Wraps markup captured now
    pub fn new(markup: impl Into<String>) -> Self {
        Self::captured(markup, Utc::now())
    }

    /// Wraps markup captured at a known time
    pub fn captured(markup: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            markup: markup.into(),
            captured_at,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
