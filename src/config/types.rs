use serde::Deserialize;

/// Main configuration structure for Feed-Harvest
///
/// Every section has defaults, so an empty file is a complete configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub selectors: SelectorConfig,
    pub media: MediaConfig,
    pub output: OutputConfig,
}

/// Scrolling, waiting and escalation behavior of the acquisition loop
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Consecutive stalls that make up one stall episode
    #[serde(rename = "max-stalls")]
    pub max_stalls: u32,

    /// Base wait after each scroll cycle (milliseconds); lower bound of the adaptive wait
    #[serde(rename = "scroll-wait-ms")]
    pub scroll_wait_ms: u64,

    /// Upper bound of the adaptive wait (milliseconds)
    #[serde(rename = "max-wait-ms")]
    pub max_wait_ms: u64,

    /// Longer pause used while a loading indicator is visible and after a stall episode
    #[serde(rename = "load-wait-ms")]
    pub load_wait_ms: u64,

    /// Pause between incremental scrolls
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Distance from the bottom (pixels) under which incremental scrolls are skipped
    #[serde(rename = "bottom-margin")]
    pub bottom_margin: u64,

    /// Number of quarter-height scrolls issued when far from the bottom
    #[serde(rename = "incremental-steps")]
    pub incremental_steps: u32,

    /// Success rate under which the wait grows
    #[serde(rename = "performance-threshold")]
    pub performance_threshold: f64,

    /// Success rate above which the wait shrinks
    #[serde(rename = "high-performance-threshold")]
    pub high_performance_threshold: f64,

    /// Number of recent attempts the success rate is computed over
    #[serde(rename = "success-window")]
    pub success_window: usize,

    /// Selector of the spinner shown while the feed loads
    #[serde(rename = "loading-indicator-selector")]
    pub loading_indicator_selector: String,

    /// Candidate "load more" controls, tried in order
    #[serde(rename = "load-more-selectors")]
    pub load_more_selectors: Vec<String>,

    /// Pause after activating a "load more" control
    #[serde(rename = "load-more-wait-ms")]
    pub load_more_wait_ms: u64,

    /// Escalation strategies, run in this order after a stall
    #[serde(rename = "trigger-strategies")]
    pub trigger_strategies: Vec<TriggerKind>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_stalls: 3,
            scroll_wait_ms: 2000,
            max_wait_ms: 8000,
            load_wait_ms: 5000,
            settle_delay_ms: 1000,
            bottom_margin: 1000,
            incremental_steps: 3,
            performance_threshold: 0.8,
            high_performance_threshold: 0.95,
            success_window: 10,
            loading_indicator_selector: "div[role='progressbar']".to_string(),
            load_more_selectors: vec![
                "[data-testid='more-items-button']".to_string(),
                "[aria-label*='more']".to_string(),
            ],
            load_more_wait_ms: 3000,
            trigger_strategies: vec![
                TriggerKind::ScrollJiggle,
                TriggerKind::LoadingIndicator,
                TriggerKind::LoadMoreControl,
                TriggerKind::SyntheticEvents,
            ],
        }
    }
}

/// Names of the escalation strategies that can be listed in `trigger-strategies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    LoadingIndicator,
    LoadMoreControl,
    ScrollJiggle,
    SyntheticEvents,
}

/// CSS selectors for the item container and each record field
///
/// These track the feed's generated class names and are expected to change
/// independently of the extraction logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "item-container")]
    pub item_container: String,

    #[serde(rename = "library-id")]
    pub library_id: String,

    #[serde(rename = "start-date")]
    pub start_date: String,

    pub category: String,

    pub cta: String,

    #[serde(rename = "page-name")]
    pub page_name: String,

    /// Anchor whose `href` becomes `page_image_link`
    #[serde(rename = "page-image-link")]
    pub page_image_link: String,

    /// Element whose text becomes `page_link`
    #[serde(rename = "page-link")]
    pub page_link: String,

    pub description: String,

    #[serde(rename = "media-container")]
    pub media_container: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item_container: ".xrvj5dj > div".to_string(),
            library_id: ".x1rg5ohu span.xw23nyj".to_string(),
            start_date: "div.x3nfvp2:nth-of-type(3) span".to_string(),
            category: ".xb2kyzz div._4ik4".to_string(),
            cta: ".x1h6gzvc div.x8t9es0".to_string(),
            page_name: "span.x108nfp6.x1fvot60".to_string(),
            page_image_link: "a".to_string(),
            page_link: "a".to_string(),
            description: ".x8t9es0 div ._4ik4 span".to_string(),
            media_container: "div._7jyg".to_string(),
        }
    }
}

impl SelectorConfig {
    /// All selectors paired with their config key, for validation and reporting
    pub fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("item-container", &self.item_container),
            ("library-id", &self.library_id),
            ("start-date", &self.start_date),
            ("category", &self.category),
            ("cta", &self.cta),
            ("page-name", &self.page_name),
            ("page-image-link", &self.page_image_link),
            ("page-link", &self.page_link),
            ("description", &self.description),
            ("media-container", &self.media_container),
        ]
    }
}

/// Media classification and resolution settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    #[serde(rename = "image-extensions")]
    pub image_extensions: Vec<String>,

    #[serde(rename = "video-extensions")]
    pub video_extensions: Vec<String>,

    #[serde(rename = "audio-extensions")]
    pub audio_extensions: Vec<String>,

    /// Base URL relative media references are joined against
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            image_extensions: owned(&[
                ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp", ".ico", ".tiff",
            ]),
            video_extensions: owned(&[
                ".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm", ".mkv", ".m4v",
            ]),
            audio_extensions: owned(&[".mp3", ".wav", ".ogg", ".m4a", ".aac", ".flac", ".wma"]),
            base_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the HTML/JSON/CSV files are written to
    pub directory: String,

    /// Prefix of every generated file name
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scraped_data".to_string(),
            file_prefix: "facebook_ads".to_string(),
        }
    }
}
