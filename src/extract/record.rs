//! Record types produced by extraction

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use crate::extract::duration::AdTiming;

/// Kind of media a URL points at, decided by its path extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// Media URLs of one item, grouped by kind
///
/// Each list holds a URL at most once and keeps the order in which URLs were
/// first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaBundle {
    pub images: IndexSet<String>,
    pub videos: IndexSet<String>,
    pub audio: IndexSet<String>,
}

impl MediaBundle {
    /// Creates an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url` under `kind`; returns false if it was already present
    pub fn insert(&mut self, kind: MediaKind, url: impl Into<String>) -> bool {
        self.list_mut(kind).insert(url.into())
    }

    /// URLs of one kind in first-seen order
    pub fn list(&self, kind: MediaKind) -> &IndexSet<String> {
        match kind {
            MediaKind::Image => &self.images,
            MediaKind::Video => &self.videos,
            MediaKind::Audio => &self.audio,
        }
    }

    fn list_mut(&mut self, kind: MediaKind) -> &mut IndexSet<String> {
        match kind {
            MediaKind::Image => &mut self.images,
            MediaKind::Video => &mut self.videos,
            MediaKind::Audio => &mut self.audio,
        }
    }

    /// Total number of URLs across all kinds
    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One normalized record extracted from a single feed item
///
/// Every field is always present. Text that could not be found is an empty
/// string and unknown numeric fields serialize as `""`, never as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdRecord {
    pub library_id: String,

    #[serde(flatten)]
    pub timing: AdTiming,

    pub category_name: String,
    pub cta: String,
    pub page_name: String,
    pub page_image_link: String,
    pub ad_description: String,
    pub page_link: String,
    pub media_links: MediaBundle,

    /// Search keyword of the run that produced this record
    pub keyword: String,

    /// RFC 3339 extraction time
    pub scraped_at: String,
}

/// Serializes `Some(n)` as a number and `None` as an empty string
pub(crate) fn empty_if_none<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(number) => serializer.serialize_i64(*number),
        None => serializer.serialize_str(""),
    }
}
