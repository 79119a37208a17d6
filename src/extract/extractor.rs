//! Record extraction from captured feed markup
//!
//! Each item container found in a snapshot becomes exactly one [`AdRecord`].
//! Fields are described by a table of rules (selector, what to read, optional
//! post-processing) so selector churn stays in configuration.

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::acquisition::Snapshot;
use crate::config::{Config, SelectorConfig};
use crate::extract::duration::parse_start_and_duration;
use crate::extract::media::MediaResolver;
use crate::extract::record::{AdRecord, MediaBundle};
use crate::{HarvestError, Result};

static LIBRARY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Library ID:\s*(\d+)").expect("library id pattern"));

/// Record field a rule fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    LibraryId,
    CategoryName,
    Cta,
    PageName,
    PageImageLink,
    AdDescription,
    PageLink,
}

/// What is read from the first element matching a rule's selector
#[derive(Debug, Clone, Copy)]
enum Source {
    Text,
    Attribute(&'static str),
}

#[derive(Debug, Clone)]
struct FieldRule {
    field: Field,
    selector: Selector,
    source: Source,
    post: Option<fn(String) -> String>,
}

/// Turns item containers into [`AdRecord`]s
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    item_selector: Selector,
    timing_selector: Selector,
    media_selector: Selector,
    rules: Vec<FieldRule>,
    media: MediaResolver,
    base_url: Option<Url>,
}

impl RecordExtractor {
    /// Builds an extractor from a validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = match &config.media.base_url {
            Some(base) => Some(Url::parse(base).map_err(|e| {
                HarvestError::Config(crate::ConfigError::InvalidUrl(format!(
                    "Invalid base_url '{}': {}",
                    base, e
                )))
            })?),
            None => None,
        };

        Self::from_parts(&config.selectors, MediaResolver::new(&config.media), base_url)
    }

    /// Builds an extractor from its individual pieces
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Selector`] naming the first selector that does
    /// not parse.
    pub fn from_parts(
        selectors: &SelectorConfig,
        media: MediaResolver,
        base_url: Option<Url>,
    ) -> Result<Self> {
        let rule = |field, css: &str, source, post| -> Result<FieldRule> {
            Ok(FieldRule {
                field,
                selector: compile(css)?,
                source,
                post,
            })
        };

        let rules = vec![
            rule(
                Field::LibraryId,
                &selectors.library_id,
                Source::Text,
                Some(normalize_library_id as fn(String) -> String),
            )?,
            rule(Field::CategoryName, &selectors.category, Source::Text, None)?,
            rule(Field::Cta, &selectors.cta, Source::Text, None)?,
            rule(Field::PageName, &selectors.page_name, Source::Text, None)?,
            rule(
                Field::PageImageLink,
                &selectors.page_image_link,
                Source::Attribute("href"),
                None,
            )?,
            rule(Field::AdDescription, &selectors.description, Source::Text, None)?,
            rule(Field::PageLink, &selectors.page_link, Source::Text, None)?,
        ];

        Ok(Self {
            item_selector: compile(&selectors.item_container)?,
            timing_selector: compile(&selectors.start_date)?,
            media_selector: compile(&selectors.media_container)?,
            rules,
            media,
            base_url,
        })
    }

    /// Extracts one record per item container, in document order
    pub fn extract_all(&self, snapshot: &Snapshot, keyword: &str) -> Vec<AdRecord> {
        self.extract_all_from_markup(snapshot.markup(), keyword)
    }

    /// Same as [`extract_all`](Self::extract_all) for raw markup
    pub fn extract_all_from_markup(&self, markup: &str, keyword: &str) -> Vec<AdRecord> {
        let document = Html::parse_document(markup);
        let records: Vec<AdRecord> = document
            .select(&self.item_selector)
            .map(|item| self.extract(item, keyword))
            .collect();

        tracing::info!("Extracted {} records for keyword '{}'", records.len(), keyword);
        records
    }

    /// Extracts a single record from one item container
    ///
    /// Never fails: every field that cannot be found is left empty.
    pub fn extract(&self, item: ElementRef<'_>, keyword: &str) -> AdRecord {
        let mut record = AdRecord {
            library_id: String::new(),
            timing: parse_start_and_duration(&self.timing_text(item)),
            category_name: String::new(),
            cta: String::new(),
            page_name: String::new(),
            page_image_link: String::new(),
            ad_description: String::new(),
            page_link: String::new(),
            media_links: self.media_links(item),
            keyword: keyword.to_string(),
            scraped_at: Utc::now().to_rfc3339(),
        };

        for rule in &self.rules {
            let value = read_rule(item, rule);
            *field_slot(&mut record, rule.field) = value;
        }

        record
    }

    fn timing_text(&self, item: ElementRef<'_>) -> String {
        item.select(&self.timing_selector)
            .next()
            .map(stripped_text)
            .unwrap_or_default()
    }

    fn media_links(&self, item: ElementRef<'_>) -> MediaBundle {
        match item.select(&self.media_selector).next() {
            Some(container) => self
                .media
                .extract_from_fragment(container, self.base_url.as_ref()),
            None => MediaBundle::new(),
        }
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn read_rule(item: ElementRef<'_>, rule: &FieldRule) -> String {
    let Some(element) = item.select(&rule.selector).next() else {
        return String::new();
    };

    let value = match rule.source {
        Source::Text => stripped_text(element),
        Source::Attribute(name) => element
            .value()
            .attr(name)
            .map(|value| value.trim().to_string())
            .unwrap_or_default(),
    };

    match rule.post {
        Some(post) => post(value),
        None => value,
    }
}

fn field_slot(record: &mut AdRecord, field: Field) -> &mut String {
    match field {
        Field::LibraryId => &mut record.library_id,
        Field::CategoryName => &mut record.category_name,
        Field::Cta => &mut record.cta,
        Field::PageName => &mut record.page_name,
        Field::PageImageLink => &mut record.page_image_link,
        Field::AdDescription => &mut record.ad_description,
        Field::PageLink => &mut record.page_link,
    }
}

/// Concatenates the element's text nodes, each trimmed, skipping blank ones
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// "Library ID: 123" becomes "123"; anything else is kept as is
fn normalize_library_id(text: String) -> String {
    match LIBRARY_ID_PATTERN.captures(&text) {
        Some(captures) => captures[1].to_string(),
        None => text,
    }
}
