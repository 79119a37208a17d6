//! Media discovery inside an item's markup
//!
//! URLs are gathered in a fixed order of passes:
//! 1. `src` / `data-src` of `<img>`, `<video>` and `<audio>`
//! 2. nested `<source>` elements of `<video>` and `<audio>`
//! 3. `background-image` / `mask-image` URLs in inline `style` attributes
//! 4. `<a href>` targets whose path has a media extension
//! 5. bare `http(s)://` URLs with a media extension in the text or serialized markup
//!
//! Classification is purely syntactic: the lower-cased path suffix is matched
//! against the configured extension sets. No request is ever made.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::config::MediaConfig;
use crate::extract::record::{MediaBundle, MediaKind};

static STYLE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:background|mask)(?:-image)?\s*:[^;]*?url\(\s*["']?([^"')]+?)["']?\s*\)"#)
        .expect("style url pattern")
});

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Classifies, resolves and collects media URLs
#[derive(Debug, Clone)]
pub struct MediaResolver {
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
    audio_extensions: Vec<String>,
    bare_url_pattern: Regex,
    embedded: Selector,
    nested_sources: Selector,
    styled: Selector,
    links: Selector,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

impl MediaResolver {
    /// Builds a resolver for the configured extension sets
    pub fn new(config: &MediaConfig) -> Self {
        let lower = |list: &[String]| list.iter().map(|e| e.to_lowercase()).collect::<Vec<_>>();
        let image_extensions = lower(&config.image_extensions);
        let video_extensions = lower(&config.video_extensions);
        let audio_extensions = lower(&config.audio_extensions);

        let mut alternatives: Vec<String> = image_extensions
            .iter()
            .chain(&video_extensions)
            .chain(&audio_extensions)
            .map(|ext| regex::escape(ext.trim_start_matches('.')))
            .collect();
        // Longest first so ".jpeg" is not cut short by ".jpg"-like prefixes
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        alternatives.dedup();

        let bare_url_pattern = Regex::new(&format!(
            r#"(?i)https?://[^\s<>"']+\.(?:{})"#,
            alternatives.join("|")
        ))
        .expect("bare media url pattern");

        Self {
            image_extensions,
            video_extensions,
            audio_extensions,
            bare_url_pattern,
            embedded: static_selector("img, video, audio"),
            nested_sources: static_selector("video source, audio source"),
            styled: static_selector("[style]"),
            links: static_selector("a[href]"),
        }
    }

    /// Classifies a URL by the extension of its path
    ///
    /// ```
    /// use feed_harvest::extract::{MediaKind, MediaResolver};
    ///
    /// let resolver = MediaResolver::default();
    /// assert_eq!(resolver.classify("photo.MP4"), Some(MediaKind::Video));
    /// assert_eq!(resolver.classify("https://cdn.example.com/a.png?w=200"), Some(MediaKind::Image));
    /// assert_eq!(resolver.classify("file.xyz"), None);
    /// ```
    pub fn classify(&self, url: &str) -> Option<MediaKind> {
        let path = media_path(url);
        let matches = |extensions: &[String]| extensions.iter().any(|ext| path.ends_with(ext.as_str()));

        if matches(&self.image_extensions) {
            Some(MediaKind::Image)
        } else if matches(&self.video_extensions) {
            Some(MediaKind::Video)
        } else if matches(&self.audio_extensions) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// Makes `url` absolute against `base`
    ///
    /// Absolute and protocol-relative URLs are returned unchanged, as is
    /// everything when no base is known.
    ///
    /// ```
    /// use feed_harvest::extract::MediaResolver;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.example.com/ads/library/").unwrap();
    /// assert_eq!(
    ///     MediaResolver::resolve("img/a.jpg", Some(&base)),
    ///     "https://www.example.com/ads/library/img/a.jpg"
    /// );
    /// assert_eq!(MediaResolver::resolve("//cdn.example.com/a.jpg", Some(&base)), "//cdn.example.com/a.jpg");
    /// ```
    pub fn resolve(url: &str, base: Option<&Url>) -> String {
        let url = url.trim();
        if url.starts_with("//") || Url::parse(url).is_ok() {
            return url.to_string();
        }

        match base {
            Some(base) => base
                .join(url)
                .map(|joined| joined.to_string())
                .unwrap_or_else(|_| url.to_string()),
            None => url.to_string(),
        }
    }

    /// Collects every media URL inside `fragment`
    pub fn extract_from_fragment(&self, fragment: ElementRef<'_>, base: Option<&Url>) -> MediaBundle {
        let mut bundle = MediaBundle::new();

        // Pass 1: direct and lazy-loaded sources of embedded media
        for element in fragment.select(&self.embedded) {
            let Some(kind) = embedded_kind(element) else {
                continue;
            };
            for attribute in ["src", "data-src"] {
                if let Some(value) = non_empty_attr(element, attribute) {
                    bundle.insert(kind, Self::resolve(value, base));
                }
            }
        }

        // Pass 2: <source> elements anywhere inside <video>/<audio>
        for source in fragment.select(&self.nested_sources) {
            let Some(kind) = source
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find_map(player_kind)
            else {
                continue;
            };
            if let Some(value) = non_empty_attr(source, "src") {
                bundle.insert(kind, Self::resolve(value, base));
            }
        }

        // Pass 3: inline background/mask images
        for element in fragment.select(&self.styled) {
            let Some(style) = element.value().attr("style") else {
                continue;
            };
            for captures in STYLE_URL_PATTERN.captures_iter(style) {
                let resolved = Self::resolve(&captures[1], base);
                if self.classify(&resolved) == Some(MediaKind::Image) {
                    bundle.insert(MediaKind::Image, resolved);
                }
            }
        }

        // Pass 4: links to media files
        for anchor in fragment.select(&self.links) {
            if let Some(href) = non_empty_attr(anchor, "href") {
                let resolved = Self::resolve(href, base);
                if let Some(kind) = self.classify(&resolved) {
                    bundle.insert(kind, resolved);
                }
            }
        }

        // Pass 5: bare URLs in text and serialized markup
        let haystack = format!("{} {}", fragment.text().collect::<String>(), fragment.html());
        for found in self.bare_url_pattern.find_iter(&haystack) {
            let resolved = Self::resolve(found.as_str(), base);
            if let Some(kind) = self.classify(&resolved) {
                bundle.insert(kind, resolved);
            }
        }

        tracing::trace!(
            images = bundle.images.len(),
            videos = bundle.videos.len(),
            audio = bundle.audio.len(),
            "Collected media links"
        );

        bundle
    }

    /// Parses `html` as a fragment and collects its media URLs
    pub fn extract_from_html(&self, html: &str, base: Option<&Url>) -> MediaBundle {
        let fragment = Html::parse_fragment(html);
        self.extract_from_fragment(fragment.root_element(), base)
    }
}

fn embedded_kind(element: ElementRef<'_>) -> Option<MediaKind> {
    match element.value().name() {
        "img" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        _ => None,
    }
}

/// Kind of a `<video>` or `<audio>` element
fn player_kind(element: ElementRef<'_>) -> Option<MediaKind> {
    match embedded_kind(element)? {
        MediaKind::Image => None,
        kind => Some(kind),
    }
}

fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Lower-cased path of `url`, without query or fragment
fn media_path(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    match Url::parse(&lowered) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => lowered
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
