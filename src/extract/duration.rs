//! Start-date and activity-duration parsing
//!
//! Feed items carry free text such as
//! `"Started running on 28 May 2025 · Total active time 3 hrs"`. This module
//! turns it into a start date, a start timestamp, a duration string and a
//! duration in seconds. Nothing here fails: text that cannot be understood
//! leaves the corresponding field empty while the raw text is kept in
//! [`AdTiming::start_at`].

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::extract::record::empty_if_none;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
/// 30.44 days
const MONTH: i64 = 2_630_016;
/// 365.25 days
const YEAR: i64 = 31_557_600;

/// Prefix that marks a duration computed from the start date rather than read from the text
pub const CALCULATED_PREFIX: &str = "Calculated: ";

/// Timing fields derived from an item's timing text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdTiming {
    /// Start date as written, e.g. "28 May 2025"
    pub start_date: String,

    /// Start date as Unix seconds (UTC midnight); empty when the date did not parse
    #[serde(serialize_with = "empty_if_none")]
    pub start_date_timestamp: Option<i64>,

    /// Duration as written, or a `Calculated: ` rendering of now minus the start date
    pub activity_duration: String,

    /// Duration in seconds; empty when unknown
    #[serde(serialize_with = "empty_if_none")]
    pub activity_duration_timestamp: Option<i64>,

    /// The unparsed timing text
    pub start_at: String,
}

static START_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Started running on\s+(\d{1,2}\s+\w+\s+\d{4})").expect("start date pattern")
});

static ACTIVE_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Total active time\s+(.+?)(?:\s*$|·)").expect("active time pattern")
});

/// Quantity pattern and length in seconds for each unit
static UNIT_PATTERNS: LazyLock<[(Regex, i64); 4]> = LazyLock::new(|| {
    let unit = |alternatives: &str| {
        Regex::new(&format!(r"(\d+)\s*(?:{})", alternatives)).expect("duration unit pattern")
    };
    [
        (unit("days|day"), DAY),
        (unit("hours|hour|hrs|hr"), HOUR),
        (unit("minutes|minute|mins|min"), MINUTE),
        (unit("seconds|second|secs|sec"), 1),
    ]
});

/// Parses timing text using the current time for derived durations
pub fn parse_start_and_duration(raw_text: &str) -> AdTiming {
    parse_start_and_duration_at(raw_text, Utc::now())
}

/// Parses timing text, deriving missing durations relative to `now`
///
/// # Example
///
/// ```
/// use feed_harvest::extract::parse_start_and_duration;
///
/// let timing = parse_start_and_duration("Started running on 28 May 2025 · Total active time 3 hrs");
/// assert_eq!(timing.start_date, "28 May 2025");
/// assert_eq!(timing.activity_duration, "3 hrs");
/// assert_eq!(timing.activity_duration_timestamp, Some(10_800));
/// ```
pub fn parse_start_and_duration_at(raw_text: &str, now: DateTime<Utc>) -> AdTiming {
    let mut timing = AdTiming {
        start_at: raw_text.to_string(),
        ..AdTiming::default()
    };

    if raw_text.trim().is_empty() {
        return timing;
    }

    if let Some(captures) = START_DATE_PATTERN.captures(raw_text) {
        let date_text = captures[1].to_string();
        timing.start_date_timestamp = parse_start_date(&date_text);
        if timing.start_date_timestamp.is_none() {
            tracing::debug!("Unrecognized start date: {}", date_text);
        }
        timing.start_date = date_text;
    }

    if let Some(captures) = ACTIVE_TIME_PATTERN.captures(raw_text) {
        let duration_text = captures[1].trim().to_string();
        timing.activity_duration_timestamp = Some(parse_duration_to_seconds(&duration_text));
        timing.activity_duration = duration_text;
    } else if let Some(start) = timing.start_date_timestamp {
        let elapsed = now.timestamp() - start;
        timing.activity_duration = format!("{}{}", CALCULATED_PREFIX, format_duration(elapsed));
        timing.activity_duration_timestamp = Some(elapsed);
    }

    timing
}

/// Parses "28 May 2025" or "28 Sep 2025" to a UTC-midnight Unix timestamp
fn parse_start_date(text: &str) -> Option<i64> {
    ["%d %B %Y", "%d %b %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp())
}

/// Sums the day/hour/minute/second quantities found in `text`
///
/// Each unit is looked up independently; missing units count as zero, so
/// unrecognized text yields `0`.
///
/// ```
/// use feed_harvest::extract::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("1 hr 30 mins"), 5_400);
/// assert_eq!(parse_duration_to_seconds("2 days"), 172_800);
/// ```
pub fn parse_duration_to_seconds(text: &str) -> i64 {
    let lowered = text.to_lowercase();
    UNIT_PATTERNS
        .iter()
        .filter_map(|(pattern, unit_seconds)| {
            let captures = pattern.captures(&lowered)?;
            let quantity: i64 = captures[1].parse().ok()?;
            Some(quantity.saturating_mul(*unit_seconds))
        })
        .fold(0i64, i64::saturating_add)
}

/// Renders seconds as "1 year 2 months 3 days 4 hrs 5 mins"
///
/// Zero-valued units are omitted; anything under a minute (including
/// negative spans) renders as "less than 1 min".
pub fn format_duration(seconds: i64) -> String {
    const BUCKETS: [(i64, &str, &str); 5] = [
        (YEAR, "year", "years"),
        (MONTH, "month", "months"),
        (DAY, "day", "days"),
        (HOUR, "hr", "hrs"),
        (MINUTE, "min", "mins"),
    ];

    let mut remaining = seconds.max(0);
    let mut parts = Vec::new();

    for (size, singular, plural) in BUCKETS {
        let count = remaining / size;
        if count >= 1 {
            parts.push(format!(
                "{} {}",
                count,
                if count == 1 { singular } else { plural }
            ));
            remaining %= size;
        }
    }

    if parts.is_empty() {
        "less than 1 min".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MAY_28_2025: i64 = 1_748_390_400;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 6, 30, 0).unwrap()
    }

    #[test]
    fn test_start_and_explicit_duration() {
        let timing = parse_start_and_duration_at(
            "Started running on 28 May 2025 · Total active time 3 hrs",
            fixed_now(),
        );

        assert_eq!(timing.start_date, "28 May 2025");
        assert_eq!(timing.start_date_timestamp, Some(MAY_28_2025));
        assert_eq!(timing.activity_duration, "3 hrs");
        assert_eq!(timing.activity_duration_timestamp, Some(10_800));
    }

    #[test]
    fn test_abbreviated_month() {
        let timing = parse_start_and_duration_at("Started running on 3 Sep 2024", fixed_now());
        assert_eq!(timing.start_date, "3 Sep 2024");
        assert_eq!(timing.start_date_timestamp, Some(1_725_321_600));
    }

    #[test]
    fn test_derived_duration_from_start_date() {
        let now = fixed_now();
        let timing = parse_start_and_duration_at("Started running on 28 May 2025", now);

        let expected = now.timestamp() - MAY_28_2025;
        assert_eq!(timing.activity_duration_timestamp, Some(expected));
        // 5 days 6 hrs 30 mins, no zero-valued units
        assert_eq!(timing.activity_duration, "Calculated: 5 days 6 hrs 30 mins");
    }

    #[test]
    fn test_unparseable_date_keeps_raw_match() {
        let timing = parse_start_and_duration_at("Started running on 28 Smarch 2025", fixed_now());

        assert_eq!(timing.start_date, "28 Smarch 2025");
        assert_eq!(timing.start_date_timestamp, None);
        // No timestamp, so nothing to derive a duration from
        assert_eq!(timing.activity_duration, "");
        assert_eq!(timing.activity_duration_timestamp, None);
    }

    #[test]
    fn test_duration_without_start_date() {
        let timing = parse_start_and_duration_at("Total active time 2 days 4 hrs", fixed_now());
        assert_eq!(timing.start_date, "");
        assert_eq!(timing.activity_duration, "2 days 4 hrs");
        assert_eq!(timing.activity_duration_timestamp, Some(2 * DAY + 4 * HOUR));
    }

    #[test]
    fn test_garbage_and_empty_text() {
        let timing = parse_start_and_duration_at("Sponsored", fixed_now());
        assert_eq!(
            timing,
            AdTiming {
                start_at: "Sponsored".to_string(),
                ..AdTiming::default()
            }
        );

        let timing = parse_start_and_duration_at("", fixed_now());
        assert_eq!(timing, AdTiming::default());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_to_seconds("45 secs"), 45);
        assert_eq!(parse_duration_to_seconds("1 Day 1 Hour 1 Minute 1 Second"), 90_061);
        assert_eq!(parse_duration_to_seconds("a while"), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "less than 1 min");
        assert_eq!(format_duration(59), "less than 1 min");
        assert_eq!(format_duration(-300), "less than 1 min");
        assert_eq!(format_duration(60), "1 min");
        assert_eq!(format_duration(HOUR + 2 * MINUTE), "1 hr 2 mins");
        assert_eq!(format_duration(DAY), "1 day");
        assert_eq!(format_duration(YEAR + MONTH * 2), "1 year 2 months");
    }

    #[test]
    fn test_serializes_missing_numbers_as_empty_strings() {
        let timing = AdTiming {
            start_date: "28 Smarch 2025".to_string(),
            ..AdTiming::default()
        };
        let value = serde_json::to_value(&timing).unwrap();
        assert_eq!(value["start_date_timestamp"], "");
        assert_eq!(value["activity_duration_timestamp"], "");
    }
}
