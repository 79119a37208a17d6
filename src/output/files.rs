//! Result files: raw HTML, pretty JSON and CSV
//!
//! All three share a base name `<prefix>_<keyword>_<YYYYmmdd_HHMMSS>` inside
//! the configured output directory. When files with that name already exist
//! a `_2`, `_3`, ... suffix is added so earlier results are never overwritten.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::acquisition::Snapshot;
use crate::config::OutputConfig;
use crate::extract::AdRecord;
use crate::output::csv::format_csv;
use crate::output::OutputResult;

const OUTPUT_EXTENSIONS: [&str; 3] = ["html", "json", "csv"];

/// Paths of the files written for one keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub html: PathBuf,
    pub json: PathBuf,
    /// Absent when there were no records
    pub csv: Option<PathBuf>,
}

/// Keeps alphanumerics, spaces, `-` and `_`, drops trailing spaces, then turns spaces into `_`
///
/// ```
/// use feed_harvest::output::sanitize_keyword;
///
/// assert_eq!(sanitize_keyword("running shoes / sale!"), "running_shoes__sale");
/// ```
pub fn sanitize_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
}

/// Base file name (without extension) for a keyword captured at `timestamp`
pub fn safe_filename(prefix: &str, keyword: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        sanitize_keyword(keyword),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Writes the snapshot markup and the extracted records for one keyword
///
/// # Arguments
///
/// * `config` - Output directory and file prefix
/// * `keyword` - Keyword the records were gathered for
/// * `snapshot` - Captured page; its capture time names the files
/// * `records` - Extracted records
///
/// # Returns
///
/// * `Ok(WrittenFiles)` - Paths of the files that were written
/// * `Err(OutputError)` - A file could not be created or serialized
pub fn write_outputs(
    config: &OutputConfig,
    keyword: &str,
    snapshot: &Snapshot,
    records: &[AdRecord],
) -> OutputResult<WrittenFiles> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;

    let base = unused_base(
        directory,
        &safe_filename(&config.file_prefix, keyword, snapshot.captured_at()),
    );
    let path_for = |extension: &str| directory.join(format!("{}.{}", base, extension));

    let html = path_for("html");
    fs::write(&html, snapshot.markup())?;
    tracing::info!("HTML saved to {}", html.display());

    let json = path_for("json");
    write_json(&json, records)?;
    tracing::info!("JSON saved to {}", json.display());

    let csv = if records.is_empty() {
        tracing::info!("No records for '{}', skipping CSV", keyword);
        None
    } else {
        let path = path_for("csv");
        fs::write(&path, format_csv(records)?)?;
        tracing::info!("CSV saved to {} ({} records)", path.display(), records.len());
        Some(path)
    };

    Ok(WrittenFiles { html, json, csv })
}

/// First of `base`, `base_2`, `base_3`, ... with no result file in `directory`
fn unused_base(directory: &Path, base: &str) -> String {
    let taken = |candidate: &str| {
        OUTPUT_EXTENSIONS
            .iter()
            .any(|ext| directory.join(format!("{}.{}", candidate, ext)).exists())
    };
    if !taken(base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            tracing::debug!("{} already used, writing to {}", base, candidate);
            return candidate;
        }
        n += 1;
    }
}

/// Writes records as pretty-printed JSON
pub fn write_json(path: &Path, records: &[AdRecord]) -> OutputResult<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RecordExtractor;
    use crate::Config;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><body><div class="xrvj5dj"><div>
        <div class="x1rg5ohu"><span class="xw23nyj">Library ID: 7</span></div>
    </div></div></body></html>"#;

    fn create_test_config(dir: &TempDir) -> OutputConfig {
        OutputConfig {
            directory: dir.path().join("out").to_string_lossy().into_owned(),
            file_prefix: "ads".to_string(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::captured(PAGE, Utc.with_ymd_and_hms(2025, 6, 2, 6, 30, 5).unwrap())
    }

    #[test]
    fn test_sanitize_keyword() {
        assert_eq!(sanitize_keyword("coffee"), "coffee");
        assert_eq!(sanitize_keyword("new-in_stock  "), "new-in_stock");
        assert_eq!(sanitize_keyword("a/b\\c"), "abc");
        assert_eq!(sanitize_keyword("café crème"), "café_crème");
    }

    #[test]
    fn test_safe_filename() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 9, 14, 5, 0).unwrap();
        assert_eq!(safe_filename("ads", "big sale", ts), "ads_big_sale_20250109_140500");
    }

    #[test]
    fn test_write_outputs() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);
        let extractor = RecordExtractor::new(&Config::default()).unwrap();
        let records = extractor.extract_all(&snapshot(), "tea");

        let written = write_outputs(&config, "tea", &snapshot(), &records).unwrap();

        assert_eq!(
            written.html.file_name().unwrap().to_str().unwrap(),
            "ads_tea_20250602_063005.html"
        );
        assert_eq!(fs::read_to_string(&written.html).unwrap(), PAGE);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written.json).unwrap()).unwrap();
        assert_eq!(json[0]["library_id"], "7");
        assert_eq!(json[0]["start_date_timestamp"], "");
        assert_eq!(json[0]["keyword"], "tea");

        let csv = fs::read_to_string(written.csv.unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_colliding_names_keep_earlier_files() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);
        let extractor = RecordExtractor::new(&Config::default()).unwrap();

        let first = write_outputs(
            &config,
            "a/b",
            &snapshot(),
            &extractor.extract_all(&snapshot(), "a/b"),
        )
        .unwrap();
        let second = write_outputs(
            &config,
            "ab",
            &snapshot(),
            &extractor.extract_all(&snapshot(), "ab"),
        )
        .unwrap();

        assert_eq!(
            first.html.file_name().unwrap().to_str().unwrap(),
            "ads_ab_20250602_063005.html"
        );
        assert_eq!(
            second.html.file_name().unwrap().to_str().unwrap(),
            "ads_ab_20250602_063005_2.html"
        );
        assert_eq!(
            second.csv.as_ref().unwrap().file_name().unwrap().to_str().unwrap(),
            "ads_ab_20250602_063005_2.csv"
        );

        let keyword_in = |path: &Path| {
            let json: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            json[0]["keyword"].as_str().unwrap().to_string()
        };
        assert_eq!(keyword_in(&first.json), "a/b");
        assert_eq!(keyword_in(&second.json), "ab");
    }

    #[test]
    fn test_no_records_skips_csv() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);

        let written = write_outputs(&config, "tea", &snapshot(), &[]).unwrap();
        assert!(written.csv.is_none());
        assert_eq!(fs::read_to_string(&written.json).unwrap(), "[]");
    }
}
