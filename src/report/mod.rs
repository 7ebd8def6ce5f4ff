//! Report generation for finished post tables
//!
//! Output formatters for the post table and the opinion chart:
//!
//! - **CSV**: one row per post, spreadsheet-compatible
//! - **JSON**: the rows plus the computed summary
//! - **HTML**: static page with summary cards, the bar chart and the table
//! - **SVG**: the three-class bar chart on its own
//!
//! # Usage
//!
//! ```ignore
//! use postmood::report::{self, CollisionPolicy};
//!
//! // Format follows the extension
//! report::generate("posts.json", &records)?;
//!
//! // Refuse to clobber an existing table
//! report::emit_table(&records, "posts_table.csv", &CollisionPolicy::Abort)?;
//! report::emit_chart(&summary, "opinion_chart.svg")?;
//! ```

pub mod chart;
pub mod csv;
pub mod html;
pub mod json;

use crate::analyzer::{OpinionSummary, PostRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{} already exists", .0.display())]
    FileConflict(PathBuf),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What [`emit_table`] does when the destination already exists.
///
/// The caller decides this up front; nothing in the library prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Replace the existing file
    Overwrite,
    /// Write to this path instead. It must not exist either.
    Rename(PathBuf),
    /// Fail with [`ReportError::FileConflict`]
    Abort,
}

/// Collision handling as spelled in config files.
///
/// Unlike [`CollisionPolicy`] this carries no file name; `rename` without a
/// name is resolved by the caller (see [`timestamped_name`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictMode {
    Overwrite,
    #[default]
    Rename,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Html,
}

impl Format {
    /// Picks the format from the extension. Unknown extensions get CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "html" | "htm" => Format::Html,
            "json" => Format::Json,
            _ => Format::Csv,
        }
    }
}

/// Write the table to `path` in the format its extension names, replacing
/// any existing file.
pub fn generate<P: AsRef<Path>>(path: P, records: &[PostRecord]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let file = create(path, false)?;
    write_table(file, path, records)
}

/// Write the table to `destination`, resolving a name collision with `policy`.
///
/// Returns the path actually written.
pub fn emit_table<P: AsRef<Path>>(
    records: &[PostRecord],
    destination: P,
    policy: &CollisionPolicy,
) -> Result<PathBuf, ReportError> {
    let destination = destination.as_ref();

    let (target, exclusive) = match policy {
        CollisionPolicy::Overwrite => (destination, false),
        CollisionPolicy::Abort => (destination, true),
        CollisionPolicy::Rename(new_name) if destination.exists() => (new_name.as_path(), true),
        CollisionPolicy::Rename(_) => (destination, true),
    };

    let file = create(target, exclusive)?;
    write_table(file, target, records)?;

    info!(path = %target.display(), rows = records.len(), "wrote post table");
    Ok(target.to_path_buf())
}

/// Write the opinion bar chart. `.html`/`.htm` wraps it in a page, anything
/// else is written as SVG. Existing files are replaced.
pub fn emit_chart<P: AsRef<Path>>(summary: &OpinionSummary, destination: P) -> Result<PathBuf, ReportError> {
    let destination = destination.as_ref();
    let file = create(destination, false)?;
    let mut writer = BufWriter::new(file);

    let result = match Format::from_path(destination) {
        Format::Html => html::write_chart(&mut writer, summary),
        _ => chart::write(&mut writer, summary),
    }
    .and_then(|_| writer.flush());
    result.map_err(|source| ReportError::Io {
        path: destination.to_path_buf(),
        source,
    })?;

    info!(path = %destination.display(), "wrote opinion chart");
    Ok(destination.to_path_buf())
}

/// `dir/name.ext` becomes `dir/name_YYYYmmdd_HHMMSS.ext`.
pub fn timestamped_name(path: &Path, at: NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, at.format("%Y%m%d_%H%M%S"));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

fn create(path: &Path, exclusive: bool) -> Result<File, ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    options.open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            ReportError::FileConflict(path.to_path_buf())
        } else {
            io_error(source)
        }
    })
}

fn write_table(file: File, path: &Path, records: &[PostRecord]) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(file);

    let result = match Format::from_path(path) {
        Format::Html => html::write(&mut writer, records),
        Format::Json => json::write(&mut writer, records),
        Format::Csv => csv::write(&mut writer, records),
    }
    .and_then(|_| writer.flush());

    result.map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analyzer::SentimentClass;
    use chrono::{NaiveDate, TimeZone, Utc};

    // ==========================================================================
    // TEST HELPERS
    // ==========================================================================

    pub(crate) fn record(id: u64, text: &str, sentiment: SentimentClass) -> PostRecord {
        PostRecord {
            id,
            text: text.to_string(),
            text_length: text.chars().count(),
            created_at: Utc.with_ymd_and_hms(2020, 6, 2, 15, 30, 0).unwrap(),
            source: "Sprinklr".to_string(),
            like_count: id * 10,
            retweet_count: id,
            sentiment,
        }
    }

    pub(crate) fn sample() -> Vec<PostRecord> {
        vec![
            record(1, "love this agent", SentimentClass::Positive),
            record(2, "patch notes are up", SentimentClass::Neutral),
            record(3, "worst update ever", SentimentClass::Negative),
        ]
    }

    // ==========================================================================
    // FORMAT SELECTION
    // ==========================================================================

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.csv")), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.htm")), Format::Html);
        assert_eq!(Format::from_path(Path::new("a.txt")), Format::Csv);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Csv);
    }

    #[test]
    fn test_generate_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reports").join("t.json");

        generate(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"positive_count\": 1"));
    }

    #[test]
    fn test_generate_summary_follows_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        let records = sample();

        generate(&path, &records[..2]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["weighted_opinion_score"], 12.0);

        generate(&path, &records).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        // 12 - (30 + 2 * 3)
        assert_eq!(json["summary"]["weighted_opinion_score"], -24.0);
        assert_eq!(json["posts"].as_array().unwrap().len(), 3);
    }

    // ==========================================================================
    // COLLISION POLICY
    // ==========================================================================

    #[test]
    fn test_fresh_destination_written_under_every_policy() {
        let dir = tempfile::tempdir().unwrap();
        let policies = [
            CollisionPolicy::Overwrite,
            CollisionPolicy::Abort,
            CollisionPolicy::Rename(dir.path().join("never-used.csv")),
        ];

        for (i, policy) in policies.iter().enumerate() {
            let dest = dir.path().join(format!("t{}.csv", i));
            let written = emit_table(&sample(), &dest, policy).unwrap();
            assert_eq!(written, dest);
            assert!(dest.exists());
        }
        assert!(!dir.path().join("never-used.csv").exists());
    }

    #[test]
    fn test_overwrite_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("posts_table.csv");
        fs::write(&dest, "stale").unwrap();

        emit_table(&sample(), &dest, &CollisionPolicy::Overwrite).unwrap();

        let content = fs::read_to_string(&dest).unwrap();
        assert!(content.starts_with("index,text,id,len,date,source,likes,retweets,sentiment"));
    }

    #[test]
    fn test_abort_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("posts_table.csv");
        fs::write(&dest, "keep me").unwrap();

        let err = emit_table(&sample(), &dest, &CollisionPolicy::Abort).unwrap_err();

        assert!(matches!(err, ReportError::FileConflict(ref p) if *p == dest));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me");
    }

    #[test]
    fn test_rename_writes_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("posts_table.csv");
        let renamed = dir.path().join("posts_table_2.csv");
        fs::write(&dest, "keep me").unwrap();

        let written = emit_table(&sample(), &dest, &CollisionPolicy::Rename(renamed.clone())).unwrap();

        assert_eq!(written, renamed);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me");
        assert_eq!(fs::read_to_string(&renamed).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_rename_to_existing_name_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("posts_table.csv");
        let renamed = dir.path().join("other.csv");
        fs::write(&dest, "a").unwrap();
        fs::write(&renamed, "b").unwrap();

        let err = emit_table(&sample(), &dest, &CollisionPolicy::Rename(renamed.clone())).unwrap_err();

        assert!(matches!(err, ReportError::FileConflict(ref p) if *p == renamed));
        assert_eq!(fs::read_to_string(&renamed).unwrap(), "b");
    }

    #[test]
    fn test_conflict_message_names_path() {
        let err = ReportError::FileConflict(PathBuf::from("out/posts_table.csv"));
        assert_eq!(err.to_string(), "out/posts_table.csv already exists");
    }

    #[test]
    fn test_conflict_mode_names() {
        let mode: ConflictMode = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(mode, ConflictMode::Overwrite);
        assert_eq!(ConflictMode::default(), ConflictMode::Rename);
    }

    // ==========================================================================
    // CHART
    // ==========================================================================

    #[test]
    fn test_emit_chart_svg_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let summary = OpinionSummary::from_records(&sample()).unwrap();

        let svg = emit_chart(&summary, dir.path().join("chart.svg")).unwrap();
        assert!(fs::read_to_string(svg).unwrap().starts_with("<svg"));

        let page = emit_chart(&summary, dir.path().join("chart.html")).unwrap();
        let content = fs::read_to_string(page).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.contains("<svg"));
    }

    // ==========================================================================
    // NAMING
    // ==========================================================================

    #[test]
    fn test_timestamped_name() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(9, 3, 7).unwrap();

        assert_eq!(
            timestamped_name(Path::new("reports/posts_table.csv"), at),
            PathBuf::from("reports/posts_table_20240517_090307.csv")
        );
        assert_eq!(timestamped_name(Path::new("table"), at), PathBuf::from("table_20240517_090307"));
    }
}
