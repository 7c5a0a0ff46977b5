//! Export file discovery and loading for Replay.
//!
//! Reads the JSON files of a streaming-history export (array-form or
//! line-delimited) and the pre-cleaned CSV used by the simpler dashboard
//! variant, converting them into raw or normalized records for downstream
//! processing.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use replay_core::models::{ContentType, PlayRecord, RawPlayRecord};
use replay_core::{ReplayError, Result};

// ── JSON export loading ───────────────────────────────────────────────────────

/// Find all `.json` files recursively under `data_path`, sorted by path.
///
/// Upload order in the original tool is file order; sorting by path keeps
/// the concatenation deterministic (exports number their files).
pub fn find_export_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// The concatenated raw record set from one or more export files.
#[derive(Debug, Default)]
pub struct RawLoadOutcome {
    /// Raw records in file order.
    pub records: Vec<RawPlayRecord>,
    /// Number of files successfully opened.
    pub files_read: usize,
    /// Number of entries skipped because they were not valid record objects.
    pub malformed: usize,
}

/// Load and concatenate raw records from `files` in the given order.
///
/// Each file may be a single JSON array of record objects or line-delimited
/// JSON. Unreadable files are logged and skipped; malformed entries are
/// counted but do not abort the load.
pub fn load_raw_records(files: &[PathBuf]) -> RawLoadOutcome {
    let mut outcome = RawLoadOutcome::default();

    for file_path in files {
        let content = match std::fs::read_to_string(file_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read file {}: {}", file_path.display(), e);
                continue;
            }
        };
        outcome.files_read += 1;

        let (records, malformed) = parse_export_content(&content);
        debug!(
            "File {}: {} records, {} malformed",
            file_path.display(),
            records.len(),
            malformed,
        );
        outcome.records.extend(records);
        outcome.malformed += malformed;
    }

    outcome
}

/// Parse one export file body, accepting array-form JSON or JSONL.
fn parse_export_content(content: &str) -> (Vec<RawPlayRecord>, usize) {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return (Vec::new(), 0);
    }

    // Array-form export file.
    if trimmed.starts_with('[') {
        if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            let mut records = Vec::with_capacity(values.len());
            let mut malformed = 0usize;
            for value in values {
                match serde_json::from_value::<RawPlayRecord>(value) {
                    Ok(r) => records.push(r),
                    Err(e) => {
                        debug!("Skipping malformed array entry: {}", e);
                        malformed += 1;
                    }
                }
            }
            return (records, malformed);
        }
        // Unparseable as an array; fall through to line mode so a truncated
        // file still yields its intact lines.
    }

    let mut records = Vec::new();
    let mut malformed = 0usize;
    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawPlayRecord>(line) {
            Ok(r) => records.push(r),
            Err(e) => {
                debug!("Skipping malformed line: {}", e);
                malformed += 1;
            }
        }
    }
    (records, malformed)
}

// ── CSV variant ───────────────────────────────────────────────────────────────

/// One row of the pre-cleaned CSV, which already carries normalized fields.
#[derive(Debug, Deserialize)]
struct CsvPlayRow {
    date: String,
    hour: u8,
    ms_played: u64,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    device: Option<String>,
    #[serde(rename = "type")]
    content_type: ContentType,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    episode_show: Option<String>,
    #[serde(default)]
    episode_name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Outcome of loading the pre-cleaned CSV variant.
#[derive(Debug, Default)]
pub struct CsvLoadOutcome {
    pub records: Vec<PlayRecord>,
    /// Rows dropped because they failed to deserialize or carried an
    /// unparseable date.
    pub dropped: usize,
}

/// Load a single pre-normalized CSV into [`PlayRecord`]s.
///
/// Rows that fail to deserialize are dropped with a count, consistent with
/// the JSON pipeline's timestamp policy.
pub fn load_csv_records(path: &Path) -> Result<CsvLoadOutcome> {
    let file = std::fs::File::open(path).map_err(|source| ReplayError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let mut outcome = CsvLoadOutcome::default();

    for row in reader.deserialize::<CsvPlayRow>() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping malformed CSV row: {}", e);
                outcome.dropped += 1;
                continue;
            }
        };
        match csv_row_to_record(row) {
            Some(record) => outcome.records.push(record),
            None => outcome.dropped += 1,
        }
    }

    if outcome.dropped > 0 {
        warn!(
            "Dropped {} unparseable rows from {}",
            outcome.dropped,
            path.display()
        );
    }

    Ok(outcome)
}

/// Convert one CSV row, returning `None` when the date or hour is invalid.
fn csv_row_to_record(row: CsvPlayRow) -> Option<PlayRecord> {
    let date: NaiveDate = row.date.parse().ok()?;
    if row.hour > 23 {
        return None;
    }
    Some(PlayRecord {
        date,
        hour: row.hour,
        duration_ms: row.ms_played,
        system: non_empty(row.system),
        device: non_empty(row.device),
        content_type: row.content_type,
        artist: non_empty(row.artist),
        track: non_empty(row.track),
        episode_show: non_empty(row.episode_show),
        episode_name: non_empty(row.episode_name),
        country: non_empty(row.country),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
