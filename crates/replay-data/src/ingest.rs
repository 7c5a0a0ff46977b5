//! End-to-end ingestion of a streaming-history export.
//!
//! Ties discovery, reading, and normalization together into one call that
//! runs once per session. The resulting base record set is sorted and
//! immutable; everything after this point is filter-and-aggregate over it.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use replay_core::models::PlayRecord;
use replay_core::time_utils::TimezoneHandler;
use replay_core::{ReplayError, Result};

use crate::normalizer;
use crate::reader;

// ── Input format ──────────────────────────────────────────────────────────────

/// How the data path should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Decide from the path: a `.csv` file is CSV, anything else is treated
    /// as a JSON export (file or directory of files).
    #[default]
    Auto,
    /// One or more JSON export files.
    Json,
    /// A single pre-normalized CSV file.
    Csv,
}

impl InputFormat {
    /// Parse the `--format` CLI value. Unknown values fall back to `Auto`.
    pub fn from_arg(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => InputFormat::Json,
            "csv" => InputFormat::Csv,
            _ => InputFormat::Auto,
        }
    }

    fn resolve(self, path: &Path) -> Self {
        match self {
            InputFormat::Auto => {
                let is_csv = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
                if is_csv {
                    InputFormat::Csv
                } else {
                    InputFormat::Json
                }
            }
            other => other,
        }
    }
}

// ── Ingestion ─────────────────────────────────────────────────────────────────

/// Bookkeeping from one ingestion run, shown in the dashboard footer and the
/// session log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestMetadata {
    /// Number of source files read.
    pub files_read: usize,
    /// Records that made it into the base set.
    pub records_read: usize,
    /// Records dropped for malformed content or unusable timestamps.
    pub records_dropped: usize,
    /// Wall-clock load time.
    pub load_time_seconds: f64,
}

/// The session's base record set plus load metadata.
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// Normalized records sorted by (date, hour).
    pub records: Vec<PlayRecord>,
    pub metadata: IngestMetadata,
}

/// Load, normalize, and sort the history at `data_path`.
///
/// For JSON input the path may be a single file or a directory searched
/// recursively; files are concatenated in sorted path order. For CSV input
/// it must be a single file. Fails when the path does not exist or when no
/// usable files are found under it.
pub fn ingest_history(
    data_path: &Path,
    format: InputFormat,
    tz: &TimezoneHandler,
) -> Result<IngestResult> {
    if !data_path.exists() {
        return Err(ReplayError::DataPathNotFound(data_path.to_path_buf()));
    }

    let start = Instant::now();
    let format = format.resolve(data_path);
    debug!("Ingesting {} as {:?}", data_path.display(), format);

    let (records, files_read, dropped) = match format {
        InputFormat::Csv => {
            let outcome = reader::load_csv_records(data_path)?;
            (outcome.records, 1, outcome.dropped)
        }
        _ => {
            let files = if data_path.is_file() {
                vec![data_path.to_path_buf()]
            } else {
                reader::find_export_files(data_path)
            };
            if files.is_empty() {
                return Err(ReplayError::NoDataFiles(data_path.to_path_buf()));
            }

            let raw = reader::load_raw_records(&files);
            if raw.files_read == 0 {
                return Err(ReplayError::NoDataFiles(data_path.to_path_buf()));
            }
            let normalized = normalizer::normalize(&raw.records, tz);
            (
                normalized.records,
                raw.files_read,
                raw.malformed + normalized.dropped,
            )
        }
    };

    let mut records = records;
    records.sort_by_key(|r| (r.date, r.hour));

    let metadata = IngestMetadata {
        files_read,
        records_read: records.len(),
        records_dropped: dropped,
        load_time_seconds: start.elapsed().as_secs_f64(),
    };
    info!(
        "Loaded {} records from {} file(s) in {:.2}s ({} dropped)",
        metadata.records_read, metadata.files_read, metadata.load_time_seconds,
        metadata.records_dropped
    );

    Ok(IngestResult { records, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn json_record(ts: &str, artist: &str) -> serde_json::Value {
        serde_json::json!({
            "ts": ts,
            "platform": "android (Pixel5)",
            "ms_played": 120000,
            "conn_country": "SE",
            "master_metadata_track_name": "T",
            "master_metadata_album_artist_name": artist,
            "episode_name": null,
            "episode_show_name": null,
        })
    }

    #[test]
    fn test_ingest_json_directory() {
        let dir = TempDir::new().unwrap();
        let content = serde_json::to_string(&vec![
            json_record("2023-06-02T10:00:00Z", "B"),
            json_record("2023-06-01T10:00:00Z", "A"),
        ])
        .unwrap();
        fs::write(dir.path().join("Streaming_History_Audio_0.json"), content).unwrap();

        let result =
            ingest_history(dir.path(), InputFormat::Auto, &TimezoneHandler::default()).unwrap();

        assert_eq!(result.records.len(), 2);
        // Sorted by date regardless of file order.
        assert_eq!(result.records[0].artist.as_deref(), Some("A"));
        assert_eq!(result.metadata.files_read, 1);
        assert_eq!(result.metadata.records_dropped, 0);
    }

    #[test]
    fn test_ingest_single_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            serde_json::to_string(&vec![json_record("2023-06-01T10:00:00Z", "A")]).unwrap(),
        )
        .unwrap();

        let result =
            ingest_history(&path, InputFormat::Auto, &TimezoneHandler::default()).unwrap();
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_ingest_csv_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "date,hour,ms_played,system,device,type,artist,track,episode_show,episode_name,country\n\
             2023-06-01,10,120000,ANDROID,PIXEL5,Song,A,T,,,SE\n",
        )
        .unwrap();

        let result =
            ingest_history(&path, InputFormat::Auto, &TimezoneHandler::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].artist.as_deref(), Some("A"));
        assert_eq!(result.metadata.files_read, 1);
    }

    #[test]
    fn test_ingest_counts_dropped_records() {
        let dir = TempDir::new().unwrap();
        let mut bad = json_record("garbage", "A");
        bad["ts"] = serde_json::Value::String("garbage".to_string());
        let content = serde_json::to_string(&vec![
            json_record("2023-06-01T10:00:00Z", "A"),
            bad,
        ])
        .unwrap();
        fs::write(dir.path().join("export.json"), content).unwrap();

        let result =
            ingest_history(dir.path(), InputFormat::Json, &TimezoneHandler::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.metadata.records_dropped, 1);
    }

    #[test]
    fn test_ingest_missing_path_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = ingest_history(&missing, InputFormat::Auto, &TimezoneHandler::default())
            .unwrap_err();
        assert!(matches!(err, ReplayError::DataPathNotFound(_)));
    }

    #[test]
    fn test_ingest_empty_directory_errors() {
        let dir = TempDir::new().unwrap();
        let err = ingest_history(dir.path(), InputFormat::Json, &TimezoneHandler::default())
            .unwrap_err();
        assert!(matches!(err, ReplayError::NoDataFiles(_)));
    }

    #[test]
    fn test_input_format_from_arg() {
        assert_eq!(InputFormat::from_arg("json"), InputFormat::Json);
        assert_eq!(InputFormat::from_arg("CSV"), InputFormat::Csv);
        assert_eq!(InputFormat::from_arg("auto"), InputFormat::Auto);
        assert_eq!(InputFormat::from_arg("bogus"), InputFormat::Auto);
    }
}
