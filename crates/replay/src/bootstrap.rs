use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.replay/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.replay/`
/// - `~/.replay/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let replay_dir = home.join(".replay");
    std::fs::create_dir_all(&replay_dir)?;
    std::fs::create_dir_all(replay_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate a streaming-history export on the local system.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./Spotify Extended Streaming History/`
/// 2. `./MyData/`
/// 3. `~/Downloads/Spotify Extended Streaming History/`
///
/// Returns `None` when none exist; the user then has to pass `--data-path`.
pub fn discover_data_path() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("Spotify Extended Streaming History"),
        PathBuf::from("MyData"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(
            home.join("Downloads")
                .join("Spotify Extended Streaming History"),
        );
    }
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
