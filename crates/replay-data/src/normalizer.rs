//! Raw record normalization.
//!
//! Turns [`RawPlayRecord`]s into the flat [`PlayRecord`] set the rest of the
//! pipeline operates on: platform string tokenized into system/device,
//! timestamp split into date and hour-of-day, content type derived from the
//! episode field. The base set is built once per session; filtering later
//! materializes views over it without touching it.

use tracing::{debug, warn};

use replay_core::models::{ContentType, PlayRecord, RawPlayRecord};
use replay_core::platform::PlatformParser;
use replay_core::time_utils::TimezoneHandler;

/// Result of normalizing a raw record set.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// The normalized records, in input order.
    pub records: Vec<PlayRecord>,
    /// Records dropped because their timestamp was missing or unparseable.
    pub dropped: usize,
}

/// Normalize `raw` into [`PlayRecord`]s.
///
/// A record whose `ts` is absent or fails to parse is dropped and counted;
/// the caller surfaces that count. Missing or negative `ms_played` becomes 0.
/// Date and hour are derived in the handler's display timezone.
pub fn normalize(raw: &[RawPlayRecord], tz: &TimezoneHandler) -> NormalizeOutcome {
    let parser = PlatformParser::new();
    let mut outcome = NormalizeOutcome::default();

    for record in raw {
        match normalize_record(record, &parser, tz) {
            Some(play) => outcome.records.push(play),
            None => outcome.dropped += 1,
        }
    }

    if outcome.dropped > 0 {
        warn!(
            "Dropped {} records with missing or unparseable timestamps",
            outcome.dropped
        );
    }

    outcome
}

/// Map one raw record, returning `None` when the timestamp is unusable.
fn normalize_record(
    raw: &RawPlayRecord,
    parser: &PlatformParser,
    tz: &TimezoneHandler,
) -> Option<PlayRecord> {
    let ts = raw.ts.as_deref()?;
    let instant = match tz.parse_timestamp(ts) {
        Some(dt) => dt,
        None => {
            debug!("Unparseable timestamp: {:?}", ts);
            return None;
        }
    };
    // The combined timestamp is not retained past this point; only the
    // calendar fields travel downstream.
    let (date, hour) = tz.local_date_hour(instant);

    let platform = raw
        .platform
        .as_deref()
        .map(|p| parser.parse(p))
        .unwrap_or_default();

    let content_type = if raw.episode_name.as_deref().is_some_and(|e| !e.is_empty()) {
        ContentType::Podcast
    } else {
        ContentType::Song
    };

    Some(PlayRecord {
        date,
        hour,
        duration_ms: raw.ms_played.unwrap_or(0).max(0) as u64,
        system: platform.system,
        device: platform.device,
        content_type,
        artist: non_empty(raw.artist_name.as_deref()),
        track: non_empty(raw.track_name.as_deref()),
        episode_show: non_empty(raw.episode_show_name.as_deref()),
        episode_name: non_empty(raw.episode_name.as_deref()),
        country: non_empty(raw.conn_country.as_deref()),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
