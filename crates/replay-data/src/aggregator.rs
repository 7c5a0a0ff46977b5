//! Aggregate tables over a filtered record view.
//!
//! Every user interaction re-runs the full pipeline synchronously: filter,
//! then [`aggregate`]. All rows carry raw summed milliseconds; unit
//! conversions (minutes, hours, days) are computed on demand and only rounded
//! at presentation time, so chained aggregations never compound rounding
//! error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use replay_core::formatting::format_hours;
use replay_core::models::PlayRecord;

/// Default row cap for the artist and track breakdowns.
pub const TOP_N: usize = 20;

const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

// ── Row types ─────────────────────────────────────────────────────────────────

/// Headline numbers for a filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryStats {
    /// Total milliseconds played across the view.
    pub total_ms: u64,
    /// Number of play records in the view.
    pub play_count: usize,
    /// Distinct artist names (records with no artist excluded).
    pub unique_artists: usize,
    /// Distinct track titles.
    pub unique_tracks: usize,
    /// Distinct podcast show names.
    pub unique_shows: usize,
    /// Distinct podcast episode titles.
    pub unique_episodes: usize,
}

impl SummaryStats {
    pub fn minutes(&self) -> f64 {
        self.total_ms as f64 / MS_PER_MINUTE
    }

    pub fn hours(&self) -> f64 {
        self.total_ms as f64 / MS_PER_HOUR
    }

    pub fn days(&self) -> f64 {
        self.hours() / 24.0
    }
}

/// One day of the densified time series. Days without plays are present
/// with `ms_played == 0`, never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPlay {
    pub date: NaiveDate,
    pub ms_played: u64,
}

impl DailyPlay {
    pub fn minutes(&self) -> f64 {
        self.ms_played as f64 / MS_PER_MINUTE
    }

    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / MS_PER_HOUR
    }
}

/// One calendar year of the rollup. Every year spanned by the daily series
/// appears, even when entirely zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyPlay {
    pub year: i32,
    pub ms_played: u64,
}

impl YearlyPlay {
    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / MS_PER_HOUR
    }

    pub fn days(&self) -> f64 {
        self.hours() / 24.0
    }
}

/// One hour-of-day bucket. Hours with no plays are absent, an intentional
/// asymmetry with the daily series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyPlay {
    pub hour: u8,
    pub ms_played: u64,
}

impl HourlyPlay {
    pub fn minutes(&self) -> f64 {
        self.ms_played as f64 / MS_PER_MINUTE
    }
}

/// One row of the top-artist breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopArtist {
    pub artist: String,
    pub ms_played: u64,
}

impl TopArtist {
    pub fn minutes(&self) -> f64 {
        self.ms_played as f64 / MS_PER_MINUTE
    }

    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / MS_PER_HOUR
    }
}

/// One row of the top-track breakdown, keyed by (artist, track) so that
/// identically named tracks by different artists stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTrack {
    pub artist: String,
    pub track: String,
    pub ms_played: u64,
}

impl TopTrack {
    pub fn minutes(&self) -> f64 {
        self.ms_played as f64 / MS_PER_MINUTE
    }

    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / MS_PER_HOUR
    }

    /// Display label combining the artist with formatted hours played.
    pub fn label(&self) -> String {
        format!("{} ({})", self.artist, format_hours(self.hours()))
    }
}

/// Everything the dashboard renders for one filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    pub summary: SummaryStats,
    pub daily: Vec<DailyPlay>,
    pub yearly: Vec<YearlyPlay>,
    pub hourly: Vec<HourlyPlay>,
    pub top_artists: Vec<TopArtist>,
    pub top_tracks: Vec<TopTrack>,
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Compute the full report with the default top-N cap.
pub fn aggregate(records: &[PlayRecord]) -> AggregateReport {
    aggregate_with_top_n(records, TOP_N)
}

/// Compute the full report, capping the artist and track breakdowns at
/// `top_n` rows. An empty view yields a zeroed summary and empty tables.
pub fn aggregate_with_top_n(records: &[PlayRecord], top_n: usize) -> AggregateReport {
    let daily = daily_series(records);
    let yearly = yearly_rollup(&daily);
    AggregateReport {
        summary: summarize(records),
        daily,
        yearly,
        hourly: hourly_histogram(records),
        top_artists: top_artists(records, top_n),
        top_tracks: top_tracks(records, top_n),
    }
}

/// Summary statistics: total duration, play count, distinct identity counts.
pub fn summarize(records: &[PlayRecord]) -> SummaryStats {
    let mut artists = BTreeSet::new();
    let mut tracks = BTreeSet::new();
    let mut shows = BTreeSet::new();
    let mut episodes = BTreeSet::new();
    let mut total_ms: u64 = 0;

    for record in records {
        total_ms += record.duration_ms;
        if let Some(artist) = &record.artist {
            artists.insert(artist.as_str());
        }
        if let Some(track) = &record.track {
            tracks.insert(track.as_str());
        }
        if let Some(show) = &record.episode_show {
            shows.insert(show.as_str());
        }
        if let Some(episode) = &record.episode_name {
            episodes.insert(episode.as_str());
        }
    }

    SummaryStats {
        total_ms,
        play_count: records.len(),
        unique_artists: artists.len(),
        unique_tracks: tracks.len(),
        unique_shows: shows.len(),
        unique_episodes: episodes.len(),
    }
}

/// Duration summed per calendar day, densified over the full date range of
/// the view: every day from the minimum to the maximum date appears, with an
/// explicit zero row where nothing was played.
pub fn daily_series(records: &[PlayRecord]) -> Vec<DailyPlay> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *by_date.entry(record.date).or_insert(0) += record.duration_ms;
    }

    let (Some((&min, _)), Some((&max, _))) =
        (by_date.first_key_value(), by_date.last_key_value())
    else {
        return Vec::new();
    };

    min.iter_days()
        .take_while(|day| *day <= max)
        .map(|date| DailyPlay {
            date,
            ms_played: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Yearly totals grouped from the densified daily series, so every year the
/// series spans appears even if its total is zero.
pub fn yearly_rollup(daily: &[DailyPlay]) -> Vec<YearlyPlay> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    for row in daily {
        *by_year.entry(row.date.year()).or_insert(0) += row.ms_played;
    }
    by_year
        .into_iter()
        .map(|(year, ms_played)| YearlyPlay { year, ms_played })
        .collect()
}

/// Duration summed per hour of day. Hours with no plays are simply absent.
pub fn hourly_histogram(records: &[PlayRecord]) -> Vec<HourlyPlay> {
    let mut by_hour: BTreeMap<u8, u64> = BTreeMap::new();
    for record in records {
        *by_hour.entry(record.hour).or_insert(0) += record.duration_ms;
    }
    by_hour
        .into_iter()
        .map(|(hour, ms_played)| HourlyPlay { hour, ms_played })
        .collect()
}

/// Top artists by summed duration, descending, ties broken by name.
pub fn top_artists(records: &[PlayRecord], top_n: usize) -> Vec<TopArtist> {
    let mut by_artist: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        if let Some(artist) = &record.artist {
            *by_artist.entry(artist.as_str()).or_insert(0) += record.duration_ms;
        }
    }

    let mut rows: Vec<TopArtist> = by_artist
        .into_iter()
        .map(|(artist, ms_played)| TopArtist {
            artist: artist.to_string(),
            ms_played,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.ms_played
            .cmp(&a.ms_played)
            .then_with(|| a.artist.cmp(&b.artist))
    });
    rows.truncate(top_n);
    rows
}

/// Top tracks by summed duration, keyed by (artist, track), descending,
/// ties broken by the pair lexicographically.
pub fn top_tracks(records: &[PlayRecord], top_n: usize) -> Vec<TopTrack> {
    let mut by_pair: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for record in records {
        if let (Some(artist), Some(track)) = (&record.artist, &record.track) {
            *by_pair
                .entry((artist.as_str(), track.as_str()))
                .or_insert(0) += record.duration_ms;
        }
    }

    let mut rows: Vec<TopTrack> = by_pair
        .into_iter()
        .map(|((artist, track), ms_played)| TopTrack {
            artist: artist.to_string(),
            track: track.to_string(),
            ms_played,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.ms_played
            .cmp(&a.ms_played)
            .then_with(|| (&a.artist, &a.track).cmp(&(&b.artist, &b.track)))
    });
    rows.truncate(top_n);
    rows
}

// ── Tests ─────────────────────────────────────────────────────────────────────
