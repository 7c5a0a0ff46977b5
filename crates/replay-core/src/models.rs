use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Raw export records ────────────────────────────────────────────────────────

/// One line of a Spotify extended streaming-history export, as shipped.
///
/// Only the analytically useful fields are deserialized; everything else in
/// the export (IP address, user agent, URIs, start/end reason codes, offline
/// timestamp, incognito flag) is ignored at parse time and never reaches the
/// normalized record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlayRecord {
    /// ISO-8601 timestamp string of when the play was logged.
    #[serde(default)]
    pub ts: Option<String>,
    /// Free-text platform string, e.g. `"ios (iPhone12,1)"`.
    #[serde(default)]
    pub platform: Option<String>,
    /// Milliseconds played. Missing or negative values are treated as 0.
    #[serde(default)]
    pub ms_played: Option<i64>,
    /// Two-letter connection country code.
    #[serde(default)]
    pub conn_country: Option<String>,
    /// Track title, absent for podcast plays.
    #[serde(default, rename = "master_metadata_track_name")]
    pub track_name: Option<String>,
    /// Album artist name, absent for podcast plays.
    #[serde(default, rename = "master_metadata_album_artist_name")]
    pub artist_name: Option<String>,
    /// Podcast episode title, absent for song plays.
    #[serde(default)]
    pub episode_name: Option<String>,
    /// Podcast show name, absent for song plays.
    #[serde(default)]
    pub episode_show_name: Option<String>,
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// What kind of audio a play record refers to.
///
/// A record is a [`ContentType::Podcast`] iff its raw `episode_name` is
/// present and non-empty; everything else is a [`ContentType::Song`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Song,
    Podcast,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Song => write!(f, "Song"),
            ContentType::Podcast => write!(f, "Podcast"),
        }
    }
}

// ── PlayRecord ────────────────────────────────────────────────────────────────

/// One normalized listening event.
///
/// Produced once by the normalizer and immutable afterwards: filtering
/// materializes fresh views, it never mutates the base set. The raw combined
/// timestamp is not retained; `date` and `hour` are the only calendar fields
/// kept downstream, which keeps the record flat for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    /// Calendar date the play was logged on (in the display timezone).
    pub date: NaiveDate,
    /// Hour of day, 0-23 (in the display timezone).
    pub hour: u8,
    /// Milliseconds played, always >= 0.
    pub duration_ms: u64,
    /// Uppercase OS/platform token, with `OSX` normalized to `OS`.
    pub system: Option<String>,
    /// Uppercase device token extracted from the raw platform string.
    pub device: Option<String>,
    /// Song or podcast.
    pub content_type: ContentType,
    /// Artist name; `None` for podcast plays.
    pub artist: Option<String>,
    /// Track title; `None` for podcast plays.
    pub track: Option<String>,
    /// Podcast show name; `None` for song plays.
    pub episode_show: Option<String>,
    /// Podcast episode title; `None` for song plays.
    pub episode_name: Option<String>,
    /// Two-letter connection country code, if present in the export.
    pub country: Option<String>,
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// A multi-select filter value for one string-valued dimension.
///
/// `All` is the explicit "no restriction" sentinel; an `Only` with an empty
/// set behaves identically. The two are equivalent states, not sequential
/// ones: picking the literal "All" entry in a picker must produce the same
/// result set as never touching that filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// No restriction on this dimension.
    #[default]
    All,
    /// Restrict to records whose value is a member of the set.
    Only(BTreeSet<String>),
}

impl Selection {
    /// Build an `Only` selection from anything iterable over strings.
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    /// `true` when this selection does not restrict anything.
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.is_empty(),
        }
    }

    /// Whether a record's (nullable) value passes this selection.
    ///
    /// An unrestricted selection passes everything, including `None`. A
    /// restricting selection only passes present values that are members of
    /// the set; records with no value on this dimension are excluded.
    pub fn matches(&self, value: Option<&str>) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        match self {
            Selection::Only(set) => value.is_some_and(|v| set.contains(v)),
            Selection::All => true,
        }
    }
}

// ── FilterSpec ────────────────────────────────────────────────────────────────

/// The full set of user-selected predicates, applied conjunctively.
///
/// Every populated dimension must match (AND across dimensions); within one
/// dimension membership suffices (OR). Date bounds are inclusive on both
/// ends. The `types` dimension deliberately has no `All` sentinel: an empty
/// set means no restriction, a non-empty set restricts to exactly those
/// content types. That asymmetry with the other dimensions matches the
/// observed behavior of the exports this replaces and changing it would
/// change results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Inclusive lower date bound, or `None` for unbounded.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound, or `None` for unbounded.
    pub date_to: Option<NaiveDate>,
    pub systems: Selection,
    pub devices: Selection,
    /// Empty set = no restriction (no sentinel, see type-level docs).
    pub types: BTreeSet<ContentType>,
    pub artists: Selection,
    pub tracks: Selection,
    pub countries: Selection,
}

impl FilterSpec {
    /// Whether `record` satisfies every populated predicate.
    pub fn matches(&self, record: &PlayRecord) -> bool {
        if let Some(from) = self.date_from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.date > to {
                return false;
            }
        }
        if !self.types.is_empty() && !self.types.contains(&record.content_type) {
            return false;
        }
        self.systems.matches(record.system.as_deref())
            && self.devices.matches(record.device.as_deref())
            && self.artists.matches(record.artist.as_deref())
            && self.tracks.matches(record.track.as_deref())
            && self.countries.matches(record.country.as_deref())
    }

    /// `true` when no dimension restricts anything.
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.systems.is_unrestricted()
            && self.devices.is_unrestricted()
            && self.types.is_empty()
            && self.artists.is_unrestricted()
            && self.tracks.is_unrestricted()
            && self.countries.is_unrestricted()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
