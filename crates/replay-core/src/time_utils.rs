use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly. Falls back to `"UTC"` if
/// detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Timestamp parsing and calendar-field derivation in a display timezone.
///
/// Export timestamps are UTC instants; the handler converts them into the
/// configured timezone before splitting off the calendar date and the
/// hour-of-day. With the UTC default the derived fields equal the raw
/// timestamp's own date and hour.
pub struct TimezoneHandler {
    display_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { display_tz: tz }
    }

    /// Parse an ISO 8601 / RFC 3339 timestamp string into a UTC [`DateTime`].
    ///
    /// Handles the common `Z`-suffix form and any fixed UTC offset. A naive
    /// datetime without offset is interpreted as UTC, matching how the
    /// exports record instants. Returns `None` for empty strings or
    /// unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00'.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FMTS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.and_utc());
            }
        }

        None
    }

    /// Split a UTC instant into `(date, hour)` in the display timezone.
    pub fn local_date_hour(&self, dt: DateTime<Utc>) -> (NaiveDate, u8) {
        let local = dt.with_timezone(&self.display_tz);
        (local.date_naive(), local.hour() as u8)
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Expose the configured display timezone.
    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }
}

impl Default for TimezoneHandler {
    /// UTC handler, the behavior-preserving default.
    fn default() -> Self {
        Self {
            display_tz: Tz::UTC,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
