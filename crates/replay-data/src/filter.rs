//! Filter application and filter-option discovery.
//!
//! The base record set is never mutated; [`apply_filter`] materializes a
//! fresh subset for each filter spec, preserving input order. The picker
//! widgets populate themselves from [`filter_options`], which collects the
//! distinct values actually present in the loaded data.

use std::collections::BTreeSet;

use replay_core::models::{FilterSpec, PlayRecord};

/// Distinct values per filterable dimension, sorted ascending.
///
/// Values are drawn from the base record set, so the pickers only ever offer
/// choices that can match something. Records with a missing value for a
/// dimension contribute nothing to that dimension's list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub systems: Vec<String>,
    pub devices: Vec<String>,
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
    pub countries: Vec<String>,
}

/// Return the records matching `spec`, in the same order they appear in
/// `records`.
pub fn apply_filter(records: &[PlayRecord], spec: &FilterSpec) -> Vec<PlayRecord> {
    records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect()
}

/// Collect the distinct filterable values present in `records`.
pub fn filter_options(records: &[PlayRecord]) -> FilterOptions {
    let mut systems = BTreeSet::new();
    let mut devices = BTreeSet::new();
    let mut artists = BTreeSet::new();
    let mut tracks = BTreeSet::new();
    let mut countries = BTreeSet::new();

    for record in records {
        if let Some(system) = &record.system {
            systems.insert(system.clone());
        }
        if let Some(device) = &record.device {
            devices.insert(device.clone());
        }
        if let Some(artist) = &record.artist {
            artists.insert(artist.clone());
        }
        if let Some(track) = &record.track {
            tracks.insert(track.clone());
        }
        if let Some(country) = &record.country {
            countries.insert(country.clone());
        }
    }

    FilterOptions {
        systems: systems.into_iter().collect(),
        devices: devices.into_iter().collect(),
        artists: artists.into_iter().collect(),
        tracks: tracks.into_iter().collect(),
        countries: countries.into_iter().collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
