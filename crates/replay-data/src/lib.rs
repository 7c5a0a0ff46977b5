//! Data pipeline for Replay.
//!
//! Responsible for discovering and reading streaming-history export files
//! (JSON or pre-cleaned CSV), normalizing raw records into
//! [`replay_core::models::PlayRecord`]s, applying filter specs, and
//! computing the aggregate tables the dashboard renders.

pub mod aggregator;
pub mod filter;
pub mod ingest;
pub mod normalizer;
pub mod reader;

pub use replay_core as core;
