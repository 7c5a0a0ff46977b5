//! Core domain types and leaf utilities for Replay.
//!
//! Defines the normalized [`models::PlayRecord`], the filter model, the
//! platform-string tokenizer, timestamp/timezone helpers, number formatting,
//! CLI settings and the shared error type used across the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod platform;
pub mod settings;
pub mod time_utils;

pub use error::{ReplayError, Result};
