//! Terminal UI layer for Replay.
//!
//! Provides themes, the tabbed dashboard views (summary, charts, top
//! tables), the filter picker overlay, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod dashboard;
pub mod picker;
pub mod themes;

pub use replay_core as core;
