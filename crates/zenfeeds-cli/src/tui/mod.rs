//! TUI module for interactive terminal interfaces.
//!
//! Uses `ratatui` + `crossterm` for rendering.

/// Feed viewer TUI.
pub mod feed_viewer;

pub use feed_viewer::run_feed_viewer;
