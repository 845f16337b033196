//! Application configuration module.
//!
//! Manages the TOML config file holding the signed-in account, the
//! YouTube API settings and feed view tuning.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_BASE_URL_ENV, API_KEY_ENV, AccountConfig, AppConfig, FeedConfig, YoutubeConfig};
pub use paths::resolve_config_path;
