//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that takes precedence over `[youtube] api_key`.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Environment variable that takes precedence over `[youtube] base_url`.
pub const API_BASE_URL_ENV: &str = "YOUTUBE_API_BASE_URL";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Signed-in account.
    #[serde(default)]
    pub account: AccountConfig,
    /// YouTube Data API settings.
    #[serde(default)]
    pub youtube: YoutubeConfig,
    /// Feed view settings.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Signed-in account.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AccountConfig {
    /// Stable user ID; absent when signed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// YouTube Data API settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct YoutubeConfig {
    /// API key, used when `YOUTUBE_API_KEY` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Data API root, for proxies and local test servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Minimum spacing between requests in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Videos per channel and channel search results.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Requests in flight per aggregation phase.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

/// Feed view settings.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FeedConfig {
    /// Delay before re-reading the store after a mutation, in milliseconds.
    #[serde(default)]
    pub settle_delay_ms: u64,
}

const fn default_min_interval_ms() -> u64 {
    50
}

const fn default_max_results() -> u32 {
    10
}

const fn default_max_concurrency() -> usize {
    4
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            min_interval_ms: default_min_interval_ms(),
            max_results: default_max_results(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl YoutubeConfig {
    /// Resolves the API key from `env_value` (the `YOUTUBE_API_KEY`
    /// value, if set) or the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides a non-empty key.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .with_context(|| {
                format!("YouTube API key is not set; export {API_KEY_ENV} or set [youtube] api_key")
            })
    }

    /// Resolves the API root from `env_value` (the `YOUTUBE_API_BASE_URL`
    /// value, if set) or the config file. `None` means the public API.
    ///
    /// A missing trailing slash is added so endpoint paths join under it.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen value is not a valid URL.
    pub fn resolve_base_url(&self, env_value: Option<String>) -> Result<Option<Url>> {
        let Some(raw) = env_value
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.base_url.clone().filter(|u| !u.trim().is_empty()))
        else {
            return Ok(None);
        };

        let mut raw = String::from(raw.trim());
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
            .map(Some)
            .with_context(|| format!("invalid YouTube API base URL: {raw}"))
    }

    /// Minimum spacing between requests.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl FeedConfig {
    /// Delay before re-reading the store after a mutation.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.account.uid.is_none());
        assert_eq!(config.youtube.min_interval_ms, 50);
        assert_eq!(config.youtube.max_results, 10);
        assert_eq!(config.youtube.max_concurrency, 4);
        assert_eq!(config.feed.settle_delay(), Duration::ZERO);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            account: AccountConfig {
                uid: Some(String::from("alice")),
            },
            youtube: YoutubeConfig {
                api_key: Some(String::from("key-123")),
                max_concurrency: 2,
                ..YoutubeConfig::default()
            },
            feed: FeedConfig {
                settle_delay_ms: 100,
            },
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[youtube]\nmax_results = 25\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.youtube.max_results, 25);
        assert_eq!(config.youtube.min_interval_ms, 50);
        assert!(config.account.uid.is_none());
    }

    #[test]
    fn test_signed_out_config_omits_uid() {
        // Arrange
        let config = AppConfig::default();

        // Act
        let toml_str = toml::to_string_pretty(&config).unwrap();

        // Assert
        assert!(!toml_str.contains("uid"));
    }

    #[test]
    fn test_api_key_env_takes_precedence() {
        // Arrange
        let youtube = YoutubeConfig {
            api_key: Some(String::from("from-file")),
            ..YoutubeConfig::default()
        };

        // Act
        let key = youtube
            .resolve_api_key(Some(String::from("from-env")))
            .unwrap();

        // Assert
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_api_key_falls_back_to_config() {
        // Arrange
        let youtube = YoutubeConfig {
            api_key: Some(String::from("from-file")),
            ..YoutubeConfig::default()
        };

        // Act
        let key = youtube.resolve_api_key(Some(String::new())).unwrap();

        // Assert
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_base_url_defaults_to_public_api() {
        // Arrange
        let youtube = YoutubeConfig::default();

        // Act
        let url = youtube.resolve_base_url(None).unwrap();

        // Assert
        assert!(url.is_none());
    }

    #[test]
    fn test_base_url_env_gains_trailing_slash() {
        // Arrange
        let youtube = YoutubeConfig {
            base_url: Some(String::from("http://proxy.example/yt/")),
            ..YoutubeConfig::default()
        };

        // Act
        let url = youtube
            .resolve_base_url(Some(String::from("http://127.0.0.1:9000/youtube/v3")))
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/youtube/v3/");
        assert_eq!(
            url.join("search").unwrap().as_str(),
            "http://127.0.0.1:9000/youtube/v3/search"
        );
    }

    #[test]
    fn test_invalid_base_url_is_error() {
        // Arrange
        let youtube = YoutubeConfig {
            base_url: Some(String::from("not a url")),
            ..YoutubeConfig::default()
        };

        // Act
        let result = youtube.resolve_base_url(None);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_missing_is_error() {
        // Arrange
        let youtube = YoutubeConfig::default();

        // Act
        let result = youtube.resolve_api_key(None);

        // Assert
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YOUTUBE_API_KEY"));
    }
}
