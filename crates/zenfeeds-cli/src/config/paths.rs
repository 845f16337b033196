//! Where `config.toml` lives.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns `{dir}/config.toml` when `--dir` is given, otherwise
/// `$XDG_CONFIG_HOME/zenfeeds/config.toml` or
/// `$HOME/.config/zenfeeds/config.toml`.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither variable is set.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE_NAME));
    }
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

/// A relative `XDG_CONFIG_HOME` is ignored.
fn config_path_from(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_config_home.filter(|p| p.is_absolute()) {
        Some(xdg) => xdg,
        None => home
            .context("neither XDG_CONFIG_HOME nor HOME is set")?
            .join(".config"),
    };
    Ok(base.join("zenfeeds").join(CONFIG_FILE_NAME))
}
