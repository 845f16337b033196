//! Config-backed identity: the signed-in user lives in `[account] uid`.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use zenfeeds_feed::{Identity, UserIdentity};

use crate::config::AppConfig;

/// Message shown for any sign-in failure.
pub const SIGN_IN_FAILED: &str = "Failed to sign in";

/// Error for feed commands run while signed out.
pub const NOT_SIGNED_IN: &str = "not signed in; run `zenfeeds login` first";

/// Identity stored in the config file.
#[derive(Debug)]
pub struct ProfileIdentity {
    config_path: PathBuf,
    uid: Option<String>,
}

impl ProfileIdentity {
    /// Creates an identity backed by the config file at `config_path`.
    ///
    /// `uid` is used by `sign_in`; when `None`, the ID is read from stdin.
    #[must_use]
    pub const fn new(config_path: PathBuf, uid: Option<String>) -> Self {
        Self { config_path, uid }
    }

    /// Forgets the signed-in user. Returns the previous user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read or written.
    pub fn sign_out(&self) -> Result<Option<String>> {
        let mut config = AppConfig::load(&self.config_path)?;
        let previous = config.account.uid.take();
        if previous.is_some() {
            config.save(&self.config_path)?;
        }
        Ok(previous)
    }

    /// Returns the signed-in user or the "not signed in" error.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the config cannot be read.
    pub fn require_user(&self) -> Result<UserIdentity> {
        self.current_user()?.context(NOT_SIGNED_IN)
    }

    fn prompt_uid() -> Result<String> {
        tracing::info!("User ID:");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read user id from stdin")?;
        Ok(line)
    }
}

impl Identity for ProfileIdentity {
    fn sign_in(&self) -> Result<UserIdentity> {
        let raw = match &self.uid {
            Some(uid) => uid.clone(),
            None => Self::prompt_uid()?,
        };
        let identity = UserIdentity::parse(&raw)?;

        let mut config = AppConfig::load(&self.config_path)?;
        config.account.uid = Some(identity.uid.clone());
        config.save(&self.config_path)?;

        Ok(identity)
    }

    fn current_user(&self) -> Result<Option<UserIdentity>> {
        let config = AppConfig::load(&self.config_path).context("failed to load config")?;
        config
            .account
            .uid
            .as_deref()
            .map(UserIdentity::parse)
            .transpose()
            .context("invalid [account] uid in config")
    }
}
