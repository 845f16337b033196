//! Identity collaborator: who is signed in.

use anyhow::{Result, bail};

/// An authenticated user. The core only consumes the stable `uid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Stable unique user ID.
    pub uid: String,
}

impl UserIdentity {
    /// Validates and wraps a user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or contains whitespace or
    /// control characters.
    pub fn parse(uid: &str) -> Result<Self> {
        let uid = uid.trim();
        if uid.is_empty() {
            bail!("user id must not be empty");
        }
        if uid.chars().any(|c| c.is_whitespace() || c.is_control()) {
            bail!("user id must not contain whitespace: {uid:?}");
        }
        Ok(Self {
            uid: String::from(uid),
        })
    }
}

/// Sign-in provider.
pub trait Identity {
    /// Signs in interactively and returns the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-in fails or is cancelled.
    fn sign_in(&self) -> Result<UserIdentity>;

    /// Returns the signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity source cannot be read.
    fn current_user(&self) -> Result<Option<UserIdentity>>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_trims_uid() {
        // Arrange & Act
        let identity = UserIdentity::parse("  alice-01 ").unwrap();

        // Assert
        assert_eq!(identity.uid, "alice-01");
    }

    #[test]
    fn test_parse_rejects_empty() {
        // Arrange & Act
        let result = UserIdentity::parse("   ");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        // Arrange & Act
        let result = UserIdentity::parse("alice smith");

        // Assert
        assert!(result.is_err());
    }
}
