//! Feed name normalisation.

use unicode_normalization::UnicodeNormalization;

/// Returns the canonical form of a feed name: trimmed and NFC-normalised.
#[must_use]
pub fn normalize_feed_name(name: &str) -> String {
    name.trim().nfc().collect()
}

/// Returns `true` when two feed names refer to the same feed.
#[must_use]
pub fn same_feed_name(a: &str, b: &str) -> bool {
    normalize_feed_name(a) == normalize_feed_name(b)
}
