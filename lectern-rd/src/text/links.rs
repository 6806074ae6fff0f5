//! URL detection and removal
//!
//! Sentences containing a URL suspend playback pending a client decision,
//! and URLs are stripped from text before it is sent for synthesis (reading
//! a URL aloud character by character is useless to the listener).

use once_cell::sync::Lazy;
use regex::Regex;

/// Conventional `scheme://...` URL pattern: http or https scheme followed by
/// alphanumerics, a fixed punctuation set, and percent-encoded octets.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[A-Za-z0-9$\-_@.&+!*(),/?=:;#~]|%[0-9a-fA-F]{2})+")
        .expect("URL pattern is valid")
});

/// True if the sentence contains a URL
pub fn contains_link(sentence: &str) -> bool {
    URL_PATTERN.is_match(sentence)
}

/// Remove every matched URL substring, joining the surrounding text as-is.
/// No-op on text without matches.
pub fn strip_links(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").into_owned()
}
