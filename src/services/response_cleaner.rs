//! Code-fence stripping for model output.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use regex::Regex;
use std::sync::LazyLock;

/// Opening fence, with or without a `json` tag, plus trailing whitespace.
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A```(?:json)?\s*").expect("static regex: leading fence"));

/// Closing fence, plus any whitespace before it.
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\z").expect("static regex: trailing fence"));

/// Strips a leading ```` ```json ```` fence and a trailing ```` ``` ```` fence,
/// then trims surrounding whitespace.
///
/// Does not validate JSON. Idempotent: `clean(&clean(s)) == clean(s)`.
#[must_use]
pub fn clean(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        if let Some(m) = LEADING_FENCE.find(text) {
            text = &text[m.end()..];
        }
        if let Some(m) = TRAILING_FENCE.find(text) {
            text = &text[..m.start()];
        }
        text = text.trim();
        if text.len() == before {
            return text.to_string();
        }
    }
}
