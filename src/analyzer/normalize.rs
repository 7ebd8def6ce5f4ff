//! Post text normalization
//!
//! Raw post text is full of things a polarity model can't use: `@handles`,
//! links, emoji, punctuation runs. Normalization strips them so that only
//! plain ASCII words and digits separated by single spaces remain.
//!
//! ```text
//! "@user check http://x.co GREAT!!"  →  "check GREAT"
//! ```
//!
//! The three patterns are matched as one alternation, left to right, so a
//! link is consumed whole before its punctuation could be removed piecemeal
//! (which would leave `http x co` behind).

use regex::Regex;
use std::sync::LazyLock;

/// Mentions, non-alphanumeric characters, and `scheme://...` links.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(@[A-Za-z0-9]+)|([^0-9A-Za-z \t\r\n])|(\w+://\S+)")
        .expect("noise pattern is a valid regex")
});

/// Clean raw post text for the sentiment oracle.
///
/// Mentions, URLs and every character that is not an ASCII letter, digit
/// or whitespace are removed; whitespace runs collapse to one space and the
/// result is trimmed. Text that is only mentions or links becomes `""`.
pub fn normalize(text: &str) -> String {
    let stripped = NOISE.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
