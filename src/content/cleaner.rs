//! Plain-text cleanup for extracted article bodies.
//!
//! Only a fixed handful of named entities is decoded, by literal
//! substitution. Entity decoding and tag stripping run before whitespace
//! normalization so that leftover markup fragments cannot split or glue
//! words during the collapse.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Entities replaced literally, in order.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Clean a chunk of article text.
///
/// Entity decoding and tag stripping repeat until neither changes the text,
/// so escaped markup such as `&amp;lt;b&amp;gt;` is decoded and stripped in
/// one call and the output never holds a known entity or tag. That makes
/// `clean` idempotent.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean("A &amp; B &lt;tag&gt; C"), "A & B C");
/// ```
pub fn clean(text: &str) -> String {
    let stripped = decode_and_strip(text);
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    // At most one blank line survives.
    let collapsed = BLANK_LINES_RE.replace_all(&collapsed, "\n\n");

    collapsed.trim().to_string()
}

/// Every step shortens the text, so the loop terminates.
fn decode_and_strip(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut decoded = current.clone();
        for (entity, replacement) in ENTITIES {
            if decoded.contains(entity) {
                decoded = decoded.replace(entity, replacement);
            }
        }
        let next = TAG_RE.replace_all(&decoded, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
