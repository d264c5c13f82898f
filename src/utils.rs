//! Small helpers shared across modules.
//!
//! - String truncation and slugification for logging and file names
//! - JSON error classification for summarizer responses
//! - Relative publication ages for display
//! - Output directory validation

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) and
/// get an ellipsis plus the number of dropped bytes appended.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if it fits in `max` bytes, otherwise a truncated
/// version with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A model that hits its token limit mid-answer produces JSON that ends
/// early, which serde reports as an EOF error.
///
/// # Arguments
///
/// * `e` - The serde_json error to classify
///
/// # Returns
///
/// `true` if the error is an EOF error (incomplete JSON).
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Convert a title to a file-name friendly slug.
///
/// Lowercases the title, drops everything except alphanumerics, spaces and
/// hyphens, then turns spaces into hyphens. The result may be empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Test-Article!"), "test-article");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Host of `url` without a leading `www.`, used as a fallback source name.
///
/// # Returns
///
/// `None` if `url` does not parse or has no host.
pub fn host_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Human-readable age of a timestamp relative to `now`, e.g. `"3h ago"`.
///
/// Anything under a minute, including timestamps in the future, is
/// `"just now"`.
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
/// Called before any network work so a bad output path fails fast.
///
/// # Arguments
///
/// * `path` - Directory path to validate
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 3 would split the second one.
        assert_eq!(truncate_for_log("éééé", 3), "é…(+6 bytes)");
    }

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify_title("Hello World"), "hello-world");
        assert_eq!(slugify_title("Test-Article!"), "test-article");
        assert_eq!(slugify_title("Multiple   Spaces"), "multiple---spaces");
        assert_eq!(slugify_title("Storm hits 'the coast'"), "storm-hits-the-coast");
    }

    #[test]
    fn test_host_name() {
        assert_eq!(host_name("https://www.bbc.com/news/1").as_deref(), Some("bbc.com"));
        assert_eq!(host_name("https://lite.cnn.com/x").as_deref(), Some("lite.cnn.com"));
        assert_eq!(host_name("not a url"), None);
    }

    #[test]
    fn test_time_ago() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(42), now), "42m ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5h ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
        assert_eq!(time_ago(now + Duration::minutes(10), now), "just now");
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"response": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let json_bad = r#"{"response": nope}"#;
        let err = serde_json::from_str::<serde_json::Value>(json_bad).unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
