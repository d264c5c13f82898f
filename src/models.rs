//! Data models for headlines and the articles they point to.
//!
//! - [`Article`]: one headline as returned by the news API, plus a generated id
//! - [`HeadlinesResponse`]: the API envelope around a page of articles
//! - [`ArticleRecord`] / [`HeadlineBatch`]: what gets written to JSON output
//!
//! Field names follow the API's camelCase JSON.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// The API cuts `content` off and appends a marker like `" [+2145 chars]"`.
static TRUNCATION_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[\+\d+ chars\]\s*$").unwrap());

/// Treat an explicit `null` like a missing field. The API sends `null` for
/// fields it has no value for, and one such article must not fail the whole
/// page.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The publisher of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A single headline.
///
/// `id` is generated locally whenever an article is built or decoded; two
/// articles with identical content are still distinct.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(skip_deserializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: ArticleSource,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    pub url_to_image: Option<String>,
    /// Publication timestamp as sent by the API (RFC 3339).
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String,
    /// Snippet of the body, truncated by the API.
    pub content: Option<String>,
}

impl Article {
    /// Build an article for a bare URL that did not come from the API.
    pub fn from_url(url: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: ArticleSource {
                id: None,
                name: source_name.into(),
            },
            author: None,
            title: String::new(),
            description: None,
            url: url.into(),
            url_to_image: None,
            published_at: String::new(),
            content: None,
        }
    }

    /// Text to show or summarize when the full body is unavailable: the
    /// API snippet without its truncation marker, else the description.
    pub fn fallback_text(&self) -> Option<String> {
        let snippet = self
            .content
            .as_deref()
            .map(|c| TRUNCATION_MARKER_RE.replace(c, "").trim().to_string())
            .filter(|c| !c.is_empty());

        snippet.or_else(|| {
            self.description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
        })
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Envelope returned by the headline API.
///
/// On failure `status` is `"error"` and `code`/`message` explain why.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// An article together with whatever was derived for it during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    #[serde(flatten)]
    pub article: Article,
    pub body: Option<String>,
    pub summary: Option<String>,
}

/// One headline request and its results, as written to the JSON output.
#[derive(Debug, Serialize)]
pub struct HeadlineBatch {
    pub fetched_at: DateTime<Utc>,
    pub request: String,
    pub articles: Vec<ArticleRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE_JSON: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": "bbc-news", "name": "BBC News"},
                "author": "BBC News",
                "title": "Storm hits the coast",
                "description": "Heavy rain and wind.",
                "url": "https://www.bbc.co.uk/news/articles/abc",
                "urlToImage": "https://ichef.bbci.co.uk/image.jpg",
                "publishedAt": "2025-05-06T14:30:00Z",
                "content": "Residents were told to stay indoors as the storm… [+2145 chars]"
            },
            {
                "source": {"id": null, "name": "Local Gazette"},
                "author": null,
                "title": "Council approves budget",
                "description": null,
                "url": "https://gazette.example.com/budget",
                "urlToImage": null,
                "publishedAt": "2025-05-06T09:00:00+02:00",
                "content": null
            }
        ]
    }"#;

    #[test]
    fn test_headlines_response_deserialization() {
        let response: HeadlinesResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.articles.len(), 2);

        let first = &response.articles[0];
        assert_eq!(first.source.name, "BBC News");
        assert_eq!(first.source.id.as_deref(), Some("bbc-news"));
        assert_eq!(first.url_to_image.as_deref(), Some("https://ichef.bbci.co.uk/image.jpg"));
        assert_eq!(response.articles[1].author, None);
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let response: HeadlinesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "error");
        assert!(response.articles.is_empty());
        assert_eq!(response.code.as_deref(), Some("apiKeyInvalid"));
    }

    #[test]
    fn test_null_strings_decode_as_empty() {
        let json = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": null, "name": null},
                    "author": null,
                    "title": null,
                    "description": "Still useful.",
                    "url": "https://example.com/untitled",
                    "urlToImage": null,
                    "publishedAt": null,
                    "content": null
                },
                {
                    "source": null,
                    "title": "Second story",
                    "url": null
                }
            ]
        }"#;
        let response: HeadlinesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.articles.len(), 2);

        let first = &response.articles[0];
        assert_eq!(first.title, "");
        assert_eq!(first.source.name, "");
        assert_eq!(first.published_at, "");
        assert_eq!(first.published_at(), None);
        assert_eq!(first.fallback_text().as_deref(), Some("Still useful."));

        let second = &response.articles[1];
        assert_eq!(second.source, ArticleSource::default());
        assert_eq!(second.url, "");
    }

    #[test]
    fn test_ids_are_unique_for_identical_content() {
        let response: HeadlinesResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        let again: HeadlinesResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        assert_ne!(response.articles[0].id, again.articles[0].id);
        assert_ne!(response.articles[0].id, response.articles[1].id);
    }

    #[test]
    fn test_fallback_text_strips_truncation_marker() {
        let response: HeadlinesResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        assert_eq!(
            response.articles[0].fallback_text().as_deref(),
            Some("Residents were told to stay indoors as the storm…")
        );
    }

    #[test]
    fn test_fallback_text_uses_description() {
        let mut article = Article::from_url("https://example.com/a", "Example");
        assert_eq!(article.fallback_text(), None);

        article.description = Some("  A short description. ".to_string());
        assert_eq!(article.fallback_text().as_deref(), Some("A short description."));

        article.content = Some(" [+120 chars]".to_string());
        assert_eq!(article.fallback_text().as_deref(), Some("A short description."));
    }

    #[test]
    fn test_published_at_parsing() {
        let response: HeadlinesResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        let second = response.articles[1].published_at().unwrap();
        assert_eq!(second.to_rfc3339(), "2025-05-06T07:00:00+00:00");
        assert_eq!(Article::from_url("https://example.com", "x").published_at(), None);
    }

    #[test]
    fn test_article_record_serialization_is_flat() {
        let record = ArticleRecord {
            article: Article::from_url("https://example.com/a", "Example"),
            body: Some("Body".to_string()),
            summary: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["url"], "https://example.com/a");
        assert_eq!(json["source"]["name"], "Example");
        assert_eq!(json["body"], "Body");
        assert!(json["summary"].is_null());
        assert!(json["id"].is_string());
    }
}
