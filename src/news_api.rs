//! Headline API client.
//!
//! Speaks the NewsAPI v2 shape: `top-headlines` filtered by country and
//! category, and `everything` for free-text search. Both return a
//! [`HeadlinesResponse`] envelope whose `status` must be `"ok"`.

use crate::error::NewsError;
use crate::models::{Article, HeadlinesResponse};
use itertools::Itertools;
use reqwest::Client;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Placeholder title the API uses for articles that were taken down.
const REMOVED_TITLE: &str = "[Removed]";

/// What to ask the headline API for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlineRequest {
    TopHeadlines { country: String, category: String },
    Search { query: String },
}

impl fmt::Display for HeadlineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopHeadlines { country, category } => {
                write!(f, "top headlines ({country}, {category})")
            }
            Self::Search { query } => write!(f, "search \"{query}\""),
        }
    }
}

pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn top_headlines(&self, country: &str, category: &str) -> Result<Vec<Article>, NewsError> {
        self.fetch(&HeadlineRequest::TopHeadlines {
            country: country.to_string(),
            category: category.to_string(),
        })
        .await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Article>, NewsError> {
        self.fetch(&HeadlineRequest::Search {
            query: query.to_string(),
        })
        .await
    }

    /// Build the request URL. The API key is part of the query string, so
    /// the result must not be logged.
    pub fn request_url(&self, request: &HeadlineRequest) -> Result<Url, NewsError> {
        let raw = match request {
            HeadlineRequest::TopHeadlines { country, category } => format!(
                "{}/top-headlines?country={}&category={}&apiKey={}",
                self.base_url,
                urlencoding::encode(country),
                urlencoding::encode(category),
                urlencoding::encode(&self.api_key),
            ),
            HeadlineRequest::Search { query } => format!(
                "{}/everything?q={}&sortBy=publishedAt&apiKey={}",
                self.base_url,
                urlencoding::encode(query),
                urlencoding::encode(&self.api_key),
            ),
        };
        Url::parse(&raw).map_err(|e| NewsError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }

    /// Fetch one page of articles, dropping removed and duplicate entries.
    #[instrument(level = "info", skip_all, fields(%request))]
    pub async fn fetch(&self, request: &HeadlineRequest) -> Result<Vec<Article>, NewsError> {
        let url = self.request_url(request)?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::NetworkError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NewsError::NetworkError(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Headline API responded");

        let parsed: HeadlinesResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(NewsError::DecodingError(e.to_string())),
            Err(_) => return Err(NewsError::ApiError(format!("HTTP {}", status.as_u16()))),
        };

        if !status.is_success() || parsed.status != "ok" {
            let message = parsed
                .message
                .or(parsed.code)
                .unwrap_or_else(|| format!("HTTP {} ({})", status.as_u16(), parsed.status));
            warn!(status = status.as_u16(), %message, "Headline API reported an error");
            return Err(NewsError::ApiError(message));
        }

        let received = parsed.articles.len();
        let articles: Vec<Article> = parsed
            .articles
            .into_iter()
            .filter(|a| a.title != REMOVED_TITLE && !a.url.is_empty())
            .unique_by(|a| a.url.clone())
            .collect();

        info!(
            total_results = parsed.total_results,
            received,
            kept = articles.len(),
            "Fetched headlines"
        );
        Ok(articles)
    }
}
