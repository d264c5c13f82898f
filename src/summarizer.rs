//! AI summaries from a local inference server.
//!
//! The summarizer speaks the Ollama `/api/generate` protocol with streaming
//! disabled: one POST per summary, answered by a JSON object whose
//! `response` field holds the generated text.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait, "send a prompt, get text back"
//! - [`GenerateClient`]: the HTTP implementation
//! - [`RetryAsk`]: decorator adding exponential backoff for retriable errors
//! - [`summarize`]: picks the article text, guards against duplicate
//!   requests through [`ArticleStore`], and records the outcome
//!
//! # Retry Strategy
//!
//! Only network failures and 5xx statuses are retried, up to
//! `max_retries` extra attempts (default 0). The delay doubles from the base
//! delay, is capped at 30 seconds, and gets 0-250ms of random jitter.

use crate::config::SummarizerConfig;
use crate::error::SummaryError;
use crate::models::Article;
use crate::state::{ArticleStore, LoadState};
use crate::utils::{looks_truncated, truncate_for_log};
use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Trait for async prompt completion.
///
/// Implemented by the HTTP client and by [`RetryAsk`], which wraps any other
/// implementation. Tests substitute scripted implementations.
pub trait AskAsync {
    /// The response type returned by the model.
    type Response;

    /// Send a prompt and wait for the complete response.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The full prompt text
    ///
    /// # Returns
    ///
    /// The model's response, or a [`SummaryError`] describing why none
    /// was produced.
    async fn ask(&self, prompt: &str) -> Result<Self::Response, SummaryError>;
}

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// HTTP client for `POST {base_url}/api/generate`.
#[derive(Debug, Clone)]
pub struct GenerateClient {
    http: Client,
    endpoint: String,
    model: String,
    options: GenerateOptions,
}

impl GenerateClient {
    /// Build a client for `{base_url}/api/generate` from the summarizer
    /// settings. A trailing slash on `base_url` is ignored.
    pub fn new(config: &SummarizerConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                max_tokens: config.max_tokens,
            },
        }
    }
}

impl AskAsync for GenerateClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<Self::Response, SummaryError> {
        let t0 = Instant::now();
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: self.options,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Summarizer returned non-200 status");
            return Err(SummaryError::ApiError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::NetworkError(e.to_string()))?;

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                truncated = looks_truncated(&e),
                body_preview = %truncate_for_log(&body, 300),
                "Summarizer body did not parse"
            );
            SummaryError::InvalidResponseFormat(e.to_string())
        })?;

        let summary = parsed.response.trim();
        if summary.is_empty() {
            return Err(SummaryError::InvalidResponse);
        }

        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, chars = summary.chars().count(), "Summary generated");
        Ok(summary.to_string())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`]
/// implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper.
    ///
    /// # Arguments
    ///
    /// * `inner` - The client to wrap
    /// * `max_retries` - Extra attempts after the first failure (0 disables retries)
    /// * `base_delay` - Delay before the first retry; doubles on each attempt
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GenerateClient::new(&config.summarizer);
    /// let asker = RetryAsk::new(client, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<Self::Response, SummaryError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.ask(prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if !e.is_retriable() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            retriable = e.is_retriable(),
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() giving up"
                        );
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Build the summarization prompt, cutting the article text to
/// `max_chars` characters.
///
/// # Arguments
///
/// * `article` - Supplies the title and source lines, when present
/// * `text` - Body or snippet text to summarize
/// * `max_chars` - Maximum number of characters of `text` to include
pub fn build_prompt(article: &Article, text: &str, max_chars: usize) -> String {
    let text: String = text.chars().take(max_chars).collect();
    let mut prompt = String::from(
        "Summarize the following news article in three or four concise sentences. \
         Stick to the facts reported in the text and do not add commentary.\n\n",
    );
    if !article.title.is_empty() {
        prompt.push_str(&format!("Title: {}\n", article.title));
    }
    if !article.source.name.is_empty() {
        prompt.push_str(&format!("Source: {}\n", article.source.name));
    }
    prompt.push_str(&format!("\nArticle:\n{text}\n"));
    prompt
}

/// Summarize `article`, using its loaded body or else its snippet.
///
/// A previously generated summary is returned as is. While another
/// request for the same article is in flight this fails fast with
/// [`SummaryError::InProgress`] instead of sending a duplicate.
///
/// # Arguments
///
/// * `asker` - Model client, usually a [`RetryAsk`] around [`GenerateClient`]
/// * `store` - Per-article state; the outcome is recorded here
/// * `article` - The article to summarize
/// * `max_prompt_chars` - Cap on article text included in the prompt
///
/// # Errors
///
/// * [`SummaryError::InsufficientContent`] if there is no body, snippet or
///   description
/// * [`SummaryError::InProgress`] if a request for this article is running
/// * Any error from `asker`; the summary state is then `Failed` and a later
///   call may try again
#[instrument(level = "info", skip_all, fields(id = %article.id, title = %truncate_for_log(&article.title, 60)))]
pub async fn summarize<A>(
    asker: &A,
    store: &ArticleStore,
    article: &Article,
    max_prompt_chars: usize,
) -> Result<String, SummaryError>
where
    A: AskAsync<Response = String>,
{
    let state = store.state(article.id);
    if state.summary == LoadState::Loaded {
        if let Some(summary) = state.summary_text {
            return Ok(summary);
        }
    }

    let text = state
        .body
        .filter(|b| !b.trim().is_empty())
        .or_else(|| article.fallback_text())
        .ok_or(SummaryError::InsufficientContent)?;

    if !store.begin_summary(article.id) {
        info!("Summary request already in progress; not sending another");
        return Err(SummaryError::InProgress);
    }

    let prompt = build_prompt(article, &text, max_prompt_chars);
    match asker.ask(&prompt).await {
        Ok(summary) => {
            info!(chars = summary.chars().count(), "Article summarized");
            store.finish_summary(article.id, summary.clone());
            Ok(summary)
        }
        Err(e) => {
            store.fail_summary(article.id);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    /// Replays canned results and counts calls.
    struct ScriptedAsk {
        results: Mutex<VecDeque<Result<String, SummaryError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedAsk {
        fn new(results: Vec<Result<String, SummaryError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AskAsync for ScriptedAsk {
        type Response = String;

        async fn ask(&self, prompt: &str) -> Result<String, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SummaryError::InvalidResponse))
        }
    }

    fn config_for(server: &MockServer) -> SummarizerConfig {
        SummarizerConfig {
            base_url: server.uri(),
            model: "test-model".to_string(),
            ..SummarizerConfig::default()
        }
    }

    fn article_with_snippet() -> Article {
        let mut article = Article::from_url("https://example.com/a", "Example News");
        article.title = "Bridge reopens".to_string();
        article.content = Some("The bridge reopened on Monday. [+500 chars]".to_string());
        article
    }

    #[tokio::test]
    async fn test_generate_client_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "stream": false,
                "options": {"max_tokens": 300}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "test-model",
                "response": "  The bridge is open again. ",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenerateClient::new(&config_for(&server));
        let summary = client.ask("prompt").await.unwrap();
        assert_eq!(summary, "The bridge is open again.");
    }

    #[tokio::test]
    async fn test_generate_client_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GenerateClient::new(&config_for(&server));
        let result = client.ask("prompt").await;
        assert!(matches!(result, Err(SummaryError::ApiError(503))));
    }

    #[tokio::test]
    async fn test_generate_client_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "wrong field"})))
            .mount(&server)
            .await;

        let client = GenerateClient::new(&config_for(&server));
        let result = client.ask("prompt").await;
        assert!(matches!(result, Err(SummaryError::InvalidResponseFormat(_))));
    }

    #[tokio::test]
    async fn test_generate_client_blank_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "   "})))
            .mount(&server)
            .await;

        let client = GenerateClient::new(&config_for(&server));
        let result = client.ask("prompt").await;
        assert!(matches!(result, Err(SummaryError::InvalidResponse)));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_errors() {
        let inner = ScriptedAsk::new(vec![
            Err(SummaryError::NetworkError("reset".to_string())),
            Err(SummaryError::ApiError(502)),
            Ok("Done.".to_string()),
        ]);
        let retry = RetryAsk::new(inner, 3, StdDuration::from_millis(1));

        assert_eq!(retry.ask("prompt").await.unwrap(), "Done.");
        assert_eq!(retry.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_client_errors() {
        let inner = ScriptedAsk::new(vec![Err(SummaryError::ApiError(400)), Ok("never".to_string())]);
        let retry = RetryAsk::new(inner, 3, StdDuration::from_millis(1));

        assert!(matches!(retry.ask("prompt").await, Err(SummaryError::ApiError(400))));
        assert_eq!(retry.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_means_one_attempt() {
        let inner = ScriptedAsk::new(vec![Err(SummaryError::NetworkError("down".to_string()))]);
        let retry = RetryAsk::new(inner, 0, StdDuration::from_millis(1));

        assert!(retry.ask("prompt").await.is_err());
        assert_eq!(retry.inner.calls(), 1);
    }

    #[test]
    fn test_build_prompt_truncates_text() {
        let article = article_with_snippet();
        let prompt = build_prompt(&article, &"é".repeat(50), 10);
        assert!(prompt.contains("Title: Bridge reopens"));
        assert!(prompt.contains("Source: Example News"));
        assert!(prompt.contains(&format!("Article:\n{}\n", "é".repeat(10))));
        assert!(!prompt.contains(&"é".repeat(11)));
    }

    #[tokio::test]
    async fn test_summarize_uses_loaded_body() {
        let store = ArticleStore::new();
        let article = article_with_snippet();
        assert!(store.begin_content(article.id));
        store.finish_content(article.id, "Full body text about the bridge.".to_string());

        let asker = ScriptedAsk::new(vec![Ok("Summary.".to_string())]);
        let summary = summarize(&asker, &store, &article, 6000).await.unwrap();

        assert_eq!(summary, "Summary.");
        let prompts = asker.prompts.lock().unwrap().clone();
        assert!(prompts[0].contains("Full body text about the bridge."));
        assert!(!prompts[0].contains("[+500 chars]"));
        let state = store.state(article.id);
        assert_eq!(state.summary, LoadState::Loaded);
        assert_eq!(state.summary_text.as_deref(), Some("Summary."));
    }

    #[tokio::test]
    async fn test_summarize_returns_cached_summary() {
        let store = ArticleStore::new();
        let article = article_with_snippet();
        let asker = ScriptedAsk::new(vec![Ok("First.".to_string()), Ok("Second.".to_string())]);

        assert_eq!(summarize(&asker, &store, &article, 6000).await.unwrap(), "First.");
        assert_eq!(summarize(&asker, &store, &article, 6000).await.unwrap(), "First.");
        assert_eq!(asker.calls(), 1);
    }

    #[tokio::test]
    async fn test_summarize_without_text_is_insufficient_content() {
        let store = ArticleStore::new();
        let article = Article::from_url("https://example.com/empty", "Example News");
        let asker = ScriptedAsk::new(vec![Ok("unused".to_string())]);

        let result = summarize(&asker, &store, &article, 6000).await;
        assert!(matches!(result, Err(SummaryError::InsufficientContent)));
        assert_eq!(asker.calls(), 0);
        assert_eq!(store.state(article.id).summary, LoadState::Unloaded);
    }

    #[tokio::test]
    async fn test_summarize_refuses_duplicate_in_flight_request() {
        let store = ArticleStore::new();
        let article = article_with_snippet();
        assert!(store.begin_summary(article.id));

        let asker = ScriptedAsk::new(vec![Ok("unused".to_string())]);
        let result = summarize(&asker, &store, &article, 6000).await;
        assert!(matches!(result, Err(SummaryError::InProgress)));
        assert_eq!(asker.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_failure_allows_retry() {
        let store = ArticleStore::new();
        let article = article_with_snippet();
        let asker = ScriptedAsk::new(vec![
            Err(SummaryError::ApiError(500)),
            Ok("Recovered.".to_string()),
        ]);

        assert!(summarize(&asker, &store, &article, 6000).await.is_err());
        assert_eq!(store.state(article.id).summary, LoadState::Failed);
        assert_eq!(summarize(&asker, &store, &article, 6000).await.unwrap(), "Recovered.");
    }
}
