//! Article page download and body loading.
//!
//! One GET per article, no internal timeout or retry: a failed download
//! degrades to the snippet the headline API already supplied instead of
//! surfacing an error.

use crate::content::{Extractor, read_article_body};
use crate::error::FetchError;
use crate::models::Article;
use crate::state::{ArticleStore, LoadState};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, info, instrument, warn};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) headline_reader/0.1";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
});

/// Download the raw HTML of an article page.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_html(url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Decoding(e.to_string()))?;
    info!(bytes = body.len(), "Fetched article HTML");
    Ok(body)
}

/// Load the body text of `article` into `store`, returning it.
///
/// Falls back to [`Article::fallback_text`] when the page cannot be
/// downloaded or nothing could be extracted; content state only ends up
/// `Failed` when no text at all is available. If the body is already
/// loaded (or loading elsewhere) the stored value is returned without a
/// request.
#[instrument(level = "info", skip_all, fields(id = %article.id, url = %article.url))]
pub async fn load_article_body(
    store: &ArticleStore,
    extractor: &Extractor,
    article: &Article,
) -> Option<String> {
    if !store.begin_content(article.id) {
        debug!("Body already loaded or loading");
        return store.state(article.id).body;
    }

    let extracted = match fetch_html(&article.url).await {
        Ok(html) => read_article_body(extractor, &html, &article.source.name),
        Err(e) => {
            warn!(error = %e, "Article fetch failed; falling back to snippet");
            String::new()
        }
    };

    let body = if extracted.is_empty() {
        debug!("No body extracted; using snippet or description");
        article.fallback_text()
    } else {
        Some(extracted)
    };

    match body {
        Some(body) => {
            info!(chars = body.chars().count(), "Article body loaded");
            store.finish_content(article.id, body.clone());
            Some(body)
        }
        None => {
            warn!("No article text available");
            store.fail_content(article.id);
            None
        }
    }
}

/// Outcome counts for [`load_article_bodies`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Articles that ended up with body or snippet text.
    pub loaded: usize,
    /// Articles whose body another caller is still loading.
    pub in_flight: usize,
    /// Articles with no text at all.
    pub unavailable: usize,
}

/// Load bodies for many articles, `concurrency` pages at a time.
#[instrument(level = "info", skip_all, fields(count = articles.len(), concurrency = concurrency))]
pub async fn load_article_bodies(
    store: &ArticleStore,
    extractor: &Extractor,
    articles: &[Article],
    concurrency: usize,
) -> LoadSummary {
    let outcomes: Vec<_> = stream::iter(articles)
        .map(|article| async move {
            let body = load_article_body(store, extractor, article).await;
            (article.id, body.is_some())
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = LoadSummary::default();
    for (id, has_body) in outcomes {
        if has_body {
            summary.loaded += 1;
        } else if store.state(id).content == LoadState::Loading {
            summary.in_flight += 1;
        } else {
            summary.unavailable += 1;
        }
    }

    info!(
        loaded = summary.loaded,
        in_flight = summary.in_flight,
        unavailable = summary.unavailable,
        total = articles.len(),
        "Loaded article bodies"
    );
    summary
}
