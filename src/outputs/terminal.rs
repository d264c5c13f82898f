//! Plain-text rendering for the terminal.

use crate::content::segment;
use crate::models::Article;
use crate::state::{ArticleStore, LoadState};
use crate::utils::time_ago;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Numbered headline list with source, age, summary, and either the loaded
/// body (when `show_body` is set) or the API snippet.
pub fn render_headlines(
    articles: &[Article],
    store: &ArticleStore,
    show_body: bool,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    if articles.is_empty() {
        out.push_str("No headlines found.\n");
        return out;
    }

    for (i, article) in articles.iter().enumerate() {
        let age = article
            .published_at()
            .map(|published| time_ago(published, now))
            .unwrap_or_else(|| "unknown time".to_string());
        writeln!(out, "{:>2}. {}", i + 1, article.title).unwrap();
        writeln!(out, "    {} · {}", article.source.name, age).unwrap();
        writeln!(out, "    {}", article.url).unwrap();

        let state = store.state(article.id);
        if let Some(summary) = &state.summary_text {
            writeln!(out, "    Summary: {summary}").unwrap();
        } else if state.summary == LoadState::Failed {
            writeln!(out, "    Summary unavailable; run again to retry.").unwrap();
        }

        match (&state.content, &state.body) {
            (LoadState::Loaded, Some(body)) if show_body => {
                for paragraph in segment(body) {
                    writeln!(out, "\n    {paragraph}").unwrap();
                }
            }
            (LoadState::Failed, _) if show_body => {
                writeln!(out, "    Article text unavailable; run again to retry.").unwrap();
            }
            _ => {
                if let Some(snippet) = article.fallback_text() {
                    writeln!(out, "    {snippet}").unwrap();
                }
            }
        }
        out.push('\n');
    }
    out
}

/// A single article: title, byline, summary, then the body as paragraphs.
pub fn render_article(article: &Article, paragraphs: &[String], summary: Option<&str>) -> String {
    let mut out = String::new();
    if !article.title.is_empty() {
        writeln!(out, "{}", article.title).unwrap();
        writeln!(out, "{}", "=".repeat(article.title.chars().count())).unwrap();
    }

    let byline = match &article.author {
        Some(author) if !author.is_empty() => format!("{} · {}", article.source.name, author),
        _ => article.source.name.clone(),
    };
    writeln!(out, "{byline}").unwrap();
    writeln!(out, "{}\n", article.url).unwrap();

    if let Some(summary) = summary {
        writeln!(out, "Summary: {summary}\n").unwrap();
    }

    for paragraph in paragraphs {
        writeln!(out, "{paragraph}\n").unwrap();
    }
    out
}
