//! `headline_reader` command-line entry point.
//!
//! Parses arguments, loads configuration, and runs one subcommand. See the
//! library docs for the pipeline itself.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::{Duration as StdDuration, Instant};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use headline_reader::cli::{Cli, Command, HeadlinesArgs, ReadArgs};
use headline_reader::config::{AppConfig, SummarizerConfig};
use headline_reader::content::extractor::page_title;
use headline_reader::content::{Extractor, read_article_body, segment};
use headline_reader::fetcher::{fetch_html, load_article_bodies};
use headline_reader::models::{Article, ArticleRecord, HeadlineBatch};
use headline_reader::news_api::NewsApiClient;
use headline_reader::outputs::{json, markdown, terminal};
use headline_reader::state::ArticleStore;
use headline_reader::summarizer::{GenerateClient, RetryAsk, summarize};
use headline_reader::utils::{ensure_writable_dir, host_name};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr, so stdout stays readable) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("headline_reader starting up");

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, "Parsed CLI arguments");

    let config = AppConfig::load(args.config.as_deref())
        .await?
        .with_overrides(args.api_key.clone(), args.summarizer_url.clone(), args.model.clone());

    let result = match &args.command {
        Command::Headlines(headlines) => run_headlines(&config, headlines).await,
        Command::Read(read) => run_read(&config, read).await,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        ok = result.is_ok(),
        "Execution complete"
    );
    result
}

fn summarizer_for(config: &SummarizerConfig) -> RetryAsk<GenerateClient> {
    RetryAsk::new(
        GenerateClient::new(config),
        config.max_retries,
        StdDuration::from_secs(1),
    )
}

#[instrument(level = "info", skip_all)]
async fn run_headlines(config: &AppConfig, args: &HeadlinesArgs) -> Result<(), Box<dyn Error>> {
    let api_key = config.api_key()?;

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let client = NewsApiClient::new(&config.news_api.base_url, api_key);
    let request = args.request();
    let mut articles = match client.fetch(&request).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(%request, error = %e, "Failed to fetch headlines; run again to retry");
            return Err(e.into());
        }
    };
    articles.truncate(args.limit);
    info!(count = articles.len(), %request, "Headlines ready");

    let store = ArticleStore::new();
    let extractor = Extractor::new(config.extraction.to_extraction_config());

    if args.full || args.summarize {
        load_article_bodies(&store, &extractor, &articles, config.fetch.concurrency).await;
    }

    if args.summarize {
        // One request at a time; the local model is the bottleneck.
        let asker = summarizer_for(&config.summarizer);
        let mut summarized = 0usize;
        for article in &articles {
            match summarize(&asker, &store, article, config.summarizer.max_prompt_chars).await {
                Ok(_) => summarized += 1,
                Err(e) => warn!(id = %article.id, url = %article.url, error = %e, "Summary failed"),
            }
        }
        info!(summarized, total = articles.len(), "Finished summaries");
    }

    print!(
        "{}",
        terminal::render_headlines(&articles, &store, args.full, Utc::now())
    );

    if let Some(dir) = &args.json_output_dir {
        let batch = HeadlineBatch {
            fetched_at: Utc::now(),
            request: request.to_string(),
            articles: articles
                .iter()
                .map(|article| {
                    let state = store.state(article.id);
                    ArticleRecord {
                        article: article.clone(),
                        body: state.body,
                        summary: state.summary_text,
                    }
                })
                .collect(),
        };
        if let Err(e) = json::write_headlines(&batch, dir).await {
            error!(error = %e, "Failed to write headline JSON");
        }
    }

    Ok(())
}

#[instrument(level = "info", skip_all, fields(url = %args.url))]
async fn run_read(config: &AppConfig, args: &ReadArgs) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = &args.markdown_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Markdown output directory is not writable");
            return Err(e);
        }
    }

    let source = args
        .source
        .clone()
        .or_else(|| host_name(&args.url))
        .unwrap_or_default();
    let mut article = Article::from_url(args.url.clone(), source);
    let store = ArticleStore::new();
    let extractor = Extractor::new(config.extraction.to_extraction_config());

    store.begin_content(article.id);
    let html = match fetch_html(&article.url).await {
        Ok(html) => html,
        Err(e) => {
            store.fail_content(article.id);
            error!(error = %e, "Failed to fetch article; run again to retry");
            return Err(e.into());
        }
    };

    if let Some(title) = page_title(&html) {
        article.title = title;
    }

    let body = read_article_body(&extractor, &html, &article.source.name);
    let paragraphs = if body.is_empty() {
        warn!("No readable article text found");
        store.fail_content(article.id);
        Vec::new()
    } else {
        store.finish_content(article.id, body.clone());
        segment(&body)
    };

    let summary = if args.summarize && !paragraphs.is_empty() {
        let asker = summarizer_for(&config.summarizer);
        match summarize(&asker, &store, &article, config.summarizer.max_prompt_chars).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Summary failed; showing article text only");
                None
            }
        }
    } else {
        None
    };

    print!(
        "{}",
        terminal::render_article(&article, &paragraphs, summary.as_deref())
    );
    if paragraphs.is_empty() {
        println!("No readable article text found on this page.");
    }

    if let Some(dir) = &args.markdown_output_dir {
        let md = markdown::article_to_markdown(&article, &paragraphs, summary.as_deref());
        if let Err(e) = markdown::write_article(dir, &article, &md).await {
            error!(error = %e, "Failed to write article Markdown");
        }
    }

    Ok(())
}
