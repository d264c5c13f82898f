//! Command-line interface definitions.
//!
//! Connection settings can come from flags, environment variables, or the
//! YAML config file; flags win over the file.

use crate::news_api::HeadlineRequest;
use clap::{Args, Parser, Subcommand};

/// Read the news from the terminal: headlines, full article text, and
/// AI summaries from a local model.
///
/// # Examples
///
/// ```sh
/// # Top US headlines with extracted article text
/// headline_reader headlines --full
///
/// # Search and summarize, saving the batch as JSON
/// headline_reader headlines -q "city council" --summarize -j ./json
///
/// # Read a single page
/// headline_reader read https://www.bbc.com/news/articles/abc --source "BBC News"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Headline API key
    #[arg(long, env = "NEWS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the local inference server
    #[arg(long, env = "SUMMARIZER_URL", global = true)]
    pub summarizer_url: Option<String>,

    /// Model used for summaries
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List top headlines, or search all articles with --query
    Headlines(HeadlinesArgs),
    /// Fetch one article page and print its extracted text
    Read(ReadArgs),
}

#[derive(Args, Debug)]
pub struct HeadlinesArgs {
    /// Two-letter country code for top headlines
    #[arg(long, default_value = "us")]
    pub country: String,

    /// Category for top headlines (business, science, sports, ...)
    #[arg(long, default_value = "general")]
    pub category: String,

    /// Search all articles instead of top headlines
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of articles to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Fetch each article page and show the extracted text
    #[arg(long)]
    pub full: bool,

    /// Summarize each article with the local model
    #[arg(long)]
    pub summarize: bool,

    /// Output directory for the JSON batch file
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}

impl HeadlinesArgs {
    pub fn request(&self) -> HeadlineRequest {
        match &self.query {
            Some(query) => HeadlineRequest::Search {
                query: query.clone(),
            },
            None => HeadlineRequest::TopHeadlines {
                country: self.country.clone(),
                category: self.category.clone(),
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Article URL
    pub url: String,

    /// Publisher name; enables source-specific extraction (e.g. "BBC News").
    /// Defaults to the URL's host.
    #[arg(long)]
    pub source: Option<String>,

    /// Summarize the article with the local model
    #[arg(long)]
    pub summarize: bool,

    /// Output directory for the Markdown file
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,
}
