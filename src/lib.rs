//! # Headline Reader
//!
//! A terminal news reader: fetches headlines from a news API, downloads and
//! extracts the full text of each article from arbitrary news sites, and
//! asks a local inference server for short summaries.
//!
//! ## Usage
//!
//! ```sh
//! headline_reader headlines --category science --full
//! headline_reader headlines -q "city council" --summarize -j ./json
//! headline_reader read https://www.bbc.com/news/articles/abc --source "BBC News" -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Headlines**: query the headline API ([`news_api`])
//! 2. **Fetching**: download article pages concurrently ([`fetcher`])
//! 3. **Extraction**: heuristically locate and clean the body text, then
//!    re-segment it into paragraphs ([`content`])
//! 4. **Summaries**: one request per article to the local model, guarded
//!    against duplicates by per-article state ([`summarizer`], [`state`])
//! 5. **Output**: terminal text, plus optional JSON and Markdown files
//!    ([`outputs`])
//!
//! Failures at any step for a single article degrade to the snippet the API
//! already supplied; nothing about one article aborts the run.

pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod news_api;
pub mod outputs;
pub mod state;
pub mod summarizer;
pub mod utils;
