//! Main-body extraction from arbitrary news article HTML.
//!
//! The extractor parses the page with [`scraper`] and walks a degradation
//! chain of progressively weaker strategies:
//!
//! | Stage | Strategy | Accepted when |
//! |-------|----------|---------------|
//! | 1 | Container cascade (`article`, marker-class `div`s, `main`) | more than `min_paragraphs` paragraphs |
//! | 2 | Every `<p>` in the document | more than `min_paragraphs` paragraphs |
//! | 3 | Source-specific containers (e.g. BBC rich-text blocks) | at least one paragraph |
//! | 4 | Every `<p>` in the document | at least one paragraph |
//!
//! The first accepted stage wins. Paragraphs are joined with a blank line so
//! downstream cleaning still sees paragraph boundaries. Nothing here returns
//! an error: malformed HTML or a bad selector only narrows what can match,
//! and total failure is an empty string.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

/// A container must yield strictly more paragraphs than this to be accepted.
pub const DEFAULT_MIN_PARAGRAPHS: usize = 3;

/// Container selectors, highest priority first. Class markers carry the `i`
/// flag so `Article-Content` matches `article-content`.
pub const DEFAULT_CONTAINERS: &[&str] = &[
    "article",
    r#"div[class*="article-content" i]"#,
    r#"div[class*="entry-content" i]"#,
    r#"div[class*="story-body" i]"#,
    r#"div[class*="content" i]"#,
    r#"div[class*="post-content" i]"#,
    "main",
];

const BBC_MARKER: &str = "BBC";
const BBC_TEXT_BLOCKS: &str =
    r#"div[class*="RichTextContainer" i], div[data-component="text-block"]"#;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// A container pattern tried only for sources whose name contains
/// `source_marker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    pub source_marker: String,
    pub selector: String,
}

/// Tunables for the degradation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Acceptance threshold for stages 1 and 2.
    pub min_paragraphs: usize,
    /// CSS selectors for stage 1, in priority order.
    pub containers: Vec<String>,
    /// Stage 3 rules, tried in order.
    pub source_rules: Vec<SourceRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_paragraphs: DEFAULT_MIN_PARAGRAPHS,
            containers: DEFAULT_CONTAINERS.iter().map(|s| s.to_string()).collect(),
            source_rules: vec![SourceRule {
                source_marker: BBC_MARKER.to_string(),
                selector: BBC_TEXT_BLOCKS.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract the main body of `html` as paragraphs separated by blank lines.
    ///
    /// `source_name` is the publisher name reported by the headline API and
    /// only selects source-specific rules. Returns an empty string when no
    /// paragraph text exists anywhere in the document.
    #[instrument(level = "debug", skip_all, fields(source = %source_name, bytes = html.len()))]
    pub fn extract(&self, html: &str, source_name: &str) -> String {
        let document = Html::parse_document(html);

        if let Some(paragraphs) = self.from_containers(&document) {
            return paragraphs.join(PARAGRAPH_SEPARATOR);
        }

        let everywhere = paragraphs_in(document.root_element());
        if everywhere.len() > self.config.min_paragraphs {
            debug!(stage = "all_paragraphs", count = everywhere.len(), "Accepted extraction stage");
            return everywhere.join(PARAGRAPH_SEPARATOR);
        }

        if let Some(paragraphs) = self.from_source_rules(&document, source_name) {
            return paragraphs.join(PARAGRAPH_SEPARATOR);
        }

        if !everywhere.is_empty() {
            debug!(stage = "any_paragraphs", count = everywhere.len(), "Accepted extraction stage");
            return everywhere.join(PARAGRAPH_SEPARATOR);
        }

        debug!("No paragraph text found");
        String::new()
    }

    fn from_containers(&self, document: &Html) -> Option<Vec<String>> {
        for raw in &self.config.containers {
            let Some(selector) = parse_selector(raw) else {
                continue;
            };
            for container in document.select(&selector) {
                let paragraphs = paragraphs_in(container);
                if paragraphs.len() > self.config.min_paragraphs {
                    debug!(stage = "container", selector = %raw, count = paragraphs.len(), "Accepted extraction stage");
                    return Some(paragraphs);
                }
            }
        }
        None
    }

    fn from_source_rules(&self, document: &Html, source_name: &str) -> Option<Vec<String>> {
        for rule in &self.config.source_rules {
            if !source_name.contains(&rule.source_marker) {
                continue;
            }
            let Some(selector) = parse_selector(&rule.selector) else {
                continue;
            };
            // Rule selectors may match nested wrappers of the same paragraph.
            let paragraphs = paragraph_texts(
                document
                    .select(&selector)
                    .flat_map(|container| container.select(&PARAGRAPH))
                    .unique_by(|p| (**p).id()),
            );
            if !paragraphs.is_empty() {
                debug!(stage = "source_rule", marker = %rule.source_marker, count = paragraphs.len(), "Accepted extraction stage");
                return Some(paragraphs);
            }
        }
        None
    }
}

/// Extract with the default configuration.
pub fn extract(html: &str, source_name: &str) -> String {
    Extractor::default().extract(html, source_name)
}

/// Headline of a page: `og:title` if present, else the `<title>` text.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og_title = document
        .select(&OG_TITLE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|title| !title.is_empty());
    if let Some(title) = og_title {
        return Some(title.to_string());
    }

    document
        .select(&TITLE)
        .map(|title| title.text().collect::<String>().trim().to_string())
        .find(|title| !title.is_empty())
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = %raw, error = %e, "Invalid selector; treating as no match");
            None
        }
    }
}

/// Text of every non-empty `<p>` below `root`, nested markup dropped.
fn paragraphs_in(root: ElementRef<'_>) -> Vec<String> {
    paragraph_texts(root.select(&PARAGRAPH))
}

fn paragraph_texts<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    paragraphs
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
