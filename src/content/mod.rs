//! Article content pipeline.
//!
//! Raw article HTML goes through three pure, synchronous stages:
//!
//! 1. [`extractor`]: locate the main body with an ordered cascade of
//!    container heuristics and return its paragraphs joined by blank lines
//! 2. [`cleaner`]: decode a fixed set of entities, strip leftover tags and
//!    normalize whitespace
//! 3. [`segmenter`]: re-chunk the cleaned text into display-sized paragraphs
//!
//! None of the stages can fail. An empty string from the extractor means
//! "nothing usable", and callers fall back to the snippet the headline API
//! already supplied.

pub mod cleaner;
pub mod extractor;
pub mod segmenter;

pub use cleaner::clean;
pub use extractor::{ExtractionConfig, Extractor};
pub use segmenter::segment;

/// Extract and clean the body text of an article page.
///
/// Returns an empty string when no paragraphs could be found.
pub fn read_article_body(extractor: &Extractor, html: &str, source_name: &str) -> String {
    clean(&extractor.extract(html, source_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_article_body_cleans_extracted_text() {
        let html = r#"
            <html><body><article>
                <p>Fish &amp; chips.</p>
                <p>Second   paragraph
                   spans lines.</p>
                <p>Third one.</p>
                <p>Fourth one.</p>
            </article></body></html>
        "#;
        let body = read_article_body(&Extractor::default(), html, "Reuters");
        assert_eq!(
            body,
            "Fish & chips. Second paragraph spans lines. Third one. Fourth one."
        );
    }

    #[test]
    fn test_read_article_body_empty_when_nothing_found() {
        let html = "<html><body><div>No paragraphs here</div></body></html>";
        assert_eq!(read_article_body(&Extractor::default(), html, "Reuters"), "");
    }

    #[test]
    fn test_pipeline_feeds_segmenter() {
        let html = r#"
            <article>
                <p>TOP STORY TODAY</p>
                <p>The council met on Monday. It approved the budget.</p>
                <p>Residents were divided.</p>
                <p>A vote is expected next week.</p>
            </article>
        "#;
        let body = read_article_body(&Extractor::default(), html, "Local Paper");
        let segments = segment(&body);
        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| !s.is_empty()));
        assert!(segments[0].starts_with("TOP STORY TODAY"));
    }
}
