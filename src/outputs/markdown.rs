//! Markdown rendering of a read article.
//!
//! Files are named after the article title:
//! `{markdown_output_dir}/{slug}.md`, falling back to the article id when the
//! title slugifies to nothing.

use crate::models::Article;
use crate::utils::slugify_title;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

pub fn article_to_markdown(article: &Article, paragraphs: &[String], summary: Option<&str>) -> String {
    let mut md = String::new();
    let title = if article.title.is_empty() {
        article.url.as_str()
    } else {
        article.title.as_str()
    };

    writeln!(md, "# {title}\n").unwrap();
    write!(md, "*{}*", article.source.name).unwrap();
    if let Some(author) = article.author.as_deref().filter(|a| !a.is_empty()) {
        write!(md, " · {author}").unwrap();
    }
    if !article.published_at.is_empty() {
        write!(md, " · {}", article.published_at).unwrap();
    }
    writeln!(md, "\n\n[Original article]({})\n", article.url).unwrap();

    if let Some(image) = article.url_to_image.as_deref() {
        writeln!(md, "![]({image})\n").unwrap();
    }

    if let Some(summary) = summary {
        writeln!(md, "## Summary\n\n{summary}\n").unwrap();
    }

    if !paragraphs.is_empty() {
        writeln!(md, "## Article\n").unwrap();
        for paragraph in paragraphs {
            writeln!(md, "{paragraph}\n").unwrap();
        }
    }
    md
}

/// Write `markdown` for `article` into `markdown_output_dir`, returning the
/// path written.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_article(
    markdown_output_dir: &str,
    article: &Article,
    markdown: &str,
) -> Result<String, Box<dyn Error>> {
    let slug = slugify_title(&article.title);
    let stem = if slug.trim_matches('-').is_empty() {
        article.id.to_string()
    } else {
        slug
    };
    let path = format!("{}/{}.md", markdown_output_dir.trim_end_matches('/'), stem);

    fs::create_dir_all(markdown_output_dir).await?;
    fs::write(&path, markdown).await?;
    info!(%path, "Wrote article Markdown");
    Ok(path)
}
