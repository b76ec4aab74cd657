use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::{ArchiveError, Result};

static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());

const PARAGRAPH_BREAK: &str = "\n\n";

/// Text of the page's article element, one text node per paragraph.
pub fn article_text(html: &str, url: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let article = doc
        .select(&ARTICLE)
        .next()
        .ok_or_else(|| ArchiveError::not_found("article", url))?;

    Ok(article
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_blank_lines() {
        let html = r#"<html><body><header>Site chrome</header>
            <article>
              <h1>Title</h1>
              <p class="author">By Elder Someone</p>
              <p>First paragraph.</p>
              <p>Second paragraph.</p>
            </article>
            <footer>More chrome</footer></body></html>"#;
        assert_eq!(
            article_text(html, "t").unwrap(),
            "Title\n\nBy Elder Someone\n\nFirst paragraph.\n\nSecond paragraph."
        );
    }

    #[test]
    fn keeps_existing_breaks() {
        let html = "<article>Hello\n\nWorld</article>";
        assert_eq!(article_text(html, "t").unwrap(), "Hello\n\nWorld");
    }

    #[test]
    fn video_pages_have_no_article() {
        let html = r#"<div class="video-player"><video src="x.mp4"></video></div>"#;
        assert!(matches!(
            article_text(html, "/media/1789534104001"),
            Err(ArchiveError::NotFound { what: "article", .. })
        ));
    }
}
