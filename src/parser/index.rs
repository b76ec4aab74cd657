use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::info;

use super::SECTION_WRAPPER;
use crate::error::{ArchiveError, Result};
use crate::fetch::PageFetcher;

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Hrefs of every non-empty link inside the first section wrapper, in document order.
pub fn conference_links(doc: &Html, url: &str) -> Result<Vec<String>> {
    let container = doc
        .select(&SECTION_WRAPPER)
        .next()
        .ok_or_else(|| ArchiveError::not_found("conference index container", url))?;

    Ok(container
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(str::to_string)
        .collect())
}

pub async fn list_conferences(fetcher: &PageFetcher, index_url: &str) -> Result<Vec<String>> {
    info!("Fetching conference index: {}", index_url);
    let doc = fetcher.fetch_document(index_url).await?;
    let links = conference_links(&doc, index_url)?;
    info!("Found {} conferences", links.len());
    Ok(links)
}
