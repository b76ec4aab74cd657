use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::SECTION_WRAPPER;
use crate::error::{ArchiveError, Result};
use crate::models::Talk;
use crate::paths::ConferenceDir;

static TILE_GROUP: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".tile-wrapper").unwrap());
static SESSION_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.section__header__title").unwrap());
static TILE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".lumen-tile").unwrap());
static TILE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".lumen-tile__title").unwrap());
static TILE_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".lumen-tile__content").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const UNKNOWN_AUTHOR: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub title: String,
    pub talks: Vec<Talk>,
}

/// Sessions and talks of one conference page, in page order.
pub fn parse_conference_page(html: &str, url: &str, dir: &ConferenceDir) -> Result<Vec<Session>> {
    let doc = Html::parse_document(html);
    let wrapper = doc
        .select(&SECTION_WRAPPER)
        .next()
        .ok_or_else(|| ArchiveError::not_found("session wrapper", url))?;

    let conference_dir = dir.to_string();
    wrapper
        .select(&TILE_GROUP)
        .map(|group| parse_session(group, url, &conference_dir))
        .collect()
}

fn parse_session(group: ElementRef<'_>, url: &str, conference_dir: &str) -> Result<Session> {
    let title: String = group
        .select(&SESSION_TITLE)
        .next()
        .ok_or_else(|| ArchiveError::not_found("session title", url))?
        .text()
        .collect();

    let talks = group
        .select(&TILE)
        .map(|tile| parse_talk(tile, url, &title, conference_dir))
        .collect::<Result<Vec<_>>>()?;

    Ok(Session { title, talks })
}

fn parse_talk(
    tile: ElementRef<'_>,
    url: &str,
    session_title: &str,
    conference_dir: &str,
) -> Result<Talk> {
    let title = tile
        .select(&TILE_TITLE)
        .next()
        .ok_or_else(|| ArchiveError::not_found("talk title", url))?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    // Tiles are either the anchor itself or wrap one.
    let link = tile
        .value()
        .attr("href")
        .or_else(|| tile.select(&ANCHOR).next().and_then(|a| a.value().attr("href")))
        .ok_or_else(|| ArchiveError::not_found("talk link", url))?
        .to_string();

    let author = match tile.select(&TILE_AUTHOR).next() {
        Some(el) => el.text().collect(),
        None => {
            warn!(talk = %title, page = url, "tile has no author");
            UNKNOWN_AUTHOR.to_string()
        }
    };

    Ok(Talk {
        title,
        link,
        author,
        session_title: session_title.to_string(),
        conference_dir: conference_dir.to_string(),
    })
}
