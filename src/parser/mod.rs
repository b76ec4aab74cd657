pub mod article;
pub mod conference;
pub mod index;

use std::sync::LazyLock;

use scraper::Selector;

// Both the index page and every conference page wrap their content in this.
static SECTION_WRAPPER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("section .section-wrapper").unwrap());
