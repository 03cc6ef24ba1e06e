//! Listing discovery on one parsed search-result page.
//!
//! A search page carries two listing regions: a promoted (paid placement)
//! container tagged `data-cy="search.listing.promoted"` and the standard
//! container tagged `data-cy="search.listing"`. The first standard match on
//! the page is a heading decoy; the real container is the second one. An
//! empty standard group is the end-of-results signal, which empties the
//! combined result regardless of promoted content.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Site origin used to absolutize relative listing hrefs.
pub const SITE_ORIGIN: &str = "https://www.otodom.pl";

static PROMOTED_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-cy="search.listing.promoted"]"#).expect("static selector"));
static STANDARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-cy="search.listing"]"#).expect("static selector"));
static ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("static selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Result of discovery on one search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Listing URLs to visit, promoted first, the page's own URL excluded.
    pub urls: Vec<String>,
    pub promoted_count: usize,
    pub standard_count: usize,
}

impl Discovery {
    /// An empty standard group means the result set is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.standard_count == 0
    }
}

/// Extract the listing URLs to visit from one parsed search page.
///
/// `own_url` is the canonical URL of the search page itself; it is filtered
/// out of the result as a defensive measure against self-referential links.
pub fn discover_listing_urls(document: &Html, own_url: &str) -> Discovery {
    let promoted = promoted_listing_urls(document);
    let standard = standard_listing_urls(document);

    let promoted_count = promoted.len();
    let standard_count = standard.len();

    if standard.is_empty() {
        debug!("standard listing group empty; page treated as exhausted");
        return Discovery {
            urls: Vec::new(),
            promoted_count,
            standard_count,
        };
    }

    let urls = promoted
        .into_iter()
        .chain(standard)
        .filter(|url| url != own_url)
        .collect();

    Discovery {
        urls,
        promoted_count,
        standard_count,
    }
}

/// URLs from the promoted region. At most one container is expected; extra
/// matches are ignored in favor of the first, as the source markup has only
/// ever shown one.
fn promoted_listing_urls(document: &Html) -> Vec<String> {
    match document.select(&PROMOTED_SELECTOR).next() {
        Some(container) => item_urls(container),
        None => Vec::new(),
    }
}

/// URLs from the standard region: the second `search.listing` container on
/// the page. Fewer than two containers means the group is empty.
fn standard_listing_urls(document: &Html) -> Vec<String> {
    let containers: Vec<ElementRef> = document.select(&STANDARD_SELECTOR).collect();
    if containers.len() < 2 {
        return Vec::new();
    }
    item_urls(containers[1])
}

/// One hyperlink per list item; an item with zero or multiple links is a
/// data anomaly, logged and excluded.
fn item_urls(container: ElementRef) -> Vec<String> {
    let mut urls = Vec::new();
    for item in container.select(&ITEM_SELECTOR) {
        let hrefs: Vec<&str> = item
            .select(&LINK_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .collect();
        match hrefs.as_slice() {
            [href] => urls.push(absolutize(href)),
            other => warn!(
                "{} listing links found for the item, instead of expected 1. Skipping the item.",
                other.len()
            ),
        }
    }
    urls
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}/{}", SITE_ORIGIN, href.trim_start_matches('/'))
    }
}
