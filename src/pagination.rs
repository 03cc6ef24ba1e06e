//! Lazy, restartable sequence of search-result page URLs.
//!
//! The sequence never terminates on its own; the engine bounds it with the
//! configured page limit or the empty-result signal from discovery.

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 36;

/// Infinite iterator over search pages. `page` starts from the base URL's
/// own value and increments by one per step; `limit` is held constant.
#[derive(Debug, Clone)]
pub struct SearchPages {
    base: String,
    page: u32,
    limit: u32,
}

impl SearchPages {
    /// Parse the base search URL, honoring its optional `page` and `limit`
    /// query parameters. Every yielded URL carries both explicitly.
    pub fn new(base_search_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_search_url)
            .with_context(|| format!("invalid base search url: {base_search_url}"))?;

        let query_param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<u32>().ok())
        };

        let page = query_param("page").unwrap_or(DEFAULT_PAGE);
        let limit = query_param("limit").unwrap_or(DEFAULT_LIMIT);

        let mut base = parsed.clone();
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            base: base.to_string(),
            page,
            limit,
        })
    }
}

impl Iterator for SearchPages {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let url = format!("{}?page={}&limit={}", self.base, self.page, self.limit);
        self.page += 1;
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_explicit_page_and_limit() {
        let pages = SearchPages::new(
            "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=3&limit=72",
        )
        .unwrap();
        let urls: Vec<_> = pages.take(3).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=3&limit=72",
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=4&limit=72",
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=5&limit=72",
            ]
        );
    }

    #[test]
    fn defaults_apply_when_query_absent() {
        let pages =
            SearchPages::new("https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa")
                .unwrap();
        let urls: Vec<_> = pages.take(3).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=1&limit=36",
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=2&limit=36",
                "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=3&limit=36",
            ]
        );
    }

    #[test]
    fn restartable_from_the_same_base() {
        let base = "https://www.otodom.pl/pl/oferty/sprzedaz/mieszkanie/warszawa?page=2&limit=36";
        let first: Vec<_> = SearchPages::new(base).unwrap().take(2).collect();
        let second: Vec<_> = SearchPages::new(base).unwrap().take(2).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(SearchPages::new("not a url").is_err());
    }
}
