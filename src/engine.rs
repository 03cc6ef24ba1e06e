//! Scrape orchestration: drives pagination, discovery, extraction, merge and
//! checkpointing across search pages.
//!
//! Execution is strictly sequential. The page loop ends on the configured
//! page limit (checked before fetching the next page) or on an empty standard
//! listing group. The dataset is persisted after every page — checkpoint file
//! first, then the primary output — so a crash loses at most one page of
//! progress. A failed listing fetch or parse never aborts its page; a failed
//! field never aborts its listing.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ScrapeConfig;
use crate::dataset::Dataset;
use crate::infrastructure::geocode::CommuteEnricher;
use crate::infrastructure::http_client::Fetch;
use crate::infrastructure::storage;
use crate::pagination::SearchPages;
use crate::parsing::listing::extract_listing;
use crate::parsing::search_page::{discover_listing_urls, Discovery};

/// Counters accumulated over one run. Reported at the end, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pages_visited: u32,
    pub standard_urls_seen: usize,
    pub promoted_urls_seen: usize,
    pub new_listings_fetched: usize,
    pub records_merged: usize,
    pub elapsed: Duration,
}

/// The scrape orchestrator, generic over the fetch capability.
pub struct ScrapeEngine<F: Fetch> {
    config: ScrapeConfig,
    fetcher: F,
    enricher: Option<CommuteEnricher>,
}

impl<F: Fetch> ScrapeEngine<F> {
    pub fn new(config: ScrapeConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            enricher: None,
        }
    }

    /// Attach the optional commute enrichment pass.
    pub fn with_enricher(mut self, enricher: CommuteEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Run the harvest to completion, returning the accumulated dataset and
    /// the run statistics.
    pub async fn run(&self) -> Result<(Dataset, RunStats)> {
        let session_id = Uuid::new_v4();
        let started = Instant::now();
        let mut stats = RunStats::default();

        info!(
            session_id = %session_id,
            url = %self.config.base_search_url,
            page_limit = self.config.page_limit,
            "starting scrape run"
        );

        let mut dataset = if self.config.load_existing {
            storage::load_dataset(&self.config.data_file_name, &self.config.data_directory)
                .context("Failed to load existing dataset")?
        } else {
            Dataset::new()
        };
        if !dataset.is_empty() {
            info!("loaded {} previously collected listings", dataset.len());
        }

        for (page_index, search_url) in SearchPages::new(&self.config.base_search_url)?.enumerate()
        {
            // Page-limit guard, checked before fetching. 0 means unbounded.
            if self.config.page_limit != 0 && page_index as u32 >= self.config.page_limit {
                info!("page limit of {} reached", self.config.page_limit);
                break;
            }

            let discovery = self.discover_page(&search_url).await?;
            stats.pages_visited += 1;
            stats.promoted_urls_seen += discovery.promoted_count;
            stats.standard_urls_seen += discovery.standard_count;

            if discovery.is_exhausted() {
                info!(page = %search_url, "standard listing group empty; end of results");
                break;
            }

            self.harvest_listings(&discovery, &mut dataset, &mut stats)
                .await;

            self.checkpoint(&dataset)?;
            info!(
                "page {} done: dataset now holds {} listings",
                stats.pages_visited,
                dataset.len()
            );
        }

        if self.config.save_to_file {
            storage::save_dataset(
                &dataset,
                &self.config.data_file_name,
                &self.config.data_directory,
            )
            .context("Failed to save final dataset")?;
        }

        stats.elapsed = started.elapsed();
        info!(
            session_id = %session_id,
            pages = stats.pages_visited,
            new_listings = stats.new_listings_fetched,
            total = dataset.len(),
            elapsed_s = stats.elapsed.as_secs(),
            "scrape run finished"
        );

        Ok((dataset, stats))
    }

    /// Fetch and discover one search page. A failure here ends the run — the
    /// search page is the run's backbone, unlike individual listings.
    async fn discover_page(&self, search_url: &str) -> Result<Discovery> {
        let body = self
            .fetcher
            .get_text(search_url)
            .await
            .with_context(|| format!("Failed to fetch search page: {search_url}"))?;
        let document = Html::parse_document(&body);
        Ok(discover_listing_urls(&document, search_url))
    }

    /// Fetch, extract and merge every discovered listing that passes the
    /// dedup gate. Per-listing failures are logged and skipped.
    async fn harvest_listings(
        &self,
        discovery: &Discovery,
        dataset: &mut Dataset,
        stats: &mut RunStats,
    ) {
        for listing_url in &discovery.urls {
            if !self.config.refetch_known && dataset.contains_url(listing_url) {
                info!("skipping already known listing: {}", listing_url);
                continue;
            }

            let body = match self.fetcher.get_text(listing_url).await {
                Ok(body) => body,
                Err(err) => {
                    error!(url = %listing_url, error = %err, "failed to fetch listing; skipping");
                    continue;
                }
            };
            stats.new_listings_fetched += 1;

            // The parse tree is not held across await points.
            let record = {
                let document = Html::parse_document(&body);
                extract_listing(&document, listing_url)
            };

            let Some(mut record) = record else {
                warn!(url = %listing_url, "listing produced no usable record");
                continue;
            };

            if let Some(enricher) = &self.enricher {
                enricher.enrich(&mut record).await;
            }

            dataset.merge(record);
            stats.records_merged += 1;
        }
    }

    /// Persist the dataset after one page: the checkpoint path first, then
    /// the primary output.
    fn checkpoint(&self, dataset: &Dataset) -> Result<()> {
        if !self.config.save_to_file {
            return Ok(());
        }
        storage::save_dataset(
            dataset,
            &storage::checkpoint_name(&self.config.data_file_name),
            &self.config.data_directory,
        )
        .context("Failed to write checkpoint")?;
        storage::save_dataset(
            dataset,
            &self.config.data_file_name,
            &self.config.data_directory,
        )
        .context("Failed to write primary output")?;
        Ok(())
    }
}
