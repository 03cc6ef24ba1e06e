//! Run configuration for the scrape engine.
//!
//! One explicit value constructed in `main` and handed to the engine — there
//! is no process-wide settings singleton. Defaults mirror the documented
//! configuration surface: one page, `data/` output directory, no pacing
//! delay, persistence and reload enabled, geocoding off.

use serde::{Deserialize, Serialize};

/// Complete configuration for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Base search URL; optional `page` and `limit` query parameters seed the
    /// pagination sequence.
    pub base_search_url: String,

    /// Number of search pages to visit. 0 means unbounded — the run then
    /// only stops on an empty result page.
    pub page_limit: u32,

    /// Output dataset name, without extension.
    pub data_file_name: String,

    /// Directory the dataset and its checkpoint are written to.
    pub data_directory: String,

    /// Pacing delay applied after every fetch, in milliseconds.
    pub offset_ms: u64,

    /// Persist the dataset (checkpoint + final output) to disk.
    pub save_to_file: bool,

    /// Load previously collected rows at startup so dedup can skip them.
    pub load_existing: bool,

    /// Re-fetch listings whose URL is already in the dataset.
    pub refetch_known: bool,

    /// Optional commute-metrics enrichment via the Google Maps APIs.
    pub geocode: Option<GeocodeConfig>,
}

/// Settings for the optional commute enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Google Maps API key.
    pub api_key: String,

    /// Commute destination, as a free-form address.
    pub destination: String,

    /// Departure time used for the distance-matrix queries, RFC 3339.
    pub departure_time: chrono::DateTime<chrono::Utc>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_search_url: String::new(),
            page_limit: 1,
            data_file_name: "otodom".to_string(),
            data_directory: "data".to_string(),
            offset_ms: 0,
            save_to_file: true,
            load_existing: true,
            refetch_known: false,
            geocode: None,
        }
    }
}
