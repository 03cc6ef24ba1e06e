//! Incremental harvester for otodom.pl real-estate listings.
//!
//! The pipeline discovers listing URLs from paginated search pages, extracts
//! structured attributes from each listing page with per-field fault
//! isolation, deduplicates against previously collected rows and persists the
//! growing dataset to CSV with a crash-safe checkpoint after every page.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod infrastructure;
pub mod pagination;
pub mod parsing;

pub use config::ScrapeConfig;
pub use dataset::{Dataset, ListingRecord, Value};
pub use engine::{RunStats, ScrapeEngine};
