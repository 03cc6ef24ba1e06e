//! CLI entry point for the otodom harvester.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use otodom_harvest::config::{GeocodeConfig, ScrapeConfig};
use otodom_harvest::infrastructure::geocode::{CommuteEnricher, MapsClient};
use otodom_harvest::infrastructure::http_client::{HttpClient, HttpClientConfig};
use otodom_harvest::ScrapeEngine;

#[derive(Parser, Debug)]
#[command(author, version, about = "Incremental harvester for otodom.pl listings")]
struct Args {
    /// Base otodom search URL; optional page/limit query parameters seed the
    /// pagination sequence.
    #[arg(long)]
    url: String,

    /// Number of search pages to visit; 0 means until the results run out.
    #[arg(long, default_value_t = 1)]
    page_limit: u32,

    /// Output dataset name, without extension.
    #[arg(long, default_value = "otodom")]
    data_file_name: String,

    /// Directory for the dataset and its checkpoint.
    #[arg(long, default_value = "data")]
    data_directory: String,

    /// Delay after every request, in seconds.
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Persist the dataset to disk.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    save_to_file: bool,

    /// Load previously collected listings at startup (enables dedup).
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    load_existing: bool,

    /// Re-fetch listings already present in the dataset.
    #[arg(long, default_value_t = false)]
    refetch_known: bool,

    /// Enrich records with commute metrics from the Google Maps APIs.
    #[arg(long, default_value_t = false)]
    use_gcp: bool,

    /// Path to a file holding the Google Maps API key.
    #[arg(long, default_value = "gcp_api.key")]
    gcp_key_path: String,

    /// Commute destination address; required with --use-gcp.
    #[arg(long, required_if_eq("use_gcp", "true"))]
    destination: Option<String>,

    /// Departure time for commute queries, RFC 3339 (defaults to now).
    #[arg(long)]
    departure_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl Args {
    fn into_config(self) -> Result<ScrapeConfig> {
        let geocode = if self.use_gcp {
            let api_key = std::fs::read_to_string(&self.gcp_key_path)
                .with_context(|| format!("Failed to read API key from {}", self.gcp_key_path))?
                .trim()
                .to_string();
            Some(GeocodeConfig {
                api_key,
                destination: self
                    .destination
                    .context("--destination is required with --use-gcp")?,
                departure_time: self.departure_time.unwrap_or_else(chrono::Utc::now),
            })
        } else {
            None
        };

        Ok(ScrapeConfig {
            base_search_url: self.url,
            page_limit: self.page_limit,
            data_file_name: self.data_file_name,
            data_directory: self.data_directory,
            offset_ms: (self.offset * 1000.0) as u64,
            save_to_file: self.save_to_file,
            load_existing: self.load_existing,
            refetch_known: self.refetch_known,
            geocode,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Starting scrape of {}...", args.url);
    let config = args.into_config()?;

    let fetcher = HttpClient::new(HttpClientConfig {
        offset_ms: config.offset_ms,
        ..Default::default()
    })?;

    let mut engine = ScrapeEngine::new(config.clone(), fetcher);
    if let Some(geocode) = &config.geocode {
        let maps = MapsClient::new(geocode.api_key.clone())?;
        let enricher =
            CommuteEnricher::new(maps, &geocode.destination, geocode.departure_time).await?;
        engine = engine.with_enricher(enricher);
    }

    let (dataset, stats) = engine.run().await?;

    info!(
        "collected {} listings across {} pages ({} standard / {} promoted urls seen, {} newly fetched) in {:.1}s",
        dataset.len(),
        stats.pages_visited,
        stats.standard_urls_seen,
        stats.promoted_urls_seen,
        stats.new_listings_fetched,
        stats.elapsed.as_secs_f64()
    );

    Ok(())
}
