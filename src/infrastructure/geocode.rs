//! Google Maps geocoding and distance-matrix client, plus the commute
//! enrichment pass built on top of it.
//!
//! Entirely decoupled from the core pipeline: when enabled, enrichment runs
//! as one more extraction step per record, with the destination coordinate
//! and departure time passed in explicitly.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::dataset::{ListingRecord, Value};

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DISTANCE_MATRIX_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    fn as_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Commute figures for one origin/destination/mode triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommuteMetrics {
    pub distance_m: i64,
    pub duration_s: i64,
}

/// Travel modes the distance-matrix API is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Transit,
    Driving,
    Bicycling,
    Walking,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Transit,
        TravelMode::Driving,
        TravelMode::Bicycling,
        TravelMode::Walking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Transit => "transit",
            TravelMode::Driving => "driving",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Walking => "walking",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<DistanceMatrixRow>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixRow {
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixElement {
    status: String,
    distance: Option<Quantity>,
    duration: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    value: i64,
}

/// Thin typed client over the two Maps endpoints the enrichment needs.
pub struct MapsClient {
    client: Client,
    api_key: String,
}

impl MapsClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create Maps HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Resolve a free-form address to a coordinate pair.
    pub async fn geocode(&self, address: &str) -> Result<Coordinates> {
        let response: GeocodeResponse = self
            .client
            .get(GEOCODE_ENDPOINT)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()
            .await
            .context("Geocode request failed")?
            .json()
            .await
            .context("Geocode response was not valid JSON")?;

        if response.status != "OK" {
            anyhow::bail!("Geocode returned status {} for {:?}", response.status, address);
        }
        let location = response
            .results
            .first()
            .map(|r| &r.geometry.location)
            .with_context(|| format!("Geocode returned no results for {address:?}"))?;

        Ok(Coordinates {
            latitude: location.lat,
            longitude: location.lng,
        })
    }

    /// Distance and duration between two coordinates for one travel mode.
    pub async fn distance_matrix(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<CommuteMetrics> {
        let response: DistanceMatrixResponse = self
            .client
            .get(DISTANCE_MATRIX_ENDPOINT)
            .query(&[
                ("origins", origin.as_param().as_str()),
                ("destinations", destination.as_param().as_str()),
                ("mode", mode.as_str()),
                ("departure_time", &departure_time.timestamp().to_string()),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .context("Distance-matrix request failed")?
            .json()
            .await
            .context("Distance-matrix response was not valid JSON")?;

        if response.status != "OK" {
            anyhow::bail!("Distance matrix returned status {}", response.status);
        }

        let element = response
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .context("Distance matrix returned no elements")?;
        if element.status != "OK" {
            anyhow::bail!("Distance matrix element status {}", element.status);
        }

        let (distance, duration) = element
            .distance
            .as_ref()
            .zip(element.duration.as_ref())
            .context("Distance matrix element missing distance or duration")?;

        Ok(CommuteMetrics {
            distance_m: distance.value,
            duration_s: duration.value,
        })
    }
}

/// Per-record commute enrichment with explicit destination and departure
/// dependencies. The destination is geocoded once at construction.
pub struct CommuteEnricher {
    maps: MapsClient,
    destination: Coordinates,
    departure_time: DateTime<Utc>,
}

impl CommuteEnricher {
    pub async fn new(
        maps: MapsClient,
        destination_address: &str,
        departure_time: DateTime<Utc>,
    ) -> Result<Self> {
        let destination = maps
            .geocode(destination_address)
            .await
            .with_context(|| format!("Failed to geocode destination {destination_address:?}"))?;
        Ok(Self {
            maps,
            destination,
            departure_time,
        })
    }

    /// Add coordinates and per-mode commute fields to a record, keyed off its
    /// `address` field. Enrichment failures degrade the record, never the
    /// run: the commute fields are simply absent.
    pub async fn enrich(&self, record: &mut ListingRecord) {
        let Some(address) = record.get("address").and_then(Value::as_str).map(String::from) else {
            warn!("record has no address; skipping commute enrichment");
            return;
        };

        let origin = match self.maps.geocode(&address).await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                warn!(error = %err, "failed to geocode listing address; skipping commute enrichment");
                return;
            }
        };

        record.insert("latitude".to_string(), Value::Float(origin.latitude));
        record.insert("longitude".to_string(), Value::Float(origin.longitude));

        for mode in TravelMode::ALL {
            match self
                .maps
                .distance_matrix(origin, self.destination, mode, self.departure_time)
                .await
            {
                Ok(metrics) => {
                    record.insert(
                        format!("commute_{}_distance_m", mode.as_str()),
                        Value::Int(metrics.distance_m),
                    );
                    record.insert(
                        format!("commute_{}_duration_s", mode.as_str()),
                        Value::Int(metrics.duration_s),
                    );
                }
                Err(err) => {
                    warn!(mode = mode.as_str(), error = %err, "distance-matrix lookup failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_modes_map_to_api_strings() {
        assert_eq!(TravelMode::Transit.as_str(), "transit");
        assert_eq!(TravelMode::Driving.as_str(), "driving");
        assert_eq!(TravelMode::Bicycling.as_str(), "bicycling");
        assert_eq!(TravelMode::Walking.as_str(), "walking");
    }

    #[test]
    fn coordinates_format_as_query_param() {
        let warsaw = Coordinates {
            latitude: 52.2297,
            longitude: 21.0122,
        };
        assert_eq!(warsaw.as_param(), "52.2297,21.0122");
    }

    #[test]
    fn geocode_response_deserializes() {
        let body = r#"{
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 52.2297, "lng": 21.0122}}}]
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.results[0].geometry.location.lat, 52.2297);
    }

    #[test]
    fn distance_matrix_response_deserializes() {
        let body = r#"{
            "status": "OK",
            "rows": [{"elements": [{
                "status": "OK",
                "distance": {"text": "5.2 km", "value": 5200},
                "duration": {"text": "18 mins", "value": 1080}
            }]}]
        }"#;
        let parsed: DistanceMatrixResponse = serde_json::from_str(body).unwrap();
        let element = &parsed.rows[0].elements[0];
        assert_eq!(element.distance.as_ref().unwrap().value, 5200);
        assert_eq!(element.duration.as_ref().unwrap().value, 1080);
    }
}
