//! External collaborators: HTTP transport, CSV storage and the Google Maps
//! geocoding client.

pub mod geocode;
pub mod http_client;
pub mod storage;

pub use geocode::{CommuteEnricher, Coordinates, MapsClient, TravelMode};
pub use http_client::{Fetch, HttpClient, HttpClientConfig};
