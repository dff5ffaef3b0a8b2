use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Address lookup used to pre-populate load coordinates. Lookups are
/// best-effort: any failure degrades to `None` and the load is saved without
/// coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + 'static {
    async fn geocode(&self, address: &str) -> Option<Coordinates>;
}

/// Nominatim-style search endpoint returning a JSON array of hits.
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
}

impl HttpGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, address, "geocode request failed");
                return None;
            }
        };

        let hits: Vec<GeocodeHit> = match response.json().await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, address, "geocode response was not parseable");
                return None;
            }
        };

        let hit = hits.into_iter().next()?;
        let latitude = hit.lat.parse().ok()?;
        let longitude = hit.lon.parse().ok()?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Used when no geocoder endpoint is configured; every lookup misses.
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _address: &str) -> Option<Coordinates> {
        None
    }
}
