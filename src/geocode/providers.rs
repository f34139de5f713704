//! Geoapify forward-geocoding provider.

use super::types::{Coordinates, CoordinateResolver, ResolveFailure};
use serde::Deserialize;
use std::time::Duration;

const GEOAPIFY_SEARCH_URL: &str = "https://api.geoapify.com/v1/geocode/search";
const USER_AGENT: &str = "AddressGrouper/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Response shape ─────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
pub struct Feature {
    pub geometry: Geometry,
}

/// GeoJSON point geometry: `coordinates` is `[lon, lat]`.
#[derive(Deserialize, Debug)]
pub struct Geometry {
    pub coordinates: Vec<f64>,
}

/// Take the first feature of a search response.
pub fn first_feature_coordinates(
    address: &str,
    body: &FeatureCollection,
) -> Result<Coordinates, ResolveFailure> {
    let feature = body
        .features
        .first()
        .ok_or_else(|| ResolveFailure::NoResults(address.to_string()))?;
    match feature.geometry.coordinates.as_slice() {
        [lon, lat, ..] => Ok(Coordinates::new(*lat, *lon)),
        other => Err(ResolveFailure::InvalidResponse(format!(
            "expected [lon, lat], got {} values",
            other.len()
        ))),
    }
}

// ─── Client ─────────────────────────────────────────────────────

pub struct GeoapifyClient {
    api_key: String,
}

impl GeoapifyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn search(&self, address: &str) -> Result<Coordinates, ResolveFailure> {
        let response = ureq::get(GEOAPIFY_SEARCH_URL)
            .set("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .query("text", address)
            .query("limit", "1")
            .query("apiKey", &self.api_key)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ResolveFailure::Status(code),
                ureq::Error::Transport(t) => {
                    tracing::debug!(error = %t, "geoapify transport error");
                    ResolveFailure::Network(format!("Requested address: \"{}\" failed", address))
                }
            })?;

        let body: FeatureCollection = response
            .into_json()
            .map_err(|e| ResolveFailure::InvalidResponse(e.to_string()))?;

        first_feature_coordinates(address, &body)
    }
}

impl CoordinateResolver for GeoapifyClient {
    fn resolve(&mut self, address: &str) -> Result<Coordinates, ResolveFailure> {
        self.search(address)
    }
}
