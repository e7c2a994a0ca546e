use crate::error::{BikeAlertError, Result};
use crate::models::Coordinates;
use serde::Deserialize;
use std::time::Duration;

const API_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    from_sensor: bool,
}

// Geocoding API response structures
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

impl GeocodingClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(API_BASE_URL, api_key, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            from_sensor: false,
        })
    }

    /// Resolve a free-text address. No match is not an error: the returned
    /// coordinates are simply unresolved.
    pub async fn resolve(&self, address: &str) -> Result<Coordinates> {
        let url = self.request_url(address)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            BikeAlertError::GeocodingService(format!("request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BikeAlertError::GeocodingService(format!(
                "geocoder returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(|e| {
            BikeAlertError::GeocodingService(format!("Failed to read geocoder response: {}", e))
        })?;

        let coordinates = parse_response(&body)?;
        if !coordinates.is_resolved() {
            tracing::info!(address, "geocoder returned no results");
        }
        Ok(coordinates)
    }

    fn request_url(&self, address: &str) -> Result<reqwest::Url> {
        let sensor = if self.from_sensor { "true" } else { "false" };
        let mut params = vec![("address", address), ("sensor", sensor)];
        if let Some(ref key) = self.api_key {
            params.push(("key", key.as_str()));
        }

        reqwest::Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            BikeAlertError::GeocodingService(format!("invalid geocoder URL: {}", e))
        })
    }
}

fn parse_response(body: &str) -> Result<Coordinates> {
    let response: GeocodeResponse = serde_json::from_str(body).map_err(|e| {
        BikeAlertError::GeocodingService(format!("Failed to parse geocoder response: {}", e))
    })?;

    Ok(response
        .results
        .first()
        .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
        .unwrap_or_else(Coordinates::unresolved))
}
