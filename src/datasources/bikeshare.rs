use super::StationFeed;
use crate::error::{BikeAlertError, Result};
use crate::models::StationRecord;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "http://www.capitalbikeshare.com/data/stations/bikeStations.xml";

pub struct BikeShareClient {
    client: reqwest::Client,
    url: String,
}

impl BikeShareClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetch and parse the station XML document
    pub async fn fetch_stations(&self) -> Result<Vec<StationRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BikeAlertError::FeedUnavailable(format!("{}: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(BikeAlertError::FeedUnavailable(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            BikeAlertError::FeedUnavailable(format!("Failed to read station feed: {}", e))
        })?;

        let stations = parse_stations(&body)?;
        tracing::debug!(stations = stations.len(), "station feed refreshed");
        Ok(stations)
    }
}

#[async_trait::async_trait]
impl StationFeed for BikeShareClient {
    async fn refresh(&self) -> Result<Vec<StationRecord>> {
        self.fetch_stations().await
    }
}

/// Parse a station document: every element under the root is a station,
/// and every child element of a station is a field. Entries that cannot be
/// read are skipped; jobs targeting them see an unknown station.
pub fn parse_stations(xml: &str) -> Result<Vec<StationRecord>> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| {
        BikeAlertError::FeedUnavailable(format!("Failed to parse station feed: {}", e))
    })?;

    let stations = doc
        .root_element()
        .children()
        .filter(|n| n.is_element())
        .filter_map(|station| {
            let fields: BTreeMap<String, String> = station
                .children()
                .filter(|n| n.is_element())
                .map(|field| {
                    (
                        field.tag_name().name().to_string(),
                        field.text().unwrap_or_default().trim().to_string(),
                    )
                })
                .collect();

            match StationRecord::from_fields(fields) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed station entry: {}", e);
                    None
                }
            }
        })
        .collect::<Vec<_>>();

    Ok(stations)
}
