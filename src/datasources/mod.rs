pub mod bikeshare;
pub mod geocoding;

pub use bikeshare::BikeShareClient;
pub use geocoding::GeocodingClient;

use crate::error::Result;
use crate::models::StationRecord;

/// Source of station snapshots for the alert loop.
#[async_trait::async_trait]
pub trait StationFeed: Send + Sync {
    /// Fetch the full station list. Every call goes to the network.
    async fn refresh(&self) -> Result<Vec<StationRecord>>;
}
