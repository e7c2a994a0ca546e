use thiserror::Error;

#[derive(Error, Debug)]
pub enum BikeAlertError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Station feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Geocoding service error: {0}")]
    GeocodingService(String),

    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, BikeAlertError>;
