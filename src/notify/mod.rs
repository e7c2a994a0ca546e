pub mod email;

pub use email::EmailNotifier;

use crate::error::Result;
use crate::models::Alert;

/// Delivery channel for threshold alerts.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Human-readable name for this channel (e.g. "email").
    fn channel_name(&self) -> &str;
}
