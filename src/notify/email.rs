//! SMTP delivery of alerts to the configured operator address.

use super::Notifier;
use crate::config::Config;
use crate::error::{BikeAlertError, Result};
use crate::models::Alert;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

pub const SMTP_PORT: u16 = 587;

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// STARTTLS on port 587, authenticated as the sender address.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.email_from_server,
            &config.email_from_address,
            &config.email_from_password,
            &config.email_to_address,
            config.request_timeout(),
        )
    }

    pub fn new(
        smtp_host: &str,
        from: &str,
        password: &str,
        to: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let from_mailbox: Mailbox = from.parse().map_err(|e: lettre::address::AddressError| {
            BikeAlertError::Config(format!("email_from_address '{}': {}", from, e))
        })?;
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            BikeAlertError::Config(format!("email_to_address '{}': {}", to, e))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| BikeAlertError::Config(format!("email_from_server: {}", e)))?
            .port(SMTP_PORT)
            .credentials(Credentials::new(from.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from: from_mailbox,
            to: to_mailbox,
        })
    }

    fn build_message(&self, alert: &Alert) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body())
            .map_err(|e| BikeAlertError::MailDelivery(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let email = self.build_message(alert)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| BikeAlertError::MailDelivery(e.to_string()))?;

        tracing::info!(
            channel = "email",
            station = %alert.station_id,
            condition = %alert.kind,
            count = alert.count,
            threshold = alert.threshold,
            "alert delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
