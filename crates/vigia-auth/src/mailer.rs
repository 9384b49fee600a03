//! Outbound notification seam.
//!
//! The reset flow only needs one operation from the outside world:
//! deliver a message to an address. Failure is recoverable; it is
//! surfaced to the caller, never fatal to the process.

use thiserror::Error;
use tracing::info;

/// A notification could not be handed off to the channel.
#[derive(Debug, Error)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

/// The notification channel the reset flow dispatches codes through.
pub trait Mailer: Send + Sync {
    fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Default channel for local runs: logs the message instead of sending
/// it anywhere.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        info!(%recipient, %subject, %body, "Outbound mail");
        Ok(())
    }
}
