//! Email dispatch — one capability, interchangeable providers.
//!
//! The pipeline only ever sees `dyn EmailDispatcher`; which provider is
//! active is decided once at startup from configuration.

pub mod mailgun;
pub mod smtp;

use async_trait::async_trait;

use crate::compose::EmailEnvelope;
use crate::error::DispatchError;

pub use mailgun::MailgunDispatcher;
pub use smtp::SmtpDispatcher;

/// Capability to hand an envelope to an email provider for delivery.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Provider name, for logs and error detail.
    fn provider(&self) -> &str;

    /// Attempt delivery exactly once. No internal retry or backoff; a
    /// failed send is reported upward and the request is answered with
    /// the failure.
    async fn send(&self, envelope: &EmailEnvelope) -> Result<(), DispatchError>;
}
