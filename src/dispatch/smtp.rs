//! SMTP dispatcher — lettre over rustls, for deployments that relay
//! through a plain SMTP account instead of an HTTP provider API.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::compose::EmailEnvelope;
use crate::dispatch::EmailDispatcher;
use crate::error::DispatchError;

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

/// Sends envelopes through an authenticated SMTP relay.
pub struct SmtpDispatcher {
    settings: Arc<SmtpSettings>,
}

impl SmtpDispatcher {
    pub fn new(settings: SmtpSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    fn envelope_error(&self, reason: impl ToString) -> DispatchError {
        DispatchError::Envelope {
            provider: self.provider().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl EmailDispatcher for SmtpDispatcher {
    fn provider(&self) -> &str {
        "smtp"
    }

    async fn send(&self, envelope: &EmailEnvelope) -> Result<(), DispatchError> {
        // The from address is caller input and may not parse as a
        // mailbox at all; that is an envelope failure, not a transport
        // one.
        let message = Message::builder()
            .from(envelope.from.parse().map_err(|e| {
                self.envelope_error(format!("invalid from address: {e}"))
            })?)
            .to(envelope.to.parse().map_err(|e| {
                self.envelope_error(format!("invalid to address: {e}"))
            })?)
            .subject(&envelope.subject)
            .body(envelope.body.clone())
            .map_err(|e| self.envelope_error(format!("failed to build message: {e}")))?;

        let settings = Arc::clone(&self.settings);
        let provider = self.provider().to_string();

        // lettre's SmtpTransport is blocking; keep it off the runtime
        // threads the same way the IMAP poller does.
        tokio::task::spawn_blocking(move || {
            let creds = Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().to_string(),
            );
            let transport = SmtpTransport::relay(&settings.host)
                .map_err(|e| DispatchError::Transport {
                    provider: provider.clone(),
                    reason: format!("SMTP relay error: {e}"),
                })?
                .port(settings.port)
                .credentials(creds)
                .build();

            transport
                .send(&message)
                .map(|_| ())
                .map_err(|e| DispatchError::Provider {
                    provider: provider.clone(),
                    detail: format!("SMTP send failed: {e}"),
                })
        })
        .await
        .map_err(|e| DispatchError::Transport {
            provider: self.provider().to_string(),
            reason: format!("send task failed: {e}"),
        })??;

        debug!(host = %self.settings.host, "SMTP relay accepted message");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> SmtpDispatcher {
        SmtpDispatcher::new(SmtpSettings {
            host: "smtp.test.com".into(),
            port: 587,
            username: "user".into(),
            password: SecretString::from("pass"),
        })
    }

    #[test]
    fn provider_name() {
        assert_eq!(dispatcher().provider(), "smtp");
    }

    #[tokio::test]
    async fn unparseable_from_is_an_envelope_error() {
        let envelope = EmailEnvelope {
            from: "not an address at all".into(),
            to: "inbox@service.test".into(),
            subject: "hello".into(),
            body: "hi".into(),
        };

        match dispatcher().send(&envelope).await {
            Err(DispatchError::Envelope { provider, reason }) => {
                assert_eq!(provider, "smtp");
                assert!(reason.contains("invalid from address"));
            }
            other => panic!("expected envelope error, got {other:?}"),
        }
    }
}
