//! Mailgun dispatcher — API-key-authenticated HTTP call.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::compose::EmailEnvelope;
use crate::dispatch::EmailDispatcher;
use crate::error::DispatchError;

const MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Sends envelopes through the Mailgun messages API.
pub struct MailgunDispatcher {
    client: reqwest::Client,
    api_key: SecretString,
    domain: String,
    base_url: String,
}

impl MailgunDispatcher {
    pub fn new(api_key: SecretString, domain: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            domain,
            base_url: MAILGUN_API_BASE.to_string(),
        }
    }

    /// Point the dispatcher at a non-default API base (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.domain)
    }
}

#[async_trait]
impl EmailDispatcher for MailgunDispatcher {
    fn provider(&self) -> &str {
        "mailgun"
    }

    async fn send(&self, envelope: &EmailEnvelope) -> Result<(), DispatchError> {
        let form = [
            ("from", envelope.from.as_str()),
            ("to", envelope.to.as_str()),
            ("subject", envelope.subject.as_str()),
            ("text", envelope.body.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(self.api_key.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| DispatchError::Transport {
                provider: self.provider().to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(domain = %self.domain, "Mailgun accepted message");
            return Ok(());
        }

        // Keep whatever Mailgun said as opaque diagnostic detail; the
        // error body has no schema the relay relies on.
        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Provider {
            provider: self.provider().to_string(),
            detail: format!("HTTP {status}: {body}"),
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_includes_domain() {
        let dispatcher = MailgunDispatcher::new(
            SecretString::from("key-test"),
            "mg.example.com".to_string(),
        );
        assert_eq!(
            dispatcher.messages_url(),
            "https://api.mailgun.net/v3/mg.example.com/messages"
        );
    }

    #[test]
    fn base_url_override_is_respected() {
        let dispatcher = MailgunDispatcher::new(
            SecretString::from("key-test"),
            "mg.example.com".to_string(),
        )
        .with_base_url("http://127.0.0.1:1234/v3");
        assert_eq!(
            dispatcher.messages_url(),
            "http://127.0.0.1:1234/v3/mg.example.com/messages"
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let dispatcher = MailgunDispatcher::new(
            SecretString::from("key-test"),
            "mg.example.com".to_string(),
        )
        .with_base_url("http://127.0.0.1:9/v3");

        let envelope = EmailEnvelope {
            from: "a@b.com".into(),
            to: "inbox@service.test".into(),
            subject: "hello".into(),
            body: "hi".into(),
        };

        match dispatcher.send(&envelope).await {
            Err(DispatchError::Transport { provider, .. }) => {
                assert_eq!(provider, "mailgun");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
