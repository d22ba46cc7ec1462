//! Human-verification gate — reCAPTCHA siteverify over HTTP.
//!
//! Optional component: the pipeline only carries a verifier when a
//! verification secret is configured.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

/// Outcome of a verification attempt.
///
/// `Rejected` (the service answered and said "not human") and
/// `ServiceError` (the service could not be consulted) both fail the
/// request, but they are different conditions and are logged as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Accepted,
    Rejected { reason: String },
    ServiceError { detail: String },
}

/// Capability seam for human verification, so the pipeline can be
/// exercised in tests without a network.
#[async_trait]
pub trait AbuseVerifier: Send + Sync {
    /// Consult the verification service exactly once for `token`.
    /// Never retries; a transport failure is a `ServiceError` outcome,
    /// not an `Err` — the pipeline maps all three outcomes itself.
    async fn verify(&self, token: &str) -> VerificationOutcome;
}

/// Default siteverify endpoint.
const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Wire shape of a siteverify response. Only the fields the relay
/// consumes; everything else the service sends is ignored.
#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// reCAPTCHA verifier — posts the token to the siteverify endpoint.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: SecretString,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
            endpoint: SITEVERIFY_URL.to_string(),
        }
    }

    /// Point the verifier at a non-default endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl AbuseVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> VerificationOutcome {
        let params = [
            ("secret", self.secret.expose_secret()),
            ("response", token),
        ];

        let response = match self.client.post(&self.endpoint).form(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                return VerificationOutcome::ServiceError {
                    detail: format!("siteverify request failed: {e}"),
                };
            }
        };

        match response.json::<SiteverifyResponse>().await {
            Ok(body) => {
                debug!(success = body.success, "siteverify response received");
                outcome_for(body)
            }
            Err(e) => VerificationOutcome::ServiceError {
                detail: format!("siteverify response was unreadable: {e}"),
            },
        }
    }
}

/// Reduce a decoded siteverify response to an outcome.
fn outcome_for(body: SiteverifyResponse) -> VerificationOutcome {
    if body.success {
        VerificationOutcome::Accepted
    } else {
        let reason = if body.error_codes.is_empty() {
            "verification was not successful".to_string()
        } else {
            body.error_codes.join(", ")
        };
        VerificationOutcome::Rejected { reason }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
