//! Request pipeline — validate → verify → compose → dispatch → respond.
//!
//! Strictly linear per request. Every path through `handle` terminates
//! in exactly one response; a failed stage short-circuits the rest.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::compose::compose;
use crate::dispatch::EmailDispatcher;
use crate::error::DispatchError;
use crate::submission::{self, BASE_FIELDS, Field};
use crate::verify::{AbuseVerifier, VerificationOutcome};

/// Bounded wait on the verification service. The reference design has
/// no timeout here; a hung CAPTCHA backend must not hang the request.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded wait on the email provider.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP-shaped outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    fn ok(message: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({ "status": 200, "message": message }),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "status": 400, "message": message }),
        }
    }

    fn with_error_detail(mut self, detail: &str) -> Self {
        if let Value::Object(map) = &mut self.body {
            map.insert("error".to_string(), Value::String(detail.to_string()));
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Orchestrates one submission from raw payload to response.
///
/// Holds only read-only, startup-time state; concurrent requests share
/// it behind an `Arc` with no synchronization.
pub struct RequestPipeline {
    destination: String,
    verifier: Option<Arc<dyn AbuseVerifier>>,
    dispatcher: Arc<dyn EmailDispatcher>,
}

impl RequestPipeline {
    pub fn new(
        destination: String,
        verifier: Option<Arc<dyn AbuseVerifier>>,
        dispatcher: Arc<dyn EmailDispatcher>,
    ) -> Self {
        Self {
            destination,
            verifier,
            dispatcher,
        }
    }

    /// Whether the verification stage is active.
    pub fn verification_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    /// Required fields for this deployment: the four base fields, plus
    /// the verification token when a verifier is configured.
    fn required_fields(&self) -> Vec<Field> {
        let mut required = BASE_FIELDS.to_vec();
        if self.verifier.is_some() {
            required.push(Field::RecaptchaToken);
        }
        required
    }

    /// Run one submission through the full pipeline.
    pub async fn handle(&self, payload: Map<String, Value>) -> ApiResponse {
        // Received → Validated
        let submission = match submission::validate(&payload, &self.required_fields()) {
            Ok(s) => s,
            Err(missing) => {
                warn!(field = missing.0.key(), "Rejected submission: {missing}");
                return ApiResponse::bad_request(&missing.to_string());
            }
        };

        info!(from = %submission.email, "Received a contact message");

        // Validated → Verified (skipped entirely when not configured)
        if let Some(verifier) = &self.verifier {
            // validate() required the token above, so it is present here.
            let token = submission.recaptcha_token.as_deref().unwrap_or_default();

            let outcome = match tokio::time::timeout(VERIFY_TIMEOUT, verifier.verify(token)).await
            {
                Ok(outcome) => outcome,
                Err(_) => VerificationOutcome::ServiceError {
                    detail: format!("verification timed out after {VERIFY_TIMEOUT:?}"),
                },
            };

            // Rejection and service failure stay distinct in the logs
            // even though the response collapses them to one 400.
            match outcome {
                VerificationOutcome::Accepted => {}
                VerificationOutcome::Rejected { reason } => {
                    warn!(from = %submission.email, %reason, "Verification rejected submission");
                    return ApiResponse::bad_request("reCaptcha validation failed")
                        .with_error_detail(&reason);
                }
                VerificationOutcome::ServiceError { detail } => {
                    error!(%detail, "Verification service unavailable");
                    return ApiResponse::bad_request("reCaptcha validation failed")
                        .with_error_detail(&detail);
                }
            }
        }

        // Verified → Composed (pure, always succeeds)
        let envelope = compose(&submission, &self.destination);

        // Composed → Dispatched, exactly one attempt
        let sent = match tokio::time::timeout(DISPATCH_TIMEOUT, self.dispatcher.send(&envelope))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout {
                provider: self.dispatcher.provider().to_string(),
                timeout: DISPATCH_TIMEOUT,
            }),
        };

        // Dispatched → Responded
        match sent {
            Ok(()) => {
                info!(to = %envelope.to, "Send email");
                ApiResponse::ok("Send email")
            }
            Err(e) => {
                error!(provider = self.dispatcher.provider(), "Failed to send email: {e}");
                ApiResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "status": 500, "message": "Failed to send email" }),
                }
                .with_error_detail(&e.to_string())
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
