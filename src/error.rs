//! Error types for the contact relay.

use std::time::Duration;

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors. All of these are fatal at startup —
/// none is ever produced during request handling.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Email dispatch errors. The `detail`/`reason` payloads carry whatever
/// the provider returned; no stable schema is assumed across providers.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Provider {provider} rejected the message: {detail}")]
    Provider { provider: String, detail: String },

    #[error("Transport error reaching provider {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Provider {provider} could not build envelope: {reason}")]
    Envelope { provider: String, reason: String },

    #[error("Dispatch via {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;

// ── Tests ───────────────────────────────────────────────────────────
