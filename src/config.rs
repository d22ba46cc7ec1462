//! Process configuration, built once from the environment at startup.
//!
//! Missing required configuration fails startup before the listener
//! binds; nothing in here is read per-request.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Deployment environment. Affects the CORS origin allow-list only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Which email provider this deployment dispatches through.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Mailgun {
        api_key: SecretString,
        domain: String,
    },
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: SecretString,
    },
}

/// Immutable process-wide configuration. Constructed once in `main`
/// and passed explicitly into components; there is no ambient lookup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub destination_email: String,
    pub provider: ProviderConfig,
    /// Presence enables the verification stage of the pipeline.
    pub recaptcha_secret: Option<SecretString>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Read configuration from the environment. Fails fast on any
    /// missing required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_value(std::env::var("APP_ENV").ok().as_deref());

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => 8080,
        };

        let destination_email = require_env("SERVICE_DESTINATION_EMAIL")?;

        let provider = match std::env::var("EMAIL_PROVIDER").as_deref() {
            Err(_) | Ok("mailgun") => ProviderConfig::Mailgun {
                api_key: SecretString::from(require_env("MAILGUN_API_KEY")?),
                domain: require_env("MAILGUN_DOMAIN_NAME")?,
            },
            Ok("smtp") => ProviderConfig::Smtp {
                host: require_env("SMTP_HOST")?,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(587),
                username: require_env("SMTP_USERNAME")?,
                password: SecretString::from(require_env("SMTP_PASSWORD")?),
            },
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "EMAIL_PROVIDER".into(),
                    message: format!("unknown provider: {other} (expected mailgun or smtp)"),
                });
            }
        };

        let recaptcha_secret = std::env::var("RECAPTCHA_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let configured_origins = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
        let allowed_origins = build_origins(environment, &configured_origins, port);

        Ok(Self {
            port,
            environment,
            destination_email,
            provider,
            recaptcha_secret,
            allowed_origins,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// CORS allow-list: the configured origins, with localhost appended in
/// development so a local front-end can talk to a local relay.
fn build_origins(environment: Environment, configured: &str, port: u16) -> Vec<String> {
    let mut origins: Vec<String> = configured
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if environment == Environment::Development {
        origins.push(format!("http://localhost:{port}"));
    }

    origins
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(Environment::from_value(None), Environment::Development);
        assert_eq!(
            Environment::from_value(Some("staging")),
            Environment::Development
        );
    }

    #[test]
    fn production_is_recognized() {
        assert_eq!(
            Environment::from_value(Some("production")),
            Environment::Production
        );
    }

    #[test]
    fn production_origins_are_exactly_the_configured_list() {
        let origins = build_origins(
            Environment::Production,
            "https://www.example.com, https://example.com",
            8080,
        );
        assert_eq!(
            origins,
            vec!["https://www.example.com", "https://example.com"]
        );
    }

    #[test]
    fn development_appends_localhost() {
        let origins = build_origins(Environment::Development, "https://www.example.com", 3000);
        assert_eq!(
            origins,
            vec!["https://www.example.com", "http://localhost:3000"]
        );
    }

    #[test]
    fn empty_configured_origins_yield_only_dev_localhost() {
        let origins = build_origins(Environment::Development, "", 8080);
        assert_eq!(origins, vec!["http://localhost:8080"]);

        let origins = build_origins(Environment::Production, "", 8080);
        assert!(origins.is_empty());
    }
}
