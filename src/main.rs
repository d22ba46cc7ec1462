use std::sync::Arc;

use contact_relay::config::{Config, Environment, ProviderConfig};
use contact_relay::dispatch::smtp::SmtpSettings;
use contact_relay::dispatch::{EmailDispatcher, MailgunDispatcher, SmtpDispatcher};
use contact_relay::pipeline::RequestPipeline;
use contact_relay::routes::{cors_layer, message_routes};
use contact_relay::verify::{AbuseVerifier, RecaptchaVerifier};

#[tokio::main]
async fn main() -> contact_relay::error::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Fail fast: missing configuration aborts before the listener binds.
    let config = Config::from_env()?;

    eprintln!("📮 contact-relay v{}", env!("CARGO_PKG_VERSION"));

    let dispatcher: Arc<dyn EmailDispatcher> = match &config.provider {
        ProviderConfig::Mailgun { api_key, domain } => {
            eprintln!("   Provider: mailgun ({domain})");
            Arc::new(MailgunDispatcher::new(api_key.clone(), domain.clone()))
        }
        ProviderConfig::Smtp {
            host,
            port,
            username,
            password,
        } => {
            eprintln!("   Provider: smtp ({host}:{port})");
            Arc::new(SmtpDispatcher::new(SmtpSettings {
                host: host.clone(),
                port: *port,
                username: username.clone(),
                password: password.clone(),
            }))
        }
    };

    let verifier: Option<Arc<dyn AbuseVerifier>> = config
        .recaptcha_secret
        .as_ref()
        .map(|secret| Arc::new(RecaptchaVerifier::new(secret.clone())) as Arc<dyn AbuseVerifier>);

    eprintln!("   Destination: {}", config.destination_email);
    eprintln!(
        "   Verification: {}",
        if verifier.is_some() { "enabled" } else { "disabled" }
    );
    eprintln!(
        "   Environment: {}",
        match config.environment {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    );
    eprintln!("   Origins: {}", config.allowed_origins.join(", "));

    let pipeline = Arc::new(RequestPipeline::new(
        config.destination_email.clone(),
        verifier,
        dispatcher,
    ));

    let app = message_routes(pipeline, cors_layer(&config.allowed_origins));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Contact relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}
