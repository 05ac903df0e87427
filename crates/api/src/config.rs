//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPKART_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `CLIENT_URL` - Public base URL of the web client, used to build the
//!   checkout success/cancel redirect URLs
//! - `STRIPE_SECRET_KEY` - Stripe secret API key (`sk_...`)
//!
//! ## Optional
//! - `SHOPKART_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPKART_PORT` - Listen port (default: 5000)
//! - `STRIPE_WEBHOOK_SECRET` - Webhook signing secret (`whsec_...`); without
//!   it the webhook endpoint reports itself unconfigured
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the web client (no trailing slash)
    pub client_url: String,
    /// Stripe API configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (`sk_live_...` / `sk_test_...`)
    pub secret_key: SecretString,
    /// Webhook signing secret (`whsec_...`)
    pub webhook_secret: Option<SecretString>,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the Stripe secrets fail validation (shape and placeholder checks).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHOPKART_DATABASE_URL")?;
        let host = get_env_or_default("SHOPKART_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPKART_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOPKART_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPKART_PORT".to_string(), e.to_string()))?;
        let client_url = normalize_client_url(&get_required_env("CLIENT_URL")?)?;

        let stripe = StripeConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            client_url,
            stripe,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret_key = get_required_env("STRIPE_SECRET_KEY")?;
        validate_stripe_secret_key(&secret_key, "STRIPE_SECRET_KEY")?;

        let webhook_secret = match get_optional_env("STRIPE_WEBHOOK_SECRET") {
            Some(value) => {
                validate_webhook_secret(&value, "STRIPE_WEBHOOK_SECRET")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            secret_key: SecretString::from(secret_key),
            webhook_secret,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and normalize the client base URL.
///
/// Redirect URLs are built by appending paths, so the stored form never ends
/// with a slash.
fn normalize_client_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("CLIENT_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CLIENT_URL".to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Validate that a value looks like a real Stripe secret key.
///
/// Stripe secret keys start with `sk_` (or `rk_` for restricted keys); a
/// value without that shape is a placeholder or a mis-pasted publishable key.
fn validate_stripe_secret_key(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if !secret.starts_with("sk_") && !secret.starts_with("rk_") {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must be a Stripe secret key (sk_... or rk_...)".to_string(),
        ));
    }

    if secret.len() < 12 {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "too short to be a Stripe secret key".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a value looks like a Stripe webhook signing secret.
fn validate_webhook_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if !secret.starts_with("whsec_") {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must be a Stripe webhook signing secret (whsec_...)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_stripe_secret_key_placeholder() {
        let result = validate_stripe_secret_key("sk_test_your-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_stripe_secret_key_wrong_prefix() {
        // A publishable key must not be accepted where a secret key is needed
        let result = validate_stripe_secret_key("pk_test_51Hxyzabc123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_stripe_secret_key_too_short() {
        let result = validate_stripe_secret_key("sk_test", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_stripe_secret_key_valid() {
        assert!(validate_stripe_secret_key("sk_test_51Hxyzabc123", "TEST_VAR").is_ok());
        assert!(validate_stripe_secret_key("rk_live_51Hxyzabc123", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_webhook_secret() {
        assert!(validate_webhook_secret("whsec_abc123def456", "TEST_VAR").is_ok());
        assert!(validate_webhook_secret("sk_test_51Hxyzabc123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_normalize_client_url_strips_trailing_slash() {
        assert_eq!(
            normalize_client_url("https://shop.example.com/").unwrap(),
            "https://shop.example.com"
        );
        assert_eq!(
            normalize_client_url("http://localhost:3000").unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_normalize_client_url_rejects_garbage() {
        assert!(normalize_client_url("not a url").is_err());
        assert!(normalize_client_url("ftp://shop.example.com").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            client_url: "http://localhost:3000".to_string(),
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51Hxyzabc123"),
                webhook_secret: None,
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_stripe_config_debug_redacts_secrets() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_live_super_secret_value"),
            webhook_secret: Some(SecretString::from("whsec_super_secret_value")),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_super_secret_value"));
        assert!(!debug_output.contains("whsec_super_secret_value"));
    }
}
