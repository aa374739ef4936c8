//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 8000)
//! - `ORIGIN` - Browser client origin for CORS and emailed links (default: <http://localhost:3000>)
//! - `PRODUCTION` - `true` enables `Secure` + `SameSite=None` cookies (default: false)
//! - `COOKIE_EXPIRATION_DAYS` - Auth cookie lifetime (default: 30)
//! - `PASSWORD_RESET_EXPIRATION_MINUTES` - Reset link lifetime (default: 60)
//! - `AUTH_RATE_LIMIT_BURST` - Credential requests allowed at once per IP (default: 5)
//! - `AUTH_RATE_LIMIT_PERIOD_SECONDS` - Seconds to earn back one request (default: 6)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM` -
//!   SMTP delivery. Either all of host/username/password/from are set or none;
//!   without them outgoing mail is written to the log.
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Sentry error tracking

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::TimeDelta;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MAX_COOKIE_EXPIRATION_DAYS: i64 = 365;
const MAX_RESET_EXPIRATION_MINUTES: i64 = 7 * 24 * 60;
const MAX_RATE_LIMIT_BURST: i64 = 100_000;
const MAX_RATE_LIMIT_PERIOD_SECONDS: i64 = 3600;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin of the browser client, e.g. `http://localhost:3000` (no trailing slash)
    pub origin: String,
    /// Production mode: secure cross-site cookies
    pub production: bool,
    /// How long the auth cookie stays valid, in days
    pub cookie_expiration_days: i64,
    /// How long a password reset link stays valid, in minutes
    pub password_reset_expiration_minutes: i64,
    /// Rate limit for the credential endpoints
    pub auth_rate_limit: RateLimitConfig,
    /// SMTP settings; `None` logs outgoing mail instead of sending it
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Token-bucket settings for a rate-limited route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed in a burst
    pub burst: u32,
    /// Seconds to replenish one request
    pub period_seconds: u64,
}

/// SMTP configuration for transactional email.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let database_url = env
            .get("BAZAAR_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("BAZAAR_DATABASE_URL".to_string()))?;

        let host = env.parse_or("BAZAAR_HOST", "127.0.0.1".parse::<IpAddr>().ok())?;
        let port = env.parse_or("BAZAAR_PORT", Some(8000_u16))?;
        let origin = parse_origin(&env.get_or("ORIGIN", "http://localhost:3000"))?;
        let production = parse_bool("PRODUCTION", &env.get_or("PRODUCTION", "false"))?;

        let cookie_expiration_days = env.parse_or("COOKIE_EXPIRATION_DAYS", Some(30_i64))?;
        check_range(
            "COOKIE_EXPIRATION_DAYS",
            cookie_expiration_days,
            MAX_COOKIE_EXPIRATION_DAYS,
        )?;

        let password_reset_expiration_minutes =
            env.parse_or("PASSWORD_RESET_EXPIRATION_MINUTES", Some(60_i64))?;
        check_range(
            "PASSWORD_RESET_EXPIRATION_MINUTES",
            password_reset_expiration_minutes,
            MAX_RESET_EXPIRATION_MINUTES,
        )?;

        let burst = env.parse_or("AUTH_RATE_LIMIT_BURST", Some(5_u32))?;
        check_range("AUTH_RATE_LIMIT_BURST", i64::from(burst), MAX_RATE_LIMIT_BURST)?;
        let period_seconds = env.parse_or("AUTH_RATE_LIMIT_PERIOD_SECONDS", Some(6_u64))?;
        check_range(
            "AUTH_RATE_LIMIT_PERIOD_SECONDS",
            i64::try_from(period_seconds).unwrap_or(i64::MAX),
            MAX_RATE_LIMIT_PERIOD_SECONDS,
        )?;

        let email = EmailConfig::from_env(&env)?;

        Ok(Self {
            database_url,
            host,
            port,
            origin,
            production,
            cookie_expiration_days,
            password_reset_expiration_minutes,
            auth_rate_limit: RateLimitConfig {
                burst,
                period_seconds,
            },
            email,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", Some(1.0_f32))?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", Some(0.1_f32))?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Lifetime of a password reset token.
    #[must_use]
    pub fn password_reset_ttl(&self) -> TimeDelta {
        TimeDelta::minutes(self.password_reset_expiration_minutes)
    }

    /// Link emailed to a user who asked to reset their password.
    #[must_use]
    pub fn reset_password_link(&self, user_id: impl std::fmt::Display, token: &str) -> String {
        format!("{}/reset-password/{user_id}/{token}", self.origin)
    }
}

impl EmailConfig {
    fn from_env(env: &Env<'_, impl Fn(&str) -> Option<String>>) -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = env.get("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: env.parse_or("SMTP_PORT", Some(587_u16))?,
            smtp_username: env.required("SMTP_USERNAME")?,
            smtp_password: SecretString::from(env.required("SMTP_PASSWORD")?),
            from_address: env.required("EMAIL_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Borrowed variable lookup with typed accessors.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty strings as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string())),
        }
    }
}

/// Parse a boolean flag written as `true`/`false`/`1`/`0`.
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}

/// Validate the client origin and strip any path or trailing slash.
fn parse_origin(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("ORIGIN".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "ORIGIN".to_string(),
            "must be an http(s) URL with a host".to_string(),
        ));
    }

    Ok(url.origin().ascii_serialization())
}

/// Ensure a positive duration setting stays below its ceiling.
fn check_range(key: &str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 || value > max {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {max} (got {value})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BAZAAR_DATABASE_URL", "postgres://localhost/bazaar")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.origin, "http://localhost:3000");
        assert!(!config.production);
        assert_eq!(config.cookie_expiration_days, 30);
        assert_eq!(config.password_reset_ttl(), TimeDelta::minutes(60));
        assert!(config.email.is_none());
        assert!(config.sentry_dsn.is_none());
        assert_eq!(
            config.auth_rate_limit,
            RateLimitConfig {
                burst: 5,
                period_seconds: 6
            }
        );
    }

    #[test]
    fn test_rate_limit_bounds() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("AUTH_RATE_LIMIT_BURST", "1000"),
        ])
        .unwrap();
        assert_eq!(config.auth_rate_limit.burst, 1000);

        let err = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("AUTH_RATE_LIMIT_PERIOD_SECONDS", "0"),
        ]);
        assert!(matches!(err, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "BAZAAR_DATABASE_URL"));
    }

    #[test]
    fn test_origin_is_normalized() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("ORIGIN", "https://shop.example.com/app/"),
        ])
        .unwrap();
        assert_eq!(config.origin, "https://shop.example.com");
        assert_eq!(
            config.reset_password_link(12, "abc"),
            "https://shop.example.com/reset-password/12/abc"
        );
    }

    #[test]
    fn test_origin_rejects_non_http() {
        let err = load(&[("DATABASE_URL", "postgres://x/y"), ("ORIGIN", "ftp://files")]);
        assert!(matches!(err, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_production_flag() {
        let config = load(&[("DATABASE_URL", "postgres://x/y"), ("PRODUCTION", "true")]).unwrap();
        assert!(config.production);

        let err = load(&[("DATABASE_URL", "postgres://x/y"), ("PRODUCTION", "yes")]);
        assert!(matches!(err, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_expiration_bounds() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("COOKIE_EXPIRATION_DAYS", "0"),
        ]);
        assert!(err.is_err());

        let err = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("PASSWORD_RESET_EXPIRATION_MINUTES", "soon"),
        ]);
        assert!(matches!(err, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_partial_smtp_config_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("SMTP_HOST", "smtp.example.com"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "SMTP_USERNAME"));
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "hunter2-but-longer"),
            ("EMAIL_FROM", "shop@example.com"),
        ])
        .unwrap();

        let email = config.email.unwrap();
        assert_eq!(email.smtp_port, 587);

        let debug_output = format!("{email:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-but-longer"));
    }
}
