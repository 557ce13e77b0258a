//! Server configuration.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Nothing here fails: an unparsable value falls back to its default and a
//! warning is recorded in [`ServerConfig::warnings`], to be logged once the
//! tracing subscriber is up.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use samabrains_core::brevo::{DEFAULT_BREVO_URL, DEFAULT_TIMEOUT};
use samabrains_core::email::{DEFAULT_CONTACT_EMAIL, DEFAULT_CONTACT_NAME, Mailbox, SenderIdentity};
use samabrains_core::origin::{DEFAULT_ALLOWED_ORIGINS, OriginGuard};
use samabrains_core::rate_limit::RateLimitPolicy;
use samabrains_core::relay::{ApiKey, RelayConfig};

const DEFAULT_PORT: u16 = 3000;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Every origin allowed, `debug` logging, human-readable log lines.
    Development,
    /// Origin allow-list enforced, `info` logging, JSON log lines.
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Deployment mode.
    pub environment: Environment,
    /// Log level filter (e.g., `info`, `debug`). `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Brevo API key; `None` means every relay answers "Server configuration error".
    pub brevo_api_key: Option<ApiKey>,
    /// Brevo send endpoint.
    pub brevo_api_url: String,
    /// Bound on one Brevo request.
    pub brevo_timeout: Duration,
    /// Operator mailbox, `None` when `CONTACT_EMAIL` is unset.
    pub contact_email: Option<String>,
    /// Operator display name.
    pub contact_name: String,
    /// Who appears as the sender of relayed messages.
    pub sender_identity: SenderIdentity,
    /// Browser origins allowed to call `/api/*` in production.
    pub allowed_origins: Vec<String>,
    /// Whether to take the client IP from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy: bool,
    /// Root of the static site.
    pub site_dir: PathBuf,
    /// Limit applied to every route.
    pub general_limit: RateLimitPolicy,
    /// Limit applied to contact submissions.
    pub email_limit: RateLimitPolicy,
    /// Problems found while loading, logged at startup.
    pub warnings: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BIND_ADDR`: full bind address (overrides `PORT`)
    /// - `PORT`: port to bind on `0.0.0.0` (default: `3000`)
    /// - `APP_ENV` / `NODE_ENV`: `production` or anything else (default: development)
    /// - `LOG_LEVEL`: log filter (default: `info` in production, `debug` otherwise)
    /// - `BREVO_API_KEY`: Brevo API key (required to relay)
    /// - `BREVO_API_URL`: Brevo send endpoint
    /// - `BREVO_TIMEOUT_SECS`: upstream timeout (default: `10`)
    /// - `CONTACT_EMAIL`: operator mailbox (default: `info@samabrains.com`)
    /// - `CONTACT_NAME`: operator display name (default: `SamaBrains Solutions`)
    /// - `CONTACT_SENDER`: `operator` or `submitter` (default: `operator`)
    /// - `ALLOWED_ORIGINS`: comma-separated origin allow-list
    /// - `TRUST_PROXY`: honour forwarding headers (default: `false`)
    /// - `SITE_DIR`: static site root (default: `./public`)
    /// - `RATE_LIMIT_GENERAL_MAX` / `RATE_LIMIT_GENERAL_WINDOW_SECS` (default: `100` / `60`)
    /// - `RATE_LIMIT_EMAIL_MAX` / `RATE_LIMIT_EMAIL_WINDOW_SECS` (default: `5` / `900`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let environment = match var("APP_ENV").or_else(|| var("NODE_ENV")) {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        };

        // Priority: BIND_ADDR > PORT > default 0.0.0.0:3000
        let bind_addr = if let Some(addr) = var("BIND_ADDR") {
            addr.parse().unwrap_or_else(|_| {
                warnings.push(format!(
                    "invalid BIND_ADDR `{addr}`, using 0.0.0.0:{DEFAULT_PORT}"
                ));
                SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
            })
        } else {
            let port = parse_or(&var, "PORT", DEFAULT_PORT, &mut warnings);
            SocketAddr::from(([0, 0, 0, 0], port))
        };

        let log_level = var("LOG_LEVEL").unwrap_or_else(|| {
            if environment.is_production() {
                "info".to_owned()
            } else {
                "debug".to_owned()
            }
        });

        let brevo_api_key = var("BREVO_API_KEY").as_deref().and_then(ApiKey::new);
        let brevo_api_url = var("BREVO_API_URL").unwrap_or_else(|| DEFAULT_BREVO_URL.to_owned());
        let brevo_timeout = Duration::from_secs(parse_or(
            &var,
            "BREVO_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
            &mut warnings,
        ));

        let contact_email = var("CONTACT_EMAIL")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());
        let contact_name =
            var("CONTACT_NAME").unwrap_or_else(|| DEFAULT_CONTACT_NAME.to_owned());

        let sender_identity = match var("CONTACT_SENDER") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warnings.push(format!("{e}, using 'operator'"));
                SenderIdentity::Operator
            }),
            None => SenderIdentity::Operator,
        };

        let allowed_origins = var("ALLOWED_ORIGINS").map_or_else(
            || DEFAULT_ALLOWED_ORIGINS.iter().map(|&o| o.to_owned()).collect(),
            |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_owned)
                    .collect()
            },
        );

        let trust_proxy = var("TRUST_PROXY").is_some_and(|v| v == "true" || v == "1");

        let site_dir = PathBuf::from(var("SITE_DIR").unwrap_or_else(|| "./public".to_owned()));

        let general_limit = limit_policy(&var, "GENERAL", RateLimitPolicy::general(), &mut warnings);
        let email_limit = limit_policy(&var, "EMAIL", RateLimitPolicy::email(), &mut warnings);

        Self {
            bind_addr,
            environment,
            log_level,
            brevo_api_key,
            brevo_api_url,
            brevo_timeout,
            contact_email,
            contact_name,
            sender_identity,
            allowed_origins,
            trust_proxy,
            site_dir,
            general_limit,
            email_limit,
            warnings,
        }
    }

    /// The mailbox receiving submissions.
    #[must_use]
    pub fn operator_mailbox(&self) -> Mailbox {
        Mailbox::new(
            self.contact_email
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_owned()),
            self.contact_name.clone(),
        )
    }

    /// Relay settings derived from this configuration.
    #[must_use]
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            api_key: self.brevo_api_key.clone(),
            operator: self.operator_mailbox(),
            sender: self.sender_identity,
        }
    }

    /// Origin guard derived from this configuration.
    #[must_use]
    pub fn origin_guard(&self) -> OriginGuard {
        OriginGuard::new(
            self.allowed_origins.iter().cloned(),
            self.environment.is_production(),
        )
    }
}

/// Parse `key` as a positive number, falling back to `default`.
fn parse_or<F, T>(var: &F, key: &str, default: T, warnings: &mut Vec<String>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialEq + Default + std::fmt::Display + Copy,
{
    match var(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value != T::default() => value,
            _ => {
                warnings.push(format!("invalid value for {key} (`{raw}`), using default {default}"));
                default
            }
        },
    }
}

fn limit_policy<F>(
    var: &F,
    name: &str,
    policy: RateLimitPolicy,
    warnings: &mut Vec<String>,
) -> RateLimitPolicy
where
    F: Fn(&str) -> Option<String>,
{
    let max = parse_or(var, &format!("RATE_LIMIT_{name}_MAX"), policy.max, warnings);
    let window_secs = parse_or(
        var,
        &format!("RATE_LIMIT_{name}_WINDOW_SECS"),
        policy.window.as_secs(),
        warnings,
    );
    policy.with_limit(max, Duration::from_secs(window_secs))
}
