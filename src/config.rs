//! Startup configuration, read once from the process environment and passed
//! into the handlers explicitly (no process-wide mutable state).

/// Application-level constants
pub const APP_NAME: &str = "LeafScan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Service configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (`PORT`).
    pub port: u16,
    /// Credential for the hosted vision model (`GEMINI_API_KEY`).
    ///
    /// Absence must not abort startup — the service stays up and every
    /// analysis request fails at the provider-call step instead.
    pub gemini_api_key: Option<String>,
    /// Model handle (`GEMINI_MODEL`).
    pub gemini_model: String,
    /// Provider base URL (`GEMINI_BASE_URL`), overridable for tests.
    pub gemini_base_url: String,
    /// Outbound provider call timeout in seconds (`PROVIDER_TIMEOUT_SECS`).
    pub provider_timeout_secs: u64,
    /// Cap on concurrent in-flight provider calls (`MAX_IN_FLIGHT_ANALYSES`).
    pub max_in_flight_analyses: usize,
}

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 90;
const DEFAULT_MAX_IN_FLIGHT: usize = 4;

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        if config.gemini_api_key.is_none() {
            tracing::warn!(
                "GEMINI_API_KEY not set — analysis requests will fail until it is provided"
            );
        }
        config
    }

    /// Build from an arbitrary variable lookup. Factored out of `from_env`
    /// so defaults and parsing are testable without touching the real
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            provider_timeout_secs: parse_or(lookup("PROVIDER_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS),
            max_in_flight_analyses: parse_or(
                lookup("MAX_IN_FLIGHT_ANALYSES"),
                DEFAULT_MAX_IN_FLIGHT,
            ),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
