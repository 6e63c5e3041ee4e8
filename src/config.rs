//! Runtime configuration for the market-data client
//!
//! Defaults come from `constants`. A few values can be overridden through
//! environment variables:
//!
//! - `CRYPTO_TRACKER_API_URL`: provider base URL
//! - `CRYPTO_TRACKER_CACHE_TTL_SECS`: response cache TTL
//! - `CRYPTO_TRACKER_TIMEOUT_SECS`: HTTP request timeout, at least one second

use crate::constants::{CACHE_TTL_SECS, COINGECKO_API_URL, REQUEST_TIMEOUT_SECS, USER_AGENT};
use std::time::Duration;

pub const ENV_API_URL: &str = "CRYPTO_TRACKER_API_URL";
pub const ENV_CACHE_TTL_SECS: &str = "CRYPTO_TRACKER_CACHE_TTL_SECS";
pub const ENV_TIMEOUT_SECS: &str = "CRYPTO_TRACKER_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Provider base URL, without trailing slash
    pub base_url: String,
    /// Response cache TTL
    pub cache_ttl: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            cache_ttl: Duration::from_secs(CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any valid environment variable
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ttl) = parse_secs(&lookup, ENV_CACHE_TTL_SECS) {
            config.cache_ttl = ttl;
        }
        match parse_secs(&lookup, ENV_TIMEOUT_SECS) {
            Some(timeout) if timeout.is_zero() => {
                tracing::warn!(
                    variable = ENV_TIMEOUT_SECS,
                    "Request timeout must be at least one second, keeping default"
                );
            }
            Some(timeout) => config.request_timeout = timeout,
            None => {}
        }

        config
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Duration> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(variable = name, value = %raw, error = %e, "Ignoring invalid setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.base_url, "https://api.coingecko.com/api/v3");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "https://pro-api.example.test/v3/"),
            (ENV_CACHE_TTL_SECS, "120"),
            (ENV_TIMEOUT_SECS, "5"),
        ]));
        assert_eq!(config.base_url, "https://pro-api.example.test/v3");
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_CACHE_TTL_SECS, "one minute"),
            (ENV_API_URL, "  "),
        ]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_zero_timeout_keeps_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_TIMEOUT_SECS, "0"),
            (ENV_CACHE_TTL_SECS, "0"),
        ]));
        assert_eq!(config.request_timeout, Duration::from_secs(REQUEST_TIMEOUT_SECS));
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }
}
