//! CoinGecko market-data source implementation

use crate::{
    cache::QueryParam,
    config::ClientConfig,
    error::ProviderError,
    provider::MarketDataSource,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;

/// CoinGecko REST source
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
}

impl CoinGeckoSource {
    /// Creates a new CoinGecko source from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ProviderError::unreachable)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the absolute URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    async fn get_json(&self, endpoint: &str, params: &[QueryParam]) -> Result<Value, ProviderError> {
        let url = self.build_url(endpoint);
        tracing::debug!(url = %url, params = params.len(), "Requesting CoinGecko");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ProviderError::unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("Failed to read body: {}", e)))?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::invalid_response(format!(
                "Failed to parse CoinGecko response from {}: {}",
                endpoint, e
            ))
        })
    }

    fn source_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://example.test/api/v3/".to_string(),
            ..ClientConfig::default()
        };
        let source = CoinGeckoSource::new(&config).unwrap();
        assert_eq!(
            source.build_url("/coins/markets"),
            "https://example.test/api/v3/coins/markets"
        );
        assert_eq!(source.source_name(), "coingecko");
    }

    #[tokio::test]
    async fn test_unreachable_host_classifies_as_network_error() {
        let config = ClientConfig {
            // Port 9 (discard) on loopback refuses connections on a normal host
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: std::time::Duration::from_secs(2),
            ..ClientConfig::default()
        };
        let source = CoinGeckoSource::new(&config).unwrap();
        let err = source.get_json("/ping", &[]).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NetworkUnavailable);
    }
}
