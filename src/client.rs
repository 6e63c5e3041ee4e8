//! Cached market-data client
//!
//! Every read goes through the shared [`ResponseCache`] first. Only a miss
//! reaches the [`MarketDataSource`]; a successful, decodable response is
//! stored under the same key. Failures are logged and returned as
//! [`ProviderError`], whose [`kind`](ProviderError::kind) gives the
//! user-facing classification.

use crate::{
    cache::{CacheStats, QueryParam, ResponseCache},
    config::ClientConfig,
    constants::{
        MARKETS_ENDPOINT, MAX_PER_PAGE, MIN_SEARCH_QUERY_CHARS, SEARCH_ENDPOINT,
        TRENDING_ENDPOINT, VS_CURRENCY,
    },
    error::ProviderError,
    metrics::{ClientMetrics, MetricsCollector},
    provider::MarketDataSource,
    providers::CoinGeckoSource,
    types::{
        CoinDetail, HistoricalSeries, Interval, MarketAsset, MarketChartResponse, SearchCoin,
        SearchResponse, TrendingCoin, TrendingResponse,
    },
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

/// Client for the market-data provider
///
/// # Example
/// ```no_run
/// use crypto_tracker_sdk::{ClientConfig, MarketDataClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MarketDataClient::new(&ClientConfig::from_env())?;
/// let top = client.fetch_market_list(10, 1).await?;
/// for asset in &top {
///     println!("{} {:?}", asset.name, asset.current_price);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MarketDataClient {
    source: Arc<dyn MarketDataSource>,
    cache: Arc<ResponseCache>,
    metrics: Arc<MetricsCollector>,
}

impl MarketDataClient {
    /// Creates a client backed by CoinGecko with a fresh cache
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        let source = Arc::new(CoinGeckoSource::new(config)?);
        let cache = Arc::new(ResponseCache::with_ttl(config.cache_ttl));
        Ok(Self::with_source(source, cache))
    }

    /// Creates a client over any source and an existing cache
    ///
    /// Several clients may share one cache.
    pub fn with_source(source: Arc<dyn MarketDataSource>, cache: Arc<ResponseCache>) -> Self {
        let metrics = Arc::new(MetricsCollector::new(source.source_name()));
        Self {
            source,
            cache,
            metrics,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.source_name()
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Cache-first GET decoded into `T`
    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<QueryParam>,
    ) -> Result<T, ProviderError> {
        let key = self.cache.key(endpoint, &params);

        if let Some(payload) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Cache hit");
            self.metrics.record_cache_hit();
            return decode(endpoint, &payload);
        }
        tracing::debug!(key = %key, "Cache miss");
        self.metrics.record_cache_miss();

        let start = Instant::now();
        let result = match self.source.get_json(endpoint, &params).await {
            Ok(payload) => decode::<T>(endpoint, &payload).map(|decoded| (payload, decoded)),
            Err(e) => Err(e),
        };

        match result {
            Ok((payload, decoded)) => {
                self.metrics.record_request(start.elapsed(), true).await;
                self.cache.insert(key, payload);
                Ok(decoded)
            }
            Err(e) => {
                self.metrics.record_request(start.elapsed(), false).await;
                tracing::error!(
                    key = %key,
                    kind = ?e.kind(),
                    error = %e,
                    "Market data request failed"
                );
                Err(e)
            }
        }
    }

    fn markets_params(per_page: u32, page: u32) -> Vec<QueryParam> {
        vec![
            ("vs_currency", VS_CURRENCY.to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ]
    }

    /// Top `limit` assets by market cap on the given page
    ///
    /// # Arguments
    /// * `limit` - Page size, 1 to 250
    /// * `page` - 1-based page number
    pub async fn fetch_market_list(
        &self,
        limit: u32,
        page: u32,
    ) -> Result<Vec<MarketAsset>, ProviderError> {
        if !(1..=MAX_PER_PAGE).contains(&limit) {
            return Err(ProviderError::invalid_parameter(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PER_PAGE, limit
            )));
        }
        if page < 1 {
            return Err(ProviderError::invalid_parameter("page must be at least 1"));
        }

        self.request(MARKETS_ENDPOINT, Self::markets_params(limit, page))
            .await
    }

    /// Market rows for exactly the given ids, in the provider's order
    ///
    /// An empty slice returns immediately without touching the network.
    pub async fn fetch_market_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<MarketAsset>, ProviderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = Self::markets_params(MAX_PER_PAGE, 1);
        params.push(("ids", ids.join(",")));
        self.request(MARKETS_ENDPOINT, params).await
    }

    /// Price, volume and market-cap history over the trailing `days`
    pub async fn fetch_historical_series(
        &self,
        id: &str,
        days: u32,
    ) -> Result<HistoricalSeries, ProviderError> {
        validate_coin_id(id)?;
        if days == 0 {
            return Err(ProviderError::invalid_parameter("days must be at least 1"));
        }

        let params = vec![
            ("vs_currency", VS_CURRENCY.to_string()),
            ("days", days.to_string()),
            ("interval", Interval::for_days(days).as_str().to_string()),
        ];
        let chart: MarketChartResponse = self
            .request(&format!("/coins/{}/market_chart", id), params)
            .await?;

        Ok(HistoricalSeries::from_chart(chart))
    }

    /// Detail view of a single coin
    pub async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetail, ProviderError> {
        validate_coin_id(id)?;

        let params = vec![
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ];
        self.request(&format!("/coins/{}", id), params).await
    }

    /// Coins matching `query`
    ///
    /// Queries shorter than two characters return empty without a request.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>, ProviderError> {
        if query.chars().count() < MIN_SEARCH_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let response: SearchResponse = self
            .request(SEARCH_ENDPOINT, vec![("query", query.to_string())])
            .await?;
        Ok(response.coins)
    }

    /// Coins currently trending on the provider
    pub async fn fetch_trending(&self) -> Result<Vec<TrendingCoin>, ProviderError> {
        let response: TrendingResponse = self.request(TRENDING_ENDPOINT, Vec::new()).await?;
        Ok(response.coins.into_iter().map(|c| c.item).collect())
    }

    /// Drops every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Response cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Request latency, success rate and cache effectiveness
    pub async fn metrics(&self) -> ClientMetrics {
        self.metrics.get_metrics().await
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, payload: &serde_json::Value) -> Result<T, ProviderError> {
    T::deserialize(payload).map_err(|e| {
        ProviderError::invalid_response(format!("Unexpected payload from {}: {}", endpoint, e))
    })
}

fn validate_coin_id(id: &str) -> Result<(), ProviderError> {
    if id.is_empty() || id.contains(['/', '?', '#', '&']) {
        return Err(ProviderError::invalid_parameter(format!(
            "invalid coin id {:?}",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::provider::mock::{MockReply, MockSource};
    use serde_json::{json, Value};
    use std::time::Duration;

    pub(crate) fn asset_json(id: &str, price: f64) -> Value {
        json!({
            "id": id,
            "symbol": &id[..3.min(id.len())],
            "name": id,
            "image": format!("https://assets.example.test/{}.png", id),
            "current_price": price,
            "market_cap": price * 1e6,
            "market_cap_rank": 1,
            "total_volume": price * 1e4,
            "high_24h": price * 1.1,
            "low_24h": price * 0.9,
            "price_change_24h": 1.5,
            "price_change_percentage_24h": 0.5
        })
    }

    fn client_with(source: &Arc<MockSource>) -> MarketDataClient {
        MarketDataClient::with_source(source.clone(), Arc::new(ResponseCache::default()))
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_read_within_ttl_is_served_from_cache() {
        let source = MockSource::new();
        source.set_json(MARKETS_ENDPOINT, json!([asset_json("bitcoin", 43000.0)]));
        let client = client_with(&source);

        let first = client.fetch_market_list(10, 1).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = client.fetch_market_list(10, 1).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.call_count(), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        client.fetch_market_list(10, 1).await.unwrap();
        assert_eq!(source.call_count(), 2);

        let metrics = client.metrics().await;
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 2);
        assert_eq!(metrics.total_requests, 2);
    }

    #[tokio::test]
    async fn test_different_parameters_use_different_entries() {
        let source = MockSource::new();
        source.set_json(MARKETS_ENDPOINT, json!([]));
        let client = client_with(&source);

        client.fetch_market_list(10, 1).await.unwrap();
        client.fetch_market_list(10, 2).await.unwrap();
        client.fetch_market_list(10, 1).await.unwrap();

        assert_eq!(source.call_count(), 2);
        assert_eq!(client.cache_stats().valid_entries, 2);
    }

    #[tokio::test]
    async fn test_ranked_list_query_parameters() {
        let source = MockSource::new();
        source.set_json(MARKETS_ENDPOINT, json!([]));
        let client = client_with(&source);

        client.fetch_market_list(100, 2).await.unwrap();

        assert_eq!(
            source.last_request().unwrap().as_str(),
            "/coins/markets?order=market_cap_desc&page=2&per_page=100\
             &price_change_percentage=24h&sparkline=false&vs_currency=usd"
        );
    }

    #[tokio::test]
    async fn test_list_parameter_validation() {
        let source = MockSource::new();
        source.set_json(MARKETS_ENDPOINT, json!([]));
        let client = client_with(&source);

        for (limit, page) in [(0, 1), (251, 1), (50, 0)] {
            let err = client.fetch_market_list(limit, page).await.unwrap_err();
            assert!(matches!(err, ProviderError::InvalidParameter(_)));
            assert_eq!(err.kind(), ErrorKind::Unclassified);
        }
        assert!(client.fetch_market_list(250, 1).await.is_ok());
        assert!(client.fetch_market_list(1, 1).await.is_ok());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_by_ids_empty_performs_no_io() {
        let source = MockSource::new();
        let client = client_with(&source);

        let result = client.fetch_market_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(source.call_count(), 0);
        assert_eq!(client.cache_stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_by_ids_returns_provider_order() {
        let source = MockSource::new();
        source.set_json(
            MARKETS_ENDPOINT,
            json!([asset_json("ethereum", 2300.0), asset_json("bitcoin", 43000.0)]),
        );
        let client = client_with(&source);

        let result = client
            .fetch_market_by_ids(&ids(&["bitcoin", "ethereum"]))
            .await
            .unwrap();

        let returned: Vec<&str> = result.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(returned, vec!["ethereum", "bitcoin"]);
        let key = source.last_request().unwrap();
        assert!(key.as_str().contains("ids=bitcoin,ethereum"));
        assert!(key.as_str().contains("per_page=250"));
        assert!(key.as_str().contains("page=1"));
    }

    #[tokio::test]
    async fn test_historical_interval_mapping() {
        let source = MockSource::new();
        let endpoint = "/coins/bitcoin/market_chart";
        source.set_json(
            endpoint,
            json!({"prices": [[1700000000000u64, 1.0]], "market_caps": [[1700000000000u64, 2.0]], "total_volumes": [[1700000000000u64, 3.0]]}),
        );
        let client = client_with(&source);

        for (days, interval) in [(1, "hourly"), (7, "daily"), (30, "daily"), (31, "weekly"), (365, "weekly")] {
            let series = client.fetch_historical_series("bitcoin", days).await.unwrap();
            assert_eq!(series.len(), 1);
            let key = source.last_request().unwrap();
            assert!(
                key.as_str().contains(&format!("interval={}", interval)),
                "days={} produced {}",
                days,
                key
            );
            assert!(key.as_str().contains(&format!("days={}", days)));
            assert!(key.as_str().contains("vs_currency=usd"));
        }
    }

    #[tokio::test]
    async fn test_historical_rejects_bad_arguments() {
        let source = MockSource::new();
        let client = client_with(&source);

        assert!(client.fetch_historical_series("bitcoin", 0).await.is_err());
        assert!(client.fetch_historical_series("", 7).await.is_err());
        assert!(client.fetch_historical_series("a/b", 7).await.is_err());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_short_query_short_circuits() {
        let source = MockSource::new();
        source.set_json(
            SEARCH_ENDPOINT,
            json!({"coins": [{"id": "bitcoin", "name": "Bitcoin", "symbol": "BTC", "market_cap_rank": 1}]}),
        );
        let client = client_with(&source);

        assert!(client.search("").await.unwrap().is_empty());
        assert!(client.search("b").await.unwrap().is_empty());
        assert_eq!(source.call_count(), 0);

        let hits = client.search("bt").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "bitcoin");
        assert_eq!(source.last_request().unwrap().as_str(), "/search?query=bt");
    }

    #[tokio::test]
    async fn test_trending_and_details() {
        let source = MockSource::new();
        source.set_json(
            TRENDING_ENDPOINT,
            json!({"coins": [{"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE", "score": 0}}]}),
        );
        source.set_json(
            "/coins/bitcoin",
            json!({"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "market_data": {"current_price": {"usd": 43000.0}}}),
        );
        let client = client_with(&source);

        let trending = client.fetch_trending().await.unwrap();
        assert_eq!(trending[0].id, "pepe");
        assert_eq!(source.last_request().unwrap().as_str(), "/search/trending");

        let detail = client.fetch_coin_details("bitcoin").await.unwrap();
        assert_eq!(detail.market_data.unwrap().price_usd(), Some(43000.0));
        assert_eq!(
            source.last_request().unwrap().as_str(),
            "/coins/bitcoin?community_data=false&developer_data=false&localization=false\
             &market_data=true&tickers=false"
        );
    }

    #[tokio::test]
    async fn test_failures_are_classified_and_not_cached() {
        let source = MockSource::new();
        let client = client_with(&source);

        source.set_reply(MARKETS_ENDPOINT, MockReply::RateLimited);
        let err = client.fetch_market_list(10, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.to_display().title, "Rate Limit Exceeded");

        source.set_reply(MARKETS_ENDPOINT, MockReply::Offline);
        let err = client.fetch_market_list(10, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);

        source.set_reply(MARKETS_ENDPOINT, MockReply::Status(500));
        let err = client.fetch_market_list(10, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unclassified);

        assert_eq!(source.call_count(), 3);
        assert_eq!(client.cache_stats().total_entries, 0);
        assert_eq!(client.metrics().await.failed_requests, 3);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_unclassified() {
        let source = MockSource::new();
        source.set_json(MARKETS_ENDPOINT, json!({"error": "not a list"}));
        let client = client_with(&source);

        let err = client.fetch_market_list(10, 1).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Unclassified);

        client.fetch_market_list(10, 1).await.unwrap_err();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_network() {
        let source = MockSource::new();
        source.set_json(SEARCH_ENDPOINT, json!({"coins": []}));
        let client = client_with(&source);

        client.search("eth").await.unwrap();
        client.search("eth").await.unwrap();
        assert_eq!(source.call_count(), 1);

        client.clear_cache();
        client.search("eth").await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_clients_can_share_a_cache() {
        let source = MockSource::new();
        source.set_json(TRENDING_ENDPOINT, json!({"coins": []}));
        let cache = Arc::new(ResponseCache::default());
        let a = MarketDataClient::with_source(source.clone(), cache.clone());
        let b = MarketDataClient::with_source(source.clone(), cache);

        a.fetch_trending().await.unwrap();
        b.fetch_trending().await.unwrap();
        assert_eq!(source.call_count(), 1);
    }
}
