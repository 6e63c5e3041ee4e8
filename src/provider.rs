//! Provider abstraction for fetching raw market data from external APIs

use crate::{cache::QueryParam, error::ProviderError};
use async_trait::async_trait;
use serde_json::Value;

/// Trait for market-data sources
///
/// A source performs one GET against the provider and returns the decoded
/// JSON body. Status handling happens here: HTTP 429 must surface as
/// [`ProviderError::RateLimitExceeded`], a request that never got a response
/// as [`ProviderError::Unreachable`], any other non-2xx status as
/// [`ProviderError::HttpStatus`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches `endpoint` with the given query parameters
    ///
    /// # Arguments
    /// * `endpoint` - Path relative to the API base, e.g. `/coins/markets`
    /// * `params` - Query parameters in request order
    async fn get_json(&self, endpoint: &str, params: &[QueryParam]) -> Result<Value, ProviderError>;

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;
}
