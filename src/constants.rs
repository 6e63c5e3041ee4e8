//! Constants for the crypto tracker data layer
//!
//! Compile-time defaults live here. `ClientConfig` can override the
//! provider-facing ones at runtime (see the `config` module).

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Endpoint for market rows (ranked or by id)
pub const MARKETS_ENDPOINT: &str = "/coins/markets";

/// Endpoint for coin search
pub const SEARCH_ENDPOINT: &str = "/search";

/// Endpoint for trending coins
pub const TRENDING_ENDPOINT: &str = "/search/trending";

/// Quote currency for every market request
pub const VS_CURRENCY: &str = "usd";

/// How long a cached response stays valid (in seconds)
pub const CACHE_TTL_SECS: u64 = 60;

/// Default auto-refresh interval for trackers (in milliseconds)
pub const REFRESH_INTERVAL_MS: u64 = 60_000;

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Largest page the provider accepts for `/coins/markets`
pub const MAX_PER_PAGE: u32 = 250;

/// Default page size for the ranked list
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Queries shorter than this never reach the provider
pub const MIN_SEARCH_QUERY_CHARS: usize = 2;

/// Storage key holding the JSON-encoded watchlist
pub const WATCHLIST_STORAGE_KEY: &str = "crypto-watchlist";

/// Storage key holding the theme preference
pub const THEME_STORAGE_KEY: &str = "theme";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-tracker-sdk/0.1.0";

/// Ids shown by the list tracker when it is not in ranked mode
pub const DEFAULT_CRYPTO_IDS: &[&str] = &[
    "bitcoin",
    "ethereum",
    "cardano",
    "solana",
    "polkadot",
    "chainlink",
    "litecoin",
    "polygon",
    "avalanche-2",
    "uniswap",
];
