//! Types for the crypto tracker data layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::format;

/// One row of market data as returned by `/coins/markets`
///
/// Every numeric field is optional: the provider sends `null` for assets
/// without enough trading history and formatting falls back to `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAsset {
    /// Provider identifier, unique within a response batch
    pub id: String,

    /// Ticker symbol (lowercase as sent by the provider)
    pub symbol: String,

    /// Display name
    pub name: String,

    /// Logo URL
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default)]
    pub total_volume: Option<f64>,

    #[serde(default)]
    pub high_24h: Option<f64>,

    #[serde(default)]
    pub low_24h: Option<f64>,

    #[serde(default)]
    pub price_change_24h: Option<f64>,

    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,

    /// Provider-side update time of this row
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl MarketAsset {
    /// Uppercase ticker for display
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Direction of the 24h move
    pub fn change_direction(&self) -> format::ChangeDirection {
        format::ChangeDirection::from_percentage(self.price_change_percentage_24h)
    }
}

/// Sampling granularity of a historical series
///
/// The provider only accepts these combinations, so the mapping from a
/// day count is fixed: up to one day is hourly, up to thirty days is daily,
/// anything longer is weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hourly,
    Daily,
    Weekly,
}

impl Interval {
    /// Granularity the provider requires for a window of `days`
    pub fn for_days(days: u32) -> Self {
        if days <= 1 {
            Interval::Hourly
        } else if days <= 30 {
            Interval::Daily
        } else {
            Interval::Weekly
        }
    }

    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "hourly",
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
        }
    }
}

/// Chart window selectable by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[default]
    #[serde(rename = "7D")]
    SevenDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
}

impl TimeRange {
    /// Parses a range label; unknown labels fall back to seven days
    pub fn from_label(label: &str) -> Self {
        match label {
            "1D" => TimeRange::OneDay,
            "7D" => TimeRange::SevenDays,
            "1M" => TimeRange::OneMonth,
            "1Y" => TimeRange::OneYear,
            _ => TimeRange::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::SevenDays => "7D",
            TimeRange::OneMonth => "1M",
            TimeRange::OneYear => "1Y",
        }
    }

    /// Number of trailing days covered by the range
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::OneDay => 1,
            TimeRange::SevenDays => 7,
            TimeRange::OneMonth => 30,
            TimeRange::OneYear => 365,
        }
    }
}

/// One aligned sample of a historical series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Price, volume and market-cap history aligned on the price timestamps
///
/// Stored as a single vector of points so the projected sequences always
/// have equal length. Points are in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    points: Vec<SeriesPoint>,
}

/// Raw `/coins/{id}/market_chart` payload: `[timestamp_ms, value]` pairs
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    pub market_caps: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, Option<f64>)>,
}

impl HistoricalSeries {
    /// Builds a series from already aligned points, sorting them by time
    pub fn from_points(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Self { points }
    }

    /// Zips the provider's three sequences by index
    ///
    /// Volume and market cap entries missing at an index become `None`;
    /// points with a null price or an unrepresentable timestamp are dropped.
    pub(crate) fn from_chart(chart: MarketChartResponse) -> Self {
        if chart.market_caps.len() != chart.prices.len()
            || chart.total_volumes.len() != chart.prices.len()
        {
            tracing::warn!(
                prices = chart.prices.len(),
                market_caps = chart.market_caps.len(),
                total_volumes = chart.total_volumes.len(),
                "Historical sequences have unequal lengths, aligning on prices"
            );
        }

        let points = chart
            .prices
            .iter()
            .enumerate()
            .filter_map(|(i, &(ts_ms, price))| {
                let timestamp = DateTime::from_timestamp_millis(ts_ms as i64)?;
                Some(SeriesPoint {
                    timestamp,
                    price: price?,
                    volume: chart.total_volumes.get(i).and_then(|(_, v)| *v),
                    market_cap: chart.market_caps.get(i).and_then(|(_, v)| *v),
                })
            })
            .collect();

        Self::from_points(points)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn volumes(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.volume).collect()
    }

    pub fn market_caps(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.market_cap).collect()
    }

    /// Lowest and highest price in the window
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.price);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Historical series plus one axis label per point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub range: TimeRange,
    pub labels: Vec<String>,
    pub series: HistoricalSeries,
}

impl ChartData {
    pub fn new(series: HistoricalSeries, range: TimeRange) -> Self {
        let labels = series
            .points()
            .iter()
            .map(|p| format::chart_label(p.timestamp, range))
            .collect();
        Self {
            range,
            labels,
            series,
        }
    }
}

/// One hit from `/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub api_symbol: Option<String>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

/// One entry from `/search/trending`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub coin_id: Option<u64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub price_btc: Option<f64>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingItem {
    pub item: TrendingCoin,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingItem>,
}

/// Per-currency amounts, e.g. `{"usd": 43000.0, "eur": 39500.0}`
pub type CurrencyMap = HashMap<String, Option<f64>>;

/// Logo URLs at several sizes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinImage {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// `market_data` block of `/coins/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: CurrencyMap,
    #[serde(default)]
    pub market_cap: CurrencyMap,
    #[serde(default)]
    pub total_volume: CurrencyMap,
    #[serde(default)]
    pub high_24h: CurrencyMap,
    #[serde(default)]
    pub low_24h: CurrencyMap,
    #[serde(default)]
    pub ath: CurrencyMap,
    #[serde(default)]
    pub atl: CurrencyMap,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_30d: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
}

impl CoinMarketData {
    /// USD amount from a currency map
    pub fn usd(map: &CurrencyMap) -> Option<f64> {
        map.get("usd").copied().flatten()
    }

    pub fn price_usd(&self) -> Option<f64> {
        Self::usd(&self.current_price)
    }

    pub fn market_cap_usd(&self) -> Option<f64> {
        Self::usd(&self.market_cap)
    }

    pub fn volume_usd(&self) -> Option<f64> {
        Self::usd(&self.total_volume)
    }
}

/// Detail view of a single coin from `/coins/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub hashing_algorithm: Option<String>,
    #[serde(default)]
    pub genesis_date: Option<String>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub description: HashMap<String, Option<String>>,
    #[serde(default)]
    pub image: CoinImage,
    #[serde(default)]
    pub market_data: Option<CoinMarketData>,
}

impl CoinDetail {
    /// English description, if the provider has one
    pub fn description_en(&self) -> Option<&str> {
        self.description
            .get("en")
            .and_then(|d| d.as_deref())
            .filter(|d| !d.is_empty())
    }
}
