//! Client health metrics collection and reporting
//!
//! Tracks network latency percentiles, success rate and cache effectiveness.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Metrics snapshot for a client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMetrics {
    /// Name of the underlying source
    pub source_name: String,
    /// 50th percentile latency of successful requests in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful requests in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate of network requests (0.0 to 1.0)
    pub success_rate: f64,
    /// Network requests issued (lifetime)
    pub total_requests: u64,
    /// Network requests that failed (lifetime)
    pub failed_requests: u64,
    /// Reads answered from the cache
    pub cache_hits: u64,
    /// Reads that had to go to the network
    pub cache_misses: u64,
}

impl ClientMetrics {
    /// Share of reads answered from the cache (0.0 when nothing was read)
    pub fn cache_hit_rate(&self) -> f64 {
        let reads = self.cache_hits + self.cache_misses;
        if reads == 0 {
            0.0
        } else {
            self.cache_hits as f64 / reads as f64
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct RequestTotals {
    samples: VecDeque<LatencySample>,
    total: u64,
    failed: u64,
}

/// Collects and computes metrics for a client
pub struct MetricsCollector {
    source_name: String,
    requests: RwLock<RequestTotals>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl MetricsCollector {
    /// Creates a new metrics collector for a source
    pub fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            requests: RwLock::new(RequestTotals {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..RequestTotals::default()
            }),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    /// Records a network request with its duration and success status
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let mut requests = self.requests.write().await;
        requests.total += 1;
        if !success {
            requests.failed += 1;
        }

        if requests.samples.len() >= MAX_SAMPLES {
            requests.samples.pop_front();
        }
        requests.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> ClientMetrics {
        let requests = self.requests.read().await;

        let mut latencies: Vec<f64> = requests
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if requests.total > 0 {
            (requests.total - requests.failed) as f64 / requests.total as f64
        } else {
            1.0
        };

        ClientMetrics {
            source_name: self.source_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: requests.total,
            failed_requests: requests.failed,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let collector = MetricsCollector::new("test");

        collector.record_request(Duration::from_millis(100), true).await;
        collector.record_request(Duration::from_millis(200), true).await;
        collector.record_request(Duration::from_millis(150), false).await;
        collector.record_cache_hit();
        collector.record_cache_miss();
        collector.record_cache_miss();

        let metrics = collector.get_metrics().await;

        assert_eq!(metrics.source_name, "test");
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 2);
        assert!((metrics.cache_hit_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_collector() {
        let metrics = MetricsCollector::new("idle").get_metrics().await;
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.success_rate, 1.0);
        assert_eq!(metrics.latency_p50_ms, 0.0);
        assert_eq!(metrics.cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 9.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
