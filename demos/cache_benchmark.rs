use crypto_tracker_sdk::{ClientConfig, MarketDataClient};
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MarketDataClient::new(&ClientConfig::from_env())?;
    let ids = vec!["solana".to_string()];

    println!(
        "Benchmarking response cache (asset: solana, source: {})...",
        client.source_name()
    );
    println!("-------------------------------------------");

    println!("1. Network latency (cache miss)...");
    let start_api = Instant::now();
    let assets = match client.fetch_market_by_ids(&ids).await {
        Ok(assets) => assets,
        Err(e) => {
            let shown = e.to_display();
            eprintln!("   {}: {}", shown.title, shown.message);
            return Ok(());
        }
    };
    let api_latency = start_api.elapsed();

    if let Some(asset) = assets.first() {
        println!("   Price:  {:?}", asset.current_price);
    }
    println!("   Latency (network + decoding): {:?}", api_latency);
    println!();

    println!("2. Cache latency (served from the response cache)...");
    let iterations = 10_000u32;
    let mut total_cached = Duration::default();

    for _ in 0..iterations {
        let start = Instant::now();
        client.fetch_market_by_ids(&ids).await?;
        total_cached += start.elapsed();
    }
    let avg_cached = total_cached / iterations;

    println!("   Iterations: {}", iterations);
    println!("   Average latency per call: {:?}", avg_cached);
    println!();

    let metrics = client.metrics().await;
    println!("-------------------------------------------");
    println!("Summary:");
    println!("- Network latency:   {:?}", api_latency);
    println!("- Cached latency:    {:?}", avg_cached);
    println!(
        "- Cache hit rate:    {:.2}% ({} hits, {} misses)",
        metrics.cache_hit_rate() * 100.0,
        metrics.cache_hits,
        metrics.cache_misses
    );

    if avg_cached.as_nanos() > 0 {
        let speedup = api_latency.as_secs_f64() / avg_cached.as_secs_f64();
        println!("- Speedup: cached reads are approx. {:.0}x faster than the network.", speedup);
    }

    Ok(())
}
