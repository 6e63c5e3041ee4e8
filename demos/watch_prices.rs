use crypto_tracker_sdk::format::{format_market_cap, format_percentage, format_price, format_time};
use crypto_tracker_sdk::{
    ClientConfig, FileStore, KeyValueStore, MarketDataClient, MarketTracker, MarketTrackerConfig,
    Snapshot, Theme, WatchlistTracker,
};
use crypto_tracker_sdk::tracker::MarketList;
use std::sync::Arc;
use std::time::Duration;

fn print_table(snapshot: &Snapshot<MarketList>) {
    if let Some(error) = &snapshot.error {
        println!("[{}] {}", error.title, error.message);
    }
    for asset in snapshot.data.iter() {
        println!(
            "{:<4} {:<8} {:>16} {:>9} {:>10} {}",
            asset.market_cap_rank.map(|r| r.to_string()).unwrap_or_default(),
            asset.display_symbol(),
            format_price(asset.current_price),
            format_percentage(asset.price_change_percentage_24h),
            format_market_cap(asset.market_cap),
            asset.change_direction().icon()
        );
    }
    if let Some(at) = snapshot.last_updated {
        println!("Last updated {}", format_time(at));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Crypto Tracker (CoinGecko)");
    println!("==========================");

    let client = Arc::new(MarketDataClient::new(&ClientConfig::from_env())?);

    // Short interval so a few refreshes show up during the demo
    let config = MarketTrackerConfig {
        refresh_interval: Duration::from_secs(20),
        ..Default::default()
    };
    let tracker = MarketTracker::start(client.clone(), config);
    let mut updates = tracker.subscribe();

    print_table(&tracker.wait_settled().await);

    for _ in 0..3 {
        if updates.changed().await.is_err() {
            break;
        }
        let snapshot = updates.borrow_and_update().clone();
        println!("\n{:-<60}", "");
        print_table(&snapshot);
    }
    tracker.stop();

    let state_path = std::env::temp_dir().join("crypto-tracker-demo.json");
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&state_path));
    let theme = Theme::load(storage.as_ref());
    println!("\nTheme: {} (state in {})", theme.as_str(), state_path.display());

    let watchlist = WatchlistTracker::start(client.clone(), storage.clone());
    watchlist.add("bitcoin")?;
    watchlist.add("solana")?;
    println!("\nWatchlist: {:?}", watchlist.ids());
    print_table(&watchlist.wait_settled().await);

    match client.search("ether").await {
        Ok(hits) => {
            println!("\nSearch \"ether\":");
            for coin in hits.iter().take(5) {
                println!("  {} ({})", coin.name, coin.symbol);
            }
        }
        Err(e) => println!("Search failed: {}", e.to_display()),
    }

    let stats = client.cache_stats();
    println!(
        "\nCache: {} entries ({} valid, {} expired)",
        stats.total_entries, stats.valid_entries, stats.expired_entries
    );

    Ok(())
}
