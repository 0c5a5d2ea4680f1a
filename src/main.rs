use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use trendlens::api::TrackerClient;
use trendlens::config::Config;
use trendlens::feed::{FeedController, FeedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    // Initialize tracker client
    let client = Arc::new(TrackerClient::with_base_url(
        &config.tracker_api_base_url,
        &config.tracker_api_key,
        Duration::from_secs(config.fetch_timeout_secs),
    ));
    info!("Tracker client initialized");

    // One controller per session
    let controller = FeedController::new(client);
    let mut updates = controller.subscribe();

    info!("Selecting default timeframe {}", config.default_timeframe);
    controller.select_timeframe(config.default_timeframe).await;

    loop {
        updates.changed().await?;
        let snapshot = updates.borrow_and_update().clone();
        match snapshot.state {
            FeedState::Ready => {
                info!(
                    "Trending tokens for {} ({} entries):",
                    snapshot.timeframe.map(|t| t.label()).unwrap_or("?"),
                    snapshot.entries.len()
                );
                for entry in snapshot.entries.iter().take(20) {
                    info!(
                        "#{:<3} {:<10} {:<28} ${:<14.6} mcap ${:<16.0} {:+.2}%",
                        entry.rank,
                        entry.symbol,
                        entry.name,
                        entry.price,
                        entry.market_cap,
                        entry.price_change_percent,
                    );
                }
                if let Some(notice) = &snapshot.notice {
                    info!("Note: {}", notice);
                }
                break;
            }
            FeedState::Error => {
                anyhow::bail!(
                    "Trending feed failed: {}",
                    snapshot.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            _ => {}
        }
    }

    Ok(())
}
