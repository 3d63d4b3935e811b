//! Solend Liquidation Watcher
//!
//! Polls Solend markets and sends a Telegram alert when an obligation drops
//! below health factor 1.0. Features:
//! - Liquidation profit estimate from the reserve liquidation bonus
//! - One alert per owner until it recovers, then re-alerts on relapse
//! - Runs degraded (log only) without Telegram credentials

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use watcher_api::{SolendClient, TelegramNotifier};
use watcher_core::{AlertTracker, Watcher, WatcherConfig, WatcherSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Print startup banner
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,watcher_core=debug,watcher_api=debug")),
        )
        .init();

    // Optional TOML config via WATCHER_CONFIG, defaults otherwise
    let config = WatcherConfig::from_env()?;
    config.log_config();

    let source = SolendClient::with_base_url(config.market.url.clone())
        .with_timeout(config.market.request_timeout());

    let notifier = TelegramNotifier::from_env()
        .with_api_base(config.notifier.api_base.clone())
        .with_explorer_account_url(config.notifier.explorer_account_url.clone())
        .with_protocol_url(config.notifier.protocol_url.clone())
        .with_timeout(config.notifier.request_timeout());

    if notifier.has_credentials() {
        info!("Telegram notifier configured");
    } else {
        warn!("Missing Telegram credentials (TELEGRAM_TOKEN / CHAT_ID), alerts will only be logged");
    }

    let tracker = AlertTracker::new().with_recovered_ttl(config.alerts.recovered_ttl());
    let mut watcher = Watcher::new(source, notifier, tracker, WatcherSettings::from(&config));

    info!("Solana liquidation watcher started");
    watcher.run().await;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ┌─────────────────────────────────────────┐
  │   Solend Liquidation Watcher v{:<9} │
  │   health factor < 1.0 -> Telegram       │
  └─────────────────────────────────────────┘
"#,
        env!("CARGO_PKG_VERSION")
    );
}
