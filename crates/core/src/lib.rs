//! Solend watcher core logic.
//!
//! This crate provides the watcher functionality:
//! - Risk assessment of obligations (health factor, liquidatable value, profit estimate)
//! - Per-owner alert tracking with recovery detection across polling cycles
//! - Alert message formatting and delivery seams
//! - Polling loop orchestration

mod alert;
mod alert_tracker;
pub mod config;
mod fetcher;
mod notifier;
mod risk;
mod watcher;

pub use alert::format_alert;
pub use alert_tracker::{AlertStatus, AlertTracker, CycleReport};
pub use config::WatcherConfig;
pub use fetcher::{fetch_risky_obligations, MarketSource};
pub use notifier::{Notifier, NotifyOutcome};
pub use risk::{assess_market, assess_markets, bonus_rate_from_raw, ObligationRisk, RiskParams};
pub use watcher::{Watcher, WatcherSettings, WatcherStats};
