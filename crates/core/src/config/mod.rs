//! Configuration system for the watcher.
//!
//! This module provides the runtime configuration (endpoint, thresholds,
//! timing, notifier links) loaded from an optional TOML file.

mod watcher;

pub use watcher::{
    AlertConfig, MarketConfig, NotifierConfig, RiskConfig, ScannerConfig, WatcherConfig,
    CONFIG_PATH_ENV,
};
