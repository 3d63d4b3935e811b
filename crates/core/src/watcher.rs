//! Polling loop: fetch, assess, alert, sleep.
//!
//! Strictly sequential. A slow fetch only delays the next cycle; the sleep
//! between cycles is unconditional.

use std::time::Duration;

use tracing::{error, info, instrument};

use crate::alert_tracker::{AlertTracker, CycleReport};
use crate::config::WatcherConfig;
use crate::fetcher::{fetch_risky_obligations, MarketSource};
use crate::notifier::Notifier;
use crate::risk::RiskParams;

/// Watcher timing and thresholds.
#[derive(Debug, Clone)]
pub struct WatcherSettings {
    /// Sleep between cycles
    pub poll_interval: Duration,
    pub risk: RiskParams,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            risk: RiskParams::default(),
        }
    }
}

impl From<&WatcherConfig> for WatcherSettings {
    fn from(config: &WatcherConfig) -> Self {
        Self {
            poll_interval: config.scanner.poll_interval(),
            risk: config.risk.params(),
        }
    }
}

/// Totals since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatcherStats {
    pub cycles: u64,
    pub fetch_failures: u64,
    pub alerts_sent: u64,
    pub notify_failures: u64,
}

/// Owns the market source, the notifier and the alert state for the
/// lifetime of the process.
pub struct Watcher<S, N> {
    source: S,
    notifier: N,
    tracker: AlertTracker,
    settings: WatcherSettings,
    stats: WatcherStats,
}

impl<S, N> Watcher<S, N>
where
    S: MarketSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, tracker: AlertTracker, settings: WatcherSettings) -> Self {
        Self {
            source,
            notifier,
            tracker,
            settings,
            stats: WatcherStats::default(),
        }
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    pub fn stats(&self) -> WatcherStats {
        self.stats
    }

    /// Run a single fetch + alert cycle.
    ///
    /// A failed fetch is logged and counts as an empty at-risk set, so
    /// previously alerted owners move to recovered.
    #[instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.stats.cycles += 1;

        let risks = match fetch_risky_obligations(&self.source, &self.settings.risk).await {
            Ok(risks) => risks,
            Err(e) => {
                self.stats.fetch_failures += 1;
                error!(
                    error = %e,
                    timeout = e.is_timeout(),
                    fetch_failures = self.stats.fetch_failures,
                    "Error fetching market data"
                );
                Vec::new()
            }
        };

        let report = self.tracker.process_cycle(&risks, &self.notifier).await;

        self.stats.alerts_sent += report.delivered as u64;
        self.stats.notify_failures += report.failed as u64;

        info!(
            cycle = self.stats.cycles,
            at_risk = report.at_risk,
            notified = report.notified,
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            recovered = report.recovered,
            evicted = report.evicted,
            tracked = report.tracked,
            "Cycle complete"
        );

        report
    }

    /// Run forever. Only external termination stops the loop.
    pub async fn run(&mut self) {
        info!(
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            "Starting watcher loop"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}
