//! Per-owner alert state across polling cycles.
//!
//! Each owner moves through a small state machine:
//!
//! ```text
//! (unseen) --at risk--> Alerted --absent--> Recovered --at risk--> Alerted ...
//! ```
//!
//! Only the edges into `Alerted` send a notification. An owner that stays at
//! risk for many cycles is notified once.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::alert::format_alert;
use crate::notifier::{Notifier, NotifyOutcome};
use crate::risk::ObligationRisk;

/// Alert state of a single owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    /// Notified and still at risk
    Alerted { since: DateTime<Utc> },
    /// Dropped out of the at-risk set after being alerted; re-alerts on return
    Recovered { since: DateTime<Utc> },
}

impl AlertStatus {
    pub fn is_alerted(&self) -> bool {
        matches!(self, Self::Alerted { .. })
    }

    pub fn since(&self) -> DateTime<Utc> {
        match self {
            Self::Alerted { since } | Self::Recovered { since } => *since,
        }
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Distinct owners at risk this cycle
    pub at_risk: usize,
    /// Notifications attempted (new or returning owners)
    pub notified: usize,
    pub delivered: usize,
    /// Attempts skipped because the notifier is not configured
    pub skipped: usize,
    pub failed: usize,
    /// Owners moved from Alerted to Recovered
    pub recovered: usize,
    /// Long-recovered owners forgotten
    pub evicted: usize,
    /// Owners still tracked after the cycle
    pub tracked: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &NotifyOutcome) {
        self.notified += 1;
        match outcome {
            NotifyOutcome::Delivered => self.delivered += 1,
            NotifyOutcome::Skipped => self.skipped += 1,
            NotifyOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Tracks which owners have been alerted. Lives for the whole process and is
/// never persisted.
#[derive(Debug, Default)]
pub struct AlertTracker {
    states: HashMap<String, AlertStatus>,
    /// Forget owners recovered for at least this long; `None` keeps them forever
    recovered_ttl: Option<chrono::Duration>,
}

impl AlertTracker {
    /// Create an empty tracker that never forgets an owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget owners that have been recovered for at least `ttl`.
    pub fn with_recovered_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.recovered_ttl = ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok());
        self
    }

    pub fn status(&self, owner: &str) -> Option<AlertStatus> {
        self.states.get(owner).copied()
    }

    pub fn is_alerted(&self, owner: &str) -> bool {
        self.states.get(owner).is_some_and(AlertStatus::is_alerted)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Run one cycle against the current at-risk set.
    pub async fn process_cycle<N>(&mut self, risks: &[ObligationRisk], notifier: &N) -> CycleReport
    where
        N: Notifier + ?Sized,
    {
        self.process_cycle_at(risks, notifier, Utc::now()).await
    }

    /// Same as [`process_cycle`](Self::process_cycle) with an explicit clock.
    pub async fn process_cycle_at<N>(
        &mut self,
        risks: &[ObligationRisk],
        notifier: &N,
        now: DateTime<Utc>,
    ) -> CycleReport
    where
        N: Notifier + ?Sized,
    {
        let current: HashSet<&str> = risks.iter().map(|r| r.owner.as_str()).collect();
        let mut report = CycleReport {
            at_risk: current.len(),
            ..Default::default()
        };

        for risk in risks {
            if self.is_alerted(&risk.owner) {
                continue;
            }

            info!(
                owner = %risk.owner,
                hf = risk.health_factor,
                liquidatable_usd = format!("${:.2}", risk.liquidatable_value),
                profit_usd = format!("${:.2}", risk.estimated_profit),
                returning = self.states.contains_key(&risk.owner),
                "Liquidation opportunity detected"
            );

            let outcome = notifier.notify(&format_alert(risk), &risk.owner).await;
            report.record(&outcome);

            // Advance regardless of the outcome; failed sends are not retried
            self.states
                .insert(risk.owner.clone(), AlertStatus::Alerted { since: now });
        }

        for (owner, status) in self.states.iter_mut() {
            if status.is_alerted() && !current.contains(owner.as_str()) {
                debug!(owner = %owner, alerted_since = %status.since(), "Owner recovered");
                *status = AlertStatus::Recovered { since: now };
                report.recovered += 1;
            }
        }

        report.evicted = self.evict_recovered(now);
        report.tracked = self.states.len();
        report
    }

    /// Drop owners recovered for at least the configured TTL.
    fn evict_recovered(&mut self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.recovered_ttl else {
            return 0;
        };

        let before = self.states.len();
        self.states.retain(|_, status| match status {
            AlertStatus::Recovered { since } => now - *since < ttl,
            AlertStatus::Alerted { .. } => true,
        });
        before - self.states.len()
    }
}
