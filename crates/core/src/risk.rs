//! Obligation risk assessment.
//!
//! Turns raw market data into per-owner liquidation opportunities:
//! health factor filter, liquidatable value, and an estimated profit
//! from the reserve's liquidation bonus.

use std::collections::HashMap;

use tracing::debug;
use watcher_api::{Market, Obligation, Reserve};

/// Health factor assumed when the upstream omits it (not at risk).
const DEFAULT_HEALTH_FACTOR: f64 = 1.0;

/// Thresholds used while assessing obligations.
#[derive(Debug, Clone, Copy)]
pub struct RiskParams {
    /// Obligations strictly below this health factor are at risk
    pub health_factor_threshold: f64,
    /// Bonus rate used when the first deposit's reserve bonus is unavailable
    pub default_bonus_rate: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            health_factor_threshold: 1.0,
            default_bonus_rate: 0.05,
        }
    }
}

/// A liquidatable obligation with its profitability estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ObligationRisk {
    /// Obligation owner (alerting key)
    pub owner: String,
    pub health_factor: f64,
    /// Borrowed value in USD
    pub borrowed_value: f64,
    /// Collateral value in USD
    pub collateral_value: f64,
    /// min(borrowed, collateral)
    pub liquidatable_value: f64,
    /// Fractional bonus, e.g. 0.05 = 5%
    pub liquidation_bonus_rate: f64,
    /// liquidatable_value * liquidation_bonus_rate
    pub estimated_profit: f64,
}

/// Convert a reserve bonus where 100 means "no bonus" into a fraction.
///
/// 105 -> 0.05, 100 -> 0.0
pub fn bonus_rate_from_raw(raw: f64) -> f64 {
    (raw - 100.0) / 100.0
}

/// Assess every market and return the at-risk obligations, flattened.
pub fn assess_markets(markets: &[Market], params: &RiskParams) -> Vec<ObligationRisk> {
    markets
        .iter()
        .flat_map(|market| assess_market(market, params))
        .collect()
}

/// Assess the obligations of a single market.
pub fn assess_market(market: &Market, params: &RiskParams) -> Vec<ObligationRisk> {
    if market.obligations.is_empty() {
        return Vec::new();
    }

    // Later duplicates overwrite earlier ones
    let reserves: HashMap<&str, &Reserve> = market
        .reserves
        .iter()
        .filter_map(|r| r.reserve_address.as_deref().map(|addr| (addr, r)))
        .collect();

    market
        .obligations
        .iter()
        .filter_map(|obligation| assess_obligation(obligation, &reserves, params))
        .collect()
}

fn assess_obligation(
    obligation: &Obligation,
    reserves: &HashMap<&str, &Reserve>,
    params: &RiskParams,
) -> Option<ObligationRisk> {
    let health_factor = obligation.health_factor.unwrap_or(DEFAULT_HEALTH_FACTOR);
    let borrowed_value = obligation.borrowed_value.unwrap_or(0.0);
    let collateral_value = obligation.collateral_value.unwrap_or(0.0);

    if !(health_factor < params.health_factor_threshold && borrowed_value > 0.0) {
        return None;
    }

    let Some(owner) = obligation.owner.as_ref() else {
        debug!(
            health_factor = health_factor,
            borrowed = borrowed_value,
            "Skipping at-risk obligation without owner"
        );
        return None;
    };

    let liquidatable_value = borrowed_value.min(collateral_value);
    let liquidation_bonus_rate = resolve_bonus_rate(obligation, reserves, params);

    Some(ObligationRisk {
        owner: owner.clone(),
        health_factor,
        borrowed_value,
        collateral_value,
        liquidatable_value,
        liquidation_bonus_rate,
        estimated_profit: liquidatable_value * liquidation_bonus_rate,
    })
}

/// Only the first deposit is consulted.
fn resolve_bonus_rate(
    obligation: &Obligation,
    reserves: &HashMap<&str, &Reserve>,
    params: &RiskParams,
) -> f64 {
    obligation
        .deposits
        .first()
        .and_then(|deposit| deposit.reserve_address.as_deref())
        .and_then(|addr| reserves.get(addr))
        .and_then(|reserve| reserve.liquidation_bonus)
        .map(bonus_rate_from_raw)
        .unwrap_or(params.default_bonus_rate)
}
