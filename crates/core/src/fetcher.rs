//! Market data fetcher: pulls markets and reduces them to at-risk obligations.

use async_trait::async_trait;
use tracing::debug;
use watcher_api::{ApiResult, Market, SolendClient};

use crate::risk::{assess_markets, ObligationRisk, RiskParams};

/// Source of market snapshots.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_markets(&self) -> ApiResult<Vec<Market>>;
}

#[async_trait]
impl MarketSource for SolendClient {
    async fn fetch_markets(&self) -> ApiResult<Vec<Market>> {
        SolendClient::fetch_markets(self).await
    }
}

/// Fetch one snapshot and return the obligations currently at risk.
///
/// Transport and decode failures are returned to the caller, which treats
/// them as an empty cycle.
pub async fn fetch_risky_obligations<S>(source: &S, params: &RiskParams) -> ApiResult<Vec<ObligationRisk>>
where
    S: MarketSource + ?Sized,
{
    let markets = source.fetch_markets().await?;
    let risks = assess_markets(&markets, params);

    debug!(markets = markets.len(), at_risk = risks.len(), "Assessed market snapshot");

    Ok(risks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use watcher_api::{ApiError, Obligation};

    struct StaticSource(Vec<Market>);

    #[async_trait]
    impl MarketSource for StaticSource {
        async fn fetch_markets(&self) -> ApiResult<Vec<Market>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MarketSource for FailingSource {
        async fn fetch_markets(&self) -> ApiResult<Vec<Market>> {
            Err(ApiError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_risky_obligations() {
        let source = StaticSource(vec![Market {
            reserves: vec![],
            obligations: vec![Obligation {
                owner: Some("A".to_string()),
                health_factor: Some(0.8),
                borrowed_value: Some(1000.0),
                collateral_value: Some(900.0),
                deposits: vec![],
            }],
        }]);

        let risks = fetch_risky_obligations(&source, &RiskParams::default()).await.unwrap();
        assert_eq!(risks.len(), 1);
        assert!((risks[0].estimated_profit - 45.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let risks = fetch_risky_obligations(&StaticSource(vec![]), &RiskParams::default())
            .await
            .unwrap();
        assert!(risks.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_returned() {
        let result = fetch_risky_obligations(&FailingSource, &RiskParams::default()).await;
        assert!(matches!(result, Err(ApiError::Status { status: 502, .. })));
    }
}
