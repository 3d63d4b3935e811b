//! Solend market-data API client.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{ApiError, ApiResult};

/// Mainnet markets endpoint (reserves + obligations for every market).
pub const DEFAULT_MARKETS_URL: &str = "https://api.solend.fi/v1/markets?scope=mainnet";

/// Per-request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Solend market-data API client.
#[derive(Debug, Clone)]
pub struct SolendClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SolendClient {
    /// Create a client pointed at the mainnet markets endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: DEFAULT_MARKETS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client with a custom markets URL.
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::new()
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Markets URL this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch every market with its reserves and obligations.
    ///
    /// One GET, no retry. Non-2xx responses and bodies that are not a JSON
    /// array of markets are reported as errors; the caller decides whether
    /// that is fatal.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_markets(&self) -> ApiResult<Vec<Market>> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body, 256),
            });
        }

        let markets: Vec<Market> = serde_json::from_str(&body)?;

        let obligation_count: usize = markets.iter().map(|m| m.obligations.len()).sum();
        let reserve_count: usize = markets.iter().map(|m| m.reserves.len()).sum();
        info!(
            markets = markets.len(),
            reserves = reserve_count,
            obligations = obligation_count,
            "Fetched Solend markets"
        );

        Ok(markets)
    }
}

impl Default for SolendClient {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// A lending market: its reserve pools and the open obligations against them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Reserve pools (one per asset)
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub reserves: Vec<Reserve>,

    /// Borrower positions
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub obligations: Vec<Obligation>,
}

/// Reserve pool for a single asset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserve {
    /// Reserve account address
    #[serde(default)]
    pub reserve_address: Option<String>,

    /// Liquidation bonus in basis form where 100 means no bonus (105 = 5%).
    /// `None` when absent or not numeric.
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub liquidation_bonus: Option<f64>,
}

/// A borrower's position.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    /// Wallet owning the obligation
    #[serde(default)]
    pub owner: Option<String>,

    /// Health factor (below 1.0 is liquidatable)
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub health_factor: Option<f64>,

    /// Total borrowed value in USD
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub borrowed_value: Option<f64>,

    /// Total deposited collateral value in USD
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub collateral_value: Option<f64>,

    /// Collateral deposits, in upstream order
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub deposits: Vec<Deposit>,
}

/// A single collateral deposit inside an obligation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Reserve the deposit was made into
    #[serde(default)]
    pub reserve_address: Option<String>,
}

// Custom deserializers

/// Accepts a number or a numeric string. Null, empty strings, non-finite
/// values and anything unparsable become `None` instead of failing the
/// whole response.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Number(f64),
        String(String),
        Other(serde::de::IgnoredAny),
    }

    let value = match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Number(n)) => Some(n),
        Some(StringOrNumber::String(s)) => {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() && !s.is_empty() {
                debug!(value = %s, "Ignoring non-numeric field");
            }
            parsed
        }
        Some(StringOrNumber::Other(_)) | None => None,
    };

    Ok(value.filter(|v| v.is_finite()))
}

fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
