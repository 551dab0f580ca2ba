//! Yahoo Finance quote client
//!
//! Tadawul symbols are quoted on Yahoo with a `.SR` suffix ("2222" is
//! "2222.SR"). The chart endpoint serves both the current regular-market
//! price and daily history for the signals module.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;
use crate::pricing::{PriceProvider, PriceSource};

const DEFAULT_SUFFIX: &str = ".SR";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

/// A daily close used by the signals module
#[derive(Debug, Clone)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Live quote provider backed by the Yahoo Finance chart API
pub struct YahooProvider {
    client: Client,
    suffix: String,
    base_url: String,
}

impl YahooProvider {
    pub fn new(suffix: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; TadawulTracker/1.0)")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            suffix: suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
        })
    }

    /// Point the provider at a different endpoint. Tests use this with a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn quoted_symbol(&self, symbol: &str) -> String {
        if symbol.contains('.') {
            symbol.to_string()
        } else {
            format!("{}{}", symbol, self.suffix)
        }
    }

    async fn fetch_chart(&self, url: &str) -> Result<ChartResult> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Yahoo Finance returned error status: {}",
                response.status()
            ));
        }

        let data: ChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo Finance response")?;

        if let Some(error) = data.chart.error {
            return Err(anyhow!(
                "Yahoo Finance API error: {} - {}",
                error.code,
                error.description
            ));
        }

        data.chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("No data returned from Yahoo Finance"))
    }

    /// Daily closes for the last `days` calendar days, oldest first.
    /// Null closes (market holidays) are skipped.
    pub async fn fetch_history(&self, symbol: &str, days: u32) -> Result<Vec<DailyClose>> {
        let quoted = self.quoted_symbol(symbol);
        info!("Fetching {}d history for {}", days, quoted);

        let url = format!("{}/{}?range={}d&interval=1d", self.base_url, quoted, days);
        let result = self.fetch_chart(&url).await?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| anyhow!("No timestamp data for {}", quoted))?;
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .ok_or_else(|| anyhow!("No close prices for {}", quoted))?;

        let mut history = Vec::new();
        for (i, &timestamp) in timestamps.iter().enumerate() {
            let Some(Some(close)) = closes.get(i) else {
                continue;
            };
            let date = chrono::DateTime::from_timestamp(timestamp, 0)
                .ok_or_else(|| anyhow!("Invalid timestamp in history"))?
                .date_naive();
            let close = Decimal::from_f64_retain(*close)
                .ok_or_else(|| anyhow!("Invalid close value in history"))?;
            history.push(DailyClose { date, close });
        }

        debug!("Got {} closes for {}", history.len(), quoted);
        Ok(history)
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn source(&self) -> PriceSource {
        PriceSource::Live
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Decimal> {
        let quoted = self.quoted_symbol(symbol);
        debug!("Fetching current price for {}", quoted);

        let url = format!("{}/{}", self.base_url, quoted);
        let result = self.fetch_chart(&url).await?;

        let price = result
            .meta
            .regular_market_price
            .ok_or_else(|| anyhow!("No price data available for {}", quoted))?;

        Decimal::from_f64_retain(price).ok_or_else(|| anyhow!("Invalid price value for {}", quoted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_applied_once() {
        let provider = YahooProvider::new(None).unwrap();
        assert_eq!(provider.quoted_symbol("2222"), "2222.SR");
        assert_eq!(provider.quoted_symbol("2222.SR"), "2222.SR");
    }

    #[test]
    fn test_custom_suffix() {
        let provider = YahooProvider::new(Some(".XYZ".to_string())).unwrap();
        assert_eq!(provider.quoted_symbol("1010"), "1010.XYZ");
    }

    #[test]
    fn test_chart_response_parsing() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "meta": {"regularMarketPrice": 36.0, "symbol": "2222.SR"},
                    "timestamp": [1718000000, 1718086400],
                    "indicators": {"quote": [{"close": [35.5, null]}]}
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = parsed.chart.result.unwrap().into_iter().next().unwrap();
        assert_eq!(result.meta.regular_market_price, Some(36.0));
        assert_eq!(result.timestamp.unwrap().len(), 2);
    }

    #[test]
    fn test_chart_error_parsing() {
        let raw = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(raw).unwrap();
        let error = parsed.chart.error.unwrap();
        assert_eq!(error.code, "Not Found");
    }
}
