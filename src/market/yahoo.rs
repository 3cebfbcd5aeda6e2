use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::traits::MarketDataProvider;
use crate::model::{FetchError, OhlcvBar, OhlcvSeries};

pub const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";

/// Daily OHLCV source backed by the Yahoo Finance v8 chart endpoint.
pub struct YahooFinance {
    client: Client,
    base_url: String,
}

impl YahooFinance {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_API_BASE.to_string())
    }

    /// Injectable base URL so tests can point the client at a local server.
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) candlesage/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self { client, base_url }
    }

    fn build_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooFinance {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcvSeries, FetchError> {
        let url = self.build_url(ticker);
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // The upstream range is end-exclusive; one extra day keeps `end` inside.
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        // Unknown symbols come back as an error envelope (often with a 404),
        // so the body is decoded before the status is judged.
        let envelope: ChartEnvelope = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                FetchError::Payload(e.to_string())
            } else {
                FetchError::Status(status.as_u16())
            }
        })?;

        if let Some(api_error) = envelope.chart.error {
            debug!("Provider error for {}: {:?}", ticker, api_error);
            return Ok(OhlcvSeries::default());
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let result = envelope.chart.result.unwrap_or_default().into_iter().next();
        Ok(result.map(into_series).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: IndicatorsNode,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorsNode {
    #[serde(default)]
    quote: Vec<QuoteNode>,
}

#[derive(Debug, Deserialize)]
struct QuoteNode {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Maps the columnar payload into bars, skipping rows with null fields or
/// a broken high/low envelope.
fn into_series(result: ChartResult) -> OhlcvSeries {
    let quote = match result.indicators.quote.into_iter().next() {
        Some(q) => q,
        None => return OhlcvSeries::default(),
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (open, high, low, close, volume) = match row {
            (Some(o), Some(h), Some(l), Some(c), Some(v)) => (o, h, l, c, v),
            _ => {
                debug!("Skipping incomplete row {} ({})", i, ts);
                continue;
            }
        };
        let date = match DateTime::from_timestamp(*ts, 0) {
            Some(dt) => dt.date_naive(),
            None => continue,
        };
        let bar = OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        if !bar.is_plausible() {
            debug!("Skipping implausible row {} ({})", i, ts);
            continue;
        }
        bars.push(bar);
    }
    OhlcvSeries::from_bars(bars)
}
