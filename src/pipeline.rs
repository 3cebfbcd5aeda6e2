// Per-ticker pipeline: fetch, compute, render, ask, parse. Failures after
// the fetch stage degrade to an Error-sentinel report; nothing aborts the
// batch.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analyst::ChartAnalyst;
use crate::chart;
use crate::indicators::{self, Indicator};
use crate::market::MarketDataProvider;
use crate::model::{AnalysisReport, FetchWarning, OhlcvSeries, Recommendation};
use crate::parser;
use crate::session::SessionState;

/// Everything the presentation layer needs for one ticker.
#[derive(Debug)]
pub struct TickerAnalysis {
    pub report: AnalysisReport,
    pub chart_png: Option<Vec<u8>>,
}

/// Fetches every requested ticker into a fresh session. Tickers that
/// resolve to no data are excluded with a recorded warning; the batch
/// always proceeds with whatever loaded. A ticker repeated in the input
/// ends up as a single session entry.
pub async fn fetch_session(
    provider: &dyn MarketDataProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> (SessionState, Vec<FetchWarning>) {
    let mut session = SessionState::new();
    let mut warnings = Vec::new();

    for ticker in tickers {
        info!("📈 Fetching {} ({} to {})...", ticker, start, end);
        match provider.fetch_daily(ticker, start, end).await {
            Ok(series) if series.is_empty() => {
                warn!("⚠️ No data available for {}", ticker);
                warnings.push(FetchWarning {
                    ticker: ticker.clone(),
                    reason: "no data available for the requested range".to_string(),
                });
            }
            Ok(series) => {
                info!("✅ Loaded {} bars for {}", series.len(), ticker);
                session.insert(ticker.clone(), series);
            }
            Err(e) => {
                warn!("❌ Fetch failed for {}: {}", ticker, e);
                warnings.push(FetchWarning {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (session, warnings)
}

/// Calls the analyst and parses its reply, degrading every failure to the
/// Error sentinel so a report always materializes.
pub async fn request_analysis(
    analyst: &dyn ChartAnalyst,
    ticker: &str,
    chart_png: &[u8],
) -> AnalysisReport {
    let raw = match analyst.analyze_chart(ticker, chart_png).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("❌ Inference failed for {}: {}", ticker, e);
            return AnalysisReport {
                ticker: ticker.to_string(),
                analysis: format!("Analysis request failed: {e}"),
                recommendation: Recommendation::Error,
            };
        }
    };

    match parser::extract_reply(&raw) {
        Ok(reply) => AnalysisReport {
            ticker: ticker.to_string(),
            analysis: reply.analysis,
            recommendation: reply.recommendation,
        },
        Err(e) => {
            warn!("❌ Unusable reply for {}: {}", ticker, e);
            AnalysisReport {
                ticker: ticker.to_string(),
                analysis: e.to_string(),
                recommendation: Recommendation::Error,
            }
        }
    }
}

/// Runs the full pipeline for one already-fetched ticker.
pub async fn analyze_ticker(
    analyst: &dyn ChartAnalyst,
    selected: &[Indicator],
    ticker: &str,
    series: &OhlcvSeries,
    chart_size: (u32, u32),
) -> TickerAnalysis {
    let overlays = indicators::compute_overlays(series, selected);
    info!("🧮 Computed {} overlay trace(s) for {}", overlays.len(), ticker);

    let (width, height) = chart_size;
    let chart_png = match chart::render_chart(ticker, series, &overlays, width, height) {
        Ok(png) => png,
        Err(e) => {
            warn!("❌ Chart rendering failed for {}: {}", ticker, e);
            return TickerAnalysis {
                report: AnalysisReport {
                    ticker: ticker.to_string(),
                    analysis: format!("Chart rendering failed: {e}"),
                    recommendation: Recommendation::Error,
                },
                chart_png: None,
            };
        }
    };
    info!("🖼️ Rendered chart for {} ({} bytes)", ticker, chart_png.len());

    let report = request_analysis(analyst, ticker, &chart_png).await;
    TickerAnalysis {
        report,
        chart_png: Some(chart_png),
    }
}

/// Analyzes every ticker in the session, one at a time, in session order.
pub async fn run_session(
    analyst: &dyn ChartAnalyst,
    session: &SessionState,
    selected: &[Indicator],
    chart_size: (u32, u32),
) -> Vec<TickerAnalysis> {
    let mut results = Vec::with_capacity(session.len());
    for (ticker, series) in session.iter() {
        info!("🔍 Analyzing {}...", ticker);
        results.push(analyze_ticker(analyst, selected, ticker, series, chart_size).await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalystError, FetchError, OhlcvBar};

    struct CannedAnalyst {
        reply: Option<String>,
    }

    #[async_trait::async_trait]
    impl ChartAnalyst for CannedAnalyst {
        async fn analyze_chart(
            &self,
            _ticker: &str,
            _chart_png: &[u8],
        ) -> Result<String, AnalystError> {
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(AnalystError::Timeout),
            }
        }
    }

    #[tokio::test]
    async fn good_replies_become_reports() {
        let analyst = CannedAnalyst {
            reply: Some(r#"{"analysis":"steady uptrend","recommendation":"Buy"}"#.to_string()),
        };
        let report = request_analysis(&analyst, "AAPL", b"png").await;
        assert_eq!(report.ticker, "AAPL");
        assert_eq!(report.analysis, "steady uptrend");
        assert_eq!(report.recommendation, Recommendation::Buy);
    }

    #[tokio::test]
    async fn failed_calls_degrade_to_the_error_sentinel() {
        let analyst = CannedAnalyst { reply: None };
        let report = request_analysis(&analyst, "AAPL", b"png").await;
        assert_eq!(report.recommendation, Recommendation::Error);
        assert!(report.analysis.contains("Analysis request failed"));
    }

    #[tokio::test]
    async fn unusable_replies_keep_the_raw_text_visible() {
        let analyst = CannedAnalyst {
            reply: Some("the chart looks bullish to me".to_string()),
        };
        let report = request_analysis(&analyst, "AAPL", b"png").await;
        assert_eq!(report.recommendation, Recommendation::Error);
        assert!(report.analysis.contains("the chart looks bullish to me"));
    }

    enum Canned {
        Bars(usize),
        Empty,
        Fail,
    }

    struct CannedProvider {
        behaviors: Vec<(String, Canned)>,
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for CannedProvider {
        async fn fetch_daily(
            &self,
            ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<OhlcvSeries, FetchError> {
            let behavior = self
                .behaviors
                .iter()
                .find(|(t, _)| t == ticker)
                .map(|(_, b)| b);
            match behavior {
                Some(Canned::Bars(n)) => {
                    let bars = (0..*n)
                        .map(|i| OhlcvBar {
                            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                                + chrono::Duration::days(i as i64),
                            open: 10.0,
                            high: 11.0,
                            low: 9.0,
                            close: 10.5,
                            volume: 100,
                        })
                        .collect();
                    Ok(OhlcvSeries::from_bars(bars))
                }
                Some(Canned::Empty) => Ok(OhlcvSeries::default()),
                _ => Err(FetchError::Status(500)),
            }
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[tokio::test]
    async fn empty_tickers_are_excluded_with_a_warning() {
        let provider = CannedProvider {
            behaviors: vec![
                ("AAPL".to_string(), Canned::Bars(5)),
                ("EMPT".to_string(), Canned::Empty),
            ],
        };
        let tickers = vec!["AAPL".to_string(), "EMPT".to_string()];
        let (session, warnings) = fetch_session(&provider, &tickers, day(1), day(20)).await;
        assert_eq!(session.len(), 1);
        assert!(session.get("AAPL").is_some());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].ticker, "EMPT");
    }

    #[tokio::test]
    async fn repeated_tickers_collapse_to_a_single_entry() {
        let provider = CannedProvider {
            behaviors: vec![("AAPL".to_string(), Canned::Bars(3))],
        };
        let tickers = vec!["AAPL".to_string(), "AAPL".to_string()];
        let (session, warnings) = fetch_session(&provider, &tickers, day(1), day(20)).await;
        assert_eq!(session.len(), 1);
        assert_eq!(session.tickers(), vec!["AAPL"]);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_do_not_abort_the_batch() {
        let provider = CannedProvider {
            behaviors: vec![
                ("BAD".to_string(), Canned::Fail),
                ("AAPL".to_string(), Canned::Bars(3)),
            ],
        };
        let tickers = vec!["BAD".to_string(), "AAPL".to_string()];
        let (session, warnings) = fetch_session(&provider, &tickers, day(1), day(20)).await;
        assert_eq!(session.tickers(), vec!["AAPL"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].reason.contains("500"));
    }
}
