use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use clap::Parser;

use crate::indicators::Indicator;

/// AI-assisted technical analysis: fetches daily candles for each ticker,
/// renders an indicator-overlaid chart and asks a multimodal model for a
/// recommendation.
#[derive(Debug, Parser)]
#[command(name = "candlesage", version, about)]
pub struct Cli {
    /// Comma-separated ticker symbols
    #[arg(long, default_value = "AAPL,NVDA,TSLA")]
    pub tickers: String,

    /// First day of the range (YYYY-MM-DD); defaults to one year before the end
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the range, inclusive (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Indicators to overlay on the chart; a bare --indicators draws candles only
    #[arg(long, value_enum, num_args = 0.., value_delimiter = ',', default_value = "sma")]
    pub indicators: Vec<Indicator>,

    /// Directory to write the rendered charts into (one PNG per ticker)
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,
}

impl Cli {
    /// Resolves the effective date range against a reference "today".
    /// An inverted range is passed through; the fetch simply comes back
    /// empty and the ticker is excluded with a warning.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = self.end.unwrap_or(today);
        let start = self.start.unwrap_or(end - Duration::days(365));
        (start, end)
    }
}

/// Splits the raw ticker argument on commas, trims and uppercases each
/// entry and drops empties and repeats; the first occurrence keeps its
/// position.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for entry in raw.split(',') {
        let ticker = entry.trim().to_uppercase();
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
