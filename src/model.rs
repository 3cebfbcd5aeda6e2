// Core structs: OhlcvBar, OhlcvSeries, Overlay, AnalysisReport,
// plus the error enums for every subsystem.
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// One trading day of a ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl OhlcvBar {
    /// A bar is plausible when every price is non-negative and the
    /// high/low envelope contains both the open and the close.
    pub fn is_plausible(&self) -> bool {
        self.low >= 0.0
            && self.low <= self.high
            && self.open >= self.low
            && self.open <= self.high
            && self.close >= self.low
            && self.close <= self.high
    }
}

/// Daily bars ordered ascending by date, one bar per date. Immutable after
/// the fetch stage; lives only for the session.
#[derive(Debug, Clone, Default)]
pub struct OhlcvSeries {
    bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    /// Builds a series from possibly unordered input: sorts by date and
    /// drops duplicate dates (first occurrence wins).
    pub fn from_bars(mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Indicator values aligned 1:1 with the bars they were computed from.
/// `None` marks indices where the indicator is undefined (warm-up, or a
/// guarded zero denominator), never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Closed set of advice labels the analyst may return. `Error` is the
/// sentinel for a failed call or an unusable reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    LeanBuy,
    Neutral,
    LeanSell,
    Sell,
    StrongSell,
    Error,
}

impl Recommendation {
    pub const ALL: [Recommendation; 8] = [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::LeanBuy,
        Recommendation::Neutral,
        Recommendation::LeanSell,
        Recommendation::Sell,
        Recommendation::StrongSell,
        Recommendation::Error,
    ];

    pub fn as_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::LeanBuy => "Lean Buy",
            Recommendation::Neutral => "Neutral",
            Recommendation::LeanSell => "Lean Sell",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
            Recommendation::Error => "Error",
        }
    }

    /// Matches a reply label case-insensitively, ignoring surrounding
    /// whitespace. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .iter()
            .find(|r| trimmed.eq_ignore_ascii_case(r.as_label()))
            .copied()
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Final verdict for one ticker, ready for display.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub ticker: String,
    pub analysis: String,
    pub recommendation: Recommendation,
}

/// Why a ticker was excluded at the data stage.
#[derive(Debug, Clone)]
pub struct FetchWarning {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found: set GEMINI_API_KEY (or GOOGLE_API_KEY) in the environment or .env")]
    MissingApiKey,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("malformed market data payload: {0}")]
    Payload(String),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot render a chart from an empty series")]
    EmptySeries,
    #[error("chart drawing failed: {0}")]
    Draw(String),
    #[error("png encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum AnalystError {
    #[error("inference request failed: {0}")]
    Http(String),
    #[error("inference request timed out")]
    Timeout,
    #[error("inference API responded with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("inference reply could not be decoded: {0}")]
    Decode(String),
    #[error("inference reply contained no text")]
    EmptyReply,
}

#[derive(Debug, Error)]
pub enum ReplyParseError {
    #[error("no JSON object found in reply. Raw response text: {raw}")]
    NoJsonObject { raw: String },
    #[error("JSON parsing error: {message}. Raw response text: {raw}")]
    InvalidJson { message: String, raw: String },
}
