use chrono::NaiveDate;

use crate::model::{FetchError, OhlcvSeries};

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the daily series for `ticker` covering `start..=end`.
    /// A ticker the provider does not know resolves to an empty series,
    /// not an error.
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcvSeries, FetchError>;
}
