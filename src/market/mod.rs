// Market data module: provider trait and the Yahoo Finance implementation.

pub mod traits;
pub mod yahoo;

pub use traits::MarketDataProvider;
pub use yahoo::YahooFinance;
