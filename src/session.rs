use crate::model::OhlcvSeries;

/// Fetched series for one analysis run, keyed by ticker in input order.
///
/// Duplicate inserts overwrite in place, so one ticker never holds two
/// entries. A re-fetch builds a complete new session (or swaps one in with
/// [`SessionState::replace_all`]) rather than patching the old one, so a
/// failed fetch never leaves it half-populated.
#[derive(Debug, Default)]
pub struct SessionState {
    entries: Vec<(String, OhlcvSeries)>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole session content atomically.
    pub fn replace_all(&mut self, entries: Vec<(String, OhlcvSeries)>) {
        self.entries = entries;
    }

    /// Inserts a series, overwriting any entry already held for `ticker`.
    pub fn insert(&mut self, ticker: String, series: OhlcvSeries) {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == ticker) {
            entry.1 = series;
        } else {
            self.entries.push((ticker, series));
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&OhlcvSeries> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, series)| series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OhlcvSeries)> {
        self.entries.iter().map(|(t, s)| (t.as_str(), s))
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.entries.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
