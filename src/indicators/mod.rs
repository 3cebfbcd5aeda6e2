// Indicator engine: aggregates the overlay computations for the chart.

pub mod bollinger;
pub mod moving_average;
pub mod vwap;

pub use bollinger::{BollingerBands, bollinger_bands};
pub use moving_average::{ema, sma};
pub use vwap::cumulative_vwap;

use clap::ValueEnum;

use crate::model::{OhlcvSeries, Overlay};

/// Window shared by the windowed indicators, matching their display labels.
pub const DEFAULT_WINDOW: usize = 20;

/// Width multiplier for the Bollinger envelope.
pub const BOLLINGER_K: f64 = 2.0;

/// Chart overlays the user can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Indicator {
    /// 20-day simple moving average
    Sma,
    /// 20-day exponential moving average
    Ema,
    /// 20-day Bollinger Bands (2 standard deviations wide)
    Bollinger,
    /// Cumulative volume-weighted average price
    Vwap,
}

impl Indicator {
    /// Label shown in the chart legend. VWAP carries no window in its name
    /// because the computation is cumulative over the whole loaded range.
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Sma => "20-Day SMA",
            Indicator::Ema => "20-Day EMA",
            Indicator::Bollinger => "20-Day Bollinger Bands",
            Indicator::Vwap => "VWAP",
        }
    }
}

/// Computes one overlay per selected indicator, each aligned 1:1 with the
/// series. Bollinger expands to its two band traces.
pub fn compute_overlays(series: &OhlcvSeries, selected: &[Indicator]) -> Vec<Overlay> {
    let closes = series.closes();
    let volumes = series.volumes();

    let mut overlays = Vec::new();
    for indicator in selected {
        match indicator {
            Indicator::Sma => overlays.push(Overlay {
                name: Indicator::Sma.label().to_string(),
                values: sma(&closes, DEFAULT_WINDOW),
            }),
            Indicator::Ema => overlays.push(Overlay {
                name: Indicator::Ema.label().to_string(),
                values: ema(&closes, DEFAULT_WINDOW),
            }),
            Indicator::Bollinger => {
                let bands = bollinger_bands(&closes, DEFAULT_WINDOW, BOLLINGER_K);
                overlays.push(Overlay {
                    name: "Upper Band".to_string(),
                    values: bands.upper,
                });
                overlays.push(Overlay {
                    name: "Lower Band".to_string(),
                    values: bands.lower,
                });
            }
            Indicator::Vwap => overlays.push(Overlay {
                name: Indicator::Vwap.label().to_string(),
                values: cumulative_vwap(&closes, &volumes),
            }),
        }
    }
    overlays
}
