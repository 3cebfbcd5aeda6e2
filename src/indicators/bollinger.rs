use super::moving_average::sma;

/// The two Bollinger envelope traces. The center line (the SMA itself) is
/// not emitted; the chart draws only the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bollinger Bands over `window` closes: SMA plus/minus `k` rolling
/// standard deviations. The deviation uses the sample flavor (n - 1
/// divisor). Undefined until a full window has accumulated, and for
/// windows below 2 where the sample deviation has no meaning.
pub fn bollinger_bands(values: &[f64], window: usize, k: f64) -> BollingerBands {
    let mut upper = vec![None; values.len()];
    let mut lower = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return BollingerBands { upper, lower };
    }

    let center = sma(values, window);
    for (i, chunk) in values.windows(window).enumerate() {
        let idx = i + window - 1;
        if let Some(mean) = center[idx] {
            let variance = chunk.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (window as f64 - 1.0);
            let dev = variance.sqrt();
            upper[idx] = Some(mean + k * dev);
            lower[idx] = Some(mean - k * dev);
        }
    }
    BollingerBands { upper, lower }
}
