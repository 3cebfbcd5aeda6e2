/// Simple moving average over `window` points. The first `window - 1`
/// slots are `None`; an input shorter than the window yields all `None`.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for (i, chunk) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(chunk.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Exponential moving average in the span convention: alpha = 2 / (span + 1),
/// seeded with the first value and defined from index 0 onward.
pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    if values.is_empty() || span == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    out.push(Some(current));
    for &value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(Some(current));
    }
    out
}
