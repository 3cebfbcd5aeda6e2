/// Cumulative volume-weighted average price from the start of the loaded
/// range. `None` until any volume has traded; the running sums make each
/// point a volume-weighted mean of the closes so far, so the trace always
/// stays inside the min/max close envelope.
///
/// The slices must be index-aligned; both come from the same series.
pub fn cumulative_vwap(closes: &[f64], volumes: &[u64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;
    for (close, volume) in closes.iter().zip(volumes) {
        cum_pv += close * *volume as f64;
        cum_volume += *volume as f64;
        if cum_volume > 0.0 {
            out.push(Some(cum_pv / cum_volume));
        } else {
            out.push(None);
        }
    }
    out
}
