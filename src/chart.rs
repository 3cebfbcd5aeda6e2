// Chart renderer: candlesticks plus overlay line traces, rasterized to PNG
// entirely in memory.

use chrono::NaiveDate;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::prelude::*;

use crate::model::{ChartError, OhlcvSeries, Overlay};

const Y_PADDING: f64 = 0.02;

/// Renders the candlestick chart with the given overlays and returns the
/// encoded PNG. Drawing happens in a memory buffer; no files are touched
/// on any path.
pub fn render_chart(
    ticker: &str,
    series: &OhlcvSeries,
    overlays: &[Overlay],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ChartError> {
    if series.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
    let first = dates[0];
    let last = dates.last().copied().unwrap_or(first);
    // One day of margin on both sides keeps edge candles fully visible.
    let x_start = first - chrono::Duration::days(1);
    let x_end = last + chrono::Duration::days(1);
    let (y_min, y_max) = y_bounds(series, overlays);

    let mut frame = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut frame, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Draw(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{ticker} Stock Analysis"), ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(x_start..x_end, y_min..y_max)
            .map_err(|e| ChartError::Draw(e.to_string()))?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
            .x_desc("Date")
            .y_desc("Price (USD)")
            .draw()
            .map_err(|e| ChartError::Draw(e.to_string()))?;

        let candle_width = candle_pixel_width(width, series.len());
        chart
            .draw_series(series.bars().iter().map(|bar| {
                CandleStick::new(
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    GREEN.filled(),
                    RED.filled(),
                    candle_width,
                )
            }))
            .map_err(|e| ChartError::Draw(e.to_string()))?
            .label("Candlestick")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], GREEN.filled()));

        for (idx, overlay) in overlays.iter().enumerate() {
            let color = Palette99::pick(idx).mix(0.9);
            let points = overlay_points(&dates, overlay);
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(|e| ChartError::Draw(e.to_string()))?
                .label(overlay.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK.mix(0.4))
            .draw()
            .map_err(|e| ChartError::Draw(e.to_string()))?;

        root.present().map_err(|e| ChartError::Draw(e.to_string()))?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&frame, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(png)
}

/// Vertical span every drawn element must fit into: candle extremes plus
/// all defined overlay points, padded slightly. Bollinger bands routinely
/// escape the raw price range, so overlays must widen the axis.
fn y_bounds(series: &OhlcvSeries, overlays: &[Overlay]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for bar in series.bars() {
        min = min.min(bar.low);
        max = max.max(bar.high);
    }
    for overlay in overlays {
        for value in overlay.values.iter().flatten() {
            min = min.min(*value);
            max = max.max(*value);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * Y_PADDING).max(max.abs() * 0.001).max(1e-9);
    (min - pad, max + pad)
}

/// Index-aligned dates for the `Some` values of an overlay; undefined
/// warm-up points simply do not appear in the trace.
fn overlay_points(dates: &[NaiveDate], overlay: &Overlay) -> Vec<(NaiveDate, f64)> {
    dates
        .iter()
        .zip(overlay.values.iter())
        .filter_map(|(date, value)| value.map(|v| (*date, v)))
        .collect()
}

/// Pixel width of one candle body, scaled to the series density.
fn candle_pixel_width(chart_width: u32, bars: usize) -> u32 {
    if bars == 0 {
        return 1;
    }
    let slot = chart_width / bars as u32;
    slot.saturating_sub(2).clamp(1, 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OhlcvBar;

    fn series_of(closes: &[f64]) -> OhlcvSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            })
            .collect();
        OhlcvSeries::from_bars(bars)
    }

    #[test]
    fn y_bounds_cover_overlay_extremes() {
        let series = series_of(&[10.0, 11.0, 12.0]);
        let overlay = Overlay {
            name: "Upper Band".to_string(),
            values: vec![None, Some(30.0), Some(5.0)],
        };
        let (min, max) = y_bounds(&series, &[overlay]);
        assert!(min < 5.0);
        assert!(max > 30.0);
    }

    #[test]
    fn y_bounds_of_flat_series_still_span_something() {
        let series = series_of(&[10.0]);
        let (min, max) = y_bounds(&series, &[]);
        assert!(max > min);
    }

    #[test]
    fn overlay_points_drop_the_warmup() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
        ];
        let overlay = Overlay {
            name: "20-Day SMA".to_string(),
            values: vec![None, None, Some(4.0)],
        };
        let points = overlay_points(&dates, &overlay);
        assert_eq!(points, vec![(dates[2], 4.0)]);
    }

    #[test]
    fn candle_width_stays_in_sane_pixels() {
        assert_eq!(candle_pixel_width(1280, 0), 1);
        assert_eq!(candle_pixel_width(1280, 2000), 1);
        assert_eq!(candle_pixel_width(1280, 10), 12);
        let mid = candle_pixel_width(1280, 250);
        assert!((1..=12).contains(&mid));
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = render_chart("AAPL", &OhlcvSeries::default(), &[], 64, 64);
        assert!(matches!(err, Err(ChartError::EmptySeries)));
    }

    #[test]
    #[ignore = "needs a system font for axis labels"]
    fn renders_a_png_with_and_without_overlays() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let series = series_of(&closes);
        let overlays = crate::indicators::compute_overlays(
            &series,
            &[crate::indicators::Indicator::Sma, crate::indicators::Indicator::Vwap],
        );

        let png = render_chart("AAPL", &series, &overlays, 640, 480).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let bare = render_chart("AAPL", &series, &[], 640, 480).unwrap();
        assert_eq!(&bare[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
