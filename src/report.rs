// Presentation: stdout report sections and the aggregate summary table.
// Diagnostics go through tracing; the report itself is the product output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::FetchWarning;
use crate::pipeline::TickerAnalysis;

/// Placeholder shown when a report carries no analysis text at all.
const NO_ANALYSIS: &str = "No analysis available";

/// One report section per ticker, in analysis order.
pub fn format_sections(results: &[TickerAnalysis]) -> String {
    let mut out = String::new();
    for result in results {
        let report = &result.report;
        out.push_str(&format!("=== Analysis for {} ===\n", report.ticker));
        out.push_str(&format!("Recommendation: {}\n", report.recommendation));
        if report.analysis.is_empty() {
            out.push_str(NO_ANALYSIS);
        } else {
            out.push_str(&report.analysis);
        }
        out.push_str("\n\n");
    }
    out
}

/// The "Overall Summary" table: one {Stock, Recommendation} row for every
/// analyzed ticker, Error rows included.
pub fn format_summary(results: &[TickerAnalysis]) -> String {
    let stock_width = results
        .iter()
        .map(|r| r.report.ticker.len())
        .chain(std::iter::once("Stock".len()))
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    out.push_str("=== Overall Summary ===\n");
    out.push_str(&format!("{:<stock_width$} | Recommendation\n", "Stock"));
    out.push_str(&format!(
        "{}-+-{}\n",
        "-".repeat(stock_width),
        "-".repeat("Recommendation".len())
    ));
    for result in results {
        out.push_str(&format!(
            "{:<stock_width$} | {}\n",
            result.report.ticker, result.report.recommendation
        ));
    }
    out
}

/// Prints the warnings, the loaded-tickers line, every per-ticker section
/// and the summary table.
pub fn print_report(
    session_tickers: &[&str],
    warnings: &[FetchWarning],
    results: &[TickerAnalysis],
) {
    for warning in warnings {
        println!("Warning: no data available for {} ({})", warning.ticker, warning.reason);
    }
    if !session_tickers.is_empty() {
        println!(
            "Stock data loaded successfully for: {}",
            session_tickers.join(", ")
        );
    }
    println!();
    print!("{}", format_sections(results));
    print!("{}", format_summary(results));
}

/// Writes each rendered chart into `dir` as `TICKER.png` and returns the
/// written paths. Tickers whose chart never materialized are skipped.
pub fn save_charts(dir: &Path, results: &[TickerAnalysis]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for result in results {
        if let Some(png) = &result.chart_png {
            let path = dir.join(format!("{}.png", result.report.ticker));
            fs::write(&path, png)?;
            written.push(path);
        }
    }
    Ok(written)
}
