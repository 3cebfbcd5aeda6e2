use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use candlesage::analyst::GeminiAnalyst;
use candlesage::cli::{self, Cli};
use candlesage::config::AppConfig;
use candlesage::market::YahooFinance;
use candlesage::pipeline;
use candlesage::report;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // A .env file is optional; the environment may carry the key directly.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config error: {}", e);
            process::exit(1);
        }
    };

    let tickers = cli::parse_tickers(&cli.tickers);
    if tickers.is_empty() {
        error!("No tickers requested.");
        process::exit(1);
    }
    let today = chrono::Utc::now().date_naive();
    let (start, end) = cli.date_range(today);

    info!(
        "🚀 candlesage started: {} ticker(s), {} to {}",
        tickers.len(),
        start,
        end
    );

    let provider = YahooFinance::new();
    let analyst = GeminiAnalyst::new(&config);

    let (session, warnings) = pipeline::fetch_session(&provider, &tickers, start, end).await;
    if session.is_empty() {
        warn!("No data loaded for any requested ticker; nothing to analyze.");
        report::print_report(&[], &warnings, &[]);
        return;
    }

    let results = pipeline::run_session(
        &analyst,
        &session,
        &cli.indicators,
        (config.chart_width, config.chart_height),
    )
    .await;

    if let Some(dir) = &cli.charts_dir {
        match report::save_charts(dir, &results) {
            Ok(paths) => info!("🖼️ Saved {} chart(s) under {}", paths.len(), dir.display()),
            Err(e) => warn!("Failed to save charts: {}", e),
        }
    }

    report::print_report(&session.tickers(), &warnings, &results);
    info!("🏁 Done: {} ticker(s) analyzed.", results.len());
}
