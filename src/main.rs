mod analyzer;
mod config;
mod engine;
mod error;
mod forecast;
mod indicator;
mod model;
mod notifier;
mod report;
mod series;
mod signal;
mod source;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use analyzer::ReportOptions;
use config::{AppConfig, InstrumentConfig};
use model::Action;
use notifier::Notifier;
use notifier::telegram::TelegramNotifier;
use notifier::terminal::TerminalNotifier;
use source::MarketDataSource;
use source::chart::ChartApiSource;
use source::gold::GoldApiSource;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
}

#[derive(Parser)]
#[command(name = "stock-notifier", about = "Daily stock and gold analysis reports")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Analyze only this symbol (must be listed in the config)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Keep running and repeat the analysis on the configured interval
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let sources = build_sources(&config);
    if sources.is_empty() {
        warn!("no sources enabled; nothing to do");
        return Ok(());
    }

    let instruments: Vec<&InstrumentConfig> = config
        .instruments
        .iter()
        .filter(|i| cli.symbol.as_deref().is_none_or(|s| s == i.symbol))
        .collect();

    if instruments.is_empty() {
        warn!(symbol = ?cli.symbol, "no instruments selected; nothing to do");
        return Ok(());
    }

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(
            telegram.bot_token.clone(),
            telegram.chat_id.clone(),
        )),
        None => Arc::new(TerminalNotifier),
    };
    info!(notifier = notifier.name(), "delivery channel selected");

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, shutting down");
            cancel_on_signal.cancel();
        }
    });

    let interval = Duration::from_secs(config.general.watch_interval_minutes * 60);

    loop {
        run_cycle(&config, &instruments, &sources, notifier.as_ref()).await;

        if !cli.watch {
            break;
        }

        info!(
            interval_minutes = config.general.watch_interval_minutes,
            "cycle complete, sleeping"
        );
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Ok(())
}

/// One pass over the configured instruments. Per-instrument failures are
/// logged and skipped so one bad symbol never blocks the rest.
async fn run_cycle(
    config: &AppConfig,
    instruments: &[&InstrumentConfig],
    sources: &HashMap<String, Arc<dyn MarketDataSource>>,
    notifier: &dyn Notifier,
) {
    for instrument in instruments {
        let Some(source) = sources.get(instrument.source.as_str()) else {
            warn!(
                symbol = %instrument.symbol,
                source = %instrument.source,
                "source not enabled, skipping instrument"
            );
            continue;
        };

        let options = ReportOptions {
            lookback_days: config.general.lookback_days,
            include_forecast: instrument.include_forecast,
            forecast_horizon_days: instrument
                .horizon_days
                .unwrap_or(config.general.forecast_horizon_days),
            forecaster: instrument.forecast_method(),
        };

        let analysis =
            match analyzer::generate_report(source.as_ref(), &instrument.symbol, &options).await {
                Ok(report) => report,
                Err(e) => {
                    warn!(error = ?e, symbol = %instrument.symbol, "analysis failed");
                    continue;
                }
            };

        if instrument.alert_only && analysis.verdict.action == Action::Neutral {
            info!(symbol = %instrument.symbol, "neutral verdict suppressed (alert_only)");
            continue;
        }

        if let Err(e) = notifier.deliver(&analysis).await {
            warn!(error = ?e, symbol = %instrument.symbol, "delivery failed");
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

fn build_sources(config: &AppConfig) -> HashMap<String, Arc<dyn MarketDataSource>> {
    config
        .sources
        .iter()
        .filter(|s| s.enabled)
        .filter_map(|s| match s.name.as_str() {
            "chart" => Some((
                s.name.clone(),
                Arc::new(ChartApiSource::new(s.base_url.clone())) as Arc<dyn MarketDataSource>,
            )),
            "gold" => s.api_key.as_ref().map(|key| {
                (
                    s.name.clone(),
                    Arc::new(GoldApiSource::new(s.base_url.clone(), key.clone()))
                        as Arc<dyn MarketDataSource>,
                )
            }),
            other => {
                warn!(name = other, "unknown source in config, skipping");
                None
            }
        })
        .collect()
}
