//! Air-quality dashboard.
//!
//! Single-binary Tokio application that:
//! 1. Fetches the pollution history for one location from OpenWeather
//! 2. Caches the flattened table for a fixed window (2h by default)
//! 3. Serves a single-page dashboard whose charts are rebuilt per request
//! 4. Exports the selected date range as CSV

mod config;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use analytics::{summarize, to_csv, DatasetCache, DateRange};
use clap::Parser;
use common::Error;
use openweather_client::OpenWeatherClient;
use tracing::{error, info};

use server::AppState;

/// Air Quality Dashboard
#[derive(Parser)]
#[command(name = "air-quality-dashboard", about = "Historical air-quality dashboard")]
struct Cli {
    /// Print the summary metrics for the selected range and exit.
    #[arg(long)]
    summary: bool,

    /// Write the selected range as CSV to this path and exit.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// First day of the range (YYYY-MM-DD). Defaults to the first sample.
    #[arg(long)]
    start: Option<String>,

    /// Last day of the range (YYYY-MM-DD). Defaults to the last sample.
    #[arg(long)]
    end: Option<String>,

    /// Listen address, overriding config.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "air_quality_dashboard=info,openweather_client=info,analytics=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Air quality dashboard starting up...");

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = &cli.bind {
        cfg.server.bind = bind.clone();
    }

    info!(
        "Location: {} ({}, {}), cache ttl={}s",
        cfg.location.name, cfg.location.lat, cfg.location.lon, cfg.cache.ttl_secs
    );

    let client = match OpenWeatherClient::new(cfg.api_key.clone(), &cfg.base_url) {
        Ok(c) => c,
        Err(e) => {
            error!("Client initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        cache: Arc::new(DatasetCache::new(Duration::from_secs(cfg.cache.ttl_secs))),
        cfg: Arc::new(cfg),
        client,
    };

    // ── One-shot modes ───────────────────────────────────────────────
    if cli.summary || cli.export.is_some() {
        if let Err(e) = run_once(&state, &cli).await {
            error!("❌ {}", e);
            std::process::exit(1);
        }
        return;
    }

    // ── Serve ────────────────────────────────────────────────────────
    let bind: SocketAddr = match state.cfg.server.bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address {}: {}", state.cfg.server.bind, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(state, bind).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("shut down");
}

async fn run_once(state: &AppState, cli: &Cli) -> Result<(), Error> {
    let table = state.dataset().await?;
    let range = DateRange::resolve(cli.start.as_deref(), cli.end.as_deref(), &table)?;
    let filtered = table.filter_dates(range);
    info!(
        "Selected {}..{}: {} of {} rows",
        range.start,
        range.end,
        filtered.len(),
        table.len()
    );

    if let Some(path) = &cli.export {
        std::fs::write(path, to_csv(&filtered)?)?;
        info!("Wrote {} rows to {}", filtered.len(), path.display());
    }

    if cli.summary {
        let Some(summary) = summarize(&filtered) else {
            println!("No samples between {} and {}", range.start, range.end);
            return Ok(());
        };
        println!("{} Air Quality", state.cfg.location.name);
        println!("  Last Update   {}", summary.last_update);
        println!("  AQI Category  {}", summary.aqi_category);
        for m in &summary.pollutants {
            let delta = m
                .delta
                .map(|d| format!("{d:+.2}"))
                .unwrap_or_else(|| "-".into());
            println!(
                "  {:<6} {:>10.2} μg/m3  Δ {:>8}{}",
                m.pollutant.label(),
                m.value,
                delta,
                if m.value > m.poor_limit { "  (above poor limit)" } else { "" }
            );
        }
    }

    Ok(())
}
