//! Zone resolver command line
//!
//! Resolves each `LAT,LON` argument through the full engine and prints the
//! results as JSON.

use anyhow::{bail, Context};
use climate_zone_engine::config::{Config, LogFormat};
use climate_zone_engine::{ClimateZoneService, Providers};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_pair(arg: &str) -> anyhow::Result<(f64, f64)> {
    let (lat, lon) = arg
        .split_once(',')
        .with_context(|| format!("expected LAT,LON but got '{}'", arg))?;
    let lat = lat.trim().parse::<f64>().with_context(|| format!("bad latitude in '{}'", arg))?;
    let lon = lon.trim().parse::<f64>().with_context(|| format!("bad longitude in '{}'", arg))?;
    Ok((lat, lon))
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zone_resolver=info,climate_zone_engine=info".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.log_format);
    tracing::info!("Starting zone resolver");
    tracing::info!("Environment: {}", config.environment);

    let coordinates = std::env::args()
        .skip(1)
        .map(|arg| parse_pair(&arg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if coordinates.is_empty() {
        bail!("usage: zone-resolver LAT,LON [LAT,LON ...]");
    }

    let service = ClimateZoneService::from_providers(&config, Providers::http(&config));

    let mut results = Vec::with_capacity(coordinates.len());
    for (lat, lon) in coordinates {
        let result = service.resolve_zone(lat, lon).await?;
        tracing::info!(
            lat,
            lon,
            zone = %result.zone,
            confidence = result.confidence,
            degraded = result.degraded,
            "Resolved"
        );
        results.push(result);
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
