//! CloudPulse integrator - threshold monitor for infrastructure telemetry
//!
//! Polls the latest metric snapshot from the MySQL store populated by the
//! ingestion agent, evaluates it against configured thresholds, and raises
//! ServiceNow incidents for breaches with per-signal cooldown suppression.
//!
//! Configuration is read once at startup from the TOML file named by
//! `CLOUDPULSE_CONFIG` (default `integrator.toml`); a broken config is fatal,
//! everything after that is recoverable.

use anyhow::{Context, Result};
use cloudpulse_integrator::config::{self, IntegratorConfig};
use cloudpulse_integrator::integrator::{Integrator, SystemClock};
use cloudpulse_integrator::sink::ServiceNowSink;
use cloudpulse_integrator::source::MySqlMetricSource;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudpulse_integrator=info".into()),
        )
        .init();

    let config_path = config::config_path();
    let config = IntegratorConfig::load(&config_path)
        .await
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    info!(config_path = %config_path, "CloudPulse integrator starting");

    let source =
        MySqlMetricSource::connect_lazy(&config.mysql).context("failed to set up metrics store pool")?;
    let sink =
        ServiceNowSink::new(config.servicenow.clone()).context("failed to set up ServiceNow client")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c"),
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
        let _ = shutdown_tx.send(true);
    });

    let mut integrator = Integrator::from_config(source, sink, SystemClock, &config);
    integrator.run(shutdown_rx).await;

    info!("integrator stopped");
    Ok(())
}
