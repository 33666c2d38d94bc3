use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use uptime_monitor::config::MonitorConfig;
use uptime_monitor::detector::TransitionDetector;
use uptime_monitor::engine::Monitor;
use uptime_monitor::notify::sink_from_config;
use uptime_monitor::prober::HttpProber;
use uptime_monitor::store::StatusStore;
use uptime_monitor::api;

#[derive(Debug, Parser)]
#[command(version, about = "HTTP uptime monitor")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, env = "UPTIME_CONFIG", default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_ansi(true)
        .init();

    info!("Uptime Monitor starting...");
    let cli = Cli::parse();

    let config = MonitorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let sink = sink_from_config(&config).context("Failed to configure notifications")?;
    let prober = HttpProber::new(config.probe_timeout()).context("Failed to build HTTP client")?;

    info!(
        websites = config.websites.len(),
        interval_secs = config.check_interval,
        timeout_ms = config.probe_timeout_ms,
        "Configuration loaded"
    );

    let store = StatusStore::new(config.websites.iter().cloned());
    let detector = Arc::new(
        TransitionDetector::new(store.clone(), sink).with_notify_timeout(config.notify_timeout()),
    );
    let monitor = Arc::new(Monitor::new(
        config.websites.clone(),
        config.check_interval(),
        Arc::new(prober),
        detector,
    ));

    let api_port = config.api_port;
    let store_for_api = store.clone();
    tokio::spawn(async move {
        if let Err(e) = api::start_server(api_port, store_for_api).await {
            error!("API server failed: {}", e);
        }
    });

    tokio::spawn(Arc::clone(&monitor).run());

    signal::ctrl_c().await?;
    info!("Shutdown signal received. Closing Uptime Monitor...");

    Ok(())
}
