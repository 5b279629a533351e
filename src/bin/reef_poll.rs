use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reef_monitor::config::PollerConfig;
use reef_monitor::poller::{LogSink, Poller, SnapshotClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reef_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PollerConfig::from_env();
    let client = SnapshotClient::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_seconds),
    )?;

    tracing::info!(
        url = client.data_url(),
        interval_secs = config.poll_interval_seconds,
        "Starting snapshot poller"
    );

    let poller = Poller::new(
        client,
        LogSink,
        Duration::from_secs(config.poll_interval_seconds),
    );
    poller
        .run(async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        })
        .await;

    Ok(())
}
