//! Top-level flow: credentials → session → event log → poll.

use crate::config::Config;
use crate::credentials::Credentials;
use crate::poller::{self, CycleOutcome};
use crate::session;
use crate::utils::rotating::RotatingFileWriter;
use crate::utils::time::PollWindow;
use crate::weka_api::WekaClient;
use anyhow::{Context, Result};
use tracing::{error, info};

/// Run the logger against the configured cluster.
///
/// Fails on missing credentials, when no host accepts them, or when the
/// event log cannot be written. A failed event fetch is not an error.
pub async fn run(config: &Config) -> Result<()> {
    let cluster = &config.cluster;
    let settings = &config.events_log;

    let credentials = Credentials::resolve(cluster)?;

    let (port, verify_ssl) = (cluster.port, cluster.verify_ssl);
    let connect = move |host: &str| WekaClient::for_host(host, port, verify_ssl);

    let session = session::establish(&cluster.hosts, &credentials, connect).await?;

    info!("Setting up event log {}", settings.filename.display());
    let mut events_log =
        RotatingFileWriter::open(&settings.filename, settings.max_bytes(), settings.num_files)
            .with_context(|| format!("Failed to open event log {}", settings.filename.display()))?;

    if settings.continuous {
        let hosts = cluster.hosts.as_slice();
        let credentials = &credentials;
        poller::run_continuous(
            session,
            settings.fetch_every_secs,
            &mut events_log,
            move || session::establish(hosts, credentials, connect),
            shutdown_signal(),
        )
        .await
    } else {
        let window = PollWindow::last(settings.fetch_every_secs);
        let outcome = poller::poll_once(&session, &window, &mut events_log)
            .await
            .with_context(|| format!("Failed to write event log {}", settings.filename.display()))?;
        if let CycleOutcome::Recorded(count) = outcome {
            info!("Recorded {count} event(s) for {window}");
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
