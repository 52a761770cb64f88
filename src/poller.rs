//! The poll cycle: fetch one window of events and record them.
//!
//! [`poll_once`] is the unit of work. [`run_continuous`] repeats it on a
//! fixed interval until its shutdown future resolves.

use crate::session::{Session, SessionError};
use crate::utils::rotating::RotatingFileWriter;
use crate::utils::time::PollWindow;
use crate::weka_api::{ApiError, ClusterApi};
use serde_json::Value;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Destination for event records, one JSON document per record.
pub trait EventSink {
    fn record(&mut self, event: &Value) -> io::Result<()>;
}

impl EventSink for RotatingFileWriter {
    fn record(&mut self, event: &Value) -> io::Result<()> {
        let line = serde_json::to_string(event)?;
        self.write_record(&line)
    }
}

/// What happened in one cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The fetch succeeded and this many events were written.
    Recorded(usize),
    /// The fetch failed; nothing was written for the window.
    FetchFailed(ApiError),
}

/// Fetch the events in `window` and append each one to `sink`.
///
/// A failed fetch is logged and reported through [`CycleOutcome`]; only
/// sink I/O errors are returned as `Err`.
pub async fn poll_once<A, S>(
    session: &Session<A>,
    window: &PollWindow,
    sink: &mut S,
) -> io::Result<CycleOutcome>
where
    A: ClusterApi,
    S: EventSink + ?Sized,
{
    debug!(host = session.host(), %window, "Fetching events");

    let events = match session.api().get_events(session.tokens(), window).await {
        Ok(events) => events,
        Err(e) => {
            error!(host = session.host(), "Failed to fetch events: {e}");
            return Ok(CycleOutcome::FetchFailed(e));
        }
    };

    for event in &events {
        sink.record(event)?;
    }

    debug!(count = events.len(), "Recorded events");
    Ok(CycleOutcome::Recorded(events.len()))
}

/// Poll every `interval_secs` until `shutdown` resolves.
///
/// The first cycle runs immediately. When a fetch is rejected as
/// unauthorized, `reauthenticate` is called once to replace the session;
/// its failure ends the loop.
pub async fn run_continuous<A, S, R, Fut, Sd>(
    mut session: Session<A>,
    interval_secs: u64,
    sink: &mut S,
    mut reauthenticate: R,
    shutdown: Sd,
) -> anyhow::Result<()>
where
    A: ClusterApi,
    S: EventSink + ?Sized,
    R: FnMut() -> Fut,
    Fut: Future<Output = Result<Session<A>, SessionError>>,
    Sd: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(interval_secs, "Polling continuously");
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping poll loop");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let window = PollWindow::last(interval_secs);
        if let CycleOutcome::FetchFailed(e) = poll_once(&session, &window, sink).await? {
            if e.is_unauthorized() {
                warn!(host = session.host(), "Session rejected, re-authenticating");
                session = reauthenticate().await?;
            }
        }
    }
}
