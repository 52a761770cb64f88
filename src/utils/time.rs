use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a timestamp the way the WEKA API expects it
/// (`2025-10-20T10:30:00.000Z`).
pub fn to_wekatime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The `[start, end]` range requested in one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PollWindow {
    /// Window of `interval_secs` seconds ending at `now`.
    ///
    /// Intervals reaching before the earliest representable time are
    /// clamped; configuration loading rejects them up front.
    pub fn ending_at(now: DateTime<Utc>, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs).unwrap_or(i64::MAX);
        let start = Duration::try_seconds(secs)
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// Window of `interval_secs` seconds ending at the current time.
    pub fn last(interval_secs: u64) -> Self {
        Self::ending_at(Utc::now(), interval_secs)
    }

    pub fn start_param(&self) -> String {
        to_wekatime(&self.start)
    }

    pub fn end_param(&self) -> String {
        to_wekatime(&self.end)
    }

    pub fn length_secs(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_seconds()
    }
}

impl std::fmt::Display for PollWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start_param(), self.end_param())
    }
}
