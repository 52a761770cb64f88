//! # WEKA Event Logger
//!
//! A small sidecar that polls a WEKA storage cluster's REST management API
//! for events and appends them, one JSON document per line, to a rotating
//! local log file.
//!
//! ## Overview
//!
//! Each run:
//!
//! 1. Loads `weka_event_logger.yml` (or `$WEKA_EVENT_LOGGER_CONFIG`)
//! 2. Resolves credentials: a refresh token from an auth token file and/or a
//!    username and password
//! 3. Tries the configured hosts in order until one accepts the credentials
//! 4. Fetches the events of the last `fetch_every_secs` seconds
//! 5. Appends each event to the event log, rotating by size and count
//!
//! By default one poll cycle runs per invocation, suited to a cron job or a
//! systemd timer. With `events_log.continuous: true` the process keeps
//! polling until interrupted.
//!
//! ## Architecture
//!
//! - [`config`] - YAML configuration with defaults
//! - [`credentials`] - Credential resolution and auth token files
//! - [`weka_api`] - Management API client
//! - [`session`] - Host fallback and session establishment
//! - [`poller`] - Poll cycle and continuous loop
//! - [`app`] - Wires the pieces together for the binary
//! - [`utils`] - Logging setup, rotating file writer, timestamps
//!
//! ## Example Configuration
//!
//! ```yaml
//! events_log:
//!   filename: /var/log/weka/weka_events.log
//!   size_mb: 10
//!   num_files: 6
//!   fetch_every_secs: 60
//! cluster:
//!   hosts: "weka01,weka02,weka03"
//!   auth_token_file: ~/.weka/auth-token.json
//! ```

pub mod app;
pub mod config;
pub mod credentials;
pub mod poller;
pub mod session;
pub mod utils;
pub mod weka_api;
