//! Configuration loading for the event logger.
//!
//! The configuration lives in a small YAML file with two sections:
//!
//! ```yaml
//! events_log:
//!   filename: weka_events.log
//!   size_mb: 10
//!   num_files: 6
//!   fetch_every_secs: 60
//! cluster:
//!   hosts: "weka01,weka02"
//!   username: admin
//!   password: secret
//!   organization: root
//!   auth_token_file: ~/.weka/auth-token.json
//! ```
//!
//! Every scalar is read as text first, so `size_mb: 10` and `size_mb: "10"`
//! are equivalent. Empty strings count as unset.

use chrono::{Duration, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "weka_event_logger.yml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "WEKA_EVENT_LOGGER_CONFIG";

pub const DEFAULT_LOG_FILENAME: &str = "weka_events.log";
pub const DEFAULT_SIZE_MB: u64 = 10;
pub const DEFAULT_NUM_FILES: usize = 6;
pub const DEFAULT_FETCH_EVERY_SECS: u64 = 60;
pub const DEFAULT_ORGANIZATION: &str = "root";
pub const DEFAULT_API_PORT: u16 = 14000;

/// Errors raised while loading the configuration. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration file: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("malformed configuration file: missing '{0}' section")]
    MissingSection(&'static str),

    #[error("no hosts defined in config file")]
    MissingHosts,

    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the rotating event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsLogSettings {
    pub filename: PathBuf,
    pub size_mb: u64,
    pub num_files: usize,
    pub fetch_every_secs: u64,
    /// Keep polling every `fetch_every_secs` instead of running one cycle.
    pub continuous: bool,
}

impl EventsLogSettings {
    /// Maximum size of the active log file in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.size_mb.saturating_mul(1024 * 1024)
    }
}

/// Cluster connection and credential settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSettings {
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub organization: String,
    pub auth_token_file: Option<PathBuf>,
    pub port: u16,
    pub verify_ssl: bool,
}

/// Fully resolved configuration with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub events_log: EventsLogSettings,
    pub cluster: ClusterSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    events_log: Option<RawEventsLog>,
    cluster: Option<RawCluster>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEventsLog {
    #[serde(default, deserialize_with = "scalar")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    size_mb: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    num_files: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    fetch_every_secs: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    continuous: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCluster {
    #[serde(default, deserialize_with = "scalar")]
    hosts: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    username: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    password: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    organization: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    auth_token_file: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    port: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    verify_ssl: Option<String>,
}

/// Accept any YAML scalar as its text form; empty strings become `None`.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yaml::Value;

    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a scalar value, found {other:?}"
            )))
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("true" | "yes" | "on" | "1") => Ok(true),
        Some("false" | "no" | "off" | "0") => Ok(false),
        Some(_) => Err(ConfigError::InvalidValue {
            key,
            value: value.unwrap_or_default(),
        }),
    }
}

/// A poll interval must be non-zero and reach back to a valid timestamp.
fn is_representable_interval(secs: u64) -> bool {
    secs > 0
        && i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| Utc::now().checked_sub_signed(d))
            .is_some()
}

/// Split a comma-separated host list, dropping blank entries.
pub fn split_hosts(hosts: &str) -> Vec<String> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Parse a YAML document and apply defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        let raw: RawConfig = if yaml.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str::<Option<RawConfig>>(yaml)?.unwrap_or_default()
        };

        let log = raw
            .events_log
            .ok_or(ConfigError::MissingSection("events_log"))?;
        let cluster = raw.cluster.ok_or(ConfigError::MissingSection("cluster"))?;

        let hosts = cluster
            .hosts
            .as_deref()
            .map(split_hosts)
            .unwrap_or_default();
        if hosts.is_empty() {
            return Err(ConfigError::MissingHosts);
        }

        let fetch_every_secs =
            parse_number("fetch_every_secs", log.fetch_every_secs, DEFAULT_FETCH_EVERY_SECS)?;
        if !is_representable_interval(fetch_every_secs) {
            return Err(ConfigError::InvalidValue {
                key: "fetch_every_secs",
                value: fetch_every_secs.to_string(),
            });
        }

        let events_log = EventsLogSettings {
            filename: PathBuf::from(
                log.filename
                    .unwrap_or_else(|| DEFAULT_LOG_FILENAME.to_string()),
            ),
            size_mb: parse_number("size_mb", log.size_mb, DEFAULT_SIZE_MB)?,
            num_files: parse_number("num_files", log.num_files, DEFAULT_NUM_FILES)?,
            fetch_every_secs,
            continuous: parse_bool("continuous", log.continuous, false)?,
        };

        let cluster = ClusterSettings {
            hosts,
            username: cluster.username,
            password: cluster.password,
            organization: cluster
                .organization
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            auth_token_file: cluster.auth_token_file.map(PathBuf::from),
            port: parse_number("port", cluster.port, DEFAULT_API_PORT)?,
            verify_ssl: parse_bool("verify_ssl", cluster.verify_ssl, false)?,
        };

        Ok(Self {
            events_log,
            cluster,
        })
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }
}

/// Config path to use: `$WEKA_EVENT_LOGGER_CONFIG` if set, else the default.
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
