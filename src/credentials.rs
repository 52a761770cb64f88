//! Credential resolution.
//!
//! Two credential paths are supported: a refresh token read from an auth
//! token file (as written by `weka user login`), and a username/password pair
//! taken straight from the configuration. At least one must be usable.

use crate::config::ClusterSettings;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no cluster credentials provided in config file")]
    NoCredentials,

    #[error("failed to read auth token file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse auth token file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Token material loaded from an auth token file.
///
/// Only `refresh_token` is interpreted; every other key is kept as-is.
#[derive(Clone, Deserialize)]
pub struct TokenBundle {
    pub refresh_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBundle")
            .field("refresh_token", &"<redacted>")
            .field("keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Username/password pair for the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordLogin {
    pub username: String,
    pub password: String,
    pub organization: String,
}

impl std::fmt::Debug for PasswordLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordLogin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

/// Every usable credential path for the cluster.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub tokens: Option<TokenBundle>,
    pub login: Option<PasswordLogin>,
}

/// Expand a leading `~/` against `$HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Load a token bundle from `path`.
pub fn load_token_file(path: &Path) -> Result<TokenBundle, CredentialError> {
    let path = expand_home(path);
    let contents = fs::read_to_string(&path).map_err(|source| CredentialError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CredentialError::Parse { path, source })
}

impl Credentials {
    /// Work out which credential paths are available.
    ///
    /// A token file that cannot be read is reported and skipped; the call only
    /// fails when nothing usable remains.
    pub fn resolve(cluster: &ClusterSettings) -> Result<Self, CredentialError> {
        let tokens = match &cluster.auth_token_file {
            Some(path) => match load_token_file(path) {
                Ok(bundle) => Some(bundle),
                Err(e) => {
                    warn!("Ignoring auth token file: {e}");
                    None
                }
            },
            None => {
                info!("No auth_token_file defined in config file");
                None
            }
        };

        if cluster.username.is_none() {
            info!("No username defined in config file");
        }
        if cluster.password.is_none() {
            info!("No password defined in config file");
        }

        let login = match (&cluster.username, &cluster.password) {
            (Some(username), Some(password)) => Some(PasswordLogin {
                username: username.clone(),
                password: password.clone(),
                organization: cluster.organization.clone(),
            }),
            _ => None,
        };

        if tokens.is_none() && login.is_none() {
            return Err(CredentialError::NoCredentials);
        }

        Ok(Self { tokens, login })
    }
}
