//! Session establishment across candidate hosts.
//!
//! Hosts are tried in configured order. On each host a token refresh is
//! attempted first (when a token file was loaded), then a username/password
//! login (when configured). A refresh failure never skips the login. The
//! first host that yields tokens becomes the session; the rest are not
//! contacted.

use crate::credentials::Credentials;
use crate::weka_api::{ApiError, AuthTokens, ClusterApi};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not authenticate against any of {attempted} cluster host(s)")]
    NoHostAuthenticated { attempted: usize },
}

/// An authenticated context bound to one host.
#[derive(Debug)]
pub struct Session<A> {
    api: A,
    tokens: AuthTokens,
}

impl<A: ClusterApi> Session<A> {
    pub fn new(api: A, tokens: AuthTokens) -> Self {
        Self { api, tokens }
    }

    pub fn host(&self) -> &str {
        self.api.host()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tokens(&self) -> &AuthTokens {
        &self.tokens
    }
}

/// Try every credential path against one host.
async fn authenticate_host<A: ClusterApi>(api: &A, credentials: &Credentials) -> Option<AuthTokens> {
    let mut tokens = None;

    if let Some(bundle) = &credentials.tokens {
        match api.refresh_token(&bundle.refresh_token).await {
            Ok(t) => {
                debug!(host = api.host(), "Token refresh succeeded");
                tokens = Some(t);
            }
            Err(e) => info!(host = api.host(), "Token refresh failed: {e}"),
        }
    }

    if let Some(login) = &credentials.login {
        match api.login(login).await {
            Ok(t) => {
                debug!(host = api.host(), user = %login.username, "Login succeeded");
                tokens = Some(t);
            }
            Err(e) => warn!(host = api.host(), "Login failed: {e}"),
        }
    }

    tokens
}

/// Find the first host that accepts our credentials.
///
/// `connect` builds a client for a host; a host whose client cannot be built
/// is skipped like any other failure.
pub async fn establish<A, F>(
    hosts: &[String],
    credentials: &Credentials,
    connect: F,
) -> Result<Session<A>, SessionError>
where
    A: ClusterApi,
    F: Fn(&str) -> Result<A, ApiError>,
{
    for host in hosts {
        let api = match connect(host) {
            Ok(api) => api,
            Err(e) => {
                warn!(host = %host, "Skipping host: {e}");
                continue;
            }
        };

        if let Some(tokens) = authenticate_host(&api, credentials).await {
            info!(host = %host, "Logged in to cluster");
            return Ok(Session::new(api, tokens));
        }
    }

    Err(SessionError::NoHostAuthenticated {
        attempted: hosts.len(),
    })
}
