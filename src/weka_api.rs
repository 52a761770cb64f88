//! Client for the WEKA REST management API.
//!
//! Only the three endpoints the event logger needs are wrapped:
//!
//! - `POST /login` - username/password login
//! - `POST /login/refresh` - exchange a refresh token for fresh tokens
//! - `GET /events` - events within a `start_time`/`end_time` window
//!
//! Every response is wrapped in a `{"data": ...}` envelope.

use crate::credentials::PasswordLogin;
use crate::utils::time::PollWindow;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to send request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse JSON response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The server rejected our credentials or access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Tokens issued by a successful login or refresh.
#[derive(Clone, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl AuthTokens {
    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
    org: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// The operations the session and poll logic need from a cluster.
///
/// One implementation is bound to one host.
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    fn host(&self) -> &str;

    async fn login(&self, login: &PasswordLogin) -> Result<AuthTokens, ApiError>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError>;

    async fn get_events(
        &self,
        tokens: &AuthTokens,
        window: &PollWindow,
    ) -> Result<Vec<Value>, ApiError>;
}

/// HTTP client bound to a single cluster host.
#[derive(Debug, Clone)]
pub struct WekaClient {
    host: String,
    base_url: String,
    client: Client,
}

impl WekaClient {
    /// Create a client for an explicit API base URL (e.g. `https://weka01:14000/api/v2`).
    pub fn new(host: &str, base_url: &str, verify_ssl: bool) -> Result<Self, ApiError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self::with_client(host, base_url, client))
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(host: &str, base_url: &str, client: Client) -> Self {
        Self {
            host: host.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a client for a cluster host name or IP.
    ///
    /// A host that already carries a scheme (`http://...`) is used as the
    /// server root as-is and `port` is ignored.
    pub fn for_host(host: &str, port: u16, verify_ssl: bool) -> Result<Self, ApiError> {
        let base_url = if host.contains("://") {
            format!("{}/api/v2", host.trim_end_matches('/'))
        } else {
            format!("https://{host}:{port}/api/v2")
        };
        Self::new(host, &base_url, verify_ssl)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Request { url, source })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })?;
        extract_data(value).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        self.send(path, request).await
    }
}

impl ClusterApi for WekaClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn login(&self, login: &PasswordLogin) -> Result<AuthTokens, ApiError> {
        let body = LoginBody {
            username: &login.username,
            password: &login.password,
            org: &login.organization,
        };
        self.post("/login", &body).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        self.post("/login/refresh", &RefreshBody { refresh_token }).await
    }

    async fn get_events(
        &self,
        tokens: &AuthTokens,
        window: &PollWindow,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self
            .client
            .get(format!("{}/events", self.base_url))
            .header(reqwest::header::AUTHORIZATION, tokens.authorization())
            .query(&[
                ("start_time", window.start_param()),
                ("end_time", window.end_param()),
            ]);
        self.send("/events", request).await
    }
}

/// Unwrap the `data` envelope of an API response, if present.
pub fn extract_data<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            serde_json::from_value(map.remove("data").unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}
