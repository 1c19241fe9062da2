use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::debug;
use url::Url;

/// Why a GET against one of the dictionary endpoints produced no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    Status { code: u16, reason: String },
    Timeout,
    Network(String),
}

impl FetchError {
    /// The short text shown to the user in place of a fragment: the reason
    /// phrase for HTTP failures, `timeout` or `error` otherwise.
    pub fn status_text(&self) -> &str {
        match self {
            FetchError::Status { reason, .. } => reason,
            FetchError::Timeout => "timeout",
            FetchError::Network(_) => "error",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { code, reason } => write!(f, "http status {code} {reason}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("error").to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Text-over-GET seam between the controller and the network.
pub trait Transport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

impl<T: Transport + Sync> Transport for &T {
    fn get(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send {
        (**self).get(url)
    }
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "non-success response");
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
