//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::transport::{FetchError, Transport};

/// Answers requests from a table instead of the network.
///
/// Suggestion requests are keyed by `"neigh"`. Lookups are keyed by their
/// `w` value, falling back to `"*"`. Anything unscripted is a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, Result<String, FetchError>>>,
    requests: Mutex<Vec<String>>,
    latency: Mutex<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, response: Result<String, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), response);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests that hit the lookup endpoint.
    pub fn lookups(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| !url.contains("/neigh?"))
            .collect()
    }

    fn answer(&self, url: &Url) -> Result<String, FetchError> {
        let responses = self.responses.lock().unwrap();
        let scripted = if url.path().ends_with("/neigh") {
            responses.get("neigh")
        } else {
            let word = url
                .query_pairs()
                .find(|(key, _)| key == "w")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            responses.get(&word).or_else(|| responses.get("*"))
        };
        scripted.cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            })
        })
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.answer(url)
    }
}
