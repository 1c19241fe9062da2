use std::time::Duration;

use url::Url;

use crate::suggest::{DEFAULT_LIMIT, SuggestPolicy};

/// Default page the sdwv server answers on.
pub const DEFAULT_PAGE_URL: &str = "http://127.0.0.1:8888/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Page the endpoints are resolved against.
    pub page_url: String,
    pub max_suggestions: usize,
    pub timeout: Duration,
    /// Serve `w=` links from loaded fragments through the lookup handler.
    pub link_rewrite: bool,
    pub suggest: SuggestPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            max_suggestions: DEFAULT_LIMIT,
            timeout: Duration::from_secs(10),
            link_rewrite: true,
            suggest: SuggestPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn page_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.page_url)
    }
}
