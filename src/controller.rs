use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::arbiter::{ArbiterState, CloseDecision, SelectionArbiter};
use crate::config::ClientConfig;
use crate::endpoint::Endpoints;
use crate::fragment::{ContentRegion, Fragment};
use crate::links::{CrossReference, cross_references, word_param};
use crate::suggest::{Debounced, SuggestionProvider, Ticket};
use crate::transport::{HttpTransport, Transport};

/// Named inputs from the suggestion widget and the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    QueryChanged(String),
    ItemSelected(String),
    ListClosed,
    FormSubmitted,
    LinkClicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOutcome {
    Loaded,
    /// The lookup failed; carries the status text now shown in the region.
    Failed(String),
}

/// What handling one [`UiEvent`] amounted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// List for the widget to display.
    Suggestions(Vec<String>),
    /// A newer query replaced this one; leave the widget alone.
    Superseded,
    /// The query is below the minimum length; no request was made.
    TooShort,
    /// A selection is pending until the list closes.
    Armed,
    Dismissed,
    Submitted(LookupOutcome),
    /// The link is not ours to handle; the host should follow it.
    Navigate(String),
}

#[derive(Debug)]
pub enum ClientError {
    InvalidPageUrl(url::ParseError),
    Http(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidPageUrl(err) => write!(f, "invalid page url: {err}"),
            ClientError::Http(err) => write!(f, "http client error: {err}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<url::ParseError> for ClientError {
    fn from(value: url::ParseError) -> Self {
        ClientError::InvalidPageUrl(value)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        ClientError::Http(value)
    }
}

/// Suggestion fetch for one query change, detached from the controller.
///
/// Taking it records the keystroke, so a later `query_changed` supersedes it
/// even while this one is still waiting or in flight.
pub struct PendingSuggestions<T> {
    provider: Arc<SuggestionProvider<T>>,
    ticket: Ticket,
    term: String,
}

impl<T: Transport> PendingSuggestions<T> {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub async fn resolve(self) -> Reaction {
        match self.provider.suggest_for(self.ticket, &self.term).await {
            Debounced::Ready(list) => Reaction::Suggestions(list),
            Debounced::TooShort => Reaction::TooShort,
            Debounced::Superseded => Reaction::Superseded,
        }
    }
}

/// Binds the query field, the suggestion list and the lookup form of one page.
///
/// Events are handled one after another; the only state carried between them
/// is the query text, the arbiter, and whether link interception has been
/// bound by a successful load. Suggestion fetches are the exception: hosts
/// that see keystrokes faster than answers arrive take them through
/// [`query_changed`](Self::query_changed) and resolve them concurrently.
pub struct LookupController<T, R> {
    suggestions: Arc<SuggestionProvider<T>>,
    region: R,
    query: String,
    arbiter: SelectionArbiter,
    link_rewrite: bool,
    links_bound: bool,
    references: Vec<CrossReference>,
}

impl<R: ContentRegion> LookupController<HttpTransport, R> {
    /// Builds a controller talking HTTP to the page named in `config`.
    pub fn connect(config: &ClientConfig, region: R) -> Result<Self, ClientError> {
        let page = config.page_url()?;
        let endpoints = Endpoints::new(&page)?;
        let transport = HttpTransport::new(config.timeout)?;
        info!(
            page = %page,
            max_suggestions = config.max_suggestions,
            link_rewrite = config.link_rewrite,
            "lookup controller ready"
        );
        let suggestions = SuggestionProvider::new(transport, endpoints)
            .with_limit(config.max_suggestions)
            .with_policy(config.suggest);
        Ok(Self::new(suggestions, region).with_link_rewrite(config.link_rewrite))
    }
}

impl<T: Transport, R: ContentRegion> LookupController<T, R> {
    pub fn new(suggestions: SuggestionProvider<T>, region: R) -> Self {
        Self {
            suggestions: Arc::new(suggestions),
            region,
            query: String::new(),
            arbiter: SelectionArbiter::new(),
            link_rewrite: true,
            links_bound: false,
            references: Vec::new(),
        }
    }

    pub fn with_link_rewrite(mut self, enabled: bool) -> Self {
        self.link_rewrite = enabled;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn selection_state(&self) -> ArbiterState {
        self.arbiter.state()
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn suggestions(&self) -> &SuggestionProvider<T> {
        self.suggestions.as_ref()
    }

    /// Anchors of the fragment currently shown, empty after a failed lookup.
    pub fn cross_references(&self) -> &[CrossReference] {
        &self.references
    }

    pub async fn dispatch(&mut self, event: UiEvent) -> Reaction {
        match event {
            UiEvent::QueryChanged(text) => self.query_changed(text).resolve().await,
            UiEvent::ItemSelected(item) => self.item_selected(item),
            UiEvent::ListClosed => self.list_closed().await,
            UiEvent::FormSubmitted => Reaction::Submitted(self.submit().await),
            UiEvent::LinkClicked(href) => self.link_clicked(href).await,
        }
    }

    /// Records the new query text and hands back its suggestion fetch.
    pub fn query_changed(&mut self, text: impl Into<String>) -> PendingSuggestions<T> {
        self.query = text.into();
        PendingSuggestions {
            provider: Arc::clone(&self.suggestions),
            ticket: self.suggestions.ticket(),
            term: self.query.clone(),
        }
    }

    fn item_selected(&mut self, item: String) -> Reaction {
        self.query = item;
        self.arbiter.select();
        Reaction::Armed
    }

    async fn list_closed(&mut self) -> Reaction {
        match self.arbiter.close() {
            CloseDecision::Submit => Reaction::Submitted(self.submit().await),
            CloseDecision::Dismiss => Reaction::Dismissed,
        }
    }

    async fn link_clicked(&mut self, href: String) -> Reaction {
        if !(self.link_rewrite && self.links_bound) {
            return Reaction::Navigate(href);
        }
        match word_param(&href) {
            Some(word) => {
                debug!(%href, %word, "intercepted cross reference");
                self.query = word;
                Reaction::Submitted(self.submit().await)
            }
            None => Reaction::Navigate(href),
        }
    }

    /// Looks up the current query and replaces the region with the result.
    pub async fn submit(&mut self) -> LookupOutcome {
        debug!(query = %self.query, "submitting lookup");
        let url = self.suggestions.endpoints().lookup(&self.query);
        let (fragment, outcome) = match self.suggestions.transport().get(&url).await {
            Ok(body) => {
                self.references = cross_references(&body);
                if self.link_rewrite {
                    self.links_bound = true;
                }
                (Fragment::Markup(body), LookupOutcome::Loaded)
            }
            Err(err) => {
                debug!(query = %self.query, error = %err, "lookup failed");
                self.references.clear();
                let text = err.status_text().to_string();
                (Fragment::Text(text.clone()), LookupOutcome::Failed(text))
            }
        };
        self.region.replace(fragment);
        self.region.scroll_to_top();
        outcome
    }
}
