//! Candidate words for a partially typed query.
//!
//! The provider asks the `neigh` endpoint for the words following a prefix and
//! hands them back in server order. A failed fetch never leaves the widget
//! waiting: it degrades to a single [`SENTINEL`] entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoints;
use crate::transport::Transport;

/// Placeholder list entry substituted when the suggestion fetch fails.
pub const SENTINEL: &str = "ERROR";

/// Default number of candidates requested per query.
pub const DEFAULT_LIMIT: usize = 10;

/// Splits a `neigh` response into candidates, one per line, untouched.
pub fn parse_candidates(body: &str) -> Vec<String> {
    body.split('\n').map(str::to_string).collect()
}

/// When a changed query is worth asking the server about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestPolicy {
    /// Quiet period after the last keystroke before a request goes out.
    pub delay: Duration,
    /// Shortest term, in characters, that triggers a request.
    pub min_length: usize,
}

impl Default for SuggestPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(300),
            min_length: 1,
        }
    }
}

pub struct SuggestionProvider<T> {
    transport: T,
    endpoints: Endpoints,
    limit: usize,
    policy: SuggestPolicy,
    latest: AtomicU64,
}

impl<T: Transport> SuggestionProvider<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            limit: DEFAULT_LIMIT,
            policy: SuggestPolicy::default(),
            latest: AtomicU64::new(0),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_policy(mut self, policy: SuggestPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn policy(&self) -> SuggestPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches candidates for `term` immediately. Never fails: transport
    /// errors and non-2xx answers yield `["ERROR"]`.
    pub async fn suggest(&self, term: &str) -> Vec<String> {
        let url = self.endpoints.suggestions(term, self.limit);
        match self.transport.get(&url).await {
            Ok(body) => parse_candidates(&body),
            Err(err) => {
                debug!(term, error = %err, "suggestion fetch failed");
                vec![SENTINEL.to_string()]
            }
        }
    }

    /// Registers a keystroke. Any ticket taken earlier stops being current.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Debounced form of [`suggest`](Self::suggest) for a fresh ticket.
    pub async fn suggest_debounced(&self, term: &str) -> Debounced {
        let ticket = self.ticket();
        self.suggest_for(ticket, term).await
    }

    /// Waits out the quiet period, then fetches unless a newer ticket was
    /// taken meanwhile. A response that lands after a newer ticket is dropped.
    pub async fn suggest_for(&self, ticket: Ticket, term: &str) -> Debounced {
        if term.chars().count() < self.policy.min_length {
            return Debounced::TooShort;
        }
        if !self.policy.delay.is_zero() {
            tokio::time::sleep(self.policy.delay).await;
        }
        if !self.is_current(ticket) {
            debug!(term, "suggestion superseded before request");
            return Debounced::Superseded;
        }
        let candidates = self.suggest(term).await;
        if !self.is_current(ticket) {
            debug!(term, "discarding stale suggestion response");
            return Debounced::Superseded;
        }
        Debounced::Ready(candidates)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Position of one query change in keystroke order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Result of a debounced suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Debounced {
    Ready(Vec<String>),
    /// Shorter than the policy's minimum; nothing was requested.
    TooShort,
    /// A newer query took over; the widget must keep what it shows.
    Superseded,
}
