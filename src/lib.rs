//! Suggest-as-you-type lookups against a StarDict web viewer.
//!
//! The server exposes two GET endpoints next to its page: `neigh`, which lists
//! the words following a prefix, and `.`, which renders the entry for a word as
//! an HTML fragment. [`LookupController`] ties them to a query field, a
//! suggestion list and a content region.

mod arbiter;
mod config;
mod controller;
mod endpoint;
mod fragment;
mod links;
mod suggest;
#[cfg(test)]
mod testing;
mod transport;

pub use arbiter::{ArbiterState, CloseDecision, SelectionArbiter};
pub use config::{ClientConfig, DEFAULT_PAGE_URL};
pub use controller::{
    ClientError, LookupController, LookupOutcome, PendingSuggestions, Reaction, UiEvent,
};
pub use endpoint::Endpoints;
pub use fragment::{BufferRegion, ContentRegion, Fragment, escape_html, plain_text};
pub use links::{CrossReference, cross_references, word_param};
pub use suggest::{
    DEFAULT_LIMIT, Debounced, SENTINEL, SuggestPolicy, SuggestionProvider, Ticket, parse_candidates,
};
pub use transport::{FetchError, HttpTransport, Transport};
