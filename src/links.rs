//! Cross-reference links inside lookup fragments.
//!
//! Dictionary entries link to other entries with hrefs carrying a `w=`
//! parameter. Those links can be served by another lookup instead of a page
//! navigation.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;

use crate::fragment::{decode_entities, plain_text};

static WORD_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*w=([^&]+)").expect("valid regex"));
static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#)
        .expect("valid regex")
});

/// An anchor found in a loaded fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub href: String,
    pub label: String,
    /// Decoded `w=` value, present when the link points at another entry.
    pub word: Option<String>,
}

/// Extracts the looked-up word from a link target.
///
/// The last `w=` followed by at least one character other than `&` wins, and
/// its value is percent-decoded. A value that does not decode to UTF-8 is
/// returned raw.
pub fn word_param(href: &str) -> Option<String> {
    let raw = WORD_PARAM.captures(href)?.get(1)?.as_str();
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map(|word| word.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}

/// Every anchor with an `href`, in document order.
pub fn cross_references(markup: &str) -> Vec<CrossReference> {
    ANCHOR
        .captures_iter(markup)
        .map(|caps| {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            let label = caps
                .get(3)
                .map(|m| plain_text(m.as_str()))
                .unwrap_or_default();
            let word = word_param(&href);
            CrossReference { href, label, word }
        })
        .collect()
}
