use url::Url;

/// Path of the suggestion endpoint, relative to the page URL.
pub const NEIGH_PATH: &str = "neigh";
/// Path of the lookup endpoint: the page itself.
pub const LOOKUP_PATH: &str = ".";

pub const PARAM_WORD: &str = "w";
pub const PARAM_OFFSET: &str = "off";
pub const PARAM_LENGTH: &str = "len";
pub const PARAM_CONTENT: &str = "co";

/// Marks a lookup as a content-only fetch instead of a full page render.
pub const CONTENT_ONLY: &str = "c";

/// Resolves the two sdwv endpoints against the page the client is bound to.
#[derive(Debug, Clone)]
pub struct Endpoints {
    neigh: Url,
    lookup: Url,
}

impl Endpoints {
    pub fn new(page: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            neigh: page.join(NEIGH_PATH)?,
            lookup: page.join(LOOKUP_PATH)?,
        })
    }

    /// `neigh?w=<term>&off=0&len=<limit>`
    pub fn suggestions(&self, term: &str, limit: usize) -> Url {
        let mut url = self.neigh.clone();
        url.query_pairs_mut()
            .append_pair(PARAM_WORD, term)
            .append_pair(PARAM_OFFSET, "0")
            .append_pair(PARAM_LENGTH, &limit.to_string());
        url
    }

    /// `.?w=<word>&co=c`
    pub fn lookup(&self, word: &str) -> Url {
        let mut url = self.lookup.clone();
        url.query_pairs_mut()
            .append_pair(PARAM_WORD, word)
            .append_pair(PARAM_CONTENT, CONTENT_ONLY);
        url
    }
}
