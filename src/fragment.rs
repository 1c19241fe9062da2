use askama::Html as HtmlEscaper;
use askama::MarkupDisplay;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|tr|h[1-6]|blockquote)\s*>").expect("valid regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));

/// What a lookup leaves in the content region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Markup returned by the lookup endpoint, inserted as-is.
    Markup(String),
    /// Plain text, escaped before it reaches the region.
    Text(String),
}

impl Fragment {
    pub fn to_html(&self) -> String {
        match self {
            Fragment::Markup(markup) => markup.clone(),
            Fragment::Text(text) => escape_html(text),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    MarkupDisplay::new_unsafe(text, HtmlEscaper).to_string()
}

/// The page area lookups render into. Each `replace` discards what was there.
pub trait ContentRegion {
    fn replace(&mut self, fragment: Fragment);

    fn scroll_to_top(&mut self) {}
}

impl<R: ContentRegion + ?Sized> ContentRegion for &mut R {
    fn replace(&mut self, fragment: Fragment) {
        (**self).replace(fragment);
    }

    fn scroll_to_top(&mut self) {
        (**self).scroll_to_top();
    }
}

/// Region that keeps the rendered HTML in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferRegion {
    html: String,
    replacements: usize,
    scrolls: usize,
}

impl BufferRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }
}

impl ContentRegion for BufferRegion {
    fn replace(&mut self, fragment: Fragment) {
        self.html = fragment.to_html();
        self.replacements += 1;
    }

    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }
}

/// Reduces markup to readable text for a terminal: block ends become line
/// breaks, tags are dropped and character references decoded.
pub fn plain_text(markup: &str) -> String {
    let broken = BLOCK_BREAK.replace_all(markup, "\n");
    let stripped = TAG.replace_all(&broken, "");
    let decoded = decode_entities(&stripped);
    BLANK_RUN.replace_all(&decoded, "\n\n").trim().to_string()
}

pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_reference(name),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_reference(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_kept_verbatim() {
        let fragment = Fragment::Markup("<p>hello</p>".to_string());
        assert_eq!(fragment.to_html(), "<p>hello</p>");
    }

    #[test]
    fn text_is_escaped() {
        let fragment = Fragment::Text("<script>alert('x')</script> & co".to_string());
        let html = fragment.to_html();
        assert!(!html.contains('<'));
        assert!(html.starts_with("&lt;script&gt;"));
        assert!(html.contains("&amp; co"));
        assert_eq!(Fragment::Text("Not Found".to_string()).to_html(), "Not Found");
    }

    #[test]
    fn buffer_region_replaces_wholesale() {
        let mut region = BufferRegion::with_content("<p>old</p>");
        region.replace(Fragment::Markup("<p>new</p>".to_string()));
        assert_eq!(region.html(), "<p>new</p>");
        region.replace(Fragment::Text("timeout".to_string()));
        assert_eq!(region.html(), "timeout");
        assert_eq!(region.replacements(), 2);
    }

    #[test]
    fn plain_text_breaks_blocks_and_decodes() {
        let markup = "<div><b>cat</b> &lt;n.&gt;</div><p>a small&nbsp;feline</p><br/>see <a href=\"?w=dog\">dog</a>";
        assert_eq!(plain_text(markup), "cat <n.>\na small feline\n\nsee dog");
    }

    #[test]
    fn unknown_entities_survive() {
        assert_eq!(decode_entities("&bogus; &#65; &#x42;"), "&bogus; A B");
    }
}
