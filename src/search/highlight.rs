//! `<mark>` highlighting for titles, authors and sources.
//!
//! Output is always HTML-safe: text is escaped before any markup is added,
//! and engine fragments are escaped with only their `<mark>` tags restored.

use minijinja::HtmlEscape;
use regex::{Regex, RegexBuilder};

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// HTML-escapes `text` the same way the page templates do.
pub fn escape_html(text: &str) -> String {
    HtmlEscape(text).to_string()
}

/// Escapes an engine-highlighted fragment, keeping only its `<mark>` tags.
pub fn sanitize_fragment(fragment: &str) -> String {
    escape_html(fragment)
        .replace(&escape_html(MARK_OPEN), MARK_OPEN)
        .replace(&escape_html(MARK_CLOSE), MARK_CLOSE)
}

/// Compiled search term for local highlighting.
#[derive(Debug, Clone)]
pub struct Highlighter {
    substring: Option<Regex>,
    word: Option<Regex>,
}

impl Highlighter {
    pub fn new(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            return Self {
                substring: None,
                word: None,
            };
        }
        let escaped = regex::escape(term);
        let build = |pattern: String| {
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self {
            substring: build(escaped.clone()),
            word: build(format!(r"\b{escaped}")),
        }
    }

    pub fn is_active(&self) -> bool {
        self.substring.is_some()
    }

    /// Escaped `text` with the first case-insensitive occurrence of the
    /// term wrapped in `<mark>`. A word-boundary match is tried when the
    /// plain search finds nothing.
    pub fn apply(&self, text: &str) -> String {
        let found = self
            .substring
            .as_ref()
            .and_then(|re| re.find(text))
            .or_else(|| self.word.as_ref().and_then(|re| re.find(text)));

        match found {
            Some(m) => format!(
                "{}{}{}{}{}",
                escape_html(&text[..m.start()]),
                MARK_OPEN,
                escape_html(m.as_str()),
                MARK_CLOSE,
                escape_html(&text[m.end()..])
            ),
            None => escape_html(text),
        }
    }

    /// Engine fragment when there is one, otherwise the local pass.
    pub fn highlight(&self, engine_fragment: Option<&str>, text: &str) -> String {
        match engine_fragment {
            Some(fragment) => sanitize_fragment(fragment),
            None => self.apply(text),
        }
    }
}
