//! Source text and the page context it belongs to.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Page context a tag may query while rendering (URL for relative links, title, fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Stable page identifier (e.g. `about`).
    pub uid: String,
    /// Public URL of the page; relative tag values are resolved against it.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Any other content fields, stringified.
    pub fields: BTreeMap<String, String>,
}

impl Page {
    /// Create a page with an identifier and URL.
    pub fn new(uid: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a content field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a content field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Build a page from a frontmatter mapping.
    ///
    /// `uid`, `url` and `title` fill the dedicated fields; other scalar values
    /// land in [`Page::fields`]. Sequences and nested mappings are skipped.
    pub fn from_frontmatter(value: &JsonValue) -> Self {
        let mut page = Page::default();
        let Some(map) = value.as_object() else {
            return page;
        };

        for (key, value) in map {
            let Some(text) = scalar_to_string(value) else {
                continue;
            };
            match key.as_str() {
                "uid" => page.uid = text,
                "url" => page.url = text,
                "title" => page.title = text,
                _ => {
                    page.fields.insert(key.clone(), text);
                }
            }
        }
        page
    }

    /// Resolve a possibly relative URL against this page's URL.
    ///
    /// Absolute URLs (`scheme:`), protocol-relative (`//`), root-relative (`/`)
    /// and fragment-only (`#`) values pass through unchanged.
    pub fn resolve_url(&self, target: &str) -> String {
        if self.url.is_empty() || is_absolute_url(target) {
            return target.to_string();
        }
        format!("{}/{}", self.url.trim_end_matches('/'), target)
    }
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether `target` should be used as-is rather than resolved against a page URL.
pub fn is_absolute_url(target: &str) -> bool {
    if target.starts_with('/') || target.starts_with('#') {
        return true;
    }
    match target.find(':') {
        Some(idx) => {
            let scheme = &target[..idx];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Host-supplied fallback for the page context when none was set explicitly.
pub trait PageResolver: Send + Sync {
    /// The page currently being served, if the host knows one.
    fn active_page(&self) -> Option<Arc<Page>>;
}

impl<F> PageResolver for F
where
    F: Fn() -> Option<Arc<Page>> + Send + Sync,
{
    fn active_page(&self) -> Option<Arc<Page>> {
        (self)()
    }
}

/// Text to render, optionally wrapped together with its owning page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    text: String,
    page: Option<Arc<Page>>,
}

impl SourceText {
    /// Plain text without page context.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: None,
        }
    }

    /// Text that belongs to `page`.
    pub fn with_page(text: impl Into<String>, page: impl Into<Arc<Page>>) -> Self {
        Self {
            text: text.into(),
            page: Some(page.into()),
        }
    }

    /// The raw markup.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The owning page, if the text was wrapped with one.
    pub fn page(&self) -> Option<&Arc<Page>> {
        self.page.as_ref()
    }

    /// Split into text and page.
    pub fn into_parts(self) -> (String, Option<Arc<Page>>) {
        (self.text, self.page)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&String> for SourceText {
    fn from(text: &String) -> Self {
        Self::new(text.as_str())
    }
}

impl std::fmt::Display for SourceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_from_frontmatter_splits_known_keys() {
        let page = Page::from_frontmatter(&json!({
            "uid": "about",
            "url": "/about",
            "title": "About us",
            "draft": false,
            "order": 3,
            "tags": ["a", "b"],
        }));
        assert_eq!(page.uid, "about");
        assert_eq!(page.url, "/about");
        assert_eq!(page.title, "About us");
        assert_eq!(page.field("draft"), Some("false"));
        assert_eq!(page.field("order"), Some("3"));
        assert_eq!(page.field("tags"), None);
    }

    #[test]
    fn resolve_url_joins_relative_targets() {
        let page = Page::new("blog", "/blog/");
        assert_eq!(page.resolve_url("photo.jpg"), "/blog/photo.jpg");
        assert_eq!(page.resolve_url("/static/a.css"), "/static/a.css");
        assert_eq!(page.resolve_url("https://example.com"), "https://example.com");
        assert_eq!(page.resolve_url("mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(page.resolve_url("#top"), "#top");
    }

    #[test]
    fn resolve_url_without_page_url_is_identity() {
        assert_eq!(Page::default().resolve_url("photo.jpg"), "photo.jpg");
    }

    #[test]
    fn source_text_conversions() {
        let plain: SourceText = "hello".into();
        assert_eq!(plain.as_str(), "hello");
        assert!(plain.page().is_none());
        assert_eq!(plain.to_string(), "hello");

        let wrapped = SourceText::with_page("hi", Page::new("home", "/"));
        let (text, page) = wrapped.into_parts();
        assert_eq!(text, "hi");
        assert_eq!(page.unwrap().uid, "home");
    }

    #[test]
    fn closures_resolve_pages() {
        let resolver = || Some(Arc::new(Page::new("active", "/active")));
        assert_eq!(resolver.active_page().unwrap().uid, "active");
    }
}
