//! Template tags: HTML snippets with `{{placeholder}}` slots.
//!
//! Recognized placeholders:
//!
//! - `{{value}}`: the tag's main value;
//! - `{{name}}`: the tag name;
//! - `{{page.url}}`, `{{page.title}}`, `{{page.uid}}` and `{{page.<field>}}`:
//!   the current page, empty without one;
//! - any other `{{key}}`: the attribute `key`, which also makes `key:` an
//!   attribute the tag accepts.
//!
//! Substituted values are attribute-escaped. Templates may contain other
//! tags; placeholders inside those tags are filled with the raw value and
//! the tag escapes its own output. Substituted values are never scanned for
//! tags themselves.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tagtext_core::TagError;

use crate::handler::{TagContext, TagHandler};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_.]+)\s*\}\}").unwrap());

/// A tag rendered from a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTag {
    template: String,
}

impl TemplateTag {
    /// Wrap a template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The template source.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Attribute keys this template mentions, in order of first appearance.
    pub fn attribute_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.template) {
            let key = caps[1].to_ascii_lowercase();
            if key == "value" || key == "name" || key.starts_with("page.") {
                continue;
            }
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl TagHandler for TemplateTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let keys = self.attribute_keys();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let args = ctx.args(&key_refs);
        let page = ctx.page();

        let lookup = |key: &str| -> String {
            let key = key.to_ascii_lowercase();
            let value = match key.as_str() {
                "value" => args.value.as_str(),
                "name" => ctx.name(),
                _ => match key.strip_prefix("page.") {
                    Some(field) => page
                        .as_deref()
                        .and_then(|page| match field {
                            "url" => Some(page.url.as_str()),
                            "title" => Some(page.title.as_str()),
                            "uid" => Some(page.uid.as_str()),
                            other => page.field(other),
                        })
                        .unwrap_or_default(),
                    None => args.get(&key).unwrap_or_default(),
                },
            };
            value.to_string()
        };

        // Tags written in the template get raw values and escape their own
        // output; everything else is escaped here. Values are never scanned.
        let fill_tag = |text: &str| fill(text, |key| lookup(key));
        let fill_text = |text: &str| {
            fill(text, |key| {
                html_escape::encode_quoted_attribute(&lookup(key)).into_owned()
            })
        };
        Ok(ctx
            .pipeline()
            .expand_tags_with(&self.template, fill_tag, fill_text))
    }
}

fn fill(text: &str, value: impl Fn(&str) -> String) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| value(&caps[1]))
        .into_owned()
}
