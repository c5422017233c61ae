use tagtext_core::TagError;

use super::{Element, text};
use crate::handler::{TagContext, TagHandler};

/// `(twitter: @handle text: ... class: ...)`
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterTag;

impl TwitterTag {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] = &["text", "class"];
}

impl TagHandler for TwitterTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let value = args.require_value()?;
        let handle = value.trim_start_matches('@');

        if handle.is_empty() || !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TagError::InvalidAttribute {
                attribute: "twitter".to_string(),
                value: value.to_string(),
            });
        }

        let label = match args.get("text") {
            Some(label) => label.to_string(),
            None => format!("@{}", handle),
        };

        Ok(Element::new("a")
            .attr("href", format!("https://twitter.com/{}", handle))
            .attr_opt("class", args.get("class"))
            .wrap(&text(&label)))
    }
}
