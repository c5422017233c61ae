use tagtext_core::TagError;

use super::{Element, text};
use crate::handler::{TagContext, TagHandler};

/// `(email: address text: ... title: ... class: ...)`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailTag;

impl EmailTag {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] = &["text", "title", "class"];
}

impl TagHandler for EmailTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let address = args.require_value()?;
        let address = address.strip_prefix("mailto:").unwrap_or(address);

        let valid = address
            .split_once('@')
            .is_some_and(|(user, host)| !user.is_empty() && !host.is_empty())
            && !address.contains(char::is_whitespace);
        if !valid {
            return Err(TagError::InvalidAttribute {
                attribute: "email".to_string(),
                value: address.to_string(),
            });
        }

        Ok(Element::new("a")
            .attr("href", format!("mailto:{}", address))
            .attr_opt("class", args.get("class"))
            .attr_opt("title", args.get("title"))
            .wrap(&text(args.get("text").unwrap_or(address))))
    }
}
