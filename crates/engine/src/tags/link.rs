use tagtext_core::TagError;

use super::{Element, text};
use crate::handler::{TagContext, TagHandler};

/// `(link: url text: ... title: ... class: ... rel: ... target: ... popup: yes)`
///
/// Relative URLs are resolved against the current page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkTag;

impl LinkTag {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] =
        &["text", "title", "class", "rel", "target", "popup"];
}

impl TagHandler for LinkTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let url = args.require_value()?;
        let popup = args.flag("popup");

        let target = args.get("target").or(popup.then_some("_blank"));
        let rel = args
            .get("rel")
            .or(popup.then_some("noopener noreferrer"));

        Ok(Element::new("a")
            .attr("href", ctx.resolve_url(url))
            .attr_opt("rel", rel)
            .attr_opt("class", args.get("class"))
            .attr_opt("title", args.get("title"))
            .attr_opt("target", target)
            .wrap(&text(args.get("text").unwrap_or(url))))
    }
}
