use tagtext_core::TagError;

use super::{Element, text};
use crate::handler::{TagContext, TagHandler};

/// `(file: name.pdf text: ... title: ... class: ...)`
///
/// Links a file that belongs to the current page: the href is the page URL
/// joined with the file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTag;

impl FileTag {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] = &["text", "title", "class"];
}

impl TagHandler for FileTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let file = args.require_value()?;
        let label = args
            .get("text")
            .unwrap_or_else(|| file.rsplit('/').next().unwrap_or(file));

        Ok(Element::new("a")
            .attr("href", ctx.resolve_url(file))
            .attr_opt("class", args.get("class"))
            .attr_opt("title", args.get("title"))
            .wrap(&text(label)))
    }
}
