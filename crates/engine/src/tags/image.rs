use tagtext_core::TagError;

use super::{Element, text};
use crate::handler::{TagContext, TagHandler};

/// `(image: src alt: ... title: ... class: ... width: ... height: ... link: ... caption: ...)`
///
/// `text` is accepted as an alias for `alt`. `link: self` links the image to
/// its own source. With a caption the image is wrapped in a `<figure>` that
/// carries the class; otherwise the class sits on the `<img>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTag;

impl ImageTag {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] = &[
        "alt", "text", "title", "class", "width", "height", "link", "caption",
    ];
}

impl TagHandler for ImageTag {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let src = ctx.resolve_url(args.require_value()?);
        let width = args.dimension("width")?;
        let height = args.dimension("height")?;
        let caption = args.get("caption");

        let mut html = Element::new("img")
            .attr("src", &src)
            .attr("alt", args.first_of(&["alt", "text"]).unwrap_or_default())
            .attr_opt("title", args.get("title"))
            .attr_opt("class", args.get("class").filter(|_| caption.is_none()))
            .attr_opt("width", width.map(|w| w.to_string()))
            .attr_opt("height", height.map(|h| h.to_string()))
            .void();

        if let Some(link) = args.get("link") {
            let href = if link.eq_ignore_ascii_case("self") {
                src.clone()
            } else {
                ctx.resolve_url(link)
            };
            html = Element::new("a").attr("href", href).wrap(&html);
        }

        if let Some(caption) = caption {
            let figcaption = Element::new("figcaption").wrap(&text(caption));
            html = Element::new("figure")
                .attr_opt("class", args.get("class"))
                .wrap(&format!("{}{}", html, figcaption));
        }

        Ok(html)
    }
}
