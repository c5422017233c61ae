use std::sync::LazyLock;

use regex::Regex;
use tagtext_core::TagError;

use super::Element;
use crate::handler::{TagContext, TagHandler};

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtu\.be/|youtube(?:-nocookie)?\.com/(?:watch\?(?:\S*&)?v=|embed/|v/|shorts/))([A-Za-z0-9_-]+)",
    )
    .unwrap()
});
static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap());
static VIMEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/|channels/\w+/)?(\d+)").unwrap());
static VIMEO_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// A video service whose players can be embedded in an iframe.
pub trait VideoProvider {
    /// Tag name, also used in error messages.
    const NAME: &'static str;

    /// Extract the video id from a URL or bare id.
    fn video_id(value: &str) -> Option<String>;

    /// Player URL for `id`.
    fn embed_url(id: &str) -> String;
}

/// YouTube embeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Youtube;

impl VideoProvider for Youtube {
    const NAME: &'static str = "youtube";

    fn video_id(value: &str) -> Option<String> {
        if let Some(caps) = YOUTUBE_URL.captures(value) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
        YOUTUBE_ID.is_match(value).then(|| value.to_string())
    }

    fn embed_url(id: &str) -> String {
        format!("https://www.youtube.com/embed/{}", id)
    }
}

/// Vimeo embeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vimeo;

impl VideoProvider for Vimeo {
    const NAME: &'static str = "vimeo";

    fn video_id(value: &str) -> Option<String> {
        if let Some(caps) = VIMEO_URL.captures(value) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
        VIMEO_ID.is_match(value).then(|| value.to_string())
    }

    fn embed_url(id: &str) -> String {
        format!("https://player.vimeo.com/video/{}", id)
    }
}

/// `(youtube: url width: ... height: ... class: ...)` and the Vimeo
/// equivalent, rendered as `<figure class="video"><iframe ...></iframe></figure>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoTag<P>(std::marker::PhantomData<P>);

/// `(youtube: ...)`
pub type YoutubeTag = VideoTag<Youtube>;
/// `(vimeo: ...)`
pub type VimeoTag = VideoTag<Vimeo>;

impl<P> VideoTag<P> {
    /// Attribute keys understood by the tag.
    pub const ATTRIBUTES: &'static [&'static str] = &["width", "height", "class"];

    /// Create the handler.
    pub const fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<P: VideoProvider> TagHandler for VideoTag<P> {
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        let args = ctx.args(Self::ATTRIBUTES);
        let value = args.require_value()?;
        let id = P::video_id(value).ok_or_else(|| {
            TagError::message(format!("not a {} video URL or id: {:?}", P::NAME, value))
        })?;

        let class = match args.get("class") {
            Some(extra) => format!("video {}", extra),
            None => "video".to_string(),
        };

        let iframe = Element::new("iframe")
            .attr("src", P::embed_url(&id))
            .attr_opt("width", args.dimension("width")?.map(|w| w.to_string()))
            .attr_opt("height", args.dimension("height")?.map(|h| h.to_string()))
            .attr("frameborder", "0")
            .flag("allowfullscreen")
            .wrap("");

        Ok(Element::new("figure").attr("class", class).wrap(&iframe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_ids_from_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(Youtube::video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
        assert_eq!(Youtube::video_id("https://example.com/video"), None);
    }

    #[test]
    fn vimeo_ids_from_urls() {
        assert_eq!(Vimeo::video_id("https://vimeo.com/76979871").as_deref(), Some("76979871"));
        assert_eq!(
            Vimeo::video_id("https://player.vimeo.com/video/76979871").as_deref(),
            Some("76979871")
        );
        assert_eq!(Vimeo::video_id("76979871").as_deref(), Some("76979871"));
        assert_eq!(Vimeo::video_id("not-a-video"), None);
    }

    #[test]
    fn unknown_videos_explain_themselves() {
        let pipeline = crate::RenderPipeline::new("", tagtext_core::RenderOptions::plain());
        let err = pipeline
            .tag("vimeo", "https://example.com/clip", &Default::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Tag 'vimeo' failed: not a vimeo video URL or id: "https://example.com/clip""#
        );
    }
}
