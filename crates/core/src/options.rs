//! Render options.

use serde::{Deserialize, Serialize};

/// Default nesting limit for tags rendering other tags.
pub const DEFAULT_MAX_TAG_DEPTH: usize = 16;

/// Options controlling which pipeline stages run.
///
/// Absent keys fall back to their defaults when deserialized, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Run the markdown renderer after tag expansion.
    pub markdown: bool,
    /// Run smart punctuation over the rendered HTML.
    pub smartypants: bool,
    /// Strip the `<p>` the markdown renderer puts around a lone image.
    pub unwrap_images: bool,
    /// How deep tags may nest through `tag()` before rendering stops.
    pub max_tag_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            markdown: true,
            smartypants: true,
            unwrap_images: false,
            max_tag_depth: DEFAULT_MAX_TAG_DEPTH,
        }
    }
}

impl RenderOptions {
    /// Options with every text transformation disabled: only tags and code
    /// blocks are expanded.
    pub const fn plain() -> Self {
        Self {
            markdown: false,
            smartypants: false,
            unwrap_images: false,
            max_tag_depth: DEFAULT_MAX_TAG_DEPTH,
        }
    }

    /// Toggle the markdown stage.
    pub fn markdown(mut self, enabled: bool) -> Self {
        self.markdown = enabled;
        self
    }

    /// Toggle smart punctuation.
    pub fn smartypants(mut self, enabled: bool) -> Self {
        self.smartypants = enabled;
        self
    }

    /// Toggle unwrapping of lone images.
    pub fn unwrap_images(mut self, enabled: bool) -> Self {
        self.unwrap_images = enabled;
        self
    }

    /// Set the tag nesting limit.
    pub fn max_tag_depth(mut self, depth: usize) -> Self {
        self.max_tag_depth = depth;
        self
    }

    /// Legacy form where a single flag only switched markdown on or off.
    ///
    /// Smart punctuation keeps its default.
    #[deprecated(since = "0.0.1", note = "Use RenderOptions::default().markdown(flag) instead")]
    pub fn from_markdown_flag(markdown: bool) -> Self {
        Self::default().markdown(markdown)
    }
}

#[allow(deprecated)]
impl From<bool> for RenderOptions {
    fn from(markdown: bool) -> Self {
        Self::from_markdown_flag(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_markdown_and_smartypants() {
        let options = RenderOptions::default();
        assert!(options.markdown);
        assert!(options.smartypants);
        assert!(!options.unwrap_images);
        assert_eq!(options.max_tag_depth, DEFAULT_MAX_TAG_DEPTH);
    }

    #[test]
    #[allow(deprecated)]
    fn bare_flag_only_sets_markdown() {
        let options: RenderOptions = false.into();
        assert!(!options.markdown);
        assert!(options.smartypants);
        assert_eq!(RenderOptions::from_markdown_flag(true), RenderOptions::default());
    }

    #[test]
    fn deserializes_partial_records() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"smartypants": false, "unwrapImages": true}"#).unwrap();
        assert!(options.markdown);
        assert!(!options.smartypants);
        assert!(options.unwrap_images);
        assert_eq!(options.max_tag_depth, DEFAULT_MAX_TAG_DEPTH);
    }

    #[test]
    fn plain_disables_text_stages() {
        let options = RenderOptions::plain();
        assert!(!options.markdown && !options.smartypants && !options.unwrap_images);
    }
}
