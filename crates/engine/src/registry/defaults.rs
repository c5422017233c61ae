//! Built-in tag registrations.
//!
//! These are the tags every registry falls back to when no override provider
//! or host registration claims a name.

use super::MapProvider;
use crate::tags::{EmailTag, FileTag, ImageTag, LinkTag, TwitterTag, VimeoTag, YoutubeTag};

/// Creates the provider holding the built-in tags.
///
/// # Example
///
/// ```
/// use tagtext_engine::registry::defaults::builtin_tags;
///
/// let builtin = builtin_tags();
/// assert!(builtin.contains("link"));
/// assert!(builtin.contains("youtube"));
/// ```
pub fn builtin_tags() -> MapProvider {
    let mut provider = MapProvider::new();
    provider.insert_handler("link", LinkTag);
    provider.insert_handler("email", EmailTag);
    provider.insert_handler("image", ImageTag);
    provider.insert_handler("file", FileTag);
    provider.insert_handler("twitter", TwitterTag);
    provider.insert_handler("youtube", YoutubeTag::new());
    provider.insert_handler("vimeo", VimeoTag::new());
    provider
}

/// Returns the names of the built-in tags.
pub fn builtin_tag_names() -> &'static [&'static str] {
    &["email", "file", "image", "link", "twitter", "vimeo", "youtube"]
}
