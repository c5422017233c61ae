//! Single-image paragraph unwrapping.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static WRAPPED_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>(<img[^>]*/>)</p>").unwrap());

/// Replace paragraphs holding nothing but one self-closing `<img />` with the
/// bare image element.
pub fn unwrap_images(html: &str) -> Cow<'_, str> {
    WRAPPED_IMAGE.replace_all(html, "$1")
}
