//! Built-in tag handlers and the helpers they share.
//!
//! Every built-in uses the `(name: value key: value ...)` grammar from
//! [`TagArgs`] and builds its markup with [`Element`], which escapes attribute
//! values.

/// Shared argument grammar.
pub mod args;
/// `(email: ...)`
pub mod email;
/// `(file: ...)`
pub mod file;
/// `(image: ...)`
pub mod image;
/// `(link: ...)`
pub mod link;
/// Template tags loaded from plugin files.
pub mod template;
/// `(twitter: ...)`
pub mod twitter;
/// `(youtube: ...)` and `(vimeo: ...)`
pub mod video;

pub use args::TagArgs;
pub use email::EmailTag;
pub use file::FileTag;
pub use image::ImageTag;
pub use link::LinkTag;
pub use template::TemplateTag;
pub use twitter::TwitterTag;
pub use video::{VideoTag, VimeoTag, YoutubeTag};

/// Minimal HTML element builder.
///
/// Attributes keep insertion order; values are escaped for double-quoted
/// attribute context. Inner content is written as given.
#[derive(Debug, Clone)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, Option<String>)>,
}

impl Element {
    /// Start an element.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        let value = html_escape::encode_double_quoted_attribute(value.as_ref()).into_owned();
        self.attributes.push((key, Some(value)));
        self
    }

    /// Add an attribute when a value is present.
    pub fn attr_opt(self, key: &'static str, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// Add a valueless attribute such as `allowfullscreen`.
    pub fn flag(mut self, key: &'static str) -> Self {
        self.attributes.push((key, None));
        self
    }

    fn open(&self) -> String {
        let mut out = format!("<{}", self.name);
        for (key, value) in &self.attributes {
            match value {
                Some(value) => out.push_str(&format!(" {}=\"{}\"", key, value)),
                None => {
                    out.push(' ');
                    out.push_str(key);
                }
            }
        }
        out
    }

    /// Render as a self-closing element: `<img src="..." />`.
    pub fn void(&self) -> String {
        format!("{} />", self.open())
    }

    /// Render with `inner` as content.
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}>{}</{}>", self.open(), inner, self.name)
    }
}

/// Escape text content.
pub(crate) fn text(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_escapes_attribute_values() {
        let html = Element::new("a")
            .attr("href", "/x?a=1&b=\"2\"")
            .attr_opt("title", None::<&str>)
            .attr_opt("class", Some("btn"))
            .wrap("go");
        assert_eq!(html, r#"<a href="/x?a=1&amp;b=&quot;2&quot;" class="btn">go</a>"#);
    }

    #[test]
    fn void_elements_self_close() {
        assert_eq!(
            Element::new("img").attr("src", "a.png").attr("alt", "").void(),
            r#"<img src="a.png" alt="" />"#
        );
    }

    #[test]
    fn flags_have_no_value() {
        assert_eq!(
            Element::new("iframe").attr("src", "x").flag("allowfullscreen").wrap(""),
            r#"<iframe src="x" allowfullscreen></iframe>"#
        );
    }
}
