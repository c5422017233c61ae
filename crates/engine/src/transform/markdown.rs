//! Markdown to HTML collaborator.

use markdown::message::{Message, Place};
use tagtext_core::{SourceLocation, TagtextError};

/// Converts markdown to HTML.
///
/// Implementations must pass raw HTML through untouched: expanded tags and
/// code figures reach this stage as HTML.
pub trait MarkdownRenderer {
    /// Render `input` to HTML.
    fn render(&self, input: &str) -> Result<String, TagtextError>;
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> Result<String, TagtextError>,
{
    fn render(&self, input: &str) -> Result<String, TagtextError> {
        (self)(input)
    }
}

/// Default renderer backed by markdown-rs.
///
/// CommonMark with raw HTML allowed. GFM tables, strikethrough, footnotes and
/// task lists are on when `gfm` is set; literal autolinks stay off so URLs
/// inside tag output are not rewrapped.
#[derive(Debug, Clone, Copy)]
pub struct CommonMark {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
}

impl Default for CommonMark {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl CommonMark {
    /// Plain CommonMark, no GFM extensions.
    pub const fn strict() -> Self {
        Self { gfm: false }
    }

    /// Convert to markdown-rs options.
    pub fn to_options(self) -> markdown::Options {
        let mut constructs = markdown::Constructs::default();
        if self.gfm {
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::Options {
            parse: markdown::ParseOptions {
                constructs,
                ..markdown::ParseOptions::default()
            },
            compile: markdown::CompileOptions {
                allow_dangerous_html: true,
                allow_dangerous_protocol: true,
                ..markdown::CompileOptions::default()
            },
        }
    }
}

impl MarkdownRenderer for CommonMark {
    fn render(&self, input: &str) -> Result<String, TagtextError> {
        markdown::to_html_with_options(input, &self.to_options()).map_err(|err| {
            let location = message_location(&err);
            TagtextError::markdown(err.to_string(), location.line, location.column)
        })
    }
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(input: &str) -> String {
        CommonMark::default().render(input).unwrap()
    }

    #[test]
    fn renders_paragraphs_and_emphasis() {
        assert_eq!(html("Hello *world*"), "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn keeps_raw_html_blocks() {
        let out = html("<figure class=\"video\"><iframe src=\"https://x\"></iframe></figure>");
        assert!(out.contains("<iframe src=\"https://x\"></iframe>"));
    }

    #[test]
    fn keeps_inline_html() {
        assert_eq!(
            html("See <a href=\"/x\">x</a> now"),
            "<p>See <a href=\"/x\">x</a> now</p>"
        );
    }

    #[test]
    fn gfm_strikethrough_is_optional() {
        assert!(html("~~gone~~").contains("<del>gone</del>"));
        let strict = CommonMark::strict().render("~~gone~~").unwrap();
        assert!(!strict.contains("<del>"));
    }

    #[test]
    fn bare_urls_are_not_autolinked() {
        assert_eq!(html("https://example.com"), "<p>https://example.com</p>");
    }

    #[test]
    fn closures_are_renderers() {
        let upper = |s: &str| -> Result<String, TagtextError> { Ok(s.to_uppercase()) };
        assert_eq!(upper.render("abc").unwrap(), "ABC");
    }
}
