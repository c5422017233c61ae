#![deny(missing_docs)]
//! tagtext engine: render pipeline, tag registry and built-in tags.

/// Tag handler contract.
pub mod handler;
/// The render pipeline.
pub mod pipeline;
/// Tag providers and name resolution.
pub mod registry;
/// Built-in tags.
pub mod tags;
/// Markdown, typography and cleanup stages.
pub mod transform;

pub use handler::{Attributes, TagContext, TagHandler, TagInput};
pub use pipeline::{RenderPipeline, Rendered};
pub use registry::{MapProvider, TagDirectory, TagFactory, TagProvider, TagRegistry};
pub use tags::{TagArgs, TemplateTag};
pub use transform::{CommonMark, MarkdownRenderer, SmartyPants, Typographer};

/// Render `text` with the built-in tags and default collaborators.
///
/// ```
/// let html = tagtext_engine::render("Read the *docs*", Default::default()).unwrap();
/// assert_eq!(html, "<p>Read the <em>docs</em></p>");
/// ```
pub fn render(
    text: impl Into<tagtext_core::SourceText>,
    options: tagtext_core::RenderOptions,
) -> Result<String, tagtext_core::TagtextError> {
    RenderPipeline::new(text, options).get()
}
