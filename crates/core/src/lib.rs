#![deny(missing_docs)]
//! tagtext core: source text, render options, inline tag scanning and code blocks.

/// Triple-backtick code block extraction and rendering.
pub mod code_block;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter splitting into page context.
pub mod frontmatter;
/// Render options.
pub mod options;
/// Inline tag scanning.
pub mod scanner;
/// Source text and page context.
pub mod source;

pub use code_block::{CodeBlock, CodeBlockExtractor, DEFAULT_LANGUAGE, Highlighter, fence_spans};
pub use error::{Diagnostic, Diagnostics, SourceLocation, TagError, TagtextError};
pub use frontmatter::{Document, FrontmatterError, split_document};
pub use options::{DEFAULT_MAX_TAG_DEPTH, RenderOptions};
pub use scanner::{InlineTagScanner, TagInvocation, is_valid_tag_name, payload_of};
pub use source::{Page, PageResolver, SourceText, is_absolute_url};
