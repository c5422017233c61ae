//! Stages that run after tag expansion and code-block extraction.
//!
//! - `markdown`: the markdown collaborator and its markdown-rs default.
//! - `smartypants`: smart punctuation transformations (quotes, dashes, ellipsis).
//! - `images`: single-image paragraph unwrapping.

/// Single-image paragraph unwrapping.
pub mod images;
/// Markdown to HTML collaborator.
pub mod markdown;
/// Smart punctuation transformations (quotes, dashes, ellipsis).
pub mod smartypants;

pub use images::unwrap_images;
pub use markdown::{CommonMark, MarkdownRenderer};
pub use smartypants::{SmartyPants, Typographer, apply_smartypants};
