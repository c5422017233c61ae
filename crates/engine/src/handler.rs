//! The contract every tag implementation satisfies.

use std::collections::BTreeMap;
use std::sync::Arc;

use tagtext_core::{Page, TagError, payload_of};

use crate::pipeline::RenderPipeline;
use crate::tags::TagArgs;

/// Attribute mapping passed to programmatic tag invocations.
pub type Attributes = BTreeMap<String, String>;

/// What a handler was invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagInput<'a> {
    /// Found in the text; `raw` is the full literal, parentheses included.
    Scanned {
        /// The matched literal
        raw: &'a str,
    },
    /// Called through [`RenderPipeline::tag`] with structured data.
    Direct {
        /// Main value
        value: &'a str,
        /// Named attributes
        attributes: &'a Attributes,
    },
}

/// Everything a handler gets for one invocation.
///
/// The pipeline is borrowed, not owned: handlers may call back into it to
/// render nested tags or to read the current page.
pub struct TagContext<'a> {
    name: &'a str,
    input: TagInput<'a>,
    pipeline: &'a RenderPipeline,
}

impl<'a> TagContext<'a> {
    /// Create a context for one invocation.
    pub fn new(name: &'a str, input: TagInput<'a>, pipeline: &'a RenderPipeline) -> Self {
        Self {
            name,
            input,
            pipeline,
        }
    }

    /// Tag name being rendered.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw or structured input.
    pub fn input(&self) -> TagInput<'a> {
        self.input
    }

    /// The literal text of a scanned invocation.
    pub fn raw(&self) -> Option<&'a str> {
        match self.input {
            TagInput::Scanned { raw } => Some(raw),
            TagInput::Direct { .. } => None,
        }
    }

    /// The pipeline this invocation runs in.
    pub fn pipeline(&self) -> &'a RenderPipeline {
        self.pipeline
    }

    /// Current page context of the pipeline.
    pub fn page(&self) -> Option<Arc<Page>> {
        self.pipeline.page()
    }

    /// Resolve `target` against the current page URL, if there is a page.
    pub fn resolve_url(&self, target: &str) -> String {
        match self.page() {
            Some(page) => page.resolve_url(target),
            None => target.to_string(),
        }
    }

    /// Value and attributes using the shared `name: value key: value` grammar.
    ///
    /// Scanned input is split on the given attribute `keys`; direct input is
    /// taken as-is. Both produce the same [`TagArgs`] for the same content.
    pub fn args(&self, keys: &[&str]) -> TagArgs {
        match self.input {
            TagInput::Scanned { raw } => TagArgs::parse(payload_of(raw), keys),
            TagInput::Direct { value, attributes } => TagArgs::from_parts(value, attributes),
        }
    }
}

/// Renders one tag name to an HTML fragment.
///
/// A handler instance is created for every invocation and dropped afterwards,
/// so implementations carry no state between invocations. Handlers should
/// return an error for input they cannot use; the pipeline then keeps the
/// original literal in the output.
pub trait TagHandler {
    /// Produce the HTML fragment for this invocation.
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError>;
}

impl<F> TagHandler for F
where
    F: Fn(&TagContext<'_>) -> Result<String, TagError>,
{
    fn render(&self, ctx: &TagContext<'_>) -> Result<String, TagError> {
        (self)(ctx)
    }
}
