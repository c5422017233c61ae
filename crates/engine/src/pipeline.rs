//! The render pipeline.
//!
//! Stages run in a fixed order, each feeding the next:
//!
//! 1. inline tag expansion (fail-open: unusable tags stay literal text);
//! 2. fenced code block extraction;
//! 3. markdown, when enabled;
//! 4. smart punctuation, when enabled;
//! 5. single-image paragraph unwrapping, when enabled.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tagtext_core::{
    CodeBlockExtractor, Diagnostic, Diagnostics, Highlighter, InlineTagScanner, Page,
    PageResolver, RenderOptions, SourceText, TagInvocation, TagtextError, is_valid_tag_name,
    split_document,
};

use crate::handler::{Attributes, TagContext, TagInput};
use crate::registry::TagRegistry;
use crate::transform::{CommonMark, MarkdownRenderer, SmartyPants, Typographer, unwrap_images};

/// Output of [`RenderPipeline::render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The rendered HTML.
    pub html: String,
    /// Tags that were left as literal text.
    pub diagnostics: Diagnostics,
}

/// Renders one source text.
///
/// A pipeline is cheap to build and meant for a single document. Handlers
/// receive it by shared reference and may call [`tag`](Self::tag) or
/// [`expand_tags`](Self::expand_tags) on it; nesting is bounded by
/// [`RenderOptions::max_tag_depth`].
///
/// ```
/// use tagtext_core::RenderOptions;
/// use tagtext_engine::RenderPipeline;
///
/// let html = RenderPipeline::new("(email: hi@example.com)", RenderOptions::plain())
///     .get()
///     .unwrap();
/// assert_eq!(html, r#"<a href="mailto:hi@example.com">hi@example.com</a>"#);
/// ```
pub struct RenderPipeline {
    text: String,
    file: Option<String>,
    page: Option<Arc<Page>>,
    options: RenderOptions,
    registry: Arc<TagRegistry>,
    code_blocks: CodeBlockExtractor,
    markdown: Box<dyn MarkdownRenderer>,
    typographer: Box<dyn Typographer>,
    page_resolver: Option<Arc<dyn PageResolver>>,
    depth: Cell<usize>,
    diagnostics: RefCell<Diagnostics>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("text_len", &self.text.len())
            .field("file", &self.file)
            .field("page", &self.page)
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("code_blocks", &self.code_blocks)
            .field("page_resolver", &self.page_resolver.is_some())
            .finish()
    }
}

impl RenderPipeline {
    /// Pipeline over `source` with the built-in tags and default collaborators.
    ///
    /// A page wrapped into the source becomes the current page.
    pub fn new(source: impl Into<SourceText>, options: impl Into<RenderOptions>) -> Self {
        let (text, page) = source.into().into_parts();
        Self {
            text,
            file: None,
            page,
            options: options.into(),
            registry: Arc::new(TagRegistry::new()),
            code_blocks: CodeBlockExtractor::new(),
            markdown: Box::new(CommonMark::default()),
            typographer: Box::new(SmartyPants),
            page_resolver: None,
            depth: Cell::new(0),
            diagnostics: RefCell::new(Diagnostics::new()),
        }
    }

    /// Pipeline over the document stored at `path`.
    ///
    /// YAML frontmatter becomes the current page, and diagnostics for tags in
    /// the document carry the path.
    pub fn open(
        path: impl AsRef<Path>,
        options: impl Into<RenderOptions>,
    ) -> Result<Self, TagtextError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let document = split_document(&text)?;
        let mut pipeline = Self::new(document.into_source(), options);
        pipeline.file = Some(path.display().to_string());
        Ok(pipeline)
    }

    /// Resolve tags through `registry`.
    pub fn with_registry(mut self, registry: impl Into<Arc<TagRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Highlight fenced code with `highlighter`.
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.code_blocks = self.code_blocks.with_highlighter(highlighter);
        self
    }

    /// Replace the markdown renderer.
    pub fn with_markdown(mut self, markdown: impl MarkdownRenderer + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    /// Replace the typographer.
    pub fn with_typographer(mut self, typographer: impl Typographer + 'static) -> Self {
        self.typographer = Box::new(typographer);
        self
    }

    /// Fall back to `resolver` when no page was set.
    pub fn with_page_resolver(mut self, resolver: impl PageResolver + 'static) -> Self {
        self.page_resolver = Some(Arc::new(resolver));
        self
    }

    /// The current page: the one set on this pipeline, else whatever the
    /// page resolver reports.
    pub fn page(&self) -> Option<Arc<Page>> {
        self.page.clone().or_else(|| {
            self.page_resolver
                .as_ref()
                .and_then(|resolver| resolver.active_page())
        })
    }

    /// Replace the current page and return it.
    pub fn set_page(&mut self, page: impl Into<Arc<Page>>) -> Arc<Page> {
        let page = page.into();
        self.page = Some(Arc::clone(&page));
        page
    }

    /// Run every stage and return the HTML.
    pub fn get(&self) -> Result<String, TagtextError> {
        self.run()
    }

    /// Run every stage and return the HTML together with the tags that were
    /// left as text.
    pub fn render(&self) -> Result<Rendered, TagtextError> {
        let html = self.run()?;
        Ok(Rendered {
            html,
            diagnostics: self.diagnostics.take(),
        })
    }

    fn run(&self) -> Result<String, TagtextError> {
        self.diagnostics.take();

        let expanded = self.expand_tags(&self.text);
        let mut html = self.code_blocks.extract(&expanded).into_owned();

        if self.options.markdown {
            html = self.markdown.render(&html)?;
        }
        if self.options.smartypants {
            html = self.typographer.apply(&html);
        }
        if self.options.unwrap_images {
            html = unwrap_images(&html).into_owned();
        }
        Ok(html)
    }

    /// Render one tag programmatically.
    ///
    /// The name is matched case-insensitively. Unlike scanned tags, failures
    /// are returned instead of falling back to text.
    pub fn tag(
        &self,
        name: &str,
        value: &str,
        attributes: &Attributes,
    ) -> Result<String, TagtextError> {
        let name = name.to_ascii_lowercase();
        if !is_valid_tag_name(&name) {
            return Err(TagtextError::InvalidTagName { name });
        }
        self.invoke(&name, TagInput::Direct { value, attributes })
    }

    /// Expand the inline tags in `text`, leaving everything else untouched.
    ///
    /// Tags that cannot be rendered stay as written and are recorded as
    /// diagnostics of the current pass.
    pub fn expand_tags(&self, text: &str) -> String {
        InlineTagScanner::expand(text, |invocation| {
            self.expand_invocation(text, invocation, invocation.raw)
                .unwrap_or_else(|| invocation.raw.to_string())
        })
        .into_owned()
    }

    /// Expand the inline tags in `text`, rewriting the source before it is
    /// used.
    ///
    /// Each tag literal goes through `fill_tag` before its handler parses it.
    /// Text between tags, and the literal of a tag that cannot be rendered,
    /// go through `fill_text`. Rendered tag output is never rewritten.
    pub fn expand_tags_with<T, L>(&self, text: &str, fill_tag: T, fill_text: L) -> String
    where
        T: Fn(&str) -> String,
        L: Fn(&str) -> String,
    {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for invocation in InlineTagScanner::scan(text) {
            out.push_str(&fill_text(&text[last..invocation.span.start]));
            let raw = fill_tag(invocation.raw);
            match self.expand_invocation(text, &invocation, &raw) {
                Some(html) => out.push_str(&html),
                None => out.push_str(&fill_text(invocation.raw)),
            }
            last = invocation.span.end;
        }
        out.push_str(&fill_text(&text[last..]));
        out
    }

    fn expand_invocation(
        &self,
        text: &str,
        invocation: &TagInvocation<'_>,
        raw: &str,
    ) -> Option<String> {
        match self.invoke(&invocation.name, TagInput::Scanned { raw }) {
            Ok(html) => Some(html),
            Err(err) => {
                let mut location = invocation.location(text);
                // Nested expansions scan handler output, not the document.
                if let (Some(file), 0) = (&self.file, self.depth.get()) {
                    location = location.with_file(file.as_str());
                }
                match &err {
                    TagtextError::UnknownTag { .. } => {
                        log::debug!("{}: no handler for tag '{}'", location, invocation.name)
                    }
                    _ => log::warn!("{}: {}", location, err),
                }
                self.diagnostics.borrow_mut().push(Diagnostic::from_error(
                    &invocation.name,
                    &err,
                    location,
                ));
                None
            }
        }
    }

    /// Resolve and run the handler for `name`.
    pub fn invoke(&self, name: &str, input: TagInput<'_>) -> Result<String, TagtextError> {
        let handler = self.registry.resolve_checked(name)?;

        let limit = self.options.max_tag_depth;
        let _guard = DepthGuard::enter(&self.depth, limit).ok_or_else(|| {
            TagtextError::RecursionLimit {
                name: name.to_string(),
                limit,
            }
        })?;

        let ctx = TagContext::new(name, input, self);
        handler
            .render(&ctx)
            .map_err(|source| TagtextError::TagFailed {
                name: name.to_string(),
                source,
            })
    }
}

/// Counts one level of tag nesting for as long as it is alive.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>, limit: usize) -> Option<Self> {
        let current = depth.get();
        if current >= limit {
            return None;
        }
        depth.set(current + 1);
        Some(Self { depth })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
