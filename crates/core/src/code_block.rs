//! Triple-backtick code blocks.
//!
//! Fences are matched non-greedily across lines, so a block closes at the
//! first ```` ``` ```` after its opener. The first line inside the fence is the
//! info string (usually a language), the remainder is the body.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());

/// Language hint passed to the highlighter when a fence has no info string.
pub const DEFAULT_LANGUAGE: &str = "markup";

/// One fenced block, split into its info string and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// First line inside the fence, trimmed.
    pub info: String,
    /// Remaining lines, trimmed.
    pub body: String,
}

impl CodeBlock {
    /// Split the text between the fences.
    pub fn parse(inner: &str) -> Self {
        let (first, rest) = inner.split_once('\n').unwrap_or((inner, ""));
        Self {
            info: first.trim().to_string(),
            body: rest.trim().to_string(),
        }
    }

    /// Language hint for highlighting.
    pub fn language(&self) -> &str {
        if self.info.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            &self.info
        }
    }
}

/// Optional syntax highlighting capability.
///
/// Implementations return HTML that is already escaped. Newlines in text
/// content are kept as `&#10;`; newlines inside tag markup become spaces.
pub trait Highlighter: Send + Sync {
    /// Highlight `code` written in `language`.
    fn highlight(&self, code: &str, language: &str) -> String;
}

impl<F> Highlighter for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn highlight(&self, code: &str, language: &str) -> String {
        (self)(code, language)
    }
}

/// Byte ranges of every fenced block in `text`, in order.
pub fn fence_spans(text: &str) -> Vec<Range<usize>> {
    FENCE_PATTERN.find_iter(text).map(|m| m.range()).collect()
}

/// Renders fenced blocks as `<figure class="code">` fragments.
#[derive(Clone, Default)]
pub struct CodeBlockExtractor {
    highlighter: Option<Arc<dyn Highlighter>>,
}

impl std::fmt::Debug for CodeBlockExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBlockExtractor")
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl CodeBlockExtractor {
    /// Extractor that escapes code without highlighting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `highlighter` for every block.
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    /// Replace every fenced block in `text` with its rendered figure.
    pub fn extract<'a>(&self, text: &'a str) -> Cow<'a, str> {
        FENCE_PATTERN.replace_all(text, |caps: &Captures<'_>| {
            self.render(&CodeBlock::parse(&caps[1]))
        })
    }

    /// Render one block.
    ///
    /// The figure is emitted on a single line (newlines become `&#10;`) so the
    /// markdown stage keeps it as one raw HTML block.
    pub fn render(&self, block: &CodeBlock) -> String {
        let info = html_escape::encode_double_quoted_attribute(&block.info);
        let (class, code) = match &self.highlighter {
            Some(highlighter) => {
                let class = if info.is_empty() {
                    "highlight".to_string()
                } else {
                    format!("highlight {}", info)
                };
                let html = highlighter.highlight(&block.body, block.language());
                (class, fold_newlines(&html))
            }
            None => (
                info.into_owned(),
                html_escape::encode_quoted_attribute(&block.body).replace('\n', "&#10;"),
            ),
        };

        format!(
            r#"<figure class="code"><pre class="{}"><code>{}</code></pre></figure>"#,
            class, code
        )
    }
}

/// Put highlighted HTML on one line: text newlines become `&#10;`, newlines
/// within a tag become spaces.
fn fold_newlines(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '\n' if in_tag => {
                out.push(' ');
                continue;
            }
            '\n' => {
                out.push_str("&#10;");
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}
