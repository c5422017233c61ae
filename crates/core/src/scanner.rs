//! Inline tag scanning.
//!
//! A tag is a parenthesized run that starts with an alphanumeric name and a
//! colon: `(link: https://example.com text: Example)`. The payload runs up to
//! the next `)` on the same line. Two kinds of matches are left alone:
//!
//! - matches right after `]`, which are Markdown link targets such as
//!   `[mail me](mailto:me@example.com)`;
//! - matches inside a triple-backtick fence, so code bodies stay verbatim.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::code_block::fence_spans;
use crate::error::SourceLocation;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([a-zA-Z0-9]+):.*?\)").unwrap());

/// Whether `name` is a valid tag identifier (`[a-z0-9]+`).
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// One inline tag occurrence found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInvocation<'a> {
    /// Lowercased tag name.
    pub name: String,
    /// The full matched literal, parentheses included.
    pub raw: &'a str,
    /// Byte range of `raw` inside the scanned text.
    pub span: Range<usize>,
    /// 1-indexed line of the opening parenthesis.
    pub line: usize,
}

impl<'a> TagInvocation<'a> {
    /// Everything after the colon, without the closing parenthesis.
    pub fn payload(&self) -> &'a str {
        payload_of(self.raw)
    }

    /// Line and column of the opening parenthesis in `text`.
    pub fn location(&self, text: &str) -> SourceLocation {
        SourceLocation::from_offset(text, self.span.start)
    }
}

/// Extract the payload of a raw tag literal: the text between the first colon
/// and the closing parenthesis.
pub fn payload_of(raw: &str) -> &str {
    let inner = raw.strip_prefix('(').unwrap_or(raw);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    inner.split_once(':').map_or(inner, |(_, rest)| rest)
}

/// Finds inline tags and substitutes rendered fragments for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTagScanner;

impl InlineTagScanner {
    /// Every tag invocation in `text`, in order of appearance.
    pub fn scan(text: &str) -> Vec<TagInvocation<'_>> {
        let fences = fence_spans(text);
        let (mut counted_to, mut line) = (0, 1);
        TAG_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                if text[..whole.start()].ends_with(']') {
                    return None;
                }
                if fences
                    .iter()
                    .any(|fence| fence.start < whole.end() && whole.start() < fence.end)
                {
                    return None;
                }
                line += text[counted_to..whole.start()].matches('\n').count();
                counted_to = whole.start();
                Some(TagInvocation {
                    name: name.as_str().to_ascii_lowercase(),
                    raw: whole.as_str(),
                    span: whole.range(),
                    line,
                })
            })
            .collect()
    }

    /// Replace each invocation with the output of `render`.
    ///
    /// `render` decides what a tag becomes; returning `invocation.raw`
    /// keeps the literal. Text without tags is returned borrowed.
    pub fn expand<'a, F>(text: &'a str, mut render: F) -> Cow<'a, str>
    where
        F: FnMut(&TagInvocation<'a>) -> String,
    {
        let invocations = Self::scan(text);
        if invocations.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for invocation in &invocations {
            out.push_str(&text[last..invocation.span.start]);
            out.push_str(&render(invocation));
            last = invocation.span.end;
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }
}
