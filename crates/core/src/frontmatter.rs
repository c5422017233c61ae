use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::source::{Page, SourceText};

/// A document split into its YAML frontmatter and markup body.
#[derive(Debug)]
pub struct Document<'a> {
    /// Frontmatter mapping, `None` when the document has no `---` block.
    pub frontmatter: Option<JsonValue>,
    /// Markup that follows the frontmatter block.
    pub body: &'a str,
}

impl Document<'_> {
    /// Page context described by the frontmatter, if any.
    pub fn page(&self) -> Option<Page> {
        self.frontmatter.as_ref().map(Page::from_frontmatter)
    }

    /// Convert into a source text that carries the frontmatter page.
    pub fn into_source(self) -> SourceText {
        match self.page() {
            Some(page) => SourceText::with_page(self.body, page),
            None => SourceText::new(self.body),
        }
    }
}

/// Errors emitted while splitting frontmatter from a document.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits a leading `---` YAML block from the document body.
///
/// Leading blank lines and a byte order mark are skipped before the opening
/// fence. A document without an opening fence is returned unchanged.
pub fn split_document(input: &str) -> Result<Document<'_>, FrontmatterError> {
    let content = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut lines = LineCursor::new(content);
    let opening = loop {
        match lines.next() {
            Some((line, _)) if line.trim().is_empty() => continue,
            Some((line, next)) if is_fence(line) => break next,
            _ => {
                return Ok(Document {
                    frontmatter: None,
                    body: input,
                });
            }
        }
    };

    let mut block_end = opening;
    for (line, next) in lines {
        if is_fence(line) {
            let block = content[opening..block_end].trim_end_matches(['\r', '\n']);
            return Ok(Document {
                frontmatter: Some(parse_block(block)?),
                body: &content[next..],
            });
        }
        block_end = next;
    }

    Err(FrontmatterError::Unterminated)
}

fn parse_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    match serde_json::to_value(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))? {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        value @ JsonValue::Object(_) => Ok(value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

/// Yields each line with the byte offset where the following line starts.
struct LineCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        let (line, advance) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        Some((line, self.pos))
    }
}
