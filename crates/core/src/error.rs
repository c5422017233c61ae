use std::path::PathBuf;

use thiserror::Error;

use crate::frontmatter::FrontmatterError;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attach the file the location points into.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Location of a byte offset inside `text`.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let before = &text[..offset.min(text.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        let column = before[line_start..].chars().count() + 1;
        Self::new(line, column)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while rendering tagtext.
#[derive(Debug, Error)]
pub enum TagtextError {
    /// IO error while reading a source document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// No provider knows a tag with this name.
    #[error("Unknown tag: {name}")]
    UnknownTag {
        /// Tag name
        name: String,
    },
    /// Tag names are restricted to lowercase ASCII letters and digits.
    #[error("Invalid tag name: {name:?}")]
    InvalidTagName {
        /// Offending name
        name: String,
    },
    /// Nested tag rendering went deeper than the configured limit.
    #[error("Tag recursion limit ({limit}) exceeded while rendering '{name}'")]
    RecursionLimit {
        /// Tag that would have exceeded the limit
        name: String,
        /// Configured maximum depth
        limit: usize,
    },
    /// A handler was found but returned an error.
    #[error("Tag '{name}' failed: {source}")]
    TagFailed {
        /// Tag name
        name: String,
        /// Handler error
        #[source]
        source: TagError,
    },
    /// A plugin file exists but could not be read.
    #[error("Failed to load tag plugin {}: {source}", path.display())]
    PluginLoad {
        /// Plugin file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The markdown collaborator rejected the document.
    #[error("Markdown error at {location}: {message}")]
    Markdown {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Frontmatter could not be split from a source document.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
}

impl TagtextError {
    /// Create an unknown tag error
    pub fn unknown_tag(name: impl Into<String>) -> Self {
        Self::UnknownTag { name: name.into() }
    }

    /// Create a markdown error with location
    pub fn markdown(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Markdown {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

/// Errors raised by a tag handler while rendering its fragment.
#[derive(Debug, Error)]
pub enum TagError {
    /// The tag needs a main value but none was given.
    #[error("missing value")]
    MissingValue,
    /// An attribute carries a value the handler cannot use.
    #[error("invalid value for '{attribute}': {value:?}")]
    InvalidAttribute {
        /// Attribute name
        attribute: String,
        /// Rejected value
        value: String,
    },
    /// Free-form handler failure.
    #[error("{0}")]
    Message(String),
    /// A nested `tag()` call made by the handler failed.
    #[error(transparent)]
    Nested(Box<TagtextError>),
}

impl TagError {
    /// Create a free-form handler error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<TagtextError> for TagError {
    fn from(err: TagtextError) -> Self {
        Self::Nested(Box::new(err))
    }
}

/// A tag that was left as literal text, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No provider had a handler for the tag name.
    UnresolvedTag {
        /// Tag name
        name: String,
        /// Where the tag was scanned
        location: SourceLocation,
    },
    /// The handler returned an error.
    TagFailed {
        /// Tag name
        name: String,
        /// Rendered error message
        message: String,
        /// Where the tag was scanned
        location: SourceLocation,
    },
    /// Rendering the tag would exceed the nesting limit.
    RecursionLimit {
        /// Tag name
        name: String,
        /// Configured maximum depth
        limit: usize,
        /// Where the tag was scanned
        location: SourceLocation,
    },
}

impl Diagnostic {
    /// Build a diagnostic from the error that made a scanned tag fall back to text.
    pub fn from_error(name: &str, err: &TagtextError, location: SourceLocation) -> Self {
        match err {
            TagtextError::UnknownTag { .. } | TagtextError::InvalidTagName { .. } => {
                Diagnostic::UnresolvedTag {
                    name: name.to_string(),
                    location,
                }
            }
            TagtextError::RecursionLimit { limit, .. } => Diagnostic::RecursionLimit {
                name: name.to_string(),
                limit: *limit,
                location,
            },
            TagtextError::TagFailed { source, .. } => Diagnostic::TagFailed {
                name: name.to_string(),
                message: source.to_string(),
                location,
            },
            other => Diagnostic::TagFailed {
                name: name.to_string(),
                message: other.to_string(),
                location,
            },
        }
    }

    /// Tag name this diagnostic refers to
    pub fn name(&self) -> &str {
        match self {
            Diagnostic::UnresolvedTag { name, .. }
            | Diagnostic::TagFailed { name, .. }
            | Diagnostic::RecursionLimit { name, .. } => name,
        }
    }

    /// Get the location of this diagnostic
    pub fn location(&self) -> &SourceLocation {
        match self {
            Diagnostic::UnresolvedTag { location, .. }
            | Diagnostic::TagFailed { location, .. }
            | Diagnostic::RecursionLimit { location, .. } => location,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnresolvedTag { name, location } => {
                write!(f, "{}: unknown tag '{}' left as text", location, name)
            }
            Diagnostic::TagFailed {
                name,
                message,
                location,
            } => write!(f, "{}: tag '{}' failed: {}", location, name, message),
            Diagnostic::RecursionLimit {
                name,
                limit,
                location,
            } => write!(
                f,
                "{}: tag '{}' exceeds the nesting limit of {}",
                location, name, limit
            ),
        }
    }
}

/// Tags that fell back to literal text during one render.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Iterate over recorded diagnostics in scan order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Names of tags nobody could resolve
    pub fn unresolved_tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::UnresolvedTag { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether any handler failed or hit the nesting limit
    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|d| !matches!(d, Diagnostic::UnresolvedTag { .. }))
    }

    /// Check if there are any diagnostics
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
