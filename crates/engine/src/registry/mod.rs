//! Tag name resolution.
//!
//! A [`TagRegistry`] walks ranked providers: override providers first, in the
//! order they were added, then the host map filled by
//! [`TagRegistry::register`], then the built-in tags. The first provider that
//! knows the name wins. Nothing is cached between lookups, so a template file
//! dropped into a tag directory is picked up by the next render.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tagtext_core::{TagtextError, is_valid_tag_name};

use crate::handler::TagHandler;
use crate::tags::TemplateTag;

/// Default registrations.
pub mod defaults;

pub use defaults::{builtin_tag_names, builtin_tags};

/// Creates a fresh handler for every invocation.
pub type TagFactory = Arc<dyn Fn() -> Box<dyn TagHandler> + Send + Sync>;

/// A source of tag handlers.
pub trait TagProvider: Send + Sync {
    /// Handler for `name`, `Ok(None)` when this provider does not have one.
    fn lookup(&self, name: &str) -> Result<Option<Box<dyn TagHandler>>, TagtextError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Name to factory map for handlers compiled into the host.
#[derive(Clone, Default)]
pub struct MapProvider {
    factories: BTreeMap<String, TagFactory>,
}

impl fmt::Debug for MapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapProvider")
            .field("tags", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MapProvider {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one for `name`.
    pub fn insert(&mut self, name: impl Into<String>, factory: TagFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Register a handler value; each invocation gets a clone.
    pub fn insert_handler<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: TagHandler + Clone + Send + Sync + 'static,
    {
        self.insert(
            name,
            Arc::new(move || Box::new(handler.clone()) as Box<dyn TagHandler>),
        );
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl TagProvider for MapProvider {
    fn lookup(&self, name: &str) -> Result<Option<Box<dyn TagHandler>>, TagtextError> {
        Ok(self.factories.get(name).map(|factory| factory()))
    }

    fn describe(&self) -> String {
        format!("map ({} tags)", self.len())
    }
}

/// A directory of template tag files.
///
/// `<name>.html` or an extensionless `<name>` file declares the tag `<name>`.
/// The directory is probed on every lookup.
#[derive(Debug, Clone)]
pub struct TagDirectory {
    root: PathBuf,
}

impl TagDirectory {
    /// Provider reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        [
            self.root.join(format!("{}.html", name)),
            self.root.join(name),
        ]
    }
}

impl TagProvider for TagDirectory {
    fn lookup(&self, name: &str) -> Result<Option<Box<dyn TagHandler>>, TagtextError> {
        // Names are joined into a path; only plain identifiers get that far.
        if !is_valid_tag_name(name) {
            return Ok(None);
        }

        for path in self.candidates(name) {
            if !path.is_file() {
                continue;
            }
            let template = std::fs::read_to_string(&path)
                .map_err(|source| TagtextError::PluginLoad { path, source })?;
            return Ok(Some(Box::new(TemplateTag::new(template))));
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Resolves tag names to handlers.
pub struct TagRegistry {
    overrides: Vec<Box<dyn TagProvider>>,
    host: MapProvider,
    builtin: MapProvider,
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field(
                "overrides",
                &self.overrides.iter().map(|p| p.describe()).collect::<Vec<_>>(),
            )
            .field("host", &self.host)
            .field("builtin", &self.builtin)
            .finish()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRegistry {
    /// Registry with the built-in tags and no overrides.
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            host: MapProvider::new(),
            builtin: builtin_tags(),
        }
    }

    /// Registry without any tags.
    pub fn empty() -> Self {
        Self {
            overrides: Vec::new(),
            host: MapProvider::new(),
            builtin: MapProvider::new(),
        }
    }

    /// Add an override provider, ranked after those already added.
    pub fn with_override(mut self, provider: impl TagProvider + 'static) -> Self {
        self.overrides.push(Box::new(provider));
        self
    }

    /// Add a template directory as an override provider.
    pub fn with_tag_dir(self, root: impl Into<PathBuf>) -> Self {
        self.with_override(TagDirectory::new(root))
    }

    /// Register a host handler value.
    pub fn with_tag<H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: TagHandler + Clone + Send + Sync + 'static,
    {
        self.host.insert_handler(name, handler);
        self
    }

    /// Register a host handler factory.
    pub fn with_tag_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn TagHandler> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Register a host handler factory in place.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn TagHandler> + Send + Sync + 'static,
    {
        self.host.insert(name, Arc::new(factory));
    }

    /// Handler for `name`, or `None` when no provider has one.
    ///
    /// Provider errors are logged and skipped.
    pub fn resolve(&self, name: &str) -> Option<Box<dyn TagHandler>> {
        if !is_valid_tag_name(name) {
            return None;
        }

        let providers = self
            .overrides
            .iter()
            .map(|p| p.as_ref() as &dyn TagProvider)
            .chain([&self.host as &dyn TagProvider, &self.builtin]);

        for provider in providers {
            match provider.lookup(name) {
                Ok(Some(handler)) => {
                    log::trace!("tag '{}' resolved by {}", name, provider.describe());
                    return Some(handler);
                }
                Ok(None) => {}
                Err(err) => log::warn!("skipping {} for tag '{}': {}", provider.describe(), name, err),
            }
        }
        None
    }

    /// Like [`resolve`](Self::resolve), with the reason for a miss.
    pub fn resolve_checked(&self, name: &str) -> Result<Box<dyn TagHandler>, TagtextError> {
        if !is_valid_tag_name(name) {
            return Err(TagtextError::InvalidTagName {
                name: name.to_string(),
            });
        }
        self.resolve(name)
            .ok_or_else(|| TagtextError::unknown_tag(name))
    }

    /// Whether any provider has a handler for `name`.
    pub fn has_tag(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}
