//! Content catalog: stores documents by identity and resolves resource
//! identifiers relative to a referencing document.

use std::collections::BTreeMap;
use std::path::{Component as PathComponent, Path};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::document::{Document, DocumentId, Family, MediaType};
use crate::error::Error;
use crate::parser::ParseConfig;

/// Module that an identifier's empty module part (`component::page.adoc`) refers to.
const DEFAULT_MODULE: &str = "ROOT";

/// One version of a component and the parse config registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentVersion {
    pub asciidoc: Option<ParseConfig>,
    pub version: String,
}

/// A named component and its versions, latest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub versions: Vec<ComponentVersion>,
}

/// What resolution needs from a document store.
pub trait Catalog {
    /// Resolve a resource identifier as written in a link, relative to the
    /// referencing document. `None` when nothing matches.
    fn resolve(&self, identifier: &str, context: &DocumentId) -> Option<&Document>;

    /// Registered components and their versions.
    fn components(&self) -> &[Component];
}

/// Pick the parse config of the component version owning `id`, falling back
/// to the site-wide config.
pub fn parse_config_for<'a>(components: &'a [Component], id: &DocumentId, site: &'a ParseConfig) -> &'a ParseConfig {
    return components
        .iter()
        .filter(|c| return c.name == id.component)
        .flat_map(|c| return &c.versions)
        .find(|v| return v.version == id.version)
        .and_then(|v| return v.asciidoc.as_ref())
        .unwrap_or(site);
}

/// In-memory catalog keyed by document id.
#[derive(Debug, Default)]
pub struct ContentCatalog {
    components: Vec<Component>,
    documents: BTreeMap<DocumentId, Document>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Register a component version. Versions are kept in registration
    /// order; the first one registered is treated as the latest.
    /// Registering a known version again replaces its config in place.
    pub fn register_component_version(&mut self, name: &str, version: &str, asciidoc: Option<ParseConfig>) {
        let entry = ComponentVersion {
            asciidoc,
            version: version.to_string(),
        };
        if let Some(component) = self.components.iter_mut().find(|c| return c.name == name) {
            match component.versions.iter_mut().find(|v| return v.version == version) {
                Some(existing) => *existing = entry,
                None => component.versions.push(entry),
            }
            return;
        }
        self.components.push(Component {
            name: name.to_string(),
            versions: vec![entry],
        });
    }

    /// Add a document, replacing any document with the same id.
    pub fn add(&mut self, document: Document) {
        self.documents.insert(document.id().clone(), document);
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        return self.documents.get(id);
    }

    /// AsciiDoc pages in id order.
    pub fn pages(&self) -> impl Iterator<Item = &Document> {
        return self
            .documents
            .values()
            .filter(|d| return d.id().family == Family::Page && d.media_type() == MediaType::AsciiDoc);
    }

    pub fn len(&self) -> usize {
        return self.documents.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }

    /// A context for resolving identifiers typed by a user rather than
    /// written in a page: the first registered component's latest version,
    /// `ROOT` module.
    pub fn root_context(&self) -> Option<DocumentId> {
        let component = self.components.first()?;
        let version = component.versions.first()?;
        return Some(DocumentId::page(&component.name, &version.version, DEFAULT_MODULE, ""));
    }

    /// Turn `[version@][[component:]module:][family$]relative` into a full id,
    /// filling omitted parts from `context`.
    pub fn parse_identifier(&self, identifier: &str, context: &DocumentId) -> Option<DocumentId> {
        let (version, rest) = match identifier.split_once('@') {
            Some((version, rest)) => (Some(version), rest),
            None => (None, identifier),
        };

        let parts: Vec<&str> = rest.split(':').collect();
        let (component, module, path) = match parts.as_slice() {
            [path] => (None, None, *path),
            [module, path] => (None, Some(*module), *path),
            [component, module, path] => (Some(*component), Some(*module), *path),
            _ => return None,
        };

        let (family, relative) = match path.split_once('$') {
            Some((prefix, relative)) => (Family::from_prefix(prefix)?, relative),
            None => (Family::Page, path),
        };
        let relative = relative_to_context(relative, context)?;

        let component = component.unwrap_or(context.component.as_str());
        let version = match version {
            Some(version) => version.to_string(),
            None if component == context.component => context.version.clone(),
            None => self.latest_version(component)?,
        };
        let module = match module {
            Some("") => DEFAULT_MODULE,
            Some(module) => module,
            None if component == context.component => context.module.as_str(),
            None => DEFAULT_MODULE,
        };

        return Some(DocumentId {
            component: component.to_string(),
            family,
            module: module.to_string(),
            relative,
            version,
        });
    }

    fn latest_version(&self, component: &str) -> Option<String> {
        return self
            .components
            .iter()
            .find(|c| return c.name == component)
            .and_then(|c| return c.versions.first())
            .map(|v| return v.version.clone());
    }

    /// Load every component listed in `config` from disk.
    ///
    /// Each component directory holds `modules/<module>/<family dir>/...`.
    /// AsciiDoc and other text files keep their contents; binary files are
    /// registered without contents.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContentRootNotFound` if `root` does not exist, or
    /// `Error::Io` if a text file cannot be read.
    pub fn load(root: &Path, config: &Config) -> Result<Self, Error> {
        if !root.is_dir() {
            return Err(Error::ContentRootNotFound { path: root.to_path_buf() });
        }

        let mut catalog = Self::new();
        for component in config.components() {
            // Component attributes override site-wide ones.
            let asciidoc = component.asciidoc.as_ref().map(|own| {
                let mut merged = config.asciidoc().clone();
                merged.attributes.extend(own.attributes.clone());
                return merged;
            });
            catalog.register_component_version(&component.name, &component.version, asciidoc);

            let modules = root.join(&component.path).join("modules");
            if !modules.is_dir() {
                warn!(component = %component.name, path = %modules.display(), "component has no modules directory");
                continue;
            }

            for entry in WalkDir::new(&modules)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| return e.file_type().is_file())
            {
                let Some(id) = id_for_file(&modules, entry.path(), &component.name, &component.version) else {
                    continue;
                };
                let media_type = MediaType::for_path(entry.path());
                let source = match media_type {
                    MediaType::Binary => None,
                    MediaType::AsciiDoc | MediaType::Text => Some(std::fs::read_to_string(entry.path())?),
                };
                let display_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
                debug!(id = %id, "cataloged");
                catalog.add(Document::new(id, media_type, source).with_path(display_path));
            }
        }

        if catalog.is_empty() {
            warn!(root = %root.display(), "no documents found");
        } else {
            info!(documents = catalog.len(), "loaded content");
        }
        return Ok(catalog);
    }
}

impl Catalog for ContentCatalog {
    fn resolve(&self, identifier: &str, context: &DocumentId) -> Option<&Document> {
        let id = self.parse_identifier(identifier, context)?;
        return self.documents.get(&id);
    }

    fn components(&self) -> &[Component] {
        return &self.components;
    }
}

/// Resolve `./`-prefixed paths against the context's directory; anything else
/// is already relative to the family root. `None` for an empty path or one
/// that climbs above the family root.
fn relative_to_context(relative: &str, context: &DocumentId) -> Option<String> {
    if relative.is_empty() {
        return None;
    }
    let Some(rest) = relative.strip_prefix("./") else {
        return Some(relative.to_string());
    };

    let mut segments: Vec<&str> = context.relative.split('/').collect();
    segments.pop();
    for segment in rest.split('/') {
        match segment {
            "." | "" => {},
            ".." => {
                segments.pop()?;
            },
            other => segments.push(other),
        }
    }
    return Some(segments.join("/"));
}

/// Map a file under `modules/` to its id, or `None` for files outside a
/// known family directory.
fn id_for_file(modules: &Path, path: &Path, component: &str, version: &str) -> Option<DocumentId> {
    let relative = path.strip_prefix(modules).ok()?;
    let mut parts = relative.components().filter_map(|c| {
        return match c {
            PathComponent::Normal(part) => part.to_str(),
            _ => None,
        };
    });

    let module = parts.next()?;
    let family = Family::from_dir(parts.next()?)?;
    let relative: Vec<&str> = parts.collect();
    if relative.is_empty() {
        return None;
    }

    return Some(DocumentId {
        component: component.to_string(),
        family,
        module: module.to_string(),
        relative: relative.join("/"),
        version: version.to_string(),
    });
}
