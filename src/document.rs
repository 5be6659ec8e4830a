//! Documents as the catalog stores them, and the fragment cache they carry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;

use crate::types::FragmentIndex;

/// Which family directory a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Attachment,
    Example,
    Image,
    Page,
    Partial,
}

impl Family {
    /// Map a directory name under a module (`pages`, `images`, ...) to its family.
    pub fn from_dir(dir: &str) -> Option<Self> {
        return match dir {
            "attachments" => Some(Self::Attachment),
            "examples" => Some(Self::Example),
            "images" => Some(Self::Image),
            "pages" => Some(Self::Page),
            "partials" => Some(Self::Partial),
            _ => None,
        };
    }

    /// Map a `family$` identifier prefix to its family.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        return match prefix {
            "attachment" => Some(Self::Attachment),
            "example" => Some(Self::Example),
            "image" => Some(Self::Image),
            "page" => Some(Self::Page),
            "partial" => Some(Self::Partial),
            _ => None,
        };
    }

    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Attachment => "attachment",
            Self::Example => "example",
            Self::Image => "image",
            Self::Page => "page",
            Self::Partial => "partial",
        };
    }
}

/// Composite identity of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId {
    pub component: String,
    pub family: Family,
    pub module: String,
    /// Path relative to the family directory, `/`-separated.
    pub relative: String,
    pub version: String,
}

impl DocumentId {
    /// A page id.
    pub fn page(component: &str, version: &str, module: &str, relative: &str) -> Self {
        return Self {
            component: component.to_string(),
            family: Family::Page,
            module: module.to_string(),
            relative: relative.to_string(),
            version: version.to_string(),
        };
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(
            f,
            "{}@{}:{}:{}${}",
            self.version,
            self.component,
            self.module,
            self.family.as_str(),
            self.relative
        );
    }
}

/// Content type of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// `text/asciidoc`: parseable into a tree.
    AsciiDoc,
    /// Binary content such as images; never loaded as text.
    Binary,
    /// Other text (source files, config) kept as raw contents.
    Text,
}

impl MediaType {
    /// Guess the media type from a file extension.
    pub fn for_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");
        return match ext.to_ascii_lowercase().as_str() {
            "adoc" | "asciidoc" => Self::AsciiDoc,
            "c" | "conf" | "cpp" | "css" | "csv" | "go" | "html" | "java" | "js" | "json" | "kt"
            | "md" | "properties" | "py" | "rb" | "rs" | "sh" | "toml" | "ts" | "txt" | "xml"
            | "yaml" | "yml" => Self::Text,
            _ => Self::Binary,
        };
    }

    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::AsciiDoc => "text/asciidoc",
            Self::Binary => "application/octet-stream",
            Self::Text => "text/plain",
        };
    }
}

/// A stored resource. The fragment cache is the only part that changes after
/// construction, and it is written at most once.
#[derive(Debug)]
pub struct Document {
    fragments: OnceLock<FragmentIndex>,
    id: DocumentId,
    media_type: MediaType,
    /// File the source was read from, used in diagnostics.
    path: PathBuf,
    source: Option<String>,
}

impl Document {
    /// Create a document. Its path defaults to the id's relative path.
    pub fn new(id: DocumentId, media_type: MediaType, source: Option<String>) -> Self {
        let path = PathBuf::from(&id.relative);
        return Self {
            fragments: OnceLock::new(),
            id,
            media_type,
            path,
            source,
        };
    }

    /// Shorthand for an AsciiDoc page with the given source.
    pub fn page(id: DocumentId, source: &str) -> Self {
        return Self::new(id, MediaType::AsciiDoc, Some(source.to_string()));
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        return self;
    }

    pub const fn id(&self) -> &DocumentId {
        return &self.id;
    }

    pub const fn media_type(&self) -> MediaType {
        return self.media_type;
    }

    pub fn path(&self) -> &Path {
        return &self.path;
    }

    pub fn source(&self) -> Option<&str> {
        return self.source.as_deref();
    }

    /// Whether links can point into this document: AsciiDoc, or anything
    /// whose raw contents were kept.
    pub const fn is_text_bearing(&self) -> bool {
        return matches!(self.media_type, MediaType::AsciiDoc) || self.source.is_some();
    }

    /// The cached fragment index, if it has been computed.
    pub fn fragments(&self) -> Option<&FragmentIndex> {
        return self.fragments.get();
    }

    /// Store the fragment index unless one is already present, and return
    /// whichever one is cached. An existing index is never replaced.
    pub fn cache_fragments(&self, index: FragmentIndex) -> &FragmentIndex {
        return self.fragments.get_or_init(|| return index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FragmentEntry, SourceLocation};

    fn entry(name: &str, text: &str) -> FragmentIndex {
        let mut index = FragmentIndex::new();
        index.insert(
            name.to_string(),
            FragmentEntry {
                location: SourceLocation::new("target.adoc", 3),
                name: name.to_string(),
                text: text.to_string(),
            },
        );
        index
    }

    #[test]
    fn fragment_cache_is_written_once() {
        let doc = Document::page(DocumentId::page("test", "1.0", "ROOT", "target.adoc"), "= Target");
        assert!(doc.fragments().is_none());

        doc.cache_fragments(entry("frag", "Fragment"));
        let second = doc.cache_fragments(entry("frag", "Changed"));

        assert_eq!(second["frag"].text, "Fragment");
    }

    #[test]
    fn empty_index_is_present() {
        let doc = Document::page(DocumentId::page("test", "1.0", "ROOT", "plain.adoc"), "text");
        doc.cache_fragments(FragmentIndex::new());
        assert!(doc.fragments().is_some_and(FragmentIndex::is_empty));
    }

    #[test]
    fn binary_without_source_is_not_text_bearing() {
        let id = DocumentId {
            family: Family::Image,
            ..DocumentId::page("test", "1.0", "ROOT", "logo.png")
        };
        let image = Document::new(id, MediaType::for_path(Path::new("logo.png")), None);
        assert!(!image.is_text_bearing());

        let id = DocumentId {
            family: Family::Example,
            ..DocumentId::page("test", "1.0", "ROOT", "app.yml")
        };
        let text = Document::new(id, MediaType::Text, Some("key: value".to_string()));
        assert!(text.is_text_bearing());
    }

    #[test]
    fn id_display_is_fully_qualified() {
        let id = DocumentId::page("test", "1.0", "ROOT", "dir/target.adoc");
        assert_eq!(id.to_string(), "1.0@test:ROOT:page$dir/target.adoc");
    }
}
