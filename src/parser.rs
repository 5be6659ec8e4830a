//! The seam to whatever turns stored source into a node tree.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::document::Document;
use crate::error::Error;
use crate::tree::Tree;

/// Options that influence parsing, either site-wide or per component version.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ParseConfig {
    /// Attributes available to `{name}` references. These win over
    /// attribute entries declared inside a document.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ParseConfig {
    /// Convenience for tests and callers that build configs in code.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        return self;
    }
}

/// Parses a document's stored source into a fresh tree.
///
/// Implementations must be re-entrant: the fragment index builder calls
/// `parse` for another document while a walk of the current one is in flight.
pub trait DocumentParser {
    /// Parse `document` under `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the document has no source or cannot
    /// be parsed.
    fn parse(&self, document: &Document, catalog: &dyn Catalog, config: &ParseConfig) -> Result<Tree, Error>;
}
