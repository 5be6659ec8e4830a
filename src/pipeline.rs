//! Conversion pipeline: parse a document, then run the registered tree
//! processors over the result.

use tracing::{debug, info};

use crate::catalog::{Catalog, parse_config_for};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::{Document, DocumentId};
use crate::error::Error;
use crate::parser::{DocumentParser, ParseConfig};
use crate::tree::Tree;
use crate::types::{Severity, SourceLocation};

/// State of one document's processing, passed explicitly down the call chain.
#[derive(Debug, Default)]
pub struct RunContext {
    diagnostics: Diagnostics,
    /// Set while a nested load is in flight; processors must not resolve
    /// references while it is.
    suppress_resolution: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_suppressed(&self) -> bool {
        self.suppress_resolution
    }

    /// Run `f` with resolution suppressed, restoring the previous state after.
    pub fn suspended<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.suppress_resolution, true);
        let out = f(self);
        self.suppress_resolution = previous;
        out
    }

    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub const fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

/// Loads documents into processed trees. Processors use it to inspect other
/// documents while processing the current one.
pub trait Loader {
    fn catalog(&self) -> &dyn Catalog;

    /// Parse config of the component version that owns `id`.
    fn config_for(&self, id: &DocumentId) -> &ParseConfig;

    /// Parse `document` under `config` and run every processor on the tree.
    ///
    /// # Errors
    ///
    /// Returns the parser's error if the document cannot be parsed.
    fn load(&self, document: &Document, config: &ParseConfig, cx: &mut RunContext) -> Result<Tree, Error>;
}

/// A pass over a freshly parsed tree.
pub trait TreeProcessor {
    fn process(&self, document: &Document, tree: &mut Tree, loader: &dyn Loader, cx: &mut RunContext);
}

/// The outcome of converting one document.
#[derive(Debug)]
pub struct Converted {
    pub diagnostics: Vec<Diagnostic>,
    pub id: DocumentId,
    /// `None` if the document failed to parse.
    pub tree: Option<Tree>,
}

/// Parses documents from a catalog and runs processors over them.
pub struct Converter<'a, P> {
    catalog: &'a dyn Catalog,
    parser: P,
    processors: Vec<Box<dyn TreeProcessor + 'a>>,
    site: ParseConfig,
}

impl<'a, P: DocumentParser> Converter<'a, P> {
    pub fn new(catalog: &'a dyn Catalog, parser: P, site: ParseConfig) -> Self {
        Self {
            catalog,
            parser,
            processors: Vec::new(),
            site,
        }
    }

    /// Register a processor; processors run in registration order.
    #[must_use]
    pub fn with_processor(mut self, processor: impl TreeProcessor + 'a) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Convert one document with a fresh run context.
    pub fn convert(&self, document: &Document) -> Converted {
        let mut cx = RunContext::new();
        let config = self.config_for(document.id());
        let tree = match self.load(document, config, &mut cx) {
            Ok(tree) => Some(tree),
            Err(e) => {
                cx.diagnostics_mut()
                    .report(&SourceLocation::new(document.path(), 1), Severity::Error, e.to_string());
                None
            },
        };
        Converted {
            diagnostics: cx.into_diagnostics().into_entries(),
            id: document.id().clone(),
            tree,
        }
    }

    /// Convert each document in turn, one walk completing before the next starts.
    pub fn convert_all<'d>(&self, documents: impl IntoIterator<Item = &'d Document>) -> Vec<Converted> {
        let converted: Vec<Converted> = documents.into_iter().map(|d| self.convert(d)).collect();
        info!(documents = converted.len(), "converted");
        converted
    }
}

impl<P: DocumentParser> Loader for Converter<'_, P> {
    fn catalog(&self) -> &dyn Catalog {
        self.catalog
    }

    fn config_for(&self, id: &DocumentId) -> &ParseConfig {
        parse_config_for(self.catalog.components(), id, &self.site)
    }

    fn load(&self, document: &Document, config: &ParseConfig, cx: &mut RunContext) -> Result<Tree, Error> {
        debug!(id = %document.id(), nested = cx.is_suppressed(), "loading");
        let mut tree = self.parser.parse(document, self.catalog, config)?;
        for processor in &self.processors {
            processor.process(document, &mut tree, self, cx);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn suspended_restores_previous_state() {
        let mut cx = RunContext::new();
        assert!(!cx.is_suppressed());
        let inner = cx.suspended(|cx| {
            let nested = cx.suspended(|cx| cx.is_suppressed());
            (nested, cx.is_suppressed())
        });
        assert_eq!(inner, (true, true));
        assert!(!cx.is_suppressed());
    }

    /// Counts the invocations it sees while suppressed and while not.
    struct Probe<'c> {
        active: &'c Cell<u32>,
        suppressed: &'c Cell<u32>,
    }

    impl TreeProcessor for Probe<'_> {
        fn process(&self, document: &Document, _tree: &mut Tree, loader: &dyn Loader, cx: &mut RunContext) {
            if cx.is_suppressed() {
                self.suppressed.set(self.suppressed.get() + 1);
                return;
            }
            self.active.set(self.active.get() + 1);
            let config = loader.config_for(document.id());
            let nested = cx.suspended(|cx| loader.load(document, config, cx));
            assert!(nested.is_ok());
        }
    }

    #[test]
    fn nested_load_sees_suppressed_context() {
        use crate::asciidoc::AsciiDocParser;
        use crate::catalog::ContentCatalog;

        let mut catalog = ContentCatalog::new();
        catalog.register_component_version("test", "1.0", None);
        catalog.add(Document::page(DocumentId::page("test", "1.0", "ROOT", "a.adoc"), "= A\n\ntext\n"));

        let active = Cell::new(0);
        let suppressed = Cell::new(0);
        let converter = Converter::new(&catalog, AsciiDocParser, ParseConfig::default()).with_processor(Probe {
            active: &active,
            suppressed: &suppressed,
        });

        let converted = converter.convert_all(catalog.pages());
        assert_eq!(converted.len(), 1);
        assert!(converted[0].tree.is_some());
        assert_eq!(active.get(), 1);
        assert_eq!(suppressed.get(), 1);
    }

    #[test]
    fn parse_failure_becomes_a_diagnostic() {
        use crate::asciidoc::AsciiDocParser;
        use crate::catalog::ContentCatalog;
        use crate::document::MediaType;

        let mut catalog = ContentCatalog::new();
        catalog.register_component_version("test", "1.0", None);
        let id = DocumentId::page("test", "1.0", "ROOT", "empty.adoc");
        catalog.add(Document::new(id.clone(), MediaType::AsciiDoc, None));

        let converter = Converter::new(&catalog, AsciiDocParser, ParseConfig::default());
        let document = catalog.get(&id).unwrap();
        let converted = converter.convert(document);

        assert!(converted.tree.is_none());
        assert_eq!(converted.diagnostics.len(), 1);
        assert_eq!(converted.diagnostics[0].severity, Severity::Error);
    }
}
