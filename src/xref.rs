//! The xref tree processor: validates `xref:target#fragment[text]` links
//! against the anchors of their targets and fills in missing link text.

use tracing::debug;

use crate::config::XrefConfig;
use crate::document::Document;
use crate::error::Error;
use crate::fragments::{Current, fragment_index};
use crate::pipeline::{Loader, RunContext, TreeProcessor};
use crate::resolver::resolve_target;
use crate::scanner::{LinkMatch, replace_links};
use crate::stub::{StubPolicy, stub_link};
use crate::tree::{Anchors, Tree};
use crate::types::{Severity, SourceLocation};
use crate::walker::{LineRewriter, walk};

/// Rewrites the links of every document it processes.
#[derive(Debug, Clone, Default)]
pub struct XrefProcessor {
    log_unnecessary_link_text: bool,
    stubs: StubPolicy,
}

impl XrefProcessor {
    /// Build the processor from its config.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStubPattern` if a stub pattern does not compile.
    pub fn new(config: &XrefConfig) -> Result<Self, Error> {
        Ok(Self {
            log_unnecessary_link_text: config.log_unnecessary_link_text_warnings,
            stubs: StubPolicy::compile(&config.stub)?,
        })
    }
}

impl TreeProcessor for XrefProcessor {
    fn process(&self, document: &Document, tree: &mut Tree, loader: &dyn Loader, cx: &mut RunContext) {
        if cx.is_suppressed() {
            debug!(id = %document.id(), "xref resolution suppressed during nested load");
            return;
        }

        let Tree { anchors, root, .. } = tree;
        let mut scope = XrefScope {
            anchors,
            cx,
            document,
            loader,
            processor: self,
        };
        walk(root, &mut scope);
    }
}

/// Everything the rewriter needs while walking one document.
struct XrefScope<'a> {
    /// Anchors of the tree being walked, for self-references.
    anchors: &'a Anchors,
    cx: &'a mut RunContext,
    document: &'a Document,
    loader: &'a dyn Loader,
    processor: &'a XrefProcessor,
}

impl LineRewriter for XrefScope<'_> {
    fn rewrite(&mut self, location: &SourceLocation, line: &str) -> String {
        replace_links(line, |link| self.rewrite_link(location, link))
    }
}

impl XrefScope<'_> {
    /// Decide the replacement for one link; `None` leaves it as written.
    fn rewrite_link(&mut self, location: &SourceLocation, link: &LinkMatch<'_>) -> Option<String> {
        let reference = link.to_reference();
        let target = resolve_target(self.loader.catalog(), &reference.target, self.document.id());

        let Some(fragment) = reference.fragment.as_deref() else {
            // Document-level links are left to downstream resolution.
            return match target {
                Some(_) => None,
                None => self.stub(link),
            };
        };

        let current = Current {
            anchors: self.anchors,
            document: self.document,
        };
        let index = target.and_then(|t| fragment_index(t, &current, self.loader, self.cx, location));
        let entry = index.and_then(|index| index.get(fragment));

        let Some(entry) = entry else {
            if let Some(stubbed) = self.stub(link) {
                return Some(stubbed);
            }
            if index.is_some() {
                self.cx.diagnostics_mut().report(
                    location,
                    Severity::Error,
                    format!("target fragment of xref not found: {}", reference.qualified()),
                );
            }
            return None;
        };

        let qualified = reference.qualified();
        if self.processor.log_unnecessary_link_text && !reference.text.is_empty() && reference.text == entry.text {
            self.cx.diagnostics_mut().report(
                location,
                Severity::Warn,
                format!("unnecessary xref link text: {qualified}[{}]", reference.text),
            );
        }

        let text = if reference.text.is_empty() {
            entry.text.as_str()
        } else {
            reference.text.as_str()
        };
        if text.is_empty() {
            self.cx.diagnostics_mut().report(
                location,
                Severity::Warn,
                format!("target has no reftext: {qualified}"),
            );
        }

        Some(format!("xref:{qualified}[{text}]"))
    }

    /// Placeholder link if a stub pattern matches the raw reference.
    fn stub(&self, link: &LinkMatch<'_>) -> Option<String> {
        if !self.processor.stubs.matches(link.reference) {
            return None;
        }
        debug!(reference = link.reference, "stubbing unresolved xref");
        Some(stub_link(&self.document.id().relative, link.reference, link.text))
    }
}
