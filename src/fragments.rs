//! Per-document fragment index: anchor name to the text a link to it shows.
//!
//! Computed on first use and cached on the target `Document`. The document
//! currently being walked reuses its own in-progress anchors; any other
//! target is re-parsed with resolution suppressed, so the nested load's own
//! processors do not try to resolve links while the outer walk is in flight.

use tracing::debug;

use crate::document::Document;
use crate::pipeline::{Loader, RunContext};
use crate::tree::Anchors;
use crate::types::{FragmentEntry, FragmentIndex, Severity, SourceLocation};

/// The document whose tree is being walked.
pub struct Current<'a> {
    pub anchors: &'a Anchors,
    pub document: &'a Document,
}

/// Fragment index of `target`, computing and caching it on first use.
///
/// `None` only when the target cannot be parsed; a target without anchors
/// yields an empty index. A parse failure is reported as a warning at
/// `location` and nothing is cached.
pub fn fragment_index<'t>(
    target: &'t Document,
    current: &Current<'_>,
    loader: &dyn Loader,
    cx: &mut RunContext,
    location: &SourceLocation,
) -> Option<&'t FragmentIndex> {
    if let Some(index) = target.fragments() {
        return Some(index);
    }

    if target.id() == current.document.id() {
        debug!(id = %target.id(), "indexing fragments from the tree in progress");
        return Some(target.cache_fragments(index_anchors(current.anchors)));
    }

    debug!(id = %target.id(), "parsing xref target to index its fragments");
    let config = loader.config_for(target.id());
    match cx.suspended(|cx| loader.load(target, config, cx)) {
        Ok(tree) => Some(target.cache_fragments(index_anchors(&tree.anchors))),
        Err(e) => {
            cx.diagnostics_mut().report(
                location,
                Severity::Warn,
                format!("xref target could not be parsed: {}: {e}", target.id().relative),
            );
            None
        },
    }
}

/// One entry per anchor; the text is the reftext, else the title, else empty.
pub fn index_anchors(anchors: &Anchors) -> FragmentIndex {
    anchors
        .iter()
        .map(|(name, anchor)| {
            let entry = FragmentEntry {
                location: anchor.location.clone(),
                name: name.clone(),
                text: anchor.display_text(),
            };
            (name.clone(), entry)
        })
        .collect()
}
