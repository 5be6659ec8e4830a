use tracing::debug;

use crate::catalog::Catalog;
use crate::document::{Document, DocumentId};

/// Resolve a link target to a document that links can point into.
///
/// Identifier syntax and matching are the catalog's business. A match that is
/// not text-bearing (an image, say) is treated exactly like no match.
pub fn resolve_target<'c>(catalog: &'c dyn Catalog, target: &str, context: &DocumentId) -> Option<&'c Document> {
    let Some(document) = catalog.resolve(target, context) else {
        debug!(reference = target, context = %context, "xref target not in catalog");
        return None;
    };
    if !document.is_text_bearing() {
        debug!(reference = target, id = %document.id(), media_type = document.media_type().as_str(), "xref target is not text");
        return None;
    }
    Some(document)
}
