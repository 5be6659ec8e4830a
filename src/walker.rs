//! Depth-first traversal applying a line rewriter to every text-bearing node.

use crate::tree::{Block, Node};
use crate::types::SourceLocation;

/// Produces the replacement for one line of node text.
pub trait LineRewriter {
    /// Rewrite `line`, which starts at `location`.
    fn rewrite(&mut self, location: &SourceLocation, line: &str) -> String;
}

/// Visit `node` and everything below it in document order, replacing the
/// text of paragraphs, admonitions, table cells and list items in place.
pub fn walk<R: LineRewriter + ?Sized>(node: &mut Node, rewriter: &mut R) {
    match &mut node.block {
        Block::Paragraph { lines } | Block::Admonition { lines, .. } => {
            for (offset, line) in lines.iter_mut().enumerate() {
                *line = rewriter.rewrite(&node.location.advanced(offset), line);
            }
        },
        Block::Table { head, body, foot } => {
            for cell in head.iter_mut().chain(body.iter_mut()).chain(foot.iter_mut()).flatten() {
                walk(cell, rewriter);
            }
        },
        Block::TableCell { text } | Block::ListItem { text } => {
            *text = rewriter.rewrite(&node.location, text);
        },
        Block::Container | Block::List | Block::Listing { .. } | Block::Section { .. } => {},
    }

    for child in &mut node.children {
        walk(child, rewriter);
    }
}
