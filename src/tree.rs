//! The parsed node tree of one document and the anchors declared in it.

use std::collections::BTreeMap;

use crate::types::SourceLocation;

/// One row of table cells.
pub type Row = Vec<Node>;

/// Kind-specific payload of a node. Text-bearing kinds own their raw text;
/// the walker rewrites it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `NOTE:` paragraph or `[NOTE]` block. Block form has no lines, only children.
    Admonition {
        /// `NOTE`, `TIP`, `IMPORTANT`, `WARNING` or `CAUTION`.
        label: String,
        /// Raw source lines.
        lines: Vec<String>,
    },
    /// Delimited example, sidebar or open block, and the document root.
    Container,
    /// A list item, or a term or description of a description list.
    ListItem {
        /// Raw item text; continuation lines are joined with `\n`.
        text: String,
    },
    /// Ordered, unordered or description list. Items are children.
    List,
    /// Listing or literal block. Never rewritten.
    Listing {
        /// Raw verbatim lines.
        lines: Vec<String>,
    },
    /// Plain paragraph.
    Paragraph {
        /// Raw source lines.
        lines: Vec<String>,
    },
    /// Section heading; the body blocks are children.
    Section {
        /// Heading level, 1 for `==`.
        level: usize,
    },
    /// Table with its three row groups.
    Table {
        /// Body rows.
        body: Vec<Row>,
        /// Footer rows.
        foot: Vec<Row>,
        /// Header rows.
        head: Vec<Row>,
    },
    /// One table cell.
    TableCell {
        /// Raw cell text.
        text: String,
    },
}

/// Element of a document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub block: Block,
    pub children: Vec<Node>,
    /// Block anchor id, if one was declared or generated.
    pub id: Option<String>,
    pub location: SourceLocation,
    /// Section title or `.Title` block title.
    pub title: Option<String>,
}

impl Node {
    pub fn new(block: Block, location: SourceLocation) -> Self {
        return Self {
            block,
            children: Vec::new(),
            id: None,
            location,
            title: None,
        };
    }

    /// Append the text of every text-bearing node below (and including) this
    /// one, in document order, paired with its source line.
    pub fn collect_text<'a>(&'a self, out: &mut Vec<(u32, &'a str)>) {
        match &self.block {
            Block::Paragraph { lines } | Block::Admonition { lines, .. } => {
                for (offset, line) in lines.iter().enumerate() {
                    out.push((self.location.advanced(offset).line, line.as_str()));
                }
            },
            Block::Table { head, body, foot } => {
                for cell in head.iter().chain(body).chain(foot).flatten() {
                    cell.collect_text(out);
                }
            },
            Block::TableCell { text } | Block::ListItem { text } => {
                out.push((self.location.line, text.as_str()));
            },
            Block::Container | Block::List | Block::Listing { .. } | Block::Section { .. } => {},
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// An addressable point in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub location: SourceLocation,
    /// Alternate link text declared with the anchor (`[[id,reftext]]`).
    pub reftext: Option<String>,
    /// Title of the anchored block; `None` for inline anchors.
    pub title: Option<String>,
}

impl Anchor {
    /// The text a link to this anchor shows by default.
    pub fn display_text(&self) -> String {
        return self
            .reftext
            .clone()
            .or_else(|| return self.title.clone())
            .unwrap_or_default();
    }
}

/// Anchor id to anchor, unique per document.
pub type Anchors = BTreeMap<String, Anchor>;

/// A parsed document: its node tree plus the anchor catalog built while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub anchors: Anchors,
    pub root: Node,
    /// Document title from the `= Title` header line.
    pub title: Option<String>,
}

impl Tree {
    /// Every text-bearing line in document order with its source line.
    pub fn text(&self) -> Vec<(u32, &str)> {
        let mut out = Vec::new();
        self.root.collect_text(&mut out);
        return out;
    }
}
