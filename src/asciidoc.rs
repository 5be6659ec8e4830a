//! A line-oriented parser for the AsciiDoc subset that pages use: a header
//! with attribute entries, sections, paragraphs, admonitions, lists, tables,
//! delimited blocks and anchors.
//!
//! It builds just enough structure for links to be found and rewritten in
//! place and for every anchor to be catalogued with its title and reftext.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::document::Document;
use crate::error::Error;
use crate::parser::{DocumentParser, ParseConfig};
use crate::tree::{Anchor, Anchors, Block, Node, Row, Tree};
use crate::types::SourceLocation;

static ATTRIBUTE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([\w-]+)(!?):(?:\s+(.*))?$").expect("valid regex"));

/// `[[id]]` or `[[id,reftext]]` alone on a line.
static BLOCK_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\[([A-Za-z_:][\w:.-]*)(?:,\s*(.+?))?\]\]$").expect("valid regex"));

static INLINE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([A-Za-z_:][\w:.-]*)(?:,\s*([^\]]*?))?\]\]").expect("valid regex"));

/// `anchor:id[reftext]` inline macro.
static ANCHOR_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"anchor:([A-Za-z_:][\w:.-]*)\[([^\]]*)\]").expect("valid regex"));

static ATTRIBUTE_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([^\[\]]*)\]$").expect("valid regex"));

static BLOCK_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.([^.\s].*)$").expect("valid regex"));

static SECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(={2,6})\s+(\S.*)$").expect("valid regex"));

static ADMONITION_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(NOTE|TIP|IMPORTANT|WARNING|CAUTION):\s+(.*)$").expect("valid regex"));

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\*{1,5}|-|\.{1,5})\s+(\S.*)$").expect("valid regex"));

/// `term::` followed by whitespace or the end of the line.
static DLIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S.*?[^:\s]|[^:\s])(:{2,4}|;;)(?:\s+(.*))?$").expect("valid regex"));

static OPTIONS_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:options|opts)="?([^"\]]*)"?"#).expect("valid regex"));

static REFTEXT_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"reftext=(?:"([^"]*)"|([^,]*))"#).expect("valid regex"));

static ID_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bid=([\w:.-]+)").expect("valid regex"));

static ATTRIBUTE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([\w-]+)\}").expect("valid regex"));

const ADMONITION_LABELS: [&str; 5] = ["CAUTION", "IMPORTANT", "NOTE", "TIP", "WARNING"];

/// Delimiters of blocks whose content is parsed as more blocks.
const COMPOUND_DELIMITERS: [&str; 3] = ["====", "****", "--"];

/// Delimiters of blocks whose content is kept verbatim.
const VERBATIM_DELIMITERS: [&str; 2] = ["----", "...."];

const COMMENT_DELIMITER: &str = "////";

const TABLE_DELIMITER: &str = "|===";

/// The built-in AsciiDoc parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiDocParser;

impl DocumentParser for AsciiDocParser {
    fn parse(&self, document: &Document, _catalog: &dyn Catalog, config: &ParseConfig) -> Result<Tree, Error> {
        let Some(source) = document.source() else {
            return Err(Error::ParseFailed {
                document: document.id().to_string(),
                reason: "no source text".to_string(),
            });
        };
        return Ok(parse_source(source, document.path(), config));
    }
}

/// Parse AsciiDoc `source` read from `file`. Never fails: anything that is
/// not recognised structure is a paragraph.
pub fn parse_source(source: &str, file: &Path, config: &ParseConfig) -> Tree {
    let mut parser = Parser {
        anchors: Anchors::new(),
        attributes: BTreeMap::new(),
        closing: Vec::new(),
        config,
        file: file.to_path_buf(),
        lines: source.lines().collect(),
        pending: Pending::default(),
        pos: 0,
    };
    let title = parser.header();
    let blocks = parser.blocks(None);
    let mut root = Node::new(Block::Container, SourceLocation::new(file, 1));
    root.children = nest_sections(blocks);
    return Tree {
        anchors: parser.anchors,
        root,
        title,
    };
}

/// Block metadata collected from the lines above a block.
#[derive(Debug, Default)]
struct Pending {
    footer: bool,
    header: bool,
    id: Option<String>,
    reftext: Option<String>,
    /// Admonition label given as the block style, e.g. `[NOTE]`.
    style: Option<String>,
    title: Option<String>,
}

/// Cursor over the source lines plus everything accumulated so far.
struct Parser<'a> {
    anchors: Anchors,
    /// Attribute entries declared in the document.
    attributes: BTreeMap<String, String>,
    /// Closing delimiters of the enclosing delimited blocks, innermost last.
    closing: Vec<String>,
    config: &'a ParseConfig,
    file: PathBuf,
    lines: Vec<&'a str>,
    pending: Pending,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a str> {
        return self.lines.get(self.pos).copied();
    }

    fn location(&self) -> SourceLocation {
        let line = u32::try_from(self.pos + 1).unwrap_or(u32::MAX);
        return SourceLocation::new(&self.file, line);
    }

    fn closes(&self, line: &str) -> bool {
        return self.closing.last().is_some_and(|c| c == line.trim_end());
    }

    /// `= Title` plus the attribute entries directly below it.
    fn header(&mut self) -> Option<String> {
        while self.peek().is_some_and(|l| l.trim().is_empty() || is_comment(l)) {
            self.pos += 1;
        }
        let title = self.peek()?.strip_prefix("= ")?.trim().to_string();
        self.pos += 1;
        while let Some(line) = self.peek() {
            if line.trim().is_empty() {
                break;
            }
            self.attribute_entry(line);
            self.pos += 1;
        }
        return Some(self.substitute(&title));
    }

    /// Record `:name: value` (or unset `:name!:`). Config attributes win.
    fn attribute_entry(&mut self, line: &str) -> bool {
        let Some(cap) = ATTRIBUTE_ENTRY.captures(line) else {
            return false;
        };
        let name = cap[1].to_string();
        if cap[2].is_empty() {
            let value = cap.get(3).map_or("", |m| m.as_str().trim());
            let value = self.substitute(value);
            self.attributes.insert(name, value);
        } else {
            self.attributes.remove(&name);
        }
        return true;
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        return self
            .config
            .attributes
            .get(name)
            .or_else(|| self.attributes.get(name))
            .map(String::as_str);
    }

    /// Replace `{name}` references; unknown names stay as written.
    fn substitute(&self, text: &str) -> String {
        return ATTRIBUTE_REFERENCE
            .replace_all(text, |cap: &regex::Captures<'_>| {
                return self.attribute(&cap[1]).map_or_else(|| cap[0].to_string(), str::to_string);
            })
            .into_owned();
    }

    /// Blocks up to the end of input or the `closing` delimiter, which is consumed.
    fn blocks(&mut self, closing: Option<&str>) -> Vec<Node> {
        if let Some(closing) = closing {
            self.closing.push(closing.to_string());
        }
        let mut blocks = Vec::new();
        while let Some(line) = self.peek() {
            if closing.is_some() && self.closes(line) {
                self.pos += 1;
                break;
            }
            if line.trim().is_empty() {
                self.pos += 1;
                continue;
            }
            if self.metadata(line) {
                self.pos += 1;
                continue;
            }
            blocks.push(self.block(line, closing.is_none()));
        }
        if closing.is_some() {
            self.closing.pop();
        }
        return blocks;
    }

    /// Consume a line that only carries metadata for the next block.
    fn metadata(&mut self, line: &str) -> bool {
        if is_comment(line) || self.attribute_entry(line) {
            return true;
        }
        if line == COMMENT_DELIMITER {
            self.pos += 1;
            while self.peek().is_some_and(|l| l != COMMENT_DELIMITER) {
                self.pos += 1;
            }
            return true;
        }
        if let Some(cap) = BLOCK_ANCHOR.captures(line) {
            self.pending.id = Some(cap[1].to_string());
            self.pending.reftext = cap.get(2).map(|m| self.substitute(m.as_str()));
            return true;
        }
        if let Some(cap) = ATTRIBUTE_LIST.captures(line) {
            self.attribute_list(&cap[1]);
            return true;
        }
        if let Some(cap) = BLOCK_TITLE.captures(line) {
            self.pending.title = Some(self.substitute(cap[1].trim()));
            return true;
        }
        return false;
    }

    /// Apply `[style#id.role%option,name=value,...]`.
    fn attribute_list(&mut self, body: &str) {
        let first = body.split(',').next().unwrap_or_default().trim();
        if !first.contains('=') {
            self.shorthand(first);
        }
        if let Some(cap) = ID_ATTRIBUTE.captures(body) {
            self.pending.id = Some(cap[1].to_string());
        }
        if let Some(cap) = REFTEXT_ATTRIBUTE.captures(body) {
            let reftext = cap.get(1).or_else(|| cap.get(2)).map_or("", |m| m.as_str());
            self.pending.reftext = Some(self.substitute(reftext.trim()));
        }
        if let Some(cap) = OPTIONS_ATTRIBUTE.captures(body) {
            for option in cap[1].split(',') {
                self.option(option.trim());
            }
        }
    }

    /// First positional attribute: a style followed by `#id`, `.role` and
    /// `%option` parts.
    fn shorthand(&mut self, first: &str) {
        let mut marker = None;
        let mut segments = Vec::new();
        for part in first.split_inclusive(['#', '.', '%']) {
            let (value, next) = match part.chars().last() {
                Some(c @ ('#' | '.' | '%')) => (part.strip_suffix(c).unwrap_or(part), Some(c)),
                _ => (part, None),
            };
            segments.push((marker, value));
            marker = next;
        }
        for (marker, value) in segments {
            match marker {
                None if ADMONITION_LABELS.contains(&value) => self.pending.style = Some(value.to_string()),
                Some('#') if !value.is_empty() => self.pending.id = Some(value.to_string()),
                Some('%') => self.option(value),
                _ => {},
            }
        }
    }

    fn option(&mut self, option: &str) {
        match option {
            "header" => self.pending.header = true,
            "footer" => self.pending.footer = true,
            _ => {},
        }
    }

    /// Parse one block starting at the current, non-blank line.
    fn block(&mut self, line: &'a str, top_level: bool) -> Node {
        let pending = std::mem::take(&mut self.pending);
        let location = self.location();
        let trimmed = line.trim_end();

        let section = if top_level { SECTION.captures(trimmed) } else { None };
        if let Some(cap) = section {
            self.pos += 1;
            return self.section(cap[1].len() - 1, &cap[2], location, pending);
        }
        if COMPOUND_DELIMITERS.contains(&trimmed) {
            self.pos += 1;
            let block = match &pending.style {
                Some(label) => Block::Admonition {
                    label: label.clone(),
                    lines: Vec::new(),
                },
                None => Block::Container,
            };
            let mut node = Node::new(block, location);
            node.children = self.blocks(Some(trimmed));
            return self.finish(node, pending);
        }
        if VERBATIM_DELIMITERS.contains(&trimmed) {
            self.pos += 1;
            let lines = self.verbatim(trimmed);
            return self.finish(Node::new(Block::Listing { lines }, location), pending);
        }
        if trimmed == TABLE_DELIMITER {
            self.pos += 1;
            let node = self.table(location, &pending);
            return self.finish(node, pending);
        }
        if let Some(cap) = ADMONITION_PARAGRAPH.captures(trimmed) {
            let label = cap[1].to_string();
            let first = cap[2].to_string();
            let lines = self.paragraph_lines(first);
            return self.finish(Node::new(Block::Admonition { label, lines }, location), pending);
        }
        if let Some(cap) = LIST_ITEM.captures(trimmed) {
            let marker = cap[1].to_string();
            let node = self.list(&marker, &mut Vec::new());
            return self.finish(node, pending);
        }
        if DLIST_ITEM.is_match(trimmed) {
            let node = self.description_list(location);
            return self.finish(node, pending);
        }

        let lines = self.paragraph_lines(trimmed.to_string());
        let block = match &pending.style {
            Some(label) => Block::Admonition {
                label: label.clone(),
                lines,
            },
            None => Block::Paragraph { lines },
        };
        return self.finish(Node::new(block, location), pending);
    }

    /// Attach pending metadata to a finished block and register its anchor.
    fn finish(&mut self, mut node: Node, pending: Pending) -> Node {
        if let Some(id) = pending.id {
            self.register(&id, node.location.clone(), pending.reftext, pending.title.clone());
            node.id = Some(id);
        }
        node.title = pending.title;
        return node;
    }

    fn section(&mut self, level: usize, title: &str, location: SourceLocation, pending: Pending) -> Node {
        let title = self.substitute(title.trim());
        let id = match pending.id {
            Some(id) => id,
            None => self.generate_id(&title),
        };
        self.register(&id, location.clone(), pending.reftext, Some(title.clone()));
        let mut node = Node::new(Block::Section { level }, location);
        node.id = Some(id);
        node.title = Some(title);
        return node;
    }

    /// Asciidoctor-style auto id: prefix, then lowercase words joined by the separator.
    fn generate_id(&self, title: &str) -> String {
        let prefix = self.attribute("idprefix").unwrap_or("_");
        let separator = self.attribute("idseparator").unwrap_or("_");
        let base = format!("{prefix}{}", slugify(title, separator));
        if !self.anchors.contains_key(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}{separator}{n}");
            if !self.anchors.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// First declaration of an id wins.
    fn register(&mut self, id: &str, location: SourceLocation, reftext: Option<String>, title: Option<String>) {
        self.anchors.entry(id.to_string()).or_insert(Anchor {
            location,
            reftext,
            title,
        });
    }

    /// Register the inline anchors found in one line of text.
    fn inline_anchors(&mut self, text: &str, location: &SourceLocation) {
        let found: Vec<(String, Option<String>)> = INLINE_ANCHOR
            .captures_iter(text)
            .chain(ANCHOR_MACRO.captures_iter(text))
            .map(|cap| {
                let reftext = cap.get(2).map(|m| m.as_str().trim()).filter(|r| !r.is_empty());
                return (cap[1].to_string(), reftext.map(|r| self.substitute(r)));
            })
            .collect();
        for (id, reftext) in found {
            self.register(&id, location.clone(), reftext, None);
        }
    }

    /// The lines of a paragraph, starting with `first` (already consumed
    /// from the current line) and running to a blank line or closing delimiter.
    fn paragraph_lines(&mut self, first: String) -> Vec<String> {
        let location = self.location();
        self.inline_anchors(&first, &location);
        let mut lines = vec![first];
        self.pos += 1;
        while let Some(line) = self.peek() {
            if line.trim().is_empty() || self.closes(line) || line.trim_end() == "+" {
                break;
            }
            let location = self.location();
            self.inline_anchors(line, &location);
            lines.push(line.trim_end().to_string());
            self.pos += 1;
        }
        return lines;
    }

    fn verbatim(&mut self, delimiter: &str) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.peek() {
            self.pos += 1;
            if line.trim_end() == delimiter {
                break;
            }
            lines.push(line.to_string());
        }
        return lines;
    }

    /// Whether `line` ends the text of the current list item.
    fn ends_item_text(&self, line: &str) -> bool {
        let trimmed = line.trim_end();
        return trimmed.is_empty()
            || trimmed == "+"
            || self.closes(line)
            || LIST_ITEM.is_match(trimmed)
            || DLIST_ITEM.is_match(trimmed)
            || is_delimiter(trimmed)
            || BLOCK_ANCHOR.is_match(trimmed)
            || ATTRIBUTE_LIST.is_match(trimmed);
    }

    /// Text of a list item: the rest of its first line plus any
    /// continuation lines, joined with `\n`.
    fn item_text(&mut self, first: &str, location: &SourceLocation) -> String {
        self.inline_anchors(first, location);
        let mut text = first.trim().to_string();
        self.pos += 1;
        while let Some(line) = self.peek() {
            if self.ends_item_text(line) {
                break;
            }
            let here = self.location();
            self.inline_anchors(line, &here);
            text.push('\n');
            text.push_str(line.trim());
            self.pos += 1;
        }
        return text;
    }

    /// Blocks attached to the current item with `+` continuation lines.
    fn continuations(&mut self, item: &mut Node) {
        while self.peek().is_some_and(|l| l.trim_end() == "+") {
            self.pos += 1;
            while let Some(line) = self.peek() {
                if !self.metadata(line) {
                    break;
                }
                self.pos += 1;
            }
            let Some(line) = self.peek() else {
                break;
            };
            if line.trim().is_empty() || self.closes(line) {
                break;
            }
            let block = self.block(line, false);
            item.children.push(block);
        }
    }

    /// Skip blank lines and return the next line if it continues a list.
    fn next_list_line(&mut self, accepts: impl Fn(&str) -> bool) -> Option<&'a str> {
        let mut probe = self.pos;
        while self.lines.get(probe).is_some_and(|l| l.trim().is_empty()) {
            probe += 1;
        }
        let line = self.lines.get(probe).copied()?;
        if self.closes(line) || !accepts(line.trim_end()) {
            return None;
        }
        self.pos = probe;
        return Some(line);
    }

    /// A list whose items use `marker`. Items with a marker not yet seen
    /// start a nested list; a marker of an enclosing list ends this one.
    fn list(&mut self, marker: &str, enclosing: &mut Vec<String>) -> Node {
        let mut list = Node::new(Block::List, self.location());
        enclosing.push(marker.to_string());
        while let Some(line) = self.next_list_line(|l| LIST_ITEM.is_match(l)) {
            let Some(cap) = LIST_ITEM.captures(line.trim_end()) else {
                break;
            };
            let item_marker = &cap[1];
            if item_marker != marker {
                if enclosing.iter().any(|m| m == item_marker) {
                    break;
                }
                let nested = self.list(item_marker, enclosing);
                match list.children.last_mut() {
                    Some(item) => item.children.push(nested),
                    None => list.children.push(nested),
                }
                continue;
            }
            let location = self.location();
            let text = self.item_text(&cap[2], &location);
            let mut item = Node::new(Block::ListItem { text }, location);
            self.continuations(&mut item);
            list.children.push(item);
        }
        enclosing.pop();
        return list;
    }

    /// A description list: each entry is a term item followed by an
    /// optional description item.
    fn description_list(&mut self, location: SourceLocation) -> Node {
        let mut list = Node::new(Block::List, location);
        while let Some(line) = self.next_list_line(|l| DLIST_ITEM.is_match(l)) {
            let Some(cap) = DLIST_ITEM.captures(line.trim_end()) else {
                break;
            };
            let here = self.location();
            self.inline_anchors(&cap[1], &here);
            list.children
                .push(Node::new(Block::ListItem { text: cap[1].to_string() }, here.clone()));

            let description = cap.get(3).map_or("", |m| m.as_str()).trim();
            if description.is_empty() {
                self.pos += 1;
                let Some(next) = self.peek() else {
                    break;
                };
                if self.ends_item_text(next) {
                    continue;
                }
                let desc_location = self.location();
                let text = self.item_text(next, &desc_location);
                let mut item = Node::new(Block::ListItem { text }, desc_location);
                self.continuations(&mut item);
                list.children.push(item);
                continue;
            }
            let text = self.item_text(description, &here);
            let mut item = Node::new(Block::ListItem { text }, here);
            self.continuations(&mut item);
            list.children.push(item);
        }
        return list;
    }

    /// A `|===` table. Rows are separated by blank lines; every `|` starts
    /// a cell.
    fn table(&mut self, location: SourceLocation, pending: &Pending) -> Node {
        let mut groups: Vec<(Row, usize)> = Vec::new();
        let mut row: Row = Vec::new();
        let mut row_lines = 0;
        while let Some(line) = self.peek() {
            self.pos += 1;
            let trimmed = line.trim_end();
            if trimmed == TABLE_DELIMITER {
                break;
            }
            if trimmed.trim().is_empty() {
                if !row.is_empty() {
                    groups.push((std::mem::take(&mut row), row_lines));
                    row_lines = 0;
                }
                continue;
            }
            let here = SourceLocation::new(&self.file, u32::try_from(self.pos).unwrap_or(u32::MAX));
            self.table_line(trimmed, &here, &mut row);
            row_lines += 1;
        }
        if !row.is_empty() {
            groups.push((row, row_lines));
        }

        let implicit_header = groups.len() > 1 && groups.first().is_some_and(|(_, lines)| *lines == 1);
        let mut rows: Vec<Row> = groups.into_iter().map(|(row, _)| row).collect();
        let head = if pending.header || implicit_header {
            rows.drain(..rows.len().min(1)).collect()
        } else {
            Vec::new()
        };
        let foot = if pending.footer && !rows.is_empty() {
            rows.split_off(rows.len() - 1)
        } else {
            Vec::new()
        };
        return Node::new(Block::Table { body: rows, foot, head }, location);
    }

    /// Split one table line into cells; text before the first `|` continues
    /// the previous cell.
    fn table_line(&mut self, line: &str, location: &SourceLocation, row: &mut Row) {
        let mut segments = line.split('|');
        let leading = segments.next().unwrap_or_default().trim();
        if !leading.is_empty() {
            self.inline_anchors(leading, location);
            if let Some(Node {
                block: Block::TableCell { text },
                ..
            }) = row.last_mut()
            {
                text.push('\n');
                text.push_str(leading);
            }
        }
        for segment in segments {
            let text = segment.trim().to_string();
            self.inline_anchors(&text, location);
            row.push(Node::new(Block::TableCell { text }, location.clone()));
        }
    }
}

fn is_comment(line: &str) -> bool {
    return line.starts_with("//") && !line.starts_with(COMMENT_DELIMITER);
}

fn is_delimiter(line: &str) -> bool {
    return COMPOUND_DELIMITERS.contains(&line)
        || VERBATIM_DELIMITERS.contains(&line)
        || line == TABLE_DELIMITER
        || line == COMMENT_DELIMITER;
}

/// Lowercase alphanumeric words joined by `separator`.
fn slugify(text: &str, separator: &str) -> String {
    let lowered = text.to_lowercase();
    let mut result = String::with_capacity(lowered.len());
    let mut prev_separator = true;

    for c in lowered.chars() {
        if c.is_alphanumeric() || c == '_' {
            result.push(c);
            prev_separator = false;
            continue;
        }
        if prev_separator || !(c.is_whitespace() || c == '-' || c == '.') {
            continue;
        }
        result.push_str(separator);
        prev_separator = true;
    }

    if let Some(trimmed) = result.strip_suffix(separator) {
        return trimmed.to_string();
    }
    return result;
}

/// Section level of a node, or zero for anything that is not a section.
const fn section_level(node: &Node) -> usize {
    return match node.block {
        Block::Section { level } => level,
        _ => 0,
    };
}

/// Move the blocks that follow a section heading into that section.
fn nest_sections(blocks: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut open: Vec<Node> = Vec::new();
    for node in blocks {
        let level = section_level(&node);
        if level > 0 {
            close_sections(&mut open, &mut out, level);
            open.push(node);
            continue;
        }
        match open.last_mut() {
            Some(section) => section.children.push(node),
            None => out.push(node),
        }
    }
    close_sections(&mut open, &mut out, 1);
    return out;
}

/// Close every open section at `level` or deeper.
fn close_sections(open: &mut Vec<Node>, out: &mut Vec<Node>, level: usize) {
    while open.last().is_some_and(|s| section_level(s) >= level) {
        let Some(done) = open.pop() else {
            break;
        };
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => out.push(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Tree {
        parse_source(source, Path::new("doc.adoc"), &ParseConfig::default())
    }

    fn text(tree: &Tree) -> Vec<(u32, &str)> {
        tree.text()
    }

    #[test]
    fn header_title_and_attributes() {
        let tree = parse("= Doc {product}\n:product: Widget\n\n== About {product}\n");
        assert_eq!(tree.title.as_deref(), Some("Doc Widget"));
        assert_eq!(tree.anchors["_about_widget"].title.as_deref(), Some("About Widget"));
    }

    #[test]
    fn config_attributes_win_over_document() {
        let config = ParseConfig::default().with_attribute("product", "Config");
        let tree = parse_source("= Doc\n:product: Doc\n\n== {product}\n", Path::new("doc.adoc"), &config);
        assert_eq!(tree.anchors["_config"].title.as_deref(), Some("Config"));
    }

    #[test]
    fn unknown_attribute_stays_as_written() {
        let tree = parse("= Doc\n\n[[a]]\n== Uses {missing}\n");
        assert_eq!(tree.anchors["a"].title.as_deref(), Some("Uses {missing}"));
    }

    #[test]
    fn section_ids_are_generated_and_deduplicated() {
        let tree = parse("= Doc\n\n== The Fragment\n\n== The Fragment\n\n=== Next-step v1.2\n");
        assert!(tree.anchors.contains_key("_the_fragment"));
        assert!(tree.anchors.contains_key("_the_fragment_2"));
        assert!(tree.anchors.contains_key("_next_step_v1_2"));
    }

    #[test]
    fn explicit_block_anchor_replaces_generated_id() {
        let tree = parse("= Doc\n\n[[frag,Linked]]\n== Fragment\nBody\n");
        let anchor = &tree.anchors["frag"];
        assert_eq!(anchor.reftext.as_deref(), Some("Linked"));
        assert_eq!(anchor.title.as_deref(), Some("Fragment"));
        assert_eq!(anchor.location.line, 4);
        assert!(!tree.anchors.contains_key("_fragment"));
    }

    #[test]
    fn shorthand_id_and_reftext_attribute() {
        let tree = parse("= Doc\n\n[#intro,reftext=\"The Intro\"]\n== Introduction\n");
        assert_eq!(tree.anchors["intro"].display_text(), "The Intro");
    }

    #[test]
    fn sections_nest_by_level() {
        let tree = parse("= Doc\n\n== One\npara\n\n=== Deeper\nmore\n\n== Two\n");
        let top = &tree.root.children;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title.as_deref(), Some("One"));
        assert_eq!(top[0].children.len(), 2);
        assert_eq!(top[0].children[1].title.as_deref(), Some("Deeper"));
        assert_eq!(top[1].title.as_deref(), Some("Two"));
    }

    #[test]
    fn block_anchor_with_title_on_paragraph() {
        let tree = parse("= Doc\n\n[[para]]\n.Paragraph Title\nSome text\n");
        assert_eq!(tree.anchors["para"].display_text(), "Paragraph Title");
        assert_eq!(tree.root.children[0].id.as_deref(), Some("para"));
    }

    #[test]
    fn inline_anchors_have_no_title() {
        let tree = parse("= Doc\n\nText with [[here]]an anchor and anchor:there[There].\n");
        assert_eq!(tree.anchors["here"].display_text(), "");
        assert_eq!(tree.anchors["there"].display_text(), "There");
        assert_eq!(tree.anchors["here"].location.line, 3);
    }

    #[test]
    fn paragraph_lines_keep_their_locations() {
        let tree = parse("= Doc\n\nfirst\nsecond\n\nthird\n");
        assert_eq!(text(&tree), vec![(3, "first"), (4, "second"), (6, "third")]);
    }

    #[test]
    fn admonition_paragraph_and_block() {
        let tree = parse("= Doc\n\nNOTE: A note\n\n[WARNING]\n====\nInside\n====\n\n[TIP]\nStyled paragraph\n");
        let kids = &tree.root.children;
        assert!(matches!(&kids[0].block, Block::Admonition { label, lines } if label == "NOTE" && lines == &["A note"]));
        assert!(matches!(&kids[1].block, Block::Admonition { label, .. } if label == "WARNING"));
        assert_eq!(kids[1].children.len(), 1);
        assert!(matches!(&kids[2].block, Block::Admonition { label, .. } if label == "TIP"));
    }

    #[test]
    fn nested_lists() {
        let tree = parse("= Doc\n\n* one\n** nested\n* two\n. ordered\n");
        let list = &tree.root.children[0];
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.children[0].children[0].children.len(), 1);
        assert_eq!(
            text(&tree).into_iter().map(|(_, t)| t).collect::<Vec<_>>(),
            vec!["one", "nested", "two", "ordered"]
        );
    }

    #[test]
    fn list_continuation_attaches_block() {
        let tree = parse("= Doc\n\n* item\n+\n----\ncode\n----\n* next\n");
        let list = &tree.root.children[0];
        assert_eq!(list.children.len(), 2);
        assert!(matches!(list.children[0].children[0].block, Block::Listing { .. }));
    }

    #[test]
    fn description_list_terms_and_descriptions() {
        let tree = parse("= Doc\n\nfirst:: one\nsecond::\ntwo\nthird::\n");
        let texts: Vec<&str> = text(&tree).into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["first", "one", "second", "two", "third"]);
    }

    #[test]
    fn double_colon_inside_words_is_a_paragraph() {
        let tree = parse("= Doc\n\nUse std::vec here.\n");
        assert!(matches!(tree.root.children[0].block, Block::Paragraph { .. }));
    }

    #[test]
    fn table_rows_and_cell_anchors() {
        let tree = parse("= Doc\n\n|===\n| one\n| two\n\n| [[three]]three\n| four\n|===\n");
        let Block::Table { head, body, foot } = &tree.root.children[0].block else {
            panic!("expected table");
        };
        assert!(head.is_empty());
        assert!(foot.is_empty());
        assert_eq!(body.len(), 2);
        assert_eq!(body[1].len(), 2);
        assert_eq!(body[1][0].location.line, 7);
        assert!(tree.anchors.contains_key("three"));
    }

    #[test]
    fn table_header_and_footer() {
        let implicit = parse("= Doc\n\n|===\n| A | B\n\n| 1 | 2\n|===\n");
        let Block::Table { head, body, .. } = &implicit.root.children[0].block else {
            panic!("expected table");
        };
        assert_eq!(head.len(), 1);
        assert_eq!(body.len(), 1);

        let explicit = parse("= Doc\n\n[%header%footer]\n|===\n| A\n| B\n\n| 1\n\n| total\n|===\n");
        let Block::Table { head, body, foot } = &explicit.root.children[0].block else {
            panic!("expected table");
        };
        assert_eq!((head.len(), body.len(), foot.len()), (1, 1, 1));

        let options = parse("= Doc\n\n[cols=\"1,1\",options=\"header\"]\n|===\n| A\n| B\n\n| 1\n| 2\n|===\n");
        let Block::Table { head, .. } = &options.root.children[0].block else {
            panic!("expected table");
        };
        assert_eq!(head.len(), 1);
    }

    #[test]
    fn listing_and_comments_are_not_text() {
        let tree = parse("= Doc\n\n// xref:a.adoc#b[]\n////\nxref:c.adoc#d[]\n////\n----\nxref:e.adoc#f[]\n----\n");
        assert!(text(&tree).is_empty());
    }

    #[test]
    fn delimited_block_contains_nested_blocks() {
        let tree = parse("= Doc\n\n****\nsidebar\n\n--\nopen\n--\n****\nafter\n");
        let sidebar = &tree.root.children[0];
        assert!(matches!(sidebar.block, Block::Container));
        assert_eq!(sidebar.children.len(), 2);
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn document_without_header() {
        let tree = parse("Just text\n");
        assert_eq!(tree.title, None);
        assert_eq!(text(&tree), vec![(1, "Just text")]);
    }

    #[test]
    fn missing_source_is_a_parse_error() {
        use crate::catalog::ContentCatalog;
        use crate::document::{DocumentId, MediaType};

        let document = Document::new(
            DocumentId::page("test", "1.0", "ROOT", "empty.adoc"),
            MediaType::AsciiDoc,
            None,
        );
        let result = AsciiDocParser.parse(&document, &ContentCatalog::new(), &ParseConfig::default());
        assert!(matches!(result, Err(Error::ParseFailed { .. })));
    }
}
