/// Core domain types for xref references, fragments, and source locations.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Location in a source document that a node or diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// File the node was parsed from.
    pub file: PathBuf,
    /// One-based line number in the file.
    pub line: u32,
}

impl SourceLocation {
    /// Build a location from a file and one-based line.
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        return Self { file: file.into(), line };
    }

    /// The location `offset` lines further down the same file.
    pub fn advanced(&self, offset: usize) -> Self {
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        return Self {
            file: self.file.clone(),
            line: self.line.saturating_add(offset),
        };
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.file.display(), self.line);
    }
}

/// A parsed `xref:` occurrence. Ephemeral: built and dropped per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Anchor name inside the target. `None` when the reference has no `#`
    /// or the part after it is empty.
    pub fragment: Option<String>,
    /// Resource identifier of the target document.
    pub target: String,
    /// Link text as written; empty means "use the default".
    pub text: String,
}

impl Reference {
    /// Split a raw reference on its last `#` into target and fragment.
    pub fn parse(raw: &str, text: &str) -> Self {
        let (target, fragment) = match raw.rsplit_once('#') {
            Some((target, fragment)) if !fragment.is_empty() => (target, Some(fragment.to_string())),
            Some((target, _)) => (target, None),
            None => (raw, None),
        };
        return Self {
            fragment,
            target: target.to_string(),
            text: text.to_string(),
        };
    }

    /// `target#fragment`, or just the target when there is no fragment.
    pub fn qualified(&self) -> String {
        return match &self.fragment {
            Some(fragment) => format!("{}#{fragment}", self.target),
            None => self.target.clone(),
        };
    }
}

/// What a fragment resolves to: its name and the text a link to it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentEntry {
    /// Where the anchor is declared in the target document.
    pub location: SourceLocation,
    /// The anchor id.
    pub name: String,
    /// Explicit reftext if the anchor declares one, else its title, else empty.
    pub text: String,
}

/// Anchor name to entry, for one document.
pub type FragmentIndex = BTreeMap<String, FragmentEntry>;

/// Diagnostic severity. Neither level stops processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Non-blocking advice, such as redundant or empty link text.
    Warn,
    /// A reference that points at a fragment that does not exist.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Severity::Warn => f.write_str("warn"),
            Severity::Error => f.write_str("error"),
        };
    }
}
