use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::Reference;

/// `xref:<reference>[<text>]`. The reference is the shortest run of
/// non-whitespace before `[`; the text is empty or ends in a character other
/// than a backslash, so `\]` does not close it.
static XREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xref:(\S+?)\[(|.*?[^\\])\]").expect("valid regex"));

/// One `xref:` occurrence found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    /// The whole macro, `xref:` through the closing bracket.
    pub raw: &'a str,
    /// Text between `xref:` and `[`, fragment included.
    pub reference: &'a str,
    /// Text between the brackets, escapes untouched.
    pub text: &'a str,
}

impl LinkMatch<'_> {
    /// Split into target, fragment and text.
    pub fn to_reference(&self) -> Reference {
        Reference::parse(self.reference, self.text)
    }
}

/// Replace every occurrence in `line` with what `rewrite` returns for it.
/// `None` keeps the occurrence exactly as written.
pub fn replace_links<F>(line: &str, mut rewrite: F) -> String
where
    F: FnMut(&LinkMatch<'_>) -> Option<String>,
{
    XREF_PATTERN
        .replace_all(line, |cap: &Captures<'_>| {
            let Some(link) = link_match_from_capture(cap) else {
                return cap.get(0).map_or_else(String::new, |m| m.as_str().to_string());
            };
            rewrite(&link).unwrap_or_else(|| link.raw.to_string())
        })
        .into_owned()
}

/// Pull the three parts out of a capture.
fn link_match_from_capture<'a>(cap: &Captures<'a>) -> Option<LinkMatch<'a>> {
    Some(LinkMatch {
        raw: cap.get(0)?.as_str(),
        reference: cap.get(1)?.as_str(),
        text: cap.get(2)?.as_str(),
    })
}
