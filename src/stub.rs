//! Placeholder links for references that are known not to resolve yet.

use regex::Regex;

use crate::error::Error;

/// Compiled stub patterns. Empty when stubbing is not configured.
#[derive(Debug, Clone, Default)]
pub struct StubPolicy {
    patterns: Vec<Regex>,
}

impl StubPolicy {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStubPattern` for the first pattern that does
    /// not compile.
    pub fn compile(patterns: &[String]) -> Result<Self, Error> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| Error::InvalidStubPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches somewhere in the raw reference.
    pub fn matches(&self, reference: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(reference))
    }
}

/// A link back to the referencing page itself. Without link text the label
/// shows the raw reference in brackets, passed through so the brackets
/// survive.
pub fn stub_link(source_relative: &str, reference: &str, text: &str) -> String {
    if text.is_empty() {
        format!("xref:{source_relative}[+++[{reference}]+++]")
    } else {
        format!("xref:{source_relative}[{text}]")
    }
}
