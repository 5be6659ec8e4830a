//! Validate `xref:` links that point at a fragment inside another AsciiDoc
//! document, and fill in their link text from the target anchor's reftext
//! or title.

#![allow(
    clippy::expect_used,
    reason = "regex literals compile once in LazyLock statics and are covered by tests"
)]
#![allow(
    clippy::arithmetic_side_effects,
    reason = "line cursors and offsets are bounded by the length of the source text"
)]
#![allow(clippy::implicit_return, reason = "short accessors and builders read as single expressions")]
#![allow(clippy::arbitrary_source_item_ordering, reason = "items are grouped by pipeline stage")]
#![cfg_attr(
    test,
    allow(
        clippy::indexing_slicing,
        clippy::missing_assert_message,
        clippy::missing_docs_in_private_items,
        clippy::missing_panics_doc,
        reason = "tests index fixtures directly and panic on failure"
    )
)]

pub mod asciidoc;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod fragments;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod stub;
pub mod tree;
pub mod types;
pub mod walker;
pub mod xref;

pub use error::Error;
