/// Crate-level error types for docxref.
use std::path::PathBuf;

/// Failures of the surrounding machinery: loading content, reading config,
/// parsing a document. Reference resolution itself never fails; it reports
/// through `Diagnostics` instead.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as docxref::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content root passed on the command line does not exist.
    #[error("content root not found: {}", path.display())]
    ContentRootNotFound {
        /// Path to the missing directory.
        path: PathBuf,
    },

    /// No document in the catalog matches the given identifier.
    #[error("document not found: `{id}`")]
    DocumentNotFound {
        /// Identifier as typed by the user.
        id: String,
    },

    /// A configured stub pattern is not a valid regular expression.
    #[error("invalid stub pattern `{pattern}`: {reason}")]
    InvalidStubPattern {
        /// The pattern string from the config.
        pattern: String,
        /// Message from the regex compiler.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of a report failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// A document could not be turned into a tree.
    #[error("parse failed: {document}: {reason}")]
    ParseFailed {
        /// Identifier of the document that failed to parse.
        document: String,
        /// Description of the failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
