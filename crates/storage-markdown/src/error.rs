//! Error types for conversion.

/// Error type for storage-format conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The HTML-to-Markdown transducer could not process the document.
    #[error("Transducer error: {0}")]
    Transducer(String),

    /// The Markdown input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
