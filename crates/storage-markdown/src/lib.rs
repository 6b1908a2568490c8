//! # storage-markdown
//!
//! Convert between CommonMark + GFM Markdown and the XHTML "Storage Format"
//! wiki pages are stored in.
//!
//! ## Design
//!
//! The forward path parses Markdown with comrak and renders the tree as
//! Storage Format, using structured macros for code blocks and task lists.
//! It never fails: if the Markdown cannot be parsed, the input is returned
//! unchanged.
//!
//! The reverse path rewrites the known macros into plain HTML, converts the
//! HTML to Markdown and then normalizes the result, removing escapes that
//! are not needed and restoring task-list checkboxes.
//!
//! ```text
//! Markdown ──parse──▶ Node tree ──render──▶ Storage Format
//! Storage Format ──macros──▶ HTML ──transducer──▶ Markdown ──normalize──▶ Markdown
//! ```
//!
//! ## Example
//!
//! ```rust
//! use storage_markdown::{markdown_to_storage, storage_to_markdown};
//!
//! let storage = markdown_to_storage("**bold** and *italic*");
//! assert_eq!(storage, "<p><strong>bold</strong> and <em>italic</em></p>\n");
//!
//! let markdown = storage_to_markdown(&storage).unwrap();
//! assert_eq!(markdown, "**bold** and *italic*");
//! ```

mod error;
mod escape;
pub mod macros;
pub mod markdown;
pub mod normalize;
mod options;
pub mod render;
pub mod transducer;

use log::{debug, warn};

pub use error::{ConvertError, Result};
pub use options::{ConverterOptions, StorageOptions, DEFAULT_MAX_DEPTH};
pub use storage_markdown_core::{HeadingStyle, Options};

/// Converts documents between Markdown and Storage Format
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConverterOptions,
}

impl Converter {
    /// Create a new Converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Converter with custom options
    pub fn with_options(options: ConverterOptions) -> Self {
        Self { options }
    }

    /// Get the current options
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert Markdown to Storage Format.
    ///
    /// Never fails; when the Markdown cannot be parsed the input is
    /// returned as is.
    pub fn markdown_to_storage(&self, markdown: &str) -> String {
        self.try_markdown_to_storage(markdown).unwrap_or_else(|err| {
            warn!("returning markdown unchanged: {err}");
            markdown.to_string()
        })
    }

    /// Convert Markdown to Storage Format, reporting parse failures
    pub fn try_markdown_to_storage(&self, markdown: &str) -> Result<String> {
        let document = markdown::parse(markdown, self.options.max_depth)?;
        let storage = render::render(&document, &self.options.storage);
        debug!(
            "rendered {} bytes of markdown as {} bytes of storage format",
            markdown.len(),
            storage.len()
        );
        Ok(storage)
    }

    /// Convert Storage Format to Markdown.
    ///
    /// Empty input yields an empty string. The only error is a transducer
    /// failure on pathologically nested input.
    pub fn storage_to_markdown(&self, storage: &str) -> Result<String> {
        if storage.trim().is_empty() {
            return Ok(String::new());
        }

        let html = macros::preprocess(storage);
        debug!("macro preprocessing: {} -> {} bytes", storage.len(), html.len());

        let raw = transducer::transduce(&html, &self.options.markdown, self.options.max_depth)?;
        debug!("transducer produced {} bytes of markdown", raw.len());

        Ok(normalize::normalize(&raw))
    }
}

/// Convert Markdown to Storage Format with default options
pub fn markdown_to_storage(markdown: &str) -> String {
    Converter::new().markdown_to_storage(markdown)
}

/// Convert Storage Format to Markdown with default options
pub fn storage_to_markdown(storage: &str) -> Result<String> {
    Converter::new().storage_to_markdown(storage)
}
