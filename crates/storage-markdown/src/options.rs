//! Converter configuration.

use storage_markdown_core::Options;

/// Default nesting limit for both conversion directions
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for the Markdown to Storage Format renderer
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Language written into code macros when a block declares none
    pub default_language: String,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            default_language: "none".to_string(),
        }
    }
}

/// Options for a [`Converter`](crate::Converter)
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Forward path (Markdown to Storage Format)
    pub storage: StorageOptions,

    /// Reverse path Markdown output style
    pub markdown: Options,

    /// Maximum element nesting accepted in either direction
    pub max_depth: usize,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            storage: StorageOptions::default(),
            markdown: Options::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
