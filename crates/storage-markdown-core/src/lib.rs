//! storage-markdown-core - Markdown AST and serialization
//!
//! This crate provides the Markdown data structures the storage-format
//! converter builds from (X)HTML, and the serializer that turns them into
//! CommonMark + GFM text.
//!
//! # Architecture
//!
//! ```text
//! Storage XHTML ──macros──▶ HTML ──transducer──▶ ┌──────────────┐
//!                                                │ Markdown AST │ ──▶ Markdown String
//!                                                └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use storage_markdown_core::{Block, Inline, Options, serialize};
//!
//! let ast = Block::Document(vec![
//!     Block::Heading {
//!         level: 1,
//!         content: vec![Inline::Text("Hello World".to_string())],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::Text("This is ".to_string()),
//!         Inline::Strong(vec![Inline::Text("bold".to_string())]),
//!         Inline::Text(" text.".to_string()),
//!     ]),
//! ]);
//!
//! let markdown = serialize(&ast, &Options::default());
//! assert_eq!(markdown, "# Hello World\n\nThis is **bold** text.");
//! ```

mod ast;
mod options;
mod serialize;

pub use ast::{inlines_are_blank, trim_inlines, Block, Inline, ListItem};
pub use options::{HeadingStyle, Options};
pub use serialize::serialize;
