//! Markdown Abstract Syntax Tree
//!
//! This module defines the AST the HTML transducer builds before it is
//! written out as Markdown text. Text nodes carry already-escaped Markdown.

/// A block-level Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Root document container
    Document(Vec<Block>),

    /// Heading with level (1-6) and inline content
    Heading { level: u8, content: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// List (ordered or unordered)
    List {
        ordered: bool,
        start: u32,
        items: Vec<ListItem>,
    },

    /// Fenced code block; the body is written verbatim
    CodeBlock {
        language: Option<String>,
        code: String,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// Pipe table with a header row and data rows
    Table {
        headers: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
}

/// A list item containing blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Block>,
}

impl ListItem {
    pub fn new(content: Vec<Block>) -> Self {
        Self { content }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self {
            content: vec![Block::Paragraph(inlines)],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.iter().all(|b| b.is_blank())
    }
}

/// An inline Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Escaped Markdown text
    Text(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// GFM strikethrough
    Strikethrough(Vec<Inline>),

    /// Inline code, unescaped
    Code(String),

    /// Link with text, URL, and optional title
    Link {
        content: Vec<Inline>,
        url: String,
        title: Option<String>,
    },

    /// Image with alt text and URL
    Image { alt: String, url: String },

    /// Hard line break
    LineBreak,
}

impl Block {
    /// Check if this block is empty/blank.
    ///
    /// Code blocks and thematic breaks are never blank: an empty code block
    /// still carries its fences.
    pub fn is_blank(&self) -> bool {
        match self {
            Block::Document(blocks) | Block::BlockQuote(blocks) => {
                blocks.iter().all(|b| b.is_blank())
            }
            Block::Paragraph(inlines) => inlines_are_blank(inlines),
            Block::Heading { content, .. } => inlines_are_blank(content),
            Block::List { items, .. } => items.iter().all(|i| i.is_blank()),
            Block::CodeBlock { .. } | Block::ThematicBreak => false,
            Block::Table { headers, rows } => {
                headers.iter().all(|h| inlines_are_blank(h))
                    && rows.iter().all(|r| r.iter().all(|c| inlines_are_blank(c)))
            }
        }
    }
}

impl Inline {
    /// Check if this inline is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(text) => text.trim().is_empty(),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) | Inline::Strikethrough(inlines) => {
                inlines_are_blank(inlines)
            }
            Inline::Code(code) => code.is_empty(),
            Inline::Link { content, .. } => inlines_are_blank(content),
            Inline::Image { .. } => false,
            Inline::LineBreak => false,
        }
    }
}

/// Check if every inline in the slice is blank
pub fn inlines_are_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(|i| i.is_blank())
}

/// Trim leading whitespace from the first text inline and trailing whitespace
/// (and hard breaks) from the last one, dropping inlines that become empty.
pub fn trim_inlines(inlines: &mut Vec<Inline>) {
    while let Some(first) = inlines.first_mut() {
        match first {
            Inline::Text(text) => {
                let trimmed = text.trim_start();
                if trimmed.is_empty() {
                    inlines.remove(0);
                    continue;
                }
                *text = trimmed.to_string();
            }
            Inline::LineBreak => {
                inlines.remove(0);
                continue;
            }
            _ => {}
        }
        break;
    }

    while let Some(last) = inlines.last_mut() {
        match last {
            Inline::Text(text) => {
                let trimmed = text.trim_end();
                if trimmed.is_empty() {
                    inlines.pop();
                    continue;
                }
                *text = trimmed.to_string();
            }
            Inline::LineBreak => {
                inlines.pop();
                continue;
            }
            _ => {}
        }
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_code_block_is_not_blank() {
        let block = Block::CodeBlock {
            language: Some("go".to_string()),
            code: String::new(),
        };
        assert!(!block.is_blank());
    }

    #[test]
    fn test_whitespace_paragraph_is_blank() {
        let block = Block::Paragraph(vec![Inline::Text("  ".to_string())]);
        assert!(block.is_blank());
    }

    #[test]
    fn test_paragraph_with_line_break_is_not_blank() {
        let block = Block::Paragraph(vec![Inline::Text("  \n ".to_string()), Inline::LineBreak]);
        assert!(!block.is_blank());
    }

    #[test]
    fn test_trim_inlines() {
        let mut inlines = vec![
            Inline::Text("  ".to_string()),
            Inline::Text(" Hello ".to_string()),
            Inline::Strong(vec![Inline::Text("World".to_string())]),
            Inline::Text(" ".to_string()),
            Inline::LineBreak,
        ];
        trim_inlines(&mut inlines);
        assert_eq!(
            inlines,
            vec![
                Inline::Text("Hello ".to_string()),
                Inline::Strong(vec![Inline::Text("World".to_string())]),
            ]
        );
    }
}
