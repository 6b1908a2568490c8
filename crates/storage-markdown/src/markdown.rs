//! Markdown parsing.
//!
//! Parses CommonMark + GFM with comrak and converts the arena tree into an
//! owned [`Node`] tree over a closed set of node kinds, which is what the
//! storage renderer consumes.

use comrak::nodes::{AstNode, ListType, NodeLink, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

use crate::error::{ConvertError, Result};

/// Column alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Value of the `align` attribute, if any
    pub fn as_attribute(self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

impl From<TableAlignment> for Alignment {
    fn from(alignment: TableAlignment) -> Self {
        match alignment {
            TableAlignment::None => Alignment::None,
            TableAlignment::Left => Alignment::Left,
            TableAlignment::Center => Alignment::Center,
            TableAlignment::Right => Alignment::Right,
        }
    }
}

/// Kind of a parsed Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Heading { level: u8 },
    Paragraph,
    /// A paragraph inside a tight list item
    TextBlock,
    List { ordered: bool, tight: bool, start: usize },
    ListItem,
    TaskCheckBox { checked: bool },
    CodeBlock {
        fenced: bool,
        language: Option<String>,
        literal: String,
    },
    HtmlBlock,
    Blockquote,
    ThematicBreak,
    /// Level 1 is italic, level 2 is bold
    Emphasis { level: u8 },
    CodeSpan { literal: String },
    Link { destination: String, title: String },
    Image { destination: String },
    AutoLink { url: String, label: String },
    Text {
        value: String,
        hard_line_break: bool,
        soft_line_break: bool,
    },
    RawHtml,
    Table,
    /// The header row of a table; holds cells directly
    TableHeader,
    TableRow,
    TableCell { alignment: Alignment },
    Strikethrough,
}

/// A parsed Markdown node and its children
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn text(value: &str) -> Self {
        Self::new(NodeKind::Text {
            value: value.to_string(),
            hard_line_break: false,
            soft_line_break: false,
        })
    }
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

/// Parse Markdown into a [`Node`] tree rooted at a `Document`.
///
/// Fails when the document nests deeper than `max_depth`.
pub fn parse(markdown: &str, max_depth: usize) -> Result<Node> {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let builder = Builder { max_depth };
    let children = builder.convert_children(root, 0, false)?;
    Ok(Node::with_children(NodeKind::Document, children))
}

struct Builder {
    max_depth: usize,
}

impl Builder {
    /// Convert the children of `node`, folding line breaks into the
    /// preceding text node.
    fn convert_children<'a>(
        &self,
        node: &'a AstNode<'a>,
        depth: usize,
        in_tight_item: bool,
    ) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        for child in node.children() {
            let line_break = match child.data.borrow().value {
                NodeValue::SoftBreak => Some(false),
                NodeValue::LineBreak => Some(true),
                _ => None,
            };

            match line_break {
                Some(hard) => fold_line_break(&mut nodes, hard),
                None => nodes.extend(self.convert(child, depth + 1, in_tight_item)?),
            }
        }

        Ok(nodes)
    }

    fn convert<'a>(
        &self,
        node: &'a AstNode<'a>,
        depth: usize,
        in_tight_item: bool,
    ) -> Result<Vec<Node>> {
        if depth > self.max_depth {
            return Err(ConvertError::Parse(format!(
                "document nesting exceeds {} levels",
                self.max_depth
            )));
        }

        let kind = match &node.data.borrow().value {
            NodeValue::Document => NodeKind::Document,
            NodeValue::Heading(heading) => NodeKind::Heading {
                level: heading.level,
            },
            NodeValue::Paragraph if in_tight_item => NodeKind::TextBlock,
            NodeValue::Paragraph => NodeKind::Paragraph,
            NodeValue::List(list) => NodeKind::List {
                ordered: list.list_type == ListType::Ordered,
                tight: list.tight,
                start: list.start,
            },
            NodeValue::Item(_) => NodeKind::ListItem,
            NodeValue::TaskItem(symbol) => {
                let checked = symbol.is_some();
                return Ok(vec![self.task_item(node, checked, depth)?]);
            }
            NodeValue::CodeBlock(code) => {
                return Ok(vec![Node::new(NodeKind::CodeBlock {
                    fenced: code.fenced,
                    language: code.info.split_whitespace().next().map(str::to_string),
                    literal: code.literal.clone(),
                })]);
            }
            NodeValue::HtmlBlock(_) => return Ok(vec![Node::new(NodeKind::HtmlBlock)]),
            NodeValue::BlockQuote => NodeKind::Blockquote,
            NodeValue::ThematicBreak => return Ok(vec![Node::new(NodeKind::ThematicBreak)]),
            NodeValue::Emph => NodeKind::Emphasis { level: 1 },
            NodeValue::Strong => NodeKind::Emphasis { level: 2 },
            NodeValue::Strikethrough => NodeKind::Strikethrough,
            NodeValue::Code(code) => {
                return Ok(vec![Node::new(NodeKind::CodeSpan {
                    literal: code.literal.clone(),
                })]);
            }
            NodeValue::Link(link) => match autolink_label(node, link) {
                Some(label) => {
                    return Ok(vec![Node::new(NodeKind::AutoLink {
                        url: link.url.clone(),
                        label,
                    })]);
                }
                None => NodeKind::Link {
                    destination: link.url.clone(),
                    title: link.title.clone(),
                },
            },
            // Alt text is not carried by the storage image macro
            NodeValue::Image(link) => {
                return Ok(vec![Node::new(NodeKind::Image {
                    destination: link.url.clone(),
                })]);
            }
            NodeValue::Text(text) => return Ok(vec![Node::text(text)]),
            NodeValue::HtmlInline(_) => return Ok(vec![Node::new(NodeKind::RawHtml)]),
            NodeValue::Table(_) => NodeKind::Table,
            NodeValue::TableRow(true) => NodeKind::TableHeader,
            NodeValue::TableRow(false) => NodeKind::TableRow,
            NodeValue::TableCell => NodeKind::TableCell {
                alignment: cell_alignment(node),
            },
            NodeValue::SoftBreak | NodeValue::LineBreak => {
                let mut nodes = Vec::new();
                fold_line_break(&mut nodes, matches!(node.data.borrow().value, NodeValue::LineBreak));
                return Ok(nodes);
            }
            // Anything outside the supported set contributes its children
            _ => return self.convert_children(node, depth, false),
        };

        let children = match kind {
            NodeKind::ListItem => self.convert_children(node, depth, parent_list_is_tight(node))?,
            _ => self.convert_children(node, depth, false)?,
        };

        Ok(vec![Node::with_children(kind, children)])
    }

    /// Build a list item whose first paragraph starts with a checkbox
    fn task_item<'a>(&self, node: &'a AstNode<'a>, checked: bool, depth: usize) -> Result<Node> {
        let mut children = self.convert_children(node, depth, parent_list_is_tight(node))?;
        let checkbox = Node::new(NodeKind::TaskCheckBox { checked });

        match children.first_mut() {
            Some(first) if matches!(first.kind, NodeKind::Paragraph | NodeKind::TextBlock) => {
                if let Some(Node {
                    kind: NodeKind::Text { value, .. },
                    ..
                }) = first.children.first_mut()
                {
                    *value = value.trim_start().to_string();
                }
                first.children.insert(0, checkbox);
            }
            _ => children.insert(0, checkbox),
        }

        Ok(Node::with_children(NodeKind::ListItem, children))
    }
}

/// Attach a line break to the preceding text node, or add an empty one
fn fold_line_break(nodes: &mut Vec<Node>, hard: bool) {
    if let Some(Node {
        kind:
            NodeKind::Text {
                hard_line_break,
                soft_line_break,
                ..
            },
        ..
    }) = nodes.last_mut()
    {
        if hard {
            *hard_line_break = true;
        } else {
            *soft_line_break = true;
        }
        return;
    }

    nodes.push(Node::new(NodeKind::Text {
        value: String::new(),
        hard_line_break: hard,
        soft_line_break: !hard,
    }));
}

fn parent_list_is_tight<'a>(item: &'a AstNode<'a>) -> bool {
    item.parent().is_some_and(|parent| match &parent.data.borrow().value {
        NodeValue::List(list) => list.tight,
        _ => false,
    })
}

/// Label of a link whose only text is its own URL
fn autolink_label<'a>(node: &'a AstNode<'a>, link: &NodeLink) -> Option<String> {
    let mut children = node.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    let label = match &only.data.borrow().value {
        NodeValue::Text(text) => text.clone(),
        _ => return None,
    };

    let is_self_label =
        link.url == label || link.url.strip_prefix("mailto:") == Some(label.as_str());
    is_self_label.then_some(label)
}

fn cell_alignment<'a>(cell: &'a AstNode<'a>) -> Alignment {
    let mut column = 0;
    let mut current = cell.previous_sibling();
    while let Some(sibling) = current {
        column += 1;
        current = sibling.previous_sibling();
    }

    let Some(table) = cell.parent().and_then(|row| row.parent()) else {
        return Alignment::None;
    };

    let alignment = match &table.data.borrow().value {
        NodeValue::Table(table) => table
            .alignments
            .get(column)
            .copied()
            .map(Alignment::from)
            .unwrap_or_default(),
        _ => Alignment::None,
    };
    alignment
}
