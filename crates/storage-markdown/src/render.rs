//! Storage Format rendering.
//!
//! Walks a parsed [`Node`] tree and writes Storage Format XHTML: plain XHTML
//! for the common block and inline elements, structured macros for code
//! blocks, and the task-list macro for GFM task lists.

use crate::escape::{escape_url, escape_xml};
use crate::markdown::{Node, NodeKind};
use crate::options::StorageOptions;

/// Render a parsed Markdown document as Storage Format
pub fn render(document: &Node, options: &StorageOptions) -> String {
    let mut renderer = Renderer {
        options,
        out: String::with_capacity(4096),
    };
    renderer.render_node(document, Scope::Block);
    renderer.out
}

/// What the parent of the node being rendered is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Block,
    TaskList,
    TaskItem,
    TableHeader,
}

struct Renderer<'a> {
    options: &'a StorageOptions,
    out: String,
}

impl Renderer<'_> {
    fn render_children(&mut self, node: &Node, scope: Scope) {
        for child in &node.children {
            self.render_node(child, scope);
        }
    }

    fn render_node(&mut self, node: &Node, scope: Scope) {
        match &node.kind {
            NodeKind::Document => self.render_children(node, Scope::Block),

            NodeKind::Heading { level } => {
                let level = (*level).clamp(1, 6);
                self.out.push_str(&format!("<h{level}>"));
                self.render_children(node, Scope::Block);
                self.out.push_str(&format!("</h{level}>\n"));
            }

            // Task bodies carry their content without a paragraph wrapper
            NodeKind::Paragraph if scope == Scope::TaskItem => {
                self.render_children(node, Scope::Block)
            }

            NodeKind::Paragraph => {
                self.out.push_str("<p>");
                self.render_children(node, Scope::Block);
                self.out.push_str("</p>\n");
            }

            NodeKind::TextBlock => {
                self.render_children(node, Scope::Block);
                self.out.push('\n');
            }

            NodeKind::List { ordered, start, .. } => {
                if is_task_list(node) {
                    self.out.push_str("<ac:task-list>\n");
                    self.render_children(node, Scope::TaskList);
                    self.out.push_str("</ac:task-list>\n");
                } else {
                    let tag = if *ordered { "ol" } else { "ul" };
                    if *ordered && *start != 1 {
                        self.out.push_str(&format!("<ol start=\"{start}\">\n"));
                    } else {
                        self.out.push_str(&format!("<{tag}>\n"));
                    }
                    self.render_children(node, Scope::Block);
                    self.out.push_str(&format!("</{tag}>\n"));
                }
            }

            NodeKind::ListItem if scope == Scope::TaskList => {
                let status = if task_checkbox(node) == Some(true) {
                    "complete"
                } else {
                    "incomplete"
                };
                self.out.push_str("<ac:task>\n");
                self.out
                    .push_str(&format!("<ac:task-status>{status}</ac:task-status>\n"));
                self.out.push_str("<ac:task-body>");
                self.render_children(node, Scope::TaskItem);
                self.out.push_str("</ac:task-body>\n</ac:task>\n");
            }

            NodeKind::ListItem => {
                self.out.push_str("<li>");
                self.render_children(node, Scope::Block);
                self.out.push_str("</li>\n");
            }

            // Expressed through the enclosing task's status
            NodeKind::TaskCheckBox { .. } => {}

            NodeKind::CodeBlock {
                language, literal, ..
            } => {
                let language = language
                    .as_deref()
                    .filter(|l| !l.is_empty())
                    .unwrap_or(&self.options.default_language);
                self.out.push_str(
                    "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">",
                );
                self.out.push_str(&escape_xml(language));
                self.out.push_str("</ac:parameter><ac:plain-text-body><![CDATA[");
                self.out.push_str(&escape_cdata(literal));
                self.out
                    .push_str("]]></ac:plain-text-body></ac:structured-macro>\n");
            }

            // Embedded HTML would be live on the wiki
            NodeKind::HtmlBlock => self.out.push_str("<!-- raw HTML omitted -->\n"),
            NodeKind::RawHtml => {}

            NodeKind::Blockquote => {
                self.out.push_str("<blockquote>\n");
                self.render_children(node, Scope::Block);
                self.out.push_str("</blockquote>\n");
            }

            NodeKind::ThematicBreak => self.out.push_str("<hr />\n"),

            NodeKind::Emphasis { level } => {
                let tag = if *level >= 2 { "strong" } else { "em" };
                self.out.push_str(&format!("<{tag}>"));
                self.render_children(node, Scope::Block);
                self.out.push_str(&format!("</{tag}>"));
            }

            NodeKind::CodeSpan { literal } => {
                self.out.push_str("<code>");
                self.out.push_str(&escape_xml(literal));
                self.out.push_str("</code>");
            }

            NodeKind::Link { destination, title } => {
                self.out.push_str("<a href=\"");
                self.out.push_str(&escape_xml(&escape_url(destination)));
                self.out.push('"');
                if !title.is_empty() {
                    self.out.push_str(" title=\"");
                    self.out.push_str(&escape_xml(title));
                    self.out.push('"');
                }
                self.out.push('>');
                self.render_children(node, Scope::Block);
                self.out.push_str("</a>");
            }

            NodeKind::Image { destination } => {
                self.out.push_str("<ac:image><ri:url ri:value=\"");
                self.out.push_str(&escape_xml(&escape_url(destination)));
                self.out.push_str("\" /></ac:image>");
            }

            NodeKind::AutoLink { url, label } => {
                self.out.push_str("<a href=\"");
                self.out.push_str(&escape_xml(&escape_url(url)));
                self.out.push_str("\">");
                self.out.push_str(&escape_xml(label));
                self.out.push_str("</a>");
            }

            NodeKind::Text {
                value,
                hard_line_break,
                soft_line_break,
            } => {
                self.out.push_str(&escape_xml(value));
                if *hard_line_break {
                    self.out.push_str("<br />\n");
                } else if *soft_line_break {
                    self.out.push('\n');
                }
            }

            NodeKind::Table => {
                self.out.push_str("<table><tbody>\n");
                self.render_children(node, Scope::Block);
                self.out.push_str("</tbody></table>\n");
            }

            NodeKind::TableHeader => {
                self.out.push_str("<tr>");
                self.render_children(node, Scope::TableHeader);
                self.out.push_str("</tr>\n");
            }

            NodeKind::TableRow => {
                self.out.push_str("<tr>");
                self.render_children(node, Scope::Block);
                self.out.push_str("</tr>\n");
            }

            NodeKind::TableCell { alignment } => {
                let tag = if scope == Scope::TableHeader { "th" } else { "td" };
                self.out.push('<');
                self.out.push_str(tag);
                if let Some(align) = alignment.as_attribute() {
                    self.out.push_str(&format!(" align=\"{align}\""));
                }
                self.out.push('>');
                self.render_children(node, Scope::Block);
                self.out.push_str(&format!("</{tag}>"));
            }

            NodeKind::Strikethrough => {
                self.out.push_str("<del>");
                self.render_children(node, Scope::Block);
                self.out.push_str("</del>");
            }
        }
    }
}

/// A list is a task list when any of its items holds a checkbox, either
/// directly or as the first level inside a paragraph.
fn is_task_list(list: &Node) -> bool {
    list.children
        .iter()
        .filter(|item| item.kind == NodeKind::ListItem)
        .any(|item| task_checkbox(item).is_some())
}

/// Checked state of the checkbox in a list item, if it has one
fn task_checkbox(item: &Node) -> Option<bool> {
    item.children.iter().find_map(|child| match &child.kind {
        NodeKind::TaskCheckBox { checked } => Some(*checked),
        NodeKind::Paragraph | NodeKind::TextBlock => {
            child.children.iter().find_map(|inner| match inner.kind {
                NodeKind::TaskCheckBox { checked } => Some(checked),
                _ => None,
            })
        }
        _ => None,
    })
}

/// Split CDATA terminators so the section cannot be closed early
fn escape_cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}
