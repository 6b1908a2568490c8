//! Markdown AST serialization
//!
//! Converts Markdown AST nodes into Markdown text.

use crate::ast::{Block, Inline, ListItem};
use crate::options::{HeadingStyle, Options};

/// Serialize a block to Markdown string
pub fn serialize(block: &Block, options: &Options) -> String {
    let mut output = String::with_capacity(4096);
    serialize_block(block, options, &mut output);

    // Every block ends with its own blank-line separator, so only the outer
    // newlines need trimming. Code bodies must never be collapsed.
    output.trim_matches('\n').to_string()
}

fn serialize_block(block: &Block, options: &Options, out: &mut String) {
    match block {
        Block::Document(blocks) => serialize_blocks(blocks, options, out),

        Block::Heading { level, content } => serialize_heading(*level, content, options, out),

        Block::Paragraph(inlines) => {
            let start_len = out.len();
            serialize_inlines(inlines, options, out);
            if out[start_len..].trim().is_empty() {
                out.truncate(start_len);
            } else {
                out.push_str("\n\n");
            }
        }

        Block::BlockQuote(blocks) => {
            let start_len = out.len();
            serialize_blocks(blocks, options, out);

            // Process the content we just wrote to add > prefixes
            let content = out[start_len..].trim_end().to_string();
            out.truncate(start_len);

            for (i, line) in content.split('\n').enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push('>');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }

        Block::List {
            ordered,
            start,
            items,
        } => serialize_list(*ordered, *start, items, options, out),

        Block::CodeBlock { language, code } => {
            serialize_code_block(language.as_deref(), code, options, out)
        }

        Block::ThematicBreak => {
            out.push_str(&options.hr);
            out.push_str("\n\n");
        }

        Block::Table { headers, rows } => serialize_table(headers, rows, options, out),
    }
}

fn serialize_blocks(blocks: &[Block], options: &Options, out: &mut String) {
    for block in blocks {
        if !block.is_blank() {
            serialize_block(block, options, out);
        }
    }
}

fn serialize_heading(level: u8, content: &[Inline], options: &Options, out: &mut String) {
    let start_len = out.len();
    serialize_inlines(content, options, out);

    if out[start_len..].trim().is_empty() {
        out.truncate(start_len);
        return;
    }

    // Headings are single-line constructs
    let text = out[start_len..].replace("  \n", " ").replace('\n', " ");
    out.truncate(start_len);

    match options.heading_style {
        HeadingStyle::Setext if level <= 2 => {
            let underline = if level == 1 { '=' } else { '-' };
            out.push_str(&text);
            out.push('\n');
            out.extend(std::iter::repeat(underline).take(text.chars().count()));
            out.push_str("\n\n");
        }
        _ => {
            out.extend(std::iter::repeat('#').take(level.clamp(1, 6) as usize));
            out.push(' ');
            out.push_str(&text);
            out.push_str("\n\n");
        }
    }
}

fn serialize_list(ordered: bool, start: u32, items: &[ListItem], options: &Options, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", u64::from(start) + i as u64)
        } else {
            format!("{} ", options.bullet_list_marker)
        };

        let mut body = String::new();
        serialize_list_item(item, options, &mut body);

        // Continuation lines line up with the first character after the marker
        let continuation = " ".repeat(marker.len());

        out.push_str(&marker);
        for (n, line) in body.trim_end_matches('\n').split('\n').enumerate() {
            if n > 0 {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&continuation);
                }
            }
            out.push_str(line);
        }
        out.push('\n');
    }

    out.push('\n');
}

fn serialize_list_item(item: &ListItem, options: &Options, out: &mut String) {
    let blocks: Vec<&Block> = item.content.iter().filter(|b| !b.is_blank()).collect();

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Paragraph(inlines) => {
                serialize_inlines(inlines, options, out);
                if i + 1 < blocks.len() {
                    out.push_str("\n\n");
                }
            }
            _ => serialize_block(block, options, out),
        }
    }
}

fn serialize_code_block(language: Option<&str>, code: &str, options: &Options, out: &mut String) {
    let fence_len = (longest_run(code, options.fence_char) + 1).max(3);
    let fence: String = std::iter::repeat(options.fence_char).take(fence_len).collect();

    out.push_str(&fence);
    out.push_str(language.unwrap_or(""));
    out.push('\n');
    if !code.is_empty() {
        out.push_str(code.strip_suffix('\n').unwrap_or(code));
        out.push('\n');
    }
    out.push_str(&fence);
    out.push_str("\n\n");
}

/// Length of the longest run of `c` in `text`
fn longest_run(text: &str, c: char) -> usize {
    text.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

fn serialize_table(headers: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>], options: &Options, out: &mut String) {
    if headers.is_empty() {
        return;
    }

    let columns = rows
        .iter()
        .map(|row| row.len())
        .fold(headers.len(), usize::max);

    serialize_table_row(headers, columns, options, out);

    out.push('|');
    for _ in 0..columns {
        out.push_str(" --- |");
    }
    out.push('\n');

    for row in rows {
        serialize_table_row(row, columns, options, out);
    }

    out.push('\n');
}

fn serialize_table_row(cells: &[Vec<Inline>], columns: usize, options: &Options, out: &mut String) {
    out.push('|');
    for i in 0..columns {
        out.push(' ');
        if let Some(cell) = cells.get(i) {
            let mut text = String::new();
            serialize_inlines(&escape_cell_pipes(cell), options, &mut text);
            // Table rows cannot span lines
            out.push_str(text.replace("  \n", " ").replace('\n', " ").trim());
        }
        out.push_str(" |");
    }
    out.push('\n');
}

/// GFM splits table cells on `|` even inside code spans
fn escape_cell_pipes(cell: &[Inline]) -> Vec<Inline> {
    cell.iter()
        .map(|inline| match inline {
            Inline::Code(code) => Inline::Code(code.replace('|', "\\|")),
            Inline::Strong(content) => Inline::Strong(escape_cell_pipes(content)),
            Inline::Emphasis(content) => Inline::Emphasis(escape_cell_pipes(content)),
            Inline::Strikethrough(content) => Inline::Strikethrough(escape_cell_pipes(content)),
            Inline::Link {
                content,
                url,
                title,
            } => Inline::Link {
                content: escape_cell_pipes(content),
                url: url.clone(),
                title: title.clone(),
            },
            other => other.clone(),
        })
        .collect()
}

fn serialize_inlines(inlines: &[Inline], options: &Options, out: &mut String) {
    for inline in inlines {
        serialize_inline(inline, options, out);
    }
}

fn serialize_inline(inline: &Inline, options: &Options, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(text),

        Inline::Strong(content) => {
            serialize_delimited(content, &options.strong_delimiter, options, out)
        }

        Inline::Emphasis(content) => {
            serialize_delimited(content, &options.em_delimiter.to_string(), options, out)
        }

        Inline::Strikethrough(content) => {
            serialize_delimited(content, &options.strike_delimiter, options, out)
        }

        Inline::Code(code) => serialize_code_span(code, out),

        Inline::Link {
            content,
            url,
            title,
        } => {
            out.push('[');
            serialize_inlines(content, options, out);
            out.push_str("](");
            push_destination(url, out);
            if let Some(t) = title {
                out.push_str(" \"");
                out.push_str(&t.replace('"', "\\\""));
                out.push('"');
            }
            out.push(')');
        }

        Inline::Image { alt, url } => {
            out.push_str("![");
            out.push_str(&alt.replace('[', "\\[").replace(']', "\\]"));
            out.push_str("](");
            push_destination(url, out);
            out.push(')');
        }

        Inline::LineBreak => out.push_str("  \n"),
    }
}

/// Wrap content in a delimiter pair, keeping surrounding whitespace outside
/// the delimiters so the emphasis stays flanking.
fn serialize_delimited(content: &[Inline], delimiter: &str, options: &Options, out: &mut String) {
    let mut inner = String::new();
    serialize_inlines(content, options, &mut inner);

    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return;
    }

    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];

    out.push_str(leading);
    out.push_str(delimiter);
    out.push_str(trimmed);
    out.push_str(delimiter);
    out.push_str(trailing);
}

fn serialize_code_span(code: &str, out: &mut String) {
    if code.is_empty() {
        return;
    }

    let backticks = "`".repeat(longest_run(code, '`') + 1);

    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());

    out.push_str(&backticks);
    if padded {
        out.push(' ');
    }
    out.push_str(code);
    if padded {
        out.push(' ');
    }
    out.push_str(&backticks);
}

fn push_destination(url: &str, out: &mut String) {
    let opens = url.matches('(').count();
    let closes = url.matches(')').count();
    if url.contains(' ') || opens != closes {
        out.push('<');
        out.push_str(url);
        out.push('>');
    } else {
        out.push_str(url);
    }
}
