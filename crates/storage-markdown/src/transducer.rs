//! HTML to Markdown transduction.
//!
//! Parses an HTML fragment with scraper and builds the Markdown AST from
//! `storage-markdown-core`, which is then serialized with the configured
//! [`Options`]. Text is escaped conservatively; the normalizer removes the
//! escapes that turn out not to be needed.

use scraper::{ElementRef, Html, Node};
use storage_markdown_core::{inlines_are_blank, serialize, trim_inlines, Block, Inline, ListItem, Options};

use crate::error::{ConvertError, Result};
use crate::escape::{collapse_whitespace, escape_markdown, is_block, is_skipped};

/// Convert an HTML fragment to Markdown.
///
/// Fails only when elements nest deeper than `max_depth`.
pub fn transduce(html: &str, options: &Options, max_depth: usize) -> Result<String> {
    let ast = to_ast(html, max_depth)?;
    Ok(serialize(&ast, options))
}

/// Convert an HTML fragment to a Markdown AST document
pub fn to_ast(html: &str, max_depth: usize) -> Result<Block> {
    let fragment = Html::parse_fragment(html);
    let transducer = Transducer { max_depth };
    let blocks = transducer.convert_children(fragment.root_element(), 0)?;
    Ok(Block::Document(blocks))
}

struct Transducer {
    max_depth: usize,
}

impl Transducer {
    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(ConvertError::Transducer(format!(
                "HTML nesting exceeds {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Convert the children of a block container.
    ///
    /// Runs of inline content between block elements become paragraphs.
    fn convert_children(&self, element: ElementRef, depth: usize) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut run = Vec::new();

        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut run, &text.text),
                Node::Element(el) => {
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if is_skipped(el.name()) {
                        continue;
                    }
                    if is_block(el.name()) || has_block_descendant(child_element) {
                        flush_paragraph(&mut run, &mut blocks);
                        self.convert_block(child_element, depth + 1, &mut blocks)?;
                    } else {
                        self.convert_inline(child_element, depth + 1, &mut run)?;
                    }
                }
                _ => {}
            }
        }

        flush_paragraph(&mut run, &mut blocks);
        Ok(blocks)
    }

    fn convert_block(&self, element: ElementRef, depth: usize, out: &mut Vec<Block>) -> Result<()> {
        self.check_depth(depth)?;
        let tag = element.value().name().to_ascii_lowercase();

        match tag.as_str() {
            "p" => {
                let inlines = tidy_inlines(self.collect_inlines(element, depth)?);
                if !inlines_are_blank(&inlines) {
                    out.push(Block::Paragraph(inlines));
                }
            }

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse().unwrap_or(1);
                let content = tidy_inlines(self.collect_inlines(element, depth)?);
                if !inlines_are_blank(&content) {
                    out.push(Block::Heading { level, content });
                }
            }

            "blockquote" => {
                let blocks = self.convert_children(element, depth)?;
                if !blocks.is_empty() {
                    out.push(Block::BlockQuote(blocks));
                }
            }

            "ul" | "ol" => {
                if let Some(list) = self.convert_list(element, tag == "ol", depth)? {
                    out.push(list);
                }
            }

            "pre" => out.push(convert_code_block(element)),

            "hr" => out.push(Block::ThematicBreak),

            "table" => {
                let mut rows = Vec::new();
                self.collect_rows(element, depth, &mut rows)?;
                if !rows.is_empty() {
                    let headers = rows.remove(0);
                    out.push(Block::Table { headers, rows });
                }
            }

            // Containers, stray list items and unknown elements with block content
            _ => out.extend(self.convert_children(element, depth)?),
        }

        Ok(())
    }

    fn convert_list(&self, element: ElementRef, ordered: bool, depth: usize) -> Result<Option<Block>> {
        let mut items: Vec<ListItem> = Vec::new();

        for child in element.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "li" => items.push(ListItem::new(self.convert_children(child, depth + 1)?)),
                // A list placed directly inside a list belongs to the previous item
                "ul" | "ol" => {
                    let mut nested = Vec::new();
                    self.convert_block(child, depth + 1, &mut nested)?;
                    match items.last_mut() {
                        Some(last) => last.content.extend(nested),
                        None => items.push(ListItem::new(nested)),
                    }
                }
                _ => {}
            }
        }

        if items.is_empty() {
            return Ok(None);
        }

        let start = if ordered {
            element
                .value()
                .attr("start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1)
        } else {
            1
        };

        Ok(Some(Block::List {
            ordered,
            start,
            items,
        }))
    }

    /// Collect table rows in document order, descending into row groups
    fn collect_rows(
        &self,
        element: ElementRef,
        depth: usize,
        rows: &mut Vec<Vec<Vec<Inline>>>,
    ) -> Result<()> {
        self.check_depth(depth)?;

        for child in element.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, depth + 1, rows)?,
                "tr" => {
                    let mut row = Vec::new();
                    for cell in child.children().filter_map(ElementRef::wrap) {
                        if matches!(cell.value().name(), "th" | "td") {
                            row.push(tidy_inlines(self.collect_inlines(cell, depth + 2)?));
                        }
                    }
                    if !row.is_empty() {
                        rows.push(row);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn collect_inlines(&self, element: ElementRef, depth: usize) -> Result<Vec<Inline>> {
        let mut inlines = Vec::new();

        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut inlines, &text.text),
                Node::Element(el) => {
                    if is_skipped(el.name()) {
                        continue;
                    }
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.convert_inline(child_element, depth + 1, &mut inlines)?;
                    }
                }
                _ => {}
            }
        }

        Ok(inlines)
    }

    fn convert_inline(&self, element: ElementRef, depth: usize, out: &mut Vec<Inline>) -> Result<()> {
        self.check_depth(depth)?;
        let tag = element.value().name().to_ascii_lowercase();

        match tag.as_str() {
            "strong" | "b" => self.wrap_inlines(element, depth, Inline::Strong, out)?,
            "em" | "i" => self.wrap_inlines(element, depth, Inline::Emphasis, out)?,
            "del" | "s" | "strike" => self.wrap_inlines(element, depth, Inline::Strikethrough, out)?,

            "code" | "kbd" | "samp" | "tt" | "pre" => {
                let code: String = element.text().collect();
                if !code.is_empty() {
                    out.push(Inline::Code(code.replace('\n', " ")));
                }
            }

            "a" => {
                let content = self.collect_inlines(element, depth)?;
                let href = element
                    .value()
                    .attr("href")
                    .map(str::trim)
                    .filter(|h| !h.is_empty());

                match href {
                    Some(href) => {
                        let content = if inlines_are_blank(&content) {
                            vec![Inline::Text(escape_markdown(href))]
                        } else {
                            content
                        };
                        let title = element
                            .value()
                            .attr("title")
                            .filter(|t| !t.is_empty())
                            .map(str::to_string);
                        out.push(Inline::Link {
                            content,
                            url: href.to_string(),
                            title,
                        });
                    }
                    // No link target, just keep the content
                    None => out.extend(content),
                }
            }

            "img" => {
                if let Some(src) = element.value().attr("src").filter(|s| !s.is_empty()) {
                    out.push(Inline::Image {
                        alt: element.value().attr("alt").unwrap_or("").to_string(),
                        url: src.to_string(),
                    });
                }
            }

            "br" => out.push(Inline::LineBreak),

            // Block content inside an inline context (table cells) is flattened
            _ if is_block(&tag) => {
                out.push(Inline::Text(" ".to_string()));
                out.extend(self.collect_inlines(element, depth)?);
                out.push(Inline::Text(" ".to_string()));
            }

            _ => out.extend(self.collect_inlines(element, depth)?),
        }

        Ok(())
    }

    fn wrap_inlines(
        &self,
        element: ElementRef,
        depth: usize,
        wrap: fn(Vec<Inline>) -> Inline,
        out: &mut Vec<Inline>,
    ) -> Result<()> {
        let inner = self.collect_inlines(element, depth)?;
        if inlines_are_blank(&inner) {
            out.extend(inner);
        } else {
            out.push(wrap(inner));
        }
        Ok(())
    }
}

fn convert_code_block(pre: ElementRef) -> Block {
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "code");

    match code {
        Some(code) => Block::CodeBlock {
            language: code_language(code).or_else(|| code_language(pre)),
            code: code.text().collect(),
        },
        None => Block::CodeBlock {
            language: code_language(pre),
            code: pre.text().collect(),
        },
    }
}

/// Language from a `language-X` (or `lang-X`) class
fn code_language(element: ElementRef) -> Option<String> {
    element
        .value()
        .attr("class")?
        .split_whitespace()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

fn has_block_descendant(element: ElementRef) -> bool {
    element
        .descendants()
        .skip(1)
        .any(|node| node.value().as_element().is_some_and(|el| is_block(el.name())))
}

fn push_text(inlines: &mut Vec<Inline>, text: &str) {
    let collapsed = collapse_whitespace(text);
    if !collapsed.is_empty() {
        inlines.push(Inline::Text(escape_markdown(&collapsed)));
    }
}

/// Merge adjacent text, drop whitespace around hard breaks and trim the edges
fn tidy_inlines(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut tidy: Vec<Inline> = Vec::with_capacity(inlines.len());

    for inline in inlines {
        match inline {
            Inline::Text(text) => match tidy.last_mut() {
                Some(Inline::Text(prev)) => {
                    if prev.ends_with(' ') {
                        prev.push_str(text.trim_start());
                    } else {
                        prev.push_str(&text);
                    }
                }
                Some(Inline::LineBreak) => {
                    let text = text.trim_start();
                    if !text.is_empty() {
                        tidy.push(Inline::Text(text.to_string()));
                    }
                }
                _ => tidy.push(Inline::Text(text)),
            },
            Inline::LineBreak => {
                if let Some(Inline::Text(prev)) = tidy.last_mut() {
                    prev.truncate(prev.trim_end().len());
                    if prev.is_empty() {
                        tidy.pop();
                    }
                }
                tidy.push(Inline::LineBreak);
            }
            other => tidy.push(other),
        }
    }

    trim_inlines(&mut tidy);
    tidy
}

fn flush_paragraph(run: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    if run.is_empty() {
        return;
    }
    let inlines = tidy_inlines(std::mem::take(run));
    if !inlines_are_blank(&inlines) {
        blocks.push(Block::Paragraph(inlines));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_markdown(html: &str) -> String {
        transduce(html, &Options::default(), 64).unwrap()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(to_markdown("<h1>Title</h1>\n<p>Hello World</p>"), "# Title\n\nHello World");
    }

    #[test]
    fn test_strong_and_emphasis() {
        assert_eq!(
            to_markdown("<p><strong>bold</strong> and <em>italic</em></p>"),
            "**bold** and *italic*"
        );
        assert_eq!(
            to_markdown("<p><em><strong>bold italic</strong></em></p>"),
            "***bold italic***"
        );
    }

    #[test]
    fn test_strikethrough_and_code() {
        assert_eq!(
            to_markdown("<p><del>old</del> <code>a_b</code></p>"),
            "~~old~~ `a_b`"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(to_markdown("<p>my_var [x] 1 + 2</p>"), "my\\_var \\[x\\] 1 \\+ 2");
    }

    #[test]
    fn test_entities_are_decoded() {
        // `>` keeps a backslash until the normalizer sees where it stands
        assert_eq!(to_markdown("<p>a &lt; b &amp;&amp; c &gt; d</p>"), "a < b && c \\> d");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            to_markdown("<ul>\n<li>One\n</li>\n<li>Two\n</li>\n</ul>"),
            "- One\n- Two"
        );
        assert_eq!(
            to_markdown("<ol start=\"3\"><li>Three</li><li>Four</li></ol>"),
            "3. Three\n4. Four"
        );
    }

    #[test]
    fn test_nested_list_is_loose() {
        assert_eq!(
            to_markdown("<ul><li>a\n<ul><li>b</li></ul></li><li>c</li></ul>"),
            "- a\n\n  - b\n- c"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            to_markdown("<pre><code class=\"language-go\">x := 1\n</code></pre>"),
            "```go\nx := 1\n```"
        );
    }

    #[test]
    fn test_code_block_keeps_markup_characters() {
        assert_eq!(
            to_markdown("<pre><code>if a &lt; b &amp;&amp; c_d { return \"*\" }</code></pre>"),
            "```\nif a < b && c_d { return \"*\" }\n```"
        );
    }

    #[test]
    fn test_empty_code_block() {
        assert_eq!(
            to_markdown("<pre><code class=\"language-go\"></code></pre>"),
            "```go\n```"
        );
    }

    #[test]
    fn test_table() {
        let html = "<table><tbody>\n<tr><th align=\"left\">A</th><th>B</th></tr>\n\
                    <tr><td>1</td><td><p>2</p></td></tr>\n</tbody></table>";
        assert_eq!(to_markdown(html), "| A | B |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_table_without_header_cells() {
        let html = "<table><tr><td>x</td><td>y</td></tr><tr><td>1</td><td>2</td></tr></table>";
        assert_eq!(to_markdown(html), "| x | y |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            to_markdown("<p><a href=\"https://x.test\" title=\"T\">site</a> <img src=\"a.png\" alt=\"\"></p>"),
            "[site](https://x.test \"T\") ![](a.png)"
        );
    }

    #[test]
    fn test_trailing_backslash_before_markup() {
        assert_eq!(
            to_markdown("<p>C:\\<a href=\"https://x.test\">docs</a></p>"),
            "C:&#92;[docs](https://x.test)"
        );
        assert_eq!(to_markdown("<p>dir\\<strong>b</strong></p>"), "dir&#92;**b**");
    }

    #[test]
    fn test_line_break() {
        assert_eq!(to_markdown("<p>line<br />\nnext</p>"), "line  \nnext");
    }

    #[test]
    fn test_blockquote_and_rule() {
        assert_eq!(
            to_markdown("<blockquote>\n<p>quoted</p>\n</blockquote>\n<hr />"),
            "> quoted\n\n---"
        );
    }

    #[test]
    fn test_script_and_style_are_dropped() {
        assert_eq!(
            to_markdown("<p>Hi</p><script>alert(1)</script><style>p {}</style>"),
            "Hi"
        );
    }

    #[test]
    fn test_unknown_macro_keeps_text() {
        let html = "<ac:structured-macro ac:name=\"info\"><ac:rich-text-body><p>Careful</p>\
                    </ac:rich-text-body></ac:structured-macro>";
        assert_eq!(to_markdown(html), "Careful");
    }

    #[test]
    fn test_inline_run_next_to_block() {
        assert_eq!(to_markdown("<li>text<p>para</p></li>"), "text\n\npara");
    }

    #[test]
    fn test_depth_limit() {
        let html = "<div>".repeat(40) + "deep" + &"</div>".repeat(40);
        assert!(matches!(
            transduce(&html, &Options::default(), 16),
            Err(ConvertError::Transducer(_))
        ));
        assert_eq!(transduce(&html, &Options::default(), 64).unwrap(), "deep");
    }
}
