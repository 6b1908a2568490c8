//! Macro preprocessing.
//!
//! Rewrites the Storage Format macros this crate understands (code blocks,
//! task lists and images) into plain HTML before the document reaches the
//! HTML-to-Markdown transducer. Markup that does not match the closed macro
//! grammar is passed through untouched.

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::escape::escape_xml;

static CODE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<ac:structured-macro\b[^>]*?\bac:name\s*=\s*["']code["'][^>]*>\s*((?:<ac:parameter\b[^>]*>.*?</ac:parameter>\s*)*)(?:<ac:plain-text-body>(.*?)</ac:plain-text-body>\s*)?</ac:structured-macro>"#,
    )
    .unwrap()
});

static PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<ac:parameter\b[^>]*?\bac:name\s*=\s*["']([^"']*)["'][^>]*>(.*?)</ac:parameter>"#)
        .unwrap()
});

static CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

static TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<ac:task>.*?<ac:task-status>\s*(.*?)\s*</ac:task-status>.*?<ac:task-body>(.*?)</ac:task-body>\s*</ac:task>",
    )
    .unwrap()
});

static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<ac:image\b[^>]*>\s*<ri:(?:url\s+ri:value|attachment\s+ri:filename)\s*=\s*"([^"]*)"[^>]*?/>\s*</ac:image>"#,
    )
    .unwrap()
});

const TASK_LIST_OPEN: &str = "<ac:task-list>";
const TASK_LIST_CLOSE: &str = "</ac:task-list>";

/// Rewrite every recognized macro in a Storage Format document
pub fn preprocess(storage: &str) -> String {
    // Code first: CDATA bodies may contain text that looks like other macros
    let html = rewrite_code_macros(storage);
    let html = rewrite_task_lists(&html);
    rewrite_images(&html)
}

/// `<ac:structured-macro ac:name="code">` to `<pre><code class="language-X">`
pub fn rewrite_code_macros(input: &str) -> String {
    CODE_MACRO
        .replace_all(input, |caps: &Captures| {
            let parameters = parse_parameters(caps.get(1).map_or("", |m| m.as_str()));
            let body = code_body(caps.get(2).map_or("", |m| m.as_str()));

            match parameters
                .get("language")
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
            {
                Some(language) => format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    language.replace('"', "&quot;"),
                    body
                ),
                None => format!("<pre><code>{body}</code></pre>"),
            }
        })
        .into_owned()
}

fn parse_parameters(parameters: &str) -> IndexMap<String, String> {
    PARAMETER
        .captures_iter(parameters)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Build the HTML body of a code macro.
///
/// CDATA sections are concatenated and entity-escaped so the code stays
/// inert text; anything between them is already escaped markup and is kept.
fn code_body(body: &str) -> String {
    let mut html = String::with_capacity(body.len());
    let mut last = 0;

    for caps in CDATA.captures_iter(body) {
        let (Some(section), Some(content)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        html.push_str(&body[last..section.start()]);
        html.push_str(&escape_xml(content.as_str()));
        last = section.end();
    }
    html.push_str(&body[last..]);

    html
}

/// `<ac:task-list>` to `<ul>` with `[x]` / `[ ]` items.
///
/// Lists are rewritten innermost first so a nested list is already plain
/// HTML by the time its parent task body is embedded.
pub fn rewrite_task_lists(input: &str) -> String {
    let mut output = input.to_string();
    let mut search_end = output.len();

    while let Some(open) = output[..search_end].rfind(TASK_LIST_OPEN) {
        search_end = open;

        let Some(close) = output[open..].find(TASK_LIST_CLOSE).map(|i| open + i) else {
            debug!("leaving unterminated task list at byte {open} untouched");
            continue;
        };

        let items = render_task_items(&output[open + TASK_LIST_OPEN.len()..close]);
        output.replace_range(open..close + TASK_LIST_CLOSE.len(), &items);
    }

    output
}

fn render_task_items(inner: &str) -> String {
    let mut html = String::from("<ul>");

    for caps in TASK.captures_iter(inner) {
        let marker = if &caps[1] == "complete" { "[x]" } else { "[ ]" };
        html.push_str("<li>");
        html.push_str(marker);
        html.push(' ');
        html.push_str(strip_paragraph(&caps[2]));
        html.push_str("</li>");
    }

    html.push_str("</ul>");
    html
}

fn strip_paragraph(body: &str) -> &str {
    let body = body.trim();
    let body = body.strip_prefix("<p>").unwrap_or(body);
    let body = body.strip_suffix("</p>").unwrap_or(body);
    body.trim()
}

/// `<ac:image>` to `<img src="…" alt="">`
pub fn rewrite_images(input: &str) -> String {
    IMAGE
        .replace_all(input, "<img src=\"$1\" alt=\"\">")
        .into_owned()
}
