//! Escape and spacing normalization.
//!
//! The transducer escapes every character that could ever carry Markdown
//! meaning. This module removes the escapes that are not needed where they
//! stand, restores GFM task-list checkboxes and tightens nested lists. Fenced
//! code blocks and inline code spans are never modified.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Characters whose escape may have been doubled
pub const DOUBLE_ESCAPED: &[char] = &[
    '`', '*', '_', '[', ']', '#', '+', '-', '!', '|', '~', '>', '.', ')',
];

/// Characters whose escape is only needed in a few positions
pub const TRIPLE_ESCAPED: &[char] = &['#', '+', '-', '!', '|', '>', '.', ')'];

static CHECKBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t>]*(?:[-*+]|\d{1,9}[.)])[ \t]+)\\\[([ xX])\\?\]").unwrap()
});

static IDENTIFIER_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\p{L}\p{N}])\\_([\p{L}\p{N}])").unwrap());

static LOOSE_NESTED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n([ \t]+(?:[-*+]|1[.)])[ \t])").unwrap());

/// A piece of a Markdown document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    /// A fenced code block, fences included
    Code(&'a str),
}

/// Normalize transducer output
pub fn normalize(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len());

    for segment in split_fenced(markdown) {
        match segment {
            Segment::Code(code) => output.push_str(code),
            Segment::Prose(prose) => output.push_str(&normalize_prose(prose)),
        }
    }

    output
}

fn normalize_prose(text: &str) -> String {
    let text = collapse_escapes(text);
    let text = fix_checkboxes(&text);
    let text = unescape_identifier_underscores(&text);
    tighten_nested_lists(&text)
}

/// Split a document into prose and fenced code blocks.
///
/// Fences may sit behind blockquote markers, list markers or indentation.
/// An unclosed fence runs to the end of the document.
pub fn split_fenced(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut open: Option<(char, usize, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match open {
            None => {
                if let Some((fence_char, len)) = opening_fence(line) {
                    if prose_start < line_start {
                        segments.push(Segment::Prose(&text[prose_start..line_start]));
                    }
                    open = Some((fence_char, len, line_start));
                }
            }
            Some((fence_char, len, code_start)) => {
                if closes_fence(line, fence_char, len) {
                    segments.push(Segment::Code(&text[code_start..offset]));
                    prose_start = offset;
                    open = None;
                }
            }
        }
    }

    match open {
        Some((_, _, code_start)) => segments.push(Segment::Code(&text[code_start..])),
        None if prose_start < text.len() => segments.push(Segment::Prose(&text[prose_start..])),
        None => {}
    }

    segments
}

fn opening_fence(line: &str) -> Option<(char, usize)> {
    let content = strip_container_prefix(line.trim_end_matches(['\n', '\r']));
    let fence_char = content.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = content.chars().take_while(|&c| c == fence_char).count();

    if len < 3 {
        return None;
    }
    // A backtick fence cannot carry backticks in its info string
    if fence_char == '`' && content[len..].contains('`') {
        return None;
    }
    Some((fence_char, len))
}

fn closes_fence(line: &str, fence_char: char, len: usize) -> bool {
    let content = line.trim().trim_start_matches(['>', ' ', '\t']);
    let run = content.chars().take_while(|&c| c == fence_char).count();
    run >= len && content[run..].trim().is_empty()
}

/// Strip indentation, blockquote markers and list markers from a line
fn strip_container_prefix(line: &str) -> &str {
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix('>') {
            rest = after;
        } else if let Some(after) = strip_list_marker(trimmed) {
            rest = after;
        } else {
            return trimmed;
        }
    }
}

fn strip_list_marker(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();

    let marker_len = match (digits, bytes.get(digits)) {
        (1..=9, Some(b'.' | b')')) => digits + 1,
        (0, Some(b'-' | b'*' | b'+')) => 1,
        _ => return None,
    };

    let rest = &line[marker_len..];
    (rest.is_empty() || rest.starts_with([' ', '\t'])).then_some(rest)
}

/// Byte ranges of the inline code spans in `text`
fn code_span_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let preceding_backslashes = bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count();
        if preceding_backslashes % 2 == 1 {
            i += 1;
            continue;
        }

        let open_len = backtick_run(bytes, i);
        let mut j = i + open_len;
        let mut close = None;

        while j < bytes.len() {
            if bytes[j] == b'`' {
                let len = backtick_run(bytes, j);
                if len == open_len {
                    close = Some(j + len);
                    break;
                }
                j += len;
            } else if text[j..].starts_with("\n\n") {
                // Code spans end with their paragraph
                break;
            } else {
                j += 1;
            }
        }

        match close {
            Some(end) => {
                ranges.push(i..end);
                i = end;
            }
            None => i += open_len,
        }
    }

    ranges
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

/// Collapse doubled escapes and drop single escapes that are not needed.
///
/// Exactly two backslashes before a character of [`DOUBLE_ESCAPED`] become
/// one. A single backslash before a character of [`TRIPLE_ESCAPED`] is
/// removed unless the character would otherwise start a block construct or
/// an image, close an ATX heading or delimit a table cell.
pub fn collapse_escapes(text: &str) -> String {
    let spans = code_span_ranges(text);
    let mut next_span = 0;
    let mut line_start = 0;
    let mut scanned = 0;
    let mut output = String::with_capacity(text.len());
    let mut i = 0;

    while i < text.len() {
        while spans.get(next_span).is_some_and(|span| span.start < i) {
            next_span += 1;
        }
        if let Some(span) = spans.get(next_span).filter(|span| span.start == i) {
            output.push_str(&text[span.clone()]);
            i = span.end;
            next_span += 1;
            continue;
        }

        let rest = &text[i..];
        let run = rest.bytes().take_while(|&b| b == b'\\').count();

        if run == 0 {
            let Some(c) = rest.chars().next() else {
                break;
            };
            output.push(c);
            i += c.len_utf8();
            continue;
        }

        let target = i + run;
        let starts_code_span = spans.get(next_span).is_some_and(|span| span.start == target);

        if let Some(newline) = text[scanned..i].rfind('\n') {
            line_start = scanned + newline + 1;
        }
        scanned = i;

        match text[target..].chars().next() {
            Some(c) if run == 2 && DOUBLE_ESCAPED.contains(&c) && !starts_code_span => {
                output.push('\\');
            }
            Some(c)
                if run == 1
                    && TRIPLE_ESCAPED.contains(&c)
                    && !escape_required(&text[line_start..i], &text[target + c.len_utf8()..], c) => {}
            _ => output.push_str(&rest[..run]),
        }

        i = target;
    }

    output
}

/// Whether an escaped `c`, preceded on its line by `before` and followed by
/// `after`, needs its backslash
fn escape_required(before: &str, after: &str, c: char) -> bool {
    let content_before = strip_container_prefix(before);
    if content_before.is_empty() {
        return !matches!(c, '.' | ')');
    }

    match c {
        '!' => after.starts_with('['),
        '#' => {
            let line_rest = after.split('\n').next().unwrap_or_default();
            before.ends_with([' ', '\t'])
                && line_rest
                    .chars()
                    .all(|ch| matches!(ch, '#' | '\\' | ' ' | '\t' | '\r'))
        }
        '|' => content_before.starts_with('|'),
        // `1986\. A` would start an ordered list
        '.' | ')' => {
            content_before.len() <= 9
                && content_before.bytes().all(|b| b.is_ascii_digit())
                && (after.is_empty() || after.starts_with([' ', '\t', '\r', '\n']))
        }
        _ => false,
    }
}

/// Turn `\[ ]`, `\[x]` and `\[X]` after a list marker back into task syntax
pub fn fix_checkboxes(text: &str) -> String {
    CHECKBOX
        .replace_all(text, |caps: &Captures| {
            let mark = if &caps[2] == " " { " " } else { "x" };
            format!("{}[{}]", &caps[1], mark)
        })
        .into_owned()
}

/// Unescape underscores between two alphanumeric characters
pub fn unescape_identifier_underscores(text: &str) -> String {
    let mut current = text.to_string();

    loop {
        let spans = code_span_ranges(&current);
        let next = IDENTIFIER_UNDERSCORE
            .replace_all(&current, |caps: &Captures| {
                let whole = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                if in_code_span(&spans, start) {
                    whole.to_string()
                } else {
                    format!("{}_{}", &caps[1], &caps[2])
                }
            })
            .into_owned();

        if next == current {
            return next;
        }
        current = next;
    }
}

fn in_code_span(spans: &[Range<usize>], offset: usize) -> bool {
    let index = spans.partition_point(|span| span.end <= offset);
    spans.get(index).is_some_and(|span| span.contains(&offset))
}

/// Remove the blank line in front of an indented bullet or `1.` marker.
///
/// An ordered list starting at any other number cannot interrupt the
/// parent item's text, so its blank line stays.
pub fn tighten_nested_lists(text: &str) -> String {
    LOOSE_NESTED_ITEM.replace_all(text, "\n${1}").into_owned()
}
