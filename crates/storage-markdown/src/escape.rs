//! Utility functions and constants for HTML, XML and Markdown text.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "dd", "details", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav", "ol",
    "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

/// Elements whose content never reaches the Markdown output
pub const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Check if a tag is dropped together with its content
pub fn is_skipped(tag: &str) -> bool {
    SKIPPED_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Collapse runs of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Escape Markdown special characters in text.
///
/// The escaping is deliberately context-free; the normalizer later drops the
/// backslashes that turn out not to be needed.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 8);

    for (i, c) in text.char_indices() {
        let rest = &text[i + c.len_utf8()..];
        match c {
            // A trailing backslash would pair up with the markup that follows
            '\\' if rest.chars().all(char::is_whitespace) => result.push_str("&#92;"),
            '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '+' | '-' | '!' | '|' | '~' | '>' | '.'
            | ')' => {
                result.push('\\');
                result.push(c);
            }
            // Only where it would open an HTML tag, comment or declaration
            '<' if rest
                .chars()
                .next()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')) =>
            {
                result.push_str("\\<");
            }
            '&' if starts_entity(rest) => result.push_str("\\&"),
            _ => result.push(c),
        }
    }

    result
}

/// Whether `rest` (the text after a `&`) reads as an entity reference
fn starts_entity(rest: &str) -> bool {
    let name = rest.strip_prefix('#').unwrap_or(rest);
    let len = name.bytes().take_while(u8::is_ascii_alphanumeric).count();
    len > 0 && name[len..].starts_with(';')
}

/// Escape text for use in XML content or a double-quoted attribute
pub fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }

    result
}

/// Percent-encode the bytes of a URL that may not appear in an attribute
/// unescaped. Existing `%XX` sequences and reserved characters are kept.
pub fn escape_url(url: &str) -> String {
    let mut result = String::with_capacity(url.len());

    for byte in url.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=%".contains(&byte) {
            result.push(byte as char);
        } else {
            result.push_str(&format!("%{byte:02X}"));
        }
    }

    result
}
