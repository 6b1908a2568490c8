//! Round-trip tests (Markdown → Storage Format → Markdown)

use rstest::rstest;
use storage_markdown::{markdown_to_storage, storage_to_markdown};

fn round_trip(markdown: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let storage = markdown_to_storage(markdown);
    storage_to_markdown(&storage).expect("storage should convert back")
}

#[rstest]
#[case::heading("# Title")]
#[case::deep_heading("#### Section four")]
#[case::bold_italic("**bold** and *italic*")]
#[case::bold_and_italic_combined("***bold italic***")]
#[case::strikethrough("~~gone~~")]
#[case::inline_code("Use `my_fn()` here")]
#[case::link("[the docs](https://example.com/docs)")]
#[case::bullets("- One\n- Two")]
#[case::ordered("1. First\n2. Second")]
#[case::ordered_start("4. Four\n5. Five")]
#[case::task_list("- [ ] A\n- [x] B")]
#[case::blockquote("> quoted text")]
#[case::rule("above\n\n---\n\nbelow")]
#[case::table("| A | B |\n| --- | --- |\n| 1 | 2 |")]
#[case::fenced_code("```rust\nfn main() {}\n```")]
#[case::empty_code_block("```go\n```")]
#[case::identifiers("snake_case_name and other_name")]
#[case::punctuation("C# and F# are languages! 1 + 2 - 3")]
#[case::hard_break("first line  \nsecond line")]
#[case::literal_quote_marker("\\> not a quote")]
#[case::literal_ordered_marker("1986\\. A great year")]
#[case::literal_tildes("\\~\\~keep\\~\\~")]
#[case::nested_list_starting_at_three("- a\n\n  3. c\n  4. d")]
#[case::code_span_with_pipe_in_table("| A | B |\n| --- | --- |\n| `x\\|y` | 2 |")]
fn test_round_trip_is_identity(#[case] markdown: &str) {
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_full_document() {
    let markdown = r#"# Project Notes

Some **bold** text, *italic* text and ~~removed~~ words.

```go
func main() {
    re := regexp.MustCompile(`^[A-Z]:\\[\w\\]+$`)
    fmt.Println(re)
}
```

- Level one
  - Level two
    - Level three

| Name | Value |
| --- | --- |
| my_variable_name | 42 |

- [ ] Open task
- [x] Done task

See [the docs](https://example.com/docs) for more."#;

    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_regex_code_block() {
    let markdown = "```go\nregexp.MustCompile(`^[A-Z]:\\\\[\\w\\\\]+$`)\n```";
    let result = round_trip(markdown);
    assert!(result.contains(r"regexp.MustCompile(`^[A-Z]:\\[\w\\]+$`)"));
    assert_eq!(result, markdown);
}

#[test]
fn test_code_with_markup_characters() {
    let markdown = "```html\n<a href=\"x\">&amp; 'q' \\ </a>\nif a < b && c > d {}\n```";
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_code_with_cdata_terminator() {
    let markdown = "```xml\n<![CDATA[ data ]]>\n```";
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_nested_fence_in_code() {
    let markdown = "````markdown\n```python\nprint(\"hi\")\n```\n````";
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_identifiers_after_several_code_blocks() {
    let markdown = "```python\nmy_variable_name = 1\n```\n\n```go\nx := my_other_name\n```\n\n```\nplain\n```\n\nThe value of my_variable_name is set above.";
    let result = round_trip(markdown);
    assert!(result.contains("The value of my_variable_name is set above."));
    assert!(!result.contains("\\_"));
}

#[test]
fn test_task_list_checkboxes_are_not_escaped() {
    let result = round_trip("- [ ] A\n- [x] B");
    assert!(result.contains("- [ ] A"));
    assert!(result.contains("- [x] B"));
    assert!(!result.contains("\\["));
}

#[test]
fn test_nested_task_lists() {
    let markdown = "- [ ] parent\n  - [x] child";
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn test_deeply_nested_lists_come_back_tight() {
    let markdown = (1..=10)
        .map(|level| format!("{}- L{level}", "  ".repeat(level - 1)))
        .collect::<Vec<_>>()
        .join("\n");

    let result = round_trip(&markdown);
    for level in 1..=10 {
        assert!(result.contains(&format!("- L{level}")), "missing L{level}");
    }
    assert!(!result.contains("\n\n"));
    assert_eq!(result, markdown);
}

#[test]
fn test_table_alignment_is_dropped_without_error() {
    let markdown = "| a | b | c |\n| :--- | :---: | ---: |\n| 1 | 2 | 3 |";
    let storage = markdown_to_storage(markdown);
    assert!(storage.contains("align=\"left\""));
    assert!(storage.contains("align=\"center\""));
    assert!(storage.contains("align=\"right\""));

    let result = storage_to_markdown(&storage).expect("alignment loss is not an error");
    assert_eq!(result, "| a | b | c |\n| --- | --- | --- |\n| 1 | 2 | 3 |");
}

#[test]
fn test_image_alt_text_is_dropped() {
    assert_eq!(round_trip("![diagram](https://x.test/d.png)"), "![](https://x.test/d.png)");
}

#[test]
fn test_link_title_survives() {
    let markdown = "[site](https://example.com \"Home\")";
    assert_eq!(round_trip(markdown), markdown);
}

#[rstest]
#[case::before_link("C:\\\\[docs](https://x.test)", "<p>C:\\<a href=\"https://x.test\">docs</a></p>\n")]
#[case::before_strong("dir\\\\**b**", "<p>dir\\<strong>b</strong></p>\n")]
fn test_literal_backslash_before_markup(#[case] markdown: &str, #[case] storage: &str) {
    assert_eq!(markdown_to_storage(markdown), storage);

    let back = round_trip(markdown);
    assert_eq!(markdown_to_storage(&back), storage);
}

#[test]
fn test_literal_fence_text_does_not_swallow_the_page() {
    let markdown = storage_to_markdown("<p>~~~ not code</p><p>my_var</p>").unwrap();
    assert_eq!(markdown, "\\~\\~\\~ not code\n\nmy_var");

    let storage = markdown_to_storage(&markdown);
    assert_eq!(storage, "<p>~~~ not code</p>\n<p>my_var</p>\n");
    assert!(!storage.contains("ac:structured-macro"));
}

#[test]
fn test_table_code_span_keeps_its_cell() {
    let storage = markdown_to_storage("| A | B |\n| --- | --- |\n| `x\\|y` | 2 |");
    assert!(storage.contains("<td><code>x|y</code></td><td>2</td>"));
}
