//! Markdown → Storage Format rendering

use rstest::rstest;
use storage_markdown::markdown_to_storage;

#[rstest]
#[case::heading("# Title", "<h1>Title</h1>\n")]
#[case::paragraph("Hello World", "<p>Hello World</p>\n")]
#[case::rule("---", "<hr />\n")]
#[case::blockquote("> quoted", "<blockquote>\n<p>quoted</p>\n</blockquote>\n")]
#[case::hard_break("a  \nb", "<p>a<br />\nb</p>\n")]
#[case::escaped_text("a < b & c", "<p>a &lt; b &amp; c</p>\n")]
#[case::empty("", "")]
fn test_markdown_to_storage(#[case] markdown: &str, #[case] expected: &str) {
    assert_eq!(markdown_to_storage(markdown), expected);
}

#[test]
fn test_code_block_macro() {
    let storage = markdown_to_storage("```rust\nfn main() {}\n```");
    assert_eq!(
        storage,
        "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">rust</ac:parameter>\
         <ac:plain-text-body><![CDATA[fn main() {}\n]]></ac:plain-text-body></ac:structured-macro>\n"
    );
}

#[test]
fn test_task_list_macro() {
    let storage = markdown_to_storage("- [x] done\n- [ ] todo");
    assert!(storage.starts_with("<ac:task-list>\n"));
    assert!(storage.contains("<ac:task-status>complete</ac:task-status>\n<ac:task-body>done\n</ac:task-body>"));
    assert!(storage.contains("<ac:task-status>incomplete</ac:task-status>\n<ac:task-body>todo\n</ac:task-body>"));
    assert!(!storage.contains("<ul>"));
}

#[test]
fn test_one_checkbox_makes_a_task_list() {
    let storage = markdown_to_storage("- [x] done\n- plain");
    assert!(storage.starts_with("<ac:task-list>\n"));
    assert!(storage.contains("<ac:task-status>incomplete</ac:task-status>\n<ac:task-body>plain\n</ac:task-body>"));
    assert!(!storage.contains("<ul>"));
}

#[test]
fn test_task_list_classification_is_per_list() {
    let storage = markdown_to_storage("- [x] done\n\n* plain");
    assert!(storage.starts_with("<ac:task-list>\n"));
    assert!(storage.contains("<ul>\n<li>plain\n</li>\n</ul>"));
}

#[test]
fn test_image_macro() {
    assert_eq!(
        markdown_to_storage("![logo](https://x.test/logo.png)"),
        "<p><ac:image><ri:url ri:value=\"https://x.test/logo.png\" /></ac:image></p>\n"
    );
}

#[test]
fn test_link_destination_is_escaped() {
    assert_eq!(
        markdown_to_storage("[q](https://x.test/?a=1&b=2)"),
        "<p><a href=\"https://x.test/?a=1&amp;b=2\">q</a></p>\n"
    );
}
