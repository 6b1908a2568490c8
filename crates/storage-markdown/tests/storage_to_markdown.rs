//! Storage Format → Markdown conversion of hand-written pages

use rstest::rstest;
use storage_markdown::{storage_to_markdown, Converter, ConverterOptions, HeadingStyle, Options};

#[rstest]
#[case::heading("<h1>Title</h1>", "# Title")]
#[case::heading_with_id("<h2 id=\"overview\">Overview</h2>", "## Overview")]
#[case::bullet_list("<ul><li>Item</li></ul>", "- Item")]
#[case::ordered_list("<ol><li>First</li></ol>", "1. First")]
#[case::italic("<p><em>italic</em></p>", "*italic*")]
#[case::bold("<p><strong>bold</strong></p>", "**bold**")]
#[case::bold_italic("<p><strong><em>both</em></strong></p>", "***both***")]
#[case::entities(
    "<p>Angle brackets &lt; and &gt; with ampersand &amp; decoded</p>",
    "Angle brackets < and > with ampersand & decoded"
)]
#[case::script_and_style("<p>Keep</p><script>run()</script><style>p { color: red }</style>", "Keep")]
#[case::info_macro(
    "<ac:structured-macro ac:name=\"info\"><ac:rich-text-body><p>Heads up</p></ac:rich-text-body></ac:structured-macro>",
    "Heads up"
)]
#[case::image_macro(
    "<p><ac:image><ri:url ri:value=\"https://x.test/a.png\" /></ac:image></p>",
    "![](https://x.test/a.png)"
)]
#[case::empty_code_macro(
    "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">sh</ac:parameter><ac:plain-text-body><![CDATA[]]></ac:plain-text-body></ac:structured-macro>",
    "```sh\n```"
)]
#[case::code_macro(
    "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">python</ac:parameter><ac:plain-text-body><![CDATA[if a < b:\n    print(a_b)]]></ac:plain-text-body></ac:structured-macro>",
    "```python\nif a < b:\n    print(a_b)\n```"
)]
#[case::task_macro(
    "<ac:task-list><ac:task><ac:task-id>1</ac:task-id><ac:task-status>complete</ac:task-status><ac:task-body>Ship it</ac:task-body></ac:task></ac:task-list>",
    "- [x] Ship it"
)]
#[case::link("<p><a href=\"https://x.test/a_b\">page</a></p>", "[page](https://x.test/a_b)")]
#[case::identifier("<p>Set max_retry_count first</p>", "Set max_retry_count first")]
#[case::literal_quote_marker("<p>&gt; not a quote</p>", "\\> not a quote")]
#[case::literal_ordered_marker("<p>1986. A great year</p>", "1986\\. A great year")]
#[case::literal_tildes("<p>~~keep~~</p>", "\\~\\~keep\\~\\~")]
#[case::sentence_punctuation("<p>Done. See (below).</p>", "Done. See (below).")]
#[case::nested_list_starting_at_three(
    "<ul><li>a<ol start=\"3\"><li>c</li><li>d</li></ol></li></ul>",
    "- a\n\n  3. c\n  4. d"
)]
#[case::code_span_with_pipe_in_table(
    "<table><tr><th>A</th><th>B</th></tr><tr><td><code>x|y</code></td><td>2</td></tr></table>",
    "| A | B |\n| --- | --- |\n| `x\\|y` | 2 |"
)]
#[case::empty("", "")]
#[case::whitespace_only("  \n\t", "")]
fn test_storage_to_markdown(#[case] storage: &str, #[case] expected: &str) {
    assert_eq!(storage_to_markdown(storage).unwrap(), expected);
}

#[test]
fn test_mixed_page() {
    let storage = "<h2>Setup</h2>\n\
                   <p>Run the <code>install_all</code> script.</p>\n\
                   <ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">bash</ac:parameter>\
                   <ac:plain-text-body><![CDATA[./install_all --force\n]]></ac:plain-text-body></ac:structured-macro>\n\
                   <ul>\n<li>first_step\n</li>\n<li>second_step\n</li>\n</ul>\n";

    assert_eq!(
        storage_to_markdown(storage).unwrap(),
        "## Setup\n\nRun the `install_all` script.\n\n```bash\n./install_all --force\n```\n\n- first_step\n- second_step"
    );
}

#[test]
fn test_literal_markdown_characters_stay_escaped() {
    assert_eq!(
        storage_to_markdown("<p># not a heading</p>").unwrap(),
        "\\# not a heading"
    );
    assert_eq!(
        storage_to_markdown("<p>- not a list</p>").unwrap(),
        "\\- not a list"
    );
}

#[test]
fn test_setext_headings() {
    let converter = Converter::with_options(ConverterOptions {
        markdown: Options {
            heading_style: HeadingStyle::Setext,
            ..Options::default()
        },
        ..ConverterOptions::default()
    });
    assert_eq!(
        converter.storage_to_markdown("<h1>Title</h1><h2>Sub</h2>").unwrap(),
        "Title\n=====\n\nSub\n---"
    );
}
