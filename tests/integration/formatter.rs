use wikiextract::formatter::{FormatOptions, format_text};

fn keep_sections() -> FormatOptions {
    FormatOptions {
        keep_sections: true,
        ..FormatOptions::default()
    }
}

#[test]
fn test_section_discard_ends_at_shallower_heading() {
    let mut options = keep_sections();
    options.discard_sections.insert("external links".to_string());
    let text = [
        "Lead paragraph.",
        "=== External links ===",
        "link one",
        "link two",
        "== Legacy ==",
        "Still remembered.",
    ]
    .join("\n");

    let blocks = format_text(&text, &options);
    assert_eq!(blocks, vec!["Lead paragraph.", "", "Legacy.", "Still remembered."]);
}

#[test]
fn test_list_flush_emits_header_stack_in_order() {
    let text = ["== Works ==", "=== Novels ===", "* First novel", "* Second novel"].join("\n");
    let blocks = format_text(&text, &keep_sections());
    assert_eq!(blocks, vec!["Works.", "Novels.", "- First novel", "- Second novel"]);
}

#[test]
fn test_empty_sections_vanish() {
    let text = ["Intro.", "== Gallery ==", "", "== See also ==", "", "== Life ==", "Born."].join("\n");
    let blocks = format_text(&text, &keep_sections());
    assert_eq!(blocks, vec!["Intro.", "", "Life.", "Born."]);
}

#[test]
fn test_markdown_headers_with_levels() {
    let options = FormatOptions {
        markdown_headers: true,
        ..keep_sections()
    };
    let text = ["== Career ==", "=== Early years ===", "Started young!"].join("\n");
    let blocks = format_text(&text, &options);
    assert_eq!(blocks, vec!["## Career.", "### Early years.", "Started young!"]);
}

#[test]
fn test_html_nested_lists_close_in_order() {
    let options = FormatOptions {
        html_formatting: true,
        ..keep_sections()
    };
    let text = ["# one", "#* bullet", "after"].join("\n");
    let blocks = format_text(&text, &options);
    assert_eq!(
        blocks,
        vec!["<ol>", "<li>one</li>", "<ul>", "<li>bullet</li>", "</ul>", "</ol>", "after"]
    );
}
