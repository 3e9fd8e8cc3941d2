//! HTML to plain text: title, meta description, and a compact visible-text body.

use scraper::{ElementRef, Html, Node};

/// Elements whose text never reaches the body.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Text recovered from one HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
}

/// Parse an HTML document and extract its text.
///
/// Script and style contents are dropped. The remaining text nodes are
/// concatenated in document order, so inline markup never splits a word; the
/// result is broken into trimmed non-empty lines joined by `\n` and cut to
/// `char_limit` characters with `...` appended when anything was removed.
pub fn extract_page_text(html: &str, char_limit: usize) -> PageText {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut title = None;
    let mut description = None;
    let mut og_description = None;
    let mut visible = String::new();

    for node in root.descendants() {
        match node.value() {
            Node::Element(element) => match element.name() {
                "title" if title.is_none() => {
                    title = ElementRef::wrap(node)
                        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                        .filter(|t| !t.is_empty());
                }
                "meta" => {
                    let content = element
                        .attr("content")
                        .map(collapse_whitespace)
                        .filter(|c| !c.is_empty());
                    if element
                        .attr("name")
                        .is_some_and(|n| n.eq_ignore_ascii_case("description"))
                    {
                        description = description.or(content);
                    } else if element
                        .attr("property")
                        .is_some_and(|p| p.eq_ignore_ascii_case("og:description"))
                    {
                        og_description = og_description.or(content);
                    }
                }
                _ => {}
            },
            Node::Text(text) => {
                let skipped = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
                });
                if !skipped {
                    visible.push_str(text);
                }
            }
            _ => {}
        }
    }

    let content = visible
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    PageText {
        title,
        description: description.or(og_description),
        content: truncate_chars(&content, char_limit),
    }
}

/// Keep at most `limit` characters, appending `...` when the text was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>  Layout   fixes  </title>
    <meta name="description" content="Spacing issues in the settings panel">
    <style>body { margin: 0; }</style>
    <script>var tracking = "should not appear";</script>
  </head>
  <body>
    <h1>Settings panel</h1>
    <p>The sidebar overlaps the
       main content on narrow screens.</p>
    <noscript>Enable JavaScript</noscript>
  </body>
</html>"#;

    #[test]
    fn test_extracts_title_and_description() {
        let page = extract_page_text(PAGE, 500);
        assert_eq!(page.title.as_deref(), Some("Layout fixes"));
        assert_eq!(
            page.description.as_deref(),
            Some("Spacing issues in the settings panel")
        );
    }

    #[test]
    fn test_strips_script_and_style() {
        let page = extract_page_text(PAGE, 500);
        assert!(!page.content.contains("tracking"));
        assert!(!page.content.contains("margin"));
        assert!(!page.content.contains("Enable JavaScript"));
    }

    #[test]
    fn test_content_is_compact_lines() {
        let page = extract_page_text(PAGE, 500);
        assert!(page.content.contains("Settings panel"));
        assert!(page
            .content
            .contains("The sidebar overlaps the\nmain content on narrow screens."));
        assert!(page.content.lines().all(|l| !l.trim().is_empty()));
        assert!(page.content.lines().all(|l| l == l.trim()));
    }

    #[test]
    fn test_inline_markup_keeps_words_together() {
        let page = extract_page_text(
            "<p>The <b>side</b>bar overlaps the <a href='#'>main</a> content.</p>",
            500,
        );
        assert_eq!(page.content, "The sidebar overlaps the main content.");
    }

    #[test]
    fn test_block_elements_on_separate_lines() {
        let page = extract_page_text("<ul>\n<li>First <em>item</em></li>\n<li>Second</li>\n</ul>", 500);
        assert_eq!(page.content, "First item\nSecond");
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let page = extract_page_text("<html><body><p>hello</p></body></html>", 500);
        assert_eq!(page.title, None);
        assert_eq!(page.description, None);
        assert_eq!(page.content, "hello");
    }

    #[test]
    fn test_og_description_fallback() {
        let page = extract_page_text(
            r#"<html><head><meta property="og:description" content="From OG"></head></html>"#,
            500,
        );
        assert_eq!(page.description.as_deref(), Some("From OG"));
    }

    #[test]
    fn test_truncates_long_content() {
        let body = "word ".repeat(300);
        let page = extract_page_text(&format!("<p>{body}</p>"), 500);
        assert_eq!(page.content.chars().count(), 503);
        assert!(page.content.ends_with("..."));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 5), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
