//! The hidden score marker appended to annotated comments.
//!
//! The marker is an HTML comment, so GitHub renders nothing:
//!
//! ```text
//! <body>
//!
//! <!-- Relevance Score: 0.4213 -->
//! ```

const MARKER_OPEN: &str = "<!-- Relevance Score: ";
const MARKER_CLOSE: &str = " -->";

/// Append the score marker to `body`, replacing a trailing marker if present.
pub fn annotate(body: &str, score: f32) -> String {
    format!("{}\n\n{MARKER_OPEN}{score}{MARKER_CLOSE}", strip_annotation(body))
}

/// The body without its trailing score marker (and the blank lines before it).
///
/// Bodies without a marker come back unchanged.
pub fn strip_annotation(body: &str) -> &str {
    match trailing_marker(body) {
        Some((start, _)) => body[..start].trim_end(),
        None => body,
    }
}

/// The score recorded in a trailing marker, if any.
pub fn parse_annotation(body: &str) -> Option<f32> {
    trailing_marker(body).and_then(|(_, value)| value.trim().parse().ok())
}

/// Byte offset of the trailing marker and the raw text between its delimiters.
fn trailing_marker(body: &str) -> Option<(usize, &str)> {
    let trimmed = body.trim_end();
    let start = trimmed.rfind(MARKER_OPEN)?;
    let value = trimmed[start + MARKER_OPEN.len()..].strip_suffix(MARKER_CLOSE)?;
    if value.contains("-->") {
        return None;
    }
    Some((start, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_format() {
        assert_eq!(
            annotate("Fixed the sidebar.", 0.5),
            "Fixed the sidebar.\n\n<!-- Relevance Score: 0.5 -->"
        );
    }

    #[test]
    fn test_annotate_replaces_existing_marker() {
        let once = annotate("Fixed the sidebar.", 0.25);
        let twice = annotate(&once, 0.75);
        assert_eq!(twice, "Fixed the sidebar.\n\n<!-- Relevance Score: 0.75 -->");
        assert_eq!(twice.matches("Relevance Score").count(), 1);
    }

    #[test]
    fn test_strip_leaves_plain_bodies_alone() {
        let body = "No marker here  \n";
        assert_eq!(strip_annotation(body), body);
    }

    #[test]
    fn test_strip_ignores_marker_in_the_middle() {
        let body = "<!-- Relevance Score: 0.1 -->\nthen more text";
        assert_eq!(strip_annotation(body), body);
        assert_eq!(parse_annotation(body), None);
    }

    #[test]
    fn test_parse_annotation() {
        let body = annotate("text", 0.4213);
        assert_eq!(parse_annotation(&body), Some(0.4213));
        assert_eq!(parse_annotation("text"), None);
        assert_eq!(
            parse_annotation("text\n\n<!-- Relevance Score: abc -->"),
            None
        );
    }
}
