//! Attachment discovery in GitHub comment bodies.
//!
//! Recognizes markdown images and links, `<img src>` and `<a href>` tags, and
//! bare `http(s)` URLs. A URL referenced as an image anywhere in the body is an
//! image; everything else is a link. Order of first appearance is kept.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"];

static PATTERNS: OnceLock<AttachmentPatterns> = OnceLock::new();

struct AttachmentPatterns {
    markdown: Regex,
    img_tag: Regex,
    anchor_tag: Regex,
    bare_url: Regex,
}

impl AttachmentPatterns {
    fn new() -> Self {
        Self {
            // ![alt](url "title") and [text](url "title")
            markdown: Regex::new(
                r#"(!?)\[[^\]]*\]\(\s*<?(https?://[^\s)>]+)>?(?:\s+"[^"]*")?\s*\)"#,
            )
            .expect("markdown regex must compile"),
            img_tag: Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']?(https?://[^"'\s>]+)"#)
                .expect("img regex must compile"),
            anchor_tag: Regex::new(r#"(?i)<a\b[^>]*?\shref\s*=\s*["']?(https?://[^"'\s>]+)"#)
                .expect("anchor regex must compile"),
            bare_url: Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#)
                .expect("bare url regex must compile"),
        }
    }
}

fn patterns() -> &'static AttachmentPatterns {
    PATTERNS.get_or_init(AttachmentPatterns::new)
}

/// Image and link URLs referenced by a comment body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    pub images: Vec<String>,
    pub links: Vec<String>,
}

impl Attachments {
    pub fn extract(body: &str) -> Self {
        let patterns = patterns();
        // (byte offset, is_image, url)
        let mut found: Vec<(usize, bool, &str)> = Vec::new();

        for caps in patterns.markdown.captures_iter(body) {
            if let (Some(whole), Some(url)) = (caps.get(0), caps.get(2)) {
                let is_image = caps.get(1).is_some_and(|m| m.as_str() == "!");
                found.push((whole.start(), is_image, url.as_str()));
            }
        }
        for caps in patterns.img_tag.captures_iter(body) {
            if let Some(url) = caps.get(1) {
                found.push((url.start(), true, url.as_str()));
            }
        }
        for caps in patterns.anchor_tag.captures_iter(body) {
            if let Some(url) = caps.get(1) {
                found.push((url.start(), false, url.as_str()));
            }
        }
        for m in patterns.bare_url.find_iter(body) {
            let url = m
                .as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?']);
            found.push((m.start(), looks_like_image(url), url));
        }

        found.sort_by_key(|(start, _, _)| *start);

        let image_set: HashSet<&str> = found
            .iter()
            .filter(|(_, is_image, _)| *is_image)
            .map(|(_, _, url)| *url)
            .collect();

        let mut seen = HashSet::new();
        let mut attachments = Self::default();
        for (_, _, url) in found {
            if !seen.insert(url) {
                continue;
            }
            if image_set.contains(url) {
                attachments.images.push(url.to_string());
            } else {
                attachments.links.push(url.to_string());
            }
        }
        attachments
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.links.is_empty()
    }
}

fn looks_like_image(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_image_and_link() {
        let found = Attachments::extract(
            "See ![shot](https://example.com/shot.png) and [docs](https://example.com/docs).",
        );
        assert_eq!(found.images, vec!["https://example.com/shot.png"]);
        assert_eq!(found.links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_html_tags() {
        let found = Attachments::extract(
            r#"<img width="400" alt="ui" src="https://github.com/user-attachments/assets/abc123"> <a href='https://example.com/issue'>issue</a>"#,
        );
        assert_eq!(
            found.images,
            vec!["https://github.com/user-attachments/assets/abc123"]
        );
        assert_eq!(found.links, vec!["https://example.com/issue"]);
    }

    #[test]
    fn test_bare_urls_classified_by_extension() {
        let found = Attachments::extract(
            "Before: https://example.com/before.JPG, reference https://example.com/guide?x=1.",
        );
        assert_eq!(found.images, vec!["https://example.com/before.JPG"]);
        assert_eq!(found.links, vec!["https://example.com/guide?x=1"]);
    }

    #[test]
    fn test_image_wins_and_duplicates_collapse() {
        let body = "![a](https://example.com/asset)\nsame again https://example.com/asset\n[x](https://example.com/p) [y](https://example.com/p)";
        let found = Attachments::extract(body);
        assert_eq!(found.images, vec!["https://example.com/asset"]);
        assert_eq!(found.links, vec!["https://example.com/p"]);
    }

    #[test]
    fn test_order_of_appearance() {
        let found = Attachments::extract(
            "https://b.example.com/two then [one](https://a.example.com/one)",
        );
        assert_eq!(
            found.links,
            vec!["https://b.example.com/two", "https://a.example.com/one"]
        );
    }

    #[test]
    fn test_plain_text_has_no_attachments() {
        let found = Attachments::extract("This comment addresses layout issues in the UI.");
        assert!(found.is_empty());
    }
}
