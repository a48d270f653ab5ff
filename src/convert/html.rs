//! HTML pages.

use super::text::read_text;
use crate::error::Result;
use std::path::Path;

/// Converts an HTML file to Markdown with `html2md`.
///
/// Falls back to tag-stripped text when the converter yields nothing.
pub fn convert(path: &Path) -> Result<String> {
    let html = read_text(path)?;
    Ok(html_to_markdown(&html))
}

/// Converts an HTML string to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    let markdown = html2md::parse_html(html);
    if markdown.trim().is_empty() {
        strip_tags(html)
    } else {
        markdown
    }
}

fn strip_tags(html: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => output.push(ch),
            _ => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let md = html_to_markdown("<h1>Title</h1><p>Some <b>bold</b> text</p>");
        assert!(md.contains("Title"), "{}", md);
        assert!(md.contains("**bold**"), "{}", md);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<div>a<br/>b</div>"), "ab");
    }
}
