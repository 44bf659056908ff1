//! HTML page holding the widget
//!
//! The loader writes into a [`Document`]: something with elements addressed
//! by id whose content can be replaced. [`HtmlPage`] implements it over a
//! plain HTML string, locating elements with a regex scan of the markup.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::path::Path;

/// Elements addressed by id whose inner markup can be replaced
pub trait Document {
    /// True if an element with this id exists and can hold content
    fn has_element(&self, id: &str) -> bool;

    /// Replace the content of the element. Returns false if it does not exist.
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool;
}

/// Elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Start tag carrying an `id` attribute; captures the tag name and the id
static ID_START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9-]*)(?:\s[^>]*?)?\sid\s*=\s*["']([^"']*)["'][^>]*>"#)
        .expect("id tag pattern")
});

/// Any start or end tag; captures the slash and the tag name
static ANY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(/?)([a-z][a-z0-9-]*)\b[^>]*>")
        .expect("tag pattern")
});

/// An HTML document kept as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Minimal standalone page with one empty `<div>` for the widget
    pub fn with_element(id: &str) -> Self {
        Self::new(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Fitness BLAST</title>
    <style>
        body {{ font-family: Arial, Helvetica, sans-serif; margin: 20px; }}
        table.fitblast {{ border-collapse: collapse; }}
        table.fitblast th, table.fitblast td {{ padding: 2px 6px; text-align: left; }}
    </style>
</head>
<body>
<div id="{}"></div>
</body>
</html>
"#,
            id
        ))
    }

    /// Load a page template from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page template: {}", path.display()))?;
        Ok(Self::new(html))
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    /// Byte range of the content of the first element with this id
    fn inner_range(&self, id: &str) -> Option<Range<usize>> {
        let caps = ID_START_TAG
            .captures_iter(&self.html)
            .find(|c| c.get(2).is_some_and(|v| v.as_str() == id))?;
        let whole = caps.get(0)?;
        let tag = caps.get(1)?.as_str().to_ascii_lowercase();
        if whole.as_str().ends_with("/>") || VOID_ELEMENTS.contains(&tag.as_str()) {
            return None;
        }

        // Walk same-named tags after the start tag until nesting returns to zero
        let content_start = whole.end();
        let mut depth = 1usize;
        for m in ANY_TAG.captures_iter(&self.html[content_start..]) {
            if !m.get(2).is_some_and(|name| name.as_str().eq_ignore_ascii_case(&tag)) {
                continue;
            }
            let found = m.get(0)?;
            if m.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
                depth -= 1;
                if depth == 0 {
                    return Some(content_start..content_start + found.start());
                }
            } else if !found.as_str().ends_with("/>") {
                depth += 1;
            }
        }

        log::debug!("Element '{}' has no closing </{}> tag", id, tag);
        None
    }

    /// Current content of an element
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.inner_range(id).map(|r| &self.html[r])
    }

    /// Write the page to a file
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.html)
            .with_context(|| format!("Failed to write page: {}", path.display()))
    }
}

impl Document for HtmlPage {
    fn has_element(&self, id: &str) -> bool {
        self.inner_range(id).is_some()
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> bool {
        match self.inner_range(id) {
            Some(range) => {
                self.html.replace_range(range, html);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        let mut page = HtmlPage::with_element("fitblast");
        assert!(page.has_element("fitblast"));
        assert!(!page.has_element("other"));
        assert!(page.set_inner_html("fitblast", "<small>loading...</small>"));
        assert_eq!(page.inner_html("fitblast"), Some("<small>loading...</small>"));
        assert!(page.set_inner_html("fitblast", "done"));
        assert_eq!(page.inner_html("fitblast"), Some("done"));
    }

    #[test]
    fn test_nested_elements() {
        let mut page = HtmlPage::new(
            "<body><div class='x' id='hits'><div>old</div><div/>tail</div><div id=\"after\">keep</div></body>",
        );
        assert_eq!(page.inner_html("hits"), Some("<div>old</div><div/>tail"));
        assert!(page.set_inner_html("hits", "new"));
        assert_eq!(
            page.as_str(),
            "<body><div class='x' id='hits'>new</div><div id=\"after\">keep</div></body>"
        );
    }

    #[test]
    fn test_attribute_lookalikes_and_void_elements() {
        let page = HtmlPage::new("<div data-id=\"hits\">a</div><input id=\"box\"><span id=\"open\">");
        assert!(!page.has_element("hits"));
        assert!(!page.has_element("box"));
        // No closing tag
        assert!(!page.has_element("open"));
    }

    #[test]
    fn test_id_is_matched_literally() {
        let page = HtmlPage::new("<p id=\"a.b\">x</p><p id=\"axb\">y</p>");
        assert_eq!(page.inner_html("a.b"), Some("x"));
    }

    #[test]
    fn test_lookup_is_repeatable_and_case_sensitive() {
        let mut page = HtmlPage::new("<div id=\"Hits\">a</div><div id=\"hits\"><divider></divider>b</div>");
        for _ in 0..3 {
            assert!(page.has_element("hits"));
        }
        assert!(page.set_inner_html("hits", "c"));
        assert_eq!(page.inner_html("Hits"), Some("a"));
        assert_eq!(page.inner_html("hits"), Some("c"));
        assert!(!page.has_element("HITS"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><td id=\"w\"></td></body></html>").unwrap();

        let mut page = HtmlPage::from_file(&path).unwrap();
        assert!(page.set_inner_html("w", "No hits with high coverage"));
        page.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<td id=\"w\">No hits with high coverage</td>"));
    }
}
