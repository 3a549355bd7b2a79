//! Visible-text extraction from fetched HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose whole subtree is dropped before text extraction.
const CHROME_TAGS: &[&str] = &["script", "style", "nav", "footer", "header"];

static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector"));

/// Extract the visible text of a page.
///
/// Uses `<body>` when present, otherwise the whole document. Chrome subtrees
/// are skipped; every remaining text node is trimmed and the non-empty ones
/// are joined with single spaces.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let root = doc
        .select(&BODY_SEL)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(el: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            Node::Element(element) => {
                if CHROME_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_chrome_and_scripts() {
        let html = r#"<html><head><title>Ignored title</title></head><body>
            <header><h1>Site Header</h1></header>
            <nav><a href="/">Home</a></nav>
            <main>
              <h1>Electric Bicycles</h1>
              <p>Pedal assist makes   hills easy.</p>
              <script>trackAnalytics();</script>
              <style>.x { color: red }</style>
            </main>
            <footer>Copyright 2025</footer>
        </body></html>"#;

        let text = visible_text(html);
        assert_eq!(text, "Electric Bicycles Pedal assist makes   hills easy.");
        assert!(!text.contains("Site Header"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("trackAnalytics"));
        assert!(!text.contains("Ignored title"));
    }

    #[test]
    fn nested_inline_text_is_joined() {
        let html = "<body><p>Range of <strong>40</strong> to <em>80 km</em>.</p></body>";
        assert_eq!(visible_text(html), "Range of 40 to 80 km .");
    }

    #[test]
    fn fragment_without_body_still_extracts() {
        // html5ever always synthesizes a body, so this exercises the same path
        // a body-less document would take.
        let text = visible_text("<p>Just a paragraph</p><nav>menu</nav>");
        assert_eq!(text, "Just a paragraph");
    }

    #[test]
    fn empty_document_gives_empty_text() {
        assert_eq!(visible_text(""), "");
    }
}
