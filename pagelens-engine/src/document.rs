use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Selector-queryable wrapper over the parsed HTML tree.
///
/// All query helpers are total: a selector that fails to parse or match
/// yields an empty result, never a panic, so analyzers stay defensive by
/// construction even over degenerate documents.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                debug!("Selector '{}' failed to parse: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    pub fn first(&self, selector: &str) -> Option<ElementRef<'_>> {
        self.select(selector).into_iter().next()
    }

    pub fn count(&self, selector: &str) -> usize {
        self.select(selector).len()
    }

    /// Whitespace-normalized recursive text of the first match.
    pub fn text_of_first(&self, selector: &str) -> Option<String> {
        self.first(selector).map(element_text)
    }

    pub fn attr_of_first(&self, selector: &str, attr: &str) -> Option<String> {
        self.first(selector)
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
    }

    /// Content of `<meta name="...">`, matched case-sensitively on `name`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.attr_of_first(&format!(r#"meta[name="{}"]"#, name), "content")
            .filter(|c| !c.is_empty())
    }

    /// Content of `<meta property="...">` (Open Graph style).
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.attr_of_first(&format!(r#"meta[property="{}"]"#, property), "content")
            .filter(|c| !c.is_empty())
    }

    /// All headings as (level, text) in document order.
    pub fn headings(&self) -> Vec<(u8, String)> {
        self.select("h1, h2, h3, h4, h5, h6")
            .into_iter()
            .map(|el| {
                let name = el.value().name();
                let level = name.as_bytes().get(1).map(|b| b - b'0').unwrap_or(6);
                (level, element_text(el))
            })
            .collect()
    }

    /// Rendered text with script/style/noscript/template subtrees removed.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        let root = self
            .first("body")
            .unwrap_or_else(|| self.html.root_element());
        collect_visible(root, &mut out);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Whitespace-normalized recursive text content of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_visible(el: ElementRef<'_>, out: &mut String) {
    if matches!(
        el.value().name(),
        "script" | "style" | "noscript" | "template"
    ) {
        return;
    }

    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_visible(child_el, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_returns_document_order() {
        let doc = Document::parse("<p id='a'>one</p><p id='b'>two</p>");
        let ids: Vec<_> = doc
            .select("p")
            .into_iter()
            .filter_map(|el| el.value().attr("id").map(String::from))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_bad_selector_is_empty_not_panic() {
        let doc = Document::parse("<p>x</p>");
        assert!(doc.select("p[[[").is_empty());
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = Document::parse(
            "<body><p>hello</p><script>var x = 1;</script><style>p{}</style><p>world</p></body>",
        );
        assert_eq!(doc.visible_text(), "hello world");
    }

    #[test]
    fn test_headings_levels_and_order() {
        let doc = Document::parse("<h1>A</h1><h3>B</h3><h2>C</h2>");
        let hs = doc.headings();
        assert_eq!(
            hs,
            vec![
                (1, "A".to_string()),
                (3, "B".to_string()),
                (2, "C".to_string())
            ]
        );
    }

    #[test]
    fn test_meta_content_empty_is_none() {
        let doc = Document::parse(r#"<head><meta name="description" content=""></head>"#);
        assert!(doc.meta_content("description").is_none());
    }
}
