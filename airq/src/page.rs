use scraper::{Html, Node, Selector};

/// Selects the first element with the given tag name carrying the given class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassQuery {
    pub tag: &'static str,
    pub class: &'static str,
}

impl ClassQuery {
    pub const fn new(tag: &'static str, class: &'static str) -> ClassQuery {
        ClassQuery { tag, class }
    }

    fn selector(&self) -> Option<Selector> {
        Selector::parse(&format!("{}.{}", self.tag, self.class)).ok()
    }
}

fn is_hidden(name: &str) -> bool {
    matches!(name, "script" | "style" | "template")
}

/// One page, parsed once: the document for tag lookups plus its flattened text.
#[derive(Debug, Clone)]
pub struct PageView {
    document: Html,
    text: String,
}

impl PageView {
    pub fn parse(html: &str) -> PageView {
        let document = Html::parse_document(html);
        let text = flatten(&document);
        PageView { document, text }
    }

    /// Trimmed text content of the first element matching `query`.
    pub fn tag_text(&self, query: &ClassQuery) -> Option<String> {
        let selector = query.selector()?;
        let element = self.document.select(&selector).next()?;
        Some(element.text().collect::<String>().trim().to_string())
    }

    /// Every text node outside `<script>` and `<style>`, trimmed and joined
    /// by a single space.
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn flatten(document: &Html) -> String {
    let mut nodes: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let text = match node.value() {
            Node::Text(text) => text.trim(),
            _ => continue,
        };
        let hidden = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|element| is_hidden(element.name()));
        if !text.is_empty() && !hidden {
            nodes.push(text);
        }
    }
    nodes.join(" ")
}
