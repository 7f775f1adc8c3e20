use crate::document::{Document, NodeId, NodeKind};
use scraper::{ElementRef, Html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Elements whose text is written as is.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Parses an HTML fragment and imports its first top-level element or
    /// text node, detached. Comments before it are skipped. Returns `None`
    /// when the fragment has neither.
    pub fn from_html(&self, html: &str) -> Option<NodeId> {
        let fragment = Html::parse_fragment(html);
        fragment.root_element().children().find_map(|child| match ElementRef::wrap(child) {
            Some(element) => Some(self.import_element(element)),
            None => child.value().as_text().map(|text| self.create_text(text)),
        })
    }

    fn import_element(&self, element: ElementRef<'_>) -> NodeId {
        let node = self.create_element(element.value().name());
        for (name, value) in element.value().attrs() {
            // Freshly created elements always accept attributes.
            let _ = self.set_attribute(node, name, value);
        }
        for child in element.children() {
            let imported = match ElementRef::wrap(child) {
                Some(child) => Some(self.import_element(child)),
                None => child.value().as_text().map(|text| self.create_text(text)),
            };
            if let Some(imported) = imported {
                let _ = self.append_child(node, imported);
            }
        }
        node
    }

    /// Serializes `node` and its subtree back to HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, false, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, raw_text: bool, out: &mut String) {
        let (tag, children) = {
            let nodes = self.nodes.borrow();
            let Some(data) = nodes.get(node.0) else { return };
            match &data.kind {
                NodeKind::Text(text) if raw_text => {
                    out.push_str(text);
                    return;
                }
                NodeKind::Text(text) => {
                    out.push_str(&escape(text, false));
                    return;
                }
                NodeKind::Element { tag, attributes } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attributes {
                        out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
                    }
                    out.push('>');
                    (tag.clone(), data.children.clone())
                }
            }
        };
        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        let raw_text = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
        for child in children {
            self.write_html(child, raw_text, out);
        }
        out.push_str(&format!("</{}>", tag));
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
