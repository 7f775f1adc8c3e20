use hrepr_core::{DomBridge, LoadError, LoadHandler, Pending};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

pub(crate) enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Representation promised to this node by `prepare`
    pub(crate) object: Option<Pending<Value>>,
    pub(crate) load_handler: Option<LoadHandler>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            object: None,
            load_handler: None,
        }
    }
}

/// An in-memory document with a `head` and a `body`.
///
/// Nodes live in an arena and are never freed; removing a node only detaches
/// it. Script elements appended to `head` stay pending until the owner calls
/// [`complete_load`](Document::complete_load) or
/// [`fail_load`](Document::fail_load), standing in for the host's load and
/// error events.
pub struct Document {
    pub(crate) nodes: RefCell<Vec<NodeData>>,
    head: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let doc = Self {
            nodes: RefCell::new(Vec::new()),
            head: NodeId(0),
            body: NodeId(1),
        };
        doc.create_element("head");
        doc.create_element("body");
        doc
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData::new(kind));
        NodeId(nodes.len() - 1)
    }

    pub(crate) fn check(&self, node: NodeId) -> Result<(), LoadError> {
        if node.0 < self.nodes.borrow().len() {
            Ok(())
        } else {
            Err(LoadError::node_not_found(node))
        }
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), LoadError> {
        self.check(node)?;
        match &mut self.nodes.borrow_mut()[node.0].kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
                Ok(())
            }
            NodeKind::Text(_) => Err(LoadError::dom(format!("{} is a text node", node))),
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeKind::Text(_) => None,
        }
    }

    /// Tag name of an element, `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(data) = nodes.get(current.0) else { continue };
            if let NodeKind::Text(text) = &data.kind {
                out.push_str(text);
            }
            stack.extend(data.children.iter().rev());
        }
        out
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node.0)?.parent
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), LoadError> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(LoadError::dom(format!("cannot append {} inside itself", child)));
        }
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches `node` from its parent. Removing a detached node does nothing.
    pub fn remove(&self, node: NodeId) -> Result<(), LoadError> {
        self.check(node)?;
        self.detach(node);
        Ok(())
    }

    /// Puts `replacement` where `node` is and detaches `node`.
    /// Replacing a detached node does nothing.
    pub fn replace_with(&self, node: NodeId, replacement: NodeId) -> Result<(), LoadError> {
        self.check(node)?;
        self.check(replacement)?;
        if node == replacement {
            return Ok(());
        }
        let Some(parent) = self.parent(node) else { return Ok(()) };
        if self.is_inclusive_ancestor(replacement, parent) {
            return Err(LoadError::dom(format!("cannot move {} inside itself", replacement)));
        }
        self.detach(replacement);

        let mut nodes = self.nodes.borrow_mut();
        let siblings = &mut nodes[parent.0].children;
        if let Some(index) = siblings.iter().position(|&c| c == node) {
            siblings[index] = replacement;
        }
        nodes[node.0].parent = None;
        nodes[replacement.0].parent = Some(parent);
        Ok(())
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        loop {
            if node == ancestor {
                return true;
            }
            match nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// First attached element carrying `id`, searching `head` then `body`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let mut stack = vec![self.body, self.head];
        while let Some(current) = stack.pop() {
            let data = &nodes[current.0];
            if let NodeKind::Element { attributes, .. } = &data.kind {
                if attributes.get("id").map(String::as_str) == Some(id) {
                    return Some(current);
                }
            }
            stack.extend(data.children.iter().rev());
        }
        None
    }

    /// `src` of every script element in `head`, in insertion order.
    pub fn scripts(&self) -> Vec<String> {
        self.children(self.head)
            .into_iter()
            .filter(|&node| self.tag(node).as_deref() == Some("script"))
            .filter_map(|node| self.attribute(node, "src"))
            .collect()
    }

    /// Fires the load event of every pending script with this `src`.
    /// Returns how many handlers ran.
    pub fn complete_load(&self, src: &str) -> usize {
        self.fire(src, || Ok(()))
    }

    /// Fires the error event of every pending script with this `src`.
    pub fn fail_load(&self, src: &str, reason: &str) -> usize {
        self.fire(src, || Err(LoadError::load_failed(src, reason)))
    }

    fn fire(&self, src: &str, result: impl Fn() -> Result<(), LoadError>) -> usize {
        let handlers: Vec<LoadHandler> = {
            let mut nodes = self.nodes.borrow_mut();
            let scripts = nodes[self.head.0].children.clone();
            scripts
                .into_iter()
                .filter_map(|node| {
                    let data = &mut nodes[node.0];
                    let matches = matches!(
                        &data.kind,
                        NodeKind::Element { tag, attributes }
                            if tag == "script" && attributes.get("src").map(String::as_str) == Some(src)
                    );
                    if matches { data.load_handler.take() } else { None }
                })
                .collect()
        };
        debug!(src, handlers = handlers.len(), "firing script events");
        let fired = handlers.len();
        for handler in handlers {
            handler(result());
        }
        fired
    }
}

impl DomBridge for Document {
    type Element = NodeId;

    fn create_element(&self, tag: &str) -> Result<NodeId, LoadError> {
        Ok(Document::create_element(self, tag))
    }

    fn set_attribute(&self, element: &mut NodeId, name: &str, value: &str) -> Result<(), LoadError> {
        Document::set_attribute(self, *element, name, value)
    }

    fn on_load(&self, element: &mut NodeId, handler: LoadHandler) -> Result<(), LoadError> {
        self.check(*element)?;
        self.nodes.borrow_mut()[element.0].load_handler = Some(handler);
        Ok(())
    }

    fn append_to_head(&self, element: NodeId) -> Result<(), LoadError> {
        self.append_child(self.head, element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn finds_elements_by_id_once_attached() {
        let doc = Document::new();
        let div = doc.create_element("DIV");
        doc.set_attribute(div, "id", "H1").unwrap();
        assert_eq!(doc.element_by_id("H1"), None);
        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(doc.element_by_id("H1"), Some(div));
        assert_eq!(doc.tag(div).as_deref(), Some("div"));
    }

    #[test]
    fn replace_keeps_position() {
        let doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        doc.append_child(doc.body(), a).unwrap();
        doc.append_child(doc.body(), b).unwrap();
        doc.replace_with(a, c).unwrap();
        assert_eq!(doc.children(doc.body()), vec![c, b]);
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn rejects_cycles() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(outer, inner).unwrap();
        assert!(doc.append_child(inner, outer).is_err());
    }

    #[test]
    fn text_nodes_have_no_attributes() {
        let doc = Document::new();
        let text = doc.create_text("hello");
        assert!(doc.set_attribute(text, "id", "x").is_err());
        assert_eq!(doc.text_content(text), "hello");
    }

    #[test]
    fn load_events_fire_once_per_script() {
        let doc = Document::new();
        let fired = Rc::new(Cell::new(0));
        let mut script = DomBridge::create_element(&doc, "script").unwrap();
        DomBridge::set_attribute(&doc, &mut script, "src", "a.js").unwrap();
        let counter = Rc::clone(&fired);
        doc.on_load(&mut script, Box::new(move |r: Result<(), LoadError>| {
            assert!(r.is_ok());
            counter.set(counter.get() + 1);
        }))
        .unwrap();
        doc.append_to_head(script).unwrap();

        assert_eq!(doc.scripts(), vec!["a.js"]);
        assert_eq!(doc.complete_load("b.js"), 0);
        assert_eq!(doc.complete_load("a.js"), 1);
        assert_eq!(doc.complete_load("a.js"), 0);
        assert_eq!(fired.get(), 1);
    }
}
