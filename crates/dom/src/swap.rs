use crate::document::{Document, NodeId};
use hrepr_core::{deferred, LoadError, Pending, Resolver};
use serde_json::Value;

/// What a placeholder node turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The representation has an element of its own which takes the
    /// placeholder's place.
    Element(NodeId),
    /// The representation has no element; the placeholder is removed.
    Opaque,
}

impl Document {
    /// Promises a representation to the element with `id`.
    ///
    /// The returned resolver delivers it; anyone holding the node can wait on
    /// [`object`](Document::object). Preparing the same node again replaces
    /// the previous promise.
    pub fn prepare(&self, id: &str) -> Result<Resolver<Value>, LoadError> {
        let node = self.element_by_id(id).ok_or_else(|| LoadError::node_not_found(id))?;
        let (resolver, pending) = deferred();
        self.nodes.borrow_mut()[node.0].object = Some(pending);
        Ok(resolver)
    }

    /// The representation promised to `node`, if it was prepared.
    pub fn object(&self, node: NodeId) -> Option<Pending<Value>> {
        self.nodes.borrow().get(node.0)?.object.clone()
    }

    /// Replaces the placeholder `orig` by its representation.
    ///
    /// An element replacement inherits the placeholder's `id` and promised
    /// object, so lookups by id keep working. `None` leaves `orig` untouched.
    pub fn swap(&self, orig: NodeId, replacement: Option<Replacement>) -> Result<(), LoadError> {
        self.check(orig)?;
        match replacement {
            None => Ok(()),
            Some(Replacement::Opaque) => self.remove(orig),
            Some(Replacement::Element(node)) => {
                self.check(node)?;
                {
                    let mut nodes = self.nodes.borrow_mut();
                    let object = nodes[orig.0].object.take();
                    nodes[node.0].object = object;
                }
                if let Some(id) = self.attribute(orig, "id") {
                    self.set_attribute(node, "id", &id)?;
                }
                self.replace_with(orig, node)
            }
        }
    }
}
