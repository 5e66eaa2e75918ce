use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a tree node.
///
/// The tree is mutated in place by rule handlers while a transformation run
/// is in flight, all on one logical thread, so nodes are reference-counted
/// with interior mutability rather than exclusively owned. A parent's
/// `children` vector is the only persistent edge; the parser holds a
/// transient open-node stack while building, and nothing else keeps
/// back-references.
pub type NodeRef = Rc<RefCell<Node>>;

/// A parsed markup element: tag name, attribute map, accumulated text and
/// ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeRef>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Wrap a node in the shared handle used throughout the tree.
    pub fn into_ref(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn append_child(&mut self, child: NodeRef) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_is_recursive() {
        let mut a = Node::new("div");
        a.set_attribute("class", "x");
        a.append_child(Node::new("span").into_ref());

        let mut b = Node::new("div");
        b.set_attribute("class", "x");
        b.append_child(Node::new("span").into_ref());

        assert_eq!(a, b);

        b.children[0].borrow_mut().text.push_str("hi");
        assert_ne!(a, b);
    }

    #[test]
    fn serde_round_trip() {
        let mut node = Node::new("a");
        node.set_attribute("href", "/home");
        node.text.push_str("home");

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
