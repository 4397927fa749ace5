//! The capability surface the bookmark normalizer and parser need from an
//! HTML tree.
//!
//! Everything above this trait is written against it, so a synthetic tree
//! can stand in for a parsed document in tests.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::serializer::DomSerializer;
use crate::types::NodeId;
use crate::utils;

/// Queryable, minimally mutable HTML document
pub trait HtmlDocument: Sized {
    /// A fresh document containing only the document node
    fn empty() -> Self;

    /// The document node
    fn document(&self) -> NodeId;

    /// Elements named `tag` among `scope` and its descendants, document order
    fn select(&self, scope: NodeId, tag: &str) -> Vec<NodeId>;

    /// First element named `tag` among `scope` and its descendants
    fn select_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.select(scope, tag).into_iter().next()
    }

    /// Lowercase tag name, `None` for non-elements
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Concatenated text of all descendant text nodes
    fn text(&self, node: NodeId) -> String;

    /// Attribute value, name matched case-insensitively
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Number of element ancestors (the document node is not counted)
    fn depth(&self, node: NodeId) -> usize;

    /// All child nodes, including text and comments
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// Element children only
    fn child_elements(&self, node: NodeId) -> Vec<NodeId>;

    /// Next sibling that is an element
    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Append `child` to `parent`, moving it if it is already attached
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Deep-copy `node` out of `source` as a detached node of `self`
    fn import_node(&mut self, source: &Self, node: NodeId) -> Result<NodeId>;

    /// Human-readable location of a node, for log messages
    fn node_path(&self, node: NodeId) -> String {
        self.tag_name(node).unwrap_or("#node").to_string()
    }
}

impl HtmlDocument for DomArena {
    fn empty() -> Self {
        DomArena::new_document()
    }

    fn document(&self) -> NodeId {
        // Arenas built by `DomService` or `new_document` always have a root
        self.root_id().unwrap_or_default()
    }

    fn select(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        DomArena::select(self, scope, tag)
    }

    fn select_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        DomArena::select_first(self, scope, tag)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.get(node).ok().and_then(|node| node.tag_name())
    }

    fn text(&self, node: NodeId) -> String {
        utils::get_text_content(self, node).unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).ok().and_then(|node| node.attr(name))
    }

    fn depth(&self, node: NodeId) -> usize {
        self.ancestors(node).len()
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node)
            .map(|node| node.children_ids.to_vec())
            .unwrap_or_default()
    }

    fn child_elements(&self, node: NodeId) -> Vec<NodeId> {
        DomArena::child_elements(self, node)
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        DomArena::next_element_sibling(self, node)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        DomArena::create_element(self, tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(parent)?.is_text() {
            return Err(DomError::InvalidNodeType {
                expected: "element or document".to_string(),
                actual: "#text".to_string(),
            });
        }
        DomArena::append_child(self, parent, child)
    }

    fn import_node(&mut self, source: &Self, node: NodeId) -> Result<NodeId> {
        DomArena::import_node(self, source, node)
    }

    fn node_path(&self, node: NodeId) -> String {
        DomSerializer::new()
            .generate_xpath(self, node)
            .unwrap_or_else(|_| format!("#{}", node))
    }
}
