//! Arena-based DOM tree storage
//!
//! This arena eliminates:
//! - Rc/RefCell juggling for parent/child links
//! - Recursive function calls (stack overflow risk on deeply nested folders)
//! - Cache misses (nodes stored sequentially)
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Nodes are never freed individually. Detaching a node only unlinks it;
//! it stays in the arena, unreachable from the root.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
            root_id: None,
        }
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Create an arena holding a single, empty document node as root
    pub fn new_document() -> Self {
        let mut arena = Self::new();
        let doc = arena.add_node(DomNode::new(
            0,
            NodeType::Document,
            NodeType::Document.default_name(),
        ));
        arena.root_id = Some(doc);
        arena
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's `node_id` is overwritten with its arena slot.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Add a detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(DomNode::new(0, NodeType::Element, tag.to_ascii_lowercase()))
    }

    /// Add a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, NodeType::Text.default_name());
        node.node_value = text.into();
        self.add_node(node)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes (including detached ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Element ancestors, nearest first, excluding the document node
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.get(node_id).ok().and_then(|node| node.parent_id);

        while let Some(id) = current {
            let Ok(node) = self.get(id) else { break };
            if node.is_element() {
                ancestors.push(id);
            }
            current = node.parent_id;
        }

        ancestors
    }

    /// Unlink a node from its parent. No-op for detached nodes.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let parent_id = self.get(node_id)?.parent_id;
        if let Some(parent_id) = parent_id {
            self.get_mut(parent_id)?
                .children_ids
                .retain(|child| *child != node_id);
            self.get_mut(node_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Append `child` as last child of `parent`, moving it if already attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(child)?;
        if parent == child || self.ancestors_inclusive(parent).any(|id| id == child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    fn ancestors_inclusive(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node_id), move |&id| {
            self.get(id).ok().and_then(|node| node.parent_id)
        })
    }

    /// Deep-copy a subtree of `source` into this arena as a detached node
    ///
    /// Iterative, so arbitrarily deep folder nesting is fine.
    pub fn import_node(&mut self, source: &DomArena, node_id: NodeId) -> Result<NodeId> {
        let mut mapping: AHashMap<NodeId, NodeId> = AHashMap::new();
        let mut stack = vec![node_id];

        while let Some(source_id) = stack.pop() {
            let original = source.get(source_id)?;

            let mut copy = original.clone();
            copy.parent_id = None;
            copy.children_ids.clear();
            let new_id = self.add_node(copy);
            mapping.insert(source_id, new_id);

            if let Some(source_parent) = original.parent_id {
                if let Some(&new_parent) = mapping.get(&source_parent) {
                    self.get_mut(new_parent)?.children_ids.push(new_id);
                    self.get_mut(new_id)?.parent_id = Some(new_parent);
                }
            }

            // Reverse push so children are copied left-to-right
            for &child_id in original.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        mapping
            .get(&node_id)
            .copied()
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Pre-order iterator over `start` and all its descendants
    pub fn descendants(&self, start_id: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            stack: vec![start_id],
        }
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        self.get(start_id)?;
        for node_id in self.descendants(start_id) {
            visit(self.get(node_id)?)?;
        }
        Ok(())
    }

    /// All elements with the given tag among `scope` and its descendants,
    /// in document order
    pub fn select(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| self.get(id).is_ok_and(|node| node.has_tag(tag)))
            .collect()
    }

    /// First element with the given tag among `scope` and its descendants
    pub fn select_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .find(|&id| self.get(id).is_ok_and(|node| node.has_tag(tag)))
    }

    /// Element children of a node
    pub fn child_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        let Ok(node) = self.get(node_id) else {
            return Vec::new();
        };
        node.children_ids
            .iter()
            .copied()
            .filter(|&id| self.get(id).is_ok_and(DomNode::is_element))
            .collect()
    }

    /// The next sibling of `node_id` that is an element
    pub fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id).ok().flatten()?;
        parent
            .children_ids
            .iter()
            .skip_while(|&&id| id != node_id)
            .skip(1)
            .copied()
            .find(|&id| self.get(id).is_ok_and(DomNode::is_element))
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order walk over a subtree, see [`DomArena::descendants`]
pub struct Descendants<'a> {
    arena: &'a DomArena,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let node_id = self.stack.pop()?;
            let Ok(node) = self.arena.get(node_id) else {
                continue;
            };
            // Push children in reverse order (so they're visited left-to-right)
            self.stack.extend(node.children_ids.iter().rev().copied());
            return Some(node_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// document -> html -> body -> [dl -> [dt, dt], p]
    fn sample() -> (DomArena, NodeId, NodeId) {
        let mut arena = DomArena::new_document();
        let doc = arena.root_id().unwrap();
        let html = arena.create_element("html");
        let body = arena.create_element("body");
        let dl = arena.create_element("DL");
        let dt1 = arena.create_element("dt");
        let dt2 = arena.create_element("dt");
        let p = arena.create_element("p");

        arena.append_child(doc, html).unwrap();
        arena.append_child(html, body).unwrap();
        arena.append_child(body, dl).unwrap();
        arena.append_child(dl, dt1).unwrap();
        arena.append_child(dl, dt2).unwrap();
        arena.append_child(body, p).unwrap();

        (arena, body, dl)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("div");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert_eq!(retrieved.node_id, id);
        assert!(arena.get(42).is_err());
    }

    #[test]
    fn test_select_includes_scope_and_keeps_document_order() {
        let (arena, body, dl) = sample();

        assert_eq!(arena.select_first(dl, "dl"), Some(dl));
        assert_eq!(arena.select(body, "dt").len(), 2);
        assert_eq!(arena.select_first(body, "h3"), None);
    }

    #[test]
    fn test_ancestors_exclude_document() {
        let (arena, _, dl) = sample();
        assert_eq!(arena.ancestors(dl).len(), 2);
    }

    #[test]
    fn test_append_child_moves_node() {
        let (mut arena, body, dl) = sample();
        let p = *arena.get(body).unwrap().children_ids.last().unwrap();

        arena.append_child(dl, p).unwrap();

        assert_eq!(arena.get(body).unwrap().children_ids.as_slice(), &[dl]);
        assert_eq!(arena.get(p).unwrap().parent_id, Some(dl));
        assert_eq!(arena.child_elements(dl).last(), Some(&p));
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let (mut arena, body, dl) = sample();
        assert_eq!(
            arena.append_child(dl, body),
            Err(DomError::HierarchyRequest {
                parent: dl,
                child: body
            })
        );
        assert!(arena.append_child(dl, dl).is_err());
    }

    #[test]
    fn test_next_element_sibling() {
        let (mut arena, body, dl) = sample();
        let text = arena.create_text("\n");
        let dd = arena.create_element("dd");
        arena.append_child(body, text).unwrap();
        arena.append_child(body, dd).unwrap();

        let p = arena.child_elements(body)[1];
        assert_eq!(arena.next_element_sibling(dl), Some(p));
        assert_eq!(arena.next_element_sibling(p), Some(dd));
        assert_eq!(arena.next_element_sibling(dd), None);
    }

    #[test]
    fn test_import_node_deep_copies_in_order() {
        let (source, body, _) = sample();
        let mut target = DomArena::new_document();
        let root = target.root_id().unwrap();

        let copy = target.import_node(&source, body).unwrap();
        target.append_child(root, copy).unwrap();

        let names: Vec<_> = target
            .descendants(copy)
            .map(|id| target.get(id).unwrap().node_name.clone())
            .collect();
        assert_eq!(names, vec!["body", "dl", "dt", "dt", "p"]);
        // Source untouched
        assert_eq!(source.ancestors(body).len(), 1);
    }

    #[test]
    fn test_traverse_df() {
        let (arena, body, _) = sample();

        let mut visited = Vec::new();
        arena
            .traverse_df(body, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["body", "dl", "dt", "dt", "p"]);
    }
}
