//! DOM Service - Main entry point for turning HTML text into an arena
//!
//! This handles:
//! - Running the html5ever tree builder (through `scraper`)
//! - Lowering the resulting tree into a [`DomArena`]
//!
//! The tree builder applies the HTML5 error-recovery rules, so the arena
//! looks exactly like what a browser would build for the same bytes.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use scraper::{Html, Node};

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    /// Keep comment nodes in the arena
    pub keep_comments: bool,
    /// Initial arena capacity
    pub capacity: usize,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            keep_comments: false,
            capacity: 1024,
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        let arena = DomArena::with_capacity(config.capacity);
        Self { config, arena }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Give up the service and keep the arena
    pub fn into_arena(self) -> DomArena {
        self.arena
    }

    /// Parse an HTML document and rebuild the arena from it
    ///
    /// Never fails on malformed markup; html5ever recovers the way browsers
    /// do. Returns the document node id.
    pub fn parse_html(&mut self, source: &str) -> Result<NodeId> {
        let html = Html::parse_document(source);

        self.arena.clear();
        let mut root_id = None;

        // Explicit stack: nesting depth is driven by untrusted input
        let mut stack = vec![(html.tree.root(), None::<NodeId>)];

        while let Some((node, parent_id)) = stack.pop() {
            let mut dom_node = match node.value() {
                Node::Document => DomNode::new(
                    0,
                    NodeType::Document,
                    NodeType::Document.default_name(),
                ),
                Node::Fragment => DomNode::new(
                    0,
                    NodeType::DocumentFragment,
                    NodeType::DocumentFragment.default_name(),
                ),
                Node::Doctype(doctype) => {
                    DomNode::new(0, NodeType::DocumentType, doctype.name())
                }
                Node::Comment(comment) => {
                    if !self.config.keep_comments {
                        continue;
                    }
                    let mut dom_node =
                        DomNode::new(0, NodeType::Comment, NodeType::Comment.default_name());
                    dom_node.node_value = String::from(&**comment);
                    dom_node
                }
                Node::Text(text) => {
                    let mut dom_node =
                        DomNode::new(0, NodeType::Text, NodeType::Text.default_name());
                    dom_node.node_value = String::from(&**text);
                    dom_node
                }
                Node::Element(element) => {
                    let mut dom_node = DomNode::new(0, NodeType::Element, element.name());
                    for (name, value) in element.attrs() {
                        dom_node.set_attr(name, value);
                    }
                    dom_node
                }
                _ => continue,
            };

            dom_node.parent_id = parent_id;
            let node_id = self.arena.add_node(dom_node);

            match parent_id {
                Some(parent_id) => self.arena.get_mut(parent_id)?.children_ids.push(node_id),
                None => root_id = Some(node_id),
            }

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(node_id)));
            }
        }

        let root_id = root_id.unwrap_or_else(|| {
            self.arena.add_node(DomNode::new(
                0,
                NodeType::Document,
                NodeType::Document.default_name(),
            ))
        });
        self.arena.set_root(root_id)?;

        tracing::debug!("Parsed HTML document into {} nodes", self.arena.len());
        Ok(root_id)
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse HTML text into a fresh arena with the default configuration
pub fn parse_html(source: &str) -> Result<DomArena> {
    let mut service = DomService::new();
    service.parse_html(source)?;
    Ok(service.into_arena())
}
