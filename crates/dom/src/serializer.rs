//! DOM Serializer - Render an arena as an indented markup outline
//!
//! This module handles:
//! - Dumping a (sub)tree for trace logs and test assertions
//! - XPath generation for pointing at a node in log messages
//!
//! The outline is for humans. It is not valid HTML and never round-trips.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub include_attributes: bool,
    pub max_text_length: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_attributes: true,
            max_text_length: 80,
        }
    }
}

/// Pending work of the outline walk
enum Step {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the whole document
    pub fn serialize(&self, arena: &DomArena) -> Result<String> {
        match arena.root_id() {
            Some(root_id) => self.serialize_subtree(arena, root_id),
            None => Ok(String::new()),
        }
    }

    /// Serialize `node_id` and everything below it
    pub fn serialize_subtree(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(1024);

        // Explicit stack: documents can nest deeper than the thread stack allows
        let mut stack = vec![Step::Open(node_id, 0)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id, depth) => {
                    self.open_node(arena, id, depth, &mut stack, &mut output)?
                }
                Step::Close(id, depth) => {
                    let node = arena.get(id)?;
                    output.push_str(&"  ".repeat(depth));
                    output.push_str("</");
                    output.push_str(&node.node_name);
                    output.push_str(">\n");
                }
            }
        }

        Ok(output)
    }

    /// Write the opening line of a node and schedule its children
    fn open_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        stack: &mut Vec<Step>,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = "  ".repeat(depth);

        let child_depth = match node.node_type {
            NodeType::Element => {
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);

                if self.config.include_attributes {
                    // Sorted so the outline is stable across runs
                    let mut attributes: Vec<_> = node.attributes.iter().collect();
                    attributes.sort();
                    for (name, value) in attributes {
                        let value = cap_text_length(value, self.config.max_text_length);
                        output.push_str(&format!(" {}=\"{}\"", name, value));
                    }
                }

                output.push_str(">\n");
                stack.push(Step::Close(node_id, depth));
                depth + 1
            }
            NodeType::Text => {
                let text = node.node_value.trim();
                if !text.is_empty() {
                    output.push_str(&indent);
                    output.push_str(&cap_text_length(text, self.config.max_text_length));
                    output.push('\n');
                }
                return Ok(());
            }
            NodeType::Document | NodeType::DocumentFragment => depth,
            _ => return Ok(()),
        };

        for &child_id in node.children_ids.iter().rev() {
            stack.push(Step::Open(child_id, child_depth));
        }

        Ok(())
    }

    /// Generate XPath for a node
    pub fn generate_xpath(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut path_parts = Vec::new();
        let mut current_id = Some(node_id);

        while let Some(id) = current_id {
            let node = arena.get(id)?;

            if node.node_type == NodeType::Element {
                // Get position among siblings with same tag name
                let position = if let Some(parent_id) = node.parent_id {
                    let parent = arena.get(parent_id)?;
                    parent
                        .children_ids
                        .iter()
                        .filter_map(|&child_id| arena.get(child_id).ok())
                        .filter(|child| {
                            child.node_type == NodeType::Element
                                && child.node_name == node.node_name
                        })
                        .position(|child| child.node_id == node.node_id)
                        .map(|p| p + 1) // XPath is 1-indexed
                        .unwrap_or(1)
                } else {
                    1
                };

                path_parts.push(format!("{}[{}]", node.node_name, position));
            }

            current_id = node.parent_id;
        }

        path_parts.reverse();
        Ok(format!("/{}", path_parts.join("/")))
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cap text length so huge `ICON` data URIs don't flood the logs
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::parse_html;

    #[test]
    fn test_serialize_simple_dom() {
        let arena = parse_html(r#"<DL><p><DT><A HREF="https://x.example/">X</A></DL>"#).unwrap();

        let output = DomSerializer::new().serialize(&arena).unwrap();

        assert_eq!(
            output,
            concat!(
                "<html>\n",
                "  <head>\n",
                "  </head>\n",
                "  <body>\n",
                "    <dl>\n",
                "      <p>\n",
                "      </p>\n",
                "      <dt>\n",
                "        <a href=\"https://x.example/\">\n",
                "          X\n",
                "        </a>\n",
                "      </dt>\n",
                "    </dl>\n",
                "  </body>\n",
                "</html>\n",
            )
        );
    }

    #[test]
    fn test_serialize_deep_document() {
        let depth = 5_000;
        let mut arena = DomArena::new_document();
        let doc = arena.root_id().unwrap();

        // Built leaf-first so every append sees a detached parent
        let mut current = arena.create_element("a");
        for _ in 0..depth {
            let list = arena.create_element("dl");
            arena.append_child(list, current).unwrap();
            current = list;
        }
        arena.append_child(doc, current).unwrap();

        let output = DomSerializer::new().serialize(&arena).unwrap();

        assert_eq!(output.lines().count(), 2 * (depth + 1));
        assert!(output.starts_with("<dl>\n  <dl>\n"));
        let indent = "  ".repeat(depth);
        assert!(output.contains(&format!("{}<a>\n{}</a>\n", indent, indent)));
        assert!(output.ends_with("  </dl>\n</dl>\n"));
    }

    #[test]
    fn test_generate_xpath() {
        let arena = parse_html("<DL><p><DT>a<DT>b</DL>").unwrap();
        let doc = arena.root_id().unwrap();
        let second_dt = arena.select(doc, "dt")[1];

        let xpath = DomSerializer::new().generate_xpath(&arena, second_dt).unwrap();
        assert_eq!(xpath, "/html[1]/body[1]/dl[1]/dt[2]");
    }

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("ééééé", 2), "éé...");
    }
}
