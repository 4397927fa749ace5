//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};

/// Collapse runs of HTML whitespace into single spaces and trim the ends
///
/// HTML whitespace is ASCII only, so a non-breaking space survives.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Get all text content from node and its children, in document order
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if node.node_type == NodeType::Text {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Bookmarks\n\t bar  "), "Bookmarks bar");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("a\u{a0} b"), "a\u{a0} b");
    }

    #[test]
    fn test_get_text_content_concatenates_descendants() {
        let mut arena = DomArena::new_document();
        let a = arena.create_element("a");
        let b = arena.create_element("b");
        let t1 = arena.create_text("Cats & ");
        let t2 = arena.create_text("Dogs");
        arena.append_child(a, t1).unwrap();
        arena.append_child(a, b).unwrap();
        arena.append_child(b, t2).unwrap();

        assert_eq!(get_text_content(&arena, a).unwrap(), "Cats & Dogs");
    }
}
