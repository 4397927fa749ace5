//! Bookmark tree model
//!
//! A tree of immutable values. Parsing builds one in a single pass,
//! serializing consumes one. Editing means building a new tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in time attached to a bookmark or folder
pub type Timestamp = DateTime<Utc>;

/// Optional creation / modification dates of an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkMetadata {
    pub added_at: Option<Timestamp>,
    pub modified_at: Option<Timestamp>,
}

impl BookmarkMetadata {
    /// No dates at all
    pub const EMPTY: Self = Self {
        added_at: None,
        modified_at: None,
    };

    pub fn new(added_at: Option<Timestamp>, modified_at: Option<Timestamp>) -> Self {
        Self {
            added_at,
            modified_at,
        }
    }

    /// Build from whole seconds since the Unix epoch; out-of-range values are dropped
    pub fn from_epoch_seconds(added_at: Option<i64>, modified_at: Option<i64>) -> Self {
        Self {
            added_at: added_at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            modified_at: modified_at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_at.is_none() && self.modified_at.is_none()
    }
}

/// One node of a bookmark tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkItem {
    Folder {
        title: String,
        children: Vec<BookmarkItem>,
        metadata: BookmarkMetadata,
    },
    Bookmark {
        title: String,
        url: String,
        metadata: BookmarkMetadata,
    },
}

impl BookmarkItem {
    pub fn folder(
        title: impl Into<String>,
        children: Vec<BookmarkItem>,
        metadata: BookmarkMetadata,
    ) -> Self {
        BookmarkItem::Folder {
            title: title.into(),
            children,
            metadata,
        }
    }

    pub fn bookmark(
        title: impl Into<String>,
        url: impl Into<String>,
        metadata: BookmarkMetadata,
    ) -> Self {
        BookmarkItem::Bookmark {
            title: title.into(),
            url: url.into(),
            metadata,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            BookmarkItem::Folder { title, .. } | BookmarkItem::Bookmark { title, .. } => title,
        }
    }

    pub fn metadata(&self) -> &BookmarkMetadata {
        match self {
            BookmarkItem::Folder { metadata, .. } | BookmarkItem::Bookmark { metadata, .. } => {
                metadata
            }
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, BookmarkItem::Folder { .. })
    }

    /// Children of a folder; empty for a bookmark
    pub fn children(&self) -> &[BookmarkItem] {
        match self {
            BookmarkItem::Folder { children, .. } => children,
            BookmarkItem::Bookmark { .. } => &[],
        }
    }

    /// Number of bookmarks (leaves) in this subtree
    pub fn bookmark_count(&self) -> usize {
        flatten(std::slice::from_ref(self)).len()
    }
}

/// Iterative teardown; nesting depth is unbounded
impl Drop for BookmarkItem {
    fn drop(&mut self) {
        let BookmarkItem::Folder { children, .. } = self else {
            return;
        };
        if children.iter().all(|child| child.children().is_empty()) {
            return;
        }

        let mut pending = std::mem::take(children);
        while let Some(mut item) = pending.pop() {
            if let BookmarkItem::Folder { children, .. } = &mut item {
                pending.append(children);
            }
        }
    }
}

/// All bookmarks (leaves) of a forest in document order
pub fn flatten(items: &[BookmarkItem]) -> Vec<&BookmarkItem> {
    let mut leaves = Vec::new();
    let mut stack: Vec<&BookmarkItem> = items.iter().rev().collect();

    while let Some(item) = stack.pop() {
        match item {
            BookmarkItem::Folder { children, .. } => stack.extend(children.iter().rev()),
            BookmarkItem::Bookmark { .. } => leaves.push(item),
        }
    }

    leaves
}

/// Deterministic, indented debug rendering of a bookmark forest
///
/// ```text
/// Folder("Bookmarks bar", added: 1634130136, modified: 1655375036)
///   Bookmark("Ecosia", "https://www.ecosia.org/", added: 1634130173)
/// ```
pub struct Outline<'a>(pub &'a [BookmarkItem]);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One sibling iterator per open folder
        let mut stack = vec![self.0.iter()];

        while let Some(level) = stack.last_mut() {
            let Some(item) = level.next() else {
                stack.pop();
                continue;
            };

            let indent = "  ".repeat(stack.len() - 1);
            match item {
                BookmarkItem::Folder {
                    title,
                    children,
                    metadata,
                } => {
                    writeln!(f, "{}Folder({:?}{})", indent, title, MetadataSuffix(metadata))?;
                    stack.push(children.iter());
                }
                BookmarkItem::Bookmark {
                    title,
                    url,
                    metadata,
                } => {
                    writeln!(
                        f,
                        "{}Bookmark({:?}, {:?}{})",
                        indent,
                        title,
                        url,
                        MetadataSuffix(metadata)
                    )?;
                }
            }
        }

        Ok(())
    }
}

struct MetadataSuffix<'a>(&'a BookmarkMetadata);

impl fmt::Display for MetadataSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(added_at) = self.0.added_at {
            write!(f, ", added: {}", added_at.timestamp())?;
        }
        if let Some(modified_at) = self.0.modified_at {
            write!(f, ", modified: {}", modified_at.timestamp())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<BookmarkItem> {
        vec![
            BookmarkItem::folder(
                "Bar",
                vec![
                    BookmarkItem::bookmark("A", "https://a.example/", BookmarkMetadata::EMPTY),
                    BookmarkItem::folder(
                        "Nested",
                        vec![BookmarkItem::bookmark(
                            "B",
                            "https://b.example/",
                            BookmarkMetadata::from_epoch_seconds(Some(10), None),
                        )],
                        BookmarkMetadata::EMPTY,
                    ),
                ],
                BookmarkMetadata::from_epoch_seconds(Some(1), Some(2)),
            ),
            BookmarkItem::bookmark("C", "https://c.example/", BookmarkMetadata::EMPTY),
        ]
    }

    #[test]
    fn test_flatten_keeps_document_order() {
        let items = sample();
        let titles: Vec<_> = flatten(&items).iter().map(|item| item.title()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(items[0].bookmark_count(), 2);
        assert_eq!(items[1].bookmark_count(), 1);
    }

    #[test]
    fn test_outline() {
        let expected = concat!(
            "Folder(\"Bar\", added: 1, modified: 2)\n",
            "  Bookmark(\"A\", \"https://a.example/\")\n",
            "  Folder(\"Nested\")\n",
            "    Bookmark(\"B\", \"https://b.example/\", added: 10)\n",
            "Bookmark(\"C\", \"https://c.example/\")\n",
        );
        assert_eq!(Outline(&sample()).to_string(), expected);
    }

    #[test]
    fn test_metadata_defaults_to_empty() {
        assert_eq!(BookmarkMetadata::default(), BookmarkMetadata::EMPTY);
        assert!(BookmarkMetadata::EMPTY.is_empty());
        assert!(!BookmarkMetadata::from_epoch_seconds(None, Some(0)).is_empty());
    }

    #[test]
    fn test_accessors() {
        let items = sample();
        assert!(items[0].is_folder());
        assert_eq!(items[0].children().len(), 2);
        assert!(items[1].children().is_empty());
        assert_eq!(items[0].metadata().added_at.map(|t| t.timestamp()), Some(1));
    }

    fn nested(depth: usize) -> BookmarkItem {
        let mut item =
            BookmarkItem::bookmark("deep", "https://deep.example/", BookmarkMetadata::EMPTY);
        for _ in 0..depth {
            item = BookmarkItem::folder("F", vec![item], BookmarkMetadata::EMPTY);
        }
        item
    }

    #[test]
    fn test_deep_tree_outline_and_drop() {
        let depth = 5_000;
        let items = vec![nested(depth)];

        let outline = Outline(&items).to_string();
        assert_eq!(outline.lines().count(), depth + 1);
        let leaf = format!(
            "{}Bookmark(\"deep\", \"https://deep.example/\")\n",
            "  ".repeat(depth)
        );
        assert!(outline.ends_with(&leaf));
        assert_eq!(items[0].bookmark_count(), 1);
    }

    #[test]
    fn test_very_deep_tree_drops() {
        let item = nested(200_000);
        assert!(item.is_folder());
        drop(item);
    }
}
