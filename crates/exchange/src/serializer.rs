//! Bookmark serializer
//!
//! Writes a bookmark forest as a Netscape bookmark file, the structural
//! inverse of the parser:
//!
//! ```text
//! <!DOCTYPE NETSCAPE-Bookmark-file-1>
//!     <META ...><Title>..</Title><H1>..</H1>
//!     <DL><p>
//!         <DT><H3 ADD_DATE=".." FOLDED>folder</H3>
//!         <DL><p>
//!             <DT><A ADD_DATE=".." HREF="..">bookmark</A>
//!         </DL><p>
//!     </DL><p>
//! </HTML>
//! ```
//!
//! Indentation is cosmetic; importers only care about the elements.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::SerializerConfig;
use crate::error::{Cancelled, SerializeError};
use crate::format::{
    escape_html, ADD_DATE, DOCTYPE, DOCUMENT_CLOSE, FOLDED, HREF, LAST_MODIFIED, LIST_CLOSE,
    LIST_OPEN, META_CHARSET,
};
use crate::model::{BookmarkItem, BookmarkMetadata};
use crate::worker;

/// Nesting level of top-level entries; the header and root list sit at 1
const TOP_LEVEL_DEPTH: usize = 2;

/// Anything that can turn a bookmark forest into text asynchronously
#[async_trait]
pub trait BookmarkSerializable: Send + Sync {
    async fn serialize_bookmarks(
        &self,
        bookmarks: Vec<BookmarkItem>,
    ) -> Result<String, SerializeError>;
}

/// Netscape bookmark file writer
#[derive(Debug, Clone, Default)]
pub struct BookmarkSerializer {
    config: SerializerConfig,
}

impl BookmarkSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize on the current thread
    pub fn serialize(&self, items: &[BookmarkItem]) -> String {
        // Without a token nothing can cancel the walk
        self.render(items, None).unwrap_or_default()
    }

    /// Serialize on a blocking worker, giving up with `Cancelled` when `cancel` fires
    pub async fn serialize_with_cancellation(
        &self,
        items: Vec<BookmarkItem>,
        cancel: &CancellationToken,
    ) -> Result<String, SerializeError> {
        let serializer = self.clone();

        let rendered = worker::offload("serialize", cancel, move |token| {
            serializer.render(&items, Some(&token))
        })
        .await??;

        Ok(rendered)
    }

    fn render(
        &self,
        items: &[BookmarkItem],
        cancel: Option<&CancellationToken>,
    ) -> Result<String, Cancelled> {
        let indent = &self.config.indent;
        let title = escape_html(&self.config.document_title);

        let mut output = String::with_capacity(256 + items.len() * 128);
        output.push_str(DOCTYPE);
        output.push('\n');
        output.push_str(&format!("{}{}\n", indent, META_CHARSET));
        output.push_str(&format!("{}<Title>{}</Title>\n", indent, title));
        output.push_str(&format!("{}<H1>{}</H1>\n", indent, title));
        output.push_str(&format!("{}{}\n", indent, LIST_OPEN));

        self.write_items(items, cancel, &mut output)?;

        output.push_str(&format!("{}{}\n", indent, LIST_CLOSE));
        output.push_str(DOCUMENT_CLOSE);
        output.push('\n');

        Ok(output)
    }

    /// Append every entry of the forest
    ///
    /// Walks with an explicit stack of sibling iterators, one per open
    /// folder; a folder's closing line is written when its frame pops.
    fn write_items(
        &self,
        items: &[BookmarkItem],
        cancel: Option<&CancellationToken>,
        output: &mut String,
    ) -> Result<(), Cancelled> {
        let mut stack = vec![items.iter()];

        while let Some(level) = stack.last_mut() {
            let Some(item) = level.next() else {
                stack.pop();
                if !stack.is_empty() {
                    let indent = self.config.indent.repeat(TOP_LEVEL_DEPTH + stack.len() - 1);
                    output.push_str(&format!("{}{}\n", indent, LIST_CLOSE));
                }
                continue;
            };

            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(Cancelled);
            }

            let indent = self.config.indent.repeat(TOP_LEVEL_DEPTH + stack.len() - 1);

            match item {
                BookmarkItem::Bookmark {
                    title,
                    url,
                    metadata,
                } => {
                    output.push_str(&format!(
                        "{}<DT><A{} {}=\"{}\">{}</A>\n",
                        indent,
                        metadata_attributes(metadata),
                        HREF,
                        escape_html(url),
                        escape_html(title)
                    ));
                }
                BookmarkItem::Folder {
                    title,
                    children,
                    metadata,
                } => {
                    let folded = if self.config.folded {
                        format!(" {}", FOLDED)
                    } else {
                        String::new()
                    };
                    output.push_str(&format!(
                        "{}<DT><H3{}{}>{}</H3>\n",
                        indent,
                        metadata_attributes(metadata),
                        folded,
                        escape_html(title)
                    ));
                    output.push_str(&format!("{}{}\n", indent, LIST_OPEN));
                    stack.push(children.iter());
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl BookmarkSerializable for BookmarkSerializer {
    async fn serialize_bookmarks(
        &self,
        bookmarks: Vec<BookmarkItem>,
    ) -> Result<String, SerializeError> {
        self.serialize_with_cancellation(bookmarks, &CancellationToken::new())
            .await
    }
}

/// Serialize with the default configuration on the current thread
pub fn serialize(items: &[BookmarkItem]) -> String {
    BookmarkSerializer::new().serialize(items)
}

/// ` ADD_DATE=".." LAST_MODIFIED=".."` for the dates that are present
fn metadata_attributes(metadata: &BookmarkMetadata) -> String {
    let mut attributes = String::new();
    if let Some(added_at) = metadata.added_at {
        attributes.push_str(&format!(" {}=\"{}\"", ADD_DATE, added_at.timestamp()));
    }
    if let Some(modified_at) = metadata.modified_at {
        attributes.push_str(&format!(" {}=\"{}\"", LAST_MODIFIED, modified_at.timestamp()));
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(added: Option<i64>, modified: Option<i64>) -> BookmarkMetadata {
        BookmarkMetadata::from_epoch_seconds(added, modified)
    }

    #[test]
    fn test_serialize_document() {
        let items = vec![
            BookmarkItem::folder(
                "Bar",
                vec![
                    BookmarkItem::bookmark("A", "https://a.example/", meta(Some(101), Some(102))),
                    BookmarkItem::folder("Empty", vec![], BookmarkMetadata::EMPTY),
                ],
                meta(Some(100), None),
            ),
            BookmarkItem::bookmark("B", "https://b.example/", BookmarkMetadata::EMPTY),
        ];

        let expected = concat!(
            "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n",
            "\t<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n",
            "\t<Title>Bookmarks</Title>\n",
            "\t<H1>Bookmarks</H1>\n",
            "\t<DL><p>\n",
            "\t\t<DT><H3 ADD_DATE=\"100\" FOLDED>Bar</H3>\n",
            "\t\t<DL><p>\n",
            "\t\t\t<DT><A ADD_DATE=\"101\" LAST_MODIFIED=\"102\" HREF=\"https://a.example/\">A</A>\n",
            "\t\t\t<DT><H3 FOLDED>Empty</H3>\n",
            "\t\t\t<DL><p>\n",
            "\t\t\t</DL><p>\n",
            "\t\t</DL><p>\n",
            "\t\t<DT><A HREF=\"https://b.example/\">B</A>\n",
            "\t</DL><p>\n",
            "</HTML>\n",
        );

        assert_eq!(serialize(&items), expected);
    }

    #[test]
    fn test_empty_forest_still_has_header_and_list() {
        let output = serialize(&[]);
        assert!(output.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n"));
        assert!(output.ends_with("\t<DL><p>\n\t</DL><p>\n</HTML>\n"));
    }

    #[test]
    fn test_titles_and_urls_are_escaped() {
        let items = vec![BookmarkItem::bookmark(
            r#"Cats & "Dogs" <3"#,
            "https://a.example/?q=\"x\"&y=1",
            BookmarkMetadata::EMPTY,
        )];

        let output = serialize(&items);

        assert!(output.contains(
            "<DT><A HREF=\"https://a.example/?q=&quot;x&quot;&amp;y=1\">Cats &amp; &quot;Dogs&quot; &lt;3</A>"
        ));
    }

    #[test]
    fn test_config_changes_cosmetics() {
        let serializer = BookmarkSerializer::with_config(SerializerConfig {
            document_title: "Export".to_string(),
            indent: "  ".to_string(),
            folded: false,
        });
        let items = vec![BookmarkItem::folder("F", vec![], BookmarkMetadata::EMPTY)];

        let output = serializer.serialize(&items);

        assert!(output.contains("  <Title>Export</Title>\n"));
        assert!(output.contains("    <DT><H3>F</H3>\n"));
    }

    #[test]
    fn test_serialize_deep_tree() {
        let depth = 100_000;
        let mut item =
            BookmarkItem::bookmark("deep", "https://deep.example/", BookmarkMetadata::EMPTY);
        for _ in 0..depth {
            item = BookmarkItem::folder("F", vec![item], BookmarkMetadata::EMPTY);
        }
        let items = vec![item];

        // Unindented, or the output grows quadratically with depth
        let serializer = BookmarkSerializer::with_config(SerializerConfig {
            indent: String::new(),
            ..SerializerConfig::default()
        });
        let output = serializer.serialize(&items);

        assert_eq!(output.matches("<DT><H3 FOLDED>F</H3>\n").count(), depth);
        assert_eq!(output.matches(LIST_CLOSE).count(), depth + 1);
        assert!(output.contains("<DT><A HREF=\"https://deep.example/\">deep</A>\n</DL><p>\n"));
        assert!(output.ends_with("</DL><p>\n</DL><p>\n</HTML>\n"));
    }

    #[tokio::test]
    async fn test_serialize_bookmarks_offloaded() {
        let items = vec![BookmarkItem::bookmark("A", "a", BookmarkMetadata::EMPTY)];
        let serializer = BookmarkSerializer::new();

        let output = serializer.serialize_bookmarks(items.clone()).await.unwrap();
        assert_eq!(output, serializer.serialize(&items));
    }

    #[tokio::test]
    async fn test_serialize_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let result = BookmarkSerializer::new()
            .serialize_with_cancellation(vec![], &token)
            .await;
        assert_eq!(result, Err(SerializeError::Cancelled));
    }
}
