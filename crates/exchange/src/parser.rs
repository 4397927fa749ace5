//! Bookmark parser
//!
//! Walks a (normalized) HTML tree and builds the bookmark forest.
//!
//! ```text
//! <DL>                      one level
//!   <DT><H3>..</H3><DL>..   folder: heading + nested level
//!   <DT><A HREF=..>..</A>   bookmark
//!   <p>, <HR>, <DD>, ...    skipped
//! ```
//!
//! Folder descent uses an explicit stack of levels, so nesting depth is
//! bounded by memory, not by the thread's stack.

use std::sync::Arc;

use async_trait::async_trait;
use bookmark_dom::{DomArena, DomSerializer, DomService, HtmlDocument, NodeId};
use chrono::DateTime;
use tokio_util::sync::CancellationToken;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::format::{A, ADD_DATE, DD, DL, DT, H3, HREF, LAST_MODIFIED};
use crate::model::{BookmarkItem, BookmarkMetadata, Timestamp};
use crate::normalizer;
use crate::worker;

/// Anything that can produce a bookmark forest asynchronously
#[async_trait]
pub trait BookmarkParseable: Send + Sync {
    async fn parse_bookmarks(&self) -> Result<Vec<BookmarkItem>, ParseError>;
}

/// Parser over an already parsed and normalized document
///
/// Construction runs the HTML tree builder and the normalizer on the
/// calling thread; [`BookmarkParseable::parse_bookmarks`] runs the walk on
/// a worker. Use [`import_bookmarks`] to offload both.
#[derive(Debug, Clone)]
pub struct BookmarkParser {
    document: Arc<DomArena>,
    config: ParserConfig,
}

impl BookmarkParser {
    pub fn new(html: &str) -> Result<Self, ParseError> {
        Self::with_config(html, ParserConfig::default())
    }

    pub fn with_config(html: &str, config: ParserConfig) -> Result<Self, ParseError> {
        let mut service = DomService::new();
        service.parse_html(html)?;
        Self::from_document(service.into_arena(), config)
    }

    /// Wrap an existing arena, normalizing it if the config asks for it
    pub fn from_document(document: DomArena, config: ParserConfig) -> Result<Self, ParseError> {
        let document = if config.normalize_layout {
            normalizer::normalize(document)?
        } else {
            document
        };

        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(outline) = DomSerializer::new().serialize(&document) {
                tracing::trace!("Bookmark document ready for parsing:\n{}", outline);
            }
        }

        Ok(Self {
            document: Arc::new(document),
            config,
        })
    }

    /// The document the parser walks
    pub fn document(&self) -> &DomArena {
        &self.document
    }

    /// Parse on the current thread
    pub fn parse(&self) -> Result<Vec<BookmarkItem>, ParseError> {
        parse_document(self.document.as_ref(), &self.config, &CancellationToken::new())
    }

    /// Parse on a blocking worker, giving up with `Cancelled` when `cancel` fires
    pub async fn parse_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<BookmarkItem>, ParseError> {
        let document = Arc::clone(&self.document);
        let config = self.config.clone();

        worker::offload("parse", cancel, move |token| {
            parse_document(document.as_ref(), &config, &token)
        })
        .await?
    }
}

#[async_trait]
impl BookmarkParseable for BookmarkParser {
    async fn parse_bookmarks(&self) -> Result<Vec<BookmarkItem>, ParseError> {
        self.parse_with_cancellation(&CancellationToken::new()).await
    }
}

/// Parse bookmark file text on the current thread
pub fn parse(html: &str) -> Result<Vec<BookmarkItem>, ParseError> {
    BookmarkParser::new(html)?.parse()
}

/// HTML parse, normalization and walk, all on a blocking worker
pub async fn import_bookmarks(
    html: String,
    config: ParserConfig,
    cancel: &CancellationToken,
) -> Result<Vec<BookmarkItem>, ParseError> {
    worker::offload("import", cancel, move |token| {
        let parser = BookmarkParser::with_config(&html, config)?;
        if token.is_cancelled() {
            return Err(ParseError::Cancelled);
        }
        parse_document(parser.document.as_ref(), &parser.config, &token)
    })
    .await?
}

/// One level of the descent: the remaining entries of a `<DL>` and the
/// items built from the ones already consumed
struct Level {
    entries: std::vec::IntoIter<NodeId>,
    items: Vec<BookmarkItem>,
    /// Title and dates of the folder this level belongs to; `None` at the root
    folder: Option<(String, BookmarkMetadata)>,
}

impl Level {
    fn new(entries: Vec<NodeId>, folder: Option<(String, BookmarkMetadata)>) -> Self {
        Self {
            entries: entries.into_iter(),
            items: Vec::new(),
            folder,
        }
    }
}

enum Entry {
    Folder {
        title: String,
        metadata: BookmarkMetadata,
        list: Option<NodeId>,
    },
    Bookmark(BookmarkItem),
    Skip,
}

/// Walk any [`HtmlDocument`] and build the bookmark forest
///
/// The document is expected to be normalized already.
pub fn parse_document<D: HtmlDocument>(
    document: &D,
    config: &ParserConfig,
    cancel: &CancellationToken,
) -> Result<Vec<BookmarkItem>, ParseError> {
    let root_list =
        leading_list(document, document.document()).ok_or(ParseError::NoLeadingDl)?;

    let mut stack = vec![Level::new(entries(document, root_list), None)];

    while let Some(level) = stack.last_mut() {
        if cancel.is_cancelled() {
            return Err(ParseError::Cancelled);
        }

        match level.entries.next() {
            Some(entry) => match read_entry(document, entry, config) {
                Entry::Folder {
                    title,
                    metadata,
                    list,
                } => {
                    let children = list.map(|list| entries(document, list)).unwrap_or_default();
                    stack.push(Level::new(children, Some((title, metadata))));
                }
                Entry::Bookmark(item) => level.items.push(item),
                Entry::Skip => {}
            },
            None => {
                let Some(finished) = stack.pop() else { break };
                let Some((title, metadata)) = finished.folder else {
                    return Ok(finished.items);
                };

                let folder = BookmarkItem::Folder {
                    title,
                    children: finished.items,
                    metadata,
                };
                match stack.last_mut() {
                    Some(parent) => parent.items.push(folder),
                    None => return Ok(vec![folder]),
                }
            }
        }
    }

    Ok(Vec::new())
}

/// Whether a child of a `<DL>` is a bookmark or folder entry
///
/// An entry is a `<DT>`, or a wrapper holding one. Everything else in a
/// list (`<p>` fillers, `<HR>` separators, stray markup) is not. A `<DD>`
/// is never an entry: it carries a folder description and, after HTML
/// error recovery, sometimes that folder's `<DL>`; see [`folder_list`].
pub fn is_bookmark_or_folder_entry<D: HtmlDocument>(document: &D, node: NodeId) -> bool {
    !has_tag(document, node, DD) && document.select_first(node, DT).is_some()
}

/// The first `<DL>` at or below `scope`
fn leading_list<D: HtmlDocument>(document: &D, scope: NodeId) -> Option<NodeId> {
    document.select_first(scope, DL)
}

/// Qualifying entries of a list, in document order
fn entries<D: HtmlDocument>(document: &D, list: NodeId) -> Vec<NodeId> {
    document
        .child_elements(list)
        .into_iter()
        .filter(|&child| {
            let keep = is_bookmark_or_folder_entry(document, child);
            if !keep {
                tracing::trace!("Skipping non-entry markup at {}", document.node_path(child));
            }
            keep
        })
        .collect()
}

fn read_entry<D: HtmlDocument>(document: &D, entry: NodeId, config: &ParserConfig) -> Entry {
    if let Some(heading) = document.select_first(entry, H3) {
        return Entry::Folder {
            title: title_of(document, heading, config),
            metadata: extract_metadata(document, heading),
            list: folder_list(document, entry),
        };
    }

    let Some(anchor) = document.select_first(entry, A) else {
        tracing::trace!("Skipping entry without link at {}", document.node_path(entry));
        return Entry::Skip;
    };

    let Some(url) = document.attr(anchor, HREF) else {
        tracing::debug!("Skipping link without HREF at {}", document.node_path(anchor));
        return Entry::Skip;
    };

    Entry::Bookmark(BookmarkItem::Bookmark {
        title: title_of(document, anchor, config),
        url: url.to_string(),
        metadata: extract_metadata(document, anchor),
    })
}

/// The `<DL>` holding a folder's children
///
/// Normally inside the folder's `<DT>`. When the heading is followed by a
/// `<DD>` description, the tree builder closes the `<DT>` and the list ends
/// up inside the `<DD>` sibling instead. A folder with neither is empty.
fn folder_list<D: HtmlDocument>(document: &D, entry: NodeId) -> Option<NodeId> {
    leading_list(document, entry).or_else(|| {
        document
            .next_element_sibling(entry)
            .filter(|&sibling| has_tag(document, sibling, DD))
            .and_then(|description| leading_list(document, description))
    })
}

fn title_of<D: HtmlDocument>(document: &D, node: NodeId, config: &ParserConfig) -> String {
    let text = document.text(node);
    if config.collapse_whitespace {
        bookmark_dom::utils::collapse_whitespace(&text)
    } else {
        text
    }
}

fn extract_metadata<D: HtmlDocument>(document: &D, node: NodeId) -> BookmarkMetadata {
    BookmarkMetadata {
        added_at: parse_timestamp(document.attr(node, ADD_DATE)),
        modified_at: parse_timestamp(document.attr(node, LAST_MODIFIED)),
    }
}

/// Whole seconds since the epoch, digits only; anything else means "no date"
fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    let value = value?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: u64 = value.parse().ok()?;
    DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
}

fn has_tag<D: HtmlDocument>(document: &D, node: NodeId, tag: &str) -> bool {
    document
        .tag_name(node)
        .is_some_and(|name| name.eq_ignore_ascii_case(tag))
}
