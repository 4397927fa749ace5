//! Netscape bookmark file import and export
//!
//! Reads the `NETSCAPE-Bookmark-file-1` HTML dialect that Chrome, Firefox,
//! Safari and Edge export, turns it into a tree of [`BookmarkItem`]s, and
//! writes such a tree back out in the same dialect.
//!
//! # Pipeline
//!
//! 1. **Parse HTML**: html5ever (via `bookmark-dom`) builds a node arena
//! 2. **Normalize**: documents whose list sits deep under `<body>` are
//!    rebuilt as a single root `<DL>`
//! 3. **Walk**: `<DT>` entries become folders (`<H3>` + `<DL>`) or
//!    bookmarks (`<A HREF>`); everything else is skipped
//! 4. **Serialize**: the inverse, with escaped titles and URLs
//!
//! Steps 1-3 and step 4 can each run on a blocking worker under a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod serializer;
pub mod worker;

pub use config::{ParserConfig, SerializerConfig};
pub use error::{Cancelled, ParseError, SerializeError};
pub use model::{flatten, BookmarkItem, BookmarkMetadata, Outline, Timestamp};
pub use normalizer::{detect_layout, normalize, DocumentLayout};
pub use parser::{import_bookmarks, parse, BookmarkParseable, BookmarkParser};
pub use serializer::{serialize, BookmarkSerializable, BookmarkSerializer};
