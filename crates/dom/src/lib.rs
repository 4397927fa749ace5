//! Bookmark DOM - arena HTML tree for the bookmark exchange format
//!
//! A parsed HTML document, stored flat and queried through the small
//! [`HtmlDocument`] capability trait.
//!
//! ## Core Design
//!
//! ```text
//! HTML text → html5ever (scraper) → DomArena (owned) → HtmlDocument queries
//!                                       ↓
//!                                NodeId (u32)
//! ```

pub mod arena;
pub mod error;
pub mod query;
pub mod serializer;
pub mod service;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use query::HtmlDocument;
pub use serializer::DomSerializer;
pub use service::{parse_html, DomService};
pub use types::*;
