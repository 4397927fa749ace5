//! Document normalizer
//!
//! Some exporters (Safari among them) leave out the root `<DL>` and write
//! the top-level `<DT>` entries straight into the page. After HTML tree
//! construction the first `<DL>` then sits inside a folder entry, three or
//! more elements below the document. Such a document is rebuilt as a fresh
//! document holding a single `<DL>` that adopts everything `<body>` held.

use bookmark_dom::HtmlDocument;

use crate::error::ParseError;
use crate::format::{BODY, DL};

/// Deepest ancestor chain (`body`, `html`) a root list has in a standard export
const STANDARD_LIST_DEPTH: usize = 2;

/// Structural variant of a bookmark document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLayout {
    /// First `<DL>` directly under `<body>` (or no `<DL>` at all)
    Standard,
    /// First `<DL>` buried deeper; entries hang off `<body>` directly
    NestedUnderBody,
}

/// Classify a document by where its first `<DL>` sits
pub fn detect_layout<D: HtmlDocument>(document: &D) -> DocumentLayout {
    match document.select_first(document.document(), DL) {
        Some(dl) if document.depth(dl) > STANDARD_LIST_DEPTH => DocumentLayout::NestedUnderBody,
        _ => DocumentLayout::Standard,
    }
}

/// Return `document` unchanged if it is standard, otherwise a rebuilt copy
///
/// The input is only read; a `NoBody` failure leaves nothing half-done.
pub fn normalize<D: HtmlDocument>(document: D) -> Result<D, ParseError> {
    if detect_layout(&document) == DocumentLayout::Standard {
        return Ok(document);
    }

    let body = document
        .select_first(document.document(), BODY)
        .ok_or(ParseError::NoBody)?;

    let mut normalized = D::empty();
    let root = normalized.document();
    let list = normalized.create_element(DL);
    normalized.append_child(root, list)?;

    let children = document.child_nodes(body);
    tracing::debug!(
        "Normalizing nested bookmark layout: moving {} body nodes under a root list",
        children.len()
    );

    for child in children {
        let adopted = normalized.import_node(&document, child)?;
        normalized.append_child(list, adopted)?;
    }

    Ok(normalized)
}
