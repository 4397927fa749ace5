//! Netscape bookmark file vocabulary
//!
//! Tag and attribute names are matched case-insensitively on import (the
//! HTML parser lowercases them) and written uppercase on export.

pub const DL: &str = "DL";
pub const DT: &str = "DT";
pub const DD: &str = "DD";
pub const H3: &str = "H3";
pub const A: &str = "A";
pub const BODY: &str = "BODY";

pub const HREF: &str = "HREF";
pub const ADD_DATE: &str = "ADD_DATE";
pub const LAST_MODIFIED: &str = "LAST_MODIFIED";
pub const FOLDED: &str = "FOLDED";

pub const DOCTYPE: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>";
pub const META_CHARSET: &str =
    r#"<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">"#;

/// The trailing open `<p>` is part of the format
pub const LIST_OPEN: &str = "<DL><p>";
pub const LIST_CLOSE: &str = "</DL><p>";
pub const DOCUMENT_CLOSE: &str = "</HTML>";

/// Escape text for element content or a double-quoted attribute value
///
/// Covers exactly what an HTML parser would otherwise read as markup;
/// html5ever decodes all of these back.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
