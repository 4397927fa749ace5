//! Import / export configuration

use serde::{Deserialize, Serialize};

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Rewrite documents whose list sits deep under `<body>` before parsing
    pub normalize_layout: bool,
    /// Collapse whitespace runs in titles and trim them
    pub collapse_whitespace: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            normalize_layout: true,
            collapse_whitespace: true,
        }
    }
}

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Text of the `<Title>` and `<H1>` header elements
    pub document_title: String,
    /// One nesting level of indentation
    pub indent: String,
    /// Emit the legacy `FOLDED` flag on folder headings
    pub folded: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            document_title: "Bookmarks".to_string(),
            indent: "\t".to_string(),
            folded: true,
        }
    }
}
