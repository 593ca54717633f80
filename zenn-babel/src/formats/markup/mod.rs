//! Intermediate markup as a format
//!
//! Reads HTML in the editor's markup vocabulary into a document tree and writes
//! a tree back out as that markup. Front matter has no place in the markup and
//! is not carried through it.

use crate::builder::build_tree;
use crate::embed::EMBED_ORIGIN;
use crate::error::FormatError;
use crate::format::Format;
use crate::markup::{render, IntermediateMarkup};
use crate::schema::Node;

/// Format implementation for intermediate markup
pub struct MarkupFormat {
    embed_origin: String,
}

impl MarkupFormat {
    pub fn new(embed_origin: impl Into<String>) -> Self {
        MarkupFormat {
            embed_origin: embed_origin.into(),
        }
    }
}

impl Default for MarkupFormat {
    fn default() -> Self {
        Self::new(EMBED_ORIGIN)
    }
}

impl Format for MarkupFormat {
    fn name(&self) -> &str {
        "markup"
    }

    fn description(&self) -> &str {
        "Editor markup (HTML with embed and math elements)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        Ok(build_tree(&IntermediateMarkup::from_html(source)))
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        render(doc, &self.embed_origin).to_html()
    }
}
