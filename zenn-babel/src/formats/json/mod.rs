//! JSON form of the document tree
//!
//! The serde representation of [`Node`]: `{"type", "attrs", "content", "text", "marks"}`
//! with empty fields omitted. Parsed trees are checked against the schema.

use crate::error::FormatError;
use crate::format::Format;
use crate::schema::Node;

/// Format implementation for JSON document trees
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Document tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        let doc: Node = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid document JSON: {e}")))?;
        doc.check()
            .map_err(|e| FormatError::ParseError(e.to_string()))?;
        Ok(doc)
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
    }
}
