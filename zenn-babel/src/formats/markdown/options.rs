use crate::embed::EMBED_ORIGIN;
use serde::{Deserialize, Serialize};

/// Configuration for Markdown parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Origin used for server-rendered embed iframes
    pub embed_origin: String,

    /// Whether a leading `---` block is read as front matter
    pub front_matter: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            embed_origin: EMBED_ORIGIN.to_string(),
            front_matter: true,
        }
    }
}

/// Configuration for Markdown serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializeOptions {
    /// Marker for bullet list items (`-`, `*` or `+`)
    pub bullet_marker: char,

    /// Delimiter for emphasis (`*` or `_`)
    pub emphasis_delimiter: char,

    /// Delimiter for strong emphasis (`**` or `__`)
    pub strong_delimiter: String,

    /// Line emitted for horizontal rules
    pub horizontal_rule: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            bullet_marker: '-',
            emphasis_delimiter: '*',
            strong_delimiter: "**".to_string(),
            horizontal_rule: "---".to_string(),
        }
    }
}
