//! Markdown format implementation
//!
//! This module implements bidirectional conversion between Zenn-flavoured Markdown
//! and the document tree.
//!
//! # Library Choice
//!
//! We use the `comrak` crate for the CommonMark/GFM grammar (tables, strikethrough,
//! autolinks, dollar math, front matter). The Zenn dialect is recognized on top of
//! Comrak's AST while writing the intermediate markup. Serialization is a direct
//! walk over the tree so that every node has exactly one canonical Markdown form.
//!
//! # Element Mapping Table
//!
//! | Node            | Markdown                         | Notes                                      |
//! |-----------------|----------------------------------|--------------------------------------------|
//! | paragraph       | Paragraph                        | Soft breaks collapse to a space            |
//! | heading         | `#` … `######`                   | Hard breaks written as `<br>`              |
//! | blockquote      | `> `                             |                                            |
//! | codeBlock       | ```` ```lang ````                | Fence grows past backticks in the content  |
//! | bulletList      | `- item`                         | Adjacent lists alternate the marker        |
//! | orderedList     | `1. item`                        | Numbering starts at `start`                |
//! | horizontalRule  | `---`                            |                                            |
//! | table           | GFM pipe table                   | Row 0 is the header row                    |
//! | embed           | `@[type](url)`, bare URL, fence  | Per provider, see [`crate::embed`]         |
//! | blockMath       | `$$` block                       | ```` ```math ```` accepted on input        |
//! | inlineMath      | `$latex$`                        |                                            |
//! | image           | `![alt](src "title")`            |                                            |
//! | hardBreak       | `\` + newline                    |                                            |
//! | marks           | `**` `*` `~~` `` ` `` `[](href)` |                                            |
//!
//! # Lossy Conversions
//!
//! - Raw HTML is kept as literal text (the editor has no raw HTML node)
//! - Setext headings, indented code and `*`/`+` markers normalize to the canonical forms
//! - Reference links are resolved to inline links
//! - Unknown `@[type](...)` directives stay ordinary paragraphs

pub mod options;
pub mod parser;
pub mod serializer;

use crate::builder::build_tree;
use crate::error::FormatError;
use crate::format::Format;
use crate::schema::Node;
pub use options::{ParseOptions, SerializeOptions};

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    pub parse_options: ParseOptions,
    pub serialize_options: SerializeOptions,
}

impl MarkdownFormat {
    pub fn new(parse_options: ParseOptions, serialize_options: SerializeOptions) -> Self {
        MarkdownFormat {
            parse_options,
            serialize_options,
        }
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Zenn-flavoured Markdown"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        let markup = parser::parse_markdown(source, &self.parse_options);
        Ok(build_tree(&markup))
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        Ok(serializer::serialize_markdown(doc, &self.serialize_options))
    }
}
