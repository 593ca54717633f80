//! Boundary functions for the editor host
//!
//! The host calls [`parse`] (or [`parse_markdown`] then [`build_tree`]) on load and paste,
//! and [`serialize`] on save and export. All of them are pure: the input is only borrowed
//! and a fresh value is returned.
//!
//! # Example
//!
//! ```ignore
//! use zenn_babel::transforms::{parse, serialize};
//!
//! let doc = parse("@[card](https://example.com)");
//! assert_eq!(serialize(&doc), "@[card](https://example.com)");
//! ```

use crate::formats::markdown::{parser, serializer, ParseOptions, SerializeOptions};
use crate::markup::IntermediateMarkup;
use crate::schema::Node;

pub use crate::builder::build_tree;

/// Markdown → intermediate markup with default options
pub fn parse_markdown(text: &str) -> IntermediateMarkup {
    parse_markdown_with_options(text, &ParseOptions::default())
}

pub fn parse_markdown_with_options(text: &str, options: &ParseOptions) -> IntermediateMarkup {
    parser::parse_markdown(text, options)
}

/// Markdown → document tree (`build_tree(parse_markdown(text))`)
pub fn parse(text: &str) -> Node {
    build_tree(&parse_markdown(text))
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Node {
    build_tree(&parse_markdown_with_options(text, options))
}

/// Document tree → Markdown with default options
pub fn serialize(doc: &Node) -> String {
    serialize_with_options(doc, &SerializeOptions::default())
}

pub fn serialize_with_options(doc: &Node, options: &SerializeOptions) -> String {
    serializer::serialize_markdown(doc, options)
}

/// Parse and re-serialize, yielding the canonical form of `text`
pub fn normalize(text: &str) -> String {
    serialize(&parse(text))
}
