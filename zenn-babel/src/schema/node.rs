//! Document tree nodes and marks

use super::types::NodeType;
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Attrs = BTreeMap<String, AttrValue>;

/// Attribute values are strings, booleans or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value)
    }
}

/// Inline formatting applied to text nodes.
///
/// Variant order is the canonical nesting order: a link wraps strong, which
/// wraps em, and so on down to code, which is always innermost.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "camelCase")]
pub enum Mark {
    Link {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Strong,
    Em,
    Strike,
    Code,
}

impl Mark {
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Link { .. } => "link",
            Mark::Strong => "strong",
            Mark::Em => "em",
            Mark::Strike => "strike",
            Mark::Code => "code",
        }
    }

    /// Sorts into canonical order and drops duplicates.
    pub fn normalize(marks: &mut Vec<Mark>) {
        marks.sort();
        marks.dedup_by(|a, b| a.name() == b.name());
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    /// A node of `kind` with default attributes and the given children.
    pub fn new(kind: NodeType, content: Vec<Node>) -> Self {
        Node {
            kind,
            attrs: kind.default_attrs(),
            content,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Node::new(NodeType::Doc, content)
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::new(NodeType::Paragraph, content)
    }

    pub fn heading(level: i64, content: Vec<Node>) -> Self {
        Node::new(NodeType::Heading, content).with_attr("level", level)
    }

    pub fn blockquote(content: Vec<Node>) -> Self {
        Node::new(NodeType::Blockquote, content)
    }

    pub fn code_block(language: &str, code: &str) -> Self {
        let content = if code.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(code)]
        };
        Node::new(NodeType::CodeBlock, content).with_attr("language", language)
    }

    pub fn bullet_list(items: Vec<Node>, tight: bool) -> Self {
        Node::new(NodeType::BulletList, items).with_attr("tight", tight)
    }

    pub fn ordered_list(items: Vec<Node>, start: i64, tight: bool) -> Self {
        Node::new(NodeType::OrderedList, items)
            .with_attr("start", start)
            .with_attr("tight", tight)
    }

    pub fn list_item(content: Vec<Node>) -> Self {
        Node::new(NodeType::ListItem, content)
    }

    pub fn horizontal_rule() -> Self {
        Node::new(NodeType::HorizontalRule, Vec::new())
    }

    pub fn image(src: &str, alt: &str, title: &str) -> Self {
        Node::new(NodeType::Image, Vec::new())
            .with_attr("src", src)
            .with_attr("alt", alt)
            .with_attr("title", title)
    }

    pub fn hard_break() -> Self {
        Node::new(NodeType::HardBreak, Vec::new())
    }

    pub fn table(rows: Vec<Node>) -> Self {
        Node::new(NodeType::Table, rows)
    }

    pub fn table_row(cells: Vec<Node>) -> Self {
        Node::new(NodeType::TableRow, cells)
    }

    pub fn table_header(content: Vec<Node>) -> Self {
        Node::new(NodeType::TableHeader, vec![Node::paragraph(content)])
    }

    pub fn table_cell(content: Vec<Node>) -> Self {
        Node::new(NodeType::TableCell, vec![Node::paragraph(content)])
    }

    pub fn embed(kind: &str, url: &str) -> Self {
        Node::new(NodeType::Embed, Vec::new())
            .with_attr("type", kind)
            .with_attr("url", url)
    }

    pub fn block_math(latex: &str) -> Self {
        Node::new(NodeType::BlockMath, Vec::new()).with_attr("latex", latex)
    }

    pub fn inline_math(latex: &str) -> Self {
        Node::new(NodeType::InlineMath, Vec::new()).with_attr("latex", latex)
    }

    pub fn text(text: &str) -> Self {
        Node {
            kind: NodeType::Text,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: Some(text.to_string()),
            marks: Vec::new(),
        }
    }

    pub fn marked_text(text: &str, mut marks: Vec<Mark>) -> Self {
        Mark::normalize(&mut marks);
        Node {
            marks,
            ..Node::text(text)
        }
    }

    /// String attribute, or `""` when absent or of another type.
    pub fn attr_str(&self, name: &str) -> &str {
        match self.attrs.get(name) {
            Some(AttrValue::String(s)) => s,
            _ => "",
        }
    }

    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        match self.attrs.get(name) {
            Some(AttrValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        match self.attrs.get(name) {
            Some(AttrValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Descendant addressed by a child-index path; the empty path is `self`.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.content.get(index))
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        path.iter()
            .try_fold(self, |node, &index| node.content.get_mut(index))
    }

    /// Validates this subtree against the node type registry.
    pub fn check(&self) -> Result<(), SchemaError> {
        let name = self.kind.name().to_string();
        match (&self.text, self.kind) {
            (None, NodeType::Text) => return Err(SchemaError::MissingText(name)),
            (Some(_), kind) if kind != NodeType::Text => {
                return Err(SchemaError::UnexpectedText(name))
            }
            _ => {}
        }
        if !self.marks.is_empty() && self.kind != NodeType::Text {
            return Err(SchemaError::UnexpectedMarks(name));
        }
        let specs = self.kind.attr_specs();
        if let Some(attr) = self
            .attrs
            .keys()
            .find(|key| !specs.iter().any(|(spec, _)| *spec == key.as_str()))
        {
            return Err(SchemaError::UnknownAttribute {
                node: name,
                attr: attr.clone(),
            });
        }
        if !self.kind.content_allows(&self.content) {
            let children = self
                .content
                .iter()
                .map(|c| c.kind.name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SchemaError::InvalidContent {
                parent: name,
                children,
            });
        }
        self.content.iter().try_for_each(Node::check)
    }
}

/// Compact outline: `doc(paragraph("a", inlineMath))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == NodeType::Text {
            let mut rendered = format!("{:?}", self.text_str());
            for mark in self.marks.iter().rev() {
                rendered = format!("{}({rendered})", mark.name());
            }
            return f.write_str(&rendered);
        }
        f.write_str(self.kind.name())?;
        if self.content.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, child) in self.content.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}
