//! The closed vocabulary of document node types
//!
//! Every node type carries, as plain `match` arms:
//!
//! - its content-model class and group,
//! - the attributes it declares (with defaults),
//! - the children it accepts,
//! - a recognizer over intermediate markup (tag name plus attribute guard).
//!
//! Adding a variant makes the compiler point at every place that needs a rule.

use super::node::{AttrValue, Attrs, Node};
use crate::markup::Element;
use serde::{Deserialize, Serialize};

/// Structural category of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Has block (or structural) children.
    Block,
    /// Lives inside a textblock and has no children of its own.
    Inline,
    /// A leaf whose whole meaning is carried in its attributes.
    Atomic,
}

/// Group membership used by content expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    BulletList,
    OrderedList,
    ListItem,
    HorizontalRule,
    Image,
    HardBreak,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    Embed,
    BlockMath,
    InlineMath,
    Text,
}

impl NodeType {
    /// All node types, in recognition priority order.
    pub const ALL: [NodeType; 19] = [
        NodeType::Doc,
        NodeType::BlockMath,
        NodeType::InlineMath,
        NodeType::Embed,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Blockquote,
        NodeType::CodeBlock,
        NodeType::BulletList,
        NodeType::OrderedList,
        NodeType::ListItem,
        NodeType::HorizontalRule,
        NodeType::Image,
        NodeType::HardBreak,
        NodeType::Table,
        NodeType::TableRow,
        NodeType::TableHeader,
        NodeType::TableCell,
        NodeType::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Blockquote => "blockquote",
            NodeType::CodeBlock => "codeBlock",
            NodeType::BulletList => "bulletList",
            NodeType::OrderedList => "orderedList",
            NodeType::ListItem => "listItem",
            NodeType::HorizontalRule => "horizontalRule",
            NodeType::Image => "image",
            NodeType::HardBreak => "hardBreak",
            NodeType::Table => "table",
            NodeType::TableRow => "tableRow",
            NodeType::TableHeader => "tableHeader",
            NodeType::TableCell => "tableCell",
            NodeType::Embed => "embed",
            NodeType::BlockMath => "blockMath",
            NodeType::InlineMath => "inlineMath",
            NodeType::Text => "text",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeType> {
        NodeType::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn class(self) -> NodeClass {
        match self {
            NodeType::Embed
            | NodeType::BlockMath
            | NodeType::InlineMath
            | NodeType::HorizontalRule
            | NodeType::Image
            | NodeType::HardBreak => NodeClass::Atomic,
            NodeType::Text => NodeClass::Inline,
            NodeType::Doc
            | NodeType::Paragraph
            | NodeType::Heading
            | NodeType::Blockquote
            | NodeType::CodeBlock
            | NodeType::BulletList
            | NodeType::OrderedList
            | NodeType::ListItem
            | NodeType::Table
            | NodeType::TableRow
            | NodeType::TableHeader
            | NodeType::TableCell => NodeClass::Block,
        }
    }

    pub fn group(self) -> Option<NodeGroup> {
        match self {
            NodeType::Paragraph
            | NodeType::Heading
            | NodeType::Blockquote
            | NodeType::CodeBlock
            | NodeType::BulletList
            | NodeType::OrderedList
            | NodeType::HorizontalRule
            | NodeType::Table
            | NodeType::Embed
            | NodeType::BlockMath => Some(NodeGroup::Block),
            NodeType::Text | NodeType::Image | NodeType::HardBreak | NodeType::InlineMath => {
                Some(NodeGroup::Inline)
            }
            NodeType::Doc
            | NodeType::ListItem
            | NodeType::TableRow
            | NodeType::TableHeader
            | NodeType::TableCell => None,
        }
    }

    pub fn is_inline(self) -> bool {
        self.group() == Some(NodeGroup::Inline)
    }

    pub fn is_atomic(self) -> bool {
        self.class() == NodeClass::Atomic
    }

    /// Nodes whose children are inline content.
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock
        )
    }

    pub fn is_table_cell(self) -> bool {
        matches!(self, NodeType::TableHeader | NodeType::TableCell)
    }

    pub fn is_list(self) -> bool {
        matches!(self, NodeType::BulletList | NodeType::OrderedList)
    }

    /// Declared attributes and their defaults.
    pub fn attr_specs(self) -> &'static [(&'static str, AttrDefault)] {
        match self {
            NodeType::Doc => &[("frontMatter", AttrDefault::Str(""))],
            NodeType::Heading => &[("level", AttrDefault::Number(1))],
            NodeType::CodeBlock => &[("language", AttrDefault::Str(""))],
            NodeType::BulletList => &[("tight", AttrDefault::Bool(true))],
            NodeType::OrderedList => &[
                ("start", AttrDefault::Number(1)),
                ("tight", AttrDefault::Bool(true)),
            ],
            NodeType::TableHeader | NodeType::TableCell => &[("align", AttrDefault::Str(""))],
            NodeType::Image => &[
                ("src", AttrDefault::Str("")),
                ("alt", AttrDefault::Str("")),
                ("title", AttrDefault::Str("")),
            ],
            NodeType::Embed => &[("type", AttrDefault::Str("")), ("url", AttrDefault::Str(""))],
            NodeType::BlockMath | NodeType::InlineMath => &[("latex", AttrDefault::Str(""))],
            NodeType::Paragraph
            | NodeType::Blockquote
            | NodeType::ListItem
            | NodeType::HorizontalRule
            | NodeType::HardBreak
            | NodeType::Table
            | NodeType::TableRow
            | NodeType::Text => &[],
        }
    }

    pub fn default_attrs(self) -> Attrs {
        self.attr_specs()
            .iter()
            .map(|(name, default)| (name.to_string(), default.value()))
            .collect()
    }

    /// Whether `children` satisfies this type's content expression.
    pub fn content_allows(self, children: &[Node]) -> bool {
        let all = |pred: fn(NodeType) -> bool| children.iter().all(|c| pred(c.kind));
        let is_block = |kind: NodeType| kind.group() == Some(NodeGroup::Block);
        match self {
            // block+
            NodeType::Doc | NodeType::Blockquote => !children.is_empty() && all(is_block),
            // inline*
            NodeType::Paragraph | NodeType::Heading => all(NodeType::is_inline),
            // text*, unmarked
            NodeType::CodeBlock => children
                .iter()
                .all(|c| c.kind == NodeType::Text && c.marks.is_empty()),
            // listItem+
            NodeType::BulletList | NodeType::OrderedList => {
                !children.is_empty() && all(|kind| kind == NodeType::ListItem)
            }
            // paragraph block*
            NodeType::ListItem => match children.split_first() {
                Some((first, rest)) => {
                    first.kind == NodeType::Paragraph && rest.iter().all(|c| is_block(c.kind))
                }
                None => false,
            },
            // tableRow+
            NodeType::Table => !children.is_empty() && all(|kind| kind == NodeType::TableRow),
            // (tableCell | tableHeader)+
            NodeType::TableRow => !children.is_empty() && all(NodeType::is_table_cell),
            // paragraph
            NodeType::TableHeader | NodeType::TableCell => {
                children.len() == 1 && children[0].kind == NodeType::Paragraph
            }
            NodeType::HorizontalRule
            | NodeType::Image
            | NodeType::HardBreak
            | NodeType::Embed
            | NodeType::BlockMath
            | NodeType::InlineMath
            | NodeType::Text => children.is_empty(),
        }
    }

    /// Recognizer over intermediate markup elements.
    pub fn matches(self, el: &Element<'_>) -> bool {
        match self {
            NodeType::Doc | NodeType::Text => false,
            NodeType::Paragraph => el.tag() == "p",
            NodeType::Heading => heading_level(el.tag()).is_some(),
            NodeType::Blockquote => el.tag() == "blockquote",
            NodeType::CodeBlock => el.tag() == "pre",
            NodeType::BulletList => el.tag() == "ul",
            NodeType::OrderedList => el.tag() == "ol",
            NodeType::ListItem => el.tag() == "li",
            NodeType::HorizontalRule => el.tag() == "hr",
            NodeType::Image => el.tag() == "img" && el.has_attr("src"),
            NodeType::HardBreak => el.tag() == "br",
            NodeType::Table => el.tag() == "table",
            NodeType::TableRow => el.tag() == "tr",
            NodeType::TableHeader => el.tag() == "th",
            NodeType::TableCell => el.tag() == "td",
            NodeType::Embed => el.tag() == "span" && el.has_class("embed-block"),
            NodeType::BlockMath => {
                el.tag() == "embed-katex" && el.attr("display-mode").as_deref() == Some("1")
            }
            NodeType::InlineMath => el.tag() == "embed-katex" && !el.has_attr("display-mode"),
        }
    }

    /// First node type whose recognizer accepts `el`.
    pub fn recognize(el: &Element<'_>) -> Option<NodeType> {
        NodeType::ALL.into_iter().find(|kind| kind.matches(el))
    }
}

/// Parses `h1`..`h6` into a level.
pub fn heading_level(tag: &str) -> Option<i64> {
    let level = tag.strip_prefix('h')?.parse::<i64>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Compile-time attribute default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrDefault {
    Str(&'static str),
    Bool(bool),
    Number(i64),
}

impl AttrDefault {
    pub fn value(self) -> AttrValue {
        match self {
            AttrDefault::Str(s) => AttrValue::String(s.to_string()),
            AttrDefault::Bool(b) => AttrValue::Bool(b),
            AttrDefault::Number(n) => AttrValue::Number(n),
        }
    }
}
