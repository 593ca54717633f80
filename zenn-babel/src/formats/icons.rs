//! Icon mapping for tree visualization
//!
//! One Unicode character per node type, used by the treeviz format for quick
//! visual identification of nodes.

use crate::schema::NodeType;

/// Get the Unicode icon for a node type
pub fn get_icon(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Doc => "⧉",
        NodeType::Paragraph => "¶",
        NodeType::Heading => "§",
        NodeType::Blockquote => "❝",
        NodeType::CodeBlock => "𝒱",
        NodeType::BulletList | NodeType::OrderedList => "☰",
        NodeType::ListItem => "•",
        NodeType::HorizontalRule => "⎯",
        NodeType::Image => "▣",
        NodeType::HardBreak => "↵",
        NodeType::Table => "▦",
        NodeType::TableRow => "═",
        NodeType::TableHeader => "▤",
        NodeType::TableCell => "□",
        NodeType::Embed => "⧈",
        NodeType::BlockMath | NodeType::InlineMath => "√",
        NodeType::Text => "◦",
    }
}
