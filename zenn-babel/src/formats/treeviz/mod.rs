//! Treeviz formatter for document trees
//!
//! Treeviz is a visual representation of the document tree. Each line is one node:
//!
//! <prefix><connector> <icon> <label> (label truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ doc (3 blocks)
//! ├─ § h1 Title
//! │ └─ ◦ "Title"
//! ├─ ⧈ card https://example.com
//! └─ ▦ 2×2 table
//!   ├─ ═ row
//!   ...
//!
//! Icons
//!     Blocks:
//!         Doc: ⧉
//!         Paragraph: ¶
//!         Heading: §
//!         Blockquote: ❝
//!         CodeBlock: 𝒱
//!         List: ☰
//!         ListItem: •
//!         HorizontalRule: ⎯
//!     Tables:
//!         Table: ▦
//!         TableRow: ═
//!         TableHeader: ▤
//!         TableCell: □
//!     Atoms:
//!         Embed: ⧈
//!         Math: √
//!         Image: ▣
//!         HardBreak: ↵
//!     Inline:
//!         Text: ◦

use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::Format;
use crate::schema::{Node, NodeType};

const LABEL_WIDTH: usize = 30;

fn format_node(node: &Node, prefix: &str, child_index: usize, child_count: usize) -> String {
    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let output = format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        get_icon(node.kind),
        label(node)
    );

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    output + &format_children(&node.content, &child_prefix)
}

fn format_children(children: &[Node], prefix: &str) -> String {
    let child_count = children.len();
    children
        .iter()
        .enumerate()
        .map(|(i, child)| format_node(child, prefix, i, child_count))
        .collect()
}

fn label(node: &Node) -> String {
    let label = match node.kind {
        NodeType::Doc => format!("doc ({} blocks)", node.content.len()),
        NodeType::Heading => format!("h{}", node.attr_i64("level").unwrap_or(1)),
        NodeType::CodeBlock => match node.attr_str("language") {
            "" => "code".to_string(),
            language => format!("code {language}"),
        },
        NodeType::BulletList | NodeType::OrderedList => {
            format!("{} items", node.content.len())
        }
        NodeType::Table => {
            let columns = node.content.first().map_or(0, |row| row.content.len());
            format!("{}×{} table", node.content.len(), columns)
        }
        NodeType::TableHeader | NodeType::TableCell => match node.attr_str("align") {
            "" => node.kind.name().to_string(),
            align => format!("{} ({align})", node.kind.name()),
        },
        NodeType::Embed => format!("{} {}", node.attr_str("type"), node.attr_str("url")),
        NodeType::BlockMath | NodeType::InlineMath => node.attr_str("latex").to_string(),
        NodeType::Image => node.attr_str("src").to_string(),
        NodeType::Text => {
            let marks: Vec<&str> = node.marks.iter().map(|mark| mark.name()).collect();
            if marks.is_empty() {
                format!("{:?}", node.text_str())
            } else {
                format!("{:?} [{}]", node.text_str(), marks.join(", "))
            }
        }
        other => other.name().to_string(),
    };
    truncate(&label)
}

fn truncate(label: &str) -> String {
    let label = label.replace('\n', "⏎");
    if label.chars().count() <= LABEL_WIDTH {
        return label;
    }
    let head: String = label.chars().take(LABEL_WIDTH - 1).collect();
    format!("{head}…")
}

/// Render a document tree as a treeviz string
pub fn to_treeviz_str(doc: &Node) -> String {
    let root = format!("{} {}\n", get_icon(doc.kind), label(doc));
    root + &format_children(&doc.content, "")
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc))
    }
}
