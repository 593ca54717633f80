//! Tree building (intermediate markup → document tree)
//!
//! Walks the markup DOM and asks [`NodeType::recognize`] what each element is.
//! Elements nobody recognizes are transparent: their children are processed
//! in place. That is how `section > eqn` around block math, `thead`/`tbody`
//! from pasted tables and similar wrappers disappear.
//!
//! Inline content that shows up outside a textblock is gathered into a
//! paragraph, and whitespace outside `pre` is collapsed the way browsers do.
//! Tables are normalized so the first row holds header cells and every other
//! row holds body cells.

use crate::embed::{decode_payload, EmbedType};
use crate::markup::{find_element, Element, IntermediateMarkup};
use crate::schema::types::heading_level;
use crate::schema::{Mark, Node, NodeType};
use markup5ever_rcdom::{Handle, NodeData};
use tracing::{debug, trace};

/// Build the document tree from intermediate markup
pub fn build_tree(markup: &IntermediateMarkup) -> Node {
    let mut doc = Node::doc(build_blocks(markup.root()));
    if let Some(front_matter) = markup.front_matter() {
        doc.set_attr("frontMatter", front_matter);
    }
    doc
}

/// Block content of a container, never empty.
fn build_blocks(handle: &Handle) -> Vec<Node> {
    let mut collector = Collector::default();
    collector.children(handle);
    let mut blocks = collector.finish();
    if blocks.is_empty() {
        blocks.push(Node::paragraph(vec![]));
    }
    blocks
}

#[derive(Default)]
struct Collector {
    blocks: Vec<Node>,
    inline: Vec<Node>,
    marks: Vec<Mark>,
    /// Textblock that pending inline content is wrapped in.
    textblock: Option<Node>,
}

impl Collector {
    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.blocks
    }

    fn children(&mut self, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            self.node(child);
        }
    }

    fn node(&mut self, handle: &Handle) {
        match &handle.data {
            NodeData::Text { contents } => {
                let text = collapse_whitespace(&contents.borrow());
                self.push_text(&text);
            }
            NodeData::Element { .. } => {
                if let Some(el) = Element::from_handle(handle) {
                    self.element(&el);
                }
            }
            _ => {}
        }
    }

    fn element(&mut self, el: &Element<'_>) {
        if let Some(mark) = recognize_mark(el) {
            self.marks.push(mark);
            self.children(el.handle());
            self.marks.pop();
            return;
        }
        let Some(kind) = NodeType::recognize(el) else {
            if matches!(el.tag(), "script" | "style" | "iframe" | "head") {
                return;
            }
            trace!(tag = el.tag(), "transparent element");
            self.children(el.handle());
            return;
        };
        match kind {
            NodeType::Paragraph | NodeType::Heading => {
                let template = match kind {
                    NodeType::Heading => Node::heading(heading_level(el.tag()).unwrap_or(1), vec![]),
                    _ => Node::paragraph(vec![]),
                };
                self.textblock_element(el, template);
            }
            NodeType::Blockquote => {
                let content = build_blocks(el.handle());
                self.push_block(Node::blockquote(content));
            }
            NodeType::CodeBlock => {
                let language = code_language(el);
                let mut code = el.text_content();
                if code.ends_with('\n') {
                    code.pop();
                }
                self.push_block(Node::code_block(&language, &code));
            }
            NodeType::BulletList | NodeType::OrderedList => {
                let list = build_list(el, kind);
                self.push_block(list);
            }
            NodeType::HorizontalRule => self.push_block(Node::horizontal_rule()),
            NodeType::Image => {
                let attr = |name: &str| el.attr(name).unwrap_or_default();
                self.push_inline(Node::image(&attr("src"), &attr("alt"), &attr("title")));
            }
            NodeType::HardBreak => self.push_inline(Node::hard_break()),
            NodeType::Table => {
                if let Some(table) = build_table(el) {
                    self.push_block(table);
                }
            }
            NodeType::Embed => match build_embed(el) {
                Some(embed) => self.push_block(embed),
                None => self.children(el.handle()),
            },
            NodeType::BlockMath => {
                let latex = el.text_content().trim().to_string();
                self.push_block(Node::block_math(&latex));
            }
            NodeType::InlineMath => {
                let latex = el.text_content().trim().to_string();
                self.push_inline(Node::inline_math(&latex));
            }
            // only meaningful inside their parents
            NodeType::ListItem
            | NodeType::TableRow
            | NodeType::TableHeader
            | NodeType::TableCell => self.children(el.handle()),
            NodeType::Doc | NodeType::Text => self.children(el.handle()),
        }
    }

    fn textblock_element(&mut self, el: &Element<'_>, template: Node) {
        self.flush();
        let before = self.blocks.len();
        let outer = self.textblock.replace(template.clone());
        self.children(el.handle());
        self.flush();
        self.textblock = outer;
        if self.blocks.len() == before {
            // keep explicitly empty paragraphs and headings
            self.blocks.push(template);
        }
    }

    fn push_block(&mut self, node: Node) {
        self.flush();
        self.blocks.push(node);
    }

    fn push_inline(&mut self, node: Node) {
        self.inline.push(node);
    }

    fn push_text(&mut self, text: &str) {
        let at_line_start = match self.inline.last() {
            None => true,
            Some(last) if last.kind == NodeType::HardBreak => true,
            Some(last) => last.kind == NodeType::Text && last.text_str().ends_with(' '),
        };
        let text = if at_line_start {
            text.trim_start_matches(' ')
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.inline.last_mut() {
            if last.kind == NodeType::Text && last.marks == sorted(&self.marks) {
                if let Some(existing) = last.text.as_mut() {
                    existing.push_str(text);
                    return;
                }
            }
        }
        self.inline.push(Node::marked_text(text, self.marks.clone()));
    }

    /// Wraps pending inline content into the current textblock.
    fn flush(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let mut content = std::mem::take(&mut self.inline);
        trim_trailing_space(&mut content);
        if content.is_empty() {
            return;
        }
        let mut block = self
            .textblock
            .clone()
            .unwrap_or_else(|| Node::paragraph(vec![]));
        block.content = content;
        self.blocks.push(block);
    }
}

fn sorted(marks: &[Mark]) -> Vec<Mark> {
    let mut marks = marks.to_vec();
    Mark::normalize(&mut marks);
    marks
}

fn trim_trailing_space(content: &mut Vec<Node>) {
    while let Some(last) = content.last_mut() {
        if last.kind != NodeType::Text {
            return;
        }
        let trimmed = last.text_str().trim_end_matches(' ').to_string();
        if trimmed.is_empty() {
            content.pop();
        } else {
            last.text = Some(trimmed);
            return;
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn recognize_mark(el: &Element<'_>) -> Option<Mark> {
    match el.tag() {
        "strong" | "b" => Some(Mark::Strong),
        "em" | "i" => Some(Mark::Em),
        "s" | "del" | "strike" => Some(Mark::Strike),
        "code" => Some(Mark::Code),
        "a" => el.attr("href").map(|href| Mark::Link {
            href,
            title: el.attr("title").filter(|t| !t.is_empty()),
        }),
        _ => None,
    }
}

fn code_language(el: &Element<'_>) -> String {
    let from_classes = |el: &Element<'_>| {
        el.classes()
            .iter()
            .find_map(|c| c.strip_prefix("language-").map(str::to_string))
    };
    from_classes(el)
        .or_else(|| {
            let code = find_element(el.handle(), "code")?;
            from_classes(&Element::from_handle(&code)?)
        })
        .unwrap_or_default()
}

fn child_elements(el: &Element<'_>) -> Vec<Handle> {
    el.children()
        .into_iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .collect()
}

fn build_list(el: &Element<'_>, kind: NodeType) -> Node {
    let mut tight = true;
    let mut items = Vec::new();
    for child in child_elements(el) {
        let Some(li) = Element::from_handle(&child) else {
            continue;
        };
        if li.tag() != "li" {
            continue;
        }
        let has_paragraph = child_elements(&li)
            .iter()
            .filter_map(Element::from_handle)
            .any(|c| c.tag() == "p");
        tight &= !has_paragraph;
        items.push(build_list_item(&li));
    }
    if items.is_empty() {
        items.push(Node::list_item(vec![Node::paragraph(vec![])]));
    }
    match kind {
        NodeType::OrderedList => {
            let start = el
                .attr("start")
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(1);
            Node::ordered_list(items, start, tight)
        }
        _ => Node::bullet_list(items, tight),
    }
}

fn build_list_item(el: &Element<'_>) -> Node {
    let mut content = build_blocks(el.handle());
    if content.first().map(|n| n.kind) != Some(NodeType::Paragraph) {
        content.insert(0, Node::paragraph(vec![]));
    }
    Node::list_item(content)
}

fn build_table(el: &Element<'_>) -> Option<Node> {
    let mut rows = Vec::new();
    collect_rows(el.handle(), &mut rows);
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return None;
    }
    let table_rows = rows
        .into_iter()
        .filter(|cells| !cells.is_empty())
        .enumerate()
        .map(|(index, mut cells)| {
            cells.resize_with(width, || (Node::paragraph(vec![]), String::new()));
            let cells = cells
                .into_iter()
                .map(|(paragraph, align)| {
                    let kind = if index == 0 {
                        NodeType::TableHeader
                    } else {
                        NodeType::TableCell
                    };
                    Node::new(kind, vec![paragraph]).with_attr("align", align)
                })
                .collect();
            Node::table_row(cells)
        })
        .collect();
    Some(Node::table(table_rows))
}

type CellParts = (Node, String);

fn collect_rows(handle: &Handle, rows: &mut Vec<Vec<CellParts>>) {
    for child in handle.children.borrow().iter() {
        let Some(el) = Element::from_handle(child) else {
            continue;
        };
        match el.tag() {
            "tr" => {
                let cells = child_elements(&el)
                    .iter()
                    .filter_map(Element::from_handle)
                    .filter(|cell| matches!(cell.tag(), "th" | "td"))
                    .map(|cell| (cell_paragraph(&cell), cell_alignment(&cell)))
                    .collect();
                rows.push(cells);
            }
            // nested tables are not descended into
            "table" => {}
            _ => collect_rows(child, rows),
        }
    }
}

/// A cell holds exactly one paragraph; textblocks are joined with hard breaks.
fn cell_paragraph(el: &Element<'_>) -> Node {
    let mut collector = Collector::default();
    collector.children(el.handle());
    let mut content = Vec::new();
    for block in collector.finish() {
        if !block.kind.is_textblock() || block.kind == NodeType::CodeBlock {
            debug!(kind = block.kind.name(), "dropping block content inside table cell");
            continue;
        }
        if !content.is_empty() {
            content.push(Node::hard_break());
        }
        content.extend(block.content);
    }
    Node::paragraph(content)
}

fn cell_alignment(el: &Element<'_>) -> String {
    let from_style = el.attr("style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            (prop.trim() == "text-align").then(|| value.trim().to_string())
        })
    });
    from_style
        .or_else(|| el.attr("align"))
        .filter(|align| matches!(align.as_str(), "left" | "center" | "right"))
        .unwrap_or_default()
}

fn build_embed(el: &Element<'_>) -> Option<Node> {
    let iframe = find_element(el.handle(), "iframe");
    let iframe = iframe.as_ref().and_then(Element::from_handle);
    for class in el.classes() {
        if let Some(name) = class.strip_prefix("zenn-embedded-") {
            let kind = EmbedType::from_name(name)?;
            let payload = iframe?.attr("data-content")?;
            // server payloads are verbatim: mermaid source keeps its indentation
            let url = decode_payload(&payload);
            debug!(kind = kind.name(), "server embed recognized");
            return Some(Node::embed(kind.name(), &url));
        }
    }
    for class in el.classes() {
        let Some(name) = class.strip_prefix("embed-") else {
            continue;
        };
        if name == "block" {
            continue;
        }
        let kind = EmbedType::from_name(name)?;
        let src = iframe?.attr("src")?;
        debug!(kind = kind.name(), "client embed recognized");
        return Some(Node::embed(kind.name(), src.trim()));
    }
    None
}
