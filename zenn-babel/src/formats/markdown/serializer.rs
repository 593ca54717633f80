//! Markdown serialization (document tree → Markdown)
//!
//! A direct walk over the tree. Every node type has exactly one canonical form,
//! chosen so that parsing the output yields the same tree again:
//!
//! - blocks are separated by a blank line; tight list items by a newline
//! - marks become delimiters, reopened only where the mark set changes
//! - embeds use the provider's canonical syntax (directive, bare URL or fence)
//! - text is escaped so it never reads as Markdown syntax

use super::options::SerializeOptions;
use super::parser::fence_length;
use crate::embed::{EmbedType, Syntax};
use crate::schema::{Mark, Node, NodeType};
use tracing::warn;

/// Serialize a document tree to Markdown
pub fn serialize_markdown(doc: &Node, options: &SerializeOptions) -> String {
    MarkdownSerializer { options }.document(doc)
}

/// Where inline content ends up; decides how hard breaks and pipes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    Paragraph,
    Heading,
    Cell,
}

struct MarkdownSerializer<'o> {
    options: &'o SerializeOptions,
}

impl<'o> MarkdownSerializer<'o> {
    fn document(&self, doc: &Node) -> String {
        let mut parts = Vec::new();
        let front_matter = doc.attr_str("frontMatter");
        if !front_matter.is_empty() {
            parts.push(front_matter.to_string());
        }
        let body = match doc.kind {
            NodeType::Doc => self.blocks(&doc.content, "\n\n"),
            _ => self.block(doc, false),
        };
        if !body.is_empty() {
            parts.push(body);
        }
        parts.join("\n\n")
    }

    fn blocks(&self, nodes: &[Node], separator: &str) -> String {
        let mut out = Vec::with_capacity(nodes.len());
        let mut previous: Option<NodeType> = None;
        let mut alternate = false;
        for node in nodes {
            // adjacent lists of the same kind merge unless their markers alternate
            alternate = node.kind.is_list() && previous == Some(node.kind) && !alternate;
            let rendered = self.block(node, alternate);
            if !rendered.is_empty() {
                out.push(rendered);
            }
            previous = Some(node.kind);
        }
        out.join(separator)
    }

    fn block(&self, node: &Node, alternate: bool) -> String {
        match node.kind {
            NodeType::Doc
            | NodeType::ListItem
            | NodeType::TableRow
            | NodeType::TableHeader
            | NodeType::TableCell => self.blocks(&node.content, "\n\n"),
            NodeType::Paragraph => self.inline(&node.content, InlineContext::Paragraph),
            NodeType::Heading => {
                let level = node.attr_i64("level").unwrap_or(1).clamp(1, 6) as usize;
                let marker = "#".repeat(level);
                let text = self.inline(&node.content, InlineContext::Heading);
                if text.is_empty() {
                    marker
                } else {
                    format!("{marker} {text}")
                }
            }
            NodeType::Blockquote => {
                prefix_lines(&self.blocks(&node.content, "\n\n"), "> ", "> ")
            }
            NodeType::CodeBlock => fenced(node.attr_str("language"), &node.text_content()),
            NodeType::BulletList => {
                let marker = match (alternate, self.options.bullet_marker) {
                    (false, marker) => marker,
                    (true, '-') => '*',
                    (true, _) => '-',
                };
                self.list(node, |_| marker.to_string())
            }
            NodeType::OrderedList => {
                let start = node.attr_i64("start").unwrap_or(1);
                let delimiter = if alternate { ')' } else { '.' };
                self.list(node, |index| format!("{}{delimiter}", start + index as i64))
            }
            NodeType::HorizontalRule => self.options.horizontal_rule.clone(),
            NodeType::Table => self.table(node),
            NodeType::Embed => embed(node),
            NodeType::BlockMath => format!("$$\n{}\n$$", node.attr_str("latex")),
            NodeType::Text | NodeType::Image | NodeType::HardBreak | NodeType::InlineMath => {
                self.inline(std::slice::from_ref(node), InlineContext::Paragraph)
            }
        }
    }

    fn list(&self, node: &Node, marker: impl Fn(usize) -> String) -> String {
        let tight = node.attr_bool("tight").unwrap_or(true);
        let (item_separator, block_separator) = if tight { ("\n", "\n") } else { ("\n\n", "\n\n") };
        node.content
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let marker = marker(index);
                let body = self.blocks(&item.content, block_separator);
                let indent = " ".repeat(marker.len() + 1);
                prefix_lines(&body, &format!("{marker} "), &indent)
            })
            .collect::<Vec<_>>()
            .join(item_separator)
    }

    fn table(&self, node: &Node) -> String {
        let rows = &node.content;
        let width = rows.iter().map(|row| row.content.len()).max().unwrap_or(0);
        let Some(first) = rows.first().filter(|_| width > 0) else {
            return String::new();
        };

        let render_row = |row: &Node| {
            let mut cells: Vec<String> = row
                .content
                .iter()
                .map(|cell| {
                    let inline: Vec<Node> = cell
                        .content
                        .iter()
                        .flat_map(|block| match block.kind {
                            NodeType::Paragraph => block.content.clone(),
                            _ => vec![block.clone()],
                        })
                        .collect();
                    self.inline(&inline, InlineContext::Cell)
                })
                .collect();
            cells.resize(width, String::new());
            table_line(&cells)
        };

        let has_header = first
            .content
            .iter()
            .all(|cell| cell.kind == NodeType::TableHeader);
        let (header, body) = if has_header {
            (render_row(first), &rows[1..])
        } else {
            (table_line(&vec![String::new(); width]), &rows[..])
        };

        let mut separator: Vec<String> = first
            .content
            .iter()
            .map(|cell| {
                match cell.attr_str("align") {
                    "left" => ":---",
                    "center" => ":---:",
                    "right" => "---:",
                    _ => "---",
                }
                .to_string()
            })
            .collect();
        separator.resize(width, "---".to_string());

        let mut lines = vec![header, table_line(&separator)];
        lines.extend(body.iter().map(render_row));
        lines.join("\n")
    }

    fn inline(&self, nodes: &[Node], context: InlineContext) -> String {
        let mut out = String::new();
        let mut open: Vec<Mark> = Vec::new();
        let mut pending_space = String::new();
        let mut line_start = true;

        for (index, node) in nodes.iter().enumerate() {
            match node.kind {
                NodeType::Text => {
                    let text = node.text_str();
                    let code = node.marks.contains(&Mark::Code);
                    let bare = is_bare_link(nodes, index);
                    let marks: Vec<Mark> = node
                        .marks
                        .iter()
                        .filter(|mark| **mark != Mark::Code)
                        .filter(|mark| !(bare && matches!(mark, Mark::Link { .. })))
                        .cloned()
                        .collect();

                    // whitespace at a mark boundary moves outside the delimiters
                    let (lead, core, trail) = if code {
                        ("", text, "")
                    } else {
                        split_space(text)
                    };
                    if core.is_empty() {
                        let keep = shared_prefix(&open, &marks);
                        let shared = open[..keep].to_vec();
                        self.transition(&mut out, &mut open, &shared, &pending_space);
                        pending_space.clear();
                        pending_space.push_str(text);
                        continue;
                    }
                    pending_space.push_str(lead);
                    self.transition(&mut out, &mut open, &marks, &pending_space);
                    pending_space.clear();

                    if code {
                        out.push_str(&code_span(text, context));
                    } else if bare {
                        out.push_str(core);
                    } else {
                        out.push_str(&escape_text(core, line_start, context));
                    }
                    pending_space.push_str(trail);
                    line_start = false;
                }
                NodeType::HardBreak => {
                    pending_space.clear();
                    match context {
                        InlineContext::Paragraph => {
                            out.push_str("\\\n");
                            line_start = true;
                        }
                        InlineContext::Heading | InlineContext::Cell => out.push_str("<br>"),
                    }
                }
                NodeType::InlineMath => {
                    self.transition(&mut out, &mut open, &[], &pending_space);
                    pending_space.clear();
                    let latex = node.attr_str("latex");
                    out.push('$');
                    match context {
                        InlineContext::Cell => out.push_str(&latex.replace('|', "\\|")),
                        _ => out.push_str(latex),
                    }
                    out.push('$');
                    line_start = false;
                }
                NodeType::Image => {
                    self.transition(&mut out, &mut open, &[], &pending_space);
                    pending_space.clear();
                    out.push_str(&format!(
                        "![{}]({})",
                        escape_label(node.attr_str("alt")),
                        destination(node.attr_str("src"), node.attr_str("title"))
                    ));
                    line_start = false;
                }
                other => warn!(kind = other.name(), "block node in inline content skipped"),
            }
        }
        self.transition(&mut out, &mut open, &[], "");
        out
    }

    /// Closes marks not in `target`, writes `space`, then opens the missing ones.
    fn transition(&self, out: &mut String, open: &mut Vec<Mark>, target: &[Mark], space: &str) {
        let keep = shared_prefix(open, target);
        for mark in open.drain(keep..).rev() {
            out.push_str(&self.close_delimiter(&mark));
        }
        out.push_str(space);
        for mark in &target[keep..] {
            out.push_str(&self.open_delimiter(mark));
            open.push(mark.clone());
        }
    }

    fn open_delimiter(&self, mark: &Mark) -> String {
        match mark {
            Mark::Link { .. } => "[".to_string(),
            Mark::Strong => self.options.strong_delimiter.clone(),
            Mark::Em => self.options.emphasis_delimiter.to_string(),
            Mark::Strike => "~~".to_string(),
            Mark::Code => String::new(),
        }
    }

    fn close_delimiter(&self, mark: &Mark) -> String {
        match mark {
            Mark::Link { href, title } => {
                format!("]({})", destination(href, title.as_deref().unwrap_or("")))
            }
            other => self.open_delimiter(other),
        }
    }
}

fn shared_prefix(open: &[Mark], target: &[Mark]) -> usize {
    open.iter()
        .zip(target)
        .take_while(|(a, b)| a == b)
        .count()
}

fn embed(node: &Node) -> String {
    let name = node.attr_str("type");
    let url = node.attr_str("url");
    let Some(kind) = EmbedType::from_name(name) else {
        warn!(kind = name, "unknown embed type written as directive");
        return format!("@[{name}]({url})");
    };
    let rule = kind.rule();
    match rule.syntax {
        Syntax::Directive => format!("@[{}]({})", kind.name(), (rule.outbound)(url)),
        Syntax::BareUrl => (rule.outbound)(url),
        Syntax::Fence => fenced(kind.name(), url),
    }
}

fn fenced(info: &str, body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let ticks = "`".repeat(fence_length(&lines));
    if body.is_empty() {
        format!("{ticks}{info}\n{ticks}")
    } else {
        format!("{ticks}{info}\n{body}\n{ticks}")
    }
}

fn prefix_lines(text: &str, first: &str, rest: &str) -> String {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| {
            let prefix = if index == 0 { first } else { rest };
            if line.is_empty() {
                prefix.trim_end().to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn split_space(text: &str) -> (&str, &str, &str) {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len();
    if start >= end {
        return (text, "", "");
    }
    (&text[..start], &text[start..end], &text[end..])
}

/// A link whose text is its own http(s) URL and can be written bare.
fn is_bare_link(nodes: &[Node], index: usize) -> bool {
    let node = &nodes[index];
    let Some(link) = node
        .marks
        .iter()
        .find(|mark| matches!(mark, Mark::Link { .. }))
    else {
        return false;
    };
    let Mark::Link { href, title: None } = link else {
        return false;
    };
    let shares_link = |other: Option<&Node>| other.is_some_and(|n| n.marks.contains(link));
    let neighbours_linked =
        shares_link(index.checked_sub(1).and_then(|i| nodes.get(i))) || shares_link(nodes.get(index + 1));
    let safe = href
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-._~:/?#@!+,=%&".contains(c));
    let ends_cleanly = href
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '/');
    node.text_str() == href
        && (href.starts_with("https://") || href.starts_with("http://"))
        && !node.marks.contains(&Mark::Code)
        && !neighbours_linked
        && safe
        && ends_cleanly
}

fn escape_text(text: &str, line_start: bool, context: InlineContext) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '~' | '$' | '<' | '&' => {
                out.push('\\');
                out.push(c);
            }
            '|' if context == InlineContext::Cell => out.push_str("\\|"),
            // unlinked `scheme://` and `www.` would come back as autolinks
            ':' if text[i..].starts_with("://") => out.push_str("\\:"),
            '.' if text[..i].ends_with("www") => out.push_str("\\."),
            _ => out.push(c),
        }
    }
    if !line_start {
        return out;
    }

    // block markers only matter at the start of a line
    if out.starts_with(['#', '>', '-', '+', '=']) {
        return format!("\\{out}");
    }
    let digits = out.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && out[digits..].starts_with(['.', ')']) {
        return format!("{}\\{}", &out[..digits], &out[digits..]);
    }
    out
}

fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

fn destination(url: &str, title: &str) -> String {
    let url = if url.contains([' ', '(', ')', '<', '>']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    };
    if title.is_empty() {
        url
    } else {
        format!("{url} \"{}\"", title.replace('"', "\\\""))
    }
}

/// Backtick run one longer than any inside `text`.
fn code_span(text: &str, context: InlineContext) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        run = if c == '`' { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    let ticks = "`".repeat(longest + 1);
    let text = if context == InlineContext::Cell {
        text.replace('|', "\\|")
    } else {
        text.to_string()
    };
    let pad = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty());
    if pad {
        format!("{ticks} {text} {ticks}")
    } else {
        format!("{ticks}{text}{ticks}")
    }
}
