//! Markdown parsing (Markdown → intermediate markup)
//!
//! Pipeline: Markdown string → display-math rewrite → Comrak AST → intermediate markup.
//!
//! Comrak handles the standard grammar. This module recognizes the dialect on top:
//!
//! - a paragraph consisting of exactly `@[type](payload)` with a known type becomes an embed
//! - a paragraph consisting of exactly a YouTube watch URL becomes a youtube embed
//! - ```` ```mermaid ```` fences become mermaid embeds carrying the diagram source
//! - `$$` fenced blocks and ```` ```math ```` fences become block math
//! - `$...$` becomes inline math
//!
//! Anything that does not match is left to Comrak and ends up as ordinary markup,
//! so unknown directive types survive as literal text.

use super::options::ParseOptions;
use crate::embed::{youtube_video_id, EmbedType};
use crate::markup::{
    append, block_math_element, create_element, create_text, embed_element, inline_math_element,
    IntermediateMarkup,
};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};
use markup5ever_rcdom::Handle;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Parse a Markdown string into intermediate markup
pub fn parse_markdown(source: &str, options: &ParseOptions) -> IntermediateMarkup {
    let source = rewrite_display_math(source);
    let arena = Arena::new();
    let comrak_options = comrak_options(options);
    let root = parse_document(&arena, &source, &comrak_options);

    let mut writer = MarkupWriter {
        origin: &options.embed_origin,
        lines: body_source(&source, root).split('\n').collect(),
        seq: 0,
        front_matter: None,
    };
    let body = create_element("body", vec![]);
    for child in root.children() {
        writer.block(child, &body, false);
    }
    IntermediateMarkup::new(body, writer.front_matter)
}

fn comrak_options(options: &ParseOptions) -> ComrakOptions<'static> {
    let mut comrak = ComrakOptions::default();
    comrak.extension.table = true;
    comrak.extension.strikethrough = true;
    comrak.extension.autolink = true;
    comrak.extension.math_dollars = true;
    if options.front_matter {
        comrak.extension.front_matter_delimiter = Some("---".to_string());
    }
    comrak
}

/// Splits `@[type](payload)` into its parts.
pub fn parse_directive(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("@[")?;
    let (name, rest) = rest.split_once("](")?;
    let payload = rest.strip_suffix(')')?;
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid_name.then(|| (name, payload.trim()))
}

/// Rewrites `$$` fenced blocks into ```` ```math ```` fences, line for line.
///
/// Comrak only knows `$$` as inline display math, which cannot hold blank lines
/// and folds the block into a paragraph. Fences keep the content verbatim.
fn rewrite_display_math(source: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = source.split('\n').collect();
    if !lines.iter().any(|line| is_math_delimiter(line)) {
        return Cow::Borrowed(source);
    }

    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut code_fence: Option<(char, usize)> = None;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(open) = code_fence {
            if closes_code_fence(line, open) {
                code_fence = None;
            }
            out.push(Cow::Borrowed(line));
            i += 1;
            continue;
        }
        if let Some(fence) = opens_code_fence(line) {
            code_fence = Some(fence);
            out.push(Cow::Borrowed(line));
            i += 1;
            continue;
        }
        let close = is_math_delimiter(line)
            .then(|| (i + 1..lines.len()).find(|&j| is_math_delimiter(lines[j])))
            .flatten();
        match close {
            Some(close) => {
                let body = &lines[i + 1..close];
                let ticks = "`".repeat(fence_length(body));
                let indent = &line[..line.len() - line.trim_start_matches(' ').len()];
                out.push(Cow::Owned(format!("{indent}{ticks}math")));
                out.extend(body.iter().map(|l| Cow::Borrowed(*l)));
                out.push(Cow::Owned(format!("{indent}{ticks}")));
                i = close + 1;
            }
            None => {
                out.push(Cow::Borrowed(line));
                i += 1;
            }
        }
    }
    Cow::Owned(out.join("\n"))
}

fn is_math_delimiter(line: &str) -> bool {
    let line = line.trim_end_matches('\r');
    let trimmed = line.trim_start_matches(' ');
    line.len() - trimmed.len() <= 3 && trimmed.trim_end() == "$$"
}

fn opens_code_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let count = trimmed.chars().take_while(|c| *c == marker).count();
    (count >= 3).then_some((marker, count))
}

fn closes_code_fence(line: &str, (marker, count): (char, usize)) -> bool {
    let trimmed = line.trim().trim_end_matches('\r');
    trimmed.len() >= count && trimmed.chars().all(|c| c == marker)
}

/// Backtick fence long enough not to be closed by anything in `body`.
pub fn fence_length<S: AsRef<str>>(body: &[S]) -> usize {
    let longest = body
        .iter()
        .map(|line| {
            let line = line.as_ref().trim_start();
            line.chars().take_while(|c| *c == '`').count()
        })
        .max()
        .unwrap_or(0);
    (longest + 1).max(3)
}

struct MarkupWriter<'s> {
    origin: &'s str,
    /// Source lines as numbered by comrak's sourcepos
    lines: Vec<&'s str>,
    seq: usize,
    front_matter: Option<String>,
}

impl<'s> MarkupWriter<'s> {
    fn block<'a>(&mut self, node: &'a AstNode<'a>, parent: &Handle, tight: bool) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Paragraph => {
                if let Some(embed) = self.embed_paragraph(node) {
                    append(parent, embed);
                } else if let Some(latex) = sole_display_math(node) {
                    append(parent, block_math_element(&latex));
                } else if tight {
                    self.inlines(node, parent);
                } else {
                    let p = create_element("p", vec![]);
                    self.inlines(node, &p);
                    append(parent, p);
                }
            }
            NodeValue::Heading(heading) => {
                let h = create_element(&format!("h{}", heading.level), vec![]);
                self.inlines(node, &h);
                append(parent, h);
            }
            NodeValue::BlockQuote => {
                let quote = create_element("blockquote", vec![]);
                for child in node.children() {
                    self.block(child, &quote, false);
                }
                append(parent, quote);
            }
            NodeValue::List(list) => {
                let element = match list.list_type {
                    ListType::Bullet => create_element("ul", vec![]),
                    ListType::Ordered if list.start != 1 => {
                        create_element("ol", vec![("start", &list.start.to_string())])
                    }
                    ListType::Ordered => create_element("ol", vec![]),
                };
                for item in node.children() {
                    let li = create_element("li", vec![]);
                    for child in item.children() {
                        self.block(child, &li, list.tight);
                    }
                    append(&element, li);
                }
                append(parent, element);
            }
            NodeValue::CodeBlock(code) => {
                let language = code.info.split_whitespace().next().unwrap_or("");
                let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
                match language {
                    "mermaid" => {
                        debug!(lines = literal.lines().count(), "mermaid fence recognized");
                        self.seq += 1;
                        append(
                            parent,
                            embed_element(EmbedType::Mermaid, literal, self.origin, self.seq),
                        );
                    }
                    "math" => append(parent, block_math_element(literal)),
                    _ => {
                        let class = format!("language-{language}");
                        let attrs = if language.is_empty() {
                            vec![]
                        } else {
                            vec![("class", class.as_str())]
                        };
                        let pre = create_element("pre", vec![]);
                        let code_el = create_element("code", attrs);
                        append(&code_el, create_text(&code.literal));
                        append(&pre, code_el);
                        append(parent, pre);
                    }
                }
            }
            NodeValue::HtmlBlock(html) => {
                // raw HTML is not part of the dialect; keep it readable as text
                let p = create_element("p", vec![]);
                append(&p, create_text(html.literal.trim_end_matches('\n')));
                append(parent, p);
            }
            NodeValue::ThematicBreak => append(parent, create_element("hr", vec![])),
            NodeValue::Table(table) => {
                let element = create_element("table", vec![]);
                for row in node.children() {
                    let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    let tr = create_element("tr", vec![]);
                    for (col, cell) in row.children().enumerate() {
                        let align = match table.alignments.get(col) {
                            Some(TableAlignment::Left) => Some("text-align: left"),
                            Some(TableAlignment::Center) => Some("text-align: center"),
                            Some(TableAlignment::Right) => Some("text-align: right"),
                            _ => None,
                        };
                        let attrs = align.map(|style| vec![("style", style)]).unwrap_or_default();
                        let td = create_element(if header { "th" } else { "td" }, attrs);
                        self.inlines(cell, &td);
                        append(&tr, td);
                    }
                    append(&element, tr);
                }
                append(parent, element);
            }
            NodeValue::FrontMatter(front_matter) => {
                self.front_matter = Some(front_matter.trim_end().to_string());
            }
            _ => {
                trace!("descending into unmapped block node");
                for child in node.children() {
                    self.block(child, parent, tight);
                }
            }
        }
    }

    fn inlines<'a>(&mut self, node: &'a AstNode<'a>, parent: &Handle) {
        for child in node.children() {
            self.inline(child, parent);
        }
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>, parent: &Handle) {
        let value = node.data.borrow().value.clone();
        let wrap = |tag: &str, attrs: Vec<(&str, &str)>, this: &mut Self| {
            let element = create_element(tag, attrs);
            this.inlines(node, &element);
            append(parent, element);
        };
        match value {
            NodeValue::Text(text) => append(parent, create_text(&text)),
            NodeValue::SoftBreak => append(parent, create_text("\n")),
            NodeValue::LineBreak => append(parent, create_element("br", vec![])),
            NodeValue::Code(code) => {
                let element = create_element("code", vec![]);
                append(&element, create_text(&code.literal));
                append(parent, element);
            }
            NodeValue::Emph => wrap("em", vec![], self),
            NodeValue::Strong => wrap("strong", vec![], self),
            NodeValue::Strikethrough => wrap("del", vec![], self),
            NodeValue::Link(link) => {
                let mut attrs = vec![("href", link.url.as_str())];
                if !link.title.is_empty() {
                    attrs.push(("title", link.title.as_str()));
                }
                wrap("a", attrs, self);
            }
            NodeValue::Image(link) => {
                let mut alt = String::new();
                collect_text(node, &mut alt);
                let mut attrs = vec![("src", link.url.as_str()), ("alt", alt.as_str())];
                if !link.title.is_empty() {
                    attrs.push(("title", link.title.as_str()));
                }
                append(parent, create_element("img", attrs));
            }
            NodeValue::HtmlInline(html) => {
                if is_break_tag(&html) {
                    append(parent, create_element("br", vec![]));
                } else {
                    append(parent, create_text(&html));
                }
            }
            NodeValue::Math(math) => append(parent, inline_math_element(&math.literal)),
            _ => self.inlines(node, parent),
        }
    }

    /// Embed markup for a paragraph that is a single directive or bare YouTube URL.
    fn embed_paragraph<'a>(&mut self, node: &'a AstNode<'a>) -> Option<Handle> {
        let line = match contains_link(node) {
            true => paragraph_source(node)?,
            false => self
                .source_line(node)
                .filter(|line| line.trim_start().starts_with("@["))?
                .to_string(),
        };
        let line = line.trim();
        let (kind, payload) = match parse_directive(line) {
            Some((name, payload)) => {
                let kind = EmbedType::from_name(name).filter(|k| k.accepts_directive())?;
                (kind, payload)
            }
            None => {
                youtube_video_id(line)?;
                (EmbedType::Youtube, line)
            }
        };
        let url = kind.inbound(payload);
        debug!(kind = kind.name(), %url, "embed recognized");
        self.seq += 1;
        Some(embed_element(kind, &url, self.origin, self.seq))
    }

    /// Raw text of a single-line paragraph, escapes included.
    fn source_line<'a>(&self, node: &'a AstNode<'a>) -> Option<&'s str> {
        let pos = node.data.borrow().sourcepos;
        if pos.start.line != pos.end.line {
            return None;
        }
        let line = *self.lines.get(pos.start.line.checked_sub(1)?)?;
        line.get(pos.start.column.checked_sub(1)?..)
    }
}

/// Markdown as comrak numbers its lines: front matter is cut off before line 1.
fn body_source<'s, 'a>(source: &'s str, root: &'a AstNode<'a>) -> &'s str {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(first) = root.first_child() else {
        return source;
    };
    match &first.data.borrow().value {
        NodeValue::FrontMatter(front_matter) => {
            source.strip_prefix(front_matter.as_str()).unwrap_or(source)
        }
        _ => source,
    }
}

fn contains_link<'a>(node: &'a AstNode<'a>) -> bool {
    node.descendants().any(|n| {
        matches!(
            n.data.borrow().value,
            NodeValue::Link(_) | NodeValue::Image(_)
        )
    })
}

/// Directive or bare URL rebuilt from a paragraph comrak parsed as links.
///
/// `@[type](url)` reaches us as the text `@` followed by a link, and a bare URL
/// as an autolink. Anything else holding a link is ordinary prose.
fn paragraph_source<'a>(node: &'a AstNode<'a>) -> Option<String> {
    let children: Vec<_> = node.children().collect();
    let (prefix, link) = match children.as_slice() {
        [link] => (false, *link),
        [at, link] if matches!(&at.data.borrow().value, NodeValue::Text(t) if t == "@") => {
            (true, *link)
        }
        _ => return None,
    };
    let url = match &link.data.borrow().value {
        NodeValue::Link(l) if l.title.is_empty() => l.url.clone(),
        _ => return None,
    };
    let mut label = String::new();
    collect_text(link, &mut label);
    match prefix {
        true => Some(format!("@[{label}]({url})")),
        false => (label == url).then_some(url),
    }
}

/// Latex of a paragraph whose only content is `$$...$$` display math.
fn sole_display_math<'a>(node: &'a AstNode<'a>) -> Option<String> {
    let mut children = node.children();
    let first = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match &first.data.borrow().value {
        NodeValue::Math(math) if math.display_math => Some(math.literal.trim().to_string()),
        _ => None,
    }
}

fn is_break_tag(html: &str) -> bool {
    let tag: String = html
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(tag.as_str(), "<br>" | "<br/>")
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(md: &str) -> String {
        parse_markdown(md, &ParseOptions::default())
            .to_html()
            .expect("serializes")
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            parse_directive("@[card](https://example.com)"),
            Some(("card", "https://example.com"))
        );
        assert_eq!(parse_directive("@[](x)"), None);
        assert_eq!(parse_directive("@[card] (x)"), None);
        assert_eq!(parse_directive("text @[card](x)"), None);
    }

    #[test]
    fn test_rewrite_display_math() {
        assert_eq!(
            rewrite_display_math("$$\nE = mc^2\n$$"),
            "```math\nE = mc^2\n```"
        );
        assert_eq!(rewrite_display_math("$$\n\n$$"), "```math\n\n```");
        assert_eq!(rewrite_display_math("no math"), "no math");
    }

    #[test]
    fn test_rewrite_skips_code_fences() {
        let source = "```\n$$\nx\n$$\n```";
        assert_eq!(rewrite_display_math(source), source);
    }

    #[test]
    fn test_rewrite_unclosed_block_is_left_alone() {
        assert_eq!(rewrite_display_math("$$\nx"), "$$\nx");
    }

    #[test]
    fn test_fence_length_grows_past_content() {
        assert_eq!(fence_length(&["a"]), 3);
        assert_eq!(fence_length(&["````"]), 5);
    }

    #[test]
    fn test_client_embed_markup() {
        assert_eq!(
            html("@[codesandbox](https://codesandbox.io/embed/x2cj6p)"),
            r#"<span class="embed-block embed-codesandbox"><iframe src="https://codesandbox.io/embed/x2cj6p"></iframe></span>"#
        );
    }

    #[test]
    fn test_server_embed_markup() {
        assert_eq!(
            html("@[card](https://example.com)"),
            r#"<span class="embed-block zenn-embedded zenn-embedded-card"><iframe src="https://embed.zenn.studio/card#embed-1" data-content="https%3A%2F%2Fexample.com"></iframe></span>"#
        );
    }

    #[test]
    fn test_unknown_directive_is_plain_paragraph() {
        assert_eq!(
            html("@[unknown](https://example.com)"),
            r#"<p>@<a href="https://example.com">unknown</a></p>"#
        );
    }

    #[test]
    fn test_inline_math_markup() {
        assert_eq!(
            html("a $x^2$ b"),
            "<p>a <embed-katex>x^2</embed-katex> b</p>"
        );
    }

    #[test]
    fn test_block_math_markup() {
        assert_eq!(
            html("$$\nE = mc^2\n$$"),
            r#"<section><eqn><embed-katex display-mode="1">E = mc^2</embed-katex></eqn></section>"#
        );
    }

    #[test]
    fn test_table_markup() {
        assert_eq!(
            html("| a | b |\n| :-- | --: |\n| c | d |"),
            r#"<table><tr><th style="text-align: left">a</th><th style="text-align: right">b</th></tr><tr><td style="text-align: left">c</td><td style="text-align: right">d</td></tr></table>"#
        );
    }

    #[test]
    fn test_front_matter_is_captured() {
        let markup = parse_markdown("---\ntitle: x\n---\n\nbody", &ParseOptions::default());
        assert_eq!(markup.front_matter(), Some("---\ntitle: x\n---"));
    }
}
