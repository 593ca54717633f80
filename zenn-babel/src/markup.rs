//! Intermediate markup between Markdown and the document tree
//!
//! The Markdown parser does not build tree nodes directly. It emits an HTML-like
//! DOM (an `html5ever` [`RcDom`] subtree) that uses a small custom vocabulary for
//! the constructs HTML has no element for:
//!
//!     | Construct          | Markup                                                                  |
//!     |--------------------|-------------------------------------------------------------------------|
//!     | server embed       | span.embed-block.zenn-embedded.zenn-embedded-{type} > iframe[data-content] |
//!     | client embed       | span.embed-block.embed-{type} > iframe[src]                             |
//!     | block math         | section > eqn > embed-katex[display-mode="1"]                           |
//!     | inline math        | embed-katex                                                             |
//!
//! The same markup is what pasted HTML looks like, which is why the tree builder
//! consumes it rather than the Markdown AST. [`render`] produces it back from a
//! tree.

use crate::embed::{encode_payload, EmbedType, Rendering};
use crate::error::FormatError;
use crate::schema::{Mark, Node, NodeType};
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute,
    LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node as DomNode, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Markup produced by the Markdown parser and consumed by the tree builder.
#[derive(Clone)]
pub struct IntermediateMarkup {
    root: Handle,
    front_matter: Option<String>,
}

impl IntermediateMarkup {
    pub(crate) fn new(root: Handle, front_matter: Option<String>) -> Self {
        IntermediateMarkup { root, front_matter }
    }

    /// Container whose children are the top-level blocks.
    pub fn root(&self) -> &Handle {
        &self.root
    }

    /// Verbatim front matter block, delimiters included.
    pub fn front_matter(&self) -> Option<&str> {
        self.front_matter.as_deref()
    }

    /// Parses an HTML fragment, e.g. clipboard content.
    pub fn from_html(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let root = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
        IntermediateMarkup::new(root, None)
    }

    /// Serializes the children of the root.
    pub fn to_html(&self) -> Result<String, FormatError> {
        let mut output = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        for child in self.root.children.borrow().iter() {
            let serializable = SerializableHandle::from(child.clone());
            serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
                FormatError::SerializationError(format!("HTML serialization failed: {e}"))
            })?;
        }
        String::from_utf8(output)
            .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
    }
}

impl std::fmt::Debug for IntermediateMarkup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntermediateMarkup")
            .field("html", &self.to_html().unwrap_or_default())
            .field("front_matter", &self.front_matter)
            .finish()
    }
}

/// Read-only view of a markup element.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    handle: &'a Handle,
    tag: &'a str,
}

impl<'a> Element<'a> {
    pub fn from_handle(handle: &'a Handle) -> Option<Self> {
        match &handle.data {
            NodeData::Element { name, .. } => Some(Element {
                handle,
                tag: &name.local[..],
            }),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'a str {
        self.tag
    }

    pub fn handle(&self) -> &'a Handle {
        self.handle
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| &*attr.name.local == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    pub fn children(&self) -> Vec<Handle> {
        self.handle.children.borrow().clone()
    }

    /// Concatenated text of all descendant text nodes, untouched.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self.handle, &mut out);
        out
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Depth-first search for the first element named `tag`.
pub fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if Element::from_handle(child).is_some_and(|el| el.tag() == tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Create an element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Embed markup for a stored `(type, url)` pair.
///
/// `seq` only feeds the iframe fragment, which keeps ids unique per document.
pub fn embed_element(kind: EmbedType, url: &str, origin: &str, seq: usize) -> Handle {
    match kind.rule().rendering {
        Rendering::Server => {
            let class = format!("embed-block zenn-embedded zenn-embedded-{}", kind.name());
            let span = create_element("span", vec![("class", &class)]);
            let src = format!("{origin}/{}#embed-{seq}", kind.name());
            let content = encode_payload(url);
            append(
                &span,
                create_element("iframe", vec![("src", &src), ("data-content", &content)]),
            );
            span
        }
        Rendering::ClientIframe => {
            let class = format!("embed-block embed-{}", kind.name());
            let span = create_element("span", vec![("class", &class)]);
            append(&span, create_element("iframe", vec![("src", url)]));
            span
        }
    }
}

pub fn block_math_element(latex: &str) -> Handle {
    let section = create_element("section", vec![]);
    let eqn = create_element("eqn", vec![]);
    let katex = create_element("embed-katex", vec![("display-mode", "1")]);
    append(&katex, create_text(latex));
    append(&eqn, katex);
    append(&section, eqn);
    section
}

pub fn inline_math_element(latex: &str) -> Handle {
    let katex = create_element("embed-katex", vec![]);
    append(&katex, create_text(latex));
    katex
}

pub fn align_style(align: &str) -> Option<String> {
    (!align.is_empty()).then(|| format!("text-align: {align}"))
}

/// Element for a mark, wrapping its text.
pub fn mark_element(mark: &Mark) -> Handle {
    match mark {
        Mark::Link { href, title } => {
            let mut attrs = vec![("href", href.as_str())];
            if let Some(title) = title {
                attrs.push(("title", title.as_str()));
            }
            create_element("a", attrs)
        }
        Mark::Strong => create_element("strong", vec![]),
        Mark::Em => create_element("em", vec![]),
        Mark::Strike => create_element("del", vec![]),
        Mark::Code => create_element("code", vec![]),
    }
}

/// Renders a document tree back into intermediate markup.
pub fn render(doc: &Node, origin: &str) -> IntermediateMarkup {
    let root = create_element("body", vec![]);
    let mut seq = 0;
    for child in &doc.content {
        render_node(&root, child, origin, &mut seq, false);
    }
    let front_matter = Some(doc.attr_str("frontMatter"))
        .filter(|fm| !fm.is_empty())
        .map(str::to_string);
    IntermediateMarkup::new(root, front_matter)
}

fn render_children(parent: &Handle, node: &Node, origin: &str, seq: &mut usize, tight: bool) {
    for child in &node.content {
        render_node(parent, child, origin, seq, tight);
    }
}

fn render_node(parent: &Handle, node: &Node, origin: &str, seq: &mut usize, tight: bool) {
    let element = match node.kind {
        NodeType::Doc => {
            render_children(parent, node, origin, seq, false);
            return;
        }
        NodeType::Paragraph if tight => {
            render_children(parent, node, origin, seq, false);
            return;
        }
        NodeType::Paragraph => create_element("p", vec![]),
        NodeType::Heading => {
            let level = node.attr_i64("level").unwrap_or(1).clamp(1, 6);
            create_element(&format!("h{level}"), vec![])
        }
        NodeType::Blockquote => create_element("blockquote", vec![]),
        NodeType::CodeBlock => {
            let pre = create_element("pre", vec![]);
            let language = node.attr_str("language");
            let class = format!("language-{language}");
            let attrs = if language.is_empty() {
                vec![]
            } else {
                vec![("class", class.as_str())]
            };
            let code = create_element("code", attrs);
            append(&code, create_text(&node.text_content()));
            append(&pre, code);
            append(parent, pre);
            return;
        }
        NodeType::BulletList | NodeType::OrderedList => {
            let list = if node.kind == NodeType::BulletList {
                create_element("ul", vec![])
            } else {
                let start = node.attr_i64("start").unwrap_or(1);
                if start == 1 {
                    create_element("ol", vec![])
                } else {
                    create_element("ol", vec![("start", &start.to_string())])
                }
            };
            let tight = node.attr_bool("tight").unwrap_or(true);
            for item in &node.content {
                let li = create_element("li", vec![]);
                render_children(&li, item, origin, seq, tight);
                append(&list, li);
            }
            append(parent, list);
            return;
        }
        NodeType::ListItem => create_element("li", vec![]),
        NodeType::HorizontalRule => create_element("hr", vec![]),
        NodeType::Image => {
            let mut attrs = vec![("src", node.attr_str("src")), ("alt", node.attr_str("alt"))];
            if !node.attr_str("title").is_empty() {
                attrs.push(("title", node.attr_str("title")));
            }
            create_element("img", attrs)
        }
        NodeType::HardBreak => create_element("br", vec![]),
        NodeType::Table => create_element("table", vec![]),
        NodeType::TableRow => create_element("tr", vec![]),
        NodeType::TableHeader | NodeType::TableCell => {
            let tag = if node.kind == NodeType::TableHeader {
                "th"
            } else {
                "td"
            };
            let style = align_style(node.attr_str("align"));
            let attrs = style
                .as_deref()
                .map(|style| vec![("style", style)])
                .unwrap_or_default();
            let cell = create_element(tag, attrs);
            // cells hold a single paragraph; render its inline content directly
            render_children(&cell, node, origin, seq, true);
            append(parent, cell);
            return;
        }
        NodeType::Embed => match EmbedType::from_name(node.attr_str("type")) {
            Some(kind) => {
                *seq += 1;
                embed_element(kind, node.attr_str("url"), origin, *seq)
            }
            None => return,
        },
        NodeType::BlockMath => block_math_element(node.attr_str("latex")),
        NodeType::InlineMath => inline_math_element(node.attr_str("latex")),
        NodeType::Text => {
            let mut target = parent.clone();
            for mark in &node.marks {
                let wrapper = mark_element(mark);
                append(&target, wrapper.clone());
                target = wrapper;
            }
            append(&target, create_text(node.text_str()));
            return;
        }
    };
    render_children(&element, node, origin, seq, false);
    append(parent, element);
}
