//! Round trips and idempotence of parse → serialize

use proptest::prelude::*;
use std::path::PathBuf;
use zenn_babel::transforms::{normalize, parse, serialize};
use zenn_babel::{Mark, Node, NodeType};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

#[test]
fn test_kitchensink_is_canonical() {
    let md = fixture("kitchensink.md");
    assert_eq!(serialize(&parse(&md)), md);
}

#[test]
fn test_kitchensink_tree_is_stable() {
    let doc = parse(&fixture("kitchensink.md"));
    assert_eq!(parse(&serialize(&doc)), doc);
    assert!(doc.check().is_ok());
    assert_eq!(
        doc.attr_str("frontMatter"),
        "---\ntitle: Kitchen sink\nemoji: \"🧪\"\n---"
    );
}

#[test]
fn test_kitchensink_block_sequence() {
    let doc = parse(&fixture("kitchensink.md"));
    let kinds: Vec<&str> = doc.content.iter().map(|n| n.kind.name()).collect();
    insta::assert_snapshot!(kinds.join(" "), @"heading paragraph blockquote bulletList orderedList horizontalRule codeBlock table paragraph embed embed embed blockMath");
}

#[test]
fn test_non_canonical_input_normalizes_once() {
    let md = "Title\n---\n\n+ a\n+ b\n\n***\n\n    indented code\n\n_em_ and __strong__";
    let once = normalize(md);
    assert_eq!(
        once,
        "## Title\n\n- a\n- b\n\n---\n\n```\nindented code\n```\n\n*em* and **strong**"
    );
    assert_eq!(normalize(&once), once);
}

#[test]
fn test_raw_html_is_kept_as_text() {
    let doc = parse("<div>raw</div>");
    assert_eq!(doc.content[0].kind, NodeType::Paragraph);
    assert_eq!(doc.content[0].text_content(), "<div>raw</div>");
    assert_eq!(serialize(&doc), r"\<div\>raw\</div\>");
    assert_eq!(parse(&serialize(&doc)), doc);
}

#[test]
fn test_adjacent_lists_stay_separate() {
    let item = |text: &str| Node::list_item(vec![Node::paragraph(vec![Node::text(text)])]);
    let doc = Node::doc(vec![
        Node::bullet_list(vec![item("a")], true),
        Node::bullet_list(vec![item("b")], true),
        Node::bullet_list(vec![item("c")], true),
        Node::ordered_list(vec![item("d")], 1, true),
        Node::ordered_list(vec![item("e")], 1, true),
        Node::ordered_list(vec![item("f")], 1, true),
    ]);
    let md = serialize(&doc);
    assert_eq!(md, "- a\n\n* b\n\n- c\n\n1. d\n\n1) e\n\n1. f");
    assert_eq!(parse(&md), doc);
}

#[test]
fn test_unlinked_urls_stay_unlinked() {
    for text in ["text https://x.com", "www.example.com is a site", "ftp://host.example"] {
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text(text)])]);
        let md = serialize(&doc);
        assert_eq!(parse(&md), doc, "{md}");
    }
}

#[test]
fn test_entity_colon_does_not_become_a_link() {
    let doc = parse("text https&#58;//x.com");
    assert_eq!(doc.to_string(), r#"doc(paragraph("text https://x.com"))"#);
    assert_eq!(serialize(&doc), r"text https\://x.com");
    assert_eq!(parse(&serialize(&doc)), doc);
}

#[test]
fn test_special_characters_survive() {
    let doc = Node::doc(vec![
        Node::paragraph(vec![Node::text("# * _ ` [ ] ~ $ < & \\ | 1. -")]),
        Node::heading(2, vec![Node::text("1) not a list")]),
    ]);
    assert_eq!(parse(&serialize(&doc)), doc);
}

fn word_marks() -> impl Strategy<Value = Vec<Mark>> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(strong, em, strike, code)| {
            let mut marks = Vec::new();
            if strong {
                marks.push(Mark::Strong);
            }
            if em {
                marks.push(Mark::Em);
            }
            if strike {
                marks.push(Mark::Strike);
            }
            if code {
                marks.push(Mark::Code);
            }
            marks
        },
    )
}

/// Words joined by plain spaces; each word carries its own marks.
fn paragraph_strategy() -> impl Strategy<Value = Node> {
    prop::collection::vec(("[a-z][a-z0-9]{0,5}", word_marks()), 1..8).prop_map(|words| {
        let mut content = Vec::new();
        for (i, (word, marks)) in words.into_iter().enumerate() {
            if i > 0 {
                content.push(Node::text(" "));
            }
            content.push(Node::marked_text(&word, marks));
        }
        merge_plain_text(content)
    })
}

fn merge_plain_text(nodes: Vec<Node>) -> Node {
    let mut merged: Vec<Node> = Vec::new();
    for node in nodes {
        match merged.last_mut() {
            Some(last) if last.marks == node.marks => {
                let text = format!("{}{}", last.text_str(), node.text_str());
                last.text = Some(text);
            }
            _ => merged.push(node),
        }
    }
    Node::paragraph(merged)
}

proptest! {
    #[test]
    fn prop_marked_paragraphs_survive(paragraphs in prop::collection::vec(paragraph_strategy(), 1..4)) {
        let doc = Node::doc(paragraphs);
        let md = serialize(&doc);
        prop_assert_eq!(parse(&md), doc, "markdown: {}", md);
    }
}
