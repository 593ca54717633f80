//! Block and inline math

use zenn_babel::transforms::{parse, serialize};
use zenn_babel::NodeType;

#[test]
fn test_block_math_delimiters_are_stripped() {
    let doc = parse("$$\nE = mc^2\n$$");
    let math = &doc.content[0];
    assert_eq!(math.kind, NodeType::BlockMath);
    assert_eq!(math.attr_str("latex"), "E = mc^2");
    assert_eq!(serialize(&doc), "$$\nE = mc^2\n$$");
}

#[test]
fn test_empty_block_math() {
    let doc = parse("$$\n\n$$");
    assert_eq!(doc.content[0].kind, NodeType::BlockMath);
    assert_eq!(doc.content[0].attr_str("latex"), "");
    assert_eq!(serialize(&doc), "$$\n\n$$");
}

#[test]
fn test_block_math_keeps_inner_lines() {
    let md = "$$\n\\begin{aligned}\na &= b \\\\\n\nc &= d\n\\end{aligned}\n$$";
    let doc = parse(md);
    assert_eq!(
        doc.content[0].attr_str("latex"),
        "\\begin{aligned}\na &= b \\\\\n\nc &= d\n\\end{aligned}"
    );
    assert_eq!(serialize(&doc), md);
}

#[test]
fn test_math_fence_is_block_math() {
    let doc = parse("```math\nx^2\n```");
    assert_eq!(doc.content[0].kind, NodeType::BlockMath);
    assert_eq!(serialize(&doc), "$$\nx^2\n$$");
}

#[test]
fn test_inline_math_in_text() {
    let md = "質量エネルギー等価性は$E = mc^2$で表される";
    let doc = parse(md);
    insta::assert_snapshot!(doc.to_string(), @r###"doc(paragraph("質量エネルギー等価性は", inlineMath, "で表される"))"###);
    assert_eq!(doc.content[0].content[1].attr_str("latex"), "E = mc^2");
    assert_eq!(serialize(&doc), md);
}

#[test]
fn test_dollar_in_code_is_not_math() {
    let doc = parse("```sh\n$$\necho $HOME\n$$\n```");
    assert_eq!(doc.content[0].kind, NodeType::CodeBlock);
    assert_eq!(doc.content[0].text_content(), "$$\necho $HOME\n$$");
}

#[test]
fn test_literal_dollar_is_escaped() {
    let doc = zenn_babel::Node::doc(vec![zenn_babel::Node::paragraph(vec![
        zenn_babel::Node::text("costs $5 or $6"),
    ])]);
    let md = serialize(&doc);
    assert_eq!(md, r"costs \$5 or \$6");
    assert_eq!(parse(&md), doc);
}

#[test]
fn test_inline_math_with_pipes_in_table_cell() {
    let doc = parse("| h |\n| --- |\n| $\\|x\\|$ |");
    let cell = &doc.content[0].content[1].content[0];
    assert_eq!(cell.kind, NodeType::TableCell);
    let math = &cell.content[0].content[0];
    assert_eq!(math.kind, NodeType::InlineMath);
    assert_eq!(math.attr_str("latex"), "|x|");

    let md = serialize(&doc);
    assert!(md.contains(r"| $\|x\|$ |"), "{md}");
    assert_eq!(parse(&md), doc);
}

