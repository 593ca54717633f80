//! Embed directives: recognition, stored urls and canonical output per provider

use zenn_babel::transforms::{parse, parse_markdown, serialize};
use zenn_babel::{Node, NodeType};

fn single_embed(md: &str) -> Node {
    let doc = parse(md);
    assert_eq!(doc.content.len(), 1, "{doc}");
    let node = doc.content[0].clone();
    assert_eq!(node.kind, NodeType::Embed, "{doc}");
    node
}

#[test]
fn test_symmetric_directives_round_trip() {
    let samples = [
        "@[card](https://example.com)",
        "@[tweet](https://twitter.com/zenn_dev/status/1234567890)",
        "@[github](https://github.com/zenn-dev/zenn-editor/blob/main/README.md)",
        "@[gist](https://gist.github.com/zenn/0123456789abcdef)",
        "@[codesandbox](https://codesandbox.io/embed/x2cj6p)",
        "@[stackblitz](https://stackblitz.com/edit/zenn?embed=1)",
        "@[jsfiddle](https://jsfiddle.net/zenn/abc123/)",
        "@[docswell](https://www.docswell.com/slide/LK7J5V/embed)",
        "@[blueprintue](https://blueprintue.com/render/abcd1234/)",
        "@[figma](https://www.figma.com/file/abcdefghij/example)",
        "@[slideshare](abcd123)",
        "@[codepen](https://codepen.io/zenn/pen/pen-123)",
    ];
    for md in samples {
        assert_eq!(serialize(&parse(md)), md);
    }
}

#[test]
fn test_card_stores_url_verbatim() {
    let node = single_embed("@[card](https://example.com)");
    assert_eq!(node.attr_str("type"), "card");
    assert_eq!(node.attr_str("url"), "https://example.com");
}

#[test]
fn test_codepen_stores_embed_url() {
    let node = single_embed("@[codepen](https://codepen.io/zenn/pen/pen-123)");
    assert_eq!(
        node.attr_str("url"),
        "https://codepen.io/zenn/embed/pen-123?embed-version=2"
    );
}

#[test]
fn test_youtube_bare_url() {
    let md = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    let node = single_embed(md);
    assert_eq!(node.attr_str("type"), "youtube");
    assert_eq!(
        node.attr_str("url"),
        "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"
    );
    assert_eq!(serialize(&parse(md)), md);
}

#[test]
fn test_youtube_directive_is_written_as_bare_url() {
    let doc = parse("@[youtube](dQw4w9WgXcQ)");
    assert_eq!(
        serialize(&doc),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

#[test]
fn test_figma_and_slideshare_store_iframe_urls() {
    let figma = single_embed("@[figma](https://www.figma.com/file/abcdefghij/example)");
    assert_eq!(
        figma.attr_str("url"),
        "https://www.figma.com/embed?embed_host=zenn&url=https://www.figma.com/file/abcdefghij/example"
    );
    let slideshare = single_embed("@[slideshare](abcd123)");
    assert_eq!(
        slideshare.attr_str("url"),
        "https://www.slideshare.net/slideshow/embed_code/key/abcd123"
    );
}

#[test]
fn test_gist_is_server_rendered_but_written_as_directive() {
    let md = "@[gist](https://gist.github.com/zenn/0123456789abcdef)";
    let html = parse_markdown(md).to_html().unwrap();
    assert!(html.contains("zenn-embedded-gist"), "{html}");
    assert!(html.contains(r#"data-content="https%3A%2F%2Fgist.github.com%2Fzenn%2F0123456789abcdef""#));
    assert_eq!(serialize(&parse(md)), md);
}

#[test]
fn test_mermaid_fence_keeps_diagram_source() {
    let md = "```mermaid\ngraph TD\n  A --> B\n```";
    let node = single_embed(md);
    assert_eq!(node.attr_str("type"), "mermaid");
    assert_eq!(node.attr_str("url"), "graph TD\n  A --> B");
    assert_eq!(serialize(&parse(md)), md);
}

#[test]
fn test_unknown_directive_is_literal_text() {
    let md = "@[unknown](https://example.com)";
    let doc = parse(md);
    assert_eq!(doc.content[0].kind, NodeType::Paragraph);
    assert_eq!(doc.content[0].text_content(), "@unknown");
    assert_eq!(serialize(&doc), md);
}

#[test]
fn test_directive_inside_text_is_not_an_embed() {
    let doc = parse("see @[card](https://example.com) here");
    assert_eq!(doc.content[0].kind, NodeType::Paragraph);
}

#[test]
fn test_escaped_directive_text_stays_text() {
    let doc = parse(r"@\[card\](https://example.com)");
    assert_eq!(doc.content[0].kind, NodeType::Paragraph);
    assert_eq!(serialize(&doc), r"@\[card\](https://example.com)");
}

#[test]
fn test_embeds_between_paragraphs() {
    let md = "before\n\n@[card](https://example.com)\n\nafter";
    let doc = parse(md);
    assert_eq!(
        doc.content.iter().map(|n| n.kind).collect::<Vec<_>>(),
        vec![NodeType::Paragraph, NodeType::Embed, NodeType::Paragraph]
    );
    assert_eq!(serialize(&doc), md);
}

#[test]
fn test_directive_payload_is_not_validated() {
    let embed = single_embed("@[card](not a url)");
    assert_eq!(embed.attr_str("type"), "card");
    assert_eq!(embed.attr_str("url"), "not a url");
    assert_eq!(serialize(&Node::doc(vec![embed])), "@[card](not a url)");
}

#[test]
fn test_escaped_directive_without_link_stays_text() {
    let doc = parse(r"@\[card\](not a url)");
    assert_eq!(doc.content[0].kind, NodeType::Paragraph);
    assert_eq!(doc.content[0].text_content(), "@[card](not a url)");
}

#[test]
fn test_directive_after_front_matter() {
    let doc = parse("---\ntitle: x\n---\n\ntext\n\n@[card](not a url)");
    let embed = &doc.content[1];
    assert_eq!(embed.kind, NodeType::Embed, "{doc}");
    assert_eq!(embed.attr_str("url"), "not a url");
}
