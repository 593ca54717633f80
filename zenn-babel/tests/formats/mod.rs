//! Conversions through the format registry

use zenn_babel::{FormatError, FormatRegistry};

const SOURCE: &str = "# Title

Some **bold** text, a [link](https://zenn.dev) and $x^2$.

- one
- two

| a | b |
| :--- | --- |
| c | d |

@[card](https://zenn.dev)

```mermaid
graph TD;
A-->B;
```

$$
E = mc^2
$$";

#[test]
fn test_markdown_through_json() {
    let registry = FormatRegistry::default();
    let doc = registry.parse(SOURCE, "markdown").unwrap();
    let json = registry.serialize(&doc, "json").unwrap();
    let back = registry.parse(&json, "json").unwrap();
    assert_eq!(back, doc);
    assert_eq!(registry.serialize(&back, "markdown").unwrap(), SOURCE);
}

#[test]
fn test_markdown_through_markup() {
    let registry = FormatRegistry::default();
    let doc = registry.parse(SOURCE, "markdown").unwrap();
    let html = registry.serialize(&doc, "markup").unwrap();
    assert!(html.contains("zenn-embedded-mermaid"));
    assert!(html.contains(r#"<embed-katex display-mode="1">"#));

    let back = registry.parse(&html, "markup").unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_json_rejects_schema_violations() {
    let registry = FormatRegistry::default();
    let json = r#"{"type": "doc", "content": [{"type": "text", "text": "loose"}]}"#;
    assert!(matches!(
        registry.parse(json, "json"),
        Err(FormatError::ParseError(_))
    ));
}

#[test]
fn test_treeviz_is_output_only() {
    let registry = FormatRegistry::default();
    let doc = registry.parse("# Title", "markdown").unwrap();
    let tree = registry.serialize(&doc, "treeviz").unwrap();
    assert!(tree.contains("h1"));
    assert!(matches!(
        registry.parse(&tree, "treeviz"),
        Err(FormatError::NotSupported(_))
    ));
}

#[test]
fn test_unknown_format() {
    let registry = FormatRegistry::default();
    assert_eq!(
        registry.parse("x", "docx"),
        Err(FormatError::FormatNotFound("docx".to_string()))
    );
}

#[test]
fn test_detect_format_from_filename() {
    let registry = FormatRegistry::default();
    assert_eq!(
        registry.detect_format_from_filename("post.md"),
        Some("markdown".to_string())
    );
    assert_eq!(
        registry.detect_format_from_filename("dump/tree.json"),
        Some("json".to_string())
    );
    assert_eq!(
        registry.detect_format_from_filename("page.html"),
        Some("markup".to_string())
    );
    assert_eq!(registry.detect_format_from_filename("notes.txt"), None);
}
