//! CLI-specific transforms
//!
//! This module defines the views `zenn-md inspect` can print for a Markdown file.
//! Each transform is a stage + format combination (e.g., "markup-html", "tree-json").
//!
//! ## Transform Pipeline
//!
//! 1. **Parsing** - Markdown → intermediate markup
//!    - `markup-html`: the markup as HTML, embeds and math in editor form
//!
//! 2. **Building** - intermediate markup → document tree
//!    - `tree-json`: document JSON
//!    - `tree-outline`: compact one-line outline (`doc(paragraph("a"))`)
//!    - `tree-treeviz`: tree visualization with Unicode icons

use zenn_babel::formats::markdown::ParseOptions;
use zenn_babel::formats::treeviz::to_treeviz_str;
use zenn_babel::transforms::{build_tree, parse_markdown_with_options};

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] =
    &["markup-html", "tree-json", "tree-outline", "tree-treeviz"];

/// Execute a named transform on Markdown source
///
/// # Examples
///
/// ```ignore
/// let output = execute_transform("# Title", "tree-treeviz", &ParseOptions::default())?;
/// ```
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    options: &ParseOptions,
) -> Result<String, String> {
    let markup = parse_markdown_with_options(source, options);

    match transform_name {
        "markup-html" => markup
            .to_html()
            .map(|html| format!("{html}\n"))
            .map_err(|e| format!("Transform failed: {e}")),
        "tree-json" => {
            let doc = build_tree(&markup);
            serde_json::to_string_pretty(&doc)
                .map(|json| format!("{json}\n"))
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        "tree-outline" => Ok(format!("{}\n", build_tree(&markup))),
        "tree-treeviz" => Ok(to_treeviz_str(&build_tree(&markup))),
        _ => Err(format!(
            "Unknown transform '{transform_name}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, transform: &str) -> String {
        execute_transform(source, transform, &ParseOptions::default()).expect("transform to run")
    }

    #[test]
    fn markup_html_shows_editor_markup() {
        let output = run("$$\nx\n$$", "markup-html");
        assert!(output.contains(r#"<embed-katex display-mode="1">x</embed-katex>"#));
    }

    #[test]
    fn markup_html_uses_configured_origin() {
        let options = ParseOptions {
            embed_origin: "https://embed.example".to_string(),
            ..ParseOptions::default()
        };
        let output = execute_transform("@[card](https://zenn.dev)", "markup-html", &options)
            .expect("transform to run");
        assert!(output.contains("https://embed.example/card#embed-"));
    }

    #[test]
    fn tree_json_emits_document_json() {
        let output = run("# Hi", "tree-json");
        assert!(output.contains(r#""type": "heading""#));
        assert!(output.contains(r#""text": "Hi""#));
    }

    #[test]
    fn tree_outline_is_one_line() {
        assert_eq!(
            run("Hello *you*", "tree-outline"),
            "doc(paragraph(\"Hello \", em(\"you\")))\n"
        );
    }

    #[test]
    fn tree_treeviz_starts_at_doc() {
        assert!(run("Hello", "tree-treeviz").starts_with("⧉ doc"));
    }

    #[test]
    fn unknown_transform_is_an_error() {
        let err = execute_transform("x", "ast-tag", &ParseOptions::default()).unwrap_err();
        assert!(err.contains("Unknown transform 'ast-tag'"));
    }
}
