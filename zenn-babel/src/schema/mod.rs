//! Node type registry and the document tree
//!
//! The tree follows the usual rich-text editor model: every node has a type from
//! the closed [`NodeType`] enumeration, a string-keyed attribute map, and (for
//! non-leaf types) an ordered list of children constrained by the type's content
//! expression. Text nodes carry their text and [`Mark`]s.
//!
//!     | Node type      | Class  | Content               | Attributes            |
//!     |----------------|--------|-----------------------|-----------------------|
//!     | doc            | block  | block+                | frontMatter           |
//!     | paragraph      | block  | inline*               |                       |
//!     | heading        | block  | inline*               | level                 |
//!     | blockquote     | block  | block+                |                       |
//!     | codeBlock      | block  | text*                 | language              |
//!     | bulletList     | block  | listItem+             | tight                 |
//!     | orderedList    | block  | listItem+             | start, tight          |
//!     | listItem       | block  | paragraph block*      |                       |
//!     | table          | block  | tableRow+             |                       |
//!     | tableRow       | block  | (tableHeader|tableCell)+ |                    |
//!     | tableHeader    | block  | paragraph             | align                 |
//!     | tableCell      | block  | paragraph             | align                 |
//!     | horizontalRule | atomic |                       |                       |
//!     | embed          | atomic |                       | type, url             |
//!     | blockMath      | atomic |                       | latex                 |
//!     | inlineMath     | atomic |                       | latex                 |
//!     | image          | atomic |                       | src, alt, title       |
//!     | hardBreak      | atomic |                       |                       |
//!     | text           | inline |                       |                       |
//!
//! Trees serialize to JSON in the `{type, attrs, content, text, marks}` shape.

pub mod node;
pub mod types;

pub use node::{AttrValue, Attrs, Mark, Node};
pub use types::{NodeClass, NodeGroup, NodeType};
