//! Markdown ⇄ document-tree conversion for the Zenn editor
//!
//!     This crate is the document core of a WYSIWYG Markdown editor. It converts Zenn-flavoured
//!     Markdown into a schema-validated document tree and back, and provides structural table
//!     editing on that tree.
//!
//! Architecture
//!
//!     Markdown is never turned into the tree directly. The parser produces intermediate markup
//!     (an HTML DOM in the editor's vocabulary), and the tree builder recognizes that markup by
//!     tag name plus attribute predicate. This keeps paste-from-HTML and load-from-Markdown on
//!     the same recognizers.
//!
//!         Markdown ──parser──▶ IntermediateMarkup ──builder──▶ Node tree ──serializer──▶ Markdown
//!
//!     This is a pure lib: no code here touches stdout, the environment or the file system.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError, SchemaError, EditError
//!     ├── schema                  # Node types, content models, nodes and marks
//!     ├── embed.rs                # Embed provider table and URL transforms
//!     ├── markup.rs               # Intermediate markup and its element vocabulary
//!     ├── builder.rs              # Markup → document tree
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── markdown            # parser.rs, serializer.rs, options.rs
//!     │   ├── markup
//!     │   ├── json
//!     │   └── treeviz
//!     ├── table                   # Table structural editor
//!     └── transforms.rs           # Boundary functions
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── formats                 # registry conversions
//!     ├── markdown                # round trips, directives, idempotence
//!     └── table                   # command sequences and the header invariant
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.

pub mod builder;
pub mod embed;
pub mod error;
pub mod format;
pub mod formats;
pub mod markup;
pub mod registry;
pub mod schema;
pub mod table;
pub mod transforms;

pub use error::{EditError, FormatError, SchemaError};
pub use format::Format;
pub use markup::IntermediateMarkup;
pub use registry::FormatRegistry;
pub use schema::{Mark, Node, NodeType};
pub use transforms::{build_tree, parse, parse_markdown, serialize};
