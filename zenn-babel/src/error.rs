//! Error types for format, schema and editing operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// A document tree that violates the node type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{parent} cannot contain [{children}]")]
    InvalidContent { parent: String, children: String },
    #[error("{0} is a text node without text")]
    MissingText(String),
    #[error("{0} carries text but is not a text node")]
    UnexpectedText(String),
    #[error("marks are only allowed on text nodes, found on {0}")]
    UnexpectedMarks(String),
    #[error("{node} has unknown attribute '{attr}'")]
    UnknownAttribute { node: String, attr: String },
}

/// Errors raised by the table structural editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The selection does not resolve to a cell inside a table.
    #[error("selection is not inside a table cell")]
    NotInTable,
    /// A path does not address a node of the document.
    #[error("no node at path {0}")]
    InvalidPath(String),
    /// A structural precondition that should always hold was broken.
    #[error("table invariant violated: {0}")]
    Invariant(String),
    /// The edited tree no longer satisfies the node type registry.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
