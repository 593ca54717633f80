//! Format implementations
//!
//! This module contains all format implementations that convert between
//! the document tree and its text representations.

pub mod icons;
pub mod json;
pub mod markdown;
pub mod markup;
pub mod treeviz;

pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use markup::MarkupFormat;
pub use treeviz::TreevizFormat;
