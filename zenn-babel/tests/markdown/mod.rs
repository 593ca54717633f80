//! Markdown format tests
//!
//! Tests for Markdown → intermediate markup → document tree → Markdown.

mod directives;
mod math;
mod roundtrip;
