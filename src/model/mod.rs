//! Document model types for extended-markdown content.
//!
//! The model is the hand-off point between the block parser and the
//! renderer: blocks hold inline runs, runs hold decorated spans.

mod block;
mod color;
mod document;
mod inline;

pub use block::Block;
pub use color::Color;
pub use document::{Document, DocumentStats, Metadata};
pub use inline::{Decorations, InlineRun, InlineSpan, ParagraphRole};
