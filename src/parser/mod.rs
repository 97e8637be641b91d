//! Extended-markdown parsing.
//!
//! [`BlockParser`] turns source text into a [`crate::Document`]; the
//! [`InlineFormatter`] it drives resolves character-level markup.

mod block;
pub mod escape;
mod inline;
mod options;

pub use block::{BlockParser, LineClassifier, LineToken};
pub use escape::{decode_entity_at, escape_reserved};
pub use inline::{InlineFormatter, InlineState};
pub use options::ParseOptions;
