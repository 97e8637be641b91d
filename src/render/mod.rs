//! Inspection renderers: the parsed document as plain text or JSON.

mod json;
mod text;

pub use json::{surface_to_json, to_json, JsonFormat};
pub use text::{to_text, TextOptions};
