//! Plain text rendering for parsed documents.

use crate::error::Result;
use crate::model::{Block, Document};

/// Options for the plain text dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Prefix written before each list item
    pub list_marker: String,

    /// Write thematic breaks as a line of dashes
    pub show_rules: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            list_marker: "- ".to_string(),
            show_rules: true,
        }
    }
}

impl TextOptions {
    /// Create default text options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the list item prefix.
    pub fn with_list_marker(mut self, marker: impl Into<String>) -> Self {
        self.list_marker = marker.into();
        self
    }

    /// Enable or disable rule lines.
    pub fn with_rules(mut self, show: bool) -> Self {
        self.show_rules = show;
        self
    }
}

/// Convert a document to plain text.
///
/// Blocks are separated by a blank line; decorations are dropped.
pub fn to_text(doc: &Document, options: &TextOptions) -> Result<String> {
    let mut parts: Vec<String> = Vec::with_capacity(doc.block_count());
    for block in doc.blocks() {
        let part = match block {
            Block::List { items } => items
                .iter()
                .map(|item| format!("{}{}", options.list_marker, item.plain_text()))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Rule if options.show_rules => "---".to_string(),
            Block::Rule => continue,
            _ => block.plain_text(),
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }
    Ok(parts.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BlockParser;

    fn parse(source: &str) -> Document {
        BlockParser::default().parse(source)
    }

    #[test]
    fn test_to_text() {
        let doc = parse("# Hello, world!\n\nSecond **paragraph**.\n\n- one\n- two\n\n---");
        let result = to_text(&doc, &TextOptions::default()).unwrap();

        assert_eq!(
            result,
            "Hello, world!\n\nSecond paragraph.\n\n- one\n- two\n\n---"
        );
    }

    #[test]
    fn test_to_text_options() {
        let doc = parse("- a\n\n---\n\nend");
        let options = TextOptions::new().with_list_marker("* ").with_rules(false);
        let result = to_text(&doc, &options).unwrap();

        assert_eq!(result, "* a\n\nend");
    }

    #[test]
    fn test_to_text_keeps_literal_markup() {
        let doc = parse("a < b & c");
        let result = to_text(&doc, &TextOptions::default()).unwrap();
        assert_eq!(result, "a < b & c");
    }
}
