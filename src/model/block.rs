//! Block-level types.

use super::{InlineRun, ParagraphRole};
use serde::{Deserialize, Serialize};

/// A structural unit of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading, level 1 to 3
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        content: InlineRun,
    },

    /// Paragraph; each source line is kept as its own run and rendered with
    /// a line break in between
    Paragraph {
        /// Lines of the paragraph
        lines: Vec<InlineRun>,
        /// Position-derived role below a level-1 heading
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<ParagraphRole>,
    },

    /// Unordered list of consecutive items
    List {
        /// List items
        items: Vec<InlineRun>,
    },

    /// Thematic break
    Rule,
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, content: InlineRun) -> Self {
        Block::Heading { level, content }
    }

    /// Create a paragraph block without a role.
    pub fn paragraph(lines: Vec<InlineRun>) -> Self {
        Block::Paragraph { lines, role: None }
    }

    /// Short kind name, used in logs and text dumps.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::List { .. } => "list",
            Block::Rule => "rule",
        }
    }

    /// The inline runs carried by this block.
    pub fn runs(&self) -> &[InlineRun] {
        match self {
            Block::Heading { content, .. } => std::slice::from_ref(content),
            Block::Paragraph { lines, .. } => lines,
            Block::List { items } => items,
            Block::Rule => &[],
        }
    }

    /// Role of a paragraph, if tagged.
    pub fn role(&self) -> Option<ParagraphRole> {
        match self {
            Block::Paragraph { role, .. } => *role,
            _ => None,
        }
    }

    /// Plain text of the block; paragraph lines and list items are joined
    /// with newlines.
    pub fn plain_text(&self) -> String {
        self.runs()
            .iter()
            .map(|run| run.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
