//! Document-level types.

use super::{Block, InlineRun};
use serde::{Deserialize, Serialize};

/// A parsed document: an ordered sequence of blocks.
///
/// Documents are produced by the block parser and only read afterwards;
/// there is no API for changing the blocks of an existing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Blocks in source order
    blocks: Vec<Block>,
}

impl Document {
    /// Create a document from blocks, deriving the title from the first
    /// level-1 heading.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let title = blocks.iter().find_map(|block| match block {
            Block::Heading { level: 1, content } => Some(content.plain_text()),
            _ => None,
        });

        Self {
            metadata: Metadata { title },
            blocks,
        }
    }

    /// The blocks in source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over every inline run in document order.
    pub fn runs(&self) -> impl Iterator<Item = &InlineRun> {
        self.blocks.iter().flat_map(|block| block.runs())
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Text of the first level-1 heading
    pub title: Option<String>,
}

/// Counts shown by `mdpage info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Characters in the source text
    pub characters: usize,
    /// Lines in the source text
    pub lines: usize,
    /// Words in the parsed text
    pub words: usize,
    /// Heading blocks
    pub headings: usize,
    /// Paragraph blocks
    pub paragraphs: usize,
    /// List blocks
    pub lists: usize,
    /// Items across all lists
    pub list_items: usize,
    /// Thematic rules
    pub rules: usize,
    /// Hyperlink spans
    pub links: usize,
}

impl DocumentStats {
    /// Collect statistics for a source text and its parsed document.
    pub fn collect(source: &str, document: &Document) -> Self {
        let mut stats = DocumentStats {
            characters: source.chars().count(),
            lines: if source.is_empty() {
                0
            } else {
                source.lines().count()
            },
            ..Default::default()
        };

        for block in document.blocks() {
            match block {
                Block::Heading { .. } => stats.headings += 1,
                Block::Paragraph { .. } => stats.paragraphs += 1,
                Block::List { items } => {
                    stats.lists += 1;
                    stats.list_items += items.len();
                }
                Block::Rule => stats.rules += 1,
            }
        }

        for run in document.runs() {
            stats.words += run.plain_text().split_whitespace().count();
            stats.links += run
                .spans()
                .iter()
                .filter(|s| s.decorations.link.is_some())
                .count();
        }

        stats
    }
}
