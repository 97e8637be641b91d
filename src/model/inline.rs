//! Inline (character-level) types.

use super::Color;
use serde::{Deserialize, Serialize};

/// An ordered sequence of formatted spans: the text of one heading, list
/// item or paragraph line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineRun {
    spans: Vec<InlineSpan>,
}

impl InlineRun {
    /// Create an empty run.
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Create a run holding one undecorated span.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut run = Self::new();
        run.push(InlineSpan::new(text));
        run
    }

    /// Build a run from spans, merging neighbours with equal decorations.
    pub fn from_spans(spans: impl IntoIterator<Item = InlineSpan>) -> Self {
        let mut run = Self::new();
        for span in spans {
            run.push(span);
        }
        run
    }

    /// Append a span. Empty spans are dropped and a span decorated like
    /// the previous one is merged into it, unless it starts a new line.
    pub fn push(&mut self, span: InlineSpan) {
        if span.text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if !span.starts_line && last.decorations == span.decorations {
                last.text.push_str(&span.text);
                return;
            }
        }
        self.spans.push(span);
    }

    /// The spans in order.
    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }

    /// Concatenated text without decorations.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Check if the run holds no text.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Check if any span carries a decoration.
    pub fn is_decorated(&self) -> bool {
        self.spans.iter().any(|s| s.decorations.has_any())
    }
}

/// A run of text with one set of decorations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSpan {
    /// The display text
    pub text: String,

    /// Applied decorations
    #[serde(default, skip_serializing_if = "Decorations::is_plain")]
    pub decorations: Decorations,

    /// First span of a centered segment; never merged into the span before
    #[serde(default, skip_serializing_if = "is_false")]
    pub starts_line: bool,
}

impl InlineSpan {
    /// Create an undecorated span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            decorations: Decorations::default(),
            starts_line: false,
        }
    }

    /// Create a span with decorations.
    pub fn decorated(text: impl Into<String>, decorations: Decorations) -> Self {
        Self {
            text: text.into(),
            decorations,
            starts_line: false,
        }
    }

    /// Mark the span as the start of its own line.
    pub fn starting_line(mut self) -> Self {
        self.starts_line = true;
        self
    }
}

/// Decorations applied to an inline span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decorations {
    /// Bold weight
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    /// Italic style
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    /// Hyperlink target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Laid out as its own centered line
    #[serde(default, skip_serializing_if = "is_false")]
    pub centered: bool,

    /// Explicit text color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Decorations {
    /// Check if no decoration is applied.
    pub fn is_plain(&self) -> bool {
        !self.has_any()
    }

    /// Check if any decoration is applied.
    pub fn has_any(&self) -> bool {
        self.bold || self.italic || self.centered || self.link.is_some() || self.color.is_some()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Semantic role of a paragraph that directly follows a level-1 heading.
///
/// Resume-style documents put the role line, the contact line and a tagline
/// under the name; the style resolver has a rule for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParagraphRole {
    /// First paragraph after the title
    Subtitle,
    /// Second paragraph after the title
    ContactLine,
    /// Third paragraph after the title
    Tagline,
}

impl ParagraphRole {
    /// Role for the n-th (0-based) paragraph after a level-1 heading.
    pub fn for_position(index: usize) -> Option<Self> {
        match index {
            0 => Some(ParagraphRole::Subtitle),
            1 => Some(ParagraphRole::ContactLine),
            2 => Some(ParagraphRole::Tagline),
            _ => None,
        }
    }
}
