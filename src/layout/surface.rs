//! The rendered surface: positioned elements on one continuous page.

use super::metrics::FontFace;
use crate::model::Color;
use crate::style::FontFamily;
use serde::Serialize;

/// A fixed-width, variable-height visual tree.
///
/// Coordinates are points with the origin at the top-left corner and `y`
/// growing downwards. The renderer builds a surface and hands it over;
/// consumers only get read access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSurface {
    width: f32,
    height: f32,
    title: Option<String>,
    font_family: FontFamily,
    elements: Vec<PositionedElement>,
}

impl RenderedSurface {
    pub(crate) fn new(width: f32, font_family: FontFamily, title: Option<String>) -> Self {
        Self {
            width,
            height: 0.0,
            title,
            font_family,
            elements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, element: PositionedElement) {
        self.elements.push(element);
    }

    pub(crate) fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    /// Surface width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Surface height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Document title, if the source had a level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Base font family.
    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[PositionedElement] {
        &self.elements
    }

    /// Text elements only.
    pub fn text_elements(&self) -> impl Iterator<Item = (&PositionedElement, &TextElement)> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Text(text) => Some((e, text)),
            _ => None,
        })
    }

    /// Concatenated text of the surface. Elements sharing a top edge form
    /// one output line; a visible gap between them becomes a space.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut previous: Option<&PositionedElement> = None;
        for (element, text) in self.text_elements() {
            if let Some(prev) = previous {
                if (prev.y - element.y).abs() > 0.01 {
                    out.push('\n');
                } else if element.x > prev.right() + 0.5 && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            out.push_str(&text.text);
            previous = Some(element);
        }
        out
    }
}

/// An element placed on the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedElement {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// What to draw
    pub kind: ElementKind,
}

impl PositionedElement {
    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Drawable content of an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// A piece of text on one line
    Text(TextElement),
    /// A filled rectangle (rules and borders)
    Rect {
        /// Fill color
        color: Color,
    },
}

/// A piece of single-line text with one font and color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextElement {
    /// Display text
    pub text: String,
    /// Font face
    pub face: FontFace,
    /// Font size in points
    pub font_size: f32,
    /// Text color
    pub color: Color,
    /// Baseline offset from the element's top edge
    pub baseline: f32,
    /// Draw an underline
    pub underline: bool,
    /// Hyperlink target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
