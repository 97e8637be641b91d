//! Style resolution: [`StyleConfig`] to concrete presentation rules.
//!
//! All lengths in a [`ResolvedStyle`] are PDF points. CSS pixel lengths of
//! the page design convert at 0.75 pt/px and millimetres at 72/25.4 pt/mm.

use super::config::{FontFamily, StyleConfig};
use crate::model::{Color, ParagraphRole};
use serde::Serialize;

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Points per CSS pixel.
pub const PT_PER_PX: f32 = 0.75;

/// Page width (A4) in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// Page height (A4) in millimetres.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Body text color.
pub const TEXT_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);

/// Color of the contact and tagline paragraphs.
pub const MUTED_COLOR: Color = Color::rgb(0x66, 0x66, 0x66);

const MARGIN_RANGE_MM: (u32, u32) = (0, 50);
const FONT_SIZE_RANGE_PT: (u32, u32) = (8, 48);
const LINE_HEIGHT_RANGE: (f32, f32) = (1.0, 3.0);

/// Convert millimetres to points.
pub fn mm(value: f32) -> f32 {
    value * PT_PER_MM
}

/// Convert CSS pixels to points.
pub fn px(value: f32) -> f32 {
    value * PT_PER_PX
}

/// Horizontal alignment of a line group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left
    Left,
    /// Centered
    Center,
    /// Flush on both sides except the last line
    Justify,
}

impl TextAlign {
    fn centered_or(center: bool, otherwise: TextAlign) -> Self {
        if center {
            TextAlign::Center
        } else {
            otherwise
        }
    }

    /// CSS `text-align` value.
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Justify => "justify",
        }
    }
}

/// Presentation of a run of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRule {
    /// Font size
    pub font_size: f32,
    /// Line box height as a multiple of the font size
    pub line_height: f32,
    /// Bold weight for the whole block
    pub bold: bool,
    /// Italic style for the whole block
    pub italic: bool,
    /// Text color
    pub color: Color,
    /// Alignment
    pub align: TextAlign,
    /// Space above
    pub margin_top: f32,
    /// Space below
    pub margin_bottom: f32,
}

impl TextRule {
    /// Height of one line box.
    pub fn line_box(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// A horizontal line drawn under a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderRule {
    /// Stroke width
    pub width: f32,
    /// Stroke color
    pub color: Color,
    /// Gap between the text and the line
    pub padding: f32,
}

/// Presentation of one heading level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingRule {
    /// Text presentation
    pub text: TextRule,
    /// Optional line below the heading
    pub border_bottom: Option<BorderRule>,
}

/// Presentation of list blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRule {
    /// Space above the list
    pub margin_top: f32,
    /// Space below the list
    pub margin_bottom: f32,
    /// Left indent of item text
    pub indent: f32,
    /// Bullet glyph
    pub bullet: char,
    /// Item presentation
    pub item: TextRule,
}

/// Presentation of thematic rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThematicRule {
    /// Stroke width
    pub thickness: f32,
    /// Stroke color
    pub color: Color,
    /// Space above
    pub margin_top: f32,
    /// Space below
    pub margin_bottom: f32,
}

/// Presentation of hyperlinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRule {
    /// Text color
    pub color: Color,
    /// Draw an underline
    pub underline: bool,
}

/// Page geometry and base text settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRule {
    /// Page width
    pub width: f32,
    /// Minimum surface height
    pub min_height: f32,
    /// Top padding
    pub padding_top: f32,
    /// Right padding
    pub padding_right: f32,
    /// Bottom padding
    pub padding_bottom: f32,
    /// Left padding
    pub padding_left: f32,
    /// Font family
    pub font_family: FontFamily,
    /// Default text color
    pub text_color: Color,
}

impl PageRule {
    /// Width available to content.
    pub fn content_width(&self) -> f32 {
        (self.width - self.padding_left - self.padding_right).max(0.0)
    }
}

/// The closed set of presentation rules consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    /// Page geometry
    pub page: PageRule,
    /// Level-1 headings
    pub h1: HeadingRule,
    /// Level-2 headings
    pub h2: HeadingRule,
    /// Level-3 headings
    pub h3: HeadingRule,
    /// Ordinary paragraphs
    pub paragraph: TextRule,
    /// First paragraph after the title
    pub subtitle: TextRule,
    /// Second paragraph after the title
    pub contact_line: TextRule,
    /// Third paragraph after the title
    pub tagline: TextRule,
    /// Lists
    pub list: ListRule,
    /// Thematic rules
    pub rule: ThematicRule,
    /// Hyperlinks
    pub link: LinkRule,
}

impl ResolvedStyle {
    /// Rule for a heading level. Levels outside 1..=3 use level 3.
    pub fn heading(&self, level: u8) -> &HeadingRule {
        match level {
            1 => &self.h1,
            2 => &self.h2,
            _ => &self.h3,
        }
    }

    /// Rule for a paragraph with the given role.
    pub fn paragraph(&self, role: Option<ParagraphRole>) -> &TextRule {
        match role {
            None => &self.paragraph,
            Some(ParagraphRole::Subtitle) => &self.subtitle,
            Some(ParagraphRole::ContactLine) => &self.contact_line,
            Some(ParagraphRole::Tagline) => &self.tagline,
        }
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        resolve(&StyleConfig::default())
    }
}

/// Resolve a style configuration. Total: every config yields a style.
///
/// Values outside the ranges offered by the settings surface are clamped
/// (margins 0..=50 mm, font sizes 8..=48 pt, line height 1..=3).
pub fn resolve(config: &StyleConfig) -> ResolvedStyle {
    let margin = |v: u32| mm(clamp_logged(v, MARGIN_RANGE_MM, "margin") as f32);
    let size = |v: u32| clamp_logged(v, FONT_SIZE_RANGE_PT, "font size") as f32;

    let line_height = if config.line_height.is_finite() {
        config.line_height.clamp(LINE_HEIGHT_RANGE.0, LINE_HEIGHT_RANGE.1)
    } else {
        LINE_HEIGHT_RANGE.0
    };
    if line_height != config.line_height {
        log::warn!(
            "Line height {} out of range, using {}",
            config.line_height,
            line_height
        );
    }

    let body = size(config.font_sizes.body);
    let small = (body - 1.0).max(1.0);

    let text = |font_size: f32, color: Color, align: TextAlign, top: f32, bottom: f32| TextRule {
        font_size,
        line_height,
        bold: false,
        italic: false,
        color,
        align,
        margin_top: top,
        margin_bottom: bottom,
    };

    let heading = |font_size: f32, color: Color, center: bool, top: f32, bottom: f32| TextRule {
        bold: true,
        ..text(
            font_size,
            color,
            TextAlign::centered_or(center, TextAlign::Left),
            top,
            bottom,
        )
    };

    let paragraph = text(body, TEXT_COLOR, TextAlign::Justify, px(8.0), px(8.0));

    ResolvedStyle {
        page: PageRule {
            width: mm(PAGE_WIDTH_MM),
            min_height: mm(PAGE_HEIGHT_MM),
            padding_top: margin(config.margins.top),
            padding_right: margin(config.margins.right),
            padding_bottom: margin(config.margins.bottom),
            padding_left: margin(config.margins.left),
            font_family: config.font_family,
            text_color: TEXT_COLOR,
        },
        h1: HeadingRule {
            text: heading(
                size(config.font_sizes.h1),
                config.heading_color,
                config.center_h1,
                0.0,
                px(8.0),
            ),
            border_bottom: None,
        },
        h2: HeadingRule {
            text: heading(
                size(config.font_sizes.h2),
                config.heading_color,
                config.center_h2,
                px(16.0),
                px(8.0),
            ),
            border_bottom: Some(BorderRule {
                width: px(2.0),
                color: config.accent_color,
                padding: px(4.0),
            }),
        },
        h3: HeadingRule {
            text: heading(
                size(config.font_sizes.h3),
                config.accent_color,
                config.center_h3,
                px(12.0),
                px(6.0),
            ),
            border_bottom: None,
        },
        subtitle: TextRule {
            italic: true,
            color: config.accent_color,
            align: TextAlign::centered_or(config.center_first_paragraph, TextAlign::Justify),
            ..paragraph.clone()
        },
        contact_line: TextRule {
            font_size: small,
            color: MUTED_COLOR,
            align: TextAlign::Center,
            ..paragraph.clone()
        },
        tagline: TextRule {
            font_size: small,
            italic: true,
            color: MUTED_COLOR,
            align: TextAlign::Center,
            ..paragraph.clone()
        },
        list: ListRule {
            margin_top: px(8.0),
            margin_bottom: px(8.0),
            indent: px(20.0),
            bullet: '\u{2022}',
            item: text(body, TEXT_COLOR, TextAlign::Justify, px(6.0), px(6.0)),
        },
        rule: ThematicRule {
            thickness: px(1.5),
            color: config.accent_color,
            margin_top: px(16.0),
            margin_bottom: px(16.0),
        },
        link: LinkRule {
            color: config.accent_color,
            underline: true,
        },
        paragraph,
    }
}

fn clamp_logged(value: u32, (min, max): (u32, u32), what: &str) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{} {} out of range, using {}", what, value, clamped);
    }
    clamped
}
