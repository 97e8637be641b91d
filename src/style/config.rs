//! Style configuration: the user-adjustable presentation parameters.
//!
//! A [`StyleConfig`] is a plain value. Every render takes its own snapshot,
//! so changing a config never affects a render already in progress.
//!
//! Invalid values never fail. Each field falls back to its documented
//! default and the fallback is logged at `warn` level:
//!
//! | Field | Fallback |
//! |---|---|
//! | margin | `0` |
//! | font size | `11` (also for `0`) |
//! | line height | `1.5` |
//! | font family | `sans-serif` |
//! | colors, center flags | the field default |

use crate::error::{Error, Result};
use crate::model::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Default heading color.
pub const DEFAULT_HEADING_COLOR: Color = Color::rgb(0x1a, 0x1a, 0x1a);

/// Default accent color.
pub const DEFAULT_ACCENT_COLOR: Color = Color::rgb(0x0d, 0x94, 0x88);

/// Fallback for unparsable or zero font sizes.
pub const FALLBACK_FONT_SIZE: u32 = 11;

/// Fallback for unparsable line heights.
pub const FALLBACK_LINE_HEIGHT: f32 = 1.5;

/// Presentation parameters for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawStyleConfig")]
pub struct StyleConfig {
    /// Center level-1 headings
    pub center_h1: bool,
    /// Center level-2 headings
    pub center_h2: bool,
    /// Center level-3 headings
    pub center_h3: bool,
    /// Center the paragraph right below the title
    pub center_first_paragraph: bool,
    /// Page insets in millimetres
    pub margins: Margins,
    /// Font sizes in points
    #[serde(rename = "fontSize")]
    pub font_sizes: FontSizes,
    /// Font family
    pub font_family: FontFamily,
    /// Color of level-1 and level-2 headings
    pub heading_color: Color,
    /// Accent color (level-3 headings, rules, links, subtitle)
    pub accent_color: Color,
    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            center_h1: true,
            center_h2: false,
            center_h3: false,
            center_first_paragraph: true,
            margins: Margins::default(),
            font_sizes: FontSizes::default(),
            font_family: FontFamily::default(),
            heading_color: DEFAULT_HEADING_COLOR,
            accent_color: DEFAULT_ACCENT_COLOR,
            line_height: FALLBACK_LINE_HEIGHT,
        }
    }
}

impl StyleConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read a config from JSON text.
    ///
    /// Only text that is not a JSON object at all is an error; missing or
    /// invalid fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::InvalidStyleConfig(
                "expected a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Read a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading style config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
    }

    /// Write the config to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Set one margin from user input. Unparsable input becomes `0`.
    pub fn set_margin_str(&mut self, side: MarginSide, value: &str) {
        let mm = parse_int_prefix(value)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or_else(|| {
                log::warn!("Invalid margin {:?}, using 0", value);
                0
            });
        self.margins.set(side, mm);
    }

    /// Set one font size from user input. Unparsable input and `0` become `11`.
    pub fn set_font_size_str(&mut self, element: FontElement, value: &str) {
        let size = font_size_or_fallback(parse_int_prefix(value), value);
        self.font_sizes.set(element, size);
    }

    /// Set the line height from user input. Unparsable input becomes `1.5`.
    pub fn set_line_height_str(&mut self, value: &str) {
        self.line_height = line_height_or_fallback(parse_float_prefix(value), value);
    }

    /// Set the font family by name. Unknown names become `sans-serif`.
    pub fn set_font_family_str(&mut self, value: &str) {
        self.font_family = value.parse().unwrap_or_else(|_| {
            log::warn!("Unknown font family {:?}, using sans-serif", value);
            FontFamily::default()
        });
    }

    /// Set the heading color. Unparsable input restores the default.
    pub fn set_heading_color_str(&mut self, value: &str) {
        self.heading_color = color_or_default(value, DEFAULT_HEADING_COLOR);
    }

    /// Set the accent color. Unparsable input restores the default.
    pub fn set_accent_color_str(&mut self, value: &str) {
        self.accent_color = color_or_default(value, DEFAULT_ACCENT_COLOR);
    }
}

/// Page insets in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    /// Top inset
    pub top: u32,
    /// Right inset
    pub right: u32,
    /// Bottom inset
    pub bottom: u32,
    /// Left inset
    pub left: u32,
}

impl Margins {
    /// Same inset on all four sides.
    pub const fn uniform(mm: u32) -> Self {
        Self {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }

    /// Get one side.
    pub fn get(&self, side: MarginSide) -> u32 {
        match side {
            MarginSide::Top => self.top,
            MarginSide::Right => self.right,
            MarginSide::Bottom => self.bottom,
            MarginSide::Left => self.left,
        }
    }

    /// Set one side.
    pub fn set(&mut self, side: MarginSide, mm: u32) {
        match side {
            MarginSide::Top => self.top = mm,
            MarginSide::Right => self.right = mm,
            MarginSide::Bottom => self.bottom = mm,
            MarginSide::Left => self.left = mm,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(20)
    }
}

/// One side of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginSide {
    /// Top edge
    Top,
    /// Right edge
    Right,
    /// Bottom edge
    Bottom,
    /// Left edge
    Left,
}

impl MarginSide {
    /// All sides, in CSS order.
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Top,
        MarginSide::Right,
        MarginSide::Bottom,
        MarginSide::Left,
    ];

    fn key(&self) -> &'static str {
        match self {
            MarginSide::Top => "top",
            MarginSide::Right => "right",
            MarginSide::Bottom => "bottom",
            MarginSide::Left => "left",
        }
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizes {
    /// Body text
    pub body: u32,
    /// Level-1 headings
    pub h1: u32,
    /// Level-2 headings
    pub h2: u32,
    /// Level-3 headings
    pub h3: u32,
}

impl FontSizes {
    /// Get one size.
    pub fn get(&self, element: FontElement) -> u32 {
        match element {
            FontElement::Body => self.body,
            FontElement::H1 => self.h1,
            FontElement::H2 => self.h2,
            FontElement::H3 => self.h3,
        }
    }

    /// Set one size.
    pub fn set(&mut self, element: FontElement, size: u32) {
        match element {
            FontElement::Body => self.body = size,
            FontElement::H1 => self.h1 = size,
            FontElement::H2 => self.h2 = size,
            FontElement::H3 => self.h3 = size,
        }
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            body: 11,
            h1: 24,
            h2: 14,
            h3: 12,
        }
    }
}

/// Element with its own font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontElement {
    /// Body text
    Body,
    /// Level-1 heading
    H1,
    /// Level-2 heading
    H2,
    /// Level-3 heading
    H3,
}

impl FontElement {
    /// All elements.
    pub const ALL: [FontElement; 4] = [
        FontElement::Body,
        FontElement::H1,
        FontElement::H2,
        FontElement::H3,
    ];

    fn key(&self) -> &'static str {
        match self {
            FontElement::Body => "body",
            FontElement::H1 => "h1",
            FontElement::H2 => "h2",
            FontElement::H3 => "h3",
        }
    }
}

/// Supported font families, each mapped to a standard PDF font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    /// Helvetica
    #[default]
    #[serde(rename = "sans-serif")]
    SansSerif,
    /// Times
    #[serde(rename = "serif")]
    Serif,
    /// Courier
    #[serde(rename = "mono")]
    Mono,
}

impl FontFamily {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Mono => "mono",
        }
    }

    /// CSS font stack used by the print document.
    pub fn css_stack(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "'Helvetica Neue', Helvetica, Arial, sans-serif",
            FontFamily::Serif => "'Times New Roman', Georgia, serif",
            FontFamily::Mono => "'Courier New', monospace",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FontFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans-serif" | "sans" | "helvetica" => Ok(FontFamily::SansSerif),
            "serif" | "times" => Ok(FontFamily::Serif),
            "mono" | "monospace" | "courier" => Ok(FontFamily::Mono),
            _ => Err(Error::InvalidStyleConfig(format!(
                "unknown font family: {}",
                s
            ))),
        }
    }
}

/// Wire shape of [`StyleConfig`]: every field optional and untyped, so
/// one bad field cannot reject the whole file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawStyleConfig {
    center_h1: Option<Value>,
    center_h2: Option<Value>,
    center_h3: Option<Value>,
    center_first_paragraph: Option<Value>,
    margins: Option<Value>,
    font_size: Option<Value>,
    font_family: Option<Value>,
    heading_color: Option<Value>,
    accent_color: Option<Value>,
    line_height: Option<Value>,
}

impl From<RawStyleConfig> for StyleConfig {
    fn from(raw: RawStyleConfig) -> Self {
        let defaults = StyleConfig::default();
        let mut config = defaults.clone();

        config.center_h1 = flag(raw.center_h1, "centerH1", defaults.center_h1);
        config.center_h2 = flag(raw.center_h2, "centerH2", defaults.center_h2);
        config.center_h3 = flag(raw.center_h3, "centerH3", defaults.center_h3);
        config.center_first_paragraph = flag(
            raw.center_first_paragraph,
            "centerFirstParagraph",
            defaults.center_first_paragraph,
        );

        if let Some(margins) = raw.margins {
            for side in MarginSide::ALL {
                if let Some(value) = margins.get(side.key()) {
                    let mm = int_value(value)
                        .and_then(|v| u32::try_from(v).ok())
                        .unwrap_or_else(|| {
                            log::warn!("Invalid margins.{}: {}, using 0", side.key(), value);
                            0
                        });
                    config.margins.set(side, mm);
                }
            }
        }

        if let Some(sizes) = raw.font_size {
            for element in FontElement::ALL {
                if let Some(value) = sizes.get(element.key()) {
                    let size = font_size_or_fallback(int_value(value), &value.to_string());
                    config.font_sizes.set(element, size);
                }
            }
        }

        if let Some(value) = raw.font_family {
            config.set_font_family_str(value.as_str().unwrap_or_default());
        }
        if let Some(value) = raw.heading_color {
            config.heading_color =
                color_or_default(value.as_str().unwrap_or_default(), DEFAULT_HEADING_COLOR);
        }
        if let Some(value) = raw.accent_color {
            config.accent_color =
                color_or_default(value.as_str().unwrap_or_default(), DEFAULT_ACCENT_COLOR);
        }
        if let Some(value) = raw.line_height {
            config.line_height =
                line_height_or_fallback(float_value(&value), &value.to_string());
        }

        config
    }
}

fn flag(value: Option<Value>, name: &str, default: bool) -> bool {
    match value {
        None => default,
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) if s == "true" => true,
        Some(Value::String(s)) if s == "false" => false,
        Some(other) => {
            log::warn!("Invalid {}: {}, using {}", name, other, default);
            default
        }
    }
}

fn font_size_or_fallback(parsed: Option<i64>, raw: &str) -> u32 {
    match parsed.and_then(|v| u32::try_from(v).ok()) {
        Some(size) if size > 0 => size,
        _ => {
            log::warn!("Invalid font size {}, using {}", raw, FALLBACK_FONT_SIZE);
            FALLBACK_FONT_SIZE
        }
    }
}

fn line_height_or_fallback(parsed: Option<f64>, raw: &str) -> f32 {
    match parsed {
        Some(v) if v.is_finite() && v != 0.0 => v as f32,
        _ => {
            log::warn!("Invalid line height {}, using {}", raw, FALLBACK_LINE_HEIGHT);
            FALLBACK_LINE_HEIGHT
        }
    }
}

fn color_or_default(value: &str, default: Color) -> Color {
    Color::parse(value).unwrap_or_else(|| {
        log::warn!("Invalid color {:?}, using {}", value, default);
        default
    })
}

fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn float_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
}

/// Parse the leading integer of a string: `"12mm"` is 12, `"abc"` is none.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Parse the leading decimal number of a string: `"1.6x"` is 1.6.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let ok = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (c == '.' && !seen_dot);
        if !ok {
            break;
        }
        seen_dot |= c == '.';
        end = i + c.len_utf8();
    }
    s[..end].parse().ok()
}
