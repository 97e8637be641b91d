//! Style configuration and resolution.

mod config;
mod resolve;

pub use config::{
    FontElement, FontFamily, FontSizes, MarginSide, Margins, StyleConfig, DEFAULT_ACCENT_COLOR,
    DEFAULT_HEADING_COLOR, FALLBACK_FONT_SIZE, FALLBACK_LINE_HEIGHT,
};
pub use resolve::{
    mm, px, resolve, BorderRule, HeadingRule, LinkRule, ListRule, PageRule, ResolvedStyle,
    TextAlign, TextRule, ThematicRule, MUTED_COLOR, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PT_PER_MM,
    PT_PER_PX, TEXT_COLOR,
};
