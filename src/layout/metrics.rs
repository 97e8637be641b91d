//! Text measurement with the standard Type1 font metrics.
//!
//! Widths are the advance widths of the base-14 PDF fonts in 1/1000 em.
//! Oblique and italic faces are measured with their upright counterparts.

use crate::style::FontFamily;
use serde::Serialize;

/// One of the standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FontFace {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Helvetica-Oblique
    HelveticaOblique,
    /// Helvetica-BoldOblique
    HelveticaBoldOblique,
    /// Times-Roman
    TimesRoman,
    /// Times-Bold
    TimesBold,
    /// Times-Italic
    TimesItalic,
    /// Times-BoldItalic
    TimesBoldItalic,
    /// Courier
    Courier,
    /// Courier-Bold
    CourierBold,
    /// Courier-Oblique
    CourierOblique,
    /// Courier-BoldOblique
    CourierBoldOblique,
}

impl FontFace {
    /// All faces, in resource order.
    pub const ALL: [FontFace; 12] = [
        FontFace::Helvetica,
        FontFace::HelveticaBold,
        FontFace::HelveticaOblique,
        FontFace::HelveticaBoldOblique,
        FontFace::TimesRoman,
        FontFace::TimesBold,
        FontFace::TimesItalic,
        FontFace::TimesBoldItalic,
        FontFace::Courier,
        FontFace::CourierBold,
        FontFace::CourierOblique,
        FontFace::CourierBoldOblique,
    ];

    /// Pick the face for a family and weight/style.
    pub fn select(family: FontFamily, bold: bool, italic: bool) -> Self {
        use FontFace::*;
        match (family, bold, italic) {
            (FontFamily::SansSerif, false, false) => Helvetica,
            (FontFamily::SansSerif, true, false) => HelveticaBold,
            (FontFamily::SansSerif, false, true) => HelveticaOblique,
            (FontFamily::SansSerif, true, true) => HelveticaBoldOblique,
            (FontFamily::Serif, false, false) => TimesRoman,
            (FontFamily::Serif, true, false) => TimesBold,
            (FontFamily::Serif, false, true) => TimesItalic,
            (FontFamily::Serif, true, true) => TimesBoldItalic,
            (FontFamily::Mono, false, false) => Courier,
            (FontFamily::Mono, true, false) => CourierBold,
            (FontFamily::Mono, false, true) => CourierOblique,
            (FontFamily::Mono, true, true) => CourierBoldOblique,
        }
    }

    /// PostScript name used as `BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
            FontFace::HelveticaOblique => "Helvetica-Oblique",
            FontFace::HelveticaBoldOblique => "Helvetica-BoldOblique",
            FontFace::TimesRoman => "Times-Roman",
            FontFace::TimesBold => "Times-Bold",
            FontFace::TimesItalic => "Times-Italic",
            FontFace::TimesBoldItalic => "Times-BoldItalic",
            FontFace::Courier => "Courier",
            FontFace::CourierBold => "Courier-Bold",
            FontFace::CourierOblique => "Courier-Oblique",
            FontFace::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Family of this face.
    pub fn family(&self) -> FontFamily {
        match self {
            FontFace::Helvetica
            | FontFace::HelveticaBold
            | FontFace::HelveticaOblique
            | FontFace::HelveticaBoldOblique => FontFamily::SansSerif,
            FontFace::TimesRoman
            | FontFace::TimesBold
            | FontFace::TimesItalic
            | FontFace::TimesBoldItalic => FontFamily::Serif,
            _ => FontFamily::Mono,
        }
    }

    /// Check if this is a bold face.
    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            FontFace::HelveticaBold
                | FontFace::HelveticaBoldOblique
                | FontFace::TimesBold
                | FontFace::TimesBoldItalic
                | FontFace::CourierBold
                | FontFace::CourierBoldOblique
        )
    }

    /// Check if this is an italic or oblique face.
    pub fn is_italic(&self) -> bool {
        matches!(
            self,
            FontFace::HelveticaOblique
                | FontFace::HelveticaBoldOblique
                | FontFace::TimesItalic
                | FontFace::TimesBoldItalic
                | FontFace::CourierOblique
                | FontFace::CourierBoldOblique
        )
    }

    /// Advance width of a character in 1/1000 em.
    pub fn char_width(&self, ch: char) -> u16 {
        let table = match self {
            FontFace::Courier
            | FontFace::CourierBold
            | FontFace::CourierOblique
            | FontFace::CourierBoldOblique => return 600,
            FontFace::Helvetica | FontFace::HelveticaOblique => &HELVETICA,
            FontFace::HelveticaBold | FontFace::HelveticaBoldOblique => &HELVETICA_BOLD,
            FontFace::TimesRoman | FontFace::TimesItalic => &TIMES_ROMAN,
            FontFace::TimesBold | FontFace::TimesBoldItalic => &TIMES_BOLD,
        };

        let code = ch as u32;
        if (32..=126).contains(&code) {
            return table[(code - 32) as usize];
        }

        let serif = self.family() == FontFamily::Serif;
        match ch {
            '\u{2022}' => 350,
            '\u{2013}' => {
                if serif {
                    500
                } else {
                    556
                }
            }
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => {
                if serif {
                    333
                } else {
                    222
                }
            }
            '\u{201C}' | '\u{201D}' => {
                if serif {
                    444
                } else {
                    333
                }
            }
            '\u{00A0}' => table[0],
            _ => {
                if serif {
                    500
                } else {
                    556
                }
            }
        }
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Helvetica, code points 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold, code points 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Times-Roman, code points 32..=126.
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Times-Bold, code points 32..=126.
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
