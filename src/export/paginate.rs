//! Slicing a continuous surface into fixed-size pages.

use crate::layout::{PositionedElement, RenderedSurface};
use crate::style::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PT_PER_MM, PT_PER_PX};
use serde::{Deserialize, Serialize};

/// Tolerance below which a leftover band does not open a new page.
const PAGE_EPSILON: f32 = 0.5;

/// Physical page size of the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    /// Page width in millimetres
    pub width_mm: f32,
    /// Page height in millimetres
    pub height_mm: f32,
}

impl PageFormat {
    /// ISO A4, portrait.
    pub const A4: PageFormat = PageFormat {
        width_mm: PAGE_WIDTH_MM,
        height_mm: PAGE_HEIGHT_MM,
    };

    /// Create a page format from millimetre dimensions.
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// The same format turned on its side.
    pub fn landscape(self) -> Self {
        Self {
            width_mm: self.height_mm.max(self.width_mm),
            height_mm: self.height_mm.min(self.width_mm),
        }
    }

    /// Page width in points.
    pub fn width_pt(&self) -> f32 {
        self.width_mm * PT_PER_MM
    }

    /// Page height in points.
    pub fn height_pt(&self) -> f32 {
        self.height_mm * PT_PER_MM
    }

    /// Page size in CSS pixels at 96 dpi.
    pub fn size_px(&self) -> (f32, f32) {
        (self.width_pt() / PT_PER_PX, self.height_pt() / PT_PER_PX)
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// One page-height band of the surface.
///
/// `fit` maps surface points onto page points so the surface width fills
/// the page width. Elements are kept in surface coordinates; anything
/// overlapping the band is listed, including elements that straddle the
/// top or bottom edge.
#[derive(Debug, Clone)]
pub struct PageSlice<'a> {
    /// Zero-based page index
    pub index: usize,
    /// Top edge of the band, in surface coordinates
    pub top: f32,
    /// Band height, in surface coordinates
    pub height: f32,
    /// Surface-to-page scale
    pub fit: f32,
    /// Page width in points
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
    /// Elements overlapping the band, in paint order
    pub elements: Vec<&'a PositionedElement>,
}

impl PageSlice<'_> {
    /// Map a surface x coordinate onto the page.
    pub fn page_x(&self, x: f32) -> f32 {
        x * self.fit
    }

    /// Map a surface y coordinate to a PDF y coordinate (origin bottom-left).
    pub fn pdf_y(&self, y: f32) -> f32 {
        self.page_height - (y - self.top) * self.fit
    }

    /// Check whether an element crosses the band's top or bottom edge.
    pub fn is_clipped(&self, element: &PositionedElement) -> bool {
        element.y < self.top || element.bottom() > self.top + self.height
    }
}

/// Number of pages needed for a surface.
pub fn page_count(surface: &RenderedSurface, format: &PageFormat) -> usize {
    let band = band_height(surface, format);
    if band <= 0.0 {
        return 1;
    }
    let pages = ((surface.height() - PAGE_EPSILON) / band).ceil();
    (pages.max(1.0)) as usize
}

/// Slice a surface into page bands.
///
/// Always yields at least one page, even for an empty surface.
pub fn paginate<'a>(surface: &'a RenderedSurface, format: &PageFormat) -> Vec<PageSlice<'a>> {
    let band = band_height(surface, format);
    let fit = fit_factor(surface, format);
    let count = page_count(surface, format);

    let pages: Vec<PageSlice<'a>> = (0..count)
        .map(|index| {
            let top = index as f32 * band;
            let bottom = top + band;
            let elements = surface
                .elements()
                .iter()
                .filter(|e| e.y < bottom && e.bottom() > top)
                .collect();
            PageSlice {
                index,
                top,
                height: band,
                fit,
                page_width: format.width_pt(),
                page_height: format.height_pt(),
                elements,
            }
        })
        .collect();

    log::debug!(
        "Paginated surface of {:.1}pt into {} page(s) of {:.1}pt",
        surface.height(),
        pages.len(),
        band
    );
    pages
}

fn fit_factor(surface: &RenderedSurface, format: &PageFormat) -> f32 {
    if surface.width() > 0.0 {
        format.width_pt() / surface.width()
    } else {
        1.0
    }
}

fn band_height(surface: &RenderedSurface, format: &PageFormat) -> f32 {
    format.height_pt() / fit_factor(surface, format)
}
