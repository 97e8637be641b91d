//! Rasterize-and-paginate backend: page slices to a PDF container.
//!
//! Each page slice is drawn into its own content stream with the standard
//! Type1 fonts. Text stays text, so the output is searchable and links stay
//! clickable; the page geometry is the same as the sliced surface.

use super::paginate::{PageFormat, PageSlice};
use crate::error::{Error, Result};
use crate::layout::{ElementKind, FontFace, PositionedElement, TextElement};
use crate::model::Color;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeSet;
use std::io::Write;

/// Underline offset below the baseline, relative to the font size.
const UNDERLINE_OFFSET: f32 = 0.12;
/// Underline thickness, relative to the font size.
const UNDERLINE_THICKNESS: f32 = 0.06;

/// Draws one page slice.
///
/// Implementations must be deterministic for a given slice; the exporter
/// calls them once per page, in order.
pub trait PageRasterizer: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Draw a page slice.
    fn rasterize(&self, page: &PageSlice<'_>) -> Result<RasterPage>;
}

/// The drawn form of one page.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// Page content operators
    pub content: Content,
    /// Clickable areas
    pub links: Vec<LinkArea>,
    /// Fonts referenced by the content
    pub fonts: BTreeSet<FontFace>,
}

impl RasterPage {
    /// An empty page.
    pub fn blank() -> Self {
        Self {
            content: Content { operations: vec![] },
            links: Vec::new(),
            fonts: BTreeSet::new(),
        }
    }
}

/// A hyperlink area in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkArea {
    /// `[x1, y1, x2, y2]` in PDF points, origin bottom-left
    pub rect: [f32; 4],
    /// Link target
    pub uri: String,
}

/// Document information written to the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct PdfInfo {
    /// Document title
    pub title: Option<String>,
    /// Raster scale the export was requested at
    pub scale: f32,
    /// Image quality the export was requested at
    pub image_quality: f32,
}

/// Draws surface elements as PDF text and path operators.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorRasterizer;

impl VectorRasterizer {
    /// Create a new vector rasterizer.
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for VectorRasterizer {
    fn name(&self) -> &str {
        "vector"
    }

    fn rasterize(&self, page: &PageSlice<'_>) -> Result<RasterPage> {
        let mut ctx = PageContext::new(page);
        let clipped = page.elements.iter().any(|e| page.is_clipped(e));
        if clipped {
            ctx.begin_clip();
        }
        for element in &page.elements {
            ctx.draw_element(element)?;
        }
        if clipped {
            ctx.end_clip();
        }
        Ok(ctx.finish())
    }
}

#[derive(Default)]
struct PageState {
    font: Option<(FontFace, f32)>,
    fill: Option<Color>,
}

struct PageContext<'p, 'a> {
    page: &'p PageSlice<'a>,
    out: RasterPage,
    state: PageState,
}

impl<'p, 'a> PageContext<'p, 'a> {
    fn new(page: &'p PageSlice<'a>) -> Self {
        Self {
            page,
            out: RasterPage::blank(),
            state: PageState::default(),
        }
    }

    fn finish(self) -> RasterPage {
        self.out
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.out
            .content
            .operations
            .push(Operation::new(operator, operands));
    }

    fn begin_clip(&mut self) {
        let (w, h) = (self.page.page_width, self.page.page_height);
        self.push("q", vec![]);
        self.push("re", vec![0.0.into(), 0.0.into(), w.into(), h.into()]);
        self.push("W", vec![]);
        self.push("n", vec![]);
    }

    fn end_clip(&mut self) {
        self.push("Q", vec![]);
    }

    fn draw_element(&mut self, element: &PositionedElement) -> Result<()> {
        match &element.kind {
            ElementKind::Rect { color } => {
                let page = self.page;
                let x = page.page_x(element.x);
                let y = page.pdf_y(element.bottom());
                self.fill_rect(
                    x,
                    y,
                    element.width * page.fit,
                    element.height * page.fit,
                    *color,
                );
            }
            ElementKind::Text(text) => self.draw_text(element, text)?,
        }
        Ok(())
    }

    fn set_font(&mut self, face: FontFace, size: f32) {
        if self.state.font != Some((face, size)) {
            self.push(
                "Tf",
                vec![Object::Name(resource_name(face).into_bytes()), size.into()],
            );
            self.state.font = Some((face, size));
        }
        self.out.fonts.insert(face);
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill != Some(color) {
            let [r, g, b] = color.to_unit_rgb();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill = Some(color);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.set_fill_color(color);
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("f", vec![]);
    }

    fn draw_text(&mut self, element: &PositionedElement, text: &TextElement) -> Result<()> {
        if text.text.trim().is_empty() {
            return Ok(());
        }
        if !text.font_size.is_finite() || text.font_size <= 0.0 {
            return Err(Error::ExportFailure(format!(
                "invalid font size {} for text {:?}",
                text.font_size, text.text
            )));
        }

        let fit = self.page.fit;
        let size = text.font_size * fit;
        let x = self.page.page_x(element.x);
        let baseline = self.page.pdf_y(element.y + text.baseline);

        self.push("BT", vec![]);
        self.set_font(text.face, size);
        self.set_fill_color(text.color);
        self.push("Td", vec![x.into(), baseline.into()]);
        self.push(
            "Tj",
            vec![Object::String(to_win_ansi(&text.text), StringFormat::Literal)],
        );
        self.push("ET", vec![]);

        if text.underline {
            let thickness = (size * UNDERLINE_THICKNESS).max(0.5);
            self.fill_rect(
                x,
                baseline - size * UNDERLINE_OFFSET - thickness,
                element.width * fit,
                thickness,
                text.color,
            );
        }

        if let Some(uri) = &text.link {
            self.out.links.push(LinkArea {
                rect: [
                    x,
                    self.page.pdf_y(element.bottom()),
                    self.page.page_x(element.right()),
                    self.page.pdf_y(element.y),
                ],
                uri: uri.clone(),
            });
        }
        Ok(())
    }
}

/// Resource name of a font face, e.g. `F1` for Helvetica.
pub fn resource_name(face: FontFace) -> String {
    let index = FontFace::ALL
        .iter()
        .position(|f| *f == face)
        .unwrap_or_default();
    format!("F{}", index + 1)
}

/// Assemble drawn pages into a PDF file.
pub fn assemble_pdf(
    pages: Vec<RasterPage>,
    format: &PageFormat,
    info: &PdfInfo,
) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(Error::ExportFailure("no pages were produced".to_string()));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let used: BTreeSet<FontFace> = pages
        .iter()
        .flat_map(|p| p.fonts.iter().copied())
        .collect();
    let mut fonts = Dictionary::new();
    for face in &used {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(resource_name(*face).into_bytes(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let (width, height) = (format.width_pt(), format.height_pt());
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(compressed_stream(&page.content.encode()?)?);
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.0.into(), 0.0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !page.links.is_empty() {
            let annots: Vec<Object> = page
                .links
                .iter()
                .map(|link| Object::Reference(add_link_annotation(&mut doc, link)))
                .collect();
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(info_dictionary(info));
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    log::debug!("Assembled PDF with {} page(s), {} bytes", count, buffer.len());
    Ok(buffer)
}

fn add_link_annotation(doc: &mut Document, link: &LinkArea) -> ObjectId {
    let [x1, y1, x2, y2] = link.rect;
    let action = dictionary! {
        "Type" => "Action",
        "S" => "URI",
        "URI" => Object::String(link.uri.as_bytes().to_vec(), StringFormat::Literal),
    };
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![x1.into(), y1.into(), x2.into(), y2.into()],
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => action,
    })
}

fn info_dictionary(info: &PdfInfo) -> Dictionary {
    let mut dict = dictionary! {
        "Producer" => Object::string_literal(format!("mdpage {}", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(
            chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
        ),
        "RasterScale" => info.scale,
        "ImageQuality" => info.image_quality,
    };
    if let Some(title) = &info.title {
        dict.set(
            "Title",
            Object::String(to_win_ansi(title), StringFormat::Literal),
        );
    }
    dict
}

fn compressed_stream(bytes: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?;
    Ok(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        compressed,
    ))
}

/// Encode text for a WinAnsiEncoding font. Characters outside the code
/// page become `?`.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
