//! # mdpage
//!
//! Extended markdown to print-ready A4 pages and PDF.
//!
//! The pipeline has four stages, each a plain value transformation:
//! source text is parsed into a [`Document`], a [`StyleConfig`] is
//! resolved into a [`ResolvedStyle`], the two are laid out on a
//! [`RenderedSurface`], and the surface is exported as PDF (or handed to a
//! print host when the export fails).
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdpage::{parse, render_surface, Exporter, StyleConfig};
//!
//! fn main() -> mdpage::Result<()> {
//!     let doc = parse("# ->Jane Doe<-\n\n->**Engineer**<-\n\n## {#2563eb}Projects");
//!     let surface = render_surface(&doc, &StyleConfig::default());
//!
//!     Exporter::new().export_pdf(&surface, "resume.pdf")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Markup
//!
//! - `#`, `##`, `###` headings, `- ` list items, `---` rules
//! - `***bold italic***`, `**bold**`, `*italic*`, `[label](target)`
//! - `->centered<-` spans and `>> ` centered lines
//! - `{#0d9488}` or `{teal}` color tags, `{/}` to reset

pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;

// Re-export commonly used types
pub use error::{Error, Result};
pub use export::{
    ExportOptions, ExportOutcome, ExportReport, Exporter, HtmlFilePrintHost, PageFormat,
    PrintDocument, PrintHost, FALLBACK_NOTICE,
};
pub use layout::{ElementKind, FontFace, PositionedElement, RenderedSurface, TextElement};
pub use model::{
    Block, Color, Decorations, Document, DocumentStats, InlineRun, InlineSpan, Metadata,
    ParagraphRole,
};
pub use parser::{BlockParser, ParseOptions};
pub use render::{JsonFormat, TextOptions};
pub use style::{resolve, FontFamily, FontSizes, Margins, ResolvedStyle, StyleConfig};

use std::path::{Path, PathBuf};

/// Starter resume document.
pub const SAMPLE_MARKDOWN: &str = "# ->Your Name<-

->**Your Title / Role**<-

->Location | Phone | Email | LinkedIn<-

->*Skills | Technologies | Areas of Expertise*<-

---

## Professional Experience

### Job Title / Role
**Company Name** | Location | Start Date - End Date

- Describe your key responsibilities and achievements
- Use bullet points for easy reading
- {#0d9488}Highlight metrics and impact where possible

---

## {#2563eb}Key Projects

### ->Project Name<- *(Company, Year)*
Brief description of the project, technologies used, and impact delivered.

---

## Education & Certifications

### ->{#9333ea}Degree Name<-
*Institution Name* - Graduation Year

### Certifications
- Certification Name (Issuing Organization, Year)
";

/// Parse extended markdown with every extension enabled.
///
/// Parsing never fails; malformed markup stays literal text.
///
/// # Example
///
/// ```
/// let doc = mdpage::parse("# Title\n\nHello **world**");
/// assert_eq!(doc.metadata.title.as_deref(), Some("Title"));
/// assert_eq!(doc.block_count(), 2);
/// ```
pub fn parse(source: &str) -> Document {
    BlockParser::default().parse(source)
}

/// Parse extended markdown with custom options.
pub fn parse_with_options(source: &str, options: ParseOptions) -> Document {
    BlockParser::new(options).parse(source)
}

/// Read and parse a markdown file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse(&source))
}

/// Resolve a style configuration and lay a document out on a surface.
pub fn render_surface(document: &Document, config: &StyleConfig) -> RenderedSurface {
    layout::render(document, &resolve(config))
}

/// Convert a markdown file to a PDF file with the given style.
///
/// # Example
///
/// ```no_run
/// use mdpage::{convert_file, StyleConfig};
///
/// let report = convert_file("resume.md", "resume.pdf", &StyleConfig::default())?;
/// println!("{} page(s)", report.pages);
/// # Ok::<(), mdpage::Error>(())
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &StyleConfig,
) -> Result<ExportReport> {
    let document = parse_file(input)?;
    let surface = render_surface(&document, config);
    Exporter::new().export_pdf(&surface, output)
}

/// Builder for the full pipeline.
///
/// # Example
///
/// ```no_run
/// use mdpage::{Mdpage, StyleConfig};
///
/// let mut style = StyleConfig::default();
/// style.center_h2 = true;
///
/// Mdpage::new()
///     .with_style(style)
///     .with_scale(3.0)
///     .parse(mdpage::SAMPLE_MARKDOWN)
///     .to_pdf("resume.pdf")?;
/// # Ok::<(), mdpage::Error>(())
/// ```
pub struct Mdpage {
    parse_options: ParseOptions,
    style: StyleConfig,
    export_options: ExportOptions,
}

impl Mdpage {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            style: StyleConfig::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Parse plain markdown only (no centering, colors or roles).
    pub fn plain(mut self) -> Self {
        self.parse_options = ParseOptions::plain();
        self
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set the style configuration.
    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Set export options.
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    /// Set the page format.
    pub fn with_page_format(mut self, page: PageFormat) -> Self {
        self.export_options = self.export_options.with_page(page);
        self
    }

    /// Set the raster scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.export_options = self.export_options.with_scale(scale);
        self
    }

    /// Parse and lay out a source text.
    pub fn parse(self, source: &str) -> MdpageResult {
        let document = BlockParser::new(self.parse_options).parse(source);
        let stats = DocumentStats::collect(source, &document);
        let surface = render_surface(&document, &self.style);
        MdpageResult {
            document,
            surface,
            stats,
            exporter: Exporter::with_options(self.export_options),
        }
    }

    /// Read, parse and lay out a markdown file.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<MdpageResult> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.parse(&source))
    }
}

impl Default for Mdpage {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed and laid-out document.
#[derive(Debug)]
pub struct MdpageResult {
    /// The parsed document
    pub document: Document,
    /// The laid-out surface
    pub surface: RenderedSurface,
    /// Source and structure counts
    pub stats: DocumentStats,
    exporter: Exporter,
}

impl MdpageResult {
    /// Write the PDF to `path`.
    pub fn to_pdf<P: AsRef<Path>>(&self, path: P) -> Result<ExportReport> {
        self.exporter.export_pdf(&self.surface, path)
    }

    /// Produce the PDF in memory.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        self.exporter.export_to_bytes(&self.surface)
    }

    /// Write the PDF, falling back to the print host on export failure.
    pub fn to_pdf_or_print<P: AsRef<Path>>(
        &self,
        path: P,
        host: &dyn PrintHost,
    ) -> Result<ExportOutcome> {
        self.exporter
            .export_with_fallback(&self.surface, path, host)
    }

    /// Standalone print document for the surface.
    pub fn print_document(&self) -> PrintDocument {
        export::build_print_document(&self.surface, &self.exporter.options().page)
    }

    /// Number of pages the PDF will have.
    pub fn page_count(&self) -> usize {
        export::page_count(&self.surface, &self.exporter.options().page)
    }

    /// Default output path next to `dir`.
    pub fn default_output<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        self.exporter.default_output(dir)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &TextOptions::default())
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
