//! Export of a rendered surface to PDF, with a print fallback.
//!
//! # Example
//!
//! ```no_run
//! use mdpage::export::{ExportOutcome, Exporter, HtmlFilePrintHost};
//! use mdpage::{parse, render_surface, StyleConfig};
//!
//! fn main() -> mdpage::Result<()> {
//!     let doc = parse("# Jane Doe\n\nEngineer");
//!     let surface = render_surface(&doc, &StyleConfig::default());
//!
//!     let exporter = Exporter::new();
//!     let host = HtmlFilePrintHost::new("resume.html");
//!     match exporter.export_with_fallback(&surface, "resume.pdf", &host)? {
//!         ExportOutcome::Saved(report) => println!("{} pages", report.pages),
//!         ExportOutcome::PrintFallback { notice, .. } => eprintln!("{}", notice),
//!     }
//!     Ok(())
//! }
//! ```

mod paginate;
mod pdf;
mod print;

pub use paginate::{page_count, paginate, PageFormat, PageSlice};
pub use pdf::{
    assemble_pdf, resource_name, to_win_ansi, LinkArea, PageRasterizer, PdfInfo, RasterPage,
    VectorRasterizer,
};
pub use print::{
    build_print_document, HtmlFilePrintHost, PrintDocument, PrintHost, DEFAULT_PRINT_TITLE,
};

use crate::error::{Error, Result};
use crate::layout::RenderedSurface;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Notice shown when the PDF export fails and the print fallback is used.
pub const FALLBACK_NOTICE: &str =
    "PDF export failed. Try using browser print (Ctrl+P) as fallback.";

/// Default output file name.
pub const DEFAULT_FILE_NAME: &str = "document.pdf";

/// Default raster scale.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Largest accepted raster scale.
pub const MAX_SCALE: f32 = 4.0;

/// Default image quality.
pub const DEFAULT_IMAGE_QUALITY: f32 = 0.98;

/// Default canvas budget in pixels (64 megapixels).
pub const DEFAULT_CANVAS_BUDGET: u64 = 64_000_000;

/// Options for the rasterize-and-paginate export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Physical page size
    pub page: PageFormat,

    /// Raster scale factor, in (0, 4]
    pub scale: f32,

    /// Image quality, in (0, 1]
    pub image_quality: f32,

    /// Default output file name
    pub file_name: String,

    /// Maximum scaled pixel count of the surface
    pub canvas_budget: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page: PageFormat::A4,
            scale: DEFAULT_SCALE,
            image_quality: DEFAULT_IMAGE_QUALITY,
            file_name: DEFAULT_FILE_NAME.to_string(),
            canvas_budget: DEFAULT_CANVAS_BUDGET,
        }
    }
}

impl ExportOptions {
    /// Create default export options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page format.
    pub fn with_page(mut self, page: PageFormat) -> Self {
        self.page = page;
        self
    }

    /// Set the raster scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the image quality.
    pub fn with_image_quality(mut self, quality: f32) -> Self {
        self.image_quality = quality;
        self
    }

    /// Set the default output file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the canvas budget in pixels.
    pub fn with_canvas_budget(mut self, pixels: u64) -> Self {
        self.canvas_budget = pixels;
        self
    }

    /// Check the options before any work starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale <= MAX_SCALE) {
            return Err(Error::ExportFailure(format!(
                "scale {} is outside (0, {}]",
                self.scale, MAX_SCALE
            )));
        }
        if !(self.image_quality > 0.0 && self.image_quality <= 1.0) {
            return Err(Error::ExportFailure(format!(
                "image quality {} is outside (0, 1]",
                self.image_quality
            )));
        }
        if !(self.page.width_mm > 0.0 && self.page.height_mm > 0.0) {
            return Err(Error::ExportFailure("page format has no area".to_string()));
        }
        Ok(())
    }

    /// Scaled pixel count of a surface at these options.
    pub fn canvas_pixels(&self, surface: &RenderedSurface) -> u64 {
        let (page_w_px, _) = self.page.size_px();
        let fit = if surface.width() > 0.0 {
            page_w_px / surface.width()
        } else {
            0.0
        };
        let w = (surface.width() * fit * self.scale).ceil() as u64;
        let h = (surface.height() * fit * self.scale).ceil() as u64;
        w.saturating_mul(h)
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Written file
    pub path: PathBuf,
    /// Page count
    pub pages: usize,
    /// File size in bytes
    pub bytes: usize,
}

/// Result of [`Exporter::export_with_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The PDF was written
    Saved(ExportReport),
    /// The PDF export failed; the print document was handed to the host
    PrintFallback {
        /// User-visible notice
        notice: String,
        /// Why the PDF export failed
        cause: String,
        /// Where the print document was opened, if on disk
        location: Option<PathBuf>,
    },
}

/// Marks an export as in flight for as long as it lives.
///
/// Acquiring fails with [`Error::ExportInProgress`] while another guard
/// for the same exporter exists.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl ExportGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ExportInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Turns rendered surfaces into PDF files.
///
/// An exporter runs one export at a time; share it (for example behind an
/// `Arc`) to get that guarantee across threads.
pub struct Exporter {
    options: ExportOptions,
    rasterizer: Arc<dyn PageRasterizer>,
    in_flight: Arc<AtomicBool>,
}

impl Exporter {
    /// Create an exporter with default options and the vector rasterizer.
    pub fn new() -> Self {
        Self::with_options(ExportOptions::default())
    }

    /// Create an exporter with custom options.
    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            rasterizer: Arc::new(VectorRasterizer::new()),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the page rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    /// Export options.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Check whether an export is running.
    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mark an export as started. Exports on this exporter fail with
    /// [`Error::ExportInProgress`] until the guard is dropped.
    pub fn begin_export(&self) -> Result<ExportGuard> {
        ExportGuard::acquire(&self.in_flight)
    }

    /// Default output path for a file in `dir`.
    pub fn default_output(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.options.file_name)
    }

    /// Rasterize, paginate and write the PDF to `path`.
    pub fn export_pdf(
        &self,
        surface: &RenderedSurface,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let path = path.as_ref();
        let _guard = self.begin_export()?;
        let bytes = build_pdf(surface, self.rasterizer.as_ref(), &self.options)?;
        std::fs::write(path, &bytes)?;
        let report = ExportReport {
            path: path.to_path_buf(),
            pages: page_count(surface, &self.options.page),
            bytes: bytes.len(),
        };
        log::debug!(
            "Exported {} page(s) to {}",
            report.pages,
            report.path.display()
        );
        Ok(report)
    }

    /// Rasterize and paginate into memory.
    pub fn export_to_bytes(&self, surface: &RenderedSurface) -> Result<Vec<u8>> {
        let _guard = self.begin_export()?;
        build_pdf(surface, self.rasterizer.as_ref(), &self.options)
    }

    /// Export to `path`; on an export failure, hand the print document to
    /// `host` instead.
    ///
    /// Errors that the print dialog cannot remedy (I/O on the target path,
    /// an export already in flight) are returned unchanged.
    pub fn export_with_fallback(
        &self,
        surface: &RenderedSurface,
        path: impl AsRef<Path>,
        host: &dyn PrintHost,
    ) -> Result<ExportOutcome> {
        match self.export_pdf(surface, path) {
            Ok(report) => Ok(ExportOutcome::Saved(report)),
            Err(err) if err.offers_print_fallback() => {
                log::warn!("PDF export failed, falling back to print: {}", err);
                let location = self.print_fallback(surface, host)?;
                Ok(ExportOutcome::PrintFallback {
                    notice: FALLBACK_NOTICE.to_string(),
                    cause: err.to_string(),
                    location,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Hand the surface to a print host as a standalone document.
    pub fn print_fallback(
        &self,
        surface: &RenderedSurface,
        host: &dyn PrintHost,
    ) -> Result<Option<PathBuf>> {
        let document = build_print_document(surface, &self.options.page);
        host.open(&document)
    }

    /// Rasterize and paginate on the blocking pool, then write the file
    /// asynchronously.
    ///
    /// The in-flight guard is taken before the first suspension point.
    #[cfg(feature = "async")]
    pub async fn export_pdf_async(
        &self,
        surface: RenderedSurface,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let path = path.as_ref().to_path_buf();
        let _guard = self.begin_export()?;

        let rasterizer = Arc::clone(&self.rasterizer);
        let options = self.options.clone();
        let (bytes, pages) = tokio::task::spawn_blocking(move || {
            let bytes = build_pdf(&surface, rasterizer.as_ref(), &options)?;
            Ok::<_, Error>((bytes, page_count(&surface, &options.page)))
        })
        .await
        .map_err(|e| Error::ExportFailure(format!("export task failed: {}", e)))??;

        tokio::fs::write(&path, &bytes).await?;
        Ok(ExportReport {
            path,
            pages,
            bytes: bytes.len(),
        })
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("options", &self.options)
            .field("rasterizer", &self.rasterizer.name())
            .field("in_flight", &self.is_exporting())
            .finish()
    }
}

fn build_pdf(
    surface: &RenderedSurface,
    rasterizer: &dyn PageRasterizer,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    options.validate()?;

    let pixels = options.canvas_pixels(surface);
    if pixels > options.canvas_budget {
        return Err(Error::ExportFailure(format!(
            "surface needs {} pixels at scale {}, budget is {}",
            pixels, options.scale, options.canvas_budget
        )));
    }

    let slices = paginate(surface, &options.page);
    log::debug!(
        "Rasterizing {} page(s) with the {} rasterizer",
        slices.len(),
        rasterizer.name()
    );
    let pages = slices
        .iter()
        .map(|slice| rasterizer.rasterize(slice))
        .collect::<Result<Vec<_>>>()?;

    let info = PdfInfo {
        title: surface.title().map(str::to_string),
        scale: options.scale,
        image_quality: options.image_quality,
    };
    assemble_pdf(pages, &options.page, &info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::render;
    use crate::parser::BlockParser;
    use crate::style::{resolve, StyleConfig};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn surface_for(source: &str) -> RenderedSurface {
        let doc = BlockParser::default().parse(source);
        render(&doc, &resolve(&StyleConfig::default()))
    }

    struct CountingRasterizer {
        calls: Arc<AtomicUsize>,
    }

    impl PageRasterizer for CountingRasterizer {
        fn name(&self) -> &str {
            "counting"
        }

        fn rasterize(&self, page: &PageSlice<'_>) -> Result<RasterPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            VectorRasterizer.rasterize(page)
        }
    }

    struct FailingRasterizer;

    impl PageRasterizer for FailingRasterizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn rasterize(&self, _page: &PageSlice<'_>) -> Result<RasterPage> {
            Err(Error::ExportFailure("out of canvas memory".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        opened: Mutex<Vec<PrintDocument>>,
    }

    impl PrintHost for RecordingHost {
        fn open(&self, document: &PrintDocument) -> Result<Option<PathBuf>> {
            if let Ok(mut opened) = self.opened.lock() {
                opened.push(document.clone());
            }
            Ok(None)
        }
    }

    #[test]
    fn test_options_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.page, PageFormat::A4);
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.image_quality, 0.98);
        assert_eq!(options.file_name, "document.pdf");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        assert!(ExportOptions::new().with_scale(0.0).validate().is_err());
        assert!(ExportOptions::new().with_scale(4.5).validate().is_err());
        assert!(ExportOptions::new().with_scale(4.0).validate().is_ok());
        assert!(ExportOptions::new()
            .with_image_quality(1.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_export_to_bytes() {
        let exporter = Exporter::new();
        let bytes = exporter
            .export_to_bytes(&surface_for("# Title\n\nBody"))
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!exporter.is_exporting());
    }

    #[test]
    fn test_export_in_progress_skips_rasterizer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exporter = Exporter::new().with_rasterizer(CountingRasterizer {
            calls: Arc::clone(&calls),
        });
        let surface = surface_for("Hello");

        let guard = exporter.begin_export().unwrap();
        assert!(exporter.is_exporting());
        let result = exporter.export_to_bytes(&surface);
        assert!(matches!(result, Err(Error::ExportInProgress)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        drop(guard);
        assert!(!exporter.is_exporting());
        exporter.export_to_bytes(&surface).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_released_after_failure() {
        let exporter = Exporter::new().with_rasterizer(FailingRasterizer);
        let surface = surface_for("Hello");
        assert!(exporter.export_to_bytes(&surface).is_err());
        assert!(!exporter.is_exporting());
        assert!(exporter.begin_export().is_ok());
    }

    #[test]
    fn test_canvas_budget() {
        let surface = surface_for("Hello");
        let pixels = ExportOptions::default().canvas_pixels(&surface);
        assert!(pixels > 3_000_000 && pixels < 4_000_000);

        let exporter =
            Exporter::with_options(ExportOptions::new().with_canvas_budget(1_000_000));
        let result = exporter.export_to_bytes(&surface);
        assert!(matches!(result, Err(Error::ExportFailure(_))));
    }

    #[test]
    fn test_fallback_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let exporter = Exporter::new().with_rasterizer(FailingRasterizer);
        let host = RecordingHost::default();

        let outcome = exporter
            .export_with_fallback(&surface_for("# Jane"), &path, &host)
            .unwrap();
        match outcome {
            ExportOutcome::PrintFallback { notice, cause, .. } => {
                assert_eq!(notice, FALLBACK_NOTICE);
                assert!(cause.contains("out of canvas memory"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert!(!path.exists());

        let opened = host.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].title, "Jane");
    }

    #[test]
    fn test_no_fallback_when_in_progress() {
        let exporter = Exporter::new();
        let host = RecordingHost::default();
        let _guard = exporter.begin_export().unwrap();
        let result = exporter.export_with_fallback(&surface_for("x"), "unused.pdf", &host);
        assert!(matches!(result, Err(Error::ExportInProgress)));
        assert!(host.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_output() {
        let exporter = Exporter::new();
        assert_eq!(
            exporter.default_output("/tmp"),
            PathBuf::from("/tmp/document.pdf")
        );
    }
}
