//! Integration tests for PDF export and the print fallback.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use mdpage::export::{
    PageRasterizer, PageSlice, RasterPage, VectorRasterizer, DEFAULT_PRINT_TITLE,
};
use mdpage::{
    convert_file, parse, render_surface, Error, ExportOptions, ExportOutcome, Exporter,
    HtmlFilePrintHost, Mdpage, PrintDocument, PrintHost, RenderedSurface, StyleConfig,
    FALLBACK_NOTICE,
};

fn sample_surface() -> RenderedSurface {
    render_surface(&parse(mdpage::SAMPLE_MARKDOWN), &StyleConfig::default())
}

fn long_surface() -> RenderedSurface {
    let source = (0..100)
        .map(|i| format!("## Section {}\n\nSome text for section {}.", i, i))
        .collect::<Vec<_>>()
        .join("\n\n");
    render_surface(&parse(&source), &StyleConfig::default())
}

/// Blocks inside `rasterize` until released, to hold an export in flight.
struct GateRasterizer {
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
    calls: Arc<AtomicUsize>,
}

impl PageRasterizer for GateRasterizer {
    fn name(&self) -> &str {
        "gate"
    }

    fn rasterize(&self, page: &PageSlice<'_>) -> mdpage::Result<RasterPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(entered) = self.entered.lock().unwrap().take() {
            entered.send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        VectorRasterizer.rasterize(page)
    }
}

struct BrokenRasterizer;

impl PageRasterizer for BrokenRasterizer {
    fn name(&self) -> &str {
        "broken"
    }

    fn rasterize(&self, _page: &PageSlice<'_>) -> mdpage::Result<RasterPage> {
        Err(Error::ExportFailure("rasterizer crashed".to_string()))
    }
}

struct ClosedHost;

impl PrintHost for ClosedHost {
    fn open(&self, _document: &PrintDocument) -> mdpage::Result<Option<PathBuf>> {
        Err(Error::HostUnavailable("window blocked".to_string()))
    }
}

#[test]
fn test_export_writes_loadable_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.pdf");

    let report = Exporter::new()
        .export_pdf(&sample_surface(), &path)
        .unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.path, path);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), report.bytes);

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_pages_are_a4() {
    let bytes = Exporter::new().export_to_bytes(&sample_surface()).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    let page_id = doc.get_pages()[&1];
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();
    assert!((width - 595.28).abs() < 0.1);
    assert!((height - 841.89).abs() < 0.1);
}

#[test]
fn test_long_document_is_paginated() {
    let surface = long_surface();
    let dir = tempfile::tempdir().unwrap();
    let report = Exporter::new()
        .export_pdf(&surface, dir.path().join("long.pdf"))
        .unwrap();
    assert!(report.pages > 1);

    let bytes = std::fs::read(&report.path).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), report.pages);
}

#[test]
fn test_second_export_is_rejected_while_in_flight() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let calls = Arc::new(AtomicUsize::new(0));

    let exporter = Arc::new(Exporter::new().with_rasterizer(GateRasterizer {
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
        calls: Arc::clone(&calls),
    }));
    let surface = Arc::new(sample_surface());

    let first = {
        let exporter = Arc::clone(&exporter);
        let surface = Arc::clone(&surface);
        thread::spawn(move || exporter.export_to_bytes(&surface))
    };

    entered_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(exporter.is_exporting());

    let second = exporter.export_to_bytes(&surface);
    assert!(matches!(second, Err(Error::ExportInProgress)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    release_tx.send(()).unwrap();
    let bytes = first.join().unwrap().unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(!exporter.is_exporting());
}

#[test]
fn test_fallback_writes_print_document() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("resume.pdf");
    let html_path = dir.path().join("resume.html");

    let exporter = Exporter::new().with_rasterizer(BrokenRasterizer);
    let host = HtmlFilePrintHost::new(&html_path);
    let outcome = exporter
        .export_with_fallback(&sample_surface(), &pdf_path, &host)
        .unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::PrintFallback {
            notice: FALLBACK_NOTICE.to_string(),
            cause: "PDF export failed: rasterizer crashed".to_string(),
            location: Some(html_path.clone()),
        }
    );
    assert!(!pdf_path.exists());

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("<title>Your Name</title>"));
    assert!(html.contains("@page { size: A4; margin: 0; }"));
    assert!(html.contains("Key Projects"));
}

#[test]
fn test_fallback_surfaces_host_failure() {
    let exporter = Exporter::new().with_rasterizer(BrokenRasterizer);
    let dir = tempfile::tempdir().unwrap();
    let result =
        exporter.export_with_fallback(&sample_surface(), dir.path().join("x.pdf"), &ClosedHost);
    assert!(matches!(result, Err(Error::HostUnavailable(_))));
}

#[test]
fn test_successful_export_skips_host() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = Exporter::new()
        .export_with_fallback(&sample_surface(), dir.path().join("ok.pdf"), &ClosedHost)
        .unwrap();
    assert!(matches!(outcome, ExportOutcome::Saved(_)));
}

#[test]
fn test_print_fallback_without_title() {
    let surface = render_surface(&parse("No heading here."), &StyleConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("print.html");

    let location = Exporter::new()
        .print_fallback(&surface, &HtmlFilePrintHost::new(&path))
        .unwrap();
    assert_eq!(location, Some(path.clone()));

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains(&format!("<title>{}</title>", DEFAULT_PRINT_TITLE)));
}

#[test]
fn test_canvas_budget_triggers_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let host_path = dir.path().join("fallback.html");
    let exporter = Exporter::with_options(ExportOptions::new().with_canvas_budget(10_000_000));

    let outcome = exporter
        .export_with_fallback(
            &long_surface(),
            dir.path().join("long.pdf"),
            &HtmlFilePrintHost::new(&host_path),
        )
        .unwrap();
    assert!(matches!(outcome, ExportOutcome::PrintFallback { .. }));
    assert!(host_path.exists());
}

#[test]
fn test_convert_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("resume.md");
    let output = dir.path().join("resume.pdf");
    std::fs::write(&input, mdpage::SAMPLE_MARKDOWN).unwrap();

    let report = convert_file(&input, &output, &StyleConfig::default()).unwrap();
    assert_eq!(report.pages, 1);
    assert!(output.exists());
}

#[test]
fn test_builder_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");

    let result = Mdpage::new().with_scale(1.0).parse("# Jane\n\n- one\n- two");
    let report = result.to_pdf(&path).unwrap();
    assert_eq!(report.pages, result.page_count());
    assert_eq!(result.default_output(dir.path()), dir.path().join("document.pdf"));
}

#[cfg(feature = "async")]
#[test]
fn test_export_pdf_async() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("async.pdf");

    let exporter = Exporter::new();
    let report = runtime
        .block_on(exporter.export_pdf_async(sample_surface(), &path))
        .unwrap();
    assert_eq!(report.pages, 1);
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    assert!(!exporter.is_exporting());
}
