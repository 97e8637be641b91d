//! Print fallback: the surface as a standalone, printable HTML document.
//!
//! Every element of the surface is absolutely positioned on an A4 sheet,
//! so the host's print dialog reproduces the same layout as the PDF
//! export. All text and attribute values go through [`HtmlWriter`].

use super::paginate::PageFormat;
use crate::error::{Error, Result};
use crate::layout::{ElementKind, PositionedElement, RenderedSurface, TextElement};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Title used when the document has no level-1 heading.
pub const DEFAULT_PRINT_TITLE: &str = "Resume";

/// A standalone document ready to hand to a print dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    /// Window title
    pub title: String,
    /// Complete HTML markup
    pub html: String,
}

/// Opens a print document in a new context (window, file, spool).
pub trait PrintHost: Send + Sync {
    /// Open the document. Returns where it was opened, if that is a place
    /// on disk.
    fn open(&self, document: &PrintDocument) -> Result<Option<PathBuf>>;
}

/// Writes the print document to an HTML file.
#[derive(Debug, Clone)]
pub struct HtmlFilePrintHost {
    path: PathBuf,
}

impl HtmlFilePrintHost {
    /// Create a host that writes to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrintHost for HtmlFilePrintHost {
    fn open(&self, document: &PrintDocument) -> Result<Option<PathBuf>> {
        std::fs::write(&self.path, &document.html).map_err(|e| {
            Error::HostUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        log::debug!("Wrote print document to {}", self.path.display());
        Ok(Some(self.path.clone()))
    }
}

/// Build the print document for a surface.
pub fn build_print_document(surface: &RenderedSurface, format: &PageFormat) -> PrintDocument {
    let title = surface
        .title()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_PRINT_TITLE)
        .to_string();

    let mut w = HtmlWriter::new();
    w.raw("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    w.text(&title);
    w.raw("</title>\n<style>\n");
    w.raw(&format!(
        "@page {{ size: {}; margin: 0; }}\n",
        page_size_css(format)
    ));
    w.raw("html, body { margin: 0; padding: 0; background: #fff; }\n");
    w.raw(&format!(
        ".page {{ position: relative; width: {}mm; min-height: {}mm; \
         height: {}pt; font-family: {}; }}\n",
        fmt_num(format.width_mm),
        fmt_num(format.height_mm),
        fmt_num(surface.height()),
        surface.font_family().css_stack()
    ));
    w.raw(".t { position: absolute; margin: 0; white-space: pre; }\n");
    w.raw(".r { position: absolute; }\n");
    w.raw("@media print { body { -webkit-print-color-adjust: exact; ");
    w.raw("print-color-adjust: exact; } }\n");
    w.raw("</style>\n</head>\n<body>\n<div class=\"page\">\n");

    for element in surface.elements() {
        match &element.kind {
            ElementKind::Text(text) => write_text(&mut w, element, text),
            ElementKind::Rect { color } => {
                w.raw("<div class=\"r\" style=\"");
                w.attr_value(&format!(
                    "{}background:{}",
                    geometry_css(element),
                    color.to_hex()
                ));
                w.raw("\"></div>\n");
            }
        }
    }

    w.raw("</div>\n</body>\n</html>\n");
    PrintDocument {
        title,
        html: w.finish(),
    }
}

fn write_text(w: &mut HtmlWriter, element: &PositionedElement, text: &TextElement) {
    let mut style = geometry_css(element);
    let _ = write!(
        style,
        "font-size:{}pt;line-height:{}pt;color:{}",
        fmt_num(text.font_size),
        fmt_num(element.height),
        text.color.to_hex()
    );
    if text.face.is_bold() {
        style.push_str(";font-weight:bold");
    }
    if text.face.is_italic() {
        style.push_str(";font-style:italic");
    }
    if text.underline {
        style.push_str(";text-decoration:underline");
    }

    let href = text.link.as_deref().filter(|h| is_safe_href(h));
    match href {
        Some(href) => {
            w.raw("<a class=\"t\" href=\"");
            w.attr_value(href);
            w.raw("\" style=\"");
            w.attr_value(&style);
            w.raw("\">");
            w.text(&text.text);
            w.raw("</a>\n");
        }
        None => {
            w.raw("<span class=\"t\" style=\"");
            w.attr_value(&style);
            w.raw("\">");
            w.text(&text.text);
            w.raw("</span>\n");
        }
    }
}

fn geometry_css(element: &PositionedElement) -> String {
    format!(
        "left:{}pt;top:{}pt;width:{}pt;height:{}pt;",
        fmt_num(element.x),
        fmt_num(element.y),
        fmt_num(element.width),
        fmt_num(element.height)
    )
}

fn page_size_css(format: &PageFormat) -> String {
    if *format == PageFormat::A4 {
        "A4".to_string()
    } else if *format == PageFormat::A4.landscape() {
        "A4 landscape".to_string()
    } else {
        format!("{}mm {}mm", fmt_num(format.width_mm), fmt_num(format.height_mm))
    }
}

/// Links with a script scheme are printed as plain text.
fn is_safe_href(href: &str) -> bool {
    let scheme: String = href
        .trim_start()
        .chars()
        .take_while(|c| *c != ':' && *c != '/' && *c != '?' && *c != '#')
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !matches!(scheme.as_str(), "javascript" | "vbscript" | "data") || !href.contains(':')
}

fn fmt_num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Accumulates markup; text and attribute values are always escaped.
struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
        }
    }

    fn raw(&mut self, markup: &str) {
        self.out.push_str(markup);
    }

    fn text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                _ => self.out.push(c),
            }
        }
    }

    fn attr_value(&mut self, value: &str) {
        for c in value.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '"' => self.out.push_str("&quot;"),
                '\'' => self.out.push_str("&#39;"),
                _ => self.out.push(c),
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::render;
    use crate::parser::BlockParser;
    use crate::style::{resolve, StyleConfig};

    fn print_document(source: &str) -> PrintDocument {
        let doc = BlockParser::default().parse(source);
        let surface = render(&doc, &resolve(&StyleConfig::default()));
        build_print_document(&surface, &PageFormat::A4)
    }

    #[test]
    fn test_default_title() {
        let doc = print_document("Just a paragraph.");
        assert_eq!(doc.title, "Resume");
        assert!(doc.html.contains("<title>Resume</title>"));
    }

    #[test]
    fn test_title_from_heading() {
        let doc = print_document("# Jane <Doe>");
        assert_eq!(doc.title, "Jane <Doe>");
        assert!(doc.html.contains("<title>Jane &lt;Doe&gt;</title>"));
    }

    #[test]
    fn test_page_rule() {
        let doc = print_document("Hello");
        assert!(doc.html.contains("@page { size: A4; margin: 0; }"));
        assert!(doc.html.contains("position: absolute"));
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = print_document("<script>alert(1)</script>");
        assert!(!doc.html.contains("<script>"));
        assert!(doc.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_link_attribute_is_escaped() {
        let doc = print_document("[x](https://e.com/?a=\"b\")");
        assert!(doc.html.contains("href=\"https://e.com/?a=&quot;b&quot;\""));
    }

    #[test]
    fn test_script_links_become_text() {
        let doc = print_document("[click](javascript:alert(1))");
        assert!(!doc.html.contains("href=\"javascript"));
        assert!(doc.html.contains(">click</span>"));
    }

    #[test]
    fn test_safe_href() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("mailto:a@b.c"));
        assert!(is_safe_href("#section"));
        assert!(is_safe_href("relative/path"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href(" JavaScript:alert(1)"));
    }

    #[test]
    fn test_html_file_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("print.html");
        let host = HtmlFilePrintHost::new(&path);
        let doc = print_document("# Title");
        let opened = host.open(&doc).unwrap();
        assert_eq!(opened.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.html);
    }

    #[test]
    fn test_html_file_host_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let host = HtmlFilePrintHost::new(dir.path().join("missing").join("print.html"));
        let result = host.open(&print_document("x"));
        assert!(matches!(result, Err(Error::HostUnavailable(_))));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.345), "12.35");
    }
}
