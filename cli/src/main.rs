//! mdpage CLI - extended markdown to A4 PDF pages

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdpage::export::{page_count, ExportOutcome, PrintHost};
use mdpage::style::{FontElement, MarginSide};
use mdpage::{
    DocumentStats, ExportOptions, ExportReport, Exporter, HtmlFilePrintHost, JsonFormat,
    ParseOptions, StyleConfig, TextOptions,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "mdpage")]
#[command(version)]
#[command(about = "Turn extended markdown into print-ready A4 pages and PDF", long_about = None)]
struct Cli {
    /// Input markdown file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Style settings; individual flags override the `--style` file.
///
/// Values are taken as text and parsed leniently, like the settings form:
/// an unreadable number falls back to its default.
#[derive(Args, Clone, Default)]
struct StyleArgs {
    /// Style configuration JSON file
    #[arg(long, value_name = "JSON", global = true, env = "MDPAGE_STYLE")]
    style: Option<PathBuf>,

    /// All four margins in millimetres (0-50)
    #[arg(long, value_name = "MM", global = true)]
    margin: Option<String>,

    /// Top margin in millimetres
    #[arg(long, value_name = "MM", global = true)]
    margin_top: Option<String>,

    /// Right margin in millimetres
    #[arg(long, value_name = "MM", global = true)]
    margin_right: Option<String>,

    /// Bottom margin in millimetres
    #[arg(long, value_name = "MM", global = true)]
    margin_bottom: Option<String>,

    /// Left margin in millimetres
    #[arg(long, value_name = "MM", global = true)]
    margin_left: Option<String>,

    /// Body font size in points (8-48)
    #[arg(long, value_name = "PT", global = true)]
    body_size: Option<String>,

    /// Level-1 heading size in points
    #[arg(long, value_name = "PT", global = true)]
    h1_size: Option<String>,

    /// Level-2 heading size in points
    #[arg(long, value_name = "PT", global = true)]
    h2_size: Option<String>,

    /// Level-3 heading size in points
    #[arg(long, value_name = "PT", global = true)]
    h3_size: Option<String>,

    /// Line height multiple (1-3)
    #[arg(long, value_name = "RATIO", global = true)]
    line_height: Option<String>,

    /// Font family: sans-serif, serif or mono
    #[arg(long, value_name = "FAMILY", global = true)]
    font: Option<String>,

    /// Heading color (hex or name)
    #[arg(long, value_name = "COLOR", global = true)]
    heading_color: Option<String>,

    /// Accent color (hex or name)
    #[arg(long, value_name = "COLOR", global = true)]
    accent_color: Option<String>,

    /// Center level-1 headings
    #[arg(long, value_name = "BOOL", global = true)]
    center_h1: Option<bool>,

    /// Center level-2 headings
    #[arg(long, value_name = "BOOL", global = true)]
    center_h2: Option<bool>,

    /// Center level-3 headings
    #[arg(long, value_name = "BOOL", global = true)]
    center_h3: Option<bool>,

    /// Center the paragraph below the title
    #[arg(long, value_name = "BOOL", global = true)]
    center_first_paragraph: Option<bool>,

    /// Plain markdown only (no centering, colors or roles)
    #[arg(long, global = true)]
    plain: bool,
}

impl StyleArgs {
    fn build(&self) -> mdpage::Result<StyleConfig> {
        let mut config = match &self.style {
            Some(path) => StyleConfig::load_json(path)?,
            None => StyleConfig::default(),
        };

        if let Some(value) = &self.margin {
            for side in MarginSide::ALL {
                config.set_margin_str(side, value);
            }
        }
        let margins = [
            (MarginSide::Top, &self.margin_top),
            (MarginSide::Right, &self.margin_right),
            (MarginSide::Bottom, &self.margin_bottom),
            (MarginSide::Left, &self.margin_left),
        ];
        for (side, value) in margins {
            if let Some(value) = value {
                config.set_margin_str(side, value);
            }
        }

        let sizes = [
            (FontElement::Body, &self.body_size),
            (FontElement::H1, &self.h1_size),
            (FontElement::H2, &self.h2_size),
            (FontElement::H3, &self.h3_size),
        ];
        for (element, value) in sizes {
            if let Some(value) = value {
                config.set_font_size_str(element, value);
            }
        }

        if let Some(value) = &self.line_height {
            config.set_line_height_str(value);
        }
        if let Some(value) = &self.font {
            config.set_font_family_str(value);
        }
        if let Some(value) = &self.heading_color {
            config.set_heading_color_str(value);
        }
        if let Some(value) = &self.accent_color {
            config.set_accent_color_str(value);
        }
        if let Some(value) = self.center_h1 {
            config.center_h1 = value;
        }
        if let Some(value) = self.center_h2 {
            config.center_h2 = value;
        }
        if let Some(value) = self.center_h3 {
            config.center_h3 = value;
        }
        if let Some(value) = self.center_first_paragraph {
            config.center_first_paragraph = value;
        }

        Ok(config)
    }

    fn parse_options(&self) -> ParseOptions {
        if self.plain {
            ParseOptions::plain()
        } else {
            ParseOptions::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown to PDF
    Pdf {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (input name with .pdf if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Raster scale (0-4]
        #[arg(long, default_value = "2.0")]
        scale: f32,

        /// Write the print document instead if the export fails
        #[arg(long)]
        fallback: bool,

        /// Open the result when done
        #[arg(long)]
        open: bool,
    },

    /// Write the printable HTML document
    Print {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (input name with .html if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Open the document in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Dump the parsed document as JSON
    Json {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Dump the laid-out surface instead of the document
        #[arg(long)]
        layout: bool,
    },

    /// Dump the parsed document as plain text
    Text {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective style configuration as JSON
    Style {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write the starter resume document
    Sample {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let style = cli.style.clone();

    let result = match cli.command {
        Some(Commands::Pdf {
            input,
            output,
            scale,
            fallback,
            open,
        }) => cmd_pdf(&input, output.as_deref(), &style, scale, fallback, open),
        Some(Commands::Print {
            input,
            output,
            open,
        }) => cmd_print(&input, output.as_deref(), &style, open),
        Some(Commands::Json {
            input,
            output,
            compact,
            layout,
        }) => cmd_json(&input, output.as_deref(), &style, compact, layout),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref(), &style),
        Some(Commands::Info { input, json }) => cmd_info(&input, &style, json),
        Some(Commands::Style { output }) => cmd_style(output.as_deref(), &style),
        Some(Commands::Sample { output }) => cmd_sample(output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_pdf(
                    &input,
                    cli.output.as_deref(),
                    &style,
                    mdpage::export::DEFAULT_SCALE,
                    true,
                    false,
                )
            } else {
                println!("{}", "Usage: mdpage <FILE> [OUTPUT]".yellow());
                println!("       mdpage --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_source(input: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(input)
        .map_err(|e| format!("Cannot read {}: {}", input.display(), e).into())
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_pdf(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
    scale: f32,
    fallback: bool,
    open: bool,
) -> CliResult {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("pdf"));

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing markdown...");
    let source = read_source(input)?;
    let doc = mdpage::parse_with_options(&source, style.parse_options());
    pb.inc(1);

    pb.set_message("Resolving style...");
    let config = style.build()?;
    let resolved = mdpage::resolve(&config);
    pb.inc(1);

    pb.set_message("Laying out...");
    let surface = mdpage::layout::render(&doc, &resolved);
    pb.inc(1);

    pb.set_message("Exporting PDF...");
    log::debug!(
        "Exporting {} element(s) to {} at scale {}",
        surface.elements().len(),
        output.display(),
        scale
    );
    let exporter = Exporter::with_options(ExportOptions::new().with_scale(scale));
    let opened = if fallback {
        let host = HtmlFilePrintHost::new(output.with_extension("html"));
        match exporter.export_with_fallback(&surface, &output, &host)? {
            ExportOutcome::Saved(report) => {
                pb.inc(1);
                pb.finish_with_message("Done!");
                print_report(&report);
                report.path
            }
            ExportOutcome::PrintFallback {
                notice,
                cause,
                location,
            } => {
                pb.abandon_with_message("Export failed");
                println!("\n{}", notice.yellow().bold());
                println!("  {} {}", "Cause:".dimmed(), cause);
                let path = location.unwrap_or_else(|| host.path().to_path_buf());
                println!("  {} {}", "Print document:".dimmed(), path.display());
                path
            }
        }
    } else {
        let report = exporter.export_pdf(&surface, &output)?;
        pb.inc(1);
        pb.finish_with_message("Done!");
        print_report(&report);
        report.path
    };

    if open {
        open::that(&opened)?;
    }
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!(
        "\n{} {} ({} page{}, {} bytes)",
        "Saved to".green().bold(),
        report.path.display(),
        report.pages,
        if report.pages == 1 { "" } else { "s" },
        report.bytes
    );
}

/// Opens the print document in the default browser after writing it.
struct BrowserPrintHost {
    file: HtmlFilePrintHost,
}

impl PrintHost for BrowserPrintHost {
    fn open(&self, document: &mdpage::PrintDocument) -> mdpage::Result<Option<PathBuf>> {
        let path = self.file.open(document)?;
        if let Some(path) = &path {
            open::that(path).map_err(|e| mdpage::Error::HostUnavailable(e.to_string()))?;
        }
        Ok(path)
    }
}

fn cmd_print(input: &Path, output: Option<&Path>, style: &StyleArgs, open: bool) -> CliResult {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("html"));

    let source = read_source(input)?;
    let doc = mdpage::parse_with_options(&source, style.parse_options());
    let surface = mdpage::render_surface(&doc, &style.build()?);
    log::debug!("Writing print document to {}", output.display());

    let file = HtmlFilePrintHost::new(&output);
    let location = if open {
        Exporter::new().print_fallback(&surface, &BrowserPrintHost { file })?
    } else {
        Exporter::new().print_fallback(&surface, &file)?
    };

    let path = location.unwrap_or(output);
    println!("{} {}", "Saved to".green(), path.display());
    if open {
        println!("{}", "Use the browser's print dialog (Ctrl+P) to print.".dimmed());
    }
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
    compact: bool,
    layout: bool,
) -> CliResult {
    let source = read_source(input)?;
    let doc = mdpage::parse_with_options(&source, style.parse_options());

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = if layout {
        let surface = mdpage::render_surface(&doc, &style.build()?);
        mdpage::render::surface_to_json(&surface, format)?
    } else {
        mdpage::render::to_json(&doc, format)?
    };

    write_or_print(output, &json)
}

fn cmd_text(input: &Path, output: Option<&Path>, style: &StyleArgs) -> CliResult {
    let source = read_source(input)?;
    let doc = mdpage::parse_with_options(&source, style.parse_options());
    let text = mdpage::render::to_text(&doc, &TextOptions::default())?;
    write_or_print(output, &text)
}

fn cmd_info(input: &Path, style: &StyleArgs, json: bool) -> CliResult {
    let source = read_source(input)?;
    let doc = mdpage::parse_with_options(&source, style.parse_options());
    let config = style.build()?;
    let surface = mdpage::render_surface(&doc, &config);
    let stats = DocumentStats::collect(&source, &doc);
    let format = ExportOptions::default().page;
    let pages = page_count(&surface, &format);

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "title": doc.metadata.title,
            "pages": pages,
            "fontFamily": config.font_family.to_string(),
            "bodySize": config.font_sizes.body,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    println!(
        "{}: A4 ({} x {} mm)",
        "Page format".bold(),
        format.width_mm,
        format.height_mm
    );
    println!("{}: {}", "Pages".bold(), pages);
    println!("{}: {}", "Font".bold(), config.font_family);
    println!("{}: {}pt", "Body size".bold(), config.font_sizes.body);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Characters".bold(), stats.characters);
    println!("{}: {}", "Lines".bold(), stats.lines);
    println!("{}: {}", "Words".bold(), stats.words);
    println!("{}: {}", "Headings".bold(), stats.headings);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
    println!(
        "{}: {} ({} items)",
        "Lists".bold(),
        stats.lists,
        stats.list_items
    );
    println!("{}: {}", "Rules".bold(), stats.rules);
    println!("{}: {}", "Links".bold(), stats.links);

    Ok(())
}

fn cmd_style(output: Option<&Path>, style: &StyleArgs) -> CliResult {
    let config = style.build()?;
    write_or_print(output, &config.to_json_pretty()?)
}

fn cmd_sample(output: Option<&Path>) -> CliResult {
    write_or_print(output, mdpage::SAMPLE_MARKDOWN)
}

fn cmd_version() {
    println!("{} {}", "mdpage".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Extended markdown to A4 PDF pages");
    println!();
    println!("License: MIT");
}
