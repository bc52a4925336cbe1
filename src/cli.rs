//! Command-line front end shared by `pdf-extract-text` and `pdf-ocr-extract`.
//!
//! Both binaries accept `<pdf_path> [-o|--output <dir>]` and differ only in
//! the [`ExtractionMethod`] they pass to [`run`].

use crate::{
    extract_to_files, ExtractionConfig, ExtractionMethod, ExtractionProgressCallback,
    ProgressCallback,
};
use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the document opens, then a page bar with one log line per
/// page printed above it.
struct CliProgress {
    bar: ProgressBar,
    /// `ExtractionMethod` seen in `on_extraction_start`: 0 direct, 1 OCR.
    method: AtomicU8,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            method: AtomicU8::new(0),
        })
    }

    /// Print above the bar, or straight to stderr when the bar is hidden
    /// (stderr is not a terminal).
    fn line(&self, msg: String) {
        if self.bar.is_hidden() {
            eprintln!("{msg}");
        } else {
            self.bar.println(msg);
        }
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ExtractionProgressCallback for CliProgress {
    fn on_ocr_engine_ready(&self, version: &str) {
        self.line(format!(
            "{} Tesseract OCR {version} is installed and working.",
            green("✔")
        ));
    }

    fn on_rasterisation_start(&self, total_pages: usize, dpi: u32) {
        self.bar.set_prefix("Rendering");
        self.bar
            .set_message(format!("{total_pages} pages at {dpi} DPI"));
        self.line(format!("{} Converting PDF to images...", cyan("◆")));
    }

    fn on_extraction_start(&self, total_pages: usize, method: ExtractionMethod) {
        self.method
            .store(u8::from(method == ExtractionMethod::Ocr), Ordering::SeqCst);
        self.activate_bar(total_pages);
        self.line(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("PDF has {total_pages} pages"))
        ));
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let with_ocr = if self.method.load(Ordering::SeqCst) == 1 {
            " with OCR"
        } else {
            ""
        };
        self.bar
            .set_message(format!("Processing page {page_num}/{total_pages}{with_ocr}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let is_direct = self.method.load(Ordering::SeqCst) == 0;
        if text_len == 0 && is_direct {
            self.line(format!(
                "  {} Page {:>3}/{:<3}  {}",
                yellow("∅"),
                page_num,
                total_pages,
                dim("(No text extracted)")
            ));
        } else {
            self.line(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total_pages,
                dim(&format!("{text_len:>6} chars"))
            ));
        }
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, _total_pages: usize, _pages_with_text: usize) {
        self.clear();
    }
}

// ── Arguments ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(version, arg_required_else_help = true, color = clap::ColorChoice::Auto)]
struct Cli {
    /// Path to the PDF file.
    pdf_path: PathBuf,

    /// Output directory for extracted text (default: the PDF's directory).
    #[arg(short, long, env = "PDF_TEXTRACT_OUTPUT")]
    output: Option<PathBuf>,
}

const AFTER_HELP: &str = r#"OUTPUT:
  <name>_<tag>_<YYYYMMDD_HHMMSS>.txt   page text with "--- Page N ---" delimiters
  <name>_<tag>_<YYYYMMDD_HHMMSS>.md    the same text under a short header

ENVIRONMENT VARIABLES:
  PDF_TEXTRACT_OUTPUT     Default for --output
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips the download
  PDFIUM_AUTO_CACHE_DIR   Override the PDFium cache directory
  TESSERACT_CMD           Tesseract binary (OCR only, default: tesseract)
  PDF_TEXTRACT_OCR_LANG   Tesseract language(s), e.g. eng+fra (default: eng)
  PDF_TEXTRACT_DPI        Rasterisation DPI for OCR, 72-600 (default: 300)
  RUST_LOG                Log filter, e.g. RUST_LOG=pdf_textract=debug

EXIT STATUS:
  0 on success, 1 if the PDF could not be extracted or written.
"#;

fn parse_args(method: ExtractionMethod) -> Cli {
    let (name, about) = match method {
        ExtractionMethod::Direct => (
            "pdf-extract-text",
            "Extract text from PDF files using the embedded text layer",
        ),
        ExtractionMethod::Ocr => (
            "pdf-ocr-extract",
            "Extract text from PDF files using OCR (for scanned documents)",
        ),
    };
    let matches = Cli::command()
        .name(name)
        .bin_name(name)
        .about(about)
        .after_long_help(AFTER_HELP)
        .get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

// ── Entry point ──────────────────────────────────────────────────────────────

/// Parse arguments, check dependencies, extract, and report.
///
/// Returns `Err` (process exit status 1) when extraction fails.
pub async fn run(method: ExtractionMethod) -> Result<()> {
    let cli = parse_args(method);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    ensure_pdfium()?;

    let mut config = config_from(method, cli.output.as_deref(), |key| std::env::var(key).ok())?;

    let progress = CliProgress::new();
    config.progress_callback = Some(progress.clone() as ProgressCallback);

    let result = extract_to_files(&cli.pdf_path, &config).await;
    progress.clear();

    let report = result.with_context(|| match method {
        ExtractionMethod::Direct => "Error extracting text",
        ExtractionMethod::Ocr => "Error during OCR extraction",
    })?;

    let done = match method {
        ExtractionMethod::Direct => "Extraction complete!",
        ExtractionMethod::Ocr => "OCR extraction complete!",
    };
    let stats = &report.output.stats;
    eprintln!(
        "{} {}  {}/{} pages with text  {}ms",
        green("✔"),
        bold(done),
        stats.pages_with_text,
        stats.total_pages,
        stats.total_duration_ms
    );
    println!("Text output: {}", report.files.text.display());
    println!("Markdown output: {}", report.files.markdown.display());

    Ok(())
}

/// Validate the environment overrides and the output directory into a
/// config without a progress callback.
fn config_from(
    method: ExtractionMethod,
    output: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .method(method)
        .overrides_from(lookup)
        .context("Invalid environment configuration")?;
    if let Some(dir) = output {
        builder = builder.output_dir(dir);
    }
    builder.build().context("Invalid configuration")
}

/// Make sure PDFium is available, downloading it with a progress bar on the
/// first run.
fn ensure_pdfium() -> Result<()> {
    if let Some(found) = pdfium_auto::locate().context("Failed to look for the PDFium engine")? {
        tracing::debug!("PDFium engine: {} ({:?})", found.path.display(), found.source);
        return Ok(());
    }

    eprintln!(
        "{} PDFium engine is not installed. Installing now...",
        cyan("◆")
    );
    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    // block_in_place keeps the borrowed callback valid while moving the
    // blocking download off the async worker.
    let installed = tokio::task::block_in_place(|| {
        pdfium_auto::install(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length() != Some(t) {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_and_clear();
    eprintln!(
        "{} PDFium engine has been installed ({}).",
        green("✔"),
        dim(&installed.path.display().to_string())
    );
    Ok(())
}
