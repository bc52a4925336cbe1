//! # pdf-textract
//!
//! Extract the text of PDF documents into plain-text and Markdown transcripts.
//!
//! Two extraction methods share one output format:
//!
//! - **Direct** reads each page's embedded text layer through PDFium. Fast,
//!   exact, and useless for scanned documents.
//! - **OCR** rasterises each page at 300 DPI and hands the image to the
//!   Tesseract command-line engine. Works on scans, costs seconds per page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    check the path exists, is readable, starts with %PDF
//!  ├─ 2a. Text    read each page's text layer (direct)
//!  ├─ 2b. Render  rasterise pages to PNG in a scratch directory (OCR)
//!  │   └─ OCR     tesseract <page.png> stdout, one page at a time
//!  ├─ 3. Cleanup  normalise line endings, control chars, blank lines
//!  └─ 4. Output   "--- Page N ---" transcript + Markdown document
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_textract::{extract_to_files, ExtractionConfig, ExtractionMethod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .method(ExtractionMethod::Direct)
//!         .output_dir("out")
//!         .build()?;
//!     let report = extract_to_files("report.pdf", &config).await?;
//!     println!("{}", report.files.text.display());
//!     eprintln!("{}/{} pages with text",
//!         report.output.stats.pages_with_text,
//!         report.output.stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-extract-text` and `pdf-ocr-extract` binaries (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf-textract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, ExtractionMethod};
pub use error::ExtractError;
pub use extract::{extract, extract_sync, extract_to_files, inspect, ocr_engine_version};
pub use output::{
    DocumentMetadata, ExtractionOutput, ExtractionReport, ExtractionStats, OutputFiles, PageText,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
