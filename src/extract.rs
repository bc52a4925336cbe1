//! Extraction entry points.
//!
//! [`extract`] runs the pipeline selected by
//! [`ExtractionConfig::method`](crate::config::ExtractionConfig::method) and
//! returns the pages in memory; [`extract_to_files`] additionally writes the
//! `.txt` / `.md` pair. Pages are processed strictly one at a time, in order.

use crate::config::{ExtractionConfig, ExtractionMethod};
use crate::error::ExtractError;
use crate::output::{
    DocumentMetadata, ExtractionOutput, ExtractionReport, ExtractionStats, PageText,
};
use crate::pipeline::cleanup::clean_page_text;
use crate::pipeline::ocr::Tesseract;
use crate::pipeline::{assemble, document, input, render, text};
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Pages plus the timings of the stage that produced them.
struct PageRun {
    metadata: DocumentMetadata,
    pages: Vec<PageText>,
    render_duration_ms: u64,
    recognition_duration_ms: u64,
}

/// Extract the text of every page of `input`.
///
/// # Errors
/// Missing or unreadable input, a missing OCR engine, PDFium failures, and
/// OCR failures are all fatal. A page without text is not an error.
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting {} extraction: {}", config.method, input.display());

    let run = match config.method {
        ExtractionMethod::Direct => direct_pages(input, config).await?,
        ExtractionMethod::Ocr => ocr_pages(input, config).await?,
    };

    let stats = ExtractionStats {
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms: run.render_duration_ms,
        recognition_duration_ms: run.recognition_duration_ms,
        ..ExtractionStats::from_pages(&run.pages)
    };

    info!(
        "Extraction complete: {}/{} pages with text, {}ms total",
        stats.pages_with_text, stats.total_pages, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(stats.total_pages, stats.pages_with_text);
    }

    Ok(ExtractionOutput {
        method: config.method,
        source: input.to_path_buf(),
        pages: run.pages,
        metadata: run.metadata,
        stats,
        extracted_at: Local::now(),
    })
}

/// Extract `input` and write `<base>_<tag>_<timestamp>.txt` and `.md`.
///
/// Files go to `config.output_dir`, or next to the input when unset. The
/// timestamp is taken when the run starts.
pub async fn extract_to_files(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionReport, ExtractError> {
    let started_at = Local::now();
    let output = extract(input, config).await?;

    let out_dir = input::output_dir_for(&output.source, config.output_dir.as_deref());
    let files = assemble::output_files_for(&output.source, &out_dir, output.method, &started_at);

    let body = assemble::transcript(&output.pages, output.method);
    let markdown = assemble::markdown_document(&output, &body);
    assemble::write_outputs(&files, &body, &markdown).await?;

    Ok(ExtractionReport { output, files })
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Read PDF metadata without extracting any text.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, ExtractError> {
    let pdf_path = input::resolve_input(input)?;
    document::extract_metadata(&pdf_path, None).await
}

/// Run the OCR pre-flight check and return the Tesseract version.
pub async fn ocr_engine_version(config: &ExtractionConfig) -> Result<String, ExtractError> {
    Tesseract::from_config(config).probe().await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn direct_pages(input: &Path, config: &ExtractionConfig) -> Result<PageRun, ExtractError> {
    let pdf_path = input::resolve_input(input)?;

    let start = Instant::now();
    let (metadata, pages) = text::extract_text_layer(
        &pdf_path,
        config.password.as_deref(),
        config.progress_callback.clone(),
    )
    .await?;

    Ok(PageRun {
        metadata,
        pages,
        render_duration_ms: 0,
        recognition_duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Probe Tesseract, rasterise into a scratch directory, recognise each page.
///
/// The scratch directory is owned by a [`TempDir`] and removed when this
/// function returns, whichever way it returns.
async fn ocr_pages(input: &Path, config: &ExtractionConfig) -> Result<PageRun, ExtractError> {
    let tesseract = Tesseract::from_config(config);
    let version = tesseract.probe().await?;
    info!("Tesseract OCR {} is installed and working", version);
    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_engine_ready(&version);
    }

    let pdf_path = input::resolve_input(input)?;
    let scratch = scratch_dir(config)?;
    debug!("Page images go to {}", scratch.path().display());

    let render_start = Instant::now();
    let (metadata, images) = render::render_pages_to_dir(
        &pdf_path,
        config.password.as_deref(),
        config.dpi,
        scratch.path(),
        config.progress_callback.clone(),
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let total = images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total, ExtractionMethod::Ocr);
    }

    let ocr_start = Instant::now();
    let mut pages = Vec::with_capacity(total);
    for (idx, image) in images.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total);
        }

        let raw = tesseract.recognize(image, page_num).await?;
        let page_text = clean_page_text(&raw);
        debug!("OCR page {} → {} chars", page_num, page_text.chars().count());

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total, page_text.chars().count());
        }
        pages.push(PageText::new(page_num, page_text));
    }
    let recognition_duration_ms = ocr_start.elapsed().as_millis() as u64;

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!(
            "Failed to remove scratch directory {}: {}",
            scratch_path.display(),
            e
        );
    }

    Ok(PageRun {
        metadata,
        pages,
        render_duration_ms,
        recognition_duration_ms,
    })
}

fn scratch_dir(config: &ExtractionConfig) -> Result<TempDir, ExtractError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("pdf-textract-");

    let dir = match config.scratch_root {
        Some(ref root) => {
            std::fs::create_dir_all(root).map_err(ExtractError::ScratchDir)?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    };
    dir.map_err(ExtractError::ScratchDir)
}
