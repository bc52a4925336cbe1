//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document. Pages are always reported in
//! document order.
//!
//! # Example
//!
//! ```rust
//! use pdf_textract::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ExtractionProgressCallback for Printer {
//!     fn on_page_start(&self, page_num: usize, total_pages: usize) {
//!         println!("Processing page {page_num}/{total_pages}");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::config::ExtractionMethod;
use std::sync::Arc;

/// Called by the extraction pipeline as it processes the document.
///
/// Direct extraction fires these from a blocking worker thread, hence
/// `Send + Sync`. Every method defaults to a no-op.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the page count is known, before any page is processed.
    fn on_extraction_start(&self, total_pages: usize, method: ExtractionMethod) {
        let _ = (total_pages, method);
    }

    /// OCR only: the engine answered the pre-flight check with `version`.
    fn on_ocr_engine_ready(&self, version: &str) {
        let _ = version;
    }

    /// OCR only: called before pages are rendered to images.
    fn on_rasterisation_start(&self, total_pages: usize, dpi: u32) {
        let _ = (total_pages, dpi);
    }

    /// Called before text is read (direct) or recognised (OCR) for a page.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page's text is available.
    ///
    /// `text_len` is the character count after cleanup; `0` means the page
    /// produced no text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once after the last page, before output files are written.
    fn on_extraction_complete(&self, total_pages: usize, pages_with_text: usize) {
        let _ = (total_pages, pages_with_text);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
