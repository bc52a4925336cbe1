//! Pipeline stages for PDF text extraction.
//!
//! ## Data Flow
//!
//! ```text
//! direct:  input ──▶ text ──────────────────▶ cleanup ──▶ assemble
//! OCR:     input ──▶ render ──▶ ocr ────────▶ cleanup ──▶ assemble
//!                   (PNG/page) (tesseract)
//! ```
//!
//! 1. [`input`]: validate the user-supplied path (exists, readable, `%PDF`)
//! 2. [`document`]: bind PDFium and open the document (shared by 3 and 4)
//! 3. [`text`]: direct, read each page's text layer
//! 4. [`render`]: OCR, rasterise each page to a PNG in the scratch directory
//! 5. [`ocr`]: OCR, run Tesseract on each PNG
//! 6. [`cleanup`]: normalise raw page text
//! 7. [`assemble`]: page blocks, Markdown document, file names, writing

pub mod assemble;
pub mod cleanup;
pub mod document;
pub mod input;
pub mod ocr;
pub mod render;
pub mod text;
