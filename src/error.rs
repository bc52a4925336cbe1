//! Error type for the pdf-textract library.
//!
//! Every failure is fatal for the run: there are no per-page errors. A page
//! without a text layer is not an error (it becomes a placeholder block in
//! the transcript), and anything else that goes wrong on a page means the
//! output would silently miss content, so the run stops and reports it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-textract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found - {path}")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDFium could not parse the document.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Rendering a page, or saving its image, failed.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine binary could not be run.
    #[error(
        "Tesseract OCR is not installed or not in your PATH ('{command}': {reason}).\n\n\
Install it, then run again:\n\
  • Debian/Ubuntu: sudo apt install tesseract-ocr\n\
  • macOS:         brew install tesseract\n\
  • Windows:       https://github.com/UB-Mannheim/tesseract/wiki\n\
                   (default location C:\\Program Files\\Tesseract-OCR; add it to PATH)\n\n\
Alternatively set TESSERACT_CMD=/path/to/tesseract."
    )]
    OcrEngineUnavailable { command: String, reason: String },

    /// The OCR engine ran but failed on one page.
    #[error("OCR failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── Environment errors ────────────────────────────────────────────────
    /// Could not locate, download or bind the PDFium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the download failed you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    /// The temporary directory for page images could not be created.
    #[error("Failed to create scratch directory: {0}")]
    ScratchDir(#[source] std::io::Error),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<pdfium_auto::PdfiumAutoError> for ExtractError {
    fn from(e: pdfium_auto::PdfiumAutoError) -> Self {
        ExtractError::PdfiumBindingFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_the_path() {
        let e = ExtractError::FileNotFound {
            path: PathBuf::from("missing/report.pdf"),
        };
        assert_eq!(e.to_string(), "File not found - missing/report.pdf");
    }

    #[test]
    fn ocr_engine_unavailable_carries_install_guidance() {
        let e = ExtractError::OcrEngineUnavailable {
            command: "tesseract".into(),
            reason: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("not installed or not in your PATH"), "got: {msg}");
        assert!(msg.contains("UB-Mannheim"));
        assert!(msg.contains("TESSERACT_CMD"));
    }

    #[test]
    fn ocr_failed_display() {
        let e = ExtractError::OcrFailed {
            page: 4,
            detail: "exit status 1".into(),
        };
        assert!(e.to_string().contains("page 4"));
        assert!(e.to_string().contains("exit status 1"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("/ro/out.txt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(e.to_string().contains("/ro/out.txt"));
        assert!(e.source().is_some());
    }

    #[test]
    fn pdfium_auto_errors_convert_to_binding_failure() {
        let e: ExtractError = pdfium_auto::PdfiumAutoError::Download("HTTP 404".into()).into();
        assert!(matches!(e, ExtractError::PdfiumBindingFailed(_)));
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }
}
