//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! This runs before any other stage, so a bad path never creates an output
//! directory, a scratch directory, or binds PDFium. The `%PDF-` header check
//! turns "this is a .docx renamed to .pdf" into a clear error instead of a
//! PDFium parse failure. Like PDF readers, it accepts the header anywhere in
//! the first 1024 bytes, so a BOM or a mail-gateway prefix is tolerated.

use crate::error::ExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_HEADER: &[u8] = b"%PDF-";

/// How far into the file the header may start.
const HEADER_SEARCH_LEN: u64 = 1024;

/// Validate `path` and return it as an owned `PathBuf`.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, ExtractError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(ExtractError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => return Err(ExtractError::FileNotFound { path }),
    };

    let mut head = Vec::with_capacity(HEADER_SEARCH_LEN as usize);
    if let Err(e) = file.by_ref().take(HEADER_SEARCH_LEN).read_to_end(&mut head) {
        debug!("Reading header of {} failed: {}", path.display(), e);
    }
    if !has_pdf_header(&head) {
        let mut magic = [0u8; 4];
        let n = head.len().min(magic.len());
        magic[..n].copy_from_slice(&head[..n]);
        return Err(ExtractError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

fn has_pdf_header(head: &[u8]) -> bool {
    head.windows(PDF_HEADER.len()).any(|w| w == PDF_HEADER)
}

/// File stem used in output names: `reports/Q3.final.pdf` → `Q3.final`.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// File name shown in the Markdown header: `reports/Q3.pdf` → `Q3.pdf`.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Directory receiving the outputs: the configured one, else the input's
/// parent, else the current directory for a bare file name.
pub fn output_dir_for(input: &Path, configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
