//! Direct extraction: read each page's embedded text layer via PDFium.

use crate::config::ExtractionMethod;
use crate::error::ExtractError;
use crate::output::{DocumentMetadata, PageText};
use crate::pipeline::cleanup::clean_page_text;
use crate::pipeline::document::{bind_pdfium, load_document, read_metadata};
use crate::progress::ProgressCallback;
use std::path::Path;
use tracing::{debug, warn};

/// Read the text layer of every page, in order.
///
/// Runs inside `spawn_blocking`. A page with no text layer comes back as an
/// empty [`PageText`]; only a PDFium failure aborts the run.
pub async fn extract_text_layer(
    pdf_path: &Path,
    password: Option<&str>,
    progress: Option<ProgressCallback>,
) -> Result<(DocumentMetadata, Vec<PageText>), ExtractError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_blocking(&path, pwd.as_deref(), progress))
        .await
        .map_err(|e| ExtractError::Internal(format!("Text extraction task panicked: {}", e)))?
}

fn extract_blocking(
    path: &Path,
    password: Option<&str>,
    progress: Option<ProgressCallback>,
) -> Result<(DocumentMetadata, Vec<PageText>), ExtractError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, path, password)?;
    let metadata = read_metadata(&document);
    let total = metadata.page_count;

    if let Some(ref cb) = progress {
        cb.on_extraction_start(total, ExtractionMethod::Direct);
    }

    let mut pages = Vec::with_capacity(total);
    for (idx, page) in document.pages().iter().enumerate() {
        let page_num = idx + 1;
        if let Some(ref cb) = progress {
            cb.on_page_start(page_num, total);
        }

        let raw = page
            .text()
            .map_err(|e| ExtractError::CorruptPdf {
                path: path.to_path_buf(),
                detail: format!("page {page_num}: {:?}", e),
            })?
            .all();
        let text = clean_page_text(&raw);

        if text.is_empty() {
            warn!("Page {} has no extractable text", page_num);
        } else {
            debug!("Page {} → {} chars", page_num, text.chars().count());
        }
        if let Some(ref cb) = progress {
            cb.on_page_complete(page_num, total, text.chars().count());
        }

        pages.push(PageText::new(page_num, text));
    }

    Ok((metadata, pages))
}
