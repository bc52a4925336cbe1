//! PDF rasterisation: render every page to a PNG file for the OCR engine.
//!
//! Pages are rendered and written one at a time so only a single page's
//! bitmap is in memory; at 300 DPI an A4 page is ~35 MB of RGBA.

use crate::error::ExtractError;
use crate::output::DocumentMetadata;
use crate::pipeline::document::{bind_pdfium, load_document, read_metadata};
use crate::progress::ProgressCallback;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user space is 72 units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Scale factor turning page points into pixels at `dpi`.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// File name of page `page_num` inside the scratch directory.
pub fn page_image_name(page_num: usize) -> String {
    format!("page_{page_num}.png")
}

/// Rasterise every page of `pdf_path` at `dpi` into `out_dir`.
///
/// # Returns
/// The document metadata and one PNG path per page, in page order.
pub async fn render_pages_to_dir(
    pdf_path: &Path,
    password: Option<&str>,
    dpi: u32,
    out_dir: &Path,
    progress: Option<ProgressCallback>,
) -> Result<(DocumentMetadata, Vec<PathBuf>), ExtractError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());
    let dir = out_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        render_blocking(&path, pwd.as_deref(), dpi, &dir, progress)
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

fn render_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    dpi: u32,
    out_dir: &Path,
    progress: Option<ProgressCallback>,
) -> Result<(DocumentMetadata, Vec<PathBuf>), ExtractError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path, password)?;
    let metadata = read_metadata(&document);

    if let Some(ref cb) = progress {
        cb.on_rasterisation_start(metadata.page_count, dpi);
    }
    info!(
        "Converting {} pages to images at {} DPI",
        metadata.page_count, dpi
    );

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));
    let mut images = Vec::with_capacity(metadata.page_count);

    for (idx, page) in document.pages().iter().enumerate() {
        let page_num = idx + 1;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ExtractError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;
        let image = bitmap.as_image();

        let image_path = out_dir.join(page_image_name(page_num));
        image
            .save_with_format(&image_path, ImageFormat::Png)
            .map_err(|e| ExtractError::RasterisationFailed {
                page: page_num,
                detail: format!("saving {}: {}", image_path.display(), e),
            })?;

        debug!(
            "Rendered page {} → {}x{} px ({})",
            page_num,
            image.width(),
            image.height(),
            image_path.display()
        );
        images.push(image_path);
    }

    Ok((metadata, images))
}
