//! Output assembly: turn ordered page texts into the `.txt` transcript and
//! the `.md` document, name them, and write them.
//!
//! ## Transcript layout
//!
//! Each page contributes one block, in page order:
//!
//! ```text
//!
//! --- Page N ---
//!
//! <page text>
//! ```
//!
//! A page of a directly-extracted document that has no text layer becomes
//! `--- Page N (No text extracted) ---` with no body, so every page is still
//! accounted for. OCR pages are always emitted as recognised.

use crate::config::ExtractionMethod;
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, OutputFiles, PageText};
use crate::pipeline::input::{base_name, file_name};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Marker appended to the delimiter of a page without a text layer.
pub const NO_TEXT_PLACEHOLDER: &str = "(No text extracted)";

/// `strftime` pattern of the stamp in output file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `strftime` pattern of the "Extraction date" header line.
pub const HEADER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one page block.
pub fn page_block(page: &PageText, method: ExtractionMethod) -> String {
    if method == ExtractionMethod::Direct && page.is_empty() {
        format!("\n--- Page {} {} ---\n\n", page.page_num, NO_TEXT_PLACEHOLDER)
    } else {
        format!("\n--- Page {} ---\n\n{}\n", page.page_num, page.text)
    }
}

/// Concatenate every page block in page order.
pub fn transcript(pages: &[PageText], method: ExtractionMethod) -> String {
    pages.iter().map(|p| page_block(p, method)).collect()
}

/// Build the Markdown document: header, overview, then the transcript
/// (fenced for direct extraction, inline for OCR).
pub fn markdown_document(output: &ExtractionOutput, transcript: &str) -> String {
    let base = base_name(&output.source);
    let mut md = String::with_capacity(transcript.len() + 512);

    let (title, section) = match output.method {
        ExtractionMethod::Direct => ("Extracted Text from", "Content"),
        ExtractionMethod::Ocr => ("OCR Text Extraction from", "Extracted Content"),
    };

    // Writing into a String cannot fail.
    let _ = writeln!(md, "# {title} {base}\n");
    let _ = writeln!(
        md,
        "*Extraction date: {}*\n",
        output.extracted_at.format(HEADER_DATE_FORMAT)
    );
    let _ = writeln!(md, "## Overview\n");
    let _ = writeln!(md, "- Source: `{}`", file_name(&output.source));
    let _ = writeln!(md, "- Pages: {}", output.pages.len());
    let _ = writeln!(md, "- Method: {}\n", output.method.description());
    let _ = writeln!(md, "## {section}\n");

    match output.method {
        ExtractionMethod::Direct => {
            let _ = writeln!(md, "```\n{transcript}\n```");
        }
        ExtractionMethod::Ocr => md.push_str(transcript),
    }

    md
}

/// `2024-01-01 12:00:00` → `20240101_120000`.
pub fn timestamp_slug(at: &DateTime<Local>) -> String {
    at.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// Paths `<out_dir>/<base>_<tag>_<stamp>.txt` and `.md` for `input`.
pub fn output_files_for(
    input: &Path,
    out_dir: &Path,
    method: ExtractionMethod,
    started_at: &DateTime<Local>,
) -> OutputFiles {
    let stem = format!(
        "{}_{}_{}",
        base_name(input),
        method.file_tag(),
        timestamp_slug(started_at)
    );
    OutputFiles {
        text: out_dir.join(format!("{stem}.txt")),
        markdown: out_dir.join(format!("{stem}.md")),
    }
}

/// Create the output directory if needed, then write the transcript and the
/// Markdown document, in that order.
pub async fn write_outputs(
    files: &OutputFiles,
    transcript: &str,
    markdown: &str,
) -> Result<(), ExtractError> {
    if let Some(parent) = files.text.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ExtractError::OutputWriteFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    for (path, contents) in [(&files.text, transcript), (&files.markdown, markdown)] {
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| ExtractError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}
