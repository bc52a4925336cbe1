//! Result types produced by an extraction run.

use crate::config::ExtractionMethod;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text of one page, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned page text; empty when the page yielded nothing.
    pub text: String,
}

impl PageText {
    pub fn new(page_num: usize, text: impl Into<String>) -> Self {
        Self {
            page_num,
            text: text.into(),
        }
    }

    /// `true` when the page produced no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Document information read by PDFium.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters and timings for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub pages_with_text: usize,
    pub empty_pages: usize,
    pub total_chars: usize,
    pub total_duration_ms: u64,
    /// OCR only: time spent rendering pages to PNG.
    pub render_duration_ms: u64,
    /// Time spent reading the text layer or running Tesseract.
    pub recognition_duration_ms: u64,
}

impl ExtractionStats {
    /// Page and character counters derived from `pages`; timings left at zero.
    pub fn from_pages(pages: &[PageText]) -> Self {
        let pages_with_text = pages.iter().filter(|p| !p.is_empty()).count();
        Self {
            total_pages: pages.len(),
            pages_with_text,
            empty_pages: pages.len() - pages_with_text,
            total_chars: pages.iter().map(|p| p.text.chars().count()).sum(),
            ..Self::default()
        }
    }
}

/// Everything an extraction run produced, before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub method: ExtractionMethod,
    /// Input path as given by the caller.
    pub source: PathBuf,
    pub pages: Vec<PageText>,
    pub metadata: DocumentMetadata,
    pub stats: ExtractionStats,
    /// When extraction finished; shown as the Markdown "Extraction date".
    pub extracted_at: DateTime<Local>,
}

/// Paths of the two artefacts written for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFiles {
    pub text: PathBuf,
    pub markdown: PathBuf,
}

/// Result of [`crate::extract_to_files`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub output: ExtractionOutput,
    pub files: OutputFiles,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_page_counts_as_empty() {
        assert!(PageText::new(1, " \n\t").is_empty());
        assert!(!PageText::new(1, "x").is_empty());
    }

    #[test]
    fn stats_from_pages() {
        let pages = vec![
            PageText::new(1, "héllo"),
            PageText::new(2, ""),
            PageText::new(3, "ab"),
        ];
        let stats = ExtractionStats::from_pages(&pages);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.pages_with_text, 2);
        assert_eq!(stats.empty_pages, 1);
        assert_eq!(stats.total_chars, 7);
    }

    #[test]
    fn output_serialises_to_json() {
        let pages = vec![PageText::new(1, "Quarterly figures")];
        let output = ExtractionOutput {
            method: ExtractionMethod::Ocr,
            source: PathBuf::from("scan.pdf"),
            stats: ExtractionStats::from_pages(&pages),
            pages,
            metadata: DocumentMetadata {
                page_count: 1,
                ..Default::default()
            },
            extracted_at: Local::now(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["method"], "Ocr");
        assert_eq!(json["pages"][0]["page_num"], 1);
        assert_eq!(json["stats"]["pages_with_text"], 1);
    }
}
