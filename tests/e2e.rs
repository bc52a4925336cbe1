//! End-to-end integration tests for pdf-textract.
//!
//! The PDFs are generated on the fly (see [`write_pdf`]) so no fixture files
//! are needed. Tests that only exercise input validation run everywhere;
//! tests that open documents need the PDFium library (downloaded on first
//! use) and are gated behind the `E2E_ENABLED` environment variable.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture --test-threads=1
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e direct_three_pages -- --nocapture

use pdf_textract::{
    extract, extract_to_files, inspect, ocr_engine_version, ExtractError, ExtractionConfig,
    ExtractionMethod, ExtractionProgressCallback,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Write a minimal PDF with one page per entry. `Some(text)` draws `text`
/// in 28pt Helvetica; `None` leaves the page blank.
fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    let n = pages.len();
    let mut objects: Vec<String> = Vec::new();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        n
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, page) in pages.iter().enumerate() {
        let content_id = 5 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        let stream = match page {
            Some(text) => {
                let escaped = text
                    .replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)");
                format!("BT /F1 28 Tf 72 700 Td ({escaped}) Tj ET")
            }
            None => String::new(),
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for off in offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));

    std::fs::write(path, out).unwrap();
}

/// Page numbers of every `--- Page N` delimiter, in file order.
fn delimiter_pages(transcript: &str) -> Vec<usize> {
    transcript
        .lines()
        .filter_map(|l| l.strip_prefix("--- Page "))
        .map(|rest| {
            rest.split(|c: char| !c.is_ascii_digit())
                .next()
                .unwrap()
                .parse()
                .unwrap()
        })
        .collect()
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// A stand-in `tesseract` that answers `--version` and prints a line naming
/// the image it was given; any other invocation fails when `fail` is set.
#[cfg(unix)]
fn fake_tesseract(dir: &Path, fail: bool) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let recognise = if fail {
        "echo 'Error: cannot read image' >&2\nexit 3"
    } else {
        "echo \"recognised $(basename \"$1\")\""
    };
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  echo 'tesseract 5.3.4'\n  exit 0\nfi\n{recognise}\n"
    );
    let path = dir.join(if fail { "tesseract-broken" } else { "tesseract-fake" });
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[derive(Default)]
struct CountingProgress {
    started: AtomicUsize,
    completed: AtomicUsize,
    last_page: AtomicUsize,
}

impl ExtractionProgressCallback for CountingProgress {
    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
        assert!(page_num > self.last_page.load(Ordering::SeqCst));
        self.last_page.store(page_num, Ordering::SeqCst);
    }
    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _text_len: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Input validation (no PDFium needed) ──────────────────────────────────────

#[tokio::test]
async fn missing_input_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = ExtractionConfig::builder().output_dir(&out).build().unwrap();

    let err = extract_to_files(dir.path().join("missing.pdf"), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::FileNotFound { .. }));
    assert!(err.to_string().starts_with("File not found - "));
    assert!(!out.exists(), "output directory must not be created");
}

#[tokio::test]
async fn file_without_pdf_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("notes.pdf");
    std::fs::write(&fake, "just some text\n").unwrap();
    let config = ExtractionConfig::builder()
        .output_dir(dir.path())
        .build()
        .unwrap();

    let err = extract_to_files(&fake, &config).await.unwrap_err();

    assert!(matches!(err, ExtractError::NotAPdf { .. }));
    assert_eq!(files_in(dir.path()), vec![fake]);
}

#[tokio::test]
async fn directory_input_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = inspect(dir.path()).await.unwrap_err();
    assert!(matches!(err, ExtractError::FileNotFound { .. }));
}

#[tokio::test]
async fn ocr_without_engine_fails_before_touching_output_or_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    write_pdf(&pdf, &[Some("Scanned")]);
    let scratch = dir.path().join("scratch");
    let out = dir.path().join("out");

    let config = ExtractionConfig::builder()
        .method(ExtractionMethod::Ocr)
        .tesseract_cmd(dir.path().join("no-such-tesseract"))
        .scratch_root(&scratch)
        .output_dir(&out)
        .build()
        .unwrap();

    assert!(ocr_engine_version(&config).await.is_err());
    let err = extract_to_files(&pdf, &config).await.unwrap_err();

    assert!(matches!(err, ExtractError::OcrEngineUnavailable { .. }));
    assert!(files_in(&scratch).is_empty());
    assert!(!out.exists());
}

// ── Direct extraction (PDFium) ───────────────────────────────────────────────

#[tokio::test]
async fn direct_three_pages() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    write_pdf(
        &pdf,
        &[Some("Revenue grew"), Some("Costs fell"), Some("Outlook stable")],
    );
    let out = dir.path().join("out");
    let progress = Arc::new(CountingProgress::default());
    let config = ExtractionConfig::builder()
        .output_dir(&out)
        .progress_callback(progress.clone())
        .build()
        .unwrap();

    let report = extract_to_files(&pdf, &config).await.unwrap();

    let name = report.files.text.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("report_extracted_"), "{name}");
    assert!(name.ends_with(".txt"));
    assert_eq!(name.len(), "report_extracted_YYYYMMDD_HHMMSS.txt".len());
    assert_eq!(report.files.text.parent().unwrap(), out);

    let txt = std::fs::read_to_string(&report.files.text).unwrap();
    assert_eq!(delimiter_pages(&txt), vec![1, 2, 3]);
    assert!(txt.contains("Revenue grew"));
    assert!(txt.contains("Outlook stable"));
    assert!(txt.find("Revenue").unwrap() < txt.find("Costs").unwrap());

    let md = std::fs::read_to_string(&report.files.markdown).unwrap();
    assert!(md.starts_with("# Extracted Text from report\n"));
    assert!(md.contains("- Source: `report.pdf`"));
    assert!(md.contains("- Pages: 3"));
    assert!(md.contains("```"));
    assert!(md.contains(txt.trim()));

    assert_eq!(report.output.stats.total_pages, 3);
    assert_eq!(report.output.stats.pages_with_text, 3);
    assert_eq!(progress.started.load(Ordering::SeqCst), 3);
    assert_eq!(progress.completed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn direct_blank_page_gets_placeholder() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("mixed.pdf");
    write_pdf(&pdf, &[Some("Cover"), None, Some("Appendix")]);
    let config = ExtractionConfig::builder()
        .output_dir(dir.path())
        .build()
        .unwrap();

    let report = extract_to_files(&pdf, &config).await.unwrap();
    let txt = std::fs::read_to_string(&report.files.text).unwrap();

    assert_eq!(delimiter_pages(&txt), vec![1, 2, 3]);
    assert!(txt.contains("\n--- Page 2 (No text extracted) ---\n"));
    assert!(!txt.contains("--- Page 1 (No text extracted)"));
    assert_eq!(report.output.stats.empty_pages, 1);
}

#[tokio::test]
async fn output_defaults_to_input_directory() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("memo.pdf");
    write_pdf(&pdf, &[Some("Memo")]);

    let report = extract_to_files(&pdf, &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(report.files.text.parent().unwrap(), dir.path());
    assert_eq!(report.files.markdown.parent().unwrap(), dir.path());
    assert!(report.files.markdown.exists());
}

#[tokio::test]
async fn inspect_reports_page_count() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("five.pdf");
    write_pdf(&pdf, &[Some("1"), Some("2"), None, Some("4"), Some("5")]);

    let meta = inspect(&pdf).await.unwrap();
    assert_eq!(meta.page_count, 5);
}

#[tokio::test]
async fn header_only_pdf_is_reported_as_corrupt() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"%PDF-1.4\n%%EOF\n").unwrap();

    let err = extract(&pdf, &ExtractionConfig::default()).await.unwrap_err();
    assert!(matches!(err, ExtractError::CorruptPdf { .. }), "{err:?}");
}

// ── OCR extraction ───────────────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn ocr_pages_in_order_and_scratch_removed() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    write_pdf(&pdf, &[Some("One"), Some("Two"), None]);
    let scratch = dir.path().join("scratch");
    let out = dir.path().join("out");

    let config = ExtractionConfig::builder()
        .method(ExtractionMethod::Ocr)
        .tesseract_cmd(fake_tesseract(dir.path(), false))
        .dpi(72)
        .scratch_root(&scratch)
        .output_dir(&out)
        .build()
        .unwrap();

    let report = extract_to_files(&pdf, &config).await.unwrap();

    let name = report.files.text.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("scan_OCR_"), "{name}");

    let txt = std::fs::read_to_string(&report.files.text).unwrap();
    assert_eq!(delimiter_pages(&txt), vec![1, 2, 3]);
    assert!(txt.contains("\n--- Page 1 ---\n\nrecognised page_1.png\n"));
    assert!(txt.contains("\n--- Page 3 ---\n\nrecognised page_3.png\n"));
    assert!(!txt.contains("No text extracted"));

    let md = std::fs::read_to_string(&report.files.markdown).unwrap();
    assert!(md.starts_with("# OCR Text Extraction from scan\n"));
    assert!(md.contains("## Extracted Content"));

    assert!(files_in(&scratch).is_empty(), "scratch directory left behind");
}

#[cfg(unix)]
#[tokio::test]
async fn ocr_failure_still_removes_scratch() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    write_pdf(&pdf, &[Some("One"), Some("Two")]);
    let scratch = dir.path().join("scratch");
    let out = dir.path().join("out");

    let config = ExtractionConfig::builder()
        .method(ExtractionMethod::Ocr)
        .tesseract_cmd(fake_tesseract(dir.path(), true))
        .dpi(72)
        .scratch_root(&scratch)
        .output_dir(&out)
        .build()
        .unwrap();

    let err = extract_to_files(&pdf, &config).await.unwrap_err();

    match err {
        ExtractError::OcrFailed { page, ref detail } => {
            assert_eq!(page, 1);
            assert!(detail.contains("cannot read image"), "{detail}");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(files_in(&scratch).is_empty(), "scratch directory left behind");
    assert!(!out.exists());
}

#[tokio::test]
async fn ocr_with_real_tesseract() {
    e2e_skip_unless_enabled!();

    let config = ExtractionConfig::builder()
        .method(ExtractionMethod::Ocr)
        .build()
        .unwrap();
    if ocr_engine_version(&config).await.is_err() {
        println!("SKIP — tesseract not installed");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("invoice.pdf");
    write_pdf(&pdf, &[Some("INVOICE TOTAL"), Some("THANK YOU")]);

    let output = extract(&pdf, &config).await.unwrap();

    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.pages[0].page_num, 1);
    assert_eq!(output.pages[1].page_num, 2);
    assert!(
        output.pages[0].text.to_uppercase().contains("INVOICE"),
        "page 1: {:?}",
        output.pages[0].text
    );
}
