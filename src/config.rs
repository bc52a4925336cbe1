//! Configuration types for PDF text extraction.
//!
//! Everything a run needs is carried by [`ExtractionConfig`], built through
//! [`ExtractionConfigBuilder`]. The two binaries differ only in the
//! [`ExtractionMethod`] they put into the builder.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Rasterisation resolution for OCR when nothing else is configured.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Accepted DPI range. Below 72 Tesseract misreads body text; above 600 a
/// single A4 page exceeds 130 MB of pixels.
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 72..=600;

/// Environment variable naming the Tesseract binary.
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";
/// Environment variable holding the Tesseract language code(s).
pub const OCR_LANG_ENV: &str = "PDF_TEXTRACT_OCR_LANG";
/// Environment variable overriding the rasterisation DPI.
pub const DPI_ENV: &str = "PDF_TEXTRACT_DPI";

/// How page text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Read the text layer embedded in the PDF.
    #[default]
    Direct,
    /// Rasterise each page and run Tesseract on the image.
    Ocr,
}

impl ExtractionMethod {
    /// Tag inserted into output file names: `<base>_<tag>_<timestamp>`.
    pub fn file_tag(self) -> &'static str {
        match self {
            ExtractionMethod::Direct => "extracted",
            ExtractionMethod::Ocr => "OCR",
        }
    }

    /// Human-readable method line for the Markdown header.
    pub fn description(self) -> &'static str {
        match self {
            ExtractionMethod::Direct => "Direct text-layer extraction (PDFium)",
            ExtractionMethod::Ocr => "Optical Character Recognition (Tesseract OCR)",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Direct => f.write_str("direct"),
            ExtractionMethod::Ocr => f.write_str("ocr"),
        }
    }
}

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use pdf_textract::{ExtractionConfig, ExtractionMethod};
///
/// let config = ExtractionConfig::builder()
///     .method(ExtractionMethod::Ocr)
///     .output_dir("transcripts")
///     .ocr_language("eng+deu")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Direct text-layer read or OCR. Default: [`ExtractionMethod::Direct`].
    pub method: ExtractionMethod,

    /// Directory for the `.txt`/`.md` pair. `None` writes next to the input.
    pub output_dir: Option<PathBuf>,

    /// Rasterisation DPI for OCR. Default: 300. Ignored by direct extraction.
    pub dpi: u32,

    /// Tesseract binary, bare name resolved through `PATH` or a full path.
    pub tesseract_cmd: PathBuf,

    /// Tesseract `-l` argument, e.g. `eng` or `eng+fra`. Default: `eng`.
    pub ocr_language: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Parent directory for the OCR page-image scratch directory.
    /// `None` uses the system temp directory.
    pub scratch_root: Option<PathBuf>,

    /// Optional progress callback for per-page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::default(),
            output_dir: None,
            dpi: DEFAULT_OCR_DPI,
            tesseract_cmd: PathBuf::from("tesseract"),
            ocr_language: "eng".to_string(),
            password: None,
            scratch_root: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("method", &self.method)
            .field("output_dir", &self.output_dir)
            .field("dpi", &self.dpi)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_language", &self.ocr_language)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("scratch_root", &self.scratch_root)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn method(mut self, method: ExtractionMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Apply `TESSERACT_CMD`, `PDF_TEXTRACT_OCR_LANG` and `PDF_TEXTRACT_DPI`
    /// from the process environment.
    pub fn env_overrides(self) -> Result<Self, ExtractError> {
        self.overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ExtractError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(cmd) = get(TESSERACT_CMD_ENV) {
            self.config.tesseract_cmd = PathBuf::from(cmd);
        }
        if let Some(lang) = get(OCR_LANG_ENV) {
            self.config.ocr_language = lang;
        }
        if let Some(raw) = get(DPI_ENV) {
            self.config.dpi = raw.parse().map_err(|_| {
                ExtractError::InvalidConfig(format!("{DPI_ENV} must be an integer, got '{raw}'"))
            })?;
        }
        Ok(self)
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !DPI_RANGE.contains(&c.dpi) {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be {}–{}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                c.dpi
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.as_os_str().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Tesseract command must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_ocr_contract() {
        let c = ExtractionConfig::default();
        assert_eq!(c.method, ExtractionMethod::Direct);
        assert_eq!(c.dpi, 300);
        assert_eq!(c.ocr_language, "eng");
        assert_eq!(c.tesseract_cmd, PathBuf::from("tesseract"));
        assert!(c.output_dir.is_none());
    }

    #[test]
    fn method_tags_and_descriptions() {
        assert_eq!(ExtractionMethod::Direct.file_tag(), "extracted");
        assert_eq!(ExtractionMethod::Ocr.file_tag(), "OCR");
        assert!(ExtractionMethod::Ocr.description().contains("Tesseract"));
        assert_eq!(ExtractionMethod::Ocr.to_string(), "ocr");
    }

    #[test]
    fn build_rejects_out_of_range_dpi() {
        let err = ExtractionConfig::builder().dpi(40).build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
        assert!(ExtractionConfig::builder().dpi(600).build().is_ok());
    }

    #[test]
    fn build_rejects_blank_language() {
        assert!(ExtractionConfig::builder()
            .ocr_language("  ")
            .build()
            .is_err());
    }

    #[test]
    fn overrides_apply_and_ignore_empty_values() {
        let config = ExtractionConfig::builder()
            .overrides_from(lookup(&[
                (TESSERACT_CMD_ENV, "/opt/tess/bin/tesseract"),
                (OCR_LANG_ENV, ""),
                (DPI_ENV, " 200 "),
            ]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.tesseract_cmd, PathBuf::from("/opt/tess/bin/tesseract"));
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.dpi, 200);
    }

    #[test]
    fn non_numeric_dpi_override_is_an_error() {
        let err = ExtractionConfig::builder()
            .overrides_from(lookup(&[(DPI_ENV, "high")]))
            .unwrap_err();
        assert!(err.to_string().contains("high"));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
