//! Text recognition by the Tesseract command-line binary.
//!
//! Tesseract is not linked; it is run once per page image as
//! `tesseract <image> stdout -l <lang>` and its stdout is the page text.
//! [`Tesseract::probe`] runs `tesseract --version` first so a missing
//! binary is reported before any page is rendered.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A configured Tesseract invocation.
#[derive(Debug, Clone)]
pub struct Tesseract {
    command: PathBuf,
    language: String,
}

impl Tesseract {
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(&config.tesseract_cmd, &config.ocr_language)
    }

    /// Check the binary runs and return its version, e.g. `5.3.4`.
    pub async fn probe(&self) -> Result<String, ExtractError> {
        let unavailable = |reason: String| ExtractError::OcrEngineUnavailable {
            command: self.command.display().to_string(),
            reason,
        };

        let output = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(format!("--version exited with {}", output.status)));
        }

        // Tesseract 3.x printed the banner on stderr, 4+ on stdout.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = parse_version(&banner).unwrap_or_else(|| "unknown".to_string());
        debug!("Tesseract {} at '{}'", version, self.command.display());
        Ok(version)
    }

    /// Recognise the text in `image`. `page_num` only labels errors.
    pub async fn recognize(&self, image: &Path, page_num: usize) -> Result<String, ExtractError> {
        let output = Command::new(&self.command)
            .args(self.recognize_args(image))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExtractError::OcrFailed {
                page: page_num,
                detail: format!("could not run '{}': {}", self.command.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::OcrFailed {
                page: page_num,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn recognize_args(&self, image: &Path) -> Vec<OsString> {
        vec![
            image.as_os_str().to_owned(),
            OsString::from("stdout"),
            OsString::from("-l"),
            OsString::from(&self.language),
        ]
    }
}

/// First line of `tesseract --version` is `tesseract 5.3.4` (or
/// `tesseract v5.0.0.20211201` on Windows builds).
fn parse_version(banner: &str) -> Option<String> {
    let first = banner.lines().next()?.trim();
    let rest = first.strip_prefix("tesseract")?.trim();
    let version = rest.trim_start_matches('v').split_whitespace().next()?;
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
