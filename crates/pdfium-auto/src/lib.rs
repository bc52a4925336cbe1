//! # pdfium-auto
//!
//! Find the [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! that `pdfium-render` needs, and fetch it when the machine does not have
//! one yet.
//!
//! Resolution order:
//!
//! 1. `PDFIUM_LIB_PATH`, an existing library file chosen by the user.
//! 2. The per-version cache directory (see [`cache_dir`]).
//! 3. Download the platform archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    unpack the library into the cache directory, and use that.
//!
//! [`locate`] only performs steps 1–2 and never touches the network, so a
//! caller can tell the user that a download is about to happen before
//! calling [`install`].
//!
//! ```rust,no_run
//! let library = match pdfium_auto::locate()? {
//!     Some(found) => found,
//!     None => {
//!         eprintln!("Installing PDFium …");
//!         pdfium_auto::install(None)?
//!     }
//! };
//! let pdfium = library.bind()?;
//! # Ok::<(), pdfium_auto::PdfiumAutoError>(())
//! ```

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Points at an existing library file; skips cache and download.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Replaces the default cache root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_AUTO_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Name of the application folder inside the platform cache root.
const CACHE_APP_DIR: &str = "pdf-textract";

/// Errors returned while locating, downloading or binding PDFium.
#[derive(Error, Debug)]
pub enum PdfiumAutoError {
    /// No prebuilt PDFium exists for this OS/architecture pair.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The cache directory could not be created.
    #[error("Cache directory error for '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

/// Where a [`PdfiumLibrary`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    /// `PDFIUM_LIB_PATH` pointed at an existing file.
    Environment,
    /// Already present in the cache directory.
    Cache,
    /// Fetched by this process.
    Downloaded,
}

/// A PDFium shared library present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfiumLibrary {
    pub path: PathBuf,
    pub source: LibrarySource,
}

impl PdfiumLibrary {
    /// Load the library and hand back a ready [`Pdfium`] instance.
    pub fn bind(&self) -> Result<Pdfium, PdfiumAutoError> {
        Pdfium::bind_to_library(&self.path)
            .map(Pdfium::new)
            .map_err(|e| PdfiumAutoError::Bind {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

// ── Platform table ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct Platform {
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    archive: &'static str,
    /// Path of the library inside the archive.
    member: &'static str,
    /// File name written into the cache directory.
    file_name: &'static str,
}

const UNIX_SO: (&str, &str) = ("lib/libpdfium.so", "libpdfium.so");
const MAC_DYLIB: (&str, &str) = ("lib/libpdfium.dylib", "libpdfium.dylib");
const WIN_DLL: (&str, &str) = ("bin/pdfium.dll", "pdfium.dll");

fn platform_for(os: &str, arch: &str) -> Result<Platform, PdfiumAutoError> {
    let (archive, (member, file_name)) = match (os, arch) {
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", UNIX_SO),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", UNIX_SO),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", MAC_DYLIB),
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", MAC_DYLIB),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", WIN_DLL),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", WIN_DLL),
        ("windows", "x86") => ("pdfium-win-x86.tgz", WIN_DLL),
        (os, arch) => {
            return Err(PdfiumAutoError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };
    Ok(Platform {
        archive,
        member,
        file_name,
    })
}

fn current_platform() -> Result<Platform, PdfiumAutoError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

// ── Cache directory ──────────────────────────────────────────────────────────

/// The per-version directory holding the downloaded library.
///
/// `~/.cache/pdf-textract/pdfium-{VERSION}/` on Linux, the platform cache
/// folder elsewhere, or `$PDFIUM_AUTO_CACHE_DIR/pdfium-{VERSION}/`.
pub fn cache_dir() -> PathBuf {
    cache_dir_from(std::env::var_os(CACHE_DIR_ENV))
}

fn cache_dir_from(override_root: Option<OsString>) -> PathBuf {
    let versioned = format!("pdfium-{PDFIUM_VERSION}");
    if let Some(root) = override_root.filter(|r| !r.is_empty()) {
        return PathBuf::from(root).join(versioned);
    }

    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_APP_DIR)
        .join(versioned)
}

// ── Public API ───────────────────────────────────────────────────────────────

static INSTALLED: OnceLock<PdfiumLibrary> = OnceLock::new();

/// Find an already-present library without any network access.
///
/// Returns `Ok(None)` when a download would be required.
pub fn locate() -> Result<Option<PdfiumLibrary>, PdfiumAutoError> {
    if let Some(found) = INSTALLED.get() {
        return Ok(Some(found.clone()));
    }

    if let Some(env_path) = std::env::var_os(LIB_PATH_ENV).map(PathBuf::from) {
        if env_path.is_file() {
            return Ok(Some(PdfiumLibrary {
                path: env_path,
                source: LibrarySource::Environment,
            }));
        }
        warn!(
            "{} points to '{}', which does not exist; falling back to the cache",
            LIB_PATH_ENV,
            env_path.display()
        );
    }

    let platform = current_platform()?;
    let cached = cache_dir().join(platform.file_name);
    if cached.is_file() {
        debug!("PDFium found in cache: {}", cached.display());
        return Ok(Some(PdfiumLibrary {
            path: cached,
            source: LibrarySource::Cache,
        }));
    }

    Ok(None)
}

/// Make sure a library is on disk, downloading it if [`locate`] finds none.
///
/// `on_progress` receives `(bytes_downloaded, total_bytes)` while the archive
/// streams in. The result is memoised for the lifetime of the process.
pub fn install(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PdfiumLibrary, PdfiumAutoError> {
    if let Some(found) = locate()? {
        let _ = INSTALLED.set(found.clone());
        return Ok(found);
    }

    let platform = current_platform()?;
    let dir = cache_dir();
    std::fs::create_dir_all(&dir).map_err(|source| PdfiumAutoError::CacheDir {
        path: dir.clone(),
        source,
    })?;

    let url = format!(
        "{}/chromium%2F{}/{}",
        BASE_URL, PDFIUM_VERSION, platform.archive
    );
    info!("Downloading PDFium {} from {}", PDFIUM_VERSION, url);

    let archive = download(&url, on_progress)?;
    let dest = dir.join(platform.file_name);
    unpack_member(&archive, platform.member, &dest)?;
    info!("PDFium installed at {}", dest.display());

    let library = PdfiumLibrary {
        path: dest,
        source: LibrarySource::Downloaded,
    };
    let _ = INSTALLED.set(library.clone());
    Ok(library)
}

/// [`install`] silently, then bind.
pub fn bind() -> Result<Pdfium, PdfiumAutoError> {
    let library = install(None)?;
    debug!("Binding PDFium from {}", library.path.display());
    library.bind()
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn download(
    url: &str,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, PdfiumAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumAutoError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumAutoError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PdfiumAutoError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(32 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; 64 * 1024];

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(cb) = on_progress {
                    cb(buf.len() as u64, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PdfiumAutoError::Download(format!("Read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Unpack one member of a `.tgz` to `dest`.
///
/// The bytes land in a `.part` sibling first and are renamed into place, so
/// an interrupted run never leaves a truncated library that [`locate`] would
/// later accept.
fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), PdfiumAutoError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut tar = Archive::new(GzDecoder::new(archive));
    let entries = tar
        .entries()
        .map_err(|e| PdfiumAutoError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| PdfiumAutoError::Extract(e.to_string()))?;
        let matches = entry
            .path()
            .map(|p| p.to_string_lossy() == member)
            .map_err(|e| PdfiumAutoError::Extract(e.to_string()))?;
        if !matches {
            continue;
        }

        let partial = dest.with_extension("part");
        entry
            .unpack(&partial)
            .map_err(|e| PdfiumAutoError::Extract(format!("Unpack failed: {e}")))?;
        std::fs::rename(&partial, dest)
            .map_err(|e| PdfiumAutoError::Extract(format!("Rename failed: {e}")))?;
        return Ok(());
    }

    Err(PdfiumAutoError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
