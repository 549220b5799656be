//! Input resolution: turn a user-supplied path or URL into a [`RawDocument`].
//!
//! The document format is inferred from the file extension and restricted to
//! pdf, png, jpg and jpeg. URLs are downloaded into a `TempDir` that lives as
//! long as the [`ResolvedInput`], so the file is removed once the run ends,
//! even on panic. PDFs are checked for the `%PDF` magic bytes before they
//! reach pdfium, so a mislabelled file fails with a clear error.

use crate::error::TranscriptError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Raster formats accepted as direct OCR input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// Format discriminator for a transcript file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Image(ImageKind),
}

impl DocumentFormat {
    /// Infer the format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "png" => Some(DocumentFormat::Image(ImageKind::Png)),
            "jpg" | "jpeg" => Some(DocumentFormat::Image(ImageKind::Jpeg)),
            _ => None,
        }
    }

    /// Infer the format from an HTTP `Content-Type` value.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(DocumentFormat::Pdf),
            "image/png" => Some(DocumentFormat::Image(ImageKind::Png)),
            "image/jpeg" | "image/jpg" => Some(DocumentFormat::Image(ImageKind::Jpeg)),
            _ => None,
        }
    }

    /// Canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Image(ImageKind::Png) => "png",
            DocumentFormat::Image(ImageKind::Jpeg) => "jpg",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A validated transcript file on the local file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    path: PathBuf,
    format: DocumentFormat,
}

impl RawDocument {
    /// Validate a local file and infer its format from the extension.
    ///
    /// # Errors
    /// * [`TranscriptError::InvalidInput`]: empty path or a directory
    /// * [`TranscriptError::UnsupportedFormat`]: extension not pdf/png/jpg/jpeg
    /// * [`TranscriptError::FileNotFound`] / [`TranscriptError::PermissionDenied`]
    /// * [`TranscriptError::NotAPdf`]: `.pdf` file without the `%PDF` header
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(TranscriptError::InvalidInput {
                input: String::new(),
                reason: "empty path".into(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = DocumentFormat::from_extension(extension).ok_or_else(|| {
            TranscriptError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: extension.to_string(),
            }
        })?;

        Self::with_format(path, format)
    }

    /// Validate a local file whose format is already known (e.g. a temp file
    /// written from a byte buffer).
    pub fn with_format(
        path: impl AsRef<Path>,
        format: DocumentFormat,
    ) -> Result<Self, TranscriptError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(TranscriptError::FileNotFound { path });
        }
        if path.is_dir() {
            return Err(TranscriptError::InvalidInput {
                input: path.display().to_string(),
                reason: "is a directory".into(),
            });
        }

        match std::fs::File::open(&path) {
            Ok(mut f) => {
                if format == DocumentFormat::Pdf {
                    let mut magic = [0u8; 4];
                    if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                        return Err(TranscriptError::NotAPdf { path, magic });
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(TranscriptError::PermissionDenied { path });
            }
            Err(_) => {
                return Err(TranscriptError::FileNotFound { path });
            }
        }

        debug!("Resolved local {} transcript: {}", format, path.display());
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

/// The resolved input, either a local file or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(RawDocument),
    /// Input was a URL; the file lives in a temp directory that is removed
    /// when this value is dropped.
    Downloaded {
        document: RawDocument,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    pub fn document(&self) -> &RawDocument {
        match self {
            ResolvedInput::Local(d) => d,
            ResolvedInput::Downloaded { document, .. } => document,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local transcript file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, TranscriptError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TranscriptError::InvalidInput {
            input: input.to_string(),
            reason: "empty document reference".into(),
        });
    }

    if is_url(trimmed) {
        download_url(trimmed, timeout_secs).await
    } else {
        RawDocument::open(trimmed).map(ResolvedInput::Local)
    }
}

/// Download a URL to a temporary directory.
///
/// The format comes from the URL path extension, falling back to the
/// response `Content-Type`.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, TranscriptError> {
    info!("Downloading transcript from: {}", url);

    let parsed = reqwest::Url::parse(url).map_err(|e| TranscriptError::InvalidInput {
        input: url.to_string(),
        reason: e.to_string(),
    })?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TranscriptError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(parsed.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            TranscriptError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            TranscriptError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(TranscriptError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let url_name = last_path_segment(&parsed);
    let format = url_name
        .as_deref()
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .and_then(DocumentFormat::from_extension)
        .or_else(|| {
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(DocumentFormat::from_mime)
        })
        .ok_or_else(|| TranscriptError::UnsupportedFormat {
            path: PathBuf::from(url_name.clone().unwrap_or_else(|| url.to_string())),
            extension: String::new(),
        })?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TranscriptError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let temp_dir = TempDir::new().map_err(|e| TranscriptError::Internal(e.to_string()))?;
    let file_path = temp_dir
        .path()
        .join(format!("transcript.{}", format.extension()));

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| TranscriptError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    let document = RawDocument::with_format(&file_path, format)?;
    Ok(ResolvedInput::Downloaded {
        document,
        _temp_dir: temp_dir,
    })
}

fn last_path_segment(url: &reqwest::Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
