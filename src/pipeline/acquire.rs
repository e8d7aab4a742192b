//! Input acquisition: bytes, MIME type, filename, optional preview.
//!
//! ## Trust boundary
//!
//! The MIME type is *declared*, never sniffed. For paths it comes from the
//! extension; for raw bytes it comes from the caller. The remote service
//! does its own validation, and a wrong declaration produces at worst an
//! upload rejection that surfaces verbatim — so content sniffing here would
//! add a second, subtly different opinion without removing any failure mode.
//!
//! ## Preview decoding
//!
//! Non-PDF inputs are decoded with the `image` crate so a front-end can show
//! the user what they are about to analyze. A failed decode is not an error:
//! the bytes may still be a perfectly valid upload (e.g. a JPEG flavour the
//! decoder rejects), so we warn and continue with `preview = None`. For
//! PDFs no decode is ever attempted, whatever the bytes contain.

use crate::error::AnalysisError;
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, warn};

/// Filename reported to the remote service when the input source exposes
/// none (raw bytes, stdin).
pub const DEFAULT_FILENAME: &str = "uploaded_document";

/// A document ready for upload: raw bytes plus the metadata the Files
/// endpoint wants, and an optional decoded preview for display.
///
/// Request-scoped and immutable: build one, analyze it, drop it. Nothing is
/// cached across requests.
#[derive(Debug)]
pub struct UploadedDocument {
    /// Raw file content, passed to the upload stage untouched.
    pub bytes: Vec<u8>,
    /// Declared MIME type (`image/jpeg`, `image/png`, or `application/pdf`).
    pub mime_type: String,
    /// Name the file will carry on the remote service.
    pub filename: String,
    /// Decoded preview. `None` for PDFs and for images that failed to decode.
    pub preview: Option<DynamicImage>,
}

impl UploadedDocument {
    /// Acquire a document from a file on disk, inferring the MIME type from
    /// the extension.
    ///
    /// # Errors
    /// * [`AnalysisError::FileNotFound`] / [`AnalysisError::PermissionDenied`] /
    ///   [`AnalysisError::ReadFailed`] for I/O problems
    /// * [`AnalysisError::UnsupportedFileType`] for extensions outside
    ///   `jpg|jpeg|png|pdf`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mime_type = mime_for_extension(&extension).ok_or_else(|| {
            AnalysisError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension: extension.clone(),
            }
        })?;

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AnalysisError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => AnalysisError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AnalysisError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();

        debug!(
            "Acquired '{}': {} bytes, {}",
            filename,
            bytes.len(),
            mime_type
        );

        Ok(Self::from_bytes(bytes, mime_type, Some(filename)))
    }

    /// Acquire a document from raw bytes with a caller-declared MIME type.
    ///
    /// `filename` falls back to [`DEFAULT_FILENAME`] when the source exposes
    /// none. Infallible: bad bytes only cost the preview.
    pub fn from_bytes(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        filename: Option<String>,
    ) -> Self {
        let mime_type = mime_type.into();
        let preview = decode_preview(&bytes, &mime_type);

        Self {
            bytes,
            mime_type,
            filename: filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            preview,
        }
    }

    /// True when the declared MIME type is `application/pdf`.
    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }
}

/// Map a lowercase file extension to its MIME type.
///
/// The supported set is exactly what the picker accepts: `jpg`, `jpeg`,
/// `png`, `pdf`.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Decode a preview image for non-PDF inputs.
///
/// PDFs skip the decoder entirely. A failed decode warns and returns `None`
/// — the analysis proceeds with the original bytes either way.
fn decode_preview(bytes: &[u8], mime_type: &str) -> Option<DynamicImage> {
    if mime_type == "application/pdf" {
        return None;
    }

    match image::load_from_memory(bytes) {
        Ok(img) => {
            debug!("Decoded preview: {}x{}", img.width(), img.height());
            Some(img)
        }
        Err(e) => {
            warn!("Could not open the image for preview: {e}");
            None
        }
    }
}
