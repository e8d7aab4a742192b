//! Error types for the doclens library.
//!
//! One enum covers every failure mode, grouped the way the pipeline is
//! staged: configuration, acquisition, upload, analysis. Two variants carry
//! load-bearing `Display` strings — [`AnalysisError::UploadFailed`] and
//! [`AnalysisError::MissingFileId`] render exactly the
//! `Error uploading file: …` text the presentation layer shows, because
//! downstream consumers key off that literal prefix.
//!
//! Preview-decode failure is deliberately *not* represented here: a broken
//! preview never blocks analysis, so it surfaces as a `tracing::warn!` and
//! an absent preview instead of an error value.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the doclens library.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No API key on the config and none in the environment.
    ///
    /// Raised at [`crate::Analyzer::new`] time, before any HTTP call is
    /// possible.
    #[error("OpenAI API key not found in environment variable 'OPENAI_API_KEY'.\nSet it with: export OPENAI_API_KEY=sk-...")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Acquisition errors ────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension maps to no supported MIME type.
    #[error("Unsupported file type '.{extension}' for '{path}'\nSupported: jpg, jpeg, png, pdf.")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// Reading the input bytes failed for a reason other than the above.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// The Files endpoint answered with a status outside {200, 201}.
    ///
    /// The display format is part of the observable contract: the status
    /// code and response body appear verbatim.
    #[error("Error uploading file: {status} - {body}")]
    UploadFailed { status: u16, body: String },

    /// The upload response parsed but carried no string `id` field.
    #[error("Error uploading file: no file id returned: {body}")]
    MissingFileId { body: String },

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The HTTP request itself failed (network, TLS, timeout).
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The chat endpoint answered non-2xx.
    #[error("chat completion failed: {status} - {body}")]
    ChatFailed { status: u16, body: String },

    /// The chat response was valid JSON but not the shape we expect.
    #[error("malformed chat response: {detail}")]
    MalformedResponse { detail: String },

    /// The chat response carried no choices, or a choice with null content.
    #[error("chat response contained no message content")]
    EmptyResponse,
}

impl AnalysisError {
    /// True for the two upload-stage variants that short-circuit the
    /// pipeline before the chat call.
    pub fn is_upload_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::UploadFailed { .. } | AnalysisError::MissingFileId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failed_display_embeds_status_and_body() {
        let e = AnalysisError::UploadFailed {
            status: 400,
            body: r#"{"error":"bad file"}"#.into(),
        };
        assert_eq!(
            e.to_string(),
            r#"Error uploading file: 400 - {"error":"bad file"}"#
        );
    }

    #[test]
    fn missing_file_id_display_embeds_body() {
        let e = AnalysisError::MissingFileId {
            body: r#"{"object":"file"}"#.into(),
        };
        assert_eq!(
            e.to_string(),
            r#"Error uploading file: no file id returned: {"object":"file"}"#
        );
    }

    #[test]
    fn upload_error_classification() {
        let upload = AnalysisError::UploadFailed {
            status: 500,
            body: "oops".into(),
        };
        let missing = AnalysisError::MissingFileId { body: "{}".into() };
        let empty = AnalysisError::EmptyResponse;

        assert!(upload.is_upload_error());
        assert!(missing.is_upload_error());
        assert!(!empty.is_upload_error());
    }

    #[test]
    fn unsupported_file_type_names_extension() {
        let e = AnalysisError::UnsupportedFileType {
            path: PathBuf::from("scan.tiff"),
            extension: "tiff".into(),
        };
        assert!(e.to_string().contains(".tiff"));
        assert!(e.to_string().contains("jpg, jpeg, png, pdf"));
    }
}
