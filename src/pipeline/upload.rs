//! File upload: multipart POST to the Files endpoint → opaque file id.
//!
//! ## The purpose tag
//!
//! The Files endpoint requires a `purpose` field describing how the file
//! will be consumed, and it affects how the service indexes the upload:
//! `vision` for image content destined for vision models, `user_data` as
//! the generic tag for everything else (PDFs here). The choice is made
//! purely on the declared MIME prefix.
//!
//! ## Failure behaviour
//!
//! Any status outside {200, 201}, and any 2xx body without a string `id`,
//! is an upload error carrying the status and body verbatim. The caller
//! must not issue a chat request in that case — [`FileHandle`] is only
//! constructible from a successful upload, so the type system enforces it.

use crate::error::AnalysisError;
use crate::pipeline::acquire::UploadedDocument;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info};

/// The `purpose` tag sent with the multipart upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPurpose {
    /// Image content for vision-capable models.
    Vision,
    /// Generic user-supplied data (PDFs and anything non-image).
    UserData,
}

impl UploadPurpose {
    /// Select the purpose tag from a declared MIME type.
    pub fn for_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            UploadPurpose::Vision
        } else {
            UploadPurpose::UserData
        }
    }

    /// Wire representation expected by the Files endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadPurpose::Vision => "vision",
            UploadPurpose::UserData => "user_data",
        }
    }
}

/// Handle to a file stored on the remote service.
///
/// Owned by the current analysis request and referenced exactly once, in
/// the chat call that follows. This program never deletes the remote file;
/// its lifecycle belongs to the service.
#[derive(Debug, Clone)]
pub struct FileHandle {
    /// Opaque id assigned by the Files endpoint.
    pub id: String,
}

/// Upload a document and return the file handle.
///
/// Issues one multipart POST to `{api_base}/files` with fields `file`
/// (bytes, filename, MIME type) and `purpose`. Not retried: a rejection
/// here almost always means the payload or credential is the problem, and
/// resending the same bytes would only re-fail slowly.
pub async fn upload_document(
    http: &reqwest::Client,
    api_base: &str,
    api_key: &str,
    doc: &UploadedDocument,
) -> Result<FileHandle, AnalysisError> {
    let purpose = UploadPurpose::for_mime(&doc.mime_type);
    debug!(
        "Uploading '{}' ({} bytes, {}) with purpose '{}'",
        doc.filename,
        doc.bytes.len(),
        doc.mime_type,
        purpose.as_str()
    );

    let part = Part::bytes(doc.bytes.clone())
        .file_name(doc.filename.clone())
        .mime_str(&doc.mime_type)
        .map_err(|e| AnalysisError::InvalidConfig(format!("invalid MIME type: {e}")))?;
    let form = Form::new()
        .part("file", part)
        .text("purpose", purpose.as_str());

    let response = http
        .post(format!("{api_base}/files"))
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    if status != 200 && status != 201 {
        return Err(AnalysisError::UploadFailed { status, body });
    }

    let file_id = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from))
        .ok_or(AnalysisError::MissingFileId { body })?;

    info!("Uploaded '{}' as {}", doc.filename, file_id);
    Ok(FileHandle { id: file_id })
}
