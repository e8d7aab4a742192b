//! Analysis entry points: the [`Analyzer`] and its convenience wrappers.
//!
//! ## Why an explicit `Analyzer`?
//!
//! The credential and the HTTP client are constructed once, up front, and
//! carried by value — not read from process-wide globals at call time.
//! That makes the failure order deterministic (a missing key fails at
//! construction, before any bytes are read or sent) and makes tests
//! trivial: build a config pointing `api_base` at a mock server and every
//! request the analyzer makes lands there.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::output::{AnalysisOutput, RequestStats};
use crate::pipeline::{acquire::UploadedDocument, chat, upload};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// A configured analysis client: credential, HTTP client, and config.
///
/// Cheap to clone-free share by reference; one instance can serve any
/// number of sequential requests. Each request owns its document, file
/// handle, and result independently — there is no shared mutable state.
pub struct Analyzer {
    config: AnalysisConfig,
    api_key: String,
    http: reqwest::Client,
}

impl Analyzer {
    /// Build an analyzer from a config.
    ///
    /// Resolves the credential (config field first, then `OPENAI_API_KEY`)
    /// and constructs the shared HTTP client with the configured timeout.
    ///
    /// # Errors
    /// [`AnalysisError::MissingApiKey`] when no non-empty credential is
    /// found — raised here, before any network call is possible.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let api_key = resolve_api_key(&config)?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(AnalysisError::Request)?;

        Ok(Self {
            config,
            api_key,
            http,
        })
    }

    /// The config this analyzer was built with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a document file on disk.
    ///
    /// Acquisition (MIME inference, preview decode) happens here; see
    /// [`UploadedDocument::from_path`] for the acquisition errors.
    pub async fn analyze_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let doc = UploadedDocument::from_path(path)?;
        self.analyze_document(&doc).await
    }

    /// Analyze raw bytes with a caller-declared MIME type.
    pub async fn analyze_bytes(
        &self,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        filename: Option<String>,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let doc = UploadedDocument::from_bytes(bytes, mime_type, filename);
        self.analyze_document(&doc).await
    }

    /// Analyze an already-acquired document.
    ///
    /// Exactly two outbound calls: upload, then chat. The chat request is
    /// only issued once the upload produced a file handle; an upload
    /// failure returns immediately with the upload error.
    pub async fn analyze_document(
        &self,
        doc: &UploadedDocument,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let total_start = Instant::now();
        info!(
            "Analyzing '{}' ({} bytes, {})",
            doc.filename,
            doc.bytes.len(),
            doc.mime_type
        );

        // ── Step 1: upload ───────────────────────────────────────────────
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_upload_start(&doc.filename, doc.bytes.len());
        }
        let upload_start = Instant::now();
        let handle =
            upload::upload_document(&self.http, &self.config.api_base, &self.api_key, doc).await?;
        let upload_duration_ms = upload_start.elapsed().as_millis() as u64;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_upload_complete(&handle.id);
        }

        // ── Step 2: chat ─────────────────────────────────────────────────
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_analysis_start();
        }
        let file_id = handle.id.clone();
        let chat_start = Instant::now();
        let outcome =
            chat::request_analysis(&self.http, &self.api_key, handle, &self.config).await?;
        let analysis_duration_ms = chat_start.elapsed().as_millis() as u64;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_analysis_complete(outcome.text.len());
        }

        info!(
            "Analysis complete: {} chars in {}ms",
            outcome.text.len(),
            total_start.elapsed().as_millis()
        );

        Ok(AnalysisOutput {
            text: outcome.text,
            file_id,
            model: self.config.model.clone(),
            stats: RequestStats {
                prompt_tokens: outcome.prompt_tokens,
                completion_tokens: outcome.completion_tokens,
                retries: outcome.retries,
                upload_duration_ms,
                analysis_duration_ms,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
            },
        })
    }
}

/// Resolve the bearer credential: config field first, then environment.
/// Empty strings count as absent in both places.
fn resolve_api_key(config: &AnalysisConfig) -> Result<String, AnalysisError> {
    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(AnalysisError::MissingApiKey),
    }
}

/// Analyze a document file with a one-shot analyzer.
///
/// Convenience wrapper for callers that don't need to reuse the client.
pub async fn analyze(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalysisError> {
    Analyzer::new(config.clone())?.analyze_path(path).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalysisError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalysisError::InvalidConfig(format!("failed to create tokio runtime: {e}")))?
        .block_on(analyze(path, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_wins_over_environment() {
        let config = AnalysisConfig::builder().api_key("sk-from-config").build().unwrap();
        assert_eq!(resolve_api_key(&config).unwrap(), "sk-from-config");
    }

    #[test]
    fn empty_config_key_counts_as_absent() {
        std::env::remove_var("OPENAI_API_KEY");
        let config = AnalysisConfig::builder().api_key("").build().unwrap();
        assert!(matches!(
            resolve_api_key(&config),
            Err(AnalysisError::MissingApiKey)
        ));
    }

    #[test]
    fn missing_key_fails_at_construction() {
        std::env::remove_var("OPENAI_API_KEY");
        let err = Analyzer::new(AnalysisConfig::default()).err().expect("must fail");
        assert!(matches!(err, AnalysisError::MissingApiKey));
    }
}
