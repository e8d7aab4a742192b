//! Progress-callback trait for analysis lifecycle events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through upload and analysis.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal spinner, a GUI status line, or a log
//! record without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so an
//! implementation can be shared with other tasks while a request is in
//! flight.

use std::sync::Arc;

/// Called by the pipeline as an analysis request progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for a single request arrive in order:
/// `on_upload_start` → `on_upload_complete` → `on_analysis_start` →
/// `on_analysis_complete`. When the upload fails, the analysis events are
/// never fired.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called just before the multipart upload is sent.
    ///
    /// # Arguments
    /// * `filename` — name the file will carry on the remote service
    /// * `bytes`    — payload size
    fn on_upload_start(&self, filename: &str, bytes: usize) {
        let _ = (filename, bytes);
    }

    /// Called when the Files endpoint returned a usable file id.
    fn on_upload_complete(&self, file_id: &str) {
        let _ = file_id;
    }

    /// Called just before the chat request is sent.
    fn on_analysis_start(&self) {}

    /// Called when the chat response text has been extracted.
    ///
    /// # Arguments
    /// * `text_len` — byte length of the analysis text
    fn on_analysis_complete(&self, text_len: usize) {
        let _ = text_len;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
