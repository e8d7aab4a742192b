//! Output types: the analysis result and its display rendering.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// The result of a successful document analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The model's answer, verbatim from the first response choice.
    pub text: String,
    /// Id of the file created on the remote service. Not deleted by this
    /// program; kept here so callers can clean up remotely if they want to.
    pub file_id: String,
    /// Model that produced the answer.
    pub model: String,
    /// Request statistics.
    pub stats: RequestStats,
}

/// Timing and token accounting for one analysis request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Chat retries actually spent (0 under the default policy).
    pub retries: u32,
    pub upload_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Collapse an analysis outcome into one display string.
///
/// This is the presentation-boundary shim that preserves the observable
/// behaviour "something readable is always shown": success renders the
/// analysis text, upload failures render their own
/// `Error uploading file: …` message, and every other failure renders as
/// `Error during analysis: {error}`.
///
/// Library callers should match on the `Result` instead; only display code
/// should funnel through here.
pub fn display_result(result: &Result<AnalysisOutput, AnalysisError>) -> String {
    match result {
        Ok(output) => output.text.clone(),
        Err(e) if e.is_upload_error() => e.to_string(),
        Err(e) => format!("Error during analysis: {e}"),
    }
}
