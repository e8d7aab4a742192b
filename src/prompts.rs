//! Prompts for the document analysis request.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing what the assistant is asked
//!    requires editing exactly one place.
//!
//! 2. **Testability** — unit and integration tests can import and inspect
//!    the prompts directly without a live model behind them.
//!
//! Callers can override both via [`crate::config::AnalysisConfig`]; the
//! constants here are used only when no override is provided.

/// Default system message establishing the assistant's role.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful legal analysis assistant.";

/// Default instructional prompt sent as the text part of the user message,
/// alongside the file reference.
pub const DEFAULT_ANALYSIS_PROMPT: &str = r#"You are an assistant that analyzes documents.
Based on the uploaded document, identify all information needed to explain and complete this document.

Respond with:
1. what is the primary purpose of this document
2. who should fill out this document
3. a full list of all information someone would need in order to fill out the form in its entirety"#;
