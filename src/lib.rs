//! # doclens
//!
//! Analyze scanned documents and forms with a multimodal LLM.
//!
//! ## Why this crate?
//!
//! Paper forms are opaque: a scan or a phone photo tells you nothing about
//! what the document is for, who is supposed to fill it out, or which pieces
//! of information you need to gather before you can complete it. Instead of
//! local OCR and heuristics, this crate hands the raw file to OpenAI's Files
//! endpoint and asks a vision-capable model those three questions directly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image / PDF
//!  │
//!  ├─ 1. Acquire  read bytes, branch on MIME type, decode optional preview
//!  ├─ 2. Upload   multipart POST to /files → opaque file_id
//!  ├─ 3. Chat     /chat/completions referencing the file_id
//!  └─ 4. Output   analysis text + request stats
//! ```
//!
//! Exactly two outbound HTTP calls per analysis, and the second is never
//! issued unless the first returned a usable file id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doclens::{Analyzer, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENAI_API_KEY unless set on the config
//!     let analyzer = Analyzer::new(AnalysisConfig::default())?;
//!     let output = analyzer.analyze_path("lease_application.pdf").await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doclens` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! doclens = { version = "0.3", default-features = false }
//! ```
//!
//! ## Error Channel
//!
//! The library returns a tagged `Result<AnalysisOutput, AnalysisError>`, so
//! callers can never mistake an error description for a real analysis. The
//! legacy "always show something readable" behaviour lives only at the
//! presentation boundary: [`display_result`] collapses any outcome into one
//! display string, using the `Error uploading file:` / `Error during
//! analysis:` prefixes for failures.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_sync, Analyzer};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::AnalysisError;
pub use output::{display_result, AnalysisOutput, RequestStats};
pub use pipeline::acquire::UploadedDocument;
pub use pipeline::upload::{FileHandle, UploadPurpose};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
