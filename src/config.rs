//! Configuration types for document analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to construct an [`crate::Analyzer`] for tests with a fake endpoint
//! and to see at a glance what two runs differed on.
//!
//! # Design choice: explicit over ambient
//! The credential, the endpoint base, the timeout, and the retry policy are
//! all plain fields with documented defaults. Nothing is inherited silently
//! from library defaults or hidden process-wide state; the only environment
//! read is the `OPENAI_API_KEY` fallback, and that happens once, at
//! `Analyzer` construction time.

use crate::error::AnalysisError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default API base. Override via the builder to target a proxy or a mock
/// server in tests.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default model identifier for the chat request.
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Configuration for a document analysis request.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use doclens::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-5-nano")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Bearer credential for both API calls. If `None`, the `OPENAI_API_KEY`
    /// environment variable is read when the [`crate::Analyzer`] is built;
    /// missing or empty in both places is a fatal configuration error.
    pub api_key: Option<String>,

    /// Base URL for the Files and Chat endpoints. Default: [`DEFAULT_API_BASE`].
    ///
    /// Tests point this at a local mock server; production callers can point
    /// it at an OpenAI-compatible gateway. Trailing slashes are trimmed.
    pub api_base: String,

    /// Chat model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Custom system prompt. If None, uses built-in default.
    pub system_prompt: Option<String>,

    /// Custom instructional prompt (the text part of the user message).
    /// If None, uses built-in default.
    pub prompt: Option<String>,

    /// Maximum retry attempts on a failed chat call. Default: 0.
    ///
    /// Zero is a deliberate policy, not an omission: a user sitting in front
    /// of the tool is better served by a fast, readable failure than by the
    /// request silently taking four times as long. Callers who batch in the
    /// background can raise this. Upload failures are never retried — a 4xx
    /// from the Files endpoint means the payload itself is the problem.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Only consulted when `max_retries > 0`. Doubles after each attempt:
    /// 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-HTTP-call timeout in seconds. Default: 60.
    ///
    /// Applied to the shared `reqwest::Client`, so it covers both the upload
    /// and the chat call individually.
    pub api_timeout_secs: u64,

    /// Progress callback for upload/analysis lifecycle events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            prompt: None,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The key is redacted; everything else is safe to log.
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| "<custom>"))
            .field("prompt", &self.prompt.as_ref().map(|_| "<custom>"))
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<AnalysisConfig, AnalysisError> {
        while self.config.api_base.ends_with('/') {
            self.config.api_base.pop();
        }
        if self.config.api_base.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        if self.config.model.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
