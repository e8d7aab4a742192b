//! Chat completion: reference the uploaded file and extract the reply text.
//!
//! This module is intentionally thin — the prompt text lives in
//! [`crate::prompts`] so it can change without touching wire-format or
//! retry logic here.
//!
//! ## Message Layout
//!
//! The request contains (in order):
//! 1. **System message** — plain string content establishing the
//!    assistant's role
//! 2. **User message** — a two-part content array: the instructional text,
//!    then `{type: "file", file: {file_id}}`
//!
//! Only the file id is forwarded. The chat endpoint rejects extra fields
//! in the file object (a MIME type, for instance), so the reference stays
//! minimal by contract, not by accident.
//!
//! ## Retry Strategy
//!
//! The same exponential-backoff loop shape used for any transient-prone
//! API call (`retry_backoff_ms * 2^attempt`), except the configured retry
//! count defaults to zero — one attempt, then a typed error.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::upload::FileHandle;
use crate::prompts::{DEFAULT_ANALYSIS_PROMPT, DEFAULT_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Content<'a>,
}

/// A message body is either a bare string (system message) or an array of
/// typed parts (user message carrying the file reference).
#[derive(Serialize)]
#[serde(untagged)]
enum Content<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    File { file: FileReference<'a> },
}

#[derive(Serialize)]
struct FileReference<'a> {
    file_id: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ── Public surface ───────────────────────────────────────────────────────

/// A successful chat completion, before being folded into
/// [`crate::output::AnalysisOutput`].
pub struct ChatOutcome {
    /// The first choice's message text, verbatim.
    pub text: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Retries actually spent (0 with the default policy).
    pub retries: u32,
}

/// Ask the model about the uploaded document.
///
/// Consumes the [`FileHandle`] by design: the handle is scoped to one
/// analysis request and referenced exactly once.
pub async fn request_analysis(
    http: &reqwest::Client,
    api_key: &str,
    handle: FileHandle,
    config: &AnalysisConfig,
) -> Result<ChatOutcome, AnalysisError> {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let prompt = config.prompt.as_deref().unwrap_or(DEFAULT_ANALYSIS_PROMPT);

    let request = ChatRequest {
        model: &config.model,
        messages: vec![
            Message {
                role: "system",
                content: Content::Text(system_prompt),
            },
            Message {
                role: "user",
                content: Content::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::File {
                        file: FileReference {
                            file_id: &handle.id,
                        },
                    },
                ]),
            },
        ],
    };

    let url = format!("{}/chat/completions", config.api_base);
    let mut last_err: Option<AnalysisError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Chat request: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match send_once(http, &url, api_key, &request).await {
            Ok(mut outcome) => {
                outcome.retries = attempt;
                debug!(
                    "Chat response: {} in / {} out tokens, {} chars",
                    outcome.prompt_tokens,
                    outcome.completion_tokens,
                    outcome.text.len()
                );
                return Ok(outcome);
            }
            Err(e) => {
                warn!("Chat request attempt {} failed: {e}", attempt + 1);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or(AnalysisError::EmptyResponse))
}

/// One chat-completion round trip, no retries.
async fn send_once(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &ChatRequest<'_>,
) -> Result<ChatOutcome, AnalysisError> {
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    if !(200..300).contains(&status) {
        return Err(AnalysisError::ChatFailed { status, body });
    }

    let parsed: ChatResponse =
        serde_json::from_str(&body).map_err(|e| AnalysisError::MalformedResponse {
            detail: e.to_string(),
        })?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(AnalysisError::EmptyResponse)?;

    let usage = parsed.usage.unwrap_or_default();

    Ok(ChatOutcome {
        text,
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        retries: 0,
    })
}
