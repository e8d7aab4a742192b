//! CLI binary for doclens.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use doclens::{
    display_result, AnalysisConfig, AnalysisProgressCallback, Analyzer, ProgressCallback,
    UploadedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner whose message tracks the
/// upload → analysis lifecycle.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, filename: &str, bytes: usize) {
        self.bar
            .set_message(format!("Uploading {filename} ({bytes} bytes)…"));
    }

    fn on_upload_complete(&self, file_id: &str) {
        self.bar.set_message(format!("Uploaded as {file_id}"));
    }

    fn on_analysis_start(&self) {
        self.bar
            .set_message("Analyzing the document, please wait…".to_string());
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a scanned form
  doclens scan.png

  # Analyze a PDF
  doclens lease_application.pdf

  # Pipe captured bytes in (camera, screenshot tool, …)
  grim - | doclens - --mime image/png

  # Structured JSON output
  doclens form.pdf --json > result.json

  # Target an OpenAI-compatible gateway
  doclens form.jpg --api-base http://localhost:4000/v1

SUPPORTED INPUT TYPES:
  .jpg .jpeg    image/jpeg
  .png          image/png
  .pdf          application/pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY   Bearer credential (required)
  DOCLENS_MODEL    Override the chat model id
  DOCLENS_API_BASE Override the API base URL

SETUP:
  1. Set API key:  export OPENAI_API_KEY=sk-...
  2. Analyze:      doclens document.pdf
"#;

/// Analyze scanned documents and forms with a multimodal LLM.
#[derive(Parser, Debug)]
#[command(
    name = "doclens",
    version,
    about = "Analyze scanned documents and forms with a multimodal LLM",
    long_about = "Upload an image (JPEG/PNG) or PDF of a document and ask a vision-capable \
model what the document is for, who should fill it out, and which information is needed \
to complete it. Works against the OpenAI API or any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document file path, or '-' to read bytes from stdin.
    input: String,

    /// Declared MIME type for stdin input (required with '-').
    #[arg(long, value_parser = ["image/jpeg", "image/png", "application/pdf"])]
    mime: Option<String>,

    /// Chat model id.
    #[arg(long, env = "DOCLENS_MODEL")]
    model: Option<String>,

    /// API base URL (any OpenAI-compatible endpoint).
    #[arg(long, env = "DOCLENS_API_BASE")]
    api_base: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DOCLENS_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Path to a text file containing a custom instructional prompt.
    #[arg(long, env = "DOCLENS_PROMPT")]
    prompt: Option<PathBuf>,

    /// Retries on a failed chat call.
    #[arg(long, env = "DOCLENS_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-HTTP-call timeout in seconds.
    #[arg(long, env = "DOCLENS_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output structured JSON (AnalysisOutput) instead of plain text.
    #[arg(long, env = "DOCLENS_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCLENS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCLENS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "DOCLENS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Acquire the document ─────────────────────────────────────────────
    let doc = acquire_document(&cli)?;

    // Preview summary: dimensions for decodable images, a static notice
    // for PDFs. A missing preview already warned via tracing.
    if !cli.quiet && !cli.json {
        if doc.is_pdf() {
            eprintln!("{}", dim("PDF file uploaded."));
        } else if let Some(ref preview) = doc.preview {
            eprintln!(
                "{}",
                dim(&format!(
                    "{} — {}×{} {}",
                    doc.filename,
                    preview.width(),
                    preview.height(),
                    doc.mime_type
                ))
            );
        }
    }

    // ── Build the analyzer ───────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };

    let config = build_config(&cli, progress.clone().map(|p| p as ProgressCallback)).await?;
    let analyzer = Analyzer::new(config).context("Failed to initialise the analysis client")?;

    // ── Run the analysis ─────────────────────────────────────────────────
    let result = analyzer.analyze_document(&doc).await;

    if let Some(ref p) = progress {
        p.finish();
    }

    match result {
        Ok(output) => {
            if cli.json {
                let json = serde_json::to_string_pretty(&output)
                    .context("Failed to serialise output")?;
                println!("{json}");
            } else {
                if !cli.quiet {
                    eprintln!("{} {}", green("✔"), bold("Analysis Complete"));
                }
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(output.text.as_bytes())
                    .context("Failed to write to stdout")?;
                if !output.text.ends_with('\n') {
                    handle.write_all(b"\n").ok();
                }
                if !cli.quiet {
                    eprintln!(
                        "   {}",
                        dim(&format!(
                            "{} tokens in / {} tokens out — {}ms total",
                            output.stats.prompt_tokens,
                            output.stats.completion_tokens,
                            output.stats.total_duration_ms
                        ))
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            // Always show something readable, then exit non-zero so
            // scripts can tell the difference.
            let result: std::result::Result<doclens::AnalysisOutput, _> = Err(e);
            eprintln!("{} {}", red("✘"), display_result(&result));
            std::process::exit(1);
        }
    }
}

/// Acquire the document from the path argument or stdin.
fn acquire_document(cli: &Cli) -> Result<UploadedDocument> {
    if cli.input == "-" {
        let mime = cli
            .mime
            .clone()
            .context("--mime is required when reading from stdin")?;
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read document bytes from stdin")?;
        anyhow::ensure!(!bytes.is_empty(), "stdin carried no document bytes");
        Ok(UploadedDocument::from_bytes(bytes, mime, None))
    } else {
        UploadedDocument::from_path(&cli.input)
            .with_context(|| format!("Failed to read document '{}'", cli.input))
    }
}

/// Map CLI args to `AnalysisConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let system_prompt = match cli.system_prompt {
        Some(ref path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {path:?}"))?,
        ),
        None => None,
    };
    let prompt = match cli.prompt {
        Some(ref path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt from {path:?}"))?,
        ),
        None => None,
    };

    let mut builder = AnalysisConfig::builder()
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref base) = cli.api_base {
        builder = builder.api_base(base.clone());
    }
    if let Some(sp) = system_prompt {
        builder = builder.system_prompt(sp);
    }
    if let Some(p) = prompt {
        builder = builder.prompt(p);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
