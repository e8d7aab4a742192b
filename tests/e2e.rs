//! End-to-end integration tests for doclens.
//!
//! Both remote endpoints are mocked with [`wiremock`], so these tests
//! assert the full observable protocol — request counts, ordering, bodies,
//! and the rendered result strings — without a live API key or network.
//!
//! Run with:
//!   cargo test --test e2e

use doclens::{display_result, AnalysisConfig, Analyzer, UploadedDocument};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const ANALYSIS_TEXT: &str = "1. The primary purpose of this document is a rental application. \
2. Prospective tenants should fill it out. \
3. Full legal name, date of birth, current address, employer, monthly income, references.";

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([20, 20, 20, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode test PNG");
    buf
}

fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<<>>\n%%EOF\n".to_vec()
}

fn config_for(server: &MockServer) -> AnalysisConfig {
    AnalysisConfig::builder()
        .api_key("sk-test")
        .api_base(format!("{}/v1", server.uri()))
        .build()
        .expect("valid test config")
}

fn upload_ok(file_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": file_id,
        "object": "file",
        "purpose": "vision",
        "filename": "uploaded_document",
    }))
}

fn chat_ok(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 812, "completion_tokens": 96, "total_tokens": 908},
    }))
}

/// Count the received requests whose path ends with `suffix`.
async fn requests_to(server: &MockServer, suffix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().ends_with(suffix))
        .count()
}

/// The recorded upload request body, decoded lossily (multipart bodies mix
/// text fields with binary file content).
async fn upload_body(server: &MockServer) -> String {
    let received = server.received_requests().await.unwrap_or_default();
    let upload = received
        .iter()
        .find(|r| r.url.path().ends_with("/files"))
        .expect("upload request recorded");
    String::from_utf8_lossy(&upload.body).into_owned()
}

// ── Missing credential halts before any network call ────────────────────────

#[tokio::test]
async fn missing_credential_makes_zero_http_calls() {
    let server = MockServer::start().await;
    std::env::remove_var("OPENAI_API_KEY");

    let config = AnalysisConfig::builder()
        .api_base(format!("{}/v1", server.uri()))
        .build()
        .unwrap();

    let err = Analyzer::new(config).err().expect("construction must fail");
    assert!(err.to_string().contains("OPENAI_API_KEY"));

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "no HTTP call may be made without a key");
}

// ── Happy path: chat references the returned file id ────────────────────────

#[tokio::test]
async fn png_end_to_end_returns_text_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(upload_ok("file-123"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("file-123"))
        .respond_with(chat_ok(ANALYSIS_TEXT))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let doc = UploadedDocument::from_bytes(png_bytes(), "image/png", Some("scan.png".into()));
    assert!(doc.preview.is_some(), "valid PNG should decode for preview");

    let result = analyzer.analyze_document(&doc).await;
    let output = result.as_ref().expect("analysis should succeed");

    // The displayed result is the message text exactly, no error prefix.
    assert_eq!(output.text, ANALYSIS_TEXT);
    assert_eq!(display_result(&result), ANALYSIS_TEXT);

    let output = result.unwrap();
    assert_eq!(output.file_id, "file-123");
    assert_eq!(output.stats.prompt_tokens, 812);
    assert_eq!(output.stats.completion_tokens, 96);
    assert_eq!(output.stats.retries, 0);

    server.verify().await;
}

#[tokio::test]
async fn upload_carries_purpose_vision_for_images() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-img"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("ok"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    analyzer
        .analyze_bytes(png_bytes(), "image/png", Some("scan.png".into()))
        .await
        .expect("analysis should succeed");

    // The multipart body is partly binary (the PNG), so inspect it lossily
    // rather than through a string matcher.
    let body = upload_body(&server).await;
    assert!(body.contains("vision"), "purpose tag must be 'vision'");
    assert!(body.contains("scan.png"), "filename must be forwarded");
    assert!(body.contains("image/png"), "MIME type must be forwarded");

    server.verify().await;
}

#[tokio::test]
async fn upload_carries_purpose_user_data_for_pdfs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .and(body_string_contains("user_data"))
        .respond_with(upload_ok("file-pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("ok"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    analyzer
        .analyze_bytes(pdf_bytes(), "application/pdf", Some("form.pdf".into()))
        .await
        .expect("analysis should succeed");

    server.verify().await;
}

// ── Upload failure skips the chat call ──────────────────────────────────────

#[tokio::test]
async fn upload_http_error_skips_chat_and_preserves_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"bad file"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("should never be called"))
        .expect(0)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let result = analyzer
        .analyze_bytes(pdf_bytes(), "application/pdf", None)
        .await;

    assert!(result.is_err());
    assert_eq!(
        display_result(&result),
        r#"Error uploading file: 400 - {"error":"bad file"}"#
    );

    assert_eq!(requests_to(&server, "/chat/completions").await, 0);
    server.verify().await;
}

#[tokio::test]
async fn upload_response_without_id_skips_chat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"object":"file","status":"ok"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("should never be called"))
        .expect(0)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let result = analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await;

    let text = display_result(&result);
    assert!(
        text.starts_with("Error uploading file: no file id returned:"),
        "got: {text}"
    );
    assert!(text.contains(r#""object":"file""#), "body must appear verbatim");

    server.verify().await;
}

// ── Chat failures get the analysis prefix ───────────────────────────────────

#[tokio::test]
async fn chat_failure_renders_analysis_error_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-77"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let result = analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await;

    let text = display_result(&result);
    assert!(text.starts_with("Error during analysis: "), "got: {text}");
    assert!(text.contains("upstream exploded"));

    server.verify().await;
}

#[tokio::test]
async fn chat_malformed_response_is_an_analysis_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-88"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let result = analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await;

    assert!(display_result(&result).starts_with("Error during analysis: "));
}

// ── Retry policy: zero by default, explicit when configured ──────────────────

#[tokio::test]
async fn default_policy_sends_exactly_one_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-once"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let _ = analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await;

    server.verify().await;
}

#[tokio::test]
async fn configured_retries_reissue_the_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-retry"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = AnalysisConfig::builder()
        .api_key("sk-test")
        .api_base(format!("{}/v1", server.uri()))
        .max_retries(2)
        .retry_backoff_ms(1)
        .build()
        .unwrap();

    let analyzer = Analyzer::new(config).unwrap();
    let result = analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await;

    assert!(result.is_err(), "all attempts failed");
    server.verify().await;
}

// ── A broken preview never blocks the analysis ──────────────────────────────

#[tokio::test]
async fn undecodable_image_still_uploads_original_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-raw"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("analysis of the raw bytes"))
        .expect(1)
        .mount(&server)
        .await;

    let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x42];
    let doc = UploadedDocument::from_bytes(garbage.clone(), "image/png", None);
    assert!(doc.preview.is_none(), "garbage bytes cannot preview");

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    let output = analyzer
        .analyze_document(&doc)
        .await
        .expect("analysis proceeds without a preview");
    assert_eq!(output.text, "analysis of the raw bytes");

    // The upload body carried the original bytes unmodified.
    let received = server.received_requests().await.unwrap();
    let upload = received
        .iter()
        .find(|r| r.url.path().ends_with("/files"))
        .expect("upload request recorded");
    let window: &[u8] = &garbage;
    assert!(
        upload.body.windows(window.len()).any(|w| w == window),
        "multipart body must contain the original bytes"
    );
}

// ── Filename placeholder ─────────────────────────────────────────────────────

#[tokio::test]
async fn nameless_input_uses_placeholder_filename() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-anon"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok("ok"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(config_for(&server)).unwrap();
    analyzer
        .analyze_bytes(png_bytes(), "image/png", None)
        .await
        .expect("analysis should succeed");

    let body = upload_body(&server).await;
    assert!(
        body.contains("uploaded_document"),
        "placeholder filename must be forwarded"
    );

    server.verify().await;
}

// ── analyze() convenience path from disk ─────────────────────────────────────

#[tokio::test]
async fn analyze_from_path_infers_mime_and_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(upload_ok("file-disk"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_ok(ANALYSIS_TEXT))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("capture.jpg");
    // The JPEG encoder rejects alpha channels, so encode from RGB.
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    std::fs::write(&file, &buf).unwrap();

    let config = config_for(&server);
    let output = doclens::analyze(&file, &config).await.expect("analyze");
    assert_eq!(output.text, ANALYSIS_TEXT);

    let body = upload_body(&server).await;
    assert!(body.contains("vision"), "jpg maps to an image purpose");
    assert!(body.contains("image/jpeg"), "MIME inferred from extension");
}
