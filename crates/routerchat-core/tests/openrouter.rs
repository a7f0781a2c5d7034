//! HTTP-level behavior of the completion client against a mock endpoint.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use routerchat_core::{default_transcript, CompletionError, Message, OpenRouterClient, Settings};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        api_key: "sk-test".to_string(),
        api_url: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        referrer: "https://referrer.example".to_string(),
        title: "Test Title".to_string(),
        timeout: Duration::from_secs(5),
        history_path: PathBuf::from("unused.json"),
    }
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn request_carries_headers_model_and_full_transcript() {
    let server = MockServer::start().await;
    let mut messages = default_transcript();
    messages.push(Message::user("hello"));

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(bearer_token("sk-test"))
        .and(header("HTTP-Referer", "https://referrer.example"))
        .and(header("X-Title", "Test Title"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .and(body_json(json!({
            "model": "openai/gpt-4o",
            "messages": [
                { "role": "system", "content": "You are a friendly and helpful assistant." },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(reply("hi there"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(&settings_for(&server)).unwrap();
    let text = client.complete(&messages, "openai/gpt-4o").await.unwrap();

    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn unauthorized_status_maps_to_remediation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "No auth credentials found", "code": 401 }
        })))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(&settings_for(&server)).unwrap();
    let err = client
        .complete(&default_transcript(), "openai/gpt-4o")
        .await
        .unwrap_err();

    match &err {
        CompletionError::Unauthorized { status, body } => {
            assert_eq!(*status, StatusCode::UNAUTHORIZED);
            assert!(body.contains("No auth credentials found"));
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    assert!(err.to_string().contains("OPENROUTER_API_KEY"));
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(&settings_for(&server)).unwrap();
    let err = client
        .complete(&default_transcript(), "openai/gpt-4o")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CompletionError::Status { status, ref body }
            if status == StatusCode::BAD_GATEWAY && body == "upstream unavailable"
    ));
}

#[tokio::test]
async fn body_without_choices_is_echoed_raw() {
    let server = MockServer::start().await;
    let raw = r#"{"id":"gen-1","object":"chat.completion"}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(&settings_for(&server)).unwrap();
    let err = client
        .complete(&default_transcript(), "openai/gpt-4o")
        .await
        .unwrap_err();

    assert!(matches!(&err, CompletionError::UnexpectedResponse { raw: echoed } if echoed == raw));
    assert!(err.to_string().contains(raw));
}

#[tokio::test]
async fn slow_endpoint_hits_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.timeout = Duration::from_millis(200);
    let client = OpenRouterClient::new(&settings).unwrap();

    let err = client
        .complete(&default_transcript(), "openai/gpt-4o")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Transport(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn invalid_utf8_in_reply_is_replaced_visibly() {
    let server = MockServer::start().await;
    let mut body = br#"{"choices":[{"message":{"content":"caf"#.to_vec();
    body.push(0xff);
    body.extend_from_slice(br#""}}]}"#);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(&settings_for(&server)).unwrap();
    let text = client
        .complete(&default_transcript(), "openai/gpt-4o")
        .await
        .unwrap();

    assert_eq!(text, "caf\u{FFFD}");
}
