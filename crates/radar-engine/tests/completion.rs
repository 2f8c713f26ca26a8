//! OpenAI completion client against a wiremock server.

use radar_engine::{CompletionError, CompletionService, OpenAiCompletion};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiCompletion {
    OpenAiCompletion::new("sk-test", "gpt-4o-mini", &format!("{}/v1/", server.uri()), 5)
        .expect("client construction should not fail")
}

fn chat_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn returns_parsed_json_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "usr" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body(r#"{"pain_point":"Manual invoicing"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let value = client(&server)
        .complete_json("sys", "usr")
        .await
        .expect("completion should succeed");

    assert_eq!(value["pain_point"], "Manual invoicing");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client(&server).complete_json("sys", "usr").await.unwrap_err();

    assert!(matches!(
        err,
        CompletionError::Status { status: 429, ref body } if body == "slow down"
    ));
}

#[tokio::test]
async fn blank_content_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("   ")))
        .mount(&server)
        .await;

    let err = client(&server).complete_json("sys", "usr").await.unwrap_err();

    assert!(matches!(err, CompletionError::Empty));
}

#[tokio::test]
async fn non_object_content_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("[1,2,3]")))
        .mount(&server)
        .await;

    let err = client(&server).complete_json("sys", "usr").await.unwrap_err();

    assert!(matches!(err, CompletionError::Json(_)));
}
