//! End-to-end controller tests over the Gemini gateway and a mock server

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smartstudy::controllers::{
    chat_failed, summary_failed, ChatController, ChatEvent, SchedulerController,
    SubmitOutcome, SummarizerController, SummarizerEvent, ViewState,
};
use smartstudy::providers::{GeminiGateway, ModelGateway};
use smartstudy::types::{Category, Intensity, Locale, Role, SchedulePreferences};

mod common;

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const STREAM_PATH: &str = "/v1beta/models/gemini-2.5-flash:streamGenerateContent";

fn gateway(server: &MockServer) -> Arc<dyn ModelGateway> {
    Arc::new(GeminiGateway::new(common::gemini_config(&server.uri())).unwrap())
}

#[tokio::test]
async fn test_summarizer_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::text_response("## Ý chính\n- OOP")),
        )
        .mount(&server)
        .await;

    let controller = SummarizerController::new(gateway(&server), Locale::Vi);
    controller.set_input("Lập trình hướng đối tượng").await;

    assert_eq!(controller.submit().await, SubmitOutcome::Completed);
    assert_eq!(controller.snapshot().await.summary, "## Ý chính\n- OOP");
}

#[tokio::test]
async fn test_summarizer_quota_error_renders_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let controller = SummarizerController::new(gateway(&server), Locale::Vi);
    controller.set_input("notes").await;

    assert_eq!(controller.submit().await, SubmitOutcome::Failed);
    let view = controller.snapshot().await;
    assert_eq!(view.summary, summary_failed(Locale::Vi));
    assert_eq!(view.state, ViewState::Idle);
}

#[tokio::test]
async fn test_summarizer_timeout_renders_fallback_and_returns_to_idle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::text_response("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway: Arc<dyn ModelGateway> =
        Arc::new(GeminiGateway::new(common::slow_gemini_config(&server.uri())).unwrap());
    let controller = SummarizerController::new(gateway, Locale::En);
    let mut events = controller.subscribe();
    controller.set_input("notes").await;

    assert_eq!(controller.submit().await, SubmitOutcome::Failed);

    let view = controller.snapshot().await;
    assert_eq!(view.summary, summary_failed(Locale::En));
    assert_eq!(view.state, ViewState::Idle);

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SummarizerEvent::StateChanged(ViewState::Error(_))) {
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test]
async fn test_chat_timeout_renders_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["late"]), "text/event-stream")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway: Arc<dyn ModelGateway> =
        Arc::new(GeminiGateway::new(common::slow_gemini_config(&server.uri())).unwrap());
    let chat = ChatController::new(gateway, Locale::En, false);
    chat.set_input("hi").await;

    assert_eq!(chat.send().await, SubmitOutcome::Failed);

    let view = chat.snapshot().await;
    let texts: Vec<&str> = view.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hi", chat_failed(Locale::En)]);
    assert_eq!(view.state, ViewState::Idle);
}

#[tokio::test]
async fn test_scheduler_java_basics_end_to_end() {
    let server = MockServer::start().await;
    let payload = r#"[{"time":"07:00 - 07:30","activity":"Breakfast","notes":"Eat well","category":"personal"}]"#;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::text_response(payload)))
        .expect(1)
        .mount(&server)
        .await;

    let controller = SchedulerController::new(gateway(&server), Locale::En);
    controller
        .set_preferences(SchedulePreferences {
            wake_time: "07:00".to_string(),
            sleep_time: "23:00".to_string(),
            subjects: "Java basics".to_string(),
            intensity: Intensity::Balanced,
        })
        .await;

    assert_eq!(controller.submit().await, SubmitOutcome::Completed);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    for value in ["07:00", "23:00", "Java basics", "balanced"] {
        assert!(prompt.contains(value), "prompt lacks {}", value);
    }

    let view = controller.snapshot().await;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].category, Category::Personal);
}

#[tokio::test]
async fn test_scheduler_malformed_payload_renders_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::text_response("{\"oops\": true}")),
        )
        .mount(&server)
        .await;

    let controller = SchedulerController::new(gateway(&server), Locale::En);
    controller
        .set_preferences(SchedulePreferences {
            subjects: "Math".to_string(),
            ..Default::default()
        })
        .await;

    assert_eq!(controller.submit().await, SubmitOutcome::Completed);
    let view = controller.snapshot().await;
    assert!(view.items.is_empty());
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_chat_streams_prefixes_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["Hel", "lo, ", "world"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let chat = ChatController::new(gateway(&server), Locale::En, true);
    let mut events = chat.subscribe();
    chat.set_input("Say hello").await;

    assert_eq!(chat.send().await, SubmitOutcome::Completed);

    let mut updates = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ChatEvent::MessageUpdated { text, .. } = event {
            updates.push(text);
        }
    }
    assert_eq!(updates, vec!["Hel", "Hello, ", "Hello, world"]);

    let view = chat.snapshot().await;
    assert_eq!(view.messages.len(), 3);
    assert_eq!(view.messages[2].role, Role::Assistant);
    assert_eq!(view.messages[2].text, "Hello, world");
}

#[tokio::test]
async fn test_chat_provider_error_appends_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "internal", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let chat = ChatController::new(gateway(&server), Locale::Vi, false);
    chat.set_input("Java là gì?").await;

    assert_eq!(chat.send().await, SubmitOutcome::Failed);

    let view = chat.snapshot().await;
    let texts: Vec<&str> = view.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Java là gì?", chat_failed(Locale::Vi)]);
}

#[tokio::test]
async fn test_chat_reset_starts_new_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(common::sse_body(&["ok"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let chat = ChatController::new(gateway(&server), Locale::En, true);
    chat.set_input("hi").await;
    chat.send().await;

    let before = chat.snapshot().await;
    assert_eq!(before.messages.len(), 3);

    chat.reset().await;
    let after = chat.snapshot().await;
    assert!(after.messages.is_empty());
    assert_ne!(after.session_id, before.session_id);

    // A fresh session sends no history
    chat.set_input("again").await;
    chat.send().await;
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_whitespace_stream_renders_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["\n", " "]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let chat = ChatController::new(gateway(&server), Locale::En, false);
    chat.set_input("hi").await;

    assert_eq!(chat.send().await, SubmitOutcome::Failed);

    let view = chat.snapshot().await;
    let texts: Vec<&str> = view.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hi", chat_failed(Locale::En)]);
}
