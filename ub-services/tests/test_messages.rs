//! Integration tests for message dispatch and the live message view.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use ub_core::error::UbError;
use ub_live::{MessageSync, PollingSource, SubscriptionState};
use ub_services::event_bus::AppEvent;
use ub_services::message::MessageService;

fn service(base_url: &str, dir: &TempDir) -> MessageService {
    MessageService::new(
        common::create_test_api(base_url),
        common::create_test_event_bus(),
        dir.path().join("uploads"),
    )
}

fn accepted() -> String {
    json!({"success": true, "message": "message sent"}).to_string()
}

// ---- send_text ----

#[tokio::test]
async fn send_text_posts_message_request() {
    let server = common::StubServer::start(|_| (200, accepted())).await;
    let dir = TempDir::new().unwrap();
    let bus = common::create_test_event_bus();
    let mut events = bus.subscribe();
    let svc = MessageService::new(
        common::create_test_api(&server.base_url()),
        bus,
        dir.path().join("uploads"),
    );

    let reply = svc.send_text("c1", "ana@example.com", "Necesito ayuda").await.unwrap();
    assert_eq!(reply, "message sent");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is("POST", "/messages/"));
    assert_eq!(
        requests[0].json(),
        json!({
            "chatId": "c1",
            "sender": "ana@example.com",
            "type": "Texto",
            "position": "right",
            "data": "Necesito ayuda"
        })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        AppEvent::MessageSent { chat_id: "c1".into(), is_image: false }
    );
}

#[tokio::test]
async fn send_text_rejected_by_backend() {
    let server = common::StubServer::start(|_| {
        (200, json!({"success": false, "message": "chat closed"}).to_string())
    })
    .await;
    let dir = TempDir::new().unwrap();

    let err = service(&server.base_url(), &dir)
        .send_text("c1", "ana", "hola")
        .await
        .unwrap_err();
    match err {
        UbError::SendFailed(message) => assert_eq!(message, "chat closed"),
        other => panic!("expected SendFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn send_text_validates_before_any_request() {
    let server = common::StubServer::start(|_| (200, accepted())).await;
    let dir = TempDir::new().unwrap();
    let svc = service(&server.base_url(), &dir);

    assert!(matches!(
        svc.send_text("c1", "ana", "   ").await,
        Err(UbError::Validation(_))
    ));
    assert!(matches!(
        svc.send_text("", "ana", "hola").await,
        Err(UbError::Validation(_))
    ));
    assert_eq!(server.request_count(), 0);
}

// ---- send_image ----

#[tokio::test]
async fn send_image_uploads_multipart_and_removes_staged_copy() {
    let server = common::StubServer::start(|_| (200, accepted())).await;
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("incendio.jpg");
    std::fs::write(&image, b"\xFF\xD8\xFFfake-jpeg").unwrap();
    let svc = service(&server.base_url(), &dir);

    svc.send_image("c1", "ana@example.com", &image).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req.is("POST", "/messages/"));
    assert!(req
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = req.body_text();
    assert!(body.contains("name=\"chatId\""));
    assert!(body.contains("name=\"type\"\r\n\r\nImagen"));
    assert!(body.contains("name=\"position\"\r\n\r\nright"));
    assert!(body.contains("name=\"data\"; filename=\"incendio.jpg\""));
    assert!(body.contains("Content-Type: image/jpeg"));
    assert!(body.contains("fake-jpeg"));

    // The original stays, the staged copy is gone.
    assert!(image.exists());
    let staged: Vec<_> = std::fs::read_dir(svc.upload_dir()).unwrap().collect();
    assert!(staged.is_empty());
}

#[tokio::test]
async fn send_image_removes_staged_copy_on_failure() {
    let server = common::StubServer::start(|_| (500, "storage unavailable".into())).await;
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("foto.png");
    std::fs::write(&image, b"png-bytes").unwrap();
    let svc = service(&server.base_url(), &dir);

    let err = svc.send_image("c1", "ana", &image).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    let staged: Vec<_> = std::fs::read_dir(svc.upload_dir()).unwrap().collect();
    assert!(staged.is_empty());
}

#[tokio::test]
async fn send_image_missing_file_sends_nothing() {
    let server = common::StubServer::start(|_| (200, accepted())).await;
    let dir = TempDir::new().unwrap();
    let svc = service(&server.base_url(), &dir);

    let err = svc
        .send_image("c1", "ana", &dir.path().join("missing.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, UbError::Io(_)));
    assert_eq!(server.request_count(), 0);
}

// ---- live view over the polling source ----

#[tokio::test]
async fn polling_view_matches_remote_collection() {
    let server = common::StubServer::start(|req| {
        if req.path == "/messages/getByChat/c1" {
            (
                200,
                json!([
                    {"id": "m2", "chatId": "c1", "sender": "bomberos1", "data": "En camino", "timestamp": "2024-05-01T10:05:00Z", "type": "Texto", "position": "left"},
                    {"id": "m1", "chatId": "c1", "sender": "ana", "data": "Incendio", "timestamp": "2024-05-01T10:00:00Z", "type": "Texto", "position": "right"},
                    {"id": "x1", "chatId": "c2", "sender": "otro", "data": "ajeno", "timestamp": "2024-05-01T09:00:00Z"}
                ])
                .to_string(),
            )
        } else {
            (404, "{}".into())
        }
    })
    .await;
    let source = PollingSource::new(
        common::create_test_api(&server.base_url()),
        Duration::from_millis(50),
    );
    let sync = MessageSync::new(Arc::new(source));
    let mut rx = sync.subscribe();

    sync.load_messages("c1").unwrap();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.state == SubscriptionState::Live),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    let ids: Vec<_> = view.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2"]);
    sync.close();
}

#[tokio::test]
async fn polling_failure_ends_subscription() {
    let server = common::StubServer::start(|_| (500, "down".into())).await;
    let source = PollingSource::new(
        common::create_test_api(&server.base_url()),
        Duration::from_millis(20),
    );
    let sync = MessageSync::new(Arc::new(source));
    let mut rx = sync.subscribe();

    sync.load_messages("c1").unwrap();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.state == SubscriptionState::Failed),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(view.error.is_some());
    assert!(!view.loading);

    // No retry after the terminal error.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn polling_treats_missing_chat_as_empty() {
    let server = common::StubServer::start(|_| (404, json!({"message": "no messages"}).to_string())).await;
    let source = PollingSource::new(
        common::create_test_api(&server.base_url()),
        Duration::from_millis(50),
    );
    let sync = MessageSync::new(Arc::new(source));
    let mut rx = sync.subscribe();

    sync.load_messages("nuevo").unwrap();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.state == SubscriptionState::Live),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(view.messages.is_empty());
    assert!(view.error.is_none());
}
