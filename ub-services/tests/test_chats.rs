//! Integration tests for the chat lifecycle against a stub backend.

mod common;

use std::sync::{Arc, Mutex};

use serde_json::json;

use ub_core::error::UbError;
use ub_services::chat::{ChatOpened, ChatService};
use ub_services::event_bus::AppEvent;

fn service(base_url: &str) -> ChatService {
    ChatService::new(common::create_test_api(base_url), common::create_test_event_bus())
}

// ---- chat_exists ----

#[tokio::test]
async fn chat_exists_when_first_ordering_answers_200() {
    let server = common::StubServer::start(|req| {
        if req.decoded_path() == "/chats/getByBothUsers/ana@example.com/bomberos1" {
            (200, json!({"id": "c1", "users": ["ana@example.com", "bomberos1"]}).to_string())
        } else {
            (404, "{}".into())
        }
    })
    .await;

    assert!(service(&server.base_url())
        .chat_exists("ana@example.com", "bomberos1")
        .await
        .unwrap());
    // The reversed ordering is never needed.
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn chat_exists_checks_reversed_ordering() {
    let server = common::StubServer::start(|req| {
        if req.decoded_path() == "/chats/getByBothUsers/bomberos1/ana@example.com" {
            (200, "{}".into())
        } else {
            (404, "{}".into())
        }
    })
    .await;

    assert!(service(&server.base_url())
        .chat_exists("ana@example.com", "bomberos1")
        .await
        .unwrap());
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn chat_exists_is_false_when_no_ordering_answers_200() {
    // 404 for one ordering, 500 for the other: neither counts as existing.
    let server = common::StubServer::start(|req| {
        if req.decoded_path().ends_with("/bomberos1") {
            (404, "{}".into())
        } else {
            (500, "oops".into())
        }
    })
    .await;

    assert!(!service(&server.base_url())
        .chat_exists("ana@example.com", "bomberos1")
        .await
        .unwrap());
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn chat_exists_propagates_network_failure() {
    let base = common::dead_base_url().await;
    let err = service(&base).chat_exists("a", "b").await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn chat_lookup_encodes_path_segments() {
    let server = common::StubServer::start(|_| (404, "{}".into())).await;
    service(&server.base_url())
        .chat_exists("ana maria@example.com", "estación/1")
        .await
        .unwrap();

    let first = &server.requests()[0];
    assert!(!first.path.contains(' '));
    assert_eq!(
        first.decoded_path(),
        "/chats/getByBothUsers/ana maria@example.com/estación/1"
    );
}

// ---- open_chat ----

#[tokio::test]
async fn open_chat_creates_when_absent() {
    let server = common::StubServer::start(|req| match req.method.as_str() {
        "GET" => (404, "{}".into()),
        "POST" => (201, json!({"users": ["ana@example.com", "bomberos1"]}).to_string()),
        _ => (405, "{}".into()),
    })
    .await;
    let bus = common::create_test_event_bus();
    let mut events = bus.subscribe();
    let svc = ChatService::new(common::create_test_api(&server.base_url()), bus);

    let opened = svc.open_chat("ana@example.com", "bomberos1").await.unwrap();
    assert_eq!(
        opened,
        ChatOpened::Created(vec!["ana@example.com".into(), "bomberos1".into()])
    );

    let posts: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|r| r.is("POST", "/chats/"))
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json(),
        json!({"sender": "ana@example.com", "receiver": "bomberos1"})
    );

    assert_eq!(
        events.recv().await.unwrap(),
        AppEvent::ChatOpened {
            sender: "ana@example.com".into(),
            receiver: "bomberos1".into(),
            created: true,
        }
    );
}

#[tokio::test]
async fn open_chat_does_not_create_existing_chat() {
    let server = common::StubServer::start(|req| match req.method.as_str() {
        "GET" => (200, "{}".into()),
        _ => (500, "should not be called".into()),
    })
    .await;

    let opened = service(&server.base_url())
        .open_chat("ana@example.com", "bomberos1")
        .await
        .unwrap();
    assert_eq!(opened, ChatOpened::AlreadyExisted);
    assert!(server.requests().iter().all(|r| r.method == "GET"));
}

#[tokio::test]
async fn open_chat_treats_conflict_as_existing() {
    let server = common::StubServer::start(|req| match req.method.as_str() {
        "GET" => (404, "{}".into()),
        _ => (409, json!({"message": "chat already exists"}).to_string()),
    })
    .await;

    let opened = service(&server.base_url())
        .open_chat("ana@example.com", "bomberos1")
        .await
        .unwrap();
    assert_eq!(opened, ChatOpened::AlreadyExisted);
}

#[tokio::test]
async fn open_chat_accepts_empty_create_body() {
    let server = common::StubServer::start(|req| match req.method.as_str() {
        "GET" => (404, "{}".into()),
        _ => (201, String::new()),
    })
    .await;

    let opened = service(&server.base_url()).open_chat("a", "b").await.unwrap();
    assert!(opened.was_created());
}

#[tokio::test]
async fn open_chat_surfaces_create_failure() {
    let server = common::StubServer::start(|req| match req.method.as_str() {
        "GET" => (404, "{}".into()),
        _ => (500, json!({"message": "db down"}).to_string()),
    })
    .await;

    let err = service(&server.base_url()).open_chat("a", "b").await.unwrap_err();
    match err {
        UbError::ServerError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "db down");
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn open_chat_rejects_blank_participants() {
    let server = common::StubServer::start(|_| (200, "{}".into())).await;
    let err = service(&server.base_url()).open_chat("a", "  ").await.unwrap_err();
    assert!(matches!(err, UbError::Validation(_)));
    assert_eq!(server.request_count(), 0);
}

// ---- load_chats ----

#[tokio::test]
async fn load_chats_publishes_list() {
    let server = common::StubServer::start(|req| {
        assert_eq!(req.decoded_path(), "/chats/getByUsername/ana@example.com");
        (
            200,
            json!([
                {"id": "c1", "users": ["ana@example.com", "bomberos1"]},
                {"id": "c2", "users": ["ana@example.com"]}
            ])
            .to_string(),
        )
    })
    .await;
    let svc = service(&server.base_url());
    let mut rx = svc.subscribe();

    let view = svc.load_chats("ana@example.com").await;
    assert_eq!(view.chats.len(), 2);
    assert!(view.error.is_none());
    assert!(!view.loading);
    // Malformed chats stay in the listing.
    assert!(!view.chats[1].is_well_formed());

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), view);
}

#[tokio::test]
async fn load_chats_treats_404_as_empty() {
    let server = common::StubServer::start(|_| (404, json!({"message": "no chats"}).to_string())).await;
    let view = service(&server.base_url()).load_chats("nadie").await;
    assert!(view.chats.is_empty());
    assert!(view.error.is_none());
}

#[tokio::test]
async fn load_chats_reports_other_failures() {
    let server = common::StubServer::start(|_| (503, "unavailable".into())).await;
    let view = service(&server.base_url()).load_chats("ana").await;
    assert!(view.chats.is_empty());
    assert!(view
        .error
        .as_deref()
        .unwrap()
        .starts_with("failed to load chats: "));
}

// ---- delete_chat ----

#[tokio::test]
async fn delete_chat_removes_it_from_view() {
    let deleted = Arc::new(Mutex::new(false));
    let flag = deleted.clone();
    let server = common::StubServer::start(move |req| match req.method.as_str() {
        "DELETE" => {
            *flag.lock().unwrap() = true;
            (200, json!({"success": true, "message": "chat deleted"}).to_string())
        }
        _ => (
            200,
            json!([
                {"id": "c1", "users": ["ana", "bomberos1"]},
                {"id": "c2", "users": ["ana", "pnc11"]}
            ])
            .to_string(),
        ),
    })
    .await;
    let bus = common::create_test_event_bus();
    let mut events = bus.subscribe();
    let svc = ChatService::new(common::create_test_api(&server.base_url()), bus);

    svc.load_chats("ana").await;
    let message = svc.delete_chat("c1").await.unwrap();

    assert_eq!(message, "chat deleted");
    assert!(*deleted.lock().unwrap());
    assert!(server.requests().iter().any(|r| r.is("DELETE", "/chats/c1")));
    let ids: Vec<_> = svc.view().chats.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, ["c2"]);
    assert_eq!(
        events.recv().await.unwrap(),
        AppEvent::ChatDeleted { chat_id: "c1".into() }
    );
}

#[tokio::test]
async fn delete_chat_unsuccessful_reply_is_an_error() {
    let server = common::StubServer::start(|_| {
        (200, json!({"success": false, "message": "not allowed"}).to_string())
    })
    .await;

    let err = service(&server.base_url()).delete_chat("c1").await.unwrap_err();
    match err {
        UbError::SendFailed(message) => assert_eq!(message, "not allowed"),
        other => panic!("expected SendFailed, got {other:?}"),
    }
}
