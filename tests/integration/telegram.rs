//! Telegram client and command handler against a mocked Bot API

use oi_scanner::error::{DeliveryError, StoreError};
use oi_scanner::services::notifier::Notifier;
use oi_scanner::services::telegram::commands::{SUBSCRIBED_REPLY, UNSUBSCRIBED_REPLY};
use oi_scanner::services::telegram::{Command, CommandHandler, TelegramClient};
use oi_scanner::subscribers::{SubscriberRegistry, SubscriberStore};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:test-token";

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(server.uri(), TOKEN, Duration::from_secs(5)).expect("client")
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {"message_id": 1}}))
}

#[derive(Default)]
struct NullStore(Mutex<HashSet<i64>>);

#[async_trait::async_trait]
impl SubscriberStore for NullStore {
    async fn load(&self) -> Result<HashSet<i64>, StoreError> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn save(&self, subscribers: &HashSet<i64>) -> Result<(), StoreError> {
        *self.0.lock().unwrap() = subscribers.clone();
        Ok(())
    }
}

#[tokio::test]
async fn send_message_posts_html_to_bot_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "text": "<b>hi</b>",
            "parse_mode": "HTML"
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client(&server).send_message(42, "<b>hi</b>").await.unwrap();
}

#[tokio::test]
async fn rejected_message_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let err = client(&server).send_message(9, "x").await.unwrap_err();
    match err {
        DeliveryError::Rejected { chat_id, description } => {
            assert_eq!(chat_id, 9);
            assert!(description.contains("blocked"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn broadcast_continues_past_failed_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({"chat_id": 2})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ok())
        .mount(&server)
        .await;

    let report = client(&server).broadcast(&[1, 2, 3], "alert").await;

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 2);
    assert_eq!(report.attempted(), 3);
}

#[tokio::test]
async fn get_updates_passes_offset_and_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(query_param("offset", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {"update_id": 11, "message": {"message_id": 5, "chat": {"id": 77, "type": "private"}, "text": "/start"}},
                {"update_id": 12, "edited_message": {"message_id": 6}}
            ]
        })))
        .mount(&server)
        .await;

    let updates = client(&server)
        .get_updates(Some(11), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(updates.len(), 2);
    let message = updates[0].message.as_ref().unwrap();
    assert_eq!(message.chat.id, 77);
    assert_eq!(message.text.as_deref(), Some("/start"));
    assert!(updates[1].message.is_none());
}

#[tokio::test]
async fn start_and_stop_commands_update_subscribers_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({"chat_id": 77, "text": SUBSCRIBED_REPLY})))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({"chat_id": 77, "text": UNSUBSCRIBED_REPLY})))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let registry = Arc::new(
        SubscriberRegistry::load(Arc::new(NullStore::default()))
            .await
            .unwrap(),
    );
    let handler = CommandHandler::new(Arc::new(client(&server)), registry.clone());

    let start = serde_json::from_value(json!({
        "update_id": 1,
        "message": {"chat": {"id": 77}, "text": "/start"}
    }))
    .unwrap();
    assert_eq!(handler.handle_update(&start).await, Some(Command::Start));
    assert_eq!(registry.recipients().await, vec![77]);

    let stop = serde_json::from_value(json!({
        "update_id": 2,
        "message": {"chat": {"id": 77}, "text": "/stop"}
    }))
    .unwrap();
    assert_eq!(handler.handle_update(&stop).await, Some(Command::Stop));
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn non_command_text_is_ignored() {
    let server = MockServer::start().await;
    let registry = Arc::new(
        SubscriberRegistry::load(Arc::new(NullStore::default()))
            .await
            .unwrap(),
    );
    let handler = CommandHandler::new(Arc::new(client(&server)), registry.clone());

    let chatter = serde_json::from_value(json!({
        "update_id": 3,
        "message": {"chat": {"id": 5}, "text": "hello"}
    }))
    .unwrap();

    assert_eq!(handler.handle_update(&chatter).await, None);
    assert!(registry.is_empty().await);
    assert!(server.received_requests().await.unwrap().is_empty());
}
