//! Tests for webhook subscription operations.

use http::Method;
use serde_json::json;

use super::WebhookSubscription;
use super::fixtures::client;
use crate::error::ErrorKind;
use crate::test_support::{ScriptedClient, json_response};
use crate::webhook::EventType;

fn webhook() -> serde_json::Value {
    json!({
        "id": "wh-1",
        "url": "https://hooks.example.com/agentflow",
        "events": ["execution.completed", "execution.failed"]
    })
}

#[tokio::test]
async fn create_posts_subscription() {
    let (client, http, _) = client(ScriptedClient::new(vec![Ok(json_response(201, &webhook()))]));
    let subscription = WebhookSubscription::new(
        "https://hooks.example.com/agentflow",
        vec![EventType::ExecutionCompleted, EventType::ExecutionFailed],
    )
    .with_secret("whsec_test");

    let created = client.create_webhook(&subscription).await.unwrap();

    assert_eq!(created.id, "wh-1");
    assert!(created.active);
    assert_eq!(
        created.events,
        vec![EventType::ExecutionCompleted, EventType::ExecutionFailed]
    );
    let sent = &http.captured()[0];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url.path(), "/v1/webhooks");
    let body: serde_json::Value = serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "url": "https://hooks.example.com/agentflow",
            "events": ["execution.completed", "execution.failed"],
            "secret": "whsec_test"
        })
    );
}

#[tokio::test]
async fn create_without_events_is_rejected_locally() {
    let (client, http, _) = client(ScriptedClient::default());

    let err = client
        .create_webhook(&WebhookSubscription::new("https://hooks.example.com", Vec::new()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn list_returns_subscriptions() {
    let (client, _, _) = client(ScriptedClient::ok(json!({"data": [webhook()]})));

    let hooks = client.list_webhooks().await.unwrap();

    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].url, "https://hooks.example.com/agentflow");
}

#[tokio::test]
async fn delete_targets_subscription() {
    let (client, http, _) = client(ScriptedClient::ok(json!(null)));

    client.delete_webhook("wh-1").await.unwrap();

    let sent = &http.captured()[0];
    assert_eq!(sent.method, Method::DELETE);
    assert_eq!(sent.url.path(), "/v1/webhooks/wh-1");
}
