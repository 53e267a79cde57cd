//! Tests for `ReqwestClient`.
//!
//! Only construction and failure mapping are covered here; request
//! behavior against a live server is exercised through the executor with
//! scripted clients.

use super::*;
use std::time::Duration;

#[test]
fn new_creates_client() {
    let client = ReqwestClient::new();
    assert!(format!("{client:?}").contains("ReqwestClient"));
}

#[test]
fn from_client_accepts_custom_client() {
    let custom = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .build()
        .unwrap();
    let client = ReqwestClient::from_client(custom);

    assert!(format!("{client:?}").contains("ReqwestClient"));
}

#[test]
fn user_agent_names_the_crate() {
    assert!(USER_AGENT.starts_with("agentflow-client/"));
}

#[test]
fn client_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestClient>();
}

#[tokio::test]
async fn unresolvable_host_yields_connection_error_or_proxy_response() {
    let client = ReqwestClient::new();
    let url = url::Url::parse("http://invalid.invalid.invalid/").unwrap();
    let req = HttpRequest::get(url).with_timeout(Duration::from_secs(10));

    let result = client.request(req).await;

    // Behind a proxy the failure may come back as a 5xx response instead.
    match result {
        Err(HttpError::Connection(_) | HttpError::Timeout) => {}
        Ok(resp) if !resp.is_success() => {}
        other => panic!("Expected a failed exchange, got {other:?}"),
    }
}
