//! Tests for `EventType` and `WebhookEvent`.

use serde_json::json;

use super::{EventType, UnknownEventType, WebhookEvent};

mod event_type {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for event_type in EventType::CONCRETE.into_iter().chain([EventType::Any]) {
            assert_eq!(event_type.as_str().parse::<EventType>(), Ok(event_type));
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_value(EventType::ExecutionCompleted).unwrap(),
            json!("execution.completed")
        );
        assert_eq!(serde_json::to_value(EventType::Any).unwrap(), json!("*"));
        assert_eq!(
            serde_json::from_value::<EventType>(json!("agent.registered")).unwrap(),
            EventType::AgentRegistered
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "flow.exploded".parse::<EventType>(),
            Err(UnknownEventType("flow.exploded".to_string()))
        );
        assert!(serde_json::from_value::<EventType>(json!("flow.exploded")).is_err());
    }

    #[test]
    fn only_any_is_wildcard() {
        assert!(EventType::Any.is_wildcard());
        assert!(EventType::CONCRETE.iter().all(|t| !t.is_wildcard()));
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(EventType::WebhookTest.to_string(), "webhook.test");
    }
}

mod webhook_event {
    use super::*;

    #[test]
    fn factory_fills_local_fields() {
        let before = chrono::Utc::now();
        let event = WebhookEvent::new(EventType::WebhookTest, "wh-1", json!({"ping": true}));
        let after = chrono::Utc::now();

        assert_eq!(event.event, EventType::WebhookTest);
        assert_eq!(event.webhook_id, "wh-1");
        assert_eq!(event.attempt, 1);
        assert!(event.signature.is_none());
        assert!(uuid::Uuid::parse_str(&event.id).is_ok());
        assert!(event.timestamp >= before && event.timestamp <= after);
    }

    #[test]
    fn factory_ids_are_unique() {
        let a = WebhookEvent::new(EventType::WebhookTest, "wh-1", json!(null));
        let b = WebhookEvent::new(EventType::WebhookTest, "wh-1", json!(null));

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn decodes_camel_case_payload() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "evt-1",
            "event": "execution.failed",
            "data": {"executionId": "ex-9", "error": "boom"},
            "timestamp": "2024-05-01T12:30:00Z",
            "webhookId": "wh-3",
            "attempt": 2
        }))
        .unwrap();

        assert_eq!(event.event, EventType::ExecutionFailed);
        assert_eq!(event.webhook_id, "wh-3");
        assert_eq!(event.attempt, 2);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-05-01T12:30:00+00:00");
        assert!(event.signature.is_none());
    }

    #[test]
    fn encodes_without_absent_signature() {
        let event = WebhookEvent::new(EventType::AgentUpdated, "wh-1", json!({}));

        let value = serde_json::to_value(&event).unwrap();

        assert!(value.get("signature").is_none());
        assert!(value.get("webhookId").is_some());
        assert_eq!(value["event"], "agent.updated");
    }
}
