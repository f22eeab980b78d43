//! HTTP adapter against a mocked backend

use formflow_core::{Operation, StepMode, TemplateRef};
use formflow_persistence::{
    AdapterConfig, HttpPersistenceAdapter, PersistenceAdapter, StateSnapshot, StepAppend,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> HttpPersistenceAdapter {
    HttpPersistenceAdapter::new(AdapterConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn create_posts_title_and_initial() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations"))
        .and(body_json(json!({"title": "Intake", "initial": {"contact": {}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1",
            "title": "Intake",
            "initial": {"contact": {}},
            "steps": [],
            "pendingSteps": [],
            "sessionState": {},
            "created_at": "2024-05-01T08:00:00",
            "updated_at": "2024-05-01T08:00:00"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let handle = adapter_for(&mock_server)
        .create(Some("Intake"), &json!({"contact": {}}))
        .await
        .unwrap();
    assert_eq!(handle.id, "c1");
}

#[tokio::test]
async fn create_without_title_omits_field() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations"))
        .and(body_json(json!({"initial": {}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c2", "title": "c2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let handle = adapter_for(&mock_server).create(None, &json!({})).await.unwrap();
    assert_eq!(handle.title, "c2");
}

#[tokio::test]
async fn list_reads_items_envelope() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "b", "title": "B", "updated_at": "2024-05-02T08:00:00"},
                {"id": "a", "title": "A", "updated_at": "2024-05-01T08:00:00.250000"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let items = adapter_for(&mock_server).list().await.unwrap();
    let ids: Vec<&str> = items.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[tokio::test]
async fn load_parses_record_and_maps_404() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1",
            "title": "Intake",
            "initial": {"contact": {}},
            "steps": [{
                "templatePath": "contact",
                "mode": "explicit",
                "ops": [{"op": "add", "path": "/contact/name", "value": "Ada"}],
                "at": "2024-05-01T08:00:00.123"
            }],
            "pendingSteps": [{"templatePath": "extra", "mode": "diff"}],
            "sessionState": {"lastSlug": 2}
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(&mock_server);
    let record = adapter.load("c1").await.unwrap();
    assert_eq!(record.steps[0].ops, vec![Operation::add("/contact/name", json!("Ada"))]);
    assert_eq!(record.pending_steps, vec![TemplateRef::diff("extra")]);
    assert_eq!(record.session_state["lastSlug"], json!(2));

    assert!(adapter.load("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn writes_hit_conversation_routes() {
    let mock_server = MockServer::start().await;
    let ok = || ResponseTemplate::new(200).set_body_json(json!({"ok": true}));

    Mock::given(method("PATCH"))
        .and(path("/conversations/c1/title"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ok())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/conversations/c1/appendStep"))
        .and(body_json(json!({
            "templatePath": "contact",
            "mode": "diff",
            "ops": [{"op": "remove", "path": "/x"}]
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/conversations/c1/undo"))
        .respond_with(ok())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/conversations/c1/reset"))
        .respond_with(ok())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/conversations/c1/state"))
        .and(body_json(json!({
            "pendingSteps": [{"templatePath": "extra", "mode": "explicit"}],
            "sessionState": {}
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(&mock_server);
    adapter.rename("c1", "Renamed").await.unwrap();
    adapter
        .append_step(
            "c1",
            &StepAppend {
                template_path: "contact".to_string(),
                mode: StepMode::Diff,
                ops: vec![Operation::remove("/x")],
            },
        )
        .await
        .unwrap();
    adapter.undo("c1").await.unwrap();
    adapter.reset("c1").await.unwrap();
    adapter
        .save_state(
            "c1",
            &StateSnapshot {
                pending_steps: vec![TemplateRef::explicit("extra")],
                session_state: Default::default(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations/c1/undo"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let err = adapter_for(&mock_server).undo("c1").await.unwrap_err();
    assert!(matches!(
        err,
        formflow_persistence::AdapterError::Status { status: 503, ref body } if body == "unavailable"
    ));
}
