//! §8 S1 & S2: `POST /text/clean` happy path and whitespace rejection.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{build_harness, FakeLlm, TEST_TENANT_HEADER, TEST_USER_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn structured_response() -> Value {
    json!({
        "summaries": {
            "title": "Budget planning discussion",
            "headline": "Team agreed on Q3 budget allocation.",
            "brief": "The team reviewed spend across three initiatives and agreed on priorities.",
            "detailed": "A detailed walkthrough of the Q3 budget, covering headcount, tooling, and marketing spend.",
            "spotlight": "Marketing budget increased by 10%."
        },
        "action_items": [{"description": "circulate the final budget doc", "owner": "alex", "due_date": null}],
        "decisions": [{"decision": "approve the marketing increase", "rationale": "strong Q2 performance"}],
        "risks": [{"risk": "headcount freeze may slip the roadmap", "severity": "medium", "mitigation": null}],
        "key_takeaways": ["budget approved for Q3"],
        "product_feedback": [],
        "market_intelligence": []
    })
}

#[tokio::test]
async fn text_clean_happy_path_writes_five_summaries() {
    let llm = Arc::new(FakeLlm::new(structured_response()));
    let harness = common::build_harness(llm, false, "unused").await;

    let tenant_id = Uuid::new_v4();
    let body = json!({"text": "  um Hello world  ", "source": "api"});

    let request = Request::builder()
        .method("POST")
        .uri("/text/clean")
        .header("content-type", "application/json")
        .header(TEST_TENANT_HEADER, tenant_id.to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["raw_text"], "  um Hello world  ");
    assert!(json["cleaned_text"].as_str().unwrap().contains("Hello world"));
    let interaction_id = Uuid::parse_str(json["interaction_id"].as_str().unwrap()).unwrap();

    // Give the orchestrator's spawned-internal work (none here — it's
    // awaited inline) no extra time; the response already implies both
    // lanes completed since `run` is awaited before the handler returns.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interaction_summary_entries WHERE interaction_id = $1")
        .bind(interaction_id)
        .fetch_one(&harness.pool)
        .await
        .unwrap();
    assert_eq!(count, 5, "exactly five summary rows per §3.1 invariant");

    let bus_events = harness.bus.events.lock().unwrap();
    assert_eq!(bus_events.len(), 1, "bus should receive exactly one BatchProcessingCompleted event");
    assert_eq!(bus_events[0].1, "BatchProcessingCompleted");
}

#[tokio::test]
async fn whitespace_only_text_is_rejected_before_any_write() {
    let llm = Arc::new(FakeLlm::new(structured_response()));
    let harness = common::build_harness(llm, false, "unused").await;

    let request = Request::builder()
        .method("POST")
        .uri("/text/clean")
        .header("content-type", "application/json")
        .header(TEST_TENANT_HEADER, Uuid::new_v4().to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::from(json!({"text": "   \t\n"}).to_string()))
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["detail"].as_str().unwrap().to_lowercase().contains("empty") || json["detail"].as_str().unwrap().to_lowercase().contains("whitespace"));
}

#[tokio::test]
async fn missing_identity_is_rejected_with_401() {
    let llm = Arc::new(FakeLlm::new(structured_response()));
    let harness = common::build_harness(llm, false, "unused").await;

    let request = Request::builder()
        .method("POST")
        .uri("/text/clean")
        .header("content-type", "application/json")
        .body(Body::from(json!({"text": "hello"}).to_string()))
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
