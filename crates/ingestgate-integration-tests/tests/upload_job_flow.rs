//! §8 S3 (abbreviated) & S14: upload init/complete, and cross-tenant
//! `status`/`complete` access both yielding 404 instead of leaking
//! existence.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{build_harness, FakeLlm, TEST_TENANT_HEADER, TEST_USER_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn empty_structured_response() -> Value {
    json!({
        "summaries": {"title": "t", "headline": "h", "brief": "b", "detailed": "d", "spotlight": "s"},
        "action_items": [],
        "decisions": [],
        "risks": [],
        "key_takeaways": [],
        "product_feedback": [],
        "market_intelligence": []
    })
}

async fn post_json(app: &axum::Router, uri: &str, tenant: Uuid, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(TEST_TENANT_HEADER, tenant.to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get_status(app: &axum::Router, job_id: Uuid, tenant: Uuid) -> StatusCode {
    let request = Request::builder()
        .method("GET")
        .uri(format!("/upload/status/{job_id}"))
        .header(TEST_TENANT_HEADER, tenant.to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn init_then_complete_moves_the_job_to_queued() {
    let llm = Arc::new(FakeLlm::new(empty_structured_response()));
    let harness = build_harness(llm, false, "SPEAKER_0: hello").await;
    let tenant = Uuid::new_v4();

    let (status, init_body) = post_json(
        &harness.app,
        "/upload/init",
        tenant,
        json!({"filename": "call.mp3", "mime_type": "audio/mpeg"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let file_key = init_body["file_key"].as_str().unwrap().to_string();
    assert!(file_key.starts_with(&format!("tenant/{tenant}/uploads/")));

    let (status, complete_body) = post_json(
        &harness.app,
        "/upload/complete",
        tenant,
        json!({"file_key": file_key}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(complete_body["status"], "queued");

    let job_id = Uuid::parse_str(complete_body["job_id"].as_str().unwrap()).unwrap();
    assert_eq!(get_status(&harness.app, job_id, tenant).await, StatusCode::OK);
}

#[tokio::test]
async fn complete_is_rejected_on_second_call_for_the_same_job() {
    let llm = Arc::new(FakeLlm::new(empty_structured_response()));
    let harness = build_harness(llm, false, "SPEAKER_0: hello").await;
    let tenant = Uuid::new_v4();

    let (_, init_body) = post_json(
        &harness.app,
        "/upload/init",
        tenant,
        json!({"filename": "call.mp3", "mime_type": "audio/mpeg"}),
    )
    .await;
    let file_key = init_body["file_key"].as_str().unwrap().to_string();

    let (first, _) = post_json(&harness.app, "/upload/complete", tenant, json!({"file_key": file_key})).await;
    assert_eq!(first, StatusCode::OK);

    let (second, _) = post_json(&harness.app, "/upload/complete", tenant, json!({"file_key": file_key})).await;
    assert_eq!(second, StatusCode::CONFLICT, "re-completing an already-queued job must be rejected");
}

#[tokio::test]
async fn cross_tenant_status_and_complete_both_yield_404() {
    let llm = Arc::new(FakeLlm::new(empty_structured_response()));
    let harness = build_harness(llm, false, "SPEAKER_0: hello").await;
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    let (_, init_body) = post_json(
        &harness.app,
        "/upload/init",
        tenant_a,
        json!({"filename": "call.mp3", "mime_type": "audio/mpeg"}),
    )
    .await;
    let job_id = Uuid::parse_str(init_body["job_id"].as_str().unwrap()).unwrap();
    let file_key = init_body["file_key"].as_str().unwrap().to_string();

    assert_eq!(get_status(&harness.app, job_id, tenant_b).await, StatusCode::NOT_FOUND);

    let (status, _) = post_json(&harness.app, "/upload/complete", tenant_b, json!({"file_key": file_key})).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "§8 invariant 14: cross-tenant access must be 404, not 403");

    // The owning tenant can still see it: proves the 404 above was about
    // tenant scoping, not a broken lookup.
    assert_eq!(get_status(&harness.app, job_id, tenant_a).await, StatusCode::OK);
}

#[tokio::test]
async fn unknown_job_id_yields_404() {
    let llm = Arc::new(FakeLlm::new(empty_structured_response()));
    let harness = build_harness(llm, false, "SPEAKER_0: hello").await;
    assert_eq!(get_status(&harness.app, Uuid::new_v4(), Uuid::new_v4()).await, StatusCode::NOT_FOUND);
}
