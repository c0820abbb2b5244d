//! §8 S5: the stream leg is down, the bus leg is healthy — the batch
//! endpoint still returns 200 with transcripts and the DB still gets its
//! five summary rows.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{build_harness, FakeLlm, TEST_TENANT_HEADER, TEST_USER_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn structured_response() -> Value {
    json!({
        "summaries": {"title": "t", "headline": "h", "brief": "b", "detailed": "d", "spotlight": "s"},
        "action_items": [],
        "decisions": [],
        "risks": [],
        "key_takeaways": ["call went well"],
        "product_feedback": [],
        "market_intelligence": []
    })
}

fn multipart_body(boundary: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/mpeg\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn batch_process_survives_a_stream_outage() {
    let llm = Arc::new(FakeLlm::new(structured_response()));
    let harness = build_harness(llm, true, "SPEAKER_0: hello there\nSPEAKER_1: hi").await;

    let boundary = "X-TEST-BOUNDARY";
    let body = multipart_body(boundary, "call.mp3", b"fake-audio-bytes");

    let request = Request::builder()
        .method("POST")
        .uri("/batch/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(TEST_TENANT_HEADER, Uuid::new_v4().to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::from(body))
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "a stream outage must not surface as an HTTP error");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["raw_transcript"].as_str().unwrap().contains("SPEAKER_0"));
    let interaction_id = Uuid::parse_str(json["interaction_id"].as_str().unwrap()).unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interaction_summary_entries WHERE interaction_id = $1")
        .bind(interaction_id)
        .fetch_one(&harness.pool)
        .await
        .unwrap();
    assert_eq!(count, 5, "intelligence lane must persist despite the publish lane failing");

    let bus_events = harness.bus.events.lock().unwrap();
    assert_eq!(bus_events.len(), 1, "the bus leg is independent of the failed stream leg");
}

#[tokio::test]
async fn batch_process_rejects_unsupported_extensions_before_reading_the_body() {
    let llm = Arc::new(FakeLlm::new(structured_response()));
    let harness = build_harness(llm, false, "unused").await;

    let boundary = "X-TEST-BOUNDARY";
    let body = multipart_body(boundary, "call.exe", b"not-audio");

    let request = Request::builder()
        .method("POST")
        .uri("/batch/process")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .header(TEST_TENANT_HEADER, Uuid::new_v4().to_string())
        .header(TEST_USER_HEADER, "user-1")
        .body(Body::from(body))
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
