//! `GET /` (§6.1): static demo recording page, embedded in the binary.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub async fn demo_page() -> Response {
    let html = include_str!("../static/demo.html");
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
}
