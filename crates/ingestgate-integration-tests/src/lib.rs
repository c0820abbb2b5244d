//! End-to-end integration tests for IngestGate.
//!
//! These tests wire a real [`ingestgate_server::build_router`] application
//! up against a disposable Postgres container and in-memory test doubles
//! for every external collaborator named in §1, then drive it through
//! `tower::ServiceExt::oneshot` the way a real HTTP client would.
