//! §4.10 Upload Job Subsystem: the three-endpoint presigned-upload state
//! machine and the background worker that drains it.
//!
//! - [`service`]: `init` / `complete` / `status` — the durable,
//!   tenant-scoped half of the state machine (§4.10.1–§4.10.3)
//! - [`queue`]: the in-process enqueue channel the worker drains, with a
//!   DB poll fallback for jobs that outlive a restart
//! - [`worker`]: the `queued -> processing -> {succeeded, failed}` runner
//!   (§4.10.5)

pub mod object_store;
pub mod queue;
pub mod service;
pub mod worker;

pub use object_store::{S3Config, S3ObjectStore};
pub use queue::JobQueue;
pub use service::{CompleteRequest, CompleteResponse, InitRequest, InitResponse, UploadJobService};
pub use worker::UploadWorker;
