//! Ingestion Gateway Core Types and Traits
//!
//! Shared vocabulary for every crate in the workspace:
//!
//! - [`context`]: `RequestContext`, resolved once per request at the edge
//! - [`envelope`]: `EnvelopeV1`, the versioned fan-out schema
//! - [`intelligence`]: summary levels, insight types, and the derived
//!   `InteractionSummaryEntry` / `InteractionInsight` rows
//! - [`upload`]: the durable `UploadJob` record and its state machine
//! - [`ports`]: trait seams implemented by satellite crates and wired
//!   together in `ingestgate-server`
//! - [`error`]: the error taxonomy shared by every crate
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                ingestgate-server               │
//! └───────────────────┬───────────────────────────┘
//!                     │ wires Arc<dyn Trait> from ports
//!       ┌─────────────┼─────────────────┐
//!       ▼             ▼                 ▼
//! TranscriptionProvider  LlmClient   StreamPublisher / EventBusPublisher
//!  (ingestgate-          (ingestgate-  (ingestgate-publisher)
//!   transcription)        llm)
//! ```

pub mod context;
pub mod envelope;
pub mod error;
pub mod intelligence;
pub mod ports;
pub mod upload;

pub use context::RequestContext;
pub use envelope::{ContentFormat, EnvelopeBuilder, EnvelopeContent, EnvelopeSource, EnvelopeV1, InteractionType};
pub use error::{Error, Result};
pub use upload::{JobStatus, JobType, UploadJob};
