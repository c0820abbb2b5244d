//! §4.4 Transcription Adapter.
//!
//! - [`mime`]: exhaustive extension → MIME mapping (§4.4)
//! - [`format`]: diarization formatting rule shared by both entry points
//! - [`deepgram`]: prerecorded-audio REST adapter (`transcribe_bytes` /
//!   `transcribe_from_url`)
//! - [`live`]: streaming counterpart used by the `/listen` endpoint

pub mod deepgram;
pub mod format;
pub mod live;
pub mod mime;

pub use deepgram::{DeepgramConfig, DeepgramTranscriptionProvider};
pub use live::{DeepgramLiveConfig, DeepgramLiveTranscriptionProvider};
