//! §4.5 Cleaner: reduce a raw, speaker-labeled transcript into a diarized,
//! de-filler'd form.
//!
//! - [`chunking`]: speaker-turn + sentence-boundary chunking (§4.5, §8
//!   invariants 17/18)
//! - [`prompt`]: the fixed editor-style prompt
//! - [`cleaner`]: [`Cleaner`], the orchestrating type

pub mod chunking;
pub mod cleaner;
pub mod prompt;

pub use chunking::{chunk_transcript, WORD_THRESHOLD};
pub use cleaner::{Cleaner, LiveSummary};
