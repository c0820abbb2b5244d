//! Fixed editor-style prompt for per-chunk cleaning (§4.5).

pub const SYSTEM_PROMPT: &str = "You are a meticulous transcript editor. Given one speaker turn \
from a diarized transcript, produce a cleaned version that:\n\
- removes filler words (\"um\", \"uh\", and \"like\" used as a filler)\n\
- removes immediate word duplications (e.g. \"the the\" -> \"the\")\n\
- adds sentence-ending punctuation and fixes capitalization\n\
- fixes basic grammar while preserving the speaker's voice and meaning\n\
\n\
You must not introduce any word that is not present in the input. You must \
preserve the exact SPEAKER_<n>: prefix at the start of the turn, unchanged. \
You must not merge this turn with any other speaker's turn. Return only the \
cleaned turn, nothing else.";

pub fn user_prompt(chunk: &str) -> String {
    format!("Clean this transcript turn:\n\n{chunk}")
}

pub const LIVE_SUMMARY_SYSTEM_PROMPT: &str = "You produce a short live-session summary from a \
cleaned meeting transcript: a one or two sentence summary, and a list of concrete action items \
phrased as short imperative strings. Respond with strict JSON matching the required schema.";

pub fn live_summary_user_prompt(cleaned_transcript: &str) -> String {
    format!("Summarize this transcript and list any action items:\n\n{cleaned_transcript}")
}
