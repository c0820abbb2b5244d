//! §4.6.1 extraction prompts.

pub const SYSTEM_PROMPT: &str = "You are an analyst extracting structured intelligence from a \
cleaned meeting or call transcript. Produce exactly the five summary levels requested \
(title, headline, brief, detailed, spotlight), plus any action items, decisions, risks, key \
takeaways, product feedback, and market intelligence you can ground directly in the transcript. \
Do not invent facts that are not supported by the text. Leave a category empty rather than \
padding it with speculation.";

pub fn user_prompt(cleaned_transcript: &str) -> String {
    format!("Transcript:\n\n{cleaned_transcript}")
}

/// Transcripts above this length get the longer extraction timeout (§5).
pub const LONG_TRANSCRIPT_WORD_THRESHOLD: usize = 2000;
