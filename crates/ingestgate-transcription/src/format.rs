//! §4.4 diarization formatting rule and §8 invariant 16: walk the provider's
//! per-word output in order, starting a new `SPEAKER_<n>:` line every time
//! the speaker index changes.

use serde::Deserialize;

/// One word as returned by the provider's per-word output, independent of
/// the provider's own wire shape (the Deepgram adapter maps onto this).
#[derive(Debug, Clone, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(default)]
    pub speaker: Option<u32>,
}

/// Render `words` as a diarized transcript: one line per speaker turn,
/// `SPEAKER_<n>:` (or `SPEAKER_UNKNOWN:` when speaker info is absent)
/// prefixing each line, consecutive same-speaker words joined by a single
/// space.
pub fn format_diarized(words: &[Word]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_speaker: Option<Option<u32>> = None;

    for word in words {
        let label = match word.speaker {
            Some(n) => format!("SPEAKER_{n}:"),
            None => "SPEAKER_UNKNOWN:".to_string(),
        };

        if current_speaker != Some(word.speaker) {
            lines.push(format!("{label} {}", word.text));
            current_speaker = Some(word.speaker);
        } else if let Some(line) = lines.last_mut() {
            line.push(' ');
            line.push_str(&word.text);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(text: &str, speaker: Option<u32>) -> Word {
        Word { text: text.to_string(), speaker }
    }

    #[test]
    fn new_line_on_every_speaker_change() {
        let words = vec![
            w("Hello", Some(0)),
            w("there", Some(0)),
            w("Hi", Some(1)),
            w("back", Some(0)),
        ];
        let out = format_diarized(&words);
        assert_eq!(out, "SPEAKER_0: Hello there\nSPEAKER_1: Hi\nSPEAKER_0: back");
    }

    #[test]
    fn missing_speaker_becomes_unknown() {
        let words = vec![w("um", None), w("hi", None)];
        assert_eq!(format_diarized(&words), "SPEAKER_UNKNOWN: um hi");
    }

    #[test]
    fn every_line_begins_with_a_speaker_label() {
        let words = vec![w("a", Some(0)), w("b", Some(1)), w("c", None)];
        for line in format_diarized(&words).lines() {
            assert!(line.starts_with("SPEAKER_"), "line {line} missing speaker label");
        }
    }

    #[test]
    fn empty_input_yields_empty_transcript() {
        assert_eq!(format_diarized(&[]), "");
    }
}
