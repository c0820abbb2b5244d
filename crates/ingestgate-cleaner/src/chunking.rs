//! §4.5 chunking rule and §8 invariants 17/18: split the raw transcript by
//! speaker turn (one turn per input line), then subdivide any turn whose
//! word count exceeds [`WORD_THRESHOLD`] at sentence boundaries.

/// Fixed chunking threshold (§4.5: "~500 words").
pub const WORD_THRESHOLD: usize = 500;

/// Split `raw_transcript` into chunks no caller needs to subdivide further:
/// each element already carries its `SPEAKER_<n>:` prefix and is at or
/// under [`WORD_THRESHOLD`] words, unless a single sentence alone exceeds
/// the threshold (§4.5 point (c)).
pub fn chunk_transcript(raw_transcript: &str) -> Vec<String> {
    raw_transcript
        .lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(split_turn)
        .collect()
}

fn split_turn(turn: &str) -> Vec<String> {
    let (label, body) = split_label(turn);

    if word_count(body) <= WORD_THRESHOLD {
        return vec![turn.to_string()];
    }

    let mut subchunks: Vec<String> = Vec::new();
    let mut current_words = 0usize;

    for piece in split_sentences(body).into_iter().flat_map(|s| bound_to_threshold(&s)) {
        let piece_words = word_count(&piece);
        match subchunks.last_mut() {
            Some(last) if current_words + piece_words <= WORD_THRESHOLD => {
                last.push(' ');
                last.push_str(&piece);
                current_words += piece_words;
            }
            _ => {
                subchunks.push(format!("{label} {piece}"));
                current_words = piece_words;
            }
        }
    }

    subchunks
}

/// Split `label:` off the front of a turn (e.g. `"SPEAKER_0:"`), returning
/// `(label_with_colon, rest)`. Falls back to an empty label if the turn
/// somehow lacks one (defensive; the upstream formatter always adds it).
fn split_label(turn: &str) -> (&str, &str) {
    match turn.split_once(':') {
        Some((label, rest)) if label.starts_with("SPEAKER") => (&turn[..label.len() + 1], rest.trim_start()),
        _ => ("", turn),
    }
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Split `body` into sentences on `.`, `?`, `!`, keeping the delimiter.
fn split_sentences(body: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in body.chars() {
        current.push(ch);
        if matches!(ch, '.' | '?' | '!') {
            sentences.push(std::mem::take(&mut current).trim().to_string());
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

/// If a single sentence alone exceeds the threshold, split on the nearest
/// whitespace past the threshold (§4.5 point (c), last clause) instead of
/// mid-word.
fn bound_to_threshold(sentence: &str) -> Vec<String> {
    if word_count(sentence) <= WORD_THRESHOLD {
        return vec![sentence.to_string()];
    }

    let words: Vec<&str> = sentence.split_whitespace().collect();
    words
        .chunks(WORD_THRESHOLD)
        .map(|chunk| chunk.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_turns_stay_as_a_single_chunk() {
        let raw = "SPEAKER_0: Hello there, how are you?\nSPEAKER_1: I'm doing well, thanks!";
        let chunks = chunk_transcript(raw);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "SPEAKER_0: Hello there, how are you?");
    }

    #[test]
    fn long_turn_is_split_at_sentence_boundaries() {
        let sentence = "word ".repeat(50) + ".";
        let turn = format!("SPEAKER_0: {}", sentence.repeat(12));
        let chunks = chunk_transcript(&turn);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.starts_with("SPEAKER_0:"));
            let body = chunk.strip_prefix("SPEAKER_0:").unwrap();
            assert!(word_count(body) <= WORD_THRESHOLD);
        }
    }

    #[test]
    fn single_oversized_sentence_splits_on_whitespace_not_mid_sentence() {
        let giant_sentence = "word ".repeat(WORD_THRESHOLD * 2).trim().to_string() + ".";
        let turn = format!("SPEAKER_0: {giant_sentence}");
        let chunks = chunk_transcript(&turn);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            let body = chunk.strip_prefix("SPEAKER_0:").unwrap_or(chunk);
            assert!(word_count(body) <= WORD_THRESHOLD);
        }
    }

    #[test]
    fn chunking_never_merges_different_speakers() {
        let raw = format!(
            "SPEAKER_0: {}\nSPEAKER_1: short reply",
            "word ".repeat(WORD_THRESHOLD + 10)
        );
        let chunks = chunk_transcript(&raw);
        assert!(chunks.iter().any(|c| c.starts_with("SPEAKER_1:")));
        assert!(chunks
            .iter()
            .filter(|c| c.starts_with("SPEAKER_1:"))
            .all(|c| !c.contains("SPEAKER_0")));
    }
}
