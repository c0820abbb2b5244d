//! §4.4 MIME mapping. Exhaustive by design: an unrecognized extension is a
//! caller error (`VALIDATION_UNSUPPORTED_FORMAT`), never a silent guess.

use ingestgate_core::error::{Error, Result};

/// Map a file extension (case-insensitive, no leading dot) to the MIME type
/// the transcription provider expects.
pub fn mime_for_extension(extension: &str) -> Result<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "wav" => Ok("audio/wav"),
        "mp3" => Ok("audio/mpeg"),
        "flac" => Ok("audio/flac"),
        "m4a" => Ok("audio/mp4"),
        "webm" => Ok("audio/webm"),
        "mp4" => Ok("audio/mp4"),
        other => Err(Error::ValidationUnsupportedFormat(other.to_string())),
    }
}

/// Extract the extension from a filename (the part after the last `.`,
/// lowercased). Returns `VALIDATION_UNSUPPORTED_FORMAT` if there is none.
pub fn extension_of(filename: &str) -> Result<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| Error::ValidationUnsupportedFormat(filename.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_supported_extension() {
        assert_eq!(mime_for_extension("wav").unwrap(), "audio/wav");
        assert_eq!(mime_for_extension("mp3").unwrap(), "audio/mpeg");
        assert_eq!(mime_for_extension("flac").unwrap(), "audio/flac");
        assert_eq!(mime_for_extension("m4a").unwrap(), "audio/mp4");
        assert_eq!(mime_for_extension("webm").unwrap(), "audio/webm");
        assert_eq!(mime_for_extension("mp4").unwrap(), "audio/mp4");
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(mime_for_extension("MP3").unwrap(), "audio/mpeg");
    }

    #[test]
    fn rejects_anything_else() {
        assert!(matches!(
            mime_for_extension("ogg"),
            Err(Error::ValidationUnsupportedFormat(_))
        ));
    }

    #[test]
    fn extension_of_splits_on_last_dot() {
        assert_eq!(extension_of("call.recording.mp3").unwrap(), "mp3");
    }

    #[test]
    fn extension_of_rejects_no_extension() {
        assert!(extension_of("noextension").is_err());
    }
}
