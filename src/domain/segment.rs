//! Diarized transcript segments, the sequencer's input.

use serde::{Deserialize, Serialize};

/// One diarized segment of speech from upstream transcription.
///
/// Segment order within a source follows the transcription's diarization
/// output and determines clustering order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// Transcript text for this segment (may be empty)
    pub text: String,

    /// Segment start offset in seconds
    pub start_seconds: f64,

    /// Segment end offset in seconds
    pub end_seconds: f64,
}

impl SpeechSegment {
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
        }
    }
}

/// One audio file's worth of segments, processed as a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSource {
    /// Caller-supplied identifier (file name, recording id)
    pub id: String,

    /// Segments in chronological order
    pub segments: Vec<SpeechSegment>,
}

impl AudioSource {
    pub fn new(id: impl Into<String>, segments: Vec<SpeechSegment>) -> Self {
        Self {
            id: id.into(),
            segments,
        }
    }
}
